use crate::credentials::CredentialProvider;
use adwolf_core::{AdwolfError, AdwolfResult, ThreadHistory, ThreadList};
use adwolf_protocol::{FrameParser, StreamEvent};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// HTTP client for the AdWolf chat API.
///
/// Owns one `reqwest::Client` (cheap to clone, shared connection pool) and a
/// [`CredentialProvider`] consulted at request-construction time. One call to
/// [`send_message`](Self::send_message) opens one streamed request; there is
/// no built-in retry — a failed stream is surfaced once and the user resends.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ChatClient {
    /// Creates a client for the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.credentials.bearer_token() {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Sends a user message and opens the event stream of the response.
    ///
    /// `thread_id` of `None` starts a new conversation; the server announces
    /// the created thread via a `thread_created` event. A non-2xx status
    /// fails here, before any event is yielded.
    pub async fn send_message(
        &self,
        message: &str,
        thread_id: Option<&str>,
    ) -> AdwolfResult<EventStream> {
        let body = serde_json::json!({
            "message": message,
            "thread_id": thread_id,
        });

        let resp = self
            .request(reqwest::Method::POST, "/api/v1/chat/message")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdwolfError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AdwolfError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(EventStream::new(resp.bytes_stream()))
    }

    /// Lists the current user's threads, most recent first.
    pub async fn list_threads(&self) -> AdwolfResult<ThreadList> {
        let resp = self
            .request(reqwest::Method::GET, "/api/v1/chat/threads")
            .send()
            .await
            .map_err(|e| AdwolfError::Network(e.to_string()))?;
        Self::json_body(resp).await
    }

    /// Fetches a thread together with its full message history.
    pub async fn thread_history(&self, thread_id: &str) -> AdwolfResult<ThreadHistory> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/api/v1/chat/threads/{thread_id}"),
            )
            .send()
            .await
            .map_err(|e| AdwolfError::Network(e.to_string()))?;
        Self::json_body(resp).await
    }

    /// Deletes a thread. The server soft-deletes and answers 204.
    pub async fn delete_thread(&self, thread_id: &str) -> AdwolfResult<()> {
        let resp = self
            .request(
                reqwest::Method::DELETE,
                &format!("/api/v1/chat/threads/{thread_id}"),
            )
            .send()
            .await
            .map_err(|e| AdwolfError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AdwolfError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn json_body<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> AdwolfResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AdwolfError::Http {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| AdwolfError::Network(e.to_string()))
    }
}

/// Lazy, finite, non-restartable sequence of parsed [`StreamEvent`]s.
///
/// Pulls raw byte chunks from the response body on demand and feeds them
/// through a [`FrameParser`]. A mid-stream network failure yields exactly one
/// `Err` and then the stream terminates; there is no resumption.
pub struct EventStream {
    chunks: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    parser: FrameParser,
    ready: VecDeque<StreamEvent>,
    finished: bool,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("parser", &self.parser)
            .field("ready", &self.ready)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl EventStream {
    fn new(chunks: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            chunks: Box::pin(chunks),
            parser: FrameParser::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Returns the next event, suspending until one is available.
    ///
    /// `None` marks end of stream; any trailing incomplete frame is dropped.
    pub async fn next(&mut self) -> Option<AdwolfResult<StreamEvent>> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }
            match self.chunks.next().await {
                Some(Ok(bytes)) => self.ready.extend(self.parser.push(&bytes)),
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(AdwolfError::Network(err.to_string())));
                }
                None => {
                    self.finished = true;
                    if self.parser.has_partial() {
                        debug!("Stream closed mid-frame; discarding partial line");
                    }
                    return None;
                }
            }
        }
    }
}
