use crate::client::ChatClient;
use crate::latest::ReplaceableFetch;
use crate::session::{ChatSession, Phase, SessionEffect};
use adwolf_core::{AdwolfResult, ThreadHistory, ThreadSummary};
use adwolf_protocol::StreamEvent;
use tracing::{info, warn};

/// Drives complete chat exchanges and keeps the thread list current.
///
/// Owns the [`ChatSession`] exclusively; no other component mutates the
/// conversation state. Every failure path folds back into the transcript —
/// the controller never leaves the session stuck outside `Idle`.
pub struct ChatController {
    client: ChatClient,
    session: ChatSession,
    threads: Vec<ThreadSummary>,
    history_fetch: ReplaceableFetch<AdwolfResult<ThreadHistory>>,
}

impl ChatController {
    /// Creates a controller with an empty session.
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            session: ChatSession::new(),
            threads: Vec::new(),
            history_fetch: ReplaceableFetch::new(),
        }
    }

    /// Read access to the conversation state; the view renders from this.
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// The cached thread list, as of the last refresh.
    pub fn threads(&self) -> &[ThreadSummary] {
        &self.threads
    }

    /// Runs one exchange: optimistic user message, streamed response, commit.
    ///
    /// `on_event` observes each applied event (the CLI renders deltas live
    /// from it). All failures — rejected request, mid-stream network error,
    /// stream closed without a terminal event — become a synthetic assistant
    /// error message; nothing is retried and nothing escapes as `Err`.
    pub async fn send<F>(&mut self, text: &str, mut on_event: F)
    where
        F: FnMut(&StreamEvent),
    {
        let Some(text) = self.session.begin_send(text) else {
            return;
        };
        let thread_id = self.session.thread_id().map(str::to_string);

        let mut stream = match self.client.send_message(&text, thread_id.as_deref()).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "Chat request rejected");
                self.session.fail(None);
                return;
            }
        };

        let mut refresh = false;
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    if self.session.apply(&event) == Some(SessionEffect::RefreshThreads) {
                        refresh = true;
                    }
                    on_event(&event);
                }
                Err(err) => {
                    warn!(error = %err, "Chat stream interrupted");
                    self.session.fail(None);
                    break;
                }
            }
        }

        // A well-behaved server ends with done or error; a connection that
        // closed without one counts as a transport failure.
        if self.session.phase() != Phase::Idle {
            self.session.fail(None);
        }

        if refresh {
            if let Err(err) = self.refresh_threads().await {
                warn!(error = %err, "Thread list refresh failed");
            }
        }
    }

    /// Refetches the thread list from the server.
    pub async fn refresh_threads(&mut self) -> AdwolfResult<()> {
        let list = self.client.list_threads().await?;
        self.threads = list.threads;
        Ok(())
    }

    /// Switches to another thread, replacing the transcript with its history.
    ///
    /// Ignored while an exchange is in flight. Reopening while a previous
    /// history fetch is still pending aborts the superseded fetch.
    pub async fn open_thread(&mut self, thread_id: &str) -> AdwolfResult<()> {
        if self.session.is_busy() {
            warn!(thread_id, "Thread switch ignored during streaming");
            return Ok(());
        }

        let client = self.client.clone();
        let id = thread_id.to_string();
        self.history_fetch
            .start(async move { client.thread_history(&id).await });

        match self.history_fetch.finish().await {
            Some(Ok(history)) => {
                info!(thread_id = %history.thread.id, messages = history.messages.len(), "Thread opened");
                self.session
                    .load_history(&history.thread.id, history.messages);
                Ok(())
            }
            Some(Err(err)) => Err(err),
            // Superseded by a newer fetch; the newer call handles the result.
            None => Ok(()),
        }
    }

    /// Resets to a fresh conversation. Purely local; the server creates the
    /// thread on the next successful send.
    pub fn new_thread(&mut self) {
        self.session.clear();
    }

    /// Deletes a thread server-side and drops it from the local list. If it
    /// was the active thread, the session resets to the new-thread state.
    pub async fn delete_thread(&mut self, thread_id: &str) -> AdwolfResult<()> {
        self.client.delete_thread(thread_id).await?;
        self.threads.retain(|t| t.id != thread_id);
        if self.session.thread_id() == Some(thread_id) {
            self.session.clear();
        }
        Ok(())
    }
}
