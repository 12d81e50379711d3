use adwolf_core::{ChatMessage, MessageId, ToolCallRecord};
use adwolf_protocol::StreamEvent;
use tracing::{debug, warn};

/// Prefix marking a synthetic assistant message that reports a failure.
pub const ERROR_MARKER: &str = "⚠️";

/// Fallback text when a failure carries no server-supplied description.
pub const GENERIC_ERROR: &str = "Bir hata oluştu. Lütfen tekrar deneyin.";

/// Server-side limit on outgoing message length, enforced before sending.
const MAX_MESSAGE_LEN: usize = 4000;

/// Lifecycle of one exchange within the active thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No exchange in flight; input is accepted.
    #[default]
    Idle,
    /// Request opened, no event received yet.
    Sending,
    /// Events arriving; the stream buffer is the in-flight assistant message.
    Streaming,
}

/// Side effect requested by the reducer, executed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Refetch the thread list (title and message count changed server-side).
    /// Failures of this refresh are logged, never surfaced.
    RefreshThreads,
}

/// Conversation state for the active thread, owned exclusively by its holder.
///
/// Drives the `Idle → Sending → Streaming → Idle` state machine. The message
/// list is append-only from the consumer's perspective; the only in-place
/// change is committing the accumulated stream buffer as a message. The view
/// layer is a pure function of this state.
#[derive(Debug, Default)]
pub struct ChatSession {
    thread_id: Option<String>,
    messages: Vec<ChatMessage>,
    stream_buffer: String,
    active_tool: Option<String>,
    tool_log: Vec<ToolCallRecord>,
    phase: Phase,
}

impl ChatSession {
    /// Creates an empty session with no active thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// The adopted thread id, once the server has assigned one.
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// The transcript so far (finalized messages only).
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Text of the in-flight assistant message, rendered as "typing".
    pub fn stream_buffer(&self) -> &str {
        &self.stream_buffer
    }

    /// Name of the tool the assistant is currently running, if any.
    pub fn active_tool(&self) -> Option<&str> {
        self.active_tool.as_deref()
    }

    /// Current exchange phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether an exchange is in flight (input must stay disabled).
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Starts an exchange: appends the optimistic user message and moves to
    /// `Sending`. Returns the trimmed text to transmit, or `None` when the
    /// guard rejects the submission (already streaming, blank or overlong
    /// input) — a rejected send is ignored, not an error.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        if self.phase != Phase::Idle {
            debug!("Send ignored: exchange already in flight");
            return None;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().count() > MAX_MESSAGE_LEN {
            warn!(len = trimmed.chars().count(), "Send ignored: message too long");
            return None;
        }

        self.messages
            .push(ChatMessage::user(trimmed, self.thread_id.clone()));
        self.stream_buffer.clear();
        self.active_tool = None;
        self.tool_log.clear();
        self.phase = Phase::Sending;
        Some(trimmed.to_string())
    }

    /// Folds one stream event into the session state.
    ///
    /// Events are applied strictly in arrival order; the stream buffer grows
    /// monotonically by exactly the received deltas.
    pub fn apply(&mut self, event: &StreamEvent) -> Option<SessionEffect> {
        match event {
            StreamEvent::TextDelta { content } => {
                self.stream_buffer.push_str(content);
                self.phase = Phase::Streaming;
                None
            }

            StreamEvent::ToolCall {
                tool_name,
                tool_args,
            } => {
                // Advisory indicator only; deltas keep accumulating.
                self.active_tool = Some(tool_name.clone());
                self.tool_log.push(ToolCallRecord {
                    name: tool_name.clone(),
                    args: tool_args.clone().unwrap_or(serde_json::Value::Null),
                    result_preview: None,
                });
                self.phase = Phase::Streaming;
                None
            }

            StreamEvent::ToolResult { .. } => {
                // No correlation id on the wire; at most one tool is active.
                self.active_tool = None;
                None
            }

            StreamEvent::ThreadCreated { thread_id } => {
                self.adopt_thread(thread_id);
                None
            }

            StreamEvent::Done {
                thread_id,
                message_id,
            } => {
                if let Some(id) = thread_id {
                    self.adopt_thread(id);
                }
                if !self.stream_buffer.is_empty() {
                    let id = message_id
                        .as_deref()
                        .filter(|id| !id.is_empty())
                        .map(|id| MessageId::Committed(id.to_string()))
                        .unwrap_or_else(MessageId::pending);
                    self.commit_assistant(id);
                }
                self.finish_exchange();
                Some(SessionEffect::RefreshThreads)
            }

            StreamEvent::Error { content } => {
                self.fail(content.as_deref());
                None
            }
        }
    }

    /// Terminates the exchange after a transport-level failure (network
    /// error, non-OK status, stream closed without a terminal event).
    ///
    /// The failure lands in the transcript as a marker-prefixed assistant
    /// message; partial streamed output is dropped, not committed, and the
    /// session returns to `Idle` and stays usable.
    pub fn fail(&mut self, detail: Option<&str>) {
        let detail = detail.filter(|d| !d.is_empty()).unwrap_or(GENERIC_ERROR);
        let content = format!("{ERROR_MARKER} {detail}");
        self.stream_buffer.clear();
        self.tool_log.clear();
        self.messages
            .push(ChatMessage::assistant(content, self.thread_id.clone()));
        self.finish_exchange();
    }

    /// Replaces the transcript with a thread's fetched history.
    ///
    /// Only permitted between exchanges; switching threads mid-stream is a
    /// UI contract violation and is ignored.
    pub fn load_history(&mut self, thread_id: &str, messages: Vec<ChatMessage>) {
        if self.is_busy() {
            warn!(thread_id, "Thread switch ignored during streaming");
            return;
        }
        self.thread_id = Some(thread_id.to_string());
        self.messages = messages;
        self.stream_buffer.clear();
        self.active_tool = None;
        self.tool_log.clear();
    }

    /// Resets to the "new thread" state: no thread id, empty transcript.
    /// No network call — the thread only materializes on the next send.
    pub fn clear(&mut self) {
        if self.is_busy() {
            warn!("New-thread reset ignored during streaming");
            return;
        }
        self.thread_id = None;
        self.messages.clear();
        self.stream_buffer.clear();
        self.active_tool = None;
        self.tool_log.clear();
    }

    /// Adopts a server-assigned thread id. First writer wins: a second
    /// adoption attempt within one session is ignored.
    fn adopt_thread(&mut self, thread_id: &str) {
        if self.thread_id.is_some() {
            return;
        }
        self.thread_id = Some(thread_id.to_string());
        // Backfill messages appended before the thread existed.
        for msg in &mut self.messages {
            if msg.thread_id.is_none() {
                msg.thread_id = Some(thread_id.to_string());
            }
        }
    }

    fn commit_assistant(&mut self, id: MessageId) {
        let mut msg = ChatMessage::assistant(
            std::mem::take(&mut self.stream_buffer),
            self.thread_id.clone(),
        );
        msg.id = id;
        if !self.tool_log.is_empty() {
            msg.tool_calls = Some(std::mem::take(&mut self.tool_log));
        }
        self.messages.push(msg);
    }

    fn finish_exchange(&mut self) {
        self.stream_buffer.clear();
        self.active_tool = None;
        self.phase = Phase::Idle;
    }
}
