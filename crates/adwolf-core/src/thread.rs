use crate::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted conversation thread, as returned by the thread endpoints.
///
/// The server creates threads implicitly on the first message of a new
/// conversation; the client discovers the id via a `thread_created` stream
/// event. Extra server-side fields (organization id, soft-delete flag) are
/// ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    /// Server-assigned thread id.
    pub id: String,
    /// Thread title, auto-generated server-side after the first exchange.
    #[serde(default = "default_title")]
    pub title: String,
    /// Number of messages in the thread.
    #[serde(default)]
    pub message_count: u32,
    /// Timestamp of the most recent message.
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Thread creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_title() -> String {
    "Yeni Konuşma".to_string()
}

/// Response envelope of the thread-listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadList {
    /// Threads belonging to the current user, most recent first.
    pub threads: Vec<ThreadSummary>,
    /// Total thread count.
    pub total: usize,
}

/// Response envelope of the thread-history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadHistory {
    /// The thread itself.
    pub thread: ThreadSummary,
    /// Its full message history, oldest first.
    pub messages: Vec<ChatMessage>,
}
