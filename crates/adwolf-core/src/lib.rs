//! Core types and error definitions for the AdWolf chat client.
//!
//! This crate provides the foundational types shared across all AdWolf crates,
//! including error handling, conversation message representations, and the
//! thread summary types returned by the collaborator REST endpoints.
//!
//! # Main types
//!
//! - [`AdwolfError`] — Unified error enum for all client subsystems.
//! - [`AdwolfResult`] — Convenience alias for `Result<T, AdwolfError>`.
//! - [`Role`] — Message role (user, assistant, system).
//! - [`MessageId`] — Pending (client-generated) vs committed (server-assigned) id.
//! - [`ChatMessage`] — A single message within a conversation thread.
//! - [`ThreadSummary`] — A persisted conversation thread as listed by the server.

/// Thread summaries and collaborator response envelopes.
pub mod thread;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

pub use thread::{ThreadHistory, ThreadList, ThreadSummary};

// --- Error types ---

/// Top-level error type for the AdWolf chat client.
///
/// Each variant corresponds to a failure domain. Malformed stream frames are
/// deliberately absent: they are recovered locally by the frame parser and
/// never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum AdwolfError {
    /// The server rejected a request with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    Http {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, if one could be read.
        message: String,
    },

    /// A network-level failure before or during a request.
    #[error("Network error: {0}")]
    Network(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`AdwolfError`].
pub type AdwolfResult<T> = Result<T, AdwolfError>;

// --- Message types ---

/// The role of the participant that authored a [`ChatMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The AI assistant.
    Assistant,
    /// A system-level instruction.
    System,
}

/// Identity of a [`ChatMessage`].
///
/// Optimistically appended messages carry a client-generated [`Pending`] id
/// until the server acknowledges the exchange; messages loaded from history
/// or finalized with a server-supplied `message_id` are [`Committed`].
///
/// [`Pending`]: MessageId::Pending
/// [`Committed`]: MessageId::Committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageId {
    /// Client-generated temporary id, not yet acknowledged by the server.
    Pending(Uuid),
    /// Server-assigned id.
    Committed(String),
}

impl MessageId {
    /// Generates a fresh pending id.
    pub fn pending() -> Self {
        Self::Pending(Uuid::new_v4())
    }

    /// Whether this id has been assigned by the server.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(id) => write!(f, "{id}"),
            Self::Committed(id) => write!(f, "{id}"),
        }
    }
}

// On the wire a message id is a bare string; only committed ids ever come
// from the server, so deserialization always yields `Committed`.
impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Self::Committed(id))
    }
}

/// A tool invocation recorded on an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Name of the invoked tool.
    pub name: String,
    /// JSON arguments the tool was invoked with.
    #[serde(default)]
    pub args: serde_json::Value,
    /// Truncated preview of the tool output, if the server stored one.
    #[serde(default)]
    pub result_preview: Option<String>,
}

/// The recorded outcome of a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultRecord {
    /// Name of the tool that resolved.
    pub name: String,
    /// Whether the invocation succeeded.
    pub success: bool,
}

/// A single message exchanged within a conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Identity of this message (pending until server-acknowledged).
    pub id: MessageId,
    /// The role of the message author.
    pub role: Role,
    /// The textual content of the message.
    pub content: String,
    /// The thread this message belongs to, once one exists.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Tool invocations the assistant made while producing this message.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallRecord>>,
    /// Outcomes of those tool invocations.
    #[serde(default)]
    pub tool_results: Option<Vec<ToolResultRecord>>,
    /// UTC timestamp of when the message was created.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>, thread_id: Option<String>) -> Self {
        Self {
            id: MessageId::pending(),
            role,
            content: content.into(),
            thread_id,
            tool_calls: None,
            tool_results: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(content: impl Into<String>, thread_id: Option<String>) -> Self {
        Self::new(Role::User, content, thread_id)
    }

    /// Creates a new message with [`Role::Assistant`].
    pub fn assistant(content: impl Into<String>, thread_id: Option<String>) -> Self {
        Self::new(Role::Assistant, content, thread_id)
    }
}
