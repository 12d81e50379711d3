//! Client-side core of the AdWolf chat assistant.
//!
//! Three responsibilities live here:
//!
//! - [`ChatClient`] — the transport reader: one streamed HTTP request per
//!   user message, plus the collaborator thread endpoints (list, history,
//!   delete). Authentication comes from an explicit [`CredentialProvider`],
//!   never from ambient global state.
//! - [`ChatSession`] — the session reducer: a single-owner state machine that
//!   folds parsed stream events into conversation state (message list,
//!   streaming buffer, active-tool indicator, thread identity) with
//!   optimistic updates.
//! - [`ChatController`] — drives one exchange end to end and keeps the cached
//!   thread list in sync.

mod client;
mod controller;
mod credentials;
mod latest;
mod session;

pub use client::{ChatClient, EventStream};
pub use controller::ChatController;
pub use credentials::{Anonymous, CredentialProvider, EnvToken, StaticToken};
pub use latest::ReplaceableFetch;
pub use session::{ChatSession, Phase, SessionEffect, ERROR_MARKER, GENERIC_ERROR};
