//! Wire protocol for the AdWolf chat stream.
//!
//! The server answers a chat message with a chunked HTTP body of
//! newline-separated frames, each line formatted as `data: ` followed by a
//! JSON-encoded [`StreamEvent`]. This crate provides the event union and
//! [`FrameParser`], an incremental parser that reassembles frames from raw
//! byte chunks regardless of where the network split them.

mod event;
mod frames;

pub use event::StreamEvent;
pub use frames::FrameParser;
