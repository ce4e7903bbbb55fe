//! # cogent-core
//!
//! Core types and traits for the Cogent conversational pipeline.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! adapters and extensions that don't need the full `cogent-std`
//! implementation.
//!
//! # Turn Model
//!
//! Every inbound message starts a **turn**. The turn's [`State`] travels
//! through a fixed sequence of named stages:
//!
//! ```text
//! hear → listen → [understand] → [act] → [respond] → [remember]
//! ```
//!
//! Each stage runs a middleware chain of [`Step`]s and, for the matching
//! stages, a collection of [`Listener`]s. A stage that completes records a
//! timestamp in [`State::processed`].
//!
//! ## Steps
//!
//! The primitive unit of stage processing. A step inspects or mutates the
//! state and returns [`StepResult::Continue`] or [`StepResult::Abort`].
//!
//! ## Listeners
//!
//! A matcher plus a callback. Callbacks queue [`Envelope`]s through
//! [`State::respond`] or end the turn with [`State::finish`].
//!
//! # Error Types
//!
//! - [`CogentError`] - Top-level error type
//! - [`BoxError`] - Errors raised by user code (steps, listeners, adapters)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod envelope;
mod error;
mod listener;
mod message;
mod nlu;
mod state;
mod step;

// Re-exports
pub use envelope::Envelope;
pub use error::{BoxError, CogentError};
pub use listener::{DynListener, Listener, ListenerOptions};
pub use message::{CatchAllMessage, EventMessage, Message, ServerMessage, TextMessage, User};
pub use nlu::{NaturalLanguageResult, NaturalLanguageResults, NluCandidate, NluKind};
pub use state::{Processed, State};
pub use step::{AsyncStep, DynStep, Step, StepResult};

/// Names of the standard stages, in turn order.
pub mod stage {
    /// Pre-processing of every inbound message.
    pub const HEAR: &str = "hear";
    /// Matching against listeners on the raw message.
    pub const LISTEN: &str = "listen";
    /// Matching against listeners on language understanding results.
    pub const UNDERSTAND: &str = "understand";
    /// Fallback matching on the catch-all message.
    pub const ACT: &str = "act";
    /// Dispatch of queued envelopes.
    pub const RESPOND: &str = "respond";
    /// Persistence of the turn.
    pub const REMEMBER: &str = "remember";

    /// All standard stages in turn order.
    pub const ALL: [&str; 6] = [HEAR, LISTEN, UNDERSTAND, ACT, RESPOND, REMEMBER];
}
