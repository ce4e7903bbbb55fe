//! # cogent - Staged message processing for conversational bots
//!
//! Every inbound message becomes a [`State`] that flows through a fixed
//! sequence of stages: `hear`, `listen`, `understand`, `act`, `respond` and
//! `remember`. Each stage runs its middleware chain, optionally evaluates a
//! set of listeners, and records a timestamp when it completes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cogent::prelude::*;
//!
//! let bot = Bot::builder().message(MyMessenger::new()).build();
//!
//! bot.registry().listen_text(r"^hello", |state| {
//!     state.respond("hi there");
//! }, ListenerOptions::new())?;
//!
//! let state = bot.receive(Message::text(User::new("alice"), "hello bot")).await?;
//! assert!(state.processed().contains("respond"));
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bot;
mod thought;
mod thoughts;

pub use bot::{Bot, BotBuilder};
pub use thought::{Thought, ThoughtBuilder};
pub use thoughts::{Flow, Thoughts};

pub use cogent_core::{
    // Step
    AsyncStep,
    // Error types
    BoxError,
    // Message
    CatchAllMessage,
    CogentError,
    DynListener,
    DynStep,
    // Envelope
    Envelope,
    EventMessage,
    // Listener
    Listener,
    ListenerOptions,
    Message,
    // NLU
    NaturalLanguageResult,
    NaturalLanguageResults,
    NluCandidate,
    NluKind,
    // State
    Processed,
    ServerMessage,
    State,
    Step,
    StepResult,
    TextMessage,
    User,
    stage,
};

pub use cogent_std::{
    middleware::Middleware,
    registry::{Registry, global},
};

/// Adapter contracts.
pub mod adapters {
    pub use cogent_std::adapters::{
        Adapters, LanguageAdapter, MessageAdapter, STATES_COLLECTION, StorageAdapter,
    };
}

/// Standard middleware steps.
pub mod steps {
    #![allow(clippy::wildcard_imports)]
    pub use cogent_std::steps::*;
}

/// Standard listener implementations.
pub mod listeners {
    #![allow(clippy::wildcard_imports)]
    pub use cogent_std::listeners::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use cogent_std::testing::*;
}

/// Prelude module - common imports for Cogent.
///
/// # Usage
///
/// ```rust,ignore
/// use cogent::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Facade
        Bot,
        CogentError,
        Envelope,
        Flow,
        // Core traits
        Listener,
        ListenerOptions,
        Message,
        Middleware,
        State,
        Step,
        StepResult,
        Thought,
        Thoughts,
        User,
        adapters::{LanguageAdapter, MessageAdapter, StorageAdapter},
        listeners::Listeners,
    };
}
