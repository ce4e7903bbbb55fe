//! The bot facade.

use crate::thoughts::{Flow, Thoughts};
use cogent_core::{CogentError, Envelope, Message, State};
use cogent_std::{
    adapters::{Adapters, LanguageAdapter, MessageAdapter, StorageAdapter},
    registry::Registry,
};
use std::sync::Arc;

/// A configured bot: a stage registry plus the adapters its turns use.
///
/// # Example
///
/// ```rust,ignore
/// let bot = Bot::builder()
///     .message(MyMessenger::connect(token).await?)
///     .storage(MyStorage::open(path)?)
///     .build();
///
/// bot.registry().listen_text(r"^ping$", |state| {
///     state.respond("pong");
/// }, ListenerOptions::new())?;
///
/// let state = bot.receive(message).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Bot {
    registry: Arc<Registry>,
    adapters: Adapters,
}

impl Default for Bot {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Bot {
    /// Start configuring a bot.
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// The registry whose stages this bot runs.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The configured adapters.
    pub fn adapters(&self) -> &Adapters {
        &self.adapters
    }

    /// Orchestrate a turn over `state` by hand.
    pub fn thoughts<'a>(&'a self, state: &'a mut State) -> Thoughts<'a> {
        Thoughts::new(state, &self.registry, &self.adapters)
    }

    /// Process an inbound message and return the finished turn.
    pub async fn receive(&self, message: impl Into<Message>) -> Result<State, CogentError> {
        let mut state = State::new(message);
        self.thoughts(&mut state).start(Flow::Receive).await?;
        Ok(state)
    }

    /// Deliver the pending envelopes of `state`.
    pub async fn respond(&self, state: &mut State) -> Result<(), CogentError> {
        self.thoughts(state).start(Flow::Respond).await
    }

    /// Deliver a proactive envelope and remember the turn.
    pub async fn dispatch(&self, envelope: Envelope) -> Result<State, CogentError> {
        let mut state = State::for_envelope(envelope);
        self.thoughts(&mut state).start(Flow::Dispatch).await?;
        Ok(state)
    }
}

/// Builder for a [`Bot`].
///
/// Without an explicit registry the bot gets a fresh one of its own; pass
/// [`registry::global`](cogent_std::registry::global) to share the
/// process-wide registry.
#[derive(Debug, Default)]
#[must_use]
pub struct BotBuilder {
    registry: Option<Arc<Registry>>,
    adapters: Adapters,
}

impl BotBuilder {
    /// Run the stages of `registry`.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace every adapter at once.
    pub fn adapters(mut self, adapters: Adapters) -> Self {
        self.adapters = adapters;
        self
    }

    /// Deliver envelopes through `adapter`.
    pub fn message(mut self, adapter: impl MessageAdapter + 'static) -> Self {
        self.adapters = self.adapters.with_message(adapter);
        self
    }

    /// Understand text through `adapter`.
    pub fn language(mut self, adapter: impl LanguageAdapter + 'static) -> Self {
        self.adapters = self.adapters.with_language(adapter);
        self
    }

    /// Keep turns through `adapter`.
    pub fn storage(mut self, adapter: impl StorageAdapter + 'static) -> Self {
        self.adapters = self.adapters.with_storage(adapter);
        self
    }

    /// Build the bot.
    pub fn build(self) -> Bot {
        Bot {
            registry: self.registry.unwrap_or_default(),
            adapters: self.adapters,
        }
    }
}
