//! Turn orchestration.
//!
//! [`Thoughts`] sequences the stages of a turn: `hear`, `listen`,
//! `understand`, `act`, `respond` and `remember`. Which stages run depends on
//! the [`Flow`], on the outcome of earlier stages and on the configured
//! adapters.

use crate::thought::Thought;
use cogent_core::{CogentError, State, stage};
use cogent_std::{
    adapters::{Adapters, STATES_COLLECTION},
    listeners::Listeners,
    middleware::Middleware,
    registry::Registry,
    steps::{DispatchStep, KeepStep, UnderstandStep},
};
use std::{fmt, sync::Arc};

/// The sequence of stages a turn goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Process an inbound message: hear, listen, understand, act, then
    /// respond and remember as needed.
    Receive,
    /// Deliver pending envelopes only.
    Respond,
    /// Deliver a proactive envelope and remember it.
    Dispatch,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Receive => "receive",
            Self::Respond => "respond",
            Self::Dispatch => "dispatch",
        })
    }
}

/// Orchestrates the stages of one turn over a state.
///
/// A state that is finished by any stage ends the turn after that stage.
pub struct Thoughts<'a> {
    state: &'a mut State,
    registry: &'a Registry,
    adapters: &'a Adapters,
    listeners: Option<Arc<Listeners>>,
}

impl<'a> Thoughts<'a> {
    /// Orchestrate `state` with the stages of `registry` and the given
    /// adapters.
    pub fn new(state: &'a mut State, registry: &'a Registry, adapters: &'a Adapters) -> Self {
        Self {
            state,
            registry,
            adapters,
            listeners: None,
        }
    }

    /// Listen with `listeners` instead of the registered listen set.
    ///
    /// The registered `understand` and `act` sets are not consulted for a
    /// turn with its own listeners.
    pub fn with_listeners(mut self, listeners: impl Into<Arc<Listeners>>) -> Self {
        self.listeners = Some(listeners.into());
        self
    }

    /// Run the stages of `flow`.
    ///
    /// # Errors
    ///
    /// Fails with the first stage error: a missing middleware chain, a failing
    /// step or listener, or a failing adapter. Stages after the failing one do
    /// not run.
    pub async fn start(mut self, flow: Flow) -> Result<(), CogentError> {
        tracing::debug!(%flow, message = %self.state.message.id(), "turn started");
        match flow {
            Flow::Receive => self.receive().await?,
            Flow::Respond => {
                self.respond().await?;
            }
            Flow::Dispatch => self.dispatch().await?,
        }
        tracing::debug!(
            %flow,
            processed = ?self.state.processed().stages().collect::<Vec<_>>(),
            "turn finished"
        );
        Ok(())
    }

    async fn receive(&mut self) -> Result<(), CogentError> {
        let heard = Thought::builder(stage::HEAR)
            .build(self.registry)?
            .process(self.state)
            .await?;
        if !heard || self.stopped(stage::HEAR) {
            return Ok(());
        }

        let listened = self.listen().await?;
        if self.stopped(stage::LISTEN) {
            return Ok(());
        }

        let understood = !listened && self.understand().await?;
        if self.stopped(stage::UNDERSTAND) {
            return Ok(());
        }

        if !listened && !understood {
            self.act().await?;
            if self.stopped(stage::ACT) {
                return Ok(());
            }
        }

        if self.state.has_pending() {
            self.respond().await?;
            if self.stopped(stage::RESPOND) {
                return Ok(());
            }
        }

        if listened || understood || !self.state.envelopes().is_empty() {
            self.remember().await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self) -> Result<(), CogentError> {
        self.respond().await?;
        if self.stopped(stage::RESPOND) {
            return Ok(());
        }
        if !self.state.envelopes().is_empty() {
            self.remember().await?;
        }
        Ok(())
    }

    async fn listen(&mut self) -> Result<bool, CogentError> {
        let listeners = match &self.listeners {
            Some(listeners) => Arc::clone(listeners),
            None => self.registered_listeners(stage::LISTEN),
        };
        Thought::builder(stage::LISTEN)
            .listeners(listeners)
            .build(self.registry)?
            .process(self.state)
            .await
    }

    async fn understand(&mut self) -> Result<bool, CogentError> {
        if self.listeners.is_some() {
            tracing::trace!(stage = stage::UNDERSTAND, "turn has its own listeners");
            return Ok(false);
        }
        let Some(language) = &self.adapters.language else {
            tracing::trace!(stage = stage::UNDERSTAND, "no language adapter");
            return Ok(false);
        };
        if !self.state.message.as_text().is_some_and(|message| !message.is_blank()) {
            tracing::trace!(stage = stage::UNDERSTAND, "no text to understand");
            return Ok(false);
        }

        let middleware = self
            .stage_middleware(stage::UNDERSTAND)?
            .with_first_step(UnderstandStep::new(Arc::clone(language)));
        Thought::builder(stage::UNDERSTAND)
            .middleware(middleware)
            .listeners(self.registered_listeners(stage::UNDERSTAND))
            .build(self.registry)?
            .process(self.state)
            .await
    }

    async fn act(&mut self) -> Result<bool, CogentError> {
        if self.listeners.is_some() {
            tracing::trace!(stage = stage::ACT, "turn has its own listeners");
            return Ok(false);
        }
        self.state.catch_all();
        Thought::builder(stage::ACT)
            .listeners(self.registered_listeners(stage::ACT))
            .build(self.registry)?
            .process(self.state)
            .await
    }

    async fn respond(&mut self) -> Result<bool, CogentError> {
        let Some(messenger) = &self.adapters.message else {
            tracing::warn!(stage = stage::RESPOND, "no message adapter, envelopes not delivered");
            return Ok(false);
        };
        let middleware = self
            .stage_middleware(stage::RESPOND)?
            .with_step(DispatchStep::new(Arc::clone(messenger)));
        Thought::builder(stage::RESPOND)
            .middleware(middleware)
            .build(self.registry)?
            .process(self.state)
            .await
    }

    async fn remember(&mut self) -> Result<bool, CogentError> {
        let Some(storage) = &self.adapters.storage else {
            tracing::trace!(stage = stage::REMEMBER, "no storage adapter");
            return Ok(false);
        };
        let middleware = self
            .stage_middleware(stage::REMEMBER)?
            .with_step(KeepStep::new(Arc::clone(storage), STATES_COLLECTION));
        Thought::builder(stage::REMEMBER)
            .middleware(middleware)
            .build(self.registry)?
            .process(self.state)
            .await
    }

    fn stage_middleware(&self, name: &str) -> Result<Arc<Middleware>, CogentError> {
        self.registry
            .middleware(name)
            .ok_or_else(|| CogentError::configuration(name))
    }

    fn registered_listeners(&self, name: &str) -> Arc<Listeners> {
        self.registry.listeners(name).unwrap_or_default()
    }

    fn stopped(&self, after: &str) -> bool {
        let done = self.state.is_done();
        if done {
            tracing::debug!(stage = after, "state finished, ending turn");
        }
        done
    }
}

impl fmt::Debug for Thoughts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thoughts")
            .field("state", &self.state)
            .field("adapters", &self.adapters)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
