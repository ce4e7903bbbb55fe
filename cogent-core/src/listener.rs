//! # Listeners
//!
//! A listener pairs a matcher with a callback. The matcher inspects the
//! turn's [`State`] and decides whether the listener applies; the callback
//! then acts on the state, typically by queueing a response or finishing the
//! turn.
//!
//! Listeners are evaluated in registration order by a listener collection.
//! By default the first match wins; a listener registered with
//! [`ListenerOptions::force`] still runs after an earlier match, unless the
//! turn was finished.

use crate::{error::BoxError, state::State};
use futures::future::BoxFuture;
use std::future::Future;

/// Registration options for a listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Run even when an earlier listener in the same pass matched.
    pub force: bool,
    /// Tag for envelopes produced by the callback.
    pub id: Option<String>,
}

impl ListenerOptions {
    /// Default options: not forced, no id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a forced listener.
    pub fn forced() -> Self {
        Self::new().with_force(true)
    }

    /// Set the force flag.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the listener id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A predicate over the turn state plus the callback to run when it holds.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Listeners must implement `matches(&State)` and `on_match(&mut State)`."
)]
pub trait Listener: Send + Sync + 'static {
    /// Decide whether this listener applies to the state.
    fn matches(&self, state: &State) -> impl Future<Output = Result<bool, BoxError>> + Send;

    /// Act on a matched state.
    fn on_match(&self, state: &mut State) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Object-safe version of [`Listener`].
pub trait DynListener: Send + Sync + 'static {
    /// Decide whether this listener applies (dynamic dispatch version).
    fn matches_dyn<'a>(&'a self, state: &'a State) -> BoxFuture<'a, Result<bool, BoxError>>;

    /// Act on a matched state (dynamic dispatch version).
    fn on_match_dyn<'a>(&'a self, state: &'a mut State) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<L: Listener> DynListener for L {
    fn matches_dyn<'a>(&'a self, state: &'a State) -> BoxFuture<'a, Result<bool, BoxError>> {
        Box::pin(self.matches(state))
    }

    fn on_match_dyn<'a>(&'a self, state: &'a mut State) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.on_match(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, User};

    struct Echo;

    impl Listener for Echo {
        async fn matches(&self, state: &State) -> Result<bool, BoxError> {
            Ok(state.message.as_text().is_some())
        }

        async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
            let text = state.message.as_text().map(|m| m.text.clone()).unwrap_or_default();
            state.respond(text);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_listener_through_dyn() {
        let listener: Box<dyn DynListener> = Box::new(Echo);
        let mut state = State::new(Message::text(User::new("u"), "foo"));

        assert!(listener.matches_dyn(&state).await.unwrap());
        listener.on_match_dyn(&mut state).await.unwrap();
        assert_eq!(state.envelopes()[0].strings(), ["foo"]);

        let enter = State::new(Message::enter(User::new("u")));
        assert!(!listener.matches_dyn(&enter).await.unwrap());
    }

    #[test]
    fn test_options_builders() {
        let options = ListenerOptions::forced().with_id("log");
        assert!(options.force);
        assert_eq!(options.id.as_deref(), Some("log"));
        assert_eq!(ListenerOptions::new(), ListenerOptions::default());
    }
}
