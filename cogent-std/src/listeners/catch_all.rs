//! Fallback listener for unmatched messages.

use cogent_core::{BoxError, Listener, State};

/// A listener that matches only catch-all messages.
///
/// The act stage wraps a message nothing else matched into a catch-all, so
/// registering this listener in the act collection gives the bot a fallback
/// reply.
pub struct CatchAllListener<C> {
    callback: C,
}

impl<C> CatchAllListener<C> {
    /// Create a catch-all listener.
    pub fn new(callback: C) -> Self
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        Self { callback }
    }
}

impl<C> Listener for CatchAllListener<C>
where
    C: Fn(&mut State) + Send + Sync + 'static,
{
    async fn matches(&self, state: &State) -> Result<bool, BoxError> {
        Ok(state.message.is_catch_all())
    }

    async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
        (self.callback)(state);
        Ok(())
    }
}
