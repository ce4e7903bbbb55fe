//! Closure-based listeners.

use cogent_core::{BoxError, Listener, State};
use futures::future::BoxFuture;

/// A listener built from a synchronous predicate and callback.
///
/// # Example
///
/// ```rust,ignore
/// let listener = CustomListener::new(
///     |state: &State| state.message.as_text().is_some_and(|m| m.text == "ping"),
///     |state: &mut State| { state.respond("pong"); },
/// );
/// ```
pub struct CustomListener<M, C> {
    matcher: M,
    callback: C,
}

impl<M, C> CustomListener<M, C> {
    /// Create a custom listener.
    pub fn new(matcher: M, callback: C) -> Self
    where
        M: Fn(&State) -> bool + Send + Sync + 'static,
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        Self { matcher, callback }
    }
}

impl<M, C> Listener for CustomListener<M, C>
where
    M: Fn(&State) -> bool + Send + Sync + 'static,
    C: Fn(&mut State) + Send + Sync + 'static,
{
    async fn matches(&self, state: &State) -> Result<bool, BoxError> {
        Ok((self.matcher)(state))
    }

    async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
        (self.callback)(state);
        Ok(())
    }
}

/// A listener whose predicate and callback are asynchronous.
///
/// Both closures return boxed futures borrowing the state; use
/// [`FutureExt::boxed`](futures::FutureExt::boxed) to build them.
pub struct AsyncListener<M, C> {
    matcher: M,
    callback: C,
}

impl<M, C> AsyncListener<M, C> {
    /// Create an async listener.
    pub fn new(matcher: M, callback: C) -> Self
    where
        M: for<'a> Fn(&'a State) -> BoxFuture<'a, bool> + Send + Sync + 'static,
        C: for<'a> Fn(&'a mut State) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        Self { matcher, callback }
    }
}

impl<M, C> Listener for AsyncListener<M, C>
where
    M: for<'a> Fn(&'a State) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    C: for<'a> Fn(&'a mut State) -> BoxFuture<'a, ()> + Send + Sync + 'static,
{
    async fn matches(&self, state: &State) -> Result<bool, BoxError> {
        Ok((self.matcher)(state).await)
    }

    async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
        (self.callback)(state).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogent_core::{Message, User};
    use futures::FutureExt;

    #[tokio::test]
    async fn test_custom_listener() {
        let listener = CustomListener::new(
            |state: &State| state.message.as_text().is_some_and(|m| m.text == "ping"),
            |state: &mut State| {
                state.respond("pong");
            },
        );

        let mut state = State::new(Message::text(User::new("u"), "ping"));
        assert!(listener.matches(&state).await.unwrap());
        listener.on_match(&mut state).await.unwrap();
        assert_eq!(state.envelopes()[0].strings(), ["pong"]);

        let other = State::new(Message::text(User::new("u"), "pong"));
        assert!(!listener.matches(&other).await.unwrap());
    }

    #[tokio::test]
    async fn test_async_listener() {
        let listener = AsyncListener::new(
            |state: &State| async move { state.extra("ready").is_some() }.boxed(),
            |state: &mut State| {
                async move {
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    state.finish();
                }
                .boxed()
            },
        );

        let mut state = State::new(Message::enter(User::new("u"))).with_extra("ready", true);
        assert!(listener.matches(&state).await.unwrap());
        listener.on_match(&mut state).await.unwrap();
        assert!(state.is_done());
    }
}
