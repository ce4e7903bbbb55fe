//! # Middleware Steps
//!
//! The smallest unit of stage processing. A middleware is an ordered chain of
//! steps; each one receives the turn's [`State`], may mutate it, and decides
//! whether the chain continues.
//!
//! # Contract
//!
//! - [`StepResult::Continue`] hands over to the next step. When the last step
//!   continues, the chain is complete.
//! - [`StepResult::Abort`] stops the chain. The stage does not complete and
//!   leaves no timestamp.
//! - An `Err` stops the chain and is propagated to the caller.
//!
//! Returning a value instead of calling continuations means a step can never
//! continue and abort at once, or forget to do either.

use crate::{error::BoxError, state::State};
use futures::future::BoxFuture;
use std::future::Future;

/// Outcome of a single middleware step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Hand over to the next step.
    Continue,
    /// Stop the chain without completing it.
    Abort,
}

impl From<bool> for StepResult {
    /// `true` continues, `false` aborts.
    fn from(proceed: bool) -> Self {
        if proceed { Self::Continue } else { Self::Abort }
    }
}

/// A middleware step.
///
/// Plain closures `Fn(&mut State) -> StepResult` implement this trait, so
/// simple steps need no boilerplate:
///
/// ```rust,ignore
/// middleware.register(|state: &mut State| {
///     state.set_extra("heard", true);
///     StepResult::Continue
/// });
/// ```
///
/// This trait uses native `async fn` for static dispatch. Middleware chains
/// store steps as [`DynStep`] trait objects.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a middleware `Step`",
    label = "missing `Step` implementation",
    note = "Steps must implement `handle(&self, &mut State)`, or be a closure `Fn(&mut State) -> StepResult`."
)]
pub trait Step: Send + Sync + 'static {
    /// Process the state and decide whether the chain continues.
    fn handle(
        &self,
        state: &mut State,
    ) -> impl Future<Output = Result<StepResult, BoxError>> + Send;
}

/// Object-safe version of [`Step`].
pub trait DynStep: Send + Sync + 'static {
    /// Process the state (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        state: &'a mut State,
    ) -> BoxFuture<'a, Result<StepResult, BoxError>>;
}

impl<T: Step> DynStep for T {
    fn handle_dyn<'a>(
        &'a self,
        state: &'a mut State,
    ) -> BoxFuture<'a, Result<StepResult, BoxError>> {
        Box::pin(self.handle(state))
    }
}

// Blanket impl for synchronous closures.
impl<F> Step for F
where
    F: Fn(&mut State) -> StepResult + Send + Sync + 'static,
{
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        Ok((self)(state))
    }
}

/// A step built from an asynchronous, fallible closure.
///
/// ```rust,ignore
/// use futures::FutureExt;
///
/// let step = AsyncStep::new(|state: &mut State| {
///     async move {
///         lookup_user(state).await?;
///         Ok(StepResult::Continue)
///     }
///     .boxed()
/// });
/// ```
pub struct AsyncStep<F> {
    func: F,
}

impl<F> AsyncStep<F>
where
    F: for<'a> Fn(&'a mut State) -> BoxFuture<'a, Result<StepResult, BoxError>>
        + Send
        + Sync
        + 'static,
{
    /// Wrap an async closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Step for AsyncStep<F>
where
    F: for<'a> Fn(&'a mut State) -> BoxFuture<'a, Result<StepResult, BoxError>>
        + Send
        + Sync
        + 'static,
{
    fn handle(
        &self,
        state: &mut State,
    ) -> impl Future<Output = Result<StepResult, BoxError>> + Send {
        (self.func)(state)
    }
}
