//! Timeout step for time-limited middleware.

use cogent_core::{BoxError, State, Step, StepResult};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Error returned when a wrapped step runs out of time.
#[derive(Debug, Clone, Error)]
#[error("middleware step timed out after {0:?}")]
pub struct StepTimeout(pub Duration);

/// A step that wraps another step with a timeout.
///
/// The pipeline itself never times out; wrap slow steps (remote lookups,
/// rate limiters) with this to bound them.
pub struct TimeoutStep<S> {
    inner: S,
    duration: Duration,
}

impl<S> TimeoutStep<S> {
    /// Create a new timeout step.
    pub fn new(inner: S, duration: Duration) -> Self {
        Self { inner, duration }
    }
}

impl<S: Step> Step for TimeoutStep<S> {
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        match timeout(self.duration, self.inner.handle(state)).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(StepTimeout(self.duration))),
        }
    }
}
