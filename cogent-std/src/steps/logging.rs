//! Logging step for state observation.

use cogent_core::{BoxError, State, Step, StepResult};

/// A step that logs the state for debugging/observation and continues.
///
/// # Example
///
/// ```rust,ignore
/// registry.hear_middleware(LoggingStep::named("inbound"));
/// ```
pub struct LoggingStep {
    name: &'static str,
}

impl LoggingStep {
    /// Create a new `LoggingStep` with a default name.
    pub fn new() -> Self {
        Self { name: "state" }
    }

    /// Create a new `LoggingStep` with a custom name.
    ///
    /// The name is used in log records to identify where in the pipeline the
    /// step sits.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingStep {
    fn default() -> Self {
        Self::new()
    }
}

impl Step for LoggingStep {
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        tracing::debug!(
            step = %self.name,
            message = %state.message.id(),
            user = %state.message.user().id,
            processed = ?state.processed().stages().collect::<Vec<_>>(),
            envelopes = state.envelopes().len(),
            done = state.is_done(),
            "observed state"
        );
        Ok(StepResult::Continue)
    }
}
