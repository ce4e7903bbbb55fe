//! Middleware chains.

use cogent_core::{BoxError, DynStep, State, Step, StepResult};
use std::{fmt, sync::Arc};

/// A named, ordered chain of middleware steps.
///
/// Cloning is cheap: steps are shared handles. A stage that needs an extra
/// step (for example the adapter call of the respond stage) runs an extended
/// clone built with [`with_step`](Self::with_step) and leaves the registered
/// chain untouched.
#[derive(Clone)]
pub struct Middleware {
    name: String,
    steps: Vec<Arc<dyn DynStep>>,
}

impl Middleware {
    /// Create an empty chain for a stage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// The stage name this chain belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a step.
    pub fn register<S: Step>(&mut self, step: S) -> &mut Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append an already shared step.
    pub fn register_shared(&mut self, step: Arc<dyn DynStep>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// A copy of this chain with `step` appended.
    pub fn with_step<S: Step>(&self, step: S) -> Self {
        let mut extended = self.clone();
        extended.register(step);
        extended
    }

    /// A copy of this chain with `step` placed first.
    pub fn with_first_step<S: Step>(&self, step: S) -> Self {
        let mut steps: Vec<Arc<dyn DynStep>> = Vec::with_capacity(self.steps.len() + 1);
        steps.push(Arc::new(step));
        steps.extend(self.steps.iter().cloned());
        Self {
            name: self.name.clone(),
            steps,
        }
    }

    /// Run every step in order.
    ///
    /// Returns `Ok(true)` when the end of the chain was reached and
    /// `Ok(false)` when a step aborted. A failing step stops the chain and
    /// its error is returned.
    pub async fn execute(&self, state: &mut State) -> Result<bool, BoxError> {
        for (index, step) in self.steps.iter().enumerate() {
            match step.handle_dyn(state).await? {
                StepResult::Continue => continue,
                StepResult::Abort => {
                    tracing::debug!(middleware = %self.name, step = index, "middleware aborted");
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}
