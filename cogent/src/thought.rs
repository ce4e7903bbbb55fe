//! Single-stage execution.
//!
//! A [`Thought`] runs one named stage against a state: validate, run the
//! stage's middleware, optionally evaluate listeners, record the stage's
//! timestamp on completion and report the outcome to an action callback.

use cogent_core::{BoxError, CogentError, State};
use cogent_std::{listeners::Listeners, middleware::Middleware, registry::Registry};
use std::{fmt, sync::Arc};

type Validate = Box<dyn Fn(&State) -> bool + Send + Sync>;
type Action = Box<dyn FnOnce(bool) + Send + Sync>;

/// Builder for a [`Thought`].
///
/// # Example
///
/// ```rust,ignore
/// let thought = Thought::builder("listen")
///     .listeners(listeners)
///     .action(|completed| println!("listen completed: {completed}"))
///     .build(&registry)?;
/// let completed = thought.process(&mut state).await?;
/// ```
#[must_use = "a thought does nothing until it is built and processed"]
pub struct ThoughtBuilder {
    name: String,
    validate: Option<Validate>,
    middleware: Option<Arc<Middleware>>,
    listeners: Option<Arc<Listeners>>,
    action: Option<Action>,
}

impl ThoughtBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validate: None,
            middleware: None,
            listeners: None,
            action: None,
        }
    }

    /// Only run when `validate` accepts the state.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Run `middleware` instead of the chain registered for the stage.
    pub fn middleware(mut self, middleware: impl Into<Arc<Middleware>>) -> Self {
        self.middleware = Some(middleware.into());
        self
    }

    /// Evaluate `listeners` after the middleware completes.
    pub fn listeners(mut self, listeners: impl Into<Arc<Listeners>>) -> Self {
        self.listeners = Some(listeners.into());
        self
    }

    /// Call `action` with the completion flag once processing ends.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: FnOnce(bool) + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Resolve the middleware and build the thought.
    ///
    /// # Errors
    ///
    /// Returns [`CogentError::Configuration`] when no middleware was supplied
    /// and none is registered for the stage.
    pub fn build(self, registry: &Registry) -> Result<Thought, CogentError> {
        let middleware = match self.middleware {
            Some(middleware) => middleware,
            None => registry
                .middleware(&self.name)
                .ok_or_else(|| CogentError::configuration(&self.name))?,
        };
        Ok(Thought {
            name: self.name,
            validate: self.validate,
            middleware,
            listeners: self.listeners,
            action: self.action,
        })
    }
}

/// One stage of a turn, ready to process a state.
pub struct Thought {
    name: String,
    validate: Option<Validate>,
    middleware: Arc<Middleware>,
    listeners: Option<Arc<Listeners>>,
    action: Option<Action>,
}

impl Thought {
    /// Start building a thought for the stage `name`.
    pub fn builder(name: impl Into<String>) -> ThoughtBuilder {
        ThoughtBuilder::new(name)
    }

    /// The stage name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process the state through this stage.
    ///
    /// Resolves to `true` when the stage completed and its timestamp was
    /// recorded. The action, if any, is called exactly once with the same
    /// flag, and with `false` before an error is returned.
    pub async fn process(mut self, state: &mut State) -> Result<bool, CogentError> {
        let action = self.action.take();
        let outcome = self.run(state).await;
        let completed = matches!(outcome, Ok(true));
        tracing::debug!(stage = %self.name, completed, "stage finished");
        if let Some(action) = action {
            action(completed);
        }
        outcome
    }

    async fn run(&self, state: &mut State) -> Result<bool, CogentError> {
        if let Some(validate) = &self.validate {
            if !validate(state) {
                tracing::debug!(stage = %self.name, "validation rejected state");
                return Ok(false);
            }
        }
        if self.listeners.as_ref().is_some_and(|listeners| listeners.is_empty()) {
            tracing::debug!(stage = %self.name, "no listeners");
            return Ok(false);
        }

        tracing::debug!(stage = %self.name, steps = self.middleware.len(), "stage started");
        let completed = self
            .middleware
            .execute(state)
            .await
            .map_err(|source| self.step_error(source))?;
        if !completed {
            return Ok(false);
        }

        let Some(listeners) = &self.listeners else {
            state.record(&self.name);
            return Ok(true);
        };
        let matched = listeners.process(state).await?;
        if matched && !state.is_done() {
            state.record(&self.name);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn step_error(&self, source: BoxError) -> CogentError {
        match source.downcast::<CogentError>() {
            Ok(error) => *error,
            Err(source) => CogentError::Middleware {
                stage: self.name.clone(),
                source,
            },
        }
    }
}

impl fmt::Debug for Thought {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thought")
            .field("name", &self.name)
            .field("middleware", &self.middleware)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
