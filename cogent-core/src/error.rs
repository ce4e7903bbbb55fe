//! Error types for Cogent.
//!
//! Only genuine failures are errors. An aborted middleware chain, an
//! unmatched listener pass or a missing adapter are ordinary outcomes and
//! surface as a `false` completion flag instead.

use thiserror::Error;

/// A boxed error type for user-supplied fallible code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Cogent operations.
#[derive(Error, Debug)]
pub enum CogentError {
    /// No middleware is registered or supplied for the stage.
    #[error("no middleware registered for stage `{stage}`")]
    Configuration {
        /// The stage name that failed to resolve.
        stage: String,
    },

    /// A middleware step failed.
    #[error("middleware step failed in stage `{stage}`")]
    Middleware {
        /// The stage whose middleware was running.
        stage: String,
        /// The underlying step error.
        #[source]
        source: BoxError,
    },

    /// A listener's matcher or callback failed.
    #[error("listener `{name}` failed")]
    Listener {
        /// The name the listener was registered under.
        name: String,
        /// The underlying listener error.
        #[source]
        source: BoxError,
    },

    /// An adapter call (dispatch, process or keep) failed.
    #[error("{adapter} adapter failed")]
    Adapter {
        /// Which adapter failed.
        adapter: &'static str,
        /// The underlying adapter error.
        #[source]
        source: BoxError,
    },
}

impl CogentError {
    /// Build a configuration error for a stage name.
    pub fn configuration(stage: impl Into<String>) -> Self {
        Self::Configuration {
            stage: stage.into(),
        }
    }

    /// Returns `true` for errors raised while resolving stage configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
