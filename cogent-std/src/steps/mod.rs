//! Standard middleware steps.

pub mod adapters;
pub mod logging;
#[cfg(feature = "timeout")]
pub mod timeout;

pub use adapters::{DispatchStep, KeepStep, UnderstandStep};
pub use logging::LoggingStep;
#[cfg(feature = "timeout")]
pub use timeout::{StepTimeout, TimeoutStep};
