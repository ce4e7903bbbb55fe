//! # cogent-std
//!
//! Standard implementations for the Cogent conversation pipeline.
//!
//! This crate provides:
//! - **Middleware**: [`Middleware`](middleware::Middleware) chains of steps
//! - **Listeners**: [`Listeners`](listeners::Listeners) collections plus custom,
//!   async, text, intent and catch-all listeners
//! - **Registry**: per-stage registration, [`registry::global`]
//! - **Adapters**: message, language and storage contracts
//! - **Standard steps**: Logging, Timeout and the adapter steps
//! - **Testing**: recording doubles in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use cogent_core;

// Modules
pub mod adapters;
pub mod listeners;
pub mod middleware;
pub mod registry;
pub mod steps;
pub mod testing;
