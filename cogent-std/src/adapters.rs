//! Adapter contracts.
//!
//! Adapters connect the pipeline to the outside world: a message adapter
//! delivers envelopes, a language adapter understands text, and a storage
//! adapter persists turns. All three are optional; a missing adapter simply
//! skips the stage that needs it.

use async_trait::async_trait;
use cogent_core::{BoxError, Envelope, NaturalLanguageResults, TextMessage};
use std::{fmt, sync::Arc};

/// Collection name under which turn snapshots are kept.
pub const STATES_COLLECTION: &str = "states";

/// Delivers envelopes to a chat platform.
#[async_trait]
pub trait MessageAdapter: Send + Sync {
    /// Adapter name, for logging.
    fn name(&self) -> &str;

    /// Deliver one envelope.
    async fn dispatch(&self, envelope: &Envelope) -> Result<(), BoxError>;
}

/// Extracts intents, entities and language from text.
#[async_trait]
pub trait LanguageAdapter: Send + Sync {
    /// Adapter name, for logging.
    fn name(&self) -> &str;

    /// Understand a text message.
    async fn process(&self, message: &TextMessage) -> Result<NaturalLanguageResults, BoxError>;
}

/// Persists records.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Adapter name, for logging.
    fn name(&self) -> &str;

    /// Store `record` in `collection`.
    async fn keep(&self, collection: &str, record: serde_json::Value) -> Result<(), BoxError>;
}

/// The adapters configured for a bot.
#[derive(Clone, Default)]
pub struct Adapters {
    /// Outbound delivery.
    pub message: Option<Arc<dyn MessageAdapter>>,
    /// Language understanding.
    pub language: Option<Arc<dyn LanguageAdapter>>,
    /// Persistence.
    pub storage: Option<Arc<dyn StorageAdapter>>,
}

impl Adapters {
    /// No adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message adapter.
    pub fn with_message(mut self, adapter: impl MessageAdapter + 'static) -> Self {
        self.message = Some(Arc::new(adapter));
        self
    }

    /// Set the language adapter.
    pub fn with_language(mut self, adapter: impl LanguageAdapter + 'static) -> Self {
        self.language = Some(Arc::new(adapter));
        self
    }

    /// Set the storage adapter.
    pub fn with_storage(mut self, adapter: impl StorageAdapter + 'static) -> Self {
        self.storage = Some(Arc::new(adapter));
        self
    }
}

impl fmt::Debug for Adapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapters")
            .field("message", &self.message.as_ref().map(|a| a.name().to_owned()))
            .field("language", &self.language.as_ref().map(|a| a.name().to_owned()))
            .field("storage", &self.storage.as_ref().map(|a| a.name().to_owned()))
            .finish()
    }
}
