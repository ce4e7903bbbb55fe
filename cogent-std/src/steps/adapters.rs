//! Steps that hand the state to an adapter.
//!
//! The orchestrator appends (or prepends) these to a stage's registered
//! middleware, so the adapter call is part of the chain: a failing adapter
//! fails the stage and it records no timestamp.

use crate::adapters::{LanguageAdapter, MessageAdapter, StorageAdapter};
use cogent_core::{BoxError, CogentError, State, Step, StepResult};
use std::sync::Arc;

fn adapter_error(adapter: &'static str, source: BoxError) -> BoxError {
    Box::new(CogentError::Adapter { adapter, source })
}

/// Dispatches every pending envelope through the message adapter.
pub struct DispatchStep {
    adapter: Arc<dyn MessageAdapter>,
}

impl DispatchStep {
    /// Dispatch through `adapter`.
    pub fn new(adapter: Arc<dyn MessageAdapter>) -> Self {
        Self { adapter }
    }
}

impl Step for DispatchStep {
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        for envelope in state.envelopes_mut() {
            if envelope.is_dispatched() {
                continue;
            }
            self.adapter
                .dispatch(envelope)
                .await
                .map_err(|source| adapter_error("message", source))?;
            envelope.mark_dispatched();
            tracing::debug!(
                adapter = %self.adapter.name(),
                envelope = %envelope.id,
                listener = ?envelope.listener_id,
                "envelope dispatched"
            );
        }
        Ok(StepResult::Continue)
    }
}

/// Merges the language adapter's understanding into the text message.
///
/// Non-text messages pass through untouched.
pub struct UnderstandStep {
    adapter: Arc<dyn LanguageAdapter>,
}

impl UnderstandStep {
    /// Understand through `adapter`.
    pub fn new(adapter: Arc<dyn LanguageAdapter>) -> Self {
        Self { adapter }
    }
}

impl Step for UnderstandStep {
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        let Some(message) = state.message.as_text() else {
            return Ok(StepResult::Continue);
        };
        let results = self
            .adapter
            .process(message)
            .await
            .map_err(|source| adapter_error("language", source))?;
        if let Some(message) = state.message.as_text_mut() {
            message.add_nlu(results);
        }
        Ok(StepResult::Continue)
    }
}

/// Persists a snapshot of the state through the storage adapter.
pub struct KeepStep {
    adapter: Arc<dyn StorageAdapter>,
    collection: String,
}

impl KeepStep {
    /// Keep snapshots in `collection` through `adapter`.
    pub fn new(adapter: Arc<dyn StorageAdapter>, collection: impl Into<String>) -> Self {
        Self {
            adapter,
            collection: collection.into(),
        }
    }
}

impl Step for KeepStep {
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        let snapshot = state.snapshot()?;
        self.adapter
            .keep(&self.collection, snapshot)
            .await
            .map_err(|source| adapter_error("storage", source))?;
        tracing::debug!(
            adapter = %self.adapter.name(),
            collection = %self.collection,
            message = %state.message.id(),
            "state kept"
        );
        Ok(StepResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::STATES_COLLECTION,
        testing::{RecordingMessenger, RecordingStorage, StaticLanguage},
    };
    use cogent_core::{
        Message, NaturalLanguageResult, NaturalLanguageResults, NluCandidate, NluKind, User,
    };

    fn state() -> State {
        State::new(Message::text(User::new("test-user"), "foo"))
    }

    #[tokio::test]
    async fn test_dispatch_sends_pending_once() {
        let messenger = RecordingMessenger::new();
        let step = DispatchStep::new(Arc::new(messenger.clone()));
        let mut state = state();
        state.respond("A");
        state.respond("B");

        step.handle(&mut state).await.unwrap();
        step.handle(&mut state).await.unwrap();

        let sent: Vec<_> = messenger.dispatched().iter().map(|e| e.strings().to_vec()).collect();
        assert_eq!(sent, vec![vec!["A".to_string()], vec!["B".to_string()]]);
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_adapter_error() {
        let messenger = RecordingMessenger::failing("offline");
        let step = DispatchStep::new(Arc::new(messenger));
        let mut state = state();
        state.respond("A");

        let err = step.handle(&mut state).await.unwrap_err();
        let err = err.downcast::<CogentError>().unwrap();
        assert!(matches!(*err, CogentError::Adapter { adapter: "message", .. }));
        assert!(state.has_pending());
    }

    #[tokio::test]
    async fn test_understand_merges_results() {
        let language = StaticLanguage::new(NaturalLanguageResults::new().with(
            NluKind::Intent,
            NaturalLanguageResult::new().add(NluCandidate::new("test")),
        ));
        let step = UnderstandStep::new(Arc::new(language.clone()));
        let mut state = state();

        step.handle(&mut state).await.unwrap();

        assert!(state.message.as_text().unwrap().has_nlu(NluKind::Intent, "test"));
        assert_eq!(language.calls()[0].text, "foo");
    }

    #[tokio::test]
    async fn test_understand_skips_events() {
        let language = StaticLanguage::default();
        let step = UnderstandStep::new(Arc::new(language.clone()));
        let mut state = State::new(Message::enter(User::new("u")));

        assert_eq!(step.handle(&mut state).await.unwrap(), StepResult::Continue);
        assert!(language.calls().is_empty());
    }

    #[tokio::test]
    async fn test_keep_stores_snapshot() {
        let storage = RecordingStorage::new();
        let step = KeepStep::new(Arc::new(storage.clone()), STATES_COLLECTION);
        let mut state = state();

        step.handle(&mut state).await.unwrap();

        let kept = storage.kept();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "states");
        assert_eq!(kept[0].1["message"]["text"], "foo");
    }
}
