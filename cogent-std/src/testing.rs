//! Test doubles for steps, listeners and adapters.
//!
//! Every double is cheap to clone and clones share their recordings, so a
//! test keeps one handle for assertions and moves the other into a registry
//! or adapter set.
//!
//! - [`RecordingStep`]: a step that records the messages it saw
//! - [`SpyListener`]: a listener with a programmable match result
//! - [`RecordingMessenger`]: a message adapter that keeps dispatched envelopes
//! - [`StaticLanguage`]: a language adapter returning fixed results
//! - [`RecordingStorage`]: a storage adapter that keeps records in memory

use crate::adapters::{LanguageAdapter, MessageAdapter, StorageAdapter};
use async_trait::async_trait;
use cogent_core::{
    BoxError, Envelope, Listener, NaturalLanguageResults, State, Step, StepResult, TextMessage,
};
use std::sync::{Arc, Mutex};

fn fail(error: &Option<String>) -> Result<(), BoxError> {
    match error {
        Some(message) => Err(message.clone().into()),
        None => Ok(()),
    }
}

// ============================================================================
// Recording Step
// ============================================================================

/// A step that records the id of every message it handles.
///
/// # Example
///
/// ```rust,ignore
/// let step = RecordingStep::new();
/// registry.hear_middleware(step.clone());
///
/// bot.receive(message).await?;
/// assert_eq!(step.count(), 1);
/// ```
#[derive(Clone)]
pub struct RecordingStep {
    calls: Arc<Mutex<Vec<String>>>,
    result: StepResult,
    error: Option<String>,
}

impl RecordingStep {
    /// A recording step that continues.
    pub fn new() -> Self {
        Self::with_result(StepResult::Continue)
    }

    /// A recording step that returns `result`.
    pub fn with_result(result: StepResult) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result,
            error: None,
        }
    }

    /// A recording step that fails with `error`.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new()
        }
    }

    /// Ids of the messages handled so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times the step ran.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for RecordingStep {
    fn default() -> Self {
        Self::new()
    }
}

impl Step for RecordingStep {
    async fn handle(&self, state: &mut State) -> Result<StepResult, BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push(state.message.id().to_owned());
        fail(&self.error)?;
        Ok(self.result)
    }
}

// ============================================================================
// Spy Listener
// ============================================================================

/// A listener that records how often it was asked and how often it ran.
///
/// # Example
///
/// ```rust,ignore
/// let spy = SpyListener::new(true).responding("pong");
/// listeners.add(spy.clone(), ListenerOptions::new());
///
/// listeners.process(&mut state).await?;
/// assert_eq!(spy.call_count(), 1);
/// ```
#[derive(Clone)]
pub struct SpyListener {
    matches: bool,
    response: Option<String>,
    finish: bool,
    asked: Arc<Mutex<usize>>,
    calls: Arc<Mutex<Vec<String>>>,
    error: Arc<Mutex<Option<String>>>,
}

impl SpyListener {
    /// A spy whose matcher always returns `matches`.
    pub fn new(matches: bool) -> Self {
        Self {
            matches,
            response: None,
            finish: false,
            asked: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Respond with `text` when the callback runs.
    pub fn responding(mut self, text: impl Into<String>) -> Self {
        self.response = Some(text.into());
        self
    }

    /// Finish the state when the callback runs.
    pub fn finishing(mut self) -> Self {
        self.finish = true;
        self
    }

    /// Make the matcher fail with `error`.
    pub fn set_error(&self, error: impl Into<String>) {
        *self.error.lock().unwrap() = Some(error.into());
    }

    /// Clear error state.
    pub fn clear_error(&self) {
        *self.error.lock().unwrap() = None;
    }

    /// Number of times the matcher ran.
    pub fn match_count(&self) -> usize {
        *self.asked.lock().unwrap()
    }

    /// Number of times the callback ran.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Message ids seen by the callback.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Listener for SpyListener {
    async fn matches(&self, _state: &State) -> Result<bool, BoxError> {
        *self.asked.lock().unwrap() += 1;
        fail(&self.error.lock().unwrap())?;
        Ok(self.matches)
    }

    async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push(state.message.id().to_owned());
        if let Some(text) = &self.response {
            state.respond(text.clone());
        }
        if self.finish {
            state.finish();
        }
        Ok(())
    }
}

// ============================================================================
// Recording Messenger
// ============================================================================

/// A message adapter that keeps every dispatched envelope.
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    dispatched: Arc<Mutex<Vec<Envelope>>>,
    error: Option<String>,
}

impl RecordingMessenger {
    /// A messenger that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A messenger whose dispatch fails with `error`.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Envelopes dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<Envelope> {
        self.dispatched.lock().unwrap().clone()
    }

    /// Strings of every dispatched envelope, in order.
    pub fn strings(&self) -> Vec<Vec<String>> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|envelope| envelope.strings().to_vec())
            .collect()
    }
}

#[async_trait]
impl MessageAdapter for RecordingMessenger {
    fn name(&self) -> &str {
        "recording-messenger"
    }

    async fn dispatch(&self, envelope: &Envelope) -> Result<(), BoxError> {
        fail(&self.error)?;
        self.dispatched.lock().unwrap().push(envelope.clone());
        Ok(())
    }
}

// ============================================================================
// Static Language
// ============================================================================

/// A language adapter that returns the same results for every message.
#[derive(Clone, Default)]
pub struct StaticLanguage {
    results: NaturalLanguageResults,
    calls: Arc<Mutex<Vec<TextMessage>>>,
}

impl StaticLanguage {
    /// Always return `results`.
    pub fn new(results: NaturalLanguageResults) -> Self {
        Self {
            results,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Messages processed so far.
    pub fn calls(&self) -> Vec<TextMessage> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageAdapter for StaticLanguage {
    fn name(&self) -> &str {
        "static-language"
    }

    async fn process(&self, message: &TextMessage) -> Result<NaturalLanguageResults, BoxError> {
        self.calls.lock().unwrap().push(message.clone());
        Ok(self.results.clone())
    }
}

// ============================================================================
// Recording Storage
// ============================================================================

/// A storage adapter that keeps records in memory.
#[derive(Clone, Default)]
pub struct RecordingStorage {
    kept: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    error: Option<String>,
}

impl RecordingStorage {
    /// A storage that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage whose keep fails with `error`.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// `(collection, record)` pairs kept so far.
    pub fn kept(&self) -> Vec<(String, serde_json::Value)> {
        self.kept.lock().unwrap().clone()
    }

    /// Number of records kept.
    pub fn count(&self) -> usize {
        self.kept.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageAdapter for RecordingStorage {
    fn name(&self) -> &str {
        "recording-storage"
    }

    async fn keep(&self, collection: &str, record: serde_json::Value) -> Result<(), BoxError> {
        fail(&self.error)?;
        self.kept
            .lock()
            .unwrap()
            .push((collection.to_owned(), record));
        Ok(())
    }
}
