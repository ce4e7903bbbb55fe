#![allow(dead_code)]

use cogent::{
    Bot, Message, NaturalLanguageResult, NaturalLanguageResults, NluCandidate, NluKind, Registry,
    State, User,
    testing::{RecordingMessenger, RecordingStorage, StaticLanguage},
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Messages
// ============================================================================

pub fn user() -> User {
    User::new("test-user")
}

pub fn message() -> Message {
    Message::text(user(), "foo")
}

pub fn state() -> State {
    State::new(message())
}

/// Asserts the recorded stages are exactly `expected`, in order, with
/// non-decreasing timestamps.
pub fn assert_stages(state: &State, expected: &[&str]) {
    let processed = state.processed();
    assert_eq!(processed.stages().collect::<Vec<_>>(), expected);
    let times: Vec<_> = processed.iter().map(|(_, at)| at).collect();
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]), "{times:?}");
}

// ============================================================================
// Call Log
// ============================================================================

#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<&'static str>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records `id`.
    pub fn push(&self, id: &'static str) -> impl Fn(&mut State) + Send + Sync + 'static {
        let log = self.clone();
        move |_| log.0.lock().unwrap().push(id)
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

// ============================================================================
// Bot Harness
// ============================================================================

/// A bot with recording adapters over a private registry.
pub struct Harness {
    pub registry: Arc<Registry>,
    pub messenger: RecordingMessenger,
    pub language: StaticLanguage,
    pub storage: RecordingStorage,
    with_message: bool,
    with_language: bool,
    with_storage: bool,
}

impl Harness {
    /// Every adapter configured; the language adapter reports intent `test`.
    pub fn new() -> Self {
        let results = NaturalLanguageResults::new()
            .with(
                NluKind::Intent,
                NaturalLanguageResult::new().add(NluCandidate::new("test").with_score(1.0)),
            )
            .with(
                NluKind::Entities,
                NaturalLanguageResult::new().add(NluCandidate::new("testing")),
            )
            .with(
                NluKind::Language,
                NaturalLanguageResult::new().add(NluCandidate::new("en")),
            );
        Self {
            registry: Arc::new(Registry::new()),
            messenger: RecordingMessenger::new(),
            language: StaticLanguage::new(results),
            storage: RecordingStorage::new(),
            with_message: true,
            with_language: true,
            with_storage: true,
        }
    }

    pub fn without_message(mut self) -> Self {
        self.with_message = false;
        self
    }

    pub fn without_language(mut self) -> Self {
        self.with_language = false;
        self
    }

    pub fn without_storage(mut self) -> Self {
        self.with_storage = false;
        self
    }

    pub fn messenger(mut self, messenger: RecordingMessenger) -> Self {
        self.messenger = messenger;
        self
    }

    pub fn language(mut self, language: StaticLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn storage(mut self, storage: RecordingStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn bot(&self) -> Bot {
        let mut builder = Bot::builder().registry(self.registry.clone());
        if self.with_message {
            builder = builder.message(self.messenger.clone());
        }
        if self.with_language {
            builder = builder.language(self.language.clone());
        }
        if self.with_storage {
            builder = builder.storage(self.storage.clone());
        }
        builder.build()
    }
}
