//! Listener collections and standard listener implementations.

pub mod catch_all;
pub mod custom;
pub mod intent;
pub mod text;

pub use catch_all::CatchAllListener;
pub use custom::{AsyncListener, CustomListener};
pub use intent::IntentListener;
pub use text::TextListener;

use cogent_core::{CogentError, DynListener, Listener, ListenerOptions, State};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

static NEXT_LISTENER: AtomicUsize = AtomicUsize::new(1);

fn generated_name() -> String {
    format!("listener-{}", NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
}

#[derive(Clone)]
struct ListenerEntry {
    name: String,
    listener: Arc<dyn DynListener>,
    options: ListenerOptions,
}

/// An ordered collection of named listeners.
///
/// Insertion order is evaluation order. Cloning is cheap; listeners are
/// shared handles.
#[derive(Clone, Default)]
pub struct Listeners {
    entries: Vec<ListenerEntry>,
}

impl Listeners {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under `name`.
    ///
    /// Registering an existing name replaces that listener in place, keeping
    /// its position.
    pub fn insert<L: Listener>(
        &mut self,
        name: impl Into<String>,
        listener: L,
        options: ListenerOptions,
    ) -> &mut Self {
        let entry = ListenerEntry {
            name: name.into(),
            listener: Arc::new(listener),
            options,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Register a listener and return the name it was stored under: the
    /// option's id if set, a generated name otherwise.
    pub fn add<L: Listener>(&mut self, listener: L, options: ListenerOptions) -> String {
        let name = options.id.clone().unwrap_or_else(generated_name);
        self.insert(name.clone(), listener, options);
        name
    }

    /// Register a [`CustomListener`].
    pub fn custom<M, C>(&mut self, matcher: M, callback: C, options: ListenerOptions) -> String
    where
        M: Fn(&State) -> bool + Send + Sync + 'static,
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.add(CustomListener::new(matcher, callback), options)
    }

    /// Register a [`TextListener`].
    pub fn text<C>(
        &mut self,
        pattern: &str,
        callback: C,
        options: ListenerOptions,
    ) -> Result<String, regex::Error>
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        Ok(self.add(TextListener::new(pattern, callback)?, options))
    }

    /// Register a [`CatchAllListener`].
    pub fn catch_all<C>(&mut self, callback: C, options: ListenerOptions) -> String
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.add(CatchAllListener::new(callback), options)
    }

    /// Register an [`IntentListener`].
    pub fn intent<C>(
        &mut self,
        intent: impl Into<String>,
        callback: C,
        options: ListenerOptions,
    ) -> String
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.add(IntentListener::new(intent, callback), options)
    }

    /// Remove the listener registered under `name`.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// Options of the listener registered under `name`.
    pub fn options(&self, name: &str) -> Option<&ListenerOptions> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.options)
    }

    /// Registered names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate the listeners against the state.
    ///
    /// Listeners run in order. After the first match, only forced listeners
    /// are still evaluated. A finished state stops the pass before the next
    /// listener, forced or not. Returns whether any listener matched.
    pub async fn process(&self, state: &mut State) -> Result<bool, CogentError> {
        let mut matched = false;

        for entry in &self.entries {
            if state.is_done() {
                tracing::trace!(listener = %entry.name, "state finished, ending pass");
                break;
            }
            if matched && !entry.options.force {
                tracing::trace!(listener = %entry.name, "skipped after earlier match");
                continue;
            }

            let hit = entry
                .listener
                .matches_dyn(state)
                .await
                .map_err(|source| CogentError::Listener {
                    name: entry.name.clone(),
                    source,
                })?;
            if !hit {
                continue;
            }

            tracing::trace!(listener = %entry.name, force = entry.options.force, "listener matched");
            matched = true;
            state.set_matched(entry.options.id.clone());
            let outcome = entry.listener.on_match_dyn(state).await;
            state.set_matched(None);
            outcome.map_err(|source| CogentError::Listener {
                name: entry.name.clone(),
                source,
            })?;
        }

        Ok(matched)
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.name, &e.options)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogent_core::{BoxError, Message, User};
    use futures::FutureExt;
    use std::sync::Mutex;

    fn state() -> State {
        State::new(Message::text(User::new("test-user"), "foo"))
    }

    fn push(log: &Arc<Mutex<Vec<&'static str>>>, id: &'static str) -> impl Fn(&mut State) + Send + Sync + 'static {
        let log = log.clone();
        move |_| log.lock().unwrap().push(id)
    }

    #[tokio::test]
    async fn test_empty_collection_is_unmatched() {
        assert!(!Listeners::new().process(&mut state()).await.unwrap());
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();
        listeners.custom(|_| false, push(&log, "A"), ListenerOptions::new());
        listeners.custom(|_| true, push(&log, "B"), ListenerOptions::new());
        listeners.custom(|_| true, push(&log, "C"), ListenerOptions::new());

        assert!(listeners.process(&mut state()).await.unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_forced_listeners_run_after_match() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();
        listeners.custom(|_| true, push(&log, "A"), ListenerOptions::new());
        listeners.custom(|_| true, push(&log, "B"), ListenerOptions::new());
        listeners.custom(|_| true, push(&log, "C"), ListenerOptions::forced());

        listeners.process(&mut state()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_finish_stops_forced_listeners() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();
        listeners.custom(|_| true, |state| state.finish(), ListenerOptions::new());
        listeners.custom(|_| true, push(&log, "B"), ListenerOptions::forced());

        let mut state = state();
        assert!(listeners.process(&mut state).await.unwrap());
        assert!(state.is_done());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_done_state_runs_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();
        listeners.custom(|_| true, push(&log, "A"), ListenerOptions::forced());

        let mut state = state();
        state.finish();
        assert!(!listeners.process(&mut state).await.unwrap());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_envelopes_tagged_with_listener_id() {
        let mut listeners = Listeners::new();
        listeners.custom(|_| true, |state| { state.respond("A"); }, ListenerOptions::new().with_id("first"));
        listeners.custom(|_| true, |state| { state.respond("B"); }, ListenerOptions::forced());

        let mut state = state();
        listeners.process(&mut state).await.unwrap();

        let envelopes = state.envelopes();
        assert_eq!(envelopes[0].listener_id.as_deref(), Some("first"));
        assert_eq!(envelopes[1].listener_id, None);
        assert!(state.matched().is_none());
    }

    #[tokio::test]
    async fn test_async_matcher_is_awaited() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();
        listeners.add(
            AsyncListener::new(
                |_: &State| {
                    async {
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        true
                    }
                    .boxed()
                },
                |_: &mut State| async {}.boxed(),
            ),
            ListenerOptions::new(),
        );
        listeners.custom(|_| true, push(&log, "forced"), ListenerOptions::forced());

        assert!(listeners.process(&mut state()).await.unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["forced"]);
    }

    struct Failing;

    impl Listener for Failing {
        async fn matches(&self, _state: &State) -> Result<bool, BoxError> {
            Err("matcher exploded".into())
        }

        async fn on_match(&self, _state: &mut State) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_listener_error_names_listener() {
        let mut listeners = Listeners::new();
        listeners.insert("broken", Failing, ListenerOptions::new());

        let err = listeners.process(&mut state()).await.unwrap_err();
        match err {
            CogentError::Listener { name, source } => {
                assert_eq!(name, "broken");
                assert_eq!(source.to_string(), "matcher exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut listeners = Listeners::new();
        listeners.insert("a", CustomListener::new(|_| true, |_| {}), ListenerOptions::new());
        listeners.insert("b", CustomListener::new(|_| true, |_| {}), ListenerOptions::new());
        listeners.insert("a", CustomListener::new(|_| false, |_| {}), ListenerOptions::forced());

        assert_eq!(listeners.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(listeners.options("a").unwrap().force);
        assert!(listeners.remove("b"));
        assert!(!listeners.remove("b"));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_add_uses_id_or_generates_name() {
        let mut listeners = Listeners::new();
        let named = listeners.custom(|_| true, |_| {}, ListenerOptions::new().with_id("greet"));
        let generated = listeners.custom(|_| true, |_| {}, ListenerOptions::new());
        assert_eq!(named, "greet");
        assert!(generated.starts_with("listener-"));
        assert_ne!(generated, named);
    }
}
