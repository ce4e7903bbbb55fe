//! Stage registry: middleware chains and listener sets by stage name.

use crate::{listeners::Listeners, middleware::Middleware};
use cogent_core::{Listener, ListenerOptions, State, Step, stage};
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

struct Inner {
    middleware: HashMap<String, Arc<Middleware>>,
    listeners: HashMap<String, Arc<Listeners>>,
}

impl Inner {
    fn loaded() -> Self {
        let middleware = stage::ALL
            .into_iter()
            .map(|name| (name.to_owned(), Arc::new(Middleware::new(name))))
            .collect();
        Self {
            middleware,
            listeners: HashMap::new(),
        }
    }

    fn middleware_mut(&mut self, stage: &str) -> &mut Middleware {
        let entry = self
            .middleware
            .entry(stage.to_owned())
            .or_insert_with(|| Arc::new(Middleware::new(stage)));
        Arc::make_mut(entry)
    }

    fn listeners_mut(&mut self, stage: &str) -> &mut Listeners {
        Arc::make_mut(self.listeners.entry(stage.to_owned()).or_default())
    }
}

/// Middleware and listeners registered per stage.
///
/// Lookups hand out `Arc` snapshots. Registration copies a chain or set only
/// when a snapshot of it is still held, so a running turn keeps seeing the
/// registrations it started with.
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with an empty middleware chain for every standard stage and
    /// no listeners.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::loaded()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore the freshly created state, dropping every registration.
    pub fn reset(&self) {
        *self.write() = Inner::loaded();
        tracing::debug!("registry reset");
    }

    /// The middleware chain registered for `stage`.
    pub fn middleware(&self, stage: &str) -> Option<Arc<Middleware>> {
        self.read().middleware.get(stage).cloned()
    }

    /// The listener set registered for `stage`, if any listener was ever
    /// registered there.
    pub fn listeners(&self, stage: &str) -> Option<Arc<Listeners>> {
        self.read().listeners.get(stage).cloned()
    }

    /// Replace the chain registered under the middleware's name.
    pub fn set_middleware(&self, middleware: Middleware) {
        let name = middleware.name().to_owned();
        self.write().middleware.insert(name, Arc::new(middleware));
    }

    /// Append a step to the chain of `stage`, creating the chain if needed.
    pub fn add_middleware<S: Step>(&self, stage: &str, step: S) {
        self.write().middleware_mut(stage).register(step);
    }

    /// Remove the chain of `stage`. Thoughts for that stage will fail to
    /// build until a new chain is registered.
    pub fn remove_middleware(&self, stage: &str) -> Option<Arc<Middleware>> {
        self.write().middleware.remove(stage)
    }

    /// Replace the listener set of `stage`.
    pub fn set_listeners(&self, stage: &str, listeners: Listeners) {
        self.write()
            .listeners
            .insert(stage.to_owned(), Arc::new(listeners));
    }

    /// Register a listener for `stage` and return its name.
    pub fn add_listener<L: Listener>(
        &self,
        stage: &str,
        listener: L,
        options: ListenerOptions,
    ) -> String {
        self.write().listeners_mut(stage).add(listener, options)
    }

    /// Register a listener for `stage` under an explicit name.
    pub fn insert_listener<L: Listener>(
        &self,
        stage: &str,
        name: impl Into<String>,
        listener: L,
        options: ListenerOptions,
    ) {
        self.write()
            .listeners_mut(stage)
            .insert(name, listener, options);
    }

    /// Remove a named listener from `stage`.
    pub fn remove_listener(&self, stage: &str, name: &str) -> bool {
        let mut inner = self.write();
        match inner.listeners.get_mut(stage) {
            Some(listeners) => Arc::make_mut(listeners).remove(name),
            None => false,
        }
    }

    /// Add a step to the `hear` stage.
    pub fn hear_middleware<S: Step>(&self, step: S) {
        self.add_middleware(stage::HEAR, step);
    }

    /// Add a step to the `listen` stage.
    pub fn listen_middleware<S: Step>(&self, step: S) {
        self.add_middleware(stage::LISTEN, step);
    }

    /// Add a step to the `understand` stage.
    pub fn understand_middleware<S: Step>(&self, step: S) {
        self.add_middleware(stage::UNDERSTAND, step);
    }

    /// Add a step to the `act` stage.
    pub fn act_middleware<S: Step>(&self, step: S) {
        self.add_middleware(stage::ACT, step);
    }

    /// Add a step to the `respond` stage.
    pub fn respond_middleware<S: Step>(&self, step: S) {
        self.add_middleware(stage::RESPOND, step);
    }

    /// Add a step to the `remember` stage.
    pub fn remember_middleware<S: Step>(&self, step: S) {
        self.add_middleware(stage::REMEMBER, step);
    }

    /// Listen with a custom predicate.
    pub fn listen_custom<M, C>(&self, matcher: M, callback: C, options: ListenerOptions) -> String
    where
        M: Fn(&State) -> bool + Send + Sync + 'static,
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.write()
            .listeners_mut(stage::LISTEN)
            .custom(matcher, callback, options)
    }

    /// Listen for text matching a regular expression.
    pub fn listen_text<C>(
        &self,
        pattern: &str,
        callback: C,
        options: ListenerOptions,
    ) -> Result<String, regex::Error>
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.write()
            .listeners_mut(stage::LISTEN)
            .text(pattern, callback, options)
    }

    /// Understand with a custom predicate, usually over NLU results.
    pub fn understand_custom<M, C>(
        &self,
        matcher: M,
        callback: C,
        options: ListenerOptions,
    ) -> String
    where
        M: Fn(&State) -> bool + Send + Sync + 'static,
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.write()
            .listeners_mut(stage::UNDERSTAND)
            .custom(matcher, callback, options)
    }

    /// Understand messages whose NLU intent contains `intent`.
    pub fn understand_intent<C>(
        &self,
        intent: impl Into<String>,
        callback: C,
        options: ListenerOptions,
    ) -> String
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.write()
            .listeners_mut(stage::UNDERSTAND)
            .intent(intent, callback, options)
    }

    /// Act on messages nothing else matched.
    pub fn listen_catch_all<C>(&self, callback: C, options: ListenerOptions) -> String
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        self.write()
            .listeners_mut(stage::ACT)
            .catch_all(callback, options)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("Registry")
            .field("middleware", &inner.middleware)
            .field("listeners", &inner.listeners)
            .finish()
    }
}

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// The process-wide registry.
pub fn global() -> Arc<Registry> {
    Arc::clone(&GLOBAL)
}
