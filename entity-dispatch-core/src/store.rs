//! Centralized state store with reducer pattern, and the entity store factory

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::action::{Action, EntityAction};
use crate::logger::{ActionLog, ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
use crate::state::{root_reducer, DatasetState, RootState};
use crate::thunk::Dispatch;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Centralized state store with Redux-like reducer pattern
///
/// # Example
/// ```ignore
/// fn reducer(state: &mut i32, action: EntityAction) -> bool {
///     *state += 1;
///     true
/// }
///
/// let mut store = Store::new(0, reducer);
/// store.dispatch(EntityAction::bare("REQUEST_LOAD_USER", "user"));
/// assert_eq!(*store.state(), 1);
/// ```
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Dispatch an action to the store
    ///
    /// Returns `true` if the state changed.
    pub fn dispatch(&mut self, action: A) -> bool {
        (self.reducer)(&mut self.state, action)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state
    ///
    /// Use sparingly - prefer dispatching actions for state changes.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and allows middleware to intercept actions
/// before and after they are processed by the reducer.
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Action, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    /// Create a new store with middleware
    pub fn new(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action through middleware and store
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = self.store.dispatch(action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }
}

/// Middleware trait for intercepting actions
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A boxed middleware that can move with its store across threads.
pub type BoxedMiddleware<A> = Box<dyn Middleware<A> + Send>;

/// Compose multiple middleware into a single middleware
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<BoxedMiddleware<A>>,
}

impl<A: Action> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware to the chain
    pub fn add<M: Middleware<A> + Send + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Append an already boxed middleware
    pub fn add_boxed(&mut self, middleware: BoxedMiddleware<A>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        // Call in reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}

// ============================================================================
// Entity store
// ============================================================================

/// Options for [`create_store_with`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Run the built-in action logger
    pub log_actions: bool,
    /// Filter for both tracing output and the action log
    pub logger: ActionLoggerConfig,
    /// Entries kept in the in-memory action log
    pub log_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            log_actions: true,
            logger: ActionLoggerConfig::default(),
            log_capacity: 100,
        }
    }
}

/// Middleware chain of an entity store: custom middleware, then enhancers,
/// around the built-in action logger.
#[derive(Debug)]
pub struct EntityMiddleware {
    chain: ComposedMiddleware<EntityAction>,
    logger: ActionLoggerMiddleware,
}

impl EntityMiddleware {
    /// The built-in action logger
    pub fn logger(&self) -> &ActionLoggerMiddleware {
        &self.logger
    }
}

impl Middleware<EntityAction> for EntityMiddleware {
    fn before(&mut self, action: &EntityAction) {
        self.chain.before(action);
        self.logger.before(action);
    }

    fn after(&mut self, action: &EntityAction, state_changed: bool) {
        self.logger.after(action, state_changed);
        self.chain.after(action, state_changed);
    }
}

/// Store over a [`RootState`], as returned by [`create_store`].
pub struct EntityStore<D> {
    inner: StoreWithMiddleware<RootState<D>, EntityAction, EntityMiddleware>,
}

/// Build an entity store with default options.
///
/// Custom middleware form the outer layer and see each action first, in the
/// given order. Enhancers wrap the store inside them, around the built-in
/// action logger.
///
/// # Example
///
/// ```ignore
/// let mut store = create_store(Dataset::new(), vec![Box::new(AuditMiddleware)], vec![]);
/// actions.action.call(vec![]).run(|a| { store.dispatch(a); }).await;
/// ```
pub fn create_store<D: DatasetState>(
    dataset: D,
    custom_middlewares: Vec<BoxedMiddleware<EntityAction>>,
    enhancers: Vec<BoxedMiddleware<EntityAction>>,
) -> EntityStore<D> {
    create_store_with(dataset, custom_middlewares, enhancers, StoreOptions::default())
}

/// Build an entity store with explicit [`StoreOptions`].
pub fn create_store_with<D: DatasetState>(
    dataset: D,
    custom_middlewares: Vec<BoxedMiddleware<EntityAction>>,
    enhancers: Vec<BoxedMiddleware<EntityAction>>,
    options: StoreOptions,
) -> EntityStore<D> {
    let mut chain = ComposedMiddleware::new();
    for middleware in custom_middlewares.into_iter().chain(enhancers) {
        chain.add_boxed(middleware);
    }

    let logger = ActionLoggerMiddleware::with_log(ActionLogConfig::new(
        options.log_capacity,
        options.logger,
    ))
    .active(options.log_actions);

    tracing::debug!(
        middlewares = chain.len(),
        log_actions = options.log_actions,
        "entity store created"
    );

    EntityStore {
        inner: StoreWithMiddleware::new(
            RootState::new(dataset),
            root_reducer::<D>,
            EntityMiddleware { chain, logger },
        ),
    }
}

impl<D: DatasetState> EntityStore<D> {
    /// Dispatch through the middleware chain and the root reducer.
    pub fn dispatch(&mut self, action: EntityAction) -> bool {
        self.inner.dispatch(action)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &RootState<D> {
        self.inner.state()
    }

    /// Actions recorded by the built-in logger.
    pub fn action_log(&self) -> Option<&ActionLog> {
        self.inner.middleware().logger().log()
    }

    /// Move the store behind a shared handle usable as a dispatch target.
    pub fn into_shared(self) -> SharedStore<D> {
        SharedStore(Arc::new(Mutex::new(self)))
    }
}

impl<D: DatasetState> Dispatch for EntityStore<D> {
    fn dispatch(&mut self, action: EntityAction) {
        EntityStore::dispatch(self, action);
    }
}

/// Cloneable handle to an [`EntityStore`].
///
/// Each dispatch holds the lock only for the synchronous reducer pass, so
/// several thunks can run against the same store concurrently.
pub struct SharedStore<D>(Arc<Mutex<EntityStore<D>>>);

impl<D> Clone for SharedStore<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: DatasetState> SharedStore<D> {
    fn lock(&self) -> MutexGuard<'_, EntityStore<D>> {
        self.0.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("entity store lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Dispatch under the lock. Returns `true` if the state changed.
    pub fn dispatch(&self, action: EntityAction) -> bool {
        self.lock().dispatch(action)
    }

    /// Read the store under the lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&EntityStore<D>) -> R) -> R {
        f(&*self.lock())
    }

    /// Read the state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&RootState<D>) -> R) -> R {
        f(self.lock().state())
    }
}

impl<D: DatasetState> Dispatch for SharedStore<D> {
    fn dispatch(&mut self, action: EntityAction) {
        SharedStore::dispatch(self, action);
    }
}
