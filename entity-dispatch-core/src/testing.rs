//! Test utilities for entity-dispatch applications
//!
//! - [`DispatchSpy`]: a cloneable [`Dispatch`] target that records every call
//! - [`TestHarness`]: state plus an action channel, for code that dispatches
//!   through an `mpsc` sender
//! - Assertion macros matching dispatched actions by type string
//!
//! # Example
//!
//! ```ignore
//! use entity_dispatch::testing::DispatchSpy;
//!
//! let spy = DispatchSpy::new();
//! actions.action.call(vec![]).run(spy.clone()).await;
//!
//! assert_eq!(spy.call_count(), 2);
//! assert_dispatched!(spy.calls(), "RESPONSE_LOAD_USER");
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::action::EntityAction;
use crate::thunk::Dispatch;

/// Records dispatched actions in call order.
///
/// Clones share the same record, so hand a clone to the code under test and
/// inspect the one you kept.
#[derive(Debug, Clone, Default)]
pub struct DispatchSpy {
    calls: Arc<Mutex<Vec<EntityAction>>>,
}

impl DispatchSpy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded action, oldest first.
    pub fn calls(&self) -> Vec<EntityAction> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Type strings of the recorded actions.
    pub fn types(&self) -> Vec<String> {
        self.calls().into_iter().map(|a| a.kind).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn last(&self) -> Option<EntityAction> {
        self.calls().pop()
    }

    /// Whether an action equal to `action` was recorded.
    pub fn called_with(&self, action: &EntityAction) -> bool {
        self.calls().iter().any(|a| a == action)
    }

    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Dispatch for DispatchSpy {
    fn dispatch(&mut self, action: EntityAction) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
    }
}

/// Generic test harness with an action channel.
///
/// # Example
///
/// ```ignore
/// let mut harness = TestHarness::<RootState<Dataset>>::new(RootState::default());
///
/// actions.action.call(vec![]).run(harness.sender()).await;
///
/// let dispatched = harness.drain_dispatched();
/// assert_eq!(dispatched.len(), 2);
/// ```
pub struct TestHarness<S> {
    /// The application state under test
    pub state: S,
    tx: mpsc::UnboundedSender<EntityAction>,
    rx: mpsc::UnboundedReceiver<EntityAction>,
}

impl<S> TestHarness<S> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Get a clone of the action sender for passing to thunks.
    pub fn sender(&self) -> mpsc::UnboundedSender<EntityAction> {
        self.tx.clone()
    }

    /// Drain every action sent so far.
    pub fn drain_dispatched(&mut self) -> Vec<EntityAction> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Drain only the actions for `entity_path`; the rest stay queued.
    pub fn drain_entity(&mut self, entity_path: &str) -> Vec<EntityAction> {
        let (matching, rest): (Vec<_>, Vec<_>) = self
            .drain_dispatched()
            .into_iter()
            .partition(|a| a.entity_path == entity_path);

        for action in rest {
            let _ = self.tx.send(action);
        }

        matching
    }

    pub fn has_dispatched(&mut self) -> bool {
        !self.drain_dispatched().is_empty()
    }
}

impl<S: Default> Default for TestHarness<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Assert that an action with the given type string was dispatched.
///
/// ```ignore
/// assert_dispatched!(spy.calls(), "REQUEST_LOAD_USER");
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $kind:expr) => {
        assert!(
            $actions.iter().any(|a| a.kind == $kind),
            "Expected action `{}` to be dispatched, but got: {:?}",
            $kind,
            $actions.iter().map(|a| a.kind.as_str()).collect::<Vec<_>>()
        );
    };
}

/// Assert that no action with the given type string was dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $kind:expr) => {
        assert!(
            !$actions.iter().any(|a| a.kind == $kind),
            "Expected action `{}` NOT to be dispatched, but it was: {:?}",
            $kind,
            $actions.iter().map(|a| a.kind.as_str()).collect::<Vec<_>>()
        );
    };
}

/// Find the first dispatched action with the given type string.
#[macro_export]
macro_rules! find_dispatched {
    ($actions:expr, $kind:expr) => {
        $actions.iter().find(|a| a.kind == $kind)
    };
}

/// Count the dispatched actions with the given type string.
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $kind:expr) => {
        $actions.iter().filter(|a| a.kind == $kind).count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spy_records_in_order() {
        let spy = DispatchSpy::new();
        let mut target = spy.clone();

        target.dispatch(EntityAction::bare("REQUEST_SAVE_USER", "user"));
        target.dispatch(EntityAction::with_payload("RESPONSE_SAVE_USER", json!(1), "user"));

        assert_eq!(spy.call_count(), 2);
        assert_eq!(spy.types(), vec!["REQUEST_SAVE_USER", "RESPONSE_SAVE_USER"]);
        assert!(spy.called_with(&EntityAction::bare("REQUEST_SAVE_USER", "user")));

        spy.reset();
        assert_eq!(spy.call_count(), 0);
        assert!(spy.last().is_none());
    }

    #[test]
    fn test_harness_drain_entity() {
        let mut harness = TestHarness::<()>::new(());
        let mut tx = harness.sender();

        tx.dispatch(EntityAction::bare("REQUEST_LOAD_USER", "user"));
        tx.dispatch(EntityAction::bare("REQUEST_LOAD_ORDER", "order"));
        tx.dispatch(EntityAction::bare("ERROR_LOAD_USER", "user"));

        let users = harness.drain_entity("user");
        assert_eq!(users.len(), 2);

        let rest = harness.drain_dispatched();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].entity_path, "order");
        assert!(!harness.has_dispatched());
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![
            EntityAction::bare("REQUEST_LOAD_USER", "user"),
            EntityAction::with_payload("RESPONSE_LOAD_USER", json!({}), "user"),
        ];

        assert_dispatched!(actions, "REQUEST_LOAD_USER");
        assert_not_dispatched!(actions, "ERROR_LOAD_USER");
        assert_eq!(count_dispatched!(actions, "RESPONSE_LOAD_USER"), 1);

        let found = find_dispatched!(actions, "RESPONSE_LOAD_USER");
        assert_eq!(found.and_then(|a| a.payload.clone()), Some(json!({})));
    }
}
