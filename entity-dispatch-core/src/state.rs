//! The root reducer tree: caller dataset plus the built-in entity registry
//!
//! ```text
//! RootState
//! ├── dataset   caller-owned, reduced through `DatasetState`
//! └── entities  request lifecycle of every entityPath seen on a syncForm action
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::{EntityAction, OperationKind, Phase};

/// A dataset slice that reacts to entity actions.
///
/// Implement this for the application's own data; [`Dataset`] is a ready-made
/// JSON implementation.
pub trait DatasetState {
    /// Apply `action`, returning `true` if anything changed.
    fn reduce(&mut self, action: &EntityAction) -> bool;
}

/// No dataset: only the entity registry is tracked.
impl DatasetState for () {
    fn reduce(&mut self, _action: &EntityAction) -> bool {
        false
    }
}

/// State of a store built by [`create_store`](crate::store::create_store).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootState<D> {
    pub dataset: D,
    pub entities: EntityRegistry,
}

impl<D> RootState<D> {
    /// Wrap `dataset` with an empty entity registry.
    pub fn new(dataset: D) -> Self {
        Self {
            dataset,
            entities: EntityRegistry::default(),
        }
    }
}

/// Reducer combining the dataset slice and the entity registry.
///
/// Both slices always see the action; the result is `true` if either changed.
pub fn root_reducer<D: DatasetState>(state: &mut RootState<D>, action: EntityAction) -> bool {
    let entities_changed = state.entities.reduce(&action);
    let dataset_changed = state.dataset.reduce(&action);
    entities_changed || dataset_changed
}

// ============================================================================
// Entity registry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityPhase {
    /// Request dispatched, waiting for the service.
    Pending,
    /// Last request answered with a response.
    Ready,
    /// Last request answered with an error.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStatus {
    pub operation: Option<OperationKind>,
    pub phase: EntityPhase,
    /// Rejection value of the last failed call
    pub error: Option<Value>,
    /// Registry sequence number of the last update
    pub updated: u64,
}

/// Lifecycle of every entity path seen on a `syncForm` action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityRegistry {
    entities: BTreeMap<String, EntityStatus>,
    sequence: u64,
}

impl EntityRegistry {
    /// Status of `entity_path`, if any syncForm action has touched it.
    pub fn get(&self, entity_path: &str) -> Option<&EntityStatus> {
        self.entities.get(entity_path)
    }

    pub fn is_pending(&self, entity_path: &str) -> bool {
        self.get(entity_path)
            .is_some_and(|status| status.phase == EntityPhase::Pending)
    }

    /// Every tracked entity in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityStatus)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn reduce(&mut self, action: &EntityAction) -> bool {
        if !action.sync_form {
            return false;
        }
        let Some(phase) = action.phase() else {
            return false;
        };

        let (phase, error) = match phase {
            Phase::Request => (EntityPhase::Pending, None),
            Phase::Response => (EntityPhase::Ready, None),
            Phase::Error => (EntityPhase::Failed, action.payload.clone()),
        };

        self.sequence += 1;
        self.entities.insert(
            action.entity_path.clone(),
            EntityStatus {
                operation: action.operation(),
                phase,
                error,
                updated: self.sequence,
            },
        );
        true
    }
}

// ============================================================================
// JSON dataset
// ============================================================================

/// Dataset keyed by entity path.
///
/// Responses of `load` and `save` store their payload under the entity path;
/// a response of `delete` removes the entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset(Map<String, Value>);

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry for `name`, `null` included.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl DatasetState for Dataset {
    fn reduce(&mut self, action: &EntityAction) -> bool {
        if action.phase() != Some(Phase::Response) {
            return false;
        }

        match action.operation() {
            Some(OperationKind::Load | OperationKind::Save) => {
                let value = action.payload.clone().unwrap_or(Value::Null);
                self.0.insert(action.entity_path.clone(), value);
                true
            }
            Some(OperationKind::Delete) => self.0.remove(&action.entity_path).is_some(),
            None => false,
        }
    }
}

/// Select the dataset entry for `name`.
///
/// A `null` entry counts as missing, like an absent key.
pub fn select_data<'a>(state: &'a RootState<Dataset>, name: &str) -> Option<&'a Value> {
    let data = state.dataset.get(name).filter(|value| !value.is_null());
    if data.is_none() {
        tracing::warn!(name = %name, "select_data: no entry in the dataset");
    }
    data
}
