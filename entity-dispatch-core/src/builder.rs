//! Action builder: descriptor in, type constants + creators + thunk out
//!
//! For a descriptor named `user` with operation `load`:
//!
//! | artifact | request              | response              | error              |
//! |----------|----------------------|-----------------------|--------------------|
//! | type     | `REQUEST_LOAD_USER`  | `RESPONSE_LOAD_USER`  | `ERROR_LOAD_USER`  |
//! | creator  | `requestLoadUser`    | `responseLoadUser`    | `errorLoadUser`    |
//!
//! Every action carries `syncForm: true` and `entityPath: "user"`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::action::{EntityAction, Phase};
use crate::descriptor::{Descriptor, ValidDescriptor};
use crate::error::BuildError;
use crate::thunk::AsyncAction;

/// Everything derived from one descriptor.
#[derive(Debug, Clone)]
pub struct EntityActions {
    pub types: ActionTypes,
    pub creators: ActionCreators,
    pub action: AsyncAction,
}

/// Validate `descriptor` and derive its action set.
///
/// Nothing is produced unless validation passes; a missing descriptor is
/// rejected before any field is looked at.
pub fn build(descriptor: Option<Descriptor>) -> Result<EntityActions, BuildError> {
    let descriptor = descriptor.ok_or(BuildError::MissingDescriptor)?;
    let valid = descriptor.validate()?;
    Ok(EntityActions::from_valid(valid))
}

impl EntityActions {
    /// Derive the action set from an already validated descriptor.
    pub fn from_valid(descriptor: ValidDescriptor) -> Self {
        let types = ActionTypes::derive(&descriptor);
        let creators = ActionCreators::derive(&descriptor, &types);
        let action = AsyncAction::new(Arc::new(descriptor), types.clone());

        tracing::debug!(
            entity = %action.entity_path(),
            request = %types.request(),
            "built entity actions"
        );

        Self {
            types,
            creators,
            action,
        }
    }
}

/// The three action type constants of one descriptor.
///
/// Behaves like a map whose keys equal their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypes {
    request: String,
    response: String,
    error: String,
}

impl ActionTypes {
    fn derive(descriptor: &ValidDescriptor) -> Self {
        let suffix = format!(
            "{}_{}",
            descriptor.kind().as_str().to_uppercase(),
            descriptor.name().to_uppercase()
        );
        let constant = |phase: Phase| format!("{}_{}", phase.as_str(), suffix);

        Self {
            request: constant(Phase::Request),
            response: constant(Phase::Response),
            error: constant(Phase::Error),
        }
    }

    /// `REQUEST_<TYPE>_<NAME>`
    pub fn request(&self) -> &str {
        &self.request
    }

    /// `RESPONSE_<TYPE>_<NAME>`
    pub fn response(&self) -> &str {
        &self.response
    }

    /// `ERROR_<TYPE>_<NAME>`
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Constant for a given phase.
    pub fn for_phase(&self, phase: Phase) -> &str {
        match phase {
            Phase::Request => &self.request,
            Phase::Response => &self.response,
            Phase::Error => &self.error,
        }
    }

    /// Look up a constant by key. Key and value are identical.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys().find(|k| *k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in phase order (request, response, error).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        Phase::ALL.into_iter().map(|phase| self.for_phase(phase))
    }

    pub fn len(&self) -> usize {
        Phase::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Owned copy of the constants as a key/value map
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.keys().map(|k| (k.to_string(), k.to_string())).collect()
    }
}

/// A pure function from payload to action record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCreator {
    key: String,
    action_type: String,
    entity_path: String,
}

impl ActionCreator {
    /// Camel-cased key, e.g. `responseLoadUser`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Type constant of the actions this creator builds
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Build a `syncForm` action carrying `payload`. Pure.
    pub fn create(&self, payload: Value) -> EntityAction {
        EntityAction::with_payload(self.action_type.clone(), payload, self.entity_path.clone())
    }
}

/// The three action creators of one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCreators {
    request: ActionCreator,
    response: ActionCreator,
    error: ActionCreator,
}

impl ActionCreators {
    fn derive(descriptor: &ValidDescriptor, types: &ActionTypes) -> Self {
        let suffix = format!(
            "{}{}",
            capitalize(descriptor.kind().as_str()),
            capitalize(descriptor.name())
        );
        let creator = |phase: Phase| ActionCreator {
            key: format!("{}{}", phase.camel_prefix(), suffix),
            action_type: types.for_phase(phase).to_string(),
            entity_path: descriptor.name().to_string(),
        };

        Self {
            request: creator(Phase::Request),
            response: creator(Phase::Response),
            error: creator(Phase::Error),
        }
    }

    /// Creator for the request action
    pub fn request(&self) -> &ActionCreator {
        &self.request
    }

    /// Creator for the response action
    pub fn response(&self) -> &ActionCreator {
        &self.response
    }

    /// Creator for the error action
    pub fn error(&self) -> &ActionCreator {
        &self.error
    }

    /// Creator for a given phase.
    pub fn for_phase(&self, phase: Phase) -> &ActionCreator {
        match phase {
            Phase::Request => &self.request,
            Phase::Response => &self.response,
            Phase::Error => &self.error,
        }
    }

    /// Look up a creator by its camel-cased key.
    pub fn get(&self, key: &str) -> Option<&ActionCreator> {
        self.iter().find(|creator| creator.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(ActionCreator::key)
    }

    /// Creators in phase order
    pub fn iter(&self) -> impl Iterator<Item = &ActionCreator> {
        Phase::ALL.into_iter().map(|phase| self.for_phase(phase))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
