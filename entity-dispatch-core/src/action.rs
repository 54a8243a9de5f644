//! Action trait and the entity action record

use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: For async dispatch across threads
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &str;
}

/// The operation an entity action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Load,
    Save,
    Delete,
}

impl OperationKind {
    /// Every accepted operation, in declaration order.
    pub const ALL: [OperationKind; 3] = [Self::Load, Self::Save, Self::Delete];

    /// Lowercase form as written in descriptors (`load`, `save`, `delete`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for OperationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of an asynchronous entity operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Request,
    Response,
    Error,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Self::Request, Self::Response, Self::Error];

    /// Uppercase prefix used in action type constants.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Response => "RESPONSE",
            Self::Error => "ERROR",
        }
    }

    /// Lowercase prefix used in creator keys (`requestLoadUser`).
    pub fn camel_prefix(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Error => "error",
        }
    }
}

/// A plain action record produced by the action builder.
///
/// Serializes to `{type, payload?, syncForm, entityPath}`; `payload` is left
/// out entirely when it is `None` (the request action of a thunk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub sync_form: bool,
    pub entity_path: String,
}

impl EntityAction {
    /// An action without payload, as emitted when a request starts.
    pub fn bare(kind: impl Into<String>, entity_path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
            sync_form: true,
            entity_path: entity_path.into(),
        }
    }

    /// An action carrying `payload`.
    pub fn with_payload(
        kind: impl Into<String>,
        payload: Value,
        entity_path: impl Into<String>,
    ) -> Self {
        Self {
            payload: Some(payload),
            ..Self::bare(kind, entity_path)
        }
    }

    /// Recover the phase from the type prefix, if the type follows the
    /// `<PHASE>_<TYPE>_<NAME>` convention.
    pub fn phase(&self) -> Option<Phase> {
        Phase::ALL.into_iter().find(|phase| {
            self.kind
                .strip_prefix(phase.as_str())
                .is_some_and(|rest| rest.starts_with('_'))
        })
    }

    /// Recover the operation from the type string.
    pub fn operation(&self) -> Option<OperationKind> {
        let phase = self.phase()?;
        let rest = self.kind.strip_prefix(phase.as_str())?.strip_prefix('_')?;
        OperationKind::ALL.into_iter().find(|op| {
            rest.strip_prefix(&op.as_str().to_uppercase())
                .is_some_and(|tail| tail.starts_with('_'))
        })
    }
}

impl Action for EntityAction {
    fn name(&self) -> &str {
        &self.kind
    }
}
