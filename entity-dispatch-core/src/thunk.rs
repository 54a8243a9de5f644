//! Dispatch thunks: the asynchronous part of an entity action set
//!
//! Calling an [`AsyncAction`] with call-site arguments yields a [`Thunk`].
//! Nothing happens until the thunk is run against a [`Dispatch`] target:
//!
//! ```ignore
//! let actions = Descriptor::new()
//!     .name("user")
//!     .kind("load")
//!     .service(|args| async move { api::fetch_user(&args[0]).await })
//!     .build()?;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let outcome = actions.action.call(vec![json!(42)]).run(tx).await;
//!
//! // rx now holds REQUEST_LOAD_USER followed by RESPONSE_LOAD_USER or ERROR_LOAD_USER
//! ```

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::action::EntityAction;
use crate::builder::ActionTypes;
use crate::descriptor::ValidDescriptor;

/// Something that accepts dispatched actions.
///
/// Implemented for closures, for action channels and for shared stores.
pub trait Dispatch {
    fn dispatch(&mut self, action: EntityAction);
}

impl<F> Dispatch for F
where
    F: FnMut(EntityAction),
{
    fn dispatch(&mut self, action: EntityAction) {
        self(action)
    }
}

impl Dispatch for mpsc::UnboundedSender<EntityAction> {
    fn dispatch(&mut self, action: EntityAction) {
        if let Err(err) = self.send(action) {
            tracing::warn!(action = %err.0.kind, "action channel closed, dropping action");
        }
    }
}

/// Lifecycle of a single thunk invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThunkState {
    /// Built but not yet run.
    Pending,
    /// Request action emitted, service call in flight.
    Requested,
    /// Response action emitted.
    Succeeded,
    /// Error action emitted.
    Failed,
}

impl ThunkState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// The async action of an entity action set.
///
/// Cheap to clone; every clone shares the same validated descriptor.
#[derive(Debug, Clone)]
pub struct AsyncAction {
    descriptor: Arc<ValidDescriptor>,
    types: ActionTypes,
}

impl AsyncAction {
    pub(crate) fn new(descriptor: Arc<ValidDescriptor>, types: ActionTypes) -> Self {
        Self { descriptor, types }
    }

    /// Bind call-site arguments. Pure: the service is not called yet.
    pub fn call(&self, args: Vec<Value>) -> Thunk {
        Thunk {
            descriptor: Arc::clone(&self.descriptor),
            types: self.types.clone(),
            args,
        }
    }

    pub fn entity_path(&self) -> &str {
        self.descriptor.name()
    }

    pub fn types(&self) -> &ActionTypes {
        &self.types
    }
}

/// A deferred entity operation waiting for a dispatch target.
#[derive(Debug)]
pub struct Thunk {
    descriptor: Arc<ValidDescriptor>,
    types: ActionTypes,
    args: Vec<Value>,
}

impl Thunk {
    /// Run the operation against `dispatch`.
    ///
    /// The request action is dispatched and the service call started before
    /// this returns, so observers see the request even if the returned future
    /// is never polled. The future resolves once exactly one response or
    /// error action has been dispatched.
    pub fn run<D>(self, mut dispatch: D) -> impl Future<Output = ThunkState>
    where
        D: Dispatch,
    {
        let Thunk {
            descriptor,
            types,
            args,
        } = self;
        let entity = descriptor.name().to_string();

        dispatch.dispatch(EntityAction::bare(types.request(), entity.clone()));
        tracing::debug!(
            entity = %entity,
            action = %types.request(),
            state = ?ThunkState::Requested,
            "thunk requested"
        );

        let pending = descriptor.service().call(args);

        async move {
            let (action, state) = match pending.await {
                Ok(value) => (
                    EntityAction::with_payload(types.response(), value, entity),
                    ThunkState::Succeeded,
                ),
                Err(reason) => (
                    EntityAction::with_payload(types.error(), reason, entity),
                    ThunkState::Failed,
                ),
            };

            tracing::debug!(
                entity = %action.entity_path,
                action = %action.kind,
                state = ?state,
                "thunk settled"
            );
            dispatch.dispatch(action);
            state
        }
    }
}
