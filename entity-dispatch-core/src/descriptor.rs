//! Descriptors: the declarative input of the action builder
//!
//! A [`Descriptor`] is loosely typed on purpose: `name` and `type` usually
//! come from configuration, so they are kept as raw JSON values until
//! [`Descriptor::validate`] turns them into a [`ValidDescriptor`].
//!
//! ```ignore
//! use entity_dispatch_core::Descriptor;
//! use serde_json::json;
//!
//! let descriptor = Descriptor::new()
//!     .name("user")
//!     .kind("load")
//!     .service(|args| async move { Ok(json!({"id": args[0]})) });
//!
//! let actions = descriptor.build()?;
//! assert!(actions.types.contains_key("REQUEST_LOAD_USER"));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::action::OperationKind;
use crate::builder::{build, EntityActions};
use crate::error::BuildError;

/// The deferred result of a service call: `Ok` resolves, `Err` rejects.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Value, Value>> + Send>>;

/// An asynchronous service callable, shared between every thunk built from
/// the same descriptor.
#[derive(Clone)]
pub struct Service(Arc<dyn Fn(Vec<Value>) -> ServiceFuture + Send + Sync>);

impl Service {
    /// Wrap an async function taking the call-site arguments.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Value>> + Send + 'static,
    {
        Self(Arc::new(move |args| Box::pin(f(args))))
    }

    /// Start the service call.
    pub fn call(&self, args: Vec<Value>) -> ServiceFuture {
        (self.0)(args)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Service(..)")
    }
}

/// Unvalidated description of one asynchronous entity operation.
///
/// Deserializes from `{"name": .., "type": ..}`; the service is attached
/// afterwards with [`Descriptor::with_service`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub name: Value,
    #[serde(default, rename = "type")]
    pub kind: Value,
    #[serde(skip)]
    pub service: Option<Service>,
}

impl Descriptor {
    /// An empty descriptor; every field fails validation until set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entity name. Any JSON value is accepted until validation.
    pub fn name(mut self, name: impl Into<Value>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the operation type (`"load"`, `"save"` or `"delete"`).
    pub fn kind(mut self, kind: impl Into<Value>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Attach an async function as the service.
    pub fn service<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Value>> + Send + 'static,
    {
        self.with_service(Service::new(f))
    }

    /// Attach an existing [`Service`], e.g. one shared with other descriptors.
    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Check the fields in order: name, then type, then service.
    ///
    /// The first failing field decides the error.
    pub fn validate(self) -> Result<ValidDescriptor, BuildError> {
        let name = match self.name {
            Value::String(name) if !name.is_empty() => name,
            _ => return Err(BuildError::InvalidName),
        };

        let kind = self
            .kind
            .as_str()
            .and_then(|kind| kind.parse::<OperationKind>().ok())
            .ok_or(BuildError::InvalidType)?;

        let service = self.service.ok_or(BuildError::InvalidService)?;

        Ok(ValidDescriptor {
            name,
            kind,
            service,
        })
    }

    /// Validate and derive the action set in one step.
    pub fn build(self) -> Result<EntityActions, BuildError> {
        build(Some(self))
    }
}

/// A descriptor that passed validation. Immutable from here on.
#[derive(Debug, Clone)]
pub struct ValidDescriptor {
    name: String,
    kind: OperationKind,
    service: Service,
}

impl ValidDescriptor {
    /// Entity name, also used as the `entityPath` of every derived action.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed operation type
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn service(&self) -> &Service {
        &self.service
    }
}
