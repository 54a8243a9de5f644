//! Core types for entity-dispatch
//!
//! Builds request/response/error action sets for asynchronous entity
//! operations and provides the store they are dispatched into.
//!
//! # Core Concepts
//!
//! - **Descriptor**: name, operation (`load`/`save`/`delete`) and async service
//! - **Action set**: type constants, creators and a thunk derived from a descriptor
//! - **Thunk**: runs the service and dispatches one request plus one terminal action
//! - **Store**: root state (caller dataset + entity registry) behind a middleware chain
//!
//! # Basic Example
//!
//! ```ignore
//! use entity_dispatch_core::prelude::*;
//! use serde_json::json;
//!
//! let actions = Descriptor::new()
//!     .name("user")
//!     .kind("load")
//!     .service(|args| async move { Ok(json!({"id": args[0]})) })
//!     .build()?;
//!
//! let store = create_store(Dataset::new(), vec![], vec![]).into_shared();
//! let state = actions.action.call(vec![json!(7)]).run(store.clone()).await;
//!
//! assert_eq!(state, ThunkState::Succeeded);
//! assert!(store.with_state(|s| select_data(s, "user").is_some()));
//! ```

pub mod action;
pub mod builder;
pub mod descriptor;
pub mod error;
pub mod logger;
pub mod state;
pub mod store;
pub mod testing;
pub mod thunk;

pub use action::{Action, EntityAction, OperationKind, Phase};
pub use builder::{build, ActionCreator, ActionCreators, ActionTypes, EntityActions};
pub use descriptor::{Descriptor, Service, ServiceFuture, ValidDescriptor};
pub use error::BuildError;
pub use thunk::{AsyncAction, Dispatch, Thunk, ThunkState};

// Store exports
pub use state::{
    root_reducer, select_data, Dataset, DatasetState, EntityPhase, EntityRegistry, EntityStatus,
    RootState,
};
pub use store::{
    create_store, create_store_with, BoxedMiddleware, ComposedMiddleware, EntityMiddleware,
    EntityStore, Middleware, Reducer, SharedStore, Store, StoreOptions, StoreWithMiddleware,
};

// Logging exports
pub use logger::{ActionLog, ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};

// Testing exports
pub use testing::{DispatchSpy, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, EntityAction, OperationKind, Phase};
    pub use crate::builder::{build, ActionTypes, EntityActions};
    pub use crate::descriptor::{Descriptor, Service};
    pub use crate::error::BuildError;
    pub use crate::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::state::{select_data, Dataset, DatasetState, RootState};
    pub use crate::store::{
        create_store, create_store_with, BoxedMiddleware, Middleware, SharedStore, StoreOptions,
    };
    pub use crate::thunk::{Dispatch, ThunkState};
}
