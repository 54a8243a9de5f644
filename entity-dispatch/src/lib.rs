//! entity-dispatch: request/response/error action sets for centralized stores
//!
//! Describe an asynchronous entity operation once and get its action type
//! constants, action creators and a dispatching thunk.
//!
//! # Example
//! ```ignore
//! use entity_dispatch::prelude::*;
//! use serde_json::json;
//!
//! let user = Descriptor::new()
//!     .name("user")
//!     .kind("save")
//!     .service(|args| async move { api::save_user(args).await })
//!     .build()?;
//!
//! assert_eq!(user.types.request(), "REQUEST_SAVE_USER");
//! assert_eq!(user.creators.response().key(), "responseSaveUser");
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! user.action.call(vec![json!({"id": 1})]).run(tx).await;
//! ```

// Re-export everything from core
pub use entity_dispatch_core::*;

/// Prelude for convenient imports
pub mod prelude {
    // Builder
    pub use entity_dispatch_core::{
        build, ActionCreator, ActionCreators, ActionTypes, BuildError, Descriptor, EntityActions,
        Service,
    };

    // Actions and thunks
    pub use entity_dispatch_core::{
        Action, AsyncAction, Dispatch, EntityAction, OperationKind, Phase, Thunk, ThunkState,
    };

    // Store
    pub use entity_dispatch_core::{
        create_store, create_store_with, select_data, BoxedMiddleware, Dataset, DatasetState,
        EntityStore, Middleware, RootState, SharedStore, StoreOptions,
    };

    // Logging
    pub use entity_dispatch_core::{ActionLoggerConfig, ActionLoggerMiddleware};
}
