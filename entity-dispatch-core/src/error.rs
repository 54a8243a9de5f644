//! Errors raised while building entity actions

use thiserror::Error;

/// Reasons a descriptor is rejected by the action builder.
///
/// Validation runs before any derived artifact exists, so a `BuildError`
/// always means nothing was produced.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BuildError {
    /// No descriptor was supplied at all.
    #[error("ACTION_BUILDER: a descriptor is required.")]
    MissingDescriptor,

    /// `name` is missing, not a string, or empty.
    #[error("ACTION_BUILDER: the name parameter should be a string.")]
    InvalidName,

    /// `type` is missing, not a string, or not one of the accepted operations.
    #[error(
        "ACTION_BUILDER: the type parameter should be a string and the value one of these: load,save,delete."
    )]
    InvalidType,

    /// `service` is missing.
    #[error("ACTION_BUILDER: the service parameter should be a function.")]
    InvalidService,
}
