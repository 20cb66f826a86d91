//! HOCON-specific error taxonomy, layered under the crate-wide error types
//! (spec §7, "ambient error handling").

use super::key::Key;
use thiserror::Error;

/// Failures raised while resolving a builder tree into a [`ConfigValue`]
/// (`super::value::ConfigValue`).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigResolverError {
    #[error("Missing required reference: '{0}'")]
    MissingSubstitution(Key),

    #[error("circular reference detected: '{from}' substitutes '{to}', which is already being resolved")]
    CycleDetected { from: Key, to: Key },

    #[error("self-reference at '{0}' could not be resolved against a prior value")]
    DanglingSelfReference(Key),

    #[error("required include '{0}' could not be resolved")]
    UnresolvedInclude(String),

    #[error("invalid value at '{path}': {failure}")]
    InvalidValue { path: Key, failure: String },
}

/// Wraps [`ConfigResolverError`] with the handful of decode-time failures
/// the [`Config`](super::config::Config) façade can additionally raise.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HoconError {
    #[error(transparent)]
    Resolver(#[from] ConfigResolverError),

    #[error("setting '{key}' has the wrong type: expected {expected}, found {found}")]
    WrongType { key: Key, expected: &'static str, found: &'static str },

    #[error("setting '{0}' is not present")]
    NotFound(Key),
}
