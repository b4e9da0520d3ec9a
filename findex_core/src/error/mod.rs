//! error.rs – Error types for FunctionIndexer

use std::borrow::Cow;
use thiserror::Error;

/*───────────────────────────────────────────────────────────────────────────*/

/// Why an identifier was refused at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The function lives in an anonymous or function-local scope
    /// (a closure, or an item declared inside another function's body).
    LocalScope,
    /// The path is not a plain chain of identifiers: function pointers,
    /// trait-qualified paths and generic instantiations land here.
    Malformed,
    /// The path has a single segment, so there is no module to speak of.
    MissingModule,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RejectReason::LocalScope => "cannot index local functions",
            RejectReason::Malformed => "not a plain module path",
            RejectReason::MissingModule => "no module path",
        })
    }
}

/// Typed-argument deserialisation failed (JSON → `T`).
///
/// Carries the full `serde_json::Error` so callers can inspect line/column
/// information.
#[derive(Debug, Error)]
#[error("Failed to deserialize arguments: {source}")]
pub struct DeserializationError {
    #[source]
    pub source: serde_json::Error,
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        DeserializationError { source: err }
    }
}

/*───────────────────────────────────────────────────────────────────────────*/

/// All the ways indexing, resolving or calling a function can fail.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IndexError {
    /// The target has no stable static address and can never be resolved.
    #[error("Cannot index '{identifier}': {reason}")]
    InvalidTarget {
        identifier: Cow<'static, str>,
        reason: RejectReason,
    },

    /// No function was ever indexed under this hash.
    #[error("No function found with hash: {hash}")]
    NotFound { hash: String },

    /// The hash is known but nothing in this process is bound to its identifier.
    #[error("Function '{identifier}' is indexed but not bound to a callable")]
    Unbound { identifier: String },

    /// The caller supplied a different number of arguments than expected.
    #[error("Expected {expected} args, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Deserialize(#[from] DeserializationError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Something inside the target function bubbled up an error.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl IndexError {
    pub(crate) fn invalid(identifier: impl Into<Cow<'static, str>>, reason: RejectReason) -> Self {
        IndexError::InvalidTarget {
            identifier: identifier.into(),
            reason,
        }
    }
}
