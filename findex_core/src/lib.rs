#![deny(unsafe_code)]

pub mod error;
pub mod identifier;
pub mod indexer;
pub mod invoke;
pub mod models;
pub mod schema;
pub mod scope;

pub use error::{DeserializationError, IndexError, RejectReason};
pub use identifier::{FunctionHash, Identifier, LOCAL_SCOPE_MARKER};
pub use indexer::{FunctionIndexer, find_registration, registrations};
pub use invoke::{IndexableFn, IndexableMethod};
pub use models::{FunctionCall, FunctionRegistration, IndexedFn, IndexedFunction, Signature};
pub use schema::{FunctionDecl, FunctionSchema};
pub use scope::CallSite;

// Re-exported for use in generated code
pub use inventory;
pub use once_cell;
