//! Hash-addressed function registry.
//!
//! Functions are indexed under the SHA-1 of their dotted identifier
//! (`module.qualname`) and resolved back to a callable from that hash alone.
//! Free functions annotated with [`indexed`] are also registered at link time,
//! so a registry can be seeded from identifiers or whole modules.
//!
//! The [`travel`] and [`chat`] modules are a small demo built on top of the
//! registry: mock travel functions and an offline assistant that picks one to
//! answer a message.

#![deny(unsafe_code)]

pub mod chat;
pub mod config;
pub mod prelude;
pub mod travel;

pub use findex_core::{
    CallSite, DeserializationError, FunctionCall, FunctionDecl, FunctionHash, FunctionIndexer,
    FunctionRegistration, FunctionSchema, Identifier, IndexError, IndexableFn, IndexableMethod,
    IndexedFunction, LOCAL_SCOPE_MARKER, RejectReason, Signature, call_site, find_registration,
    registrations,
};
pub use findex_macros::{FunctionSchema, indexed};

// Re-exported for use in generated code
pub use findex_core::{inventory, once_cell};

use serde_json::Value;

/// Registry holding every `#[indexed]` function linked into the binary.
pub fn collect_functions() -> FunctionIndexer {
    FunctionIndexer::collect_functions()
}

/// Function declarations for every `#[indexed]` function, as a JSON array.
pub fn function_declarations() -> Result<Value, IndexError> {
    collect_functions().json()
}

/// Registry seeded with the given modules.
pub fn index_modules<I, S>(modules: I) -> Result<FunctionIndexer, IndexError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut indexer = FunctionIndexer::new();
    for module in modules {
        indexer.index_module(module.as_ref())?;
    }
    Ok(indexer)
}
