//! Convenient re-exports for common usage patterns.
//!
//! ```rust
//! use findex_rs::prelude::*;
//! ```

// Core functionality
pub use crate::{collect_functions, function_declarations, index_modules};

// Essential types
pub use crate::{
    FunctionCall, FunctionDecl, FunctionHash, FunctionIndexer, FunctionSchema, Identifier,
    IndexError, IndexedFunction,
};

// Macros
pub use crate::{call_site, indexed};

// Commonly used external types
pub use serde::{Deserialize, Serialize};
pub use serde_json::{Value, json};
