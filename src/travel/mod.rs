//! Mock travel services.
//!
//! Every function here is `#[indexed]` and returns randomly generated dummy
//! data of a fixed shape. Nothing talks to a real API.

pub mod lodging;
pub mod trip;
pub mod weather;

/// Module paths of the travel services, as accepted by
/// [`FunctionIndexer::index_module`](crate::FunctionIndexer::index_module).
pub const MODULES: [&str; 3] = [
    "findex_rs::travel::trip",
    "findex_rs::travel::weather",
    "findex_rs::travel::lodging",
];
