//! JSON-Schema generation for function parameters and results.
//!
//! Declarations built from these schemas are what a language model sees
//! when it picks a function to call.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Types that can describe themselves as a JSON Schema.
pub trait FunctionSchema {
    fn schema() -> Value;
}

macro_rules! prim {
    ($ty:ty, $name:expr) => {
        impl FunctionSchema for $ty {
            fn schema() -> Value {
                static SCHEMA: Lazy<Value> = Lazy::new(|| serde_json::json!({ "type": $name }));
                SCHEMA.clone()
            }
        }
    };
}

prim!(bool, "boolean");
prim!(i8, "integer");
prim!(i16, "integer");
prim!(i32, "integer");
prim!(i64, "integer");
prim!(isize, "integer");
prim!(u8, "integer");
prim!(u16, "integer");
prim!(u32, "integer");
prim!(u64, "integer");
prim!(usize, "integer");
prim!(f32, "number");
prim!(f64, "number");
prim!(String, "string");
prim!(str, "string");
prim!(&'_ str, "string");
prim!((), "null");

impl<T: FunctionSchema> FunctionSchema for Option<T> {
    fn schema() -> Value {
        // generic over T, so no static cache here
        serde_json::json!({
            "anyOf": [
                T::schema(),
                { "type": "null" }
            ]
        })
    }
}

impl<T: FunctionSchema> FunctionSchema for Vec<T> {
    fn schema() -> Value {
        serde_json::json!({
            "type": "array",
            "items": T::schema()
        })
    }
}

impl<T: FunctionSchema> FunctionSchema for HashMap<String, T> {
    fn schema() -> Value {
        serde_json::json!({
            "type": "object",
            "additionalProperties": T::schema()
        })
    }
}

impl<T: FunctionSchema, E> FunctionSchema for Result<T, E> {
    fn schema() -> Value {
        T::schema()
    }
}

macro_rules! impl_tuples {
    ($($len:expr => ($($name:ident)+))+) => {
        $(
            impl<$($name: FunctionSchema),+> FunctionSchema for ($($name,)+) {
                fn schema() -> Value {
                    serde_json::json!({
                        "type": "array",
                        "prefixItems": [$($name::schema()),+],
                        "minItems": $len,
                        "maxItems": $len
                    })
                }
            }
        )+
    }
}

impl_tuples! {
    1 => (T0)
    2 => (T0 T1)
    3 => (T0 T1 T2)
    4 => (T0 T1 T2 T3)
    5 => (T0 T1 T2 T3 T4)
    6 => (T0 T1 T2 T3 T4 T5)
}

// ============================================================================
// DECLARATIONS
// ============================================================================

/// Function declaration for LLM consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    /// Registry hash the model's choice maps back to.
    pub hash: String,
}

impl FunctionDecl {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            hash: hash.into(),
        }
    }
}
