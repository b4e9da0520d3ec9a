//! Core data models for the findex registry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{DeserializationError, IndexError};
use crate::identifier::{FunctionHash, Identifier};

/// Type-erased callable: JSON arguments in, JSON result out.
pub type IndexedFn = dyn Fn(Value) -> Result<Value, IndexError> + Send + Sync;

/// A request to invoke an indexed function, as produced from a model's
/// function choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub hash: String,
    pub arguments: Value,
}

impl FunctionCall {
    pub fn new(hash: impl Into<String>, arguments: Value) -> Self {
        Self {
            hash: hash.into(),
            arguments,
        }
    }
}

/// Runtime type signature information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Receiver type for methods indexed through their type.
    pub receiver: Option<&'static str>,
    pub inputs: Vec<&'static str>,
    pub output: &'static str,
}

impl Signature {
    /// Number of positional arguments a call expects, receiver included.
    pub fn arity(&self) -> usize {
        self.inputs.len() + usize::from(self.receiver.is_some())
    }
}

/// Link-time registration emitted by `#[indexed]`.
pub struct FunctionRegistration {
    /// `module_path!()` at the declaration site.
    pub module: &'static str,
    pub name: &'static str,
    /// Doc-string shown to the LLM.
    pub doc: &'static str,
    /// Compiler type path of the fn item; differs from `module::name` when
    /// the function was declared inside another function's body.
    pub type_path: fn() -> &'static str,
    pub f: fn(Value) -> Result<Value, IndexError>,
    pub param_schema: fn() -> Value,
    pub signature: fn() -> Signature,
}

impl FunctionRegistration {
    pub const fn new(
        module: &'static str,
        name: &'static str,
        doc: &'static str,
        type_path: fn() -> &'static str,
        f: fn(Value) -> Result<Value, IndexError>,
        param_schema: fn() -> Value,
        signature: fn() -> Signature,
    ) -> Self {
        Self {
            module,
            name,
            doc,
            type_path,
            f,
            param_schema,
            signature,
        }
    }

    /// Declared `module::name`, which must equal the type path for the
    /// function to have a static address.
    pub fn declared_path(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }
}

impl fmt::Debug for FunctionRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistration")
            .field("module", &self.module)
            .field("name", &self.name)
            .field("type_path", &(self.type_path)())
            .finish_non_exhaustive()
    }
}

/// A resolved function: the callable plus what it was indexed as.
#[derive(Clone)]
pub struct IndexedFunction {
    pub(crate) identifier: Identifier,
    pub(crate) hash: FunctionHash,
    pub(crate) signature: Signature,
    pub(crate) func: Arc<IndexedFn>,
}

impl IndexedFunction {
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn hash(&self) -> &FunctionHash {
        &self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invokes the function with positional JSON arguments (`null` or `[]`
    /// for none). Methods take their receiver as the first element.
    pub fn call(&self, args: Value) -> Result<Value, IndexError> {
        (self.func)(args)
    }

    /// Serialises `args`, calls, and deserialises the result.
    pub fn call_typed<A, O>(&self, args: A) -> Result<O, IndexError>
    where
        A: Serialize,
        O: DeserializeOwned,
    {
        let out = self.call(serde_json::to_value(args)?)?;
        serde_json::from_value(out).map_err(|e| DeserializationError::from(e).into())
    }
}

impl fmt::Debug for IndexedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedFunction")
            .field("identifier", &self.identifier.to_string())
            .field("hash", &self.hash)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
