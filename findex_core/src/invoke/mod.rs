//! Adapters from typed fn items to [`IndexedFn`](crate::IndexedFn).
//!
//! Only zero-sized fn items survive identifier validation, so in practice
//! these are implemented for free functions (`IndexableFn`) and for `&self`
//! methods accessed through their type (`IndexableMethod`). Arguments arrive
//! as a positional JSON array.

use std::any::type_name;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{DeserializationError, IndexError};
use crate::models::Signature;

/// A free function callable with positional JSON arguments.
pub trait IndexableFn<Args>: Send + Sync + 'static {
    fn signature() -> Signature;
    fn invoke(&self, args: Value) -> Result<Value, IndexError>;
}

/// A `&self` method whose receiver is passed as the first positional argument.
pub trait IndexableMethod<Recv, Args>: Send + Sync + 'static {
    fn signature() -> Signature;
    fn invoke(&self, args: Value) -> Result<Value, IndexError>;
}

/// Splits `args` into exactly `expected` positional values.
///
/// `null`, `[]` and `{}` stand for "no arguments"; a non-array value is
/// accepted as the sole argument of a unary function.
pub(crate) fn positional(args: Value, expected: usize) -> Result<Vec<Value>, IndexError> {
    let values = match args {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        Value::Object(map) if map.is_empty() && expected == 0 => Vec::new(),
        other => vec![other],
    };
    if values.len() != expected {
        return Err(IndexError::ArityMismatch {
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

fn next_arg<T: DeserializeOwned>(
    args: &mut impl Iterator<Item = Value>,
) -> Result<T, IndexError> {
    let raw = args.next().unwrap_or(Value::Null);
    serde_json::from_value(raw).map_err(|e| DeserializationError::from(e).into())
}

macro_rules! impl_indexable {
    ($($len:expr => ($($arg:ident)*))+) => {
        $(
            impl<F, O, $($arg,)*> IndexableFn<($($arg,)*)> for F
            where
                F: Fn($($arg),*) -> O + Send + Sync + 'static,
                O: Serialize,
                $($arg: DeserializeOwned,)*
            {
                fn signature() -> Signature {
                    Signature {
                        receiver: None,
                        inputs: vec![$(type_name::<$arg>()),*],
                        output: type_name::<O>(),
                    }
                }

                #[allow(non_snake_case, unused_mut, unused_variables)]
                fn invoke(&self, args: Value) -> Result<Value, IndexError> {
                    let mut args = positional(args, $len)?.into_iter();
                    $(let $arg: $arg = next_arg(&mut args)?;)*
                    Ok(serde_json::to_value((self)($($arg),*))?)
                }
            }

            impl<F, R, O, $($arg,)*> IndexableMethod<R, ($($arg,)*)> for F
            where
                F: Fn(&R $(, $arg)*) -> O + Send + Sync + 'static,
                R: DeserializeOwned,
                O: Serialize,
                $($arg: DeserializeOwned,)*
            {
                fn signature() -> Signature {
                    Signature {
                        receiver: Some(type_name::<R>()),
                        inputs: vec![$(type_name::<$arg>()),*],
                        output: type_name::<O>(),
                    }
                }

                #[allow(non_snake_case, unused_mut)]
                fn invoke(&self, args: Value) -> Result<Value, IndexError> {
                    let mut args = positional(args, $len + 1)?.into_iter();
                    let receiver: R = next_arg(&mut args)?;
                    $(let $arg: $arg = next_arg(&mut args)?;)*
                    Ok(serde_json::to_value((self)(&receiver $(, $arg)*))?)
                }
            }
        )+
    };
}

impl_indexable! {
    0 => ()
    1 => (A0)
    2 => (A0 A1)
    3 => (A0 A1 A2)
    4 => (A0 A1 A2 A3)
    5 => (A0 A1 A2 A3 A4)
    6 => (A0 A1 A2 A3 A4 A5)
}
