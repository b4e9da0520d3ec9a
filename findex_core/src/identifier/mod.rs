//! Function identifiers and their hashes.
//!
//! An identifier is the dotted `<module path>.<qualified name>` of a function
//! with a static address, e.g. `findex.travel.trip.book_trip` or
//! `my_crate.hotel.Hotel.describe`. Rust paths (`a::b::c`) are accepted
//! everywhere and normalised to the dotted form before hashing.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{IndexError, RejectReason};

/// Prefix of the path segments rustc generates for anonymous scopes
/// (`{{closure}}`, `{{constant}}`, ...).
pub const LOCAL_SCOPE_MARKER: &str = "{{";

/// Fully-qualified, validated name of an indexable function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    module: String,
    qualname: String,
}

impl Identifier {
    /// Builds an identifier from an explicit module path and qualified name.
    /// Both parts may use `.` or `::` as separator.
    pub fn new(module: &str, qualname: &str) -> Result<Self, IndexError> {
        let module = normalise(module);
        let qualname = normalise(qualname);
        let full = format!("{module}.{qualname}");
        if module.is_empty() {
            return Err(IndexError::invalid(full, RejectReason::MissingModule));
        }
        validate(&full)?;
        Ok(Self { module, qualname })
    }

    /// Builds an identifier from a compiler type path such as the one
    /// returned by [`std::any::type_name`] for a fn item.
    ///
    /// A type path does not say where the module part ends. Segments up to
    /// the first one starting with an uppercase letter (a type) are taken as
    /// the module; when there is no such segment only the last segment is
    /// the qualified name.
    pub fn from_type_path(path: &str) -> Result<Self, IndexError> {
        let dotted = normalise(path);
        validate(&dotted)?;

        let segments: Vec<&str> = dotted.split('.').collect();
        let last = segments.len() - 1;
        let split = segments[..last]
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_ascii_uppercase()))
            .unwrap_or(last);

        if split == 0 {
            return Err(IndexError::invalid(dotted, RejectReason::MissingModule));
        }

        Ok(Self {
            module: segments[..split].join("."),
            qualname: segments[split..].join("."),
        })
    }

    /// Alias of [`Identifier::from_type_path`] for already dotted strings.
    pub fn parse(identifier: &str) -> Result<Self, IndexError> {
        Self::from_type_path(identifier)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Function name, prefixed by its enclosing type for methods.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// The last segment: the bare function or method name.
    pub fn name(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.module.split('.').chain(self.qualname.split('.'))
    }

    /// True when `module` (dotted or `::`) is exactly this identifier's module.
    pub fn is_in_module(&self, module: &str) -> bool {
        self.module == normalise(module)
    }

    pub fn hash(&self) -> FunctionHash {
        FunctionHash::of(&self.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.qualname)
    }
}

pub(crate) fn normalise(path: &str) -> String {
    path.trim().replace("::", ".")
}

fn validate(dotted: &str) -> Result<(), IndexError> {
    if dotted
        .split('.')
        .any(|segment| segment.starts_with(LOCAL_SCOPE_MARKER))
    {
        return Err(IndexError::invalid(dotted.to_owned(), RejectReason::LocalScope));
    }
    if !dotted.split('.').all(is_ident) {
        return Err(IndexError::invalid(dotted.to_owned(), RejectReason::Malformed));
    }
    Ok(())
}

fn is_ident(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    segment != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// HASH
// ============================================================================

/// Lowercase hex SHA-1 digest of an identifier; 40 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionHash(String);

impl FunctionHash {
    pub const LEN: usize = 40;

    pub fn of(identifier: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(identifier.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FunctionHash {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FunctionHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FunctionHash {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FunctionHash {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
