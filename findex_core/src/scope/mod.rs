//! Where an `index_*` call was made from.
//!
//! `type_name` of a fn item declared inside a function body reads like a
//! module path (`my_crate::outer::inner`), so the path alone cannot tell a
//! nested function from a module-level one. Such an item can only be named
//! from inside the body that declares it, so the registry compares the
//! target's path with the function enclosing the call.

use crate::error::{IndexError, RejectReason};
use crate::identifier::normalise;

/// Captures the caller's location for [`FunctionIndexer`](crate::FunctionIndexer).
///
/// ```
/// use findex_core::{FunctionIndexer, call_site};
///
/// fn greet() -> String {
///     "Hello, World!".to_string()
/// }
///
/// fn main() {
///     let mut indexer = FunctionIndexer::new();
///     let hash = indexer.index_function(call_site!(), greet).unwrap();
///     assert_eq!(hash.as_str().len(), 40);
/// }
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __findex_call_site() {}
        $crate::CallSite::new(
            ::core::module_path!(),
            ::core::any::type_name_of_val(&__findex_call_site),
        )
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    module: &'static str,
    /// Path of the item scope the call sits in: the module, or the function
    /// body (and nested blocks) inside it.
    scope: &'static str,
}

impl CallSite {
    /// `marker` is the type path of a fn item declared at the call site.
    pub fn new(module: &'static str, marker: &'static str) -> Self {
        let scope = marker.rsplit_once("::").map_or(marker, |(scope, _)| scope);
        Self { module, scope }
    }

    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Path of the outermost function whose body contains the call. For a
    /// method this includes its type, e.g. `a::b::Hotel::describe`.
    pub fn enclosing_fn(&self) -> Option<&'static str> {
        let scope = self.scope;
        let rest = scope.strip_prefix(self.module)?.strip_prefix("::")?;
        let mut end = self.module.len() + 2;
        for segment in rest.split("::") {
            end += segment.len();
            if !segment.starts_with(char::is_uppercase) {
                return Some(&scope[..end]);
            }
            end += 2;
        }
        None
    }

    /// Rejects items declared inside the body of the calling function.
    pub(crate) fn check(&self, type_path: &str) -> Result<(), IndexError> {
        let Some(body) = self.enclosing_fn() else {
            return Ok(());
        };
        let nested = type_path
            .strip_prefix(body)
            .is_some_and(|rest| rest.starts_with("::"));
        if nested {
            return Err(IndexError::invalid(normalise(type_path), RejectReason::LocalScope));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing_fn() {
        let site = crate::call_site!();
        assert_eq!(site.module(), "findex_core::scope::tests");
        assert_eq!(
            site.enclosing_fn(),
            Some("findex_core::scope::tests::test_enclosing_fn")
        );

        let top = CallSite::new("a::b", "a::b::marker");
        assert_eq!(top.enclosing_fn(), None);

        let deep = CallSite::new("a::b", "a::b::outer::{{closure}}::marker");
        assert_eq!(deep.enclosing_fn(), Some("a::b::outer"));

        let method = CallSite::new("a::b", "a::b::Hotel::register::marker");
        assert_eq!(method.enclosing_fn(), Some("a::b::Hotel::register"));
    }

    #[test]
    fn test_check() {
        let site = CallSite::new("a::b", "a::b::outer::marker");
        assert!(site.check("a::b::greet").is_ok());
        assert!(site.check("a::b::outer_helper").is_ok());
        assert!(site.check("a::b::Type::outer").is_ok());

        let err = site.check("a::b::outer::inner").unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTarget {
                reason: RejectReason::LocalScope,
                ref identifier,
            } if identifier == "a.b.outer.inner"
        ));
        assert!(site.check("a::b::outer::Local::m").is_err());

        // sibling methods may be indexed from inside a method
        let method = CallSite::new("a::b", "a::b::Hotel::register::marker");
        assert!(method.check("a::b::Hotel::describe").is_ok());
        assert!(method.check("a::b::Hotel::register::inner").is_err());
    }
}
