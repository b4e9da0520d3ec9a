//! The function identifier registry.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{Value, json};

use crate::error::{IndexError, RejectReason};
use crate::identifier::{FunctionHash, Identifier, normalise};
use crate::invoke::{IndexableFn, IndexableMethod};
use crate::models::{FunctionCall, FunctionRegistration, IndexedFn, IndexedFunction, Signature};
use crate::schema::FunctionDecl;
use crate::scope::CallSite;

inventory::collect!(FunctionRegistration);

/// Every `#[indexed]` function linked into the process, keyed by its dotted
/// identifier. Registrations that fail validation are left out.
static CATALOG: Lazy<HashMap<String, &'static FunctionRegistration>> = Lazy::new(|| {
    registrations()
        .filter_map(|reg| validate_registration(reg).ok().map(|id| (id.to_string(), reg)))
        .collect()
});

/// All link-time registrations, valid or not.
pub fn registrations() -> impl Iterator<Item = &'static FunctionRegistration> {
    inventory::iter::<FunctionRegistration>.into_iter()
}

/// Looks up a valid link-time registration by dotted identifier.
pub fn find_registration(identifier: &str) -> Option<&'static FunctionRegistration> {
    CATALOG.get(&normalise(identifier)).copied()
}

fn validate_registration(reg: &FunctionRegistration) -> Result<Identifier, IndexError> {
    let type_path = (reg.type_path)();
    Identifier::from_type_path(type_path)?;
    if type_path != reg.declared_path() {
        return Err(IndexError::InvalidTarget {
            identifier: normalise(type_path).into(),
            reason: RejectReason::LocalScope,
        });
    }
    Identifier::new(reg.module, reg.name)
}

fn resolve(site: CallSite, type_path: &str) -> Result<Identifier, IndexError> {
    let identifier = Identifier::from_type_path(type_path)?;
    site.check(type_path)?;
    Ok(identifier)
}

struct Binding {
    func: Arc<IndexedFn>,
    signature: Signature,
}

/// Maps hashes of function identifiers back to the functions.
///
/// Construct one at startup, populate it with the `index_*` calls, then pass
/// it by reference to whatever needs to resolve hashes. Mutation needs
/// `&mut self`; share across threads behind your own lock.
#[derive(Default)]
pub struct FunctionIndexer {
    identifiers: HashMap<FunctionHash, Identifier>,
    bindings: HashMap<FunctionHash, Binding>,
    declarations: HashMap<FunctionHash, FunctionDecl>,
}

impl FunctionIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the registry with bare identifiers. Their callables are bound
    /// lazily from the `#[indexed]` catalog when first resolved.
    pub fn from_identifiers<I, S>(identifiers: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut indexer = Self::new();
        for raw in identifiers {
            let identifier = Identifier::parse(raw.as_ref())?;
            indexer.identifiers.insert(identifier.hash(), identifier);
        }
        Ok(indexer)
    }

    /// Builds a registry from every valid `#[indexed]` function in the
    /// process.
    pub fn collect_functions() -> Self {
        let mut indexer = Self::new();
        for reg in registrations() {
            if let Err(err) = indexer.index_registration(reg) {
                tracing::warn!(module = reg.module, name = reg.name, %err, "skipping registration");
            }
        }
        indexer
    }

    /// Indexes a free function item and returns its hash. `site` is
    /// [`call_site!()`](crate::call_site).
    ///
    /// Closures, function pointers and functions declared inside the calling
    /// function's body have no static address and are rejected with
    /// [`IndexError::InvalidTarget`].
    pub fn index_function<F, Args>(
        &mut self,
        site: CallSite,
        f: F,
    ) -> Result<FunctionHash, IndexError>
    where
        F: IndexableFn<Args>,
        Args: 'static,
    {
        let identifier = resolve(site, type_name::<F>())?;
        let signature = F::signature();
        let func: Arc<IndexedFn> = Arc::new(move |args| f.invoke(args));
        Ok(self.bind(identifier, func, signature, None))
    }

    /// Indexes a `&self` method accessed through its type, e.g.
    /// `Hotel::describe`. The receiver becomes the first call argument.
    /// Methods of types declared inside the calling function are rejected.
    pub fn index_method<F, R, Args>(
        &mut self,
        site: CallSite,
        f: F,
    ) -> Result<FunctionHash, IndexError>
    where
        F: IndexableMethod<R, Args>,
        R: 'static,
        Args: 'static,
    {
        let identifier = resolve(site, type_name::<F>())?;
        let signature = F::signature();
        let func: Arc<IndexedFn> = Arc::new(move |args| f.invoke(args));
        Ok(self.bind(identifier, func, signature, None))
    }

    /// Indexes one link-time registration.
    pub fn index_registration(
        &mut self,
        reg: &'static FunctionRegistration,
    ) -> Result<FunctionHash, IndexError> {
        let identifier = validate_registration(reg)?;
        let hash = identifier.hash();
        let decl = FunctionDecl::new(reg.name, reg.doc, (reg.param_schema)(), hash.as_str());
        Ok(self.bind(identifier, Arc::new(reg.f), (reg.signature)(), Some(decl)))
    }

    /// Indexes every `#[indexed]` function declared directly in `module`
    /// (`a::b` or `a.b`). Fails on the first invalid registration.
    pub fn index_module(&mut self, module: &str) -> Result<Vec<FunctionHash>, IndexError> {
        let module = normalise(module);
        let mut hashes = Vec::new();
        for reg in registrations().filter(|reg| normalise(reg.module) == module) {
            hashes.push(self.index_registration(reg)?);
        }
        tracing::debug!(%module, count = hashes.len(), "indexed module");
        Ok(hashes)
    }

    fn bind(
        &mut self,
        identifier: Identifier,
        func: Arc<IndexedFn>,
        signature: Signature,
        decl: Option<FunctionDecl>,
    ) -> FunctionHash {
        let hash = identifier.hash();
        tracing::debug!(%identifier, %hash, "indexed function");

        let decl = decl.unwrap_or_else(|| positional_decl(&identifier, &signature, &hash));
        self.declarations.insert(hash.clone(), decl);
        self.bindings.insert(hash.clone(), Binding { func, signature });
        self.identifiers.insert(hash.clone(), identifier);
        hash
    }

    /// Resolves a hash to its callable.
    pub fn get_function(&self, hash: &str) -> Result<IndexedFunction, IndexError> {
        let (key, identifier) =
            self.identifiers
                .get_key_value(hash)
                .ok_or_else(|| IndexError::NotFound {
                    hash: hash.to_owned(),
                })?;

        if let Some(binding) = self.bindings.get(hash) {
            return Ok(IndexedFunction {
                identifier: identifier.clone(),
                hash: key.clone(),
                signature: binding.signature.clone(),
                func: binding.func.clone(),
            });
        }

        let reg = find_registration(&identifier.to_string()).ok_or_else(|| {
            IndexError::Unbound {
                identifier: identifier.to_string(),
            }
        })?;
        Ok(IndexedFunction {
            identifier: identifier.clone(),
            hash: key.clone(),
            signature: (reg.signature)(),
            func: Arc::new(reg.f),
        })
    }

    /// Resolves and invokes in one step.
    pub fn call(&self, call: FunctionCall) -> Result<Value, IndexError> {
        let FunctionCall { hash, arguments } = call;
        self.get_function(&hash)?.call(arguments)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.identifiers.contains_key(hash)
    }

    pub fn identifier(&self, hash: &str) -> Option<&Identifier> {
        self.identifiers.get(hash)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = (&FunctionHash, &Identifier)> + '_ {
        self.identifiers.iter()
    }

    pub fn signatures(&self) -> impl Iterator<Item = (&FunctionHash, &Signature)> + '_ {
        self.bindings.iter().map(|(k, b)| (k, &b.signature))
    }

    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.declarations
            .values()
            .map(|d| (d.name.as_str(), d.description.as_str()))
    }

    pub fn declarations(&self) -> impl Iterator<Item = &FunctionDecl> + '_ {
        self.declarations.values()
    }

    pub fn json(&self) -> Result<Value, IndexError> {
        let list: Vec<&FunctionDecl> = self.declarations.values().collect();
        Ok(serde_json::to_value(list)?)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn clear(&mut self) {
        self.identifiers.clear();
        self.bindings.clear();
        self.declarations.clear();
    }
}

/// Declaration for a function indexed at runtime, where parameter names and
/// schemas are unknown: a fixed-length positional array.
fn positional_decl(
    identifier: &Identifier,
    signature: &Signature,
    hash: &FunctionHash,
) -> FunctionDecl {
    let items: Vec<Value> = signature
        .receiver
        .iter()
        .chain(signature.inputs.iter())
        .map(|ty| json!({ "description": ty }))
        .collect();
    FunctionDecl::new(
        identifier.qualname(),
        "",
        json!({
            "type": "array",
            "prefixItems": items,
            "minItems": signature.arity(),
            "maxItems": signature.arity()
        }),
        hash.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    fn this_is_a_test_function() -> String {
        "Hello, World!".to_string()
    }

    fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct TestClass {
        greeting: Option<String>,
    }

    impl TestClass {
        fn test_class_method(&self) -> String {
            self.greeting
                .clone()
                .unwrap_or_else(|| "Hello, World!".to_string())
        }

        fn repeat(&self, times: usize) -> String {
            self.test_class_method().repeat(times)
        }

        fn index_into(indexer: &mut FunctionIndexer) -> Result<FunctionHash, IndexError> {
            indexer.index_method(crate::call_site!(), TestClass::test_class_method)?;
            indexer.index_method(crate::call_site!(), TestClass::repeat)
        }
    }

    #[test]
    fn test_function_indexer() {
        let mut indexer = FunctionIndexer::new();
        let hash = indexer
            .index_function(crate::call_site!(), this_is_a_test_function)
            .unwrap();
        assert_eq!(hash.as_str().len(), FunctionHash::LEN);

        let retrieved = indexer.get_function(hash.as_str()).unwrap();
        assert_eq!(retrieved.call(json!(null)).unwrap(), json!("Hello, World!"));
        assert_eq!(
            retrieved.identifier().to_string(),
            "findex_core.indexer.tests.this_is_a_test_function"
        );

        let err = indexer.get_function("nonexistenthash").unwrap_err();
        assert!(matches!(err, IndexError::NotFound { .. }));
    }

    #[test]
    fn test_function_indexer_from_class() {
        let mut indexer = FunctionIndexer::new();
        let hash = indexer
            .index_method(crate::call_site!(), TestClass::test_class_method)
            .unwrap();

        let retrieved = indexer.get_function(hash.as_str()).unwrap();
        assert_eq!(retrieved.identifier().qualname(), "TestClass.test_class_method");
        assert_eq!(retrieved.signature().arity(), 1);

        let instance = TestClass::default();
        let out: String = retrieved.call_typed((instance,)).unwrap();
        assert_eq!(out, "Hello, World!");

        let custom = TestClass {
            greeting: Some("Hi".into()),
        };
        assert_eq!(
            retrieved.call(json!([custom])).unwrap(),
            json!("Hi")
        );
    }

    #[test]
    fn test_method_with_arguments() {
        let mut indexer = FunctionIndexer::new();
        let hash = indexer.index_method(crate::call_site!(), TestClass::repeat).unwrap();
        let out = indexer
            .call(FunctionCall::new(hash.as_str(), json!([{ "greeting": "ab" }, 3])))
            .unwrap();
        assert_eq!(out, json!("ababab"));

        let err = indexer
            .call(FunctionCall::new(hash.as_str(), json!([{ "greeting": "ab" }])))
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::ArityMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_methods_indexed_from_their_impl() {
        let mut indexer = FunctionIndexer::new();
        let hash = TestClass::index_into(&mut indexer).unwrap();
        assert_eq!(indexer.len(), 2);
        assert_eq!(indexer.identifier(hash.as_str()).unwrap().qualname(), "TestClass.repeat");
    }

    #[test]
    fn test_function_indexer_nested() {
        fn my_dummy_function() -> String {
            "Hello, World!".to_string()
        }
        assert_eq!(my_dummy_function(), "Hello, World!");

        let mut indexer = FunctionIndexer::new();
        let err = indexer
            .index_function(crate::call_site!(), my_dummy_function)
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTarget {
                reason: RejectReason::LocalScope,
                ..
            }
        ));
        assert!(indexer.is_empty());
    }

    #[test]
    fn test_closure_rejected() {
        let mut indexer = FunctionIndexer::new();
        let my_dummy_function = || "Hello, World!".to_string();

        let err = indexer
            .index_function(crate::call_site!(), my_dummy_function)
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTarget {
                reason: RejectReason::LocalScope,
                ..
            }
        ));
    }

    #[test]
    fn test_method_of_local_type_rejected() {
        #[derive(Deserialize)]
        struct Local;

        impl Local {
            fn m(&self) -> u8 {
                1
            }
        }
        assert_eq!(Local.m(), 1);

        let mut indexer = FunctionIndexer::new();
        let err = indexer.index_method(crate::call_site!(), Local::m).unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTarget {
                reason: RejectReason::LocalScope,
                ..
            }
        ));
        assert!(indexer.is_empty());
    }

    #[test]
    fn test_function_pointer_rejected() {
        let mut indexer = FunctionIndexer::new();
        let ptr: fn(i32, i32) -> i32 = add;
        let err = indexer.index_function(crate::call_site!(), ptr).unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTarget {
                reason: RejectReason::Malformed,
                ..
            }
        ));
    }

    #[test]
    fn test_deterministic_and_distinct() {
        let mut indexer = FunctionIndexer::new();
        let first = indexer.index_function(crate::call_site!(), add).unwrap();
        let second = indexer.index_function(crate::call_site!(), add).unwrap();
        let other = indexer
            .index_function(crate::call_site!(), this_is_a_test_function)
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(indexer.len(), 2);
    }

    #[test]
    fn test_positional_declaration() {
        let mut indexer = FunctionIndexer::new();
        let hash = indexer.index_function(crate::call_site!(), add).unwrap();

        let decl = indexer.declarations().next().unwrap();
        assert_eq!(decl.name, "add");
        assert_eq!(decl.hash, hash.as_str());
        assert_eq!(decl.parameters["minItems"], json!(2));

        let json = indexer.json().unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_unbound_identifier() {
        let indexer = FunctionIndexer::from_identifiers(["pkg.mod.greet"]).unwrap();
        assert!(indexer.contains("c9b3ebc90398726f34880f122c852a01d68e2960"));

        let err = indexer
            .get_function("c9b3ebc90398726f34880f122c852a01d68e2960")
            .unwrap_err();
        assert!(matches!(err, IndexError::Unbound { .. }));
    }

    #[test]
    fn test_clear() {
        let mut indexer = FunctionIndexer::new();
        let hash = indexer.index_function(crate::call_site!(), add).unwrap();
        indexer.clear();
        assert!(!indexer.contains(hash.as_str()));
        assert_eq!(indexer.declarations().count(), 0);
    }
}
