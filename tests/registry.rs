use std::collections::HashMap;

use findex_rs::{
    FunctionCall, FunctionHash, FunctionIndexer, Identifier, IndexError, RejectReason, Signature,
    call_site, indexed,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[indexed]
/// Greets the world.
fn greet() -> String {
    "Hello, World!".to_string()
}

#[indexed]
/// Adds two numbers.
fn add(a: i32, b: i32) -> i32 {
    a + b
}

#[indexed]
/// Shouts a word, or whispers it.
fn shout(word: String, quiet: Option<bool>) -> String {
    if quiet.unwrap_or(false) {
        word.to_lowercase()
    } else {
        word.to_uppercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestClass {
    name: String,
}

impl TestClass {
    fn method(&self) -> String {
        format!("Hello, {}!", self.name)
    }
}

#[test]
fn test_known_digest() {
    let hash = Identifier::new("pkg.mod", "greet").unwrap().hash();
    assert_eq!(hash, "c9b3ebc90398726f34880f122c852a01d68e2960");
}

#[test]
fn test_index_and_resolve_free_function() {
    let mut indexer = FunctionIndexer::new();
    let hash = indexer.index_function(call_site!(), greet).unwrap();
    assert_eq!(hash.as_str().len(), FunctionHash::LEN);
    assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(hash, Identifier::new("registry", "greet").unwrap().hash());

    let func = indexer.get_function(hash.as_str()).unwrap();
    assert_eq!(func.identifier().to_string(), "registry.greet");
    assert_eq!(func.call(json!(null)).unwrap(), json!("Hello, World!"));
    assert_eq!(func.call_typed::<(), String>(()).unwrap(), "Hello, World!");
}

#[test]
fn test_indexing_is_deterministic_and_distinct() {
    let mut indexer = FunctionIndexer::new();
    let first = indexer.index_function(call_site!(), greet).unwrap();
    let second = indexer.index_function(call_site!(), greet).unwrap();
    let other = indexer.index_function(call_site!(), add).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(indexer.len(), 2);
}

#[test]
fn test_positional_call() {
    let mut indexer = FunctionIndexer::new();
    let hash = indexer.index_function(call_site!(), add).unwrap();
    let result = indexer
        .call(FunctionCall::new(hash.as_str(), json!([2, 3])))
        .unwrap();
    assert_eq!(result, json!(5));

    let err = indexer
        .call(FunctionCall::new(hash.as_str(), json!([2])))
        .unwrap_err();
    assert!(matches!(err, IndexError::ArityMismatch { expected: 2, found: 1 }));

    let err = indexer
        .call(FunctionCall::new(hash.as_str(), json!(["two", 3])))
        .unwrap_err();
    assert!(matches!(err, IndexError::Deserialize(_)));
}

#[test]
fn test_nonexistent_hash() {
    let indexer = FunctionIndexer::new();
    let err = indexer.get_function("nonexistenthash").unwrap_err();
    assert!(matches!(err, IndexError::NotFound { ref hash } if hash == "nonexistenthash"));
    assert_eq!(err.to_string(), "No function found with hash: nonexistenthash");
}

#[test]
fn test_method_through_its_type() {
    let mut indexer = FunctionIndexer::new();
    let hash = indexer.index_method(call_site!(), TestClass::method).unwrap();
    assert_eq!(
        hash,
        Identifier::new("registry", "TestClass.method").unwrap().hash()
    );

    let func = indexer.get_function(hash.as_str()).unwrap();
    assert_eq!(func.identifier().qualname(), "TestClass.method");
    let receiver = TestClass {
        name: "Ada".to_string(),
    };
    assert_eq!(
        func.call_typed::<_, String>([receiver]).unwrap(),
        "Hello, Ada!"
    );
}

#[test]
fn test_closures_are_rejected() {
    let mut indexer = FunctionIndexer::new();
    let err = indexer.index_function(call_site!(), || 1).unwrap_err();
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
fn test_registered_functions_take_named_arguments() {
    let indexer = FunctionIndexer::collect_functions();
    let hash = Identifier::new("registry", "shout").unwrap().hash();
    let func = indexer.get_function(hash.as_str()).unwrap();

    assert_eq!(func.call(json!({ "word": "hey" })).unwrap(), json!("HEY"));
    assert_eq!(
        func.call(json!({ "word": "HEY", "quiet": true })).unwrap(),
        json!("hey")
    );
    assert_eq!(func.call(json!(["hey", null])).unwrap(), json!("HEY"));
}

#[test]
fn test_index_module_and_declarations() {
    let mut indexer = FunctionIndexer::new();
    let hashes = indexer.index_module("registry").unwrap();
    assert_eq!(hashes.len(), 3);

    let decls = indexer.json().unwrap();
    let add_decl = decls
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["name"] == "add")
        .unwrap();
    assert_eq!(add_decl["description"], "Adds two numbers.");
    assert_eq!(add_decl["parameters"]["properties"]["a"]["type"], "integer");
    assert_eq!(add_decl["parameters"]["required"], json!(["a", "b"]));
    assert_eq!(
        add_decl["hash"],
        Identifier::new("registry", "add").unwrap().hash().as_str()
    );

    let shout_decl = indexer.declarations().find(|d| d.name == "shout").unwrap();
    assert_eq!(shout_decl.parameters["required"], json!(["word"]));
}

#[test]
fn test_signatures_and_descriptions() {
    let mut indexer = FunctionIndexer::new();
    indexer.index_module("registry").unwrap();
    let method = indexer.index_method(call_site!(), TestClass::method).unwrap();

    let add = Identifier::new("registry", "add").unwrap().hash();
    let signatures: HashMap<&FunctionHash, &Signature> = indexer.signatures().collect();
    assert_eq!(signatures.len(), 4);
    assert_eq!(signatures[&add].inputs, ["i32", "i32"]);
    assert_eq!(signatures[&add].output, "i32");
    assert!(signatures[&add].receiver.is_none());
    assert_eq!(signatures[&method].arity(), 1);
    assert!(signatures[&method].receiver.is_some_and(|r| r.ends_with("TestClass")));

    let descriptions: HashMap<&str, &str> = indexer.descriptions().collect();
    assert_eq!(descriptions["add"], "Adds two numbers.");
    assert_eq!(descriptions["shout"], "Shouts a word, or whispers it.");
    // runtime-indexed methods carry no docs
    assert_eq!(descriptions["TestClass.method"], "");
}

#[test]
fn test_seeded_from_identifiers() {
    let indexer = FunctionIndexer::from_identifiers(["registry.greet", "nowhere.greet"]).unwrap();
    assert_eq!(indexer.len(), 2);

    let greet_hash = Identifier::parse("registry.greet").unwrap().hash();
    let func = indexer.get_function(greet_hash.as_str()).unwrap();
    assert_eq!(func.call(json!(null)).unwrap(), json!("Hello, World!"));

    let missing = Identifier::parse("nowhere.greet").unwrap().hash();
    let err = indexer.get_function(missing.as_str()).unwrap_err();
    assert!(matches!(err, IndexError::Unbound { ref identifier } if identifier == "nowhere.greet"));
}

#[test]
fn test_clear() {
    let mut indexer = FunctionIndexer::new();
    let hash = indexer.index_function(call_site!(), greet).unwrap();
    indexer.clear();
    assert!(indexer.is_empty());
    assert!(matches!(
        indexer.get_function(hash.as_str()),
        Err(IndexError::NotFound { .. })
    ));
}
