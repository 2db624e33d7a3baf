//! Integration tests for project generation
//!
//! Tests config loading, registry overrides and source tree output together
//! on a temporary project directory.

use std::fs;

use bridgegen_core::{EmitCache, Emitter, RuntimeSnapshot, Traversal, TypeQualifier};
use bridgegen_project::{write_pom, OverrideRegistry, ProjectConfig, SourceTree};
use tempfile::TempDir;

const CONFIG: &str = r#"
[project]
group-id = "org.example"
artifact-id = "bank-bindings"
version = "1.0.0"

[build]
target-dir = "out"
run-build = false

[[modules]]
qualname = "bank"

[[modules]]
qualname = "bank.native"
manual = true
"#;

const LEDGER_CONFIG: &str = r#"
[project]
group-id = "com.acme"
artifact-id = "ledger-bindings"
version = "2.0.0"

[[modules]]
qualname = "ledger"
"#;

const SNAPSHOT: &str = r#"{
    "modules": [
        {
            "name": "bank",
            "file": "/src/bank/__init__.py",
            "submodules": ["__init__.py", "wallet.py"]
        },
        {
            "name": "bank.wallet",
            "file": "/src/bank/wallet.py",
            "members": [
                { "name": "ledger", "kind": "module", "target": "ledger" },
                {
                    "name": "Wallet", "kind": "class", "module": "bank.wallet",
                    "members": [
                        { "name": "last_entry", "kind": "function", "module": "bank.wallet",
                          "parameters": [{ "name": "self" }],
                          "returns": "ledger.Entry" }
                    ]
                }
            ]
        },
        {
            "name": "ledger",
            "file": "/src/ledger.py",
            "members": [
                { "name": "Entry", "kind": "class", "module": "ledger" }
            ]
        }
    ]
}"#;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("bridgegen.toml"), CONFIG).unwrap();
    fs::write(temp.path().join("introspection.json"), SNAPSHOT).unwrap();
    temp
}

#[test]
fn test_load_config_from_directory() {
    let temp = project();
    let config = ProjectConfig::load(temp.path()).unwrap();

    assert_eq!(config.root(), temp.path());
    assert_eq!(config.target_dir(), temp.path().join("out"));
    assert_eq!(config.snapshot_path(), temp.path().join("introspection.json"));
    assert!(!config.build.run_build);
    assert_eq!(config.generated_modules().count(), 1);
}

#[test]
fn test_generate_source_tree() {
    let temp = project();
    let config = ProjectConfig::load(temp.path()).unwrap();
    let snapshot = RuntimeSnapshot::from_file(&config.snapshot_path()).unwrap();

    let registry = OverrideRegistry::with_root(temp.path().join("registry"));
    registry.register(&config).unwrap();
    registry
        .register(&ProjectConfig::from_str(LEDGER_CONFIG).unwrap())
        .unwrap();

    let emitter = Emitter::new(TypeQualifier::with_registry(config.base_package(), registry));
    let mut sink = SourceTree::new(config.target_dir(), EmitCache::new());

    for module in config.generated_modules() {
        let mut traversal =
            Traversal::new(&snapshot, &emitter, &mut sink).with_options(module.bind_options());
        traversal.bind_qualname(&module.qualname).unwrap();
        let report = traversal.finish();
        assert!(report.is_clean());
        assert_eq!(report.modules, vec!["bank.wallet"]);
    }

    let java = temp.path().join("out").join("src").join("main").join("java");
    let wallet = fs::read_to_string(java.join("org/example/bank/wallet/Wallet.java")).unwrap();
    assert!(wallet.starts_with("package org.example.bank.wallet;\n"));
    assert!(wallet.contains("    com.acme.ledger.Entry lastEntry();"));
    assert!(java.join("org/example/bank/Wallet.java").is_file());

    let pom = write_pom(&config).unwrap();
    assert_eq!(pom, temp.path().join("out").join("pom.xml"));
}

#[test]
fn test_shared_cache_emits_class_once() {
    let temp = project();
    let snapshot = RuntimeSnapshot::from_json_str(SNAPSHOT).unwrap();
    let emitter = Emitter::new(TypeQualifier::new("org.example"));
    let cache = EmitCache::new();

    for _ in 0..2 {
        let mut sink = SourceTree::new(temp.path().join("out"), cache.clone());
        let mut traversal = Traversal::new(&snapshot, &emitter, &mut sink);
        traversal.bind_qualname("bank.wallet").unwrap();
    }

    // Wallet class and bank.Wallet globals
    assert_eq!(cache.len(), 2);
}
