//! Introspection snapshot of a live runtime
//!
//! The source runtime dumps what its reflection API reports about a set of
//! modules as JSON. These records mirror that dump one-to-one; nothing here
//! is normalized yet (see `crate::extract`).
//!
//! ```json
//! {
//!   "modules": [{
//!     "name": "bank.wallet",
//!     "file": "/src/bank/wallet.py",
//!     "members": [
//!       { "name": "Wallet", "kind": "class", "module": "bank.wallet",
//!         "bases": [{ "module": "builtins", "name": "object" }],
//!         "members": [{ "name": "get_balance", "kind": "function",
//!                       "module": "bank.wallet",
//!                       "parameters": [{ "name": "self" }],
//!                       "returns": { "module": "builtins", "name": "float" } }] }
//!     ]
//!   }]
//! }
//! ```

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// A runtime type object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeType {
    /// Defining module (`__module__`)
    pub module: String,
    /// Type name (`__name__`)
    pub name: String,
    /// Origin of a parameterized alias (`__origin__`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Box<RuntimeType>>,
}

impl RuntimeType {
    /// Create a plain type
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            origin: None,
        }
    }

    /// Whether this is the root metaclass `builtins.type`
    pub fn is_builtin_type(&self) -> bool {
        self.module == "builtins" && self.name == "type"
    }
}

/// An annotation as reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Annotation {
    /// A string (forward reference) annotation
    Forward(String),
    /// A type object
    Type(RuntimeType),
    /// Any other annotation object, kept as its repr
    Other {
        /// `repr()` of the annotation
        other: String,
    },
}

/// A function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeParameter {
    /// Parameter name
    pub name: String,
    /// Declared annotation, absent when unannotated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Whether a default value is present
    #[serde(default)]
    pub has_default: bool,
}

/// A function object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFunction {
    /// Defining module
    pub module: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<RuntimeParameter>,
    /// Return annotation, absent when unannotated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Annotation>,
    /// Set when the runtime failed to produce a signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A class object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeClass {
    /// The class's own `__name__`, when it differs from the attribute name
    #[serde(default, rename = "class_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Defining module
    pub module: String,
    /// Direct bases (`__bases__`)
    #[serde(default)]
    pub bases: Vec<RuntimeType>,
    /// Metaclass (`type(cls)`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metaclass: Option<RuntimeType>,
    /// Function attributes, inherited ones included
    #[serde(default)]
    pub members: Vec<RuntimeMember>,
    /// Set when the runtime failed to list the members
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuntimeClass {
    /// `__name__` of a class reached through the attribute `attribute`
    pub fn own_name<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(attribute)
    }

    /// Whether the class was created by a metaclass other than `type`
    pub fn has_custom_metaclass(&self) -> bool {
        self.metaclass
            .as_ref()
            .is_some_and(|meta| !meta.is_builtin_type())
    }
}

/// What a named attribute holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberKind {
    /// A function
    Function(RuntimeFunction),
    /// A class
    Class(RuntimeClass),
    /// A module object bound under this name
    Module {
        /// Qualname of the module
        target: String,
    },
    /// Anything else
    Value,
}

/// A named attribute of a module or class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMember {
    /// Attribute name
    pub name: String,
    /// Attribute value
    #[serde(flatten)]
    pub kind: MemberKind,
}

/// A module object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeModule {
    /// Qualified name (`__name__`)
    pub name: String,
    /// Source file (`__file__`); absent for namespace and builtin modules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Attributes
    #[serde(default)]
    pub members: Vec<RuntimeMember>,
    /// Entries of a package's directory
    #[serde(default)]
    pub submodules: Vec<String>,
}

impl RuntimeModule {
    /// Whether this module is a package (`__init__` file)
    pub fn is_package(&self) -> bool {
        self.file
            .as_deref()
            .is_some_and(|f| f.ends_with("__init__.py"))
    }

    /// Attribute lookup by name
    pub fn member(&self, name: &str) -> Option<&RuntimeMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Child module names, dunder entries skipped and `.py` stripped
    pub fn submodule_names(&self) -> impl Iterator<Item = &str> {
        self.submodules
            .iter()
            .filter(|entry| !entry.starts_with("__"))
            .map(|entry| entry.strip_suffix(".py").unwrap_or(entry))
    }
}

/// Resolves module qualnames to module objects (the runtime's import system)
pub trait ModuleLoader {
    /// Import a module; `None` when it does not exist or fails to import.
    fn import(&self, qualname: &str) -> Option<&RuntimeModule>;

    /// Resolve `qualname` by importing its top-level package and walking
    /// attributes down to the leaf.
    fn import_submodule(&self, qualname: &str) -> Option<&RuntimeModule> {
        let mut segments = qualname.split('.');
        let mut module = self.import(segments.next()?)?;
        for segment in segments {
            module = match module.member(segment).map(|m| &m.kind) {
                Some(MemberKind::Module { target }) => self.import(target)?,
                Some(_) => return None,
                // importing a submodule binds it on its parent
                None => self.import(&format!("{}.{}", module.name, segment))?,
            };
        }
        Some(module)
    }
}

/// A loaded introspection dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    /// Every dumped module
    pub modules: Vec<RuntimeModule>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl RuntimeSnapshot {
    /// Build a snapshot from modules
    pub fn new(modules: Vec<RuntimeModule>) -> Result<Self, SnapshotError> {
        let mut snapshot = Self {
            modules,
            index: FxHashMap::default(),
        };
        snapshot.reindex()?;
        Ok(snapshot)
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: RuntimeSnapshot = serde_json::from_str(json)?;
        snapshot.reindex()?;
        Ok(snapshot)
    }

    /// Read a snapshot file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn reindex(&mut self) -> Result<(), SnapshotError> {
        self.index.clear();
        for (i, module) in self.modules.iter().enumerate() {
            if self.index.insert(module.name.clone(), i).is_some() {
                return Err(SnapshotError::DuplicateModule(module.name.clone()));
            }
        }
        Ok(())
    }
}

impl ModuleLoader for RuntimeSnapshot {
    fn import(&self, qualname: &str) -> Option<&RuntimeModule> {
        self.index.get(qualname).map(|&i| &self.modules[i])
    }
}
