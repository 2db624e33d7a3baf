//! Binding model
//!
//! Immutable value records describing what gets bound: [`Parameter`],
//! [`Function`] and [`Class`]. The emitter (`crate::emit`) renders them to
//! Java source.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashSet;

use crate::naming::{capitalize_first, escape_identifier};
use crate::types::TypeRef;

/// Name of the receiver parameter that marks an instance method
pub const SELF_PARAM: &str = "self";

/// Name of the constructor-equivalent method
pub const CONSTRUCTOR: &str = "__init__";

/// A function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Parameter name, already a legal identifier
    pub name: String,
    /// Declared type, `object` when unannotated
    pub ty: TypeRef,
    /// Whether the source parameter has a default value
    pub is_keyword: bool,
}

impl Parameter {
    /// Create a positional parameter
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_keyword: false,
        }
    }

    /// Create a parameter that carries a default value
    pub fn keyword(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            is_keyword: true,
            ..Self::new(name, ty)
        }
    }

    /// The untyped `self` receiver
    pub fn receiver() -> Self {
        Self::new(SELF_PARAM, TypeRef::object())
    }
}

/// Rename parameters whose name is nothing but underscores.
///
/// Each becomes `ignoredN`, N counting such parameters from 1.
pub fn rename_placeholder_params(params: &mut [Parameter]) {
    let mut ignored = 0;
    for param in params.iter_mut() {
        if param.name.chars().all(|c| c == '_') {
            ignored += 1;
            param.name = format!("ignored{}", ignored);
        }
    }
}

/// A method or free function
///
/// Two functions are the same function when their names match; signatures
/// are not compared.
#[derive(Debug, Clone)]
pub struct Function {
    /// Source name
    pub name: String,
    /// Parameters in declaration order, including `self` for methods
    pub params: Vec<Parameter>,
    /// Declared return type, `object` when unannotated
    pub return_type: TypeRef,
}

impl Function {
    /// Create a function
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
        }
    }

    /// Whether the first parameter is the `self` receiver.
    ///
    /// Classification is by name only: a static function whose first
    /// parameter is called `self` is treated as an instance method.
    pub fn is_instance(&self) -> bool {
        self.params.first().is_some_and(|p| p.name == SELF_PARAM)
    }

    /// Everything that is not an instance method.
    pub fn is_static(&self) -> bool {
        !self.is_instance()
    }

    /// Whether the source name marks the function private.
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }

    /// Parameters as seen by a caller of an instance method.
    pub fn instance_params(&self) -> &[Parameter] {
        if self.is_instance() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Rewrite as an instance method by prepending an untyped `self`.
    pub fn with_receiver(&self) -> Function {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        params.push(Parameter::receiver());
        params.extend(self.params.iter().cloned());
        Function::new(self.name.clone(), params, self.return_type.clone())
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Function {}

impl Hash for Function {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A class, or a module's synthetic globals container
#[derive(Debug, Clone)]
pub struct Class {
    /// Declared bases, before filtering out non-inheritable roots
    pub inherits: Vec<TypeRef>,
    /// Interface name, reserved words escaped
    pub name: String,
    /// Methods, unique by name, first occurrence kept
    pub methods: Vec<Function>,
    /// The runtime type this class describes; `None` for a globals container
    pub source_type: Option<TypeRef>,
    /// Whether the runtime class has a custom metaclass
    pub has_metaclass: bool,
    /// Qualified runtime name of the module a globals container stands for
    pub real_name: Option<String>,
}

impl Class {
    /// Create a class. Methods are deduplicated by name and the name escaped.
    pub fn new(name: &str, inherits: Vec<TypeRef>, methods: Vec<Function>) -> Self {
        Self {
            inherits,
            name: escape_identifier(name),
            methods: dedup_methods(methods),
            source_type: None,
            has_metaclass: false,
            real_name: None,
        }
    }

    /// Attach the runtime type (makes the class instantiable)
    pub fn with_source_type(mut self, ty: TypeRef) -> Self {
        self.source_type = Some(ty);
        self
    }

    /// Mark the class as built by a custom metaclass
    pub fn with_metaclass(mut self, has_metaclass: bool) -> Self {
        self.has_metaclass = has_metaclass;
        self
    }

    /// Set the qualified runtime module name
    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    /// Synthesize the globals container for the free functions of `module`.
    pub fn globals(module: &str, functions: Vec<Function>) -> Self {
        let (_, leaf) = split_module(module);
        Class::new(&globals_name(leaf), Vec::new(), functions).with_real_name(module)
    }

    /// Whether this describes a module rather than a runtime class.
    pub fn is_module(&self) -> bool {
        self.source_type.is_none()
    }

    /// Name of the hidden static-proxy interface
    pub fn static_proxy_name(&self) -> String {
        format!("_{}StaticProxy", self.name)
    }

    /// The constructor, or an implicit no-argument one.
    pub fn constructor(&self) -> Function {
        self.methods
            .iter()
            .find(|m| m.name == CONSTRUCTOR)
            .cloned()
            .unwrap_or_else(|| Function::new(CONSTRUCTOR, vec![Parameter::receiver()], TypeRef::none()))
    }

    /// Look up a method by source name
    pub fn method(&self, name: &str) -> Option<&Function> {
        self.methods.iter().find(|m| m.name == name)
    }
}

fn dedup_methods(methods: Vec<Function>) -> Vec<Function> {
    let mut seen = FxHashSet::default();
    methods
        .into_iter()
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}

/// Split `a.b.c` into (`a.b`, `c`).
pub fn split_module(module: &str) -> (&str, &str) {
    match module.rsplit_once('.') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", module),
    }
}

/// Interface name of the globals container for a module leaf name.
///
/// `wallet` → `Wallet`; a leaf that capitalization does not change gets a
/// `Globals` suffix (`Wallet` → `WalletGlobals`).
pub fn globals_name(leaf: &str) -> String {
    let capitalized = capitalize_first(leaf);
    if capitalized == leaf {
        capitalized + "Globals"
    } else {
        capitalized
    }
}
