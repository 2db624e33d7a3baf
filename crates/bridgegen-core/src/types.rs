//! Type references and qualification
//!
//! A [`TypeRef`] is the normalized form of a reflected annotation. The
//! [`TypeQualifier`] turns it into the fully-qualified Java name used in
//! emitted signatures.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::naming::{escape_identifier, escape_module_path};

/// Source-runtime types with a fixed Java counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `object` / `typing.Any`
    Object,
    /// `str`
    Str,
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `float`
    Float,
    /// `type`
    Type,
    /// `list`
    List,
    /// `dict`
    Dict,
    /// `collections.defaultdict`
    DefaultDict,
    /// `slice`
    Slice,
    /// `bytes`
    Bytes,
    /// `Exception`
    Exception,
    /// `typing.Literal`
    Literal,
    /// `typing.Union`
    Union,
    /// `UserWarning`
    UserWarning,
    /// `None`
    NoneType,
}

impl Builtin {
    /// Java name this builtin is emitted as.
    pub const fn qualified_name(self) -> &'static str {
        match self {
            Builtin::Object => "java.lang.Object",
            Builtin::Str => "java.lang.String",
            Builtin::Int => "int",
            Builtin::Bool => "boolean",
            Builtin::Float => "double",
            Builtin::Type => "org.jbind.types.PythonType",
            Builtin::List => "org.jbind.bindings.builtins.List",
            Builtin::Dict => "org.jbind.bindings.builtins.Dict",
            Builtin::DefaultDict => "org.jbind.bindings.collections.Defaultdict",
            Builtin::Slice => "org.jbind.bindings.builtins.Slice",
            Builtin::Bytes => "byte[]",
            Builtin::Exception => "org.jbind.types.PythonExceptionWrapper",
            Builtin::Literal => "java.lang.Object",
            Builtin::Union => "java.lang.Object",
            Builtin::UserWarning => "org.jbind.bindings.builtins.UserWarning",
            Builtin::NoneType => "void",
        }
    }

    /// Look up a runtime type by its defining module and name.
    pub fn from_runtime(module: &str, name: &str) -> Option<Builtin> {
        match (module, name) {
            ("builtins", name) => Self::from_builtins_name(name),
            ("typing", "Any") => Some(Builtin::Object),
            ("typing", "Literal") => Some(Builtin::Literal),
            ("typing", "Union") => Some(Builtin::Union),
            ("types", "NoneType") => Some(Builtin::NoneType),
            ("collections", "defaultdict") => Some(Builtin::DefaultDict),
            _ => None,
        }
    }

    /// Look up a name in the runtime's `builtins` namespace.
    pub fn from_builtins_name(name: &str) -> Option<Builtin> {
        let builtin = match name {
            "object" => Builtin::Object,
            "str" => Builtin::Str,
            "int" => Builtin::Int,
            "bool" => Builtin::Bool,
            "float" => Builtin::Float,
            "type" => Builtin::Type,
            "list" => Builtin::List,
            "dict" => Builtin::Dict,
            "slice" => Builtin::Slice,
            "bytes" => Builtin::Bytes,
            "Exception" => Builtin::Exception,
            "UserWarning" => Builtin::UserWarning,
            "None" | "NoneType" => Builtin::NoneType,
            _ => return None,
        };
        Some(builtin)
    }
}

/// Normalized reference to a reflected type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A type from the fixed builtin table
    Builtin(Builtin),
    /// Any other class, identified by its defining module and simple name
    UserDefined {
        /// Dotted qualname of the defining module
        module: String,
        /// Simple class name
        name: String,
    },
    /// A parameterized alias; erased to its origin when qualified
    Generic(Box<TypeRef>),
}

impl TypeRef {
    /// The generic "any object" type.
    pub const fn object() -> Self {
        TypeRef::Builtin(Builtin::Object)
    }

    /// The `None` return type.
    pub const fn none() -> Self {
        TypeRef::Builtin(Builtin::NoneType)
    }

    /// A user-defined class.
    pub fn user(module: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef::UserDefined {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Build a reference from a runtime `(module, name)` pair.
    pub fn from_runtime(module: &str, name: &str) -> Self {
        match Builtin::from_runtime(module, name) {
            Some(builtin) => TypeRef::Builtin(builtin),
            None => TypeRef::user(module, name),
        }
    }

    /// Strip generic wrappers down to the origin type.
    pub fn erased(&self) -> &TypeRef {
        let mut ty = self;
        while let TypeRef::Generic(origin) = ty {
            ty = origin.as_ref();
        }
        ty
    }

    /// Whether this is the `None` type (emitted as `void`).
    pub fn is_void(&self) -> bool {
        matches!(self.erased(), TypeRef::Builtin(Builtin::NoneType))
    }

    /// Whether a class with this base can extend it as a Java interface.
    ///
    /// The runtime's implicit roots (`object`, `bool`, `float`, `int`, `str`,
    /// `None` and `abc.ABC`) are not meaningful base interfaces.
    pub fn is_inheritable(&self) -> bool {
        match self.erased() {
            TypeRef::Builtin(b) => !matches!(
                b,
                Builtin::Object
                    | Builtin::Bool
                    | Builtin::Float
                    | Builtin::Int
                    | Builtin::Str
                    | Builtin::NoneType
            ),
            TypeRef::UserDefined { module, name } => !(module == "abc" && name == "ABC"),
            TypeRef::Generic(_) => true,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Builtin(b) => write!(f, "{:?}", b),
            TypeRef::UserDefined { module, name } => write!(f, "{}.{}", module, name),
            TypeRef::Generic(origin) => write!(f, "{}[...]", origin),
        }
    }
}

// ============================================================================
// Base-package overrides
// ============================================================================

/// Source of module-specific base packages
///
/// A module may be declared by another bindings project under a different
/// group; references to its types must then use that group's package.
pub trait BasePackageRegistry {
    /// Base package for `module_qualname`, or `default_base_package`.
    fn resolve_base_package(&self, module_qualname: &str, default_base_package: &str) -> String;
}

/// Registry without overrides
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl BasePackageRegistry for NoOverrides {
    fn resolve_base_package(&self, _module_qualname: &str, default_base_package: &str) -> String {
        default_base_package.to_string()
    }
}

/// In-memory overrides keyed by exact module qualname
#[derive(Debug, Clone, Default)]
pub struct StaticOverrides {
    packages: FxHashMap<String, String>,
}

impl StaticOverrides {
    /// Create an empty override table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `base_package` for `module`
    pub fn insert(&mut self, module: impl Into<String>, base_package: impl Into<String>) {
        self.packages.insert(module.into(), base_package.into());
    }
}

impl BasePackageRegistry for StaticOverrides {
    fn resolve_base_package(&self, module_qualname: &str, default_base_package: &str) -> String {
        self.packages
            .get(module_qualname)
            .cloned()
            .unwrap_or_else(|| default_base_package.to_string())
    }
}

/// Read-through cache in front of another registry
///
/// Answers are memoized per `(module, default)` pair for the lifetime of the
/// cache. Lookups only take the read lock once an entry exists.
pub struct CachedRegistry<R> {
    inner: R,
    cache: RwLock<FxHashMap<(String, String), String>>,
}

impl<R: BasePackageRegistry> CachedRegistry<R> {
    /// Wrap `inner`
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Number of memoized answers
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if nothing has been memoized yet
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl<R: BasePackageRegistry> BasePackageRegistry for CachedRegistry<R> {
    fn resolve_base_package(&self, module_qualname: &str, default_base_package: &str) -> String {
        let key = (module_qualname.to_string(), default_base_package.to_string());
        if let Some(hit) = self.cache.read().get(&key) {
            return hit.clone();
        }
        let resolved = self
            .inner
            .resolve_base_package(module_qualname, default_base_package);
        self.cache.write().insert(key, resolved.clone());
        resolved
    }
}

// ============================================================================
// Qualifier
// ============================================================================

/// Maps type references to fully-qualified Java names
pub struct TypeQualifier {
    base_package: String,
    registry: Box<dyn BasePackageRegistry>,
}

impl TypeQualifier {
    /// Qualifier with no base-package overrides
    pub fn new(base_package: impl Into<String>) -> Self {
        Self::with_registry(base_package, NoOverrides)
    }

    /// Qualifier consulting `registry` (through a read-through cache)
    pub fn with_registry<R>(base_package: impl Into<String>, registry: R) -> Self
    where
        R: BasePackageRegistry + 'static,
    {
        Self {
            base_package: base_package.into(),
            registry: Box::new(CachedRegistry::new(registry)),
        }
    }

    /// The default base package
    pub fn base_package(&self) -> &str {
        &self.base_package
    }

    /// Java package holding the bindings for `module_qualname`.
    ///
    /// The empty module path maps to the base package itself.
    pub fn package_name(&self, module_qualname: &str) -> String {
        let base = self
            .registry
            .resolve_base_package(module_qualname, &self.base_package);
        if module_qualname.is_empty() {
            base
        } else {
            format!("{}.{}", base, escape_module_path(module_qualname))
        }
    }

    /// Fully-qualified Java name for `ty`. Never fails: malformed references
    /// degrade to `java.lang.Object`.
    pub fn qualify(&self, ty: &TypeRef) -> String {
        match ty.erased() {
            TypeRef::Builtin(builtin) => builtin.qualified_name().to_string(),
            TypeRef::UserDefined { module, name } if !module.is_empty() && !name.is_empty() => {
                format!("{}.{}", self.package_name(module), escape_identifier(name))
            }
            _ => Builtin::Object.qualified_name().to_string(),
        }
    }
}

impl fmt::Debug for TypeQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeQualifier")
            .field("base_package", &self.base_package)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_builtin_table() {
        let q = TypeQualifier::new("org.example");
        assert_eq!(q.qualify(&TypeRef::object()), "java.lang.Object");
        assert_eq!(q.qualify(&TypeRef::Builtin(Builtin::Float)), "double");
        assert_eq!(q.qualify(&TypeRef::Builtin(Builtin::Bytes)), "byte[]");
        assert_eq!(q.qualify(&TypeRef::none()), "void");
        assert_eq!(
            q.qualify(&TypeRef::from_runtime("collections", "defaultdict")),
            "org.jbind.bindings.collections.Defaultdict"
        );
        assert_eq!(q.qualify(&TypeRef::from_runtime("typing", "Any")), "java.lang.Object");
    }

    #[test]
    fn test_user_defined() {
        let q = TypeQualifier::new("org.example");
        let ty = TypeRef::user("bank.wallet", "Wallet");
        assert_eq!(q.qualify(&ty), "org.example.bank.wallet.Wallet");

        let ty = TypeRef::user("my-lib.new", "Thing");
        assert_eq!(q.qualify(&ty), "org.example.my_lib.new_.Thing");
    }

    #[test]
    fn test_builtins_outside_table_are_user_defined() {
        let q = TypeQualifier::new("org.example");
        assert_eq!(
            q.qualify(&TypeRef::from_runtime("builtins", "tuple")),
            "org.example.builtins.tuple"
        );
    }

    #[test]
    fn test_generic_erased_to_origin() {
        let q = TypeQualifier::new("org.example");
        let ty = TypeRef::Generic(Box::new(TypeRef::Builtin(Builtin::List)));
        assert_eq!(q.qualify(&ty), "org.jbind.bindings.builtins.List");
    }

    #[test]
    fn test_malformed_degrades_to_object() {
        let q = TypeQualifier::new("org.example");
        assert_eq!(q.qualify(&TypeRef::user("", "Wallet")), "java.lang.Object");
        assert_eq!(q.qualify(&TypeRef::user("bank", "")), "java.lang.Object");
    }

    #[test]
    fn test_override_registry() {
        let mut overrides = StaticOverrides::new();
        overrides.insert("shared.money", "com.acme");
        let q = TypeQualifier::with_registry("org.example", overrides);

        assert_eq!(
            q.qualify(&TypeRef::user("shared.money", "Coin")),
            "com.acme.shared.money.Coin"
        );
        assert_eq!(
            q.qualify(&TypeRef::user("bank", "Wallet")),
            "org.example.bank.Wallet"
        );
    }

    #[test]
    fn test_package_name_for_top_level() {
        let q = TypeQualifier::new("org.example");
        assert_eq!(q.package_name(""), "org.example");
        assert_eq!(q.package_name("bank"), "org.example.bank");
    }

    struct CountingRegistry(Arc<AtomicUsize>);

    impl BasePackageRegistry for CountingRegistry {
        fn resolve_base_package(&self, _module: &str, default: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            default.to_string()
        }
    }

    #[test]
    fn test_cached_registry_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedRegistry::new(CountingRegistry(calls.clone()));

        assert!(cached.is_empty());
        cached.resolve_base_package("bank", "org.example");
        cached.resolve_base_package("bank", "org.example");
        cached.resolve_base_package("bank", "org.other");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn test_inheritable() {
        assert!(!TypeRef::object().is_inheritable());
        assert!(!TypeRef::Builtin(Builtin::Int).is_inheritable());
        assert!(!TypeRef::none().is_inheritable());
        assert!(!TypeRef::user("abc", "ABC").is_inheritable());
        assert!(TypeRef::Builtin(Builtin::Dict).is_inheritable());
        assert!(TypeRef::user("bank", "Account").is_inheritable());
    }
}
