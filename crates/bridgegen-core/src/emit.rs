//! Java interface emission
//!
//! Each model entity renders itself through `bind`. A class becomes one
//! `public interface` extending the common [`BASE_INTERFACE`]; its static
//! functions are routed through a hidden instance-shaped "static proxy"
//! interface that the runtime binder instantiates once per class or module:
//!
//! ```text
//! package org.example.bank;
//! @org.jbind.annotation.PyClassInfo(module="bank",className="Wallet")
//! interface _WalletStaticProxy extends org.jbind.base.Binding {
//!     @org.jbind.annotation.PyMethodInfo(name="create_default")
//!     org.example.bank.Wallet createDefault();
//! }
//! @org.jbind.annotation.PyClassInfo(module="bank",className="Wallet")
//! public interface Wallet extends org.jbind.base.Binding {
//!     static _WalletStaticProxy _staticProxy = org.jbind.Binder.buildStaticProxy(_WalletStaticProxy.class);
//!     ...
//!     public static org.example.bank.Wallet createDefault(){
//!         return _staticProxy.createDefault();
//!     }
//! }
//! ```

use log::error;
use rustc_hash::FxHashSet;

use crate::error::BindError;
use crate::model::{Class, Function, Parameter};
use crate::naming::{bind_identifier, is_target_identifier};
use crate::types::{TypeQualifier, TypeRef};

/// Interface every generated interface extends
pub const BASE_INTERFACE: &str = "org.jbind.base.Binding";
/// Per-method annotation carrying the source name
pub const METHOD_INFO: &str = "org.jbind.annotation.PyMethodInfo";
/// Class identity annotation
pub const CLASS_INFO: &str = "org.jbind.annotation.PyClassInfo";
/// Module identity annotation
pub const MODULE_INFO: &str = "org.jbind.annotation.PyModuleInfo";
/// Runtime binder entry points
pub const BINDER: &str = "org.jbind.Binder";
/// Field holding the static-proxy instance
pub const STATIC_PROXY_FIELD: &str = "_staticProxy";
/// Source name of the generated factory method
pub const FACTORY_NAME: &str = "new_instance";

const INDENT: &str = "    ";

/// Generation switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Convert snake_case names to camelCase
    pub use_conventions: bool,
    /// Skip members whose source name starts with `_`
    pub public_only: bool,
    /// Bind every function as static
    pub force_static: bool,
    /// Bind every function as an instance method
    pub force_instance: bool,
    /// Emit static functions as stubs delegating to the static proxy
    /// instead of bare signatures. Class binding always delegates.
    pub use_static_proxy: bool,
    /// Prefix instance methods with their source-name annotation
    pub method_name_annotation: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            use_conventions: true,
            public_only: true,
            force_static: false,
            force_instance: false,
            use_static_proxy: true,
            method_name_annotation: true,
        }
    }
}

impl BindOptions {
    /// Options for binding a module's globals container
    pub fn for_globals(self) -> Self {
        Self {
            force_static: true,
            force_instance: false,
            ..self
        }
    }
}

/// A method name that clashes with a member the target side already defines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousName {
    /// Source name
    pub name: String,
    /// Clash only when the method returns something (e.g. `AutoCloseable.close`)
    pub only_non_void: bool,
}

/// Method names that get a trailing `_` to avoid clashing with base members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguityTable {
    entries: Vec<AmbiguousName>,
}

impl Default for AmbiguityTable {
    fn default() -> Self {
        Self {
            entries: vec![
                AmbiguousName {
                    name: "close".to_string(),
                    only_non_void: true,
                },
                AmbiguousName {
                    name: "_unwrap".to_string(),
                    only_non_void: false,
                },
            ],
        }
    }
}

impl AmbiguityTable {
    /// Add a name
    pub fn insert(&mut self, name: impl Into<String>, only_non_void: bool) {
        self.entries.push(AmbiguousName {
            name: name.into(),
            only_non_void,
        });
    }

    /// Whether `function` must be renamed
    pub fn is_ambiguous(&self, function: &Function) -> bool {
        self.entries.iter().any(|entry| {
            entry.name == function.name && !(entry.only_non_void && function.return_type.is_void())
        })
    }
}

/// Everything `bind` needs besides the entity and its options
#[derive(Debug)]
pub struct Emitter {
    qualifier: TypeQualifier,
    ambiguities: AmbiguityTable,
}

impl Emitter {
    /// Create an emitter with the default ambiguity table
    pub fn new(qualifier: TypeQualifier) -> Self {
        Self {
            qualifier,
            ambiguities: AmbiguityTable::default(),
        }
    }

    /// Replace the ambiguity table
    pub fn with_ambiguities(mut self, ambiguities: AmbiguityTable) -> Self {
        self.ambiguities = ambiguities;
        self
    }

    /// The type qualifier
    pub fn qualifier(&self) -> &TypeQualifier {
        &self.qualifier
    }

    /// The ambiguity table
    pub fn ambiguities(&self) -> &AmbiguityTable {
        &self.ambiguities
    }

    fn method_name(&self, function: &Function, use_conventions: bool) -> String {
        let mut name = bind_identifier(&function.name, use_conventions);
        if self.ambiguities.is_ambiguous(function) {
            name.push('_');
        }
        name
    }
}

fn check_identifier(identifier: String, entity: impl FnOnce() -> String) -> Result<String, BindError> {
    if is_target_identifier(&identifier) {
        Ok(identifier)
    } else {
        Err(BindError::InvalidIdentifier {
            identifier,
            entity: entity(),
        })
    }
}

// ============================================================================
// Parameter
// ============================================================================

impl Parameter {
    /// Render as `Type name`.
    pub fn bind(&self, emitter: &Emitter, use_conventions: bool) -> Result<String, BindError> {
        self.bind_as(emitter, self.bind_name(use_conventions))
    }

    fn bind_as(&self, emitter: &Emitter, name: String) -> Result<String, BindError> {
        let name = check_identifier(name, || format!("parameter {:?}", self)).inspect_err(|e| {
            error!("cannot bind parameter {:?}: {}", self, e);
        })?;
        Ok(format!("{} {}", emitter.qualifier.qualify(&self.ty), name))
    }

    /// The parameter name as it appears in Java.
    pub fn bind_name(&self, use_conventions: bool) -> String {
        bind_identifier(&self.name, use_conventions)
    }
}

// ============================================================================
// Function
// ============================================================================

impl Function {
    /// Render as an interface member.
    ///
    /// Instance methods render as an abstract signature without the trailing
    /// `;`. Static functions render as a delegating stub through the static
    /// proxy, or as a bare signature when `use_static_proxy` is off.
    pub fn bind(&self, emitter: &Emitter, options: &BindOptions) -> Result<String, BindError> {
        self.render(emitter, options).map_err(|e| {
            error!("cannot bind function {:?}: {}", self, e);
            BindError::Function {
                function: self.name.clone(),
                source: Box::new(e),
            }
        })
    }

    fn render(&self, emitter: &Emitter, options: &BindOptions) -> Result<String, BindError> {
        let is_static = (self.is_static() || options.force_static) && !options.force_instance;
        let name = check_identifier(emitter.method_name(self, options.use_conventions), || {
            format!("function `{}`", self.name)
        })?;
        let return_type = emitter.qualifier.qualify(&self.return_type);

        let member = if is_static {
            let params = bind_params(&self.params, emitter, options.use_conventions)?;
            let signature = format!("{INDENT}public static {return_type} {name}({params})");
            if options.use_static_proxy {
                let args = bind_param_names(&self.params, options.use_conventions).join(",");
                let ret = if self.return_type.is_void() { "" } else { "return " };
                [
                    format!("{signature}{{"),
                    format!("{INDENT}{INDENT}{ret}{STATIC_PROXY_FIELD}.{name}({args});"),
                    format!("{INDENT}}}"),
                ]
                .join("\n")
            } else {
                signature
            }
        } else {
            let params = bind_params(self.instance_params(), emitter, options.use_conventions)?;
            format!("{INDENT}{return_type} {name}({params})")
        };

        if options.method_name_annotation {
            Ok(format!("{INDENT}@{METHOD_INFO}(name=\"{}\")\n{member}", self.name))
        } else {
            Ok(member)
        }
    }
}

fn bind_params(params: &[Parameter], emitter: &Emitter, use_conventions: bool) -> Result<String, BindError> {
    let bound = params
        .iter()
        .zip(bind_param_names(params, use_conventions))
        .map(|(p, name)| p.bind_as(emitter, name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bound.join(","))
}

/// Java names for one parameter list.
///
/// Names that collide after conversion (`_x` and `x`) keep the first
/// occurrence; later ones get the smallest numeric suffix not otherwise
/// taken in the list.
fn bind_param_names(params: &[Parameter], use_conventions: bool) -> Vec<String> {
    let names: Vec<String> = params.iter().map(|p| p.bind_name(use_conventions)).collect();
    let mut taken: FxHashSet<String> = names.iter().cloned().collect();
    let mut seen = FxHashSet::default();

    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let unique = (1..)
                .map(|n| format!("{name}{n}"))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_default();
            taken.insert(unique.clone());
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

// ============================================================================
// Class
// ============================================================================

impl Class {
    /// Render the complete compilation unit for this class.
    ///
    /// With `module` set, the output starts with the `package` statement and,
    /// unless the module name is empty, carries the class identity annotation.
    pub fn bind(&self, emitter: &Emitter, module: Option<&str>, options: &BindOptions) -> Result<String, BindError> {
        self.render(emitter, module, options, true).map_err(|e| {
            error!("cannot bind class {}: {}", self.name, e);
            BindError::Class {
                class: self.name.clone(),
                source: Box::new(e),
            }
        })
    }

    /// Functions bound as static under `options`, in declaration order.
    pub fn static_methods<'a>(&'a self, options: &'a BindOptions) -> impl Iterator<Item = &'a Function> + 'a {
        self.methods
            .iter()
            .filter(move |m| !options.force_instance && (options.force_static || m.is_static()))
    }

    /// Functions bound as instance methods under `options`, in declaration order.
    pub fn instance_methods<'a>(&'a self, options: &'a BindOptions) -> impl Iterator<Item = &'a Function> + 'a {
        self.methods
            .iter()
            .filter(move |m| options.force_instance || (!options.force_static && m.is_instance()))
    }

    fn render(
        &self,
        emitter: &Emitter,
        module: Option<&str>,
        options: &BindOptions,
        public: bool,
    ) -> Result<String, BindError> {
        let name = check_identifier(self.name.clone(), || format!("class `{}`", self.name))?;
        let visible = |f: &&Function| !(options.public_only && f.is_private());

        let mut lines = Vec::new();
        if let Some(module) = module {
            lines.push(format!("package {};", emitter.qualifier.package_name(module)));
        }

        let statics: Vec<&Function> = self.static_methods(options).filter(visible).collect();
        let static_proxy = self.build_static_proxy(emitter, &statics, module, options)?;
        if let Some(proxy) = &static_proxy {
            lines.push(proxy.clone());
        }

        // a top-level module's globals have no parent to point at
        if let Some(module) = module.filter(|m| !m.is_empty()) {
            lines.push(self.class_info_annotation(module));
        }
        let visibility = if public { "public " } else { "" };
        lines.push(format!(
            "{visibility}interface {name} extends {} {{",
            self.base_interfaces(emitter)
        ));

        if static_proxy.is_some() {
            let proxy_name = self.static_proxy_name();
            lines.push(format!(
                "{INDENT}static {proxy_name} {STATIC_PROXY_FIELD} = {BINDER}.buildStaticProxy({proxy_name}.class);"
            ));
        }

        if let Some(source_type) = &self.source_type {
            lines.push(self.factory_method(emitter, source_type, options)?);
        }

        let instance_options = BindOptions {
            force_static: false,
            force_instance: true,
            ..*options
        };
        for method in self.instance_methods(options).filter(visible) {
            lines.push(format!("{};", method.bind(emitter, &instance_options)?));
        }

        let static_options = BindOptions {
            force_static: true,
            force_instance: false,
            use_static_proxy: true,
            method_name_annotation: false,
            ..*options
        };
        for method in statics {
            lines.push(method.bind(emitter, &static_options)?);
        }

        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }

    /// Comma-joined `extends` list, always ending with [`BASE_INTERFACE`].
    ///
    /// Bases of classes with a custom metaclass are dropped.
    fn base_interfaces(&self, emitter: &Emitter) -> String {
        let mut bases: Vec<String> = if self.has_metaclass {
            Vec::new()
        } else {
            self.inherits
                .iter()
                .filter(|t| t.is_inheritable())
                .map(|t| emitter.qualifier.qualify(t))
                .collect()
        };
        bases.push(BASE_INTERFACE.to_string());
        bases.join(",")
    }

    fn class_info_annotation(&self, module: &str) -> String {
        format!("@{CLASS_INFO}(module=\"{}\",className=\"{}\")", module, self.name)
    }

    fn module_info_annotation(&self, module: Option<&str>) -> String {
        let real_name = self.real_name.as_deref().or(module).unwrap_or(&self.name);
        format!("@{MODULE_INFO}(\"{}\")", real_name)
    }

    /// Hidden interface exposing `statics` as instance methods, preceded by
    /// its identity annotation. `None` when there is nothing to proxy.
    fn build_static_proxy(
        &self,
        emitter: &Emitter,
        statics: &[&Function],
        module: Option<&str>,
        options: &BindOptions,
    ) -> Result<Option<String>, BindError> {
        if statics.is_empty() {
            return Ok(None);
        }
        let proxy = Class::new(
            &self.static_proxy_name(),
            Vec::new(),
            statics.iter().map(|f| f.with_receiver()).collect(),
        );
        let annotation = if self.is_module() {
            self.module_info_annotation(module)
        } else {
            self.class_info_annotation(module.unwrap_or_default())
        };
        let proxy_options = BindOptions {
            force_static: false,
            force_instance: false,
            ..*options
        };
        let body = proxy.render(emitter, None, &proxy_options, false)?;
        Ok(Some(format!("{annotation}\n{body}")))
    }

    /// Static `newInstance` factory forwarding the constructor's arguments to
    /// the runtime binder.
    fn factory_method(
        &self,
        emitter: &Emitter,
        source_type: &TypeRef,
        options: &BindOptions,
    ) -> Result<String, BindError> {
        let constructor = self.constructor();
        let factory = Function::new(
            FACTORY_NAME,
            constructor.instance_params().to_vec(),
            source_type.clone(),
        );
        let signature_options = BindOptions {
            force_static: true,
            force_instance: false,
            use_static_proxy: false,
            method_name_annotation: false,
            ..*options
        };
        let signature = factory.bind(emitter, &signature_options)?;
        let args: String = bind_param_names(&factory.params, options.use_conventions)
            .into_iter()
            .map(|name| format!(",{name}"))
            .collect();
        Ok([
            format!("{signature}{{"),
            format!("{INDENT}{INDENT}return {BINDER}.getNewInstance({}.class{args});", self.name),
            format!("{INDENT}}}"),
        ]
        .join("\n"))
    }
}
