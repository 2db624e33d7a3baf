//! Reflection extractor
//!
//! Turns the runtime's view of a module into binding-model values. Members
//! are visited in name order, the way the runtime's `getmembers` reports
//! them, so output is deterministic.

use log::{debug, warn};

use crate::error::ExtractError;
use crate::model::{rename_placeholder_params, Class, Function, Parameter};
use crate::naming::is_identifier;
use crate::reflect::{
    Annotation, MemberKind, ModuleLoader, RuntimeClass, RuntimeFunction, RuntimeMember,
    RuntimeModule, RuntimeType,
};
use crate::types::{Builtin, TypeRef};

/// Names in the runtime's `builtins` namespace that are types but have no
/// fixed Java counterpart.
const OTHER_BUILTIN_TYPES: &[&str] = &[
    "tuple", "set", "frozenset", "complex", "bytearray", "memoryview", "range",
    "property", "classmethod", "staticmethod", "enumerate", "zip", "map", "filter",
    "reversed", "super", "BaseException", "ArithmeticError", "AssertionError",
    "AttributeError", "BufferError", "EOFError", "ImportError", "IndexError",
    "KeyError", "LookupError", "MemoryError", "NameError", "NotImplementedError",
    "OSError", "OverflowError", "RecursionError", "RuntimeError", "StopIteration",
    "SyntaxError", "SystemError", "TypeError", "UnicodeError", "ValueError",
    "ZeroDivisionError", "Warning", "DeprecationWarning", "RuntimeWarning",
    "FutureWarning",
];

fn sorted_members(members: &[RuntimeMember]) -> Vec<&RuntimeMember> {
    let mut sorted: Vec<&RuntimeMember> = members.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

/// Free functions defined in `module`.
///
/// Imported functions are ignored. A function whose signature the runtime
/// could not produce is skipped with a warning.
pub fn extract_functions<L: ModuleLoader + ?Sized>(module: &RuntimeModule, loader: &L) -> Vec<Function> {
    let mut functions = Vec::new();
    for member in sorted_members(&module.members) {
        let MemberKind::Function(function) = &member.kind else {
            continue;
        };
        if function.module != module.name {
            continue;
        }
        match convert_function(&member.name, function, module, loader) {
            Ok(Some(function)) => functions.push(function),
            Ok(None) => debug!("ignoring non-identifier function {}.{}", module.name, member.name),
            Err(e) => warn!("skipping function in {}: {}", module.name, e),
        }
    }
    functions
}

/// Classes defined in `module`.
///
/// A class is named by its own `__name__`, so an alias in its defining
/// module yields the same class again. A class that cannot be fully
/// introspected is skipped as a whole.
pub fn extract_classes<L: ModuleLoader + ?Sized>(module: &RuntimeModule, loader: &L) -> Vec<Class> {
    let mut classes = Vec::new();
    for member in sorted_members(&module.members) {
        let MemberKind::Class(class) = &member.kind else {
            continue;
        };
        let name = class.own_name(&member.name);
        if class.module != module.name || !is_identifier(name) {
            continue;
        }
        match convert_class(name, class, module, loader) {
            Ok(class) => classes.push(class),
            Err(e) => warn!("skipping class {}.{}: {}", module.name, name, e),
        }
    }
    classes
}

fn convert_class<L: ModuleLoader + ?Sized>(
    name: &str,
    class: &RuntimeClass,
    module: &RuntimeModule,
    loader: &L,
) -> Result<Class, ExtractError> {
    if let Some(reason) = &class.error {
        return Err(ExtractError::Members {
            name: name.to_string(),
            reason: reason.clone(),
        });
    }

    let mut methods = Vec::new();
    for member in sorted_members(&class.members) {
        if let MemberKind::Function(function) = &member.kind {
            if let Some(method) = convert_function(&member.name, function, module, loader)? {
                methods.push(method);
            }
        }
    }

    let bases = class.bases.iter().map(type_ref).collect();
    Ok(Class::new(name, bases, methods)
        .with_source_type(TypeRef::from_runtime(&class.module, name))
        .with_metaclass(class.has_custom_metaclass()))
}

/// Build a [`Function`] from a runtime function bound as `name`.
///
/// Returns `Ok(None)` when `name` is not an identifier (lambdas and the like).
pub fn convert_function<L: ModuleLoader + ?Sized>(
    name: &str,
    function: &RuntimeFunction,
    module: &RuntimeModule,
    loader: &L,
) -> Result<Option<Function>, ExtractError> {
    if !is_identifier(name) {
        return Ok(None);
    }
    if let Some(reason) = &function.error {
        return Err(ExtractError::Signature {
            name: name.to_string(),
            reason: reason.clone(),
        });
    }

    let mut params: Vec<Parameter> = function
        .parameters
        .iter()
        .map(|p| Parameter {
            name: p.name.clone(),
            ty: resolve_annotation(p.annotation.as_ref(), module, loader),
            is_keyword: p.has_default,
        })
        .collect();
    rename_placeholder_params(&mut params);

    let return_type = resolve_annotation(function.returns.as_ref(), module, loader);
    Ok(Some(Function::new(name, params, return_type)))
}

/// Map a runtime type object to a [`TypeRef`].
pub fn type_ref(ty: &RuntimeType) -> TypeRef {
    match &ty.origin {
        Some(origin) => TypeRef::Generic(Box::new(type_ref(origin))),
        None => TypeRef::from_runtime(&ty.module, &ty.name),
    }
}

/// Resolve a declared annotation in the context of `module`.
///
/// Missing and unresolvable annotations become `object`.
pub fn resolve_annotation<L: ModuleLoader + ?Sized>(
    annotation: Option<&Annotation>,
    module: &RuntimeModule,
    loader: &L,
) -> TypeRef {
    match annotation {
        None | Some(Annotation::Other { .. }) => TypeRef::object(),
        Some(Annotation::Type(ty)) => type_ref(ty),
        Some(Annotation::Forward(path)) => resolve_forward(path, module, loader).unwrap_or_else(|| {
            debug!("unresolved annotation {:?} in {}", path, module.name);
            TypeRef::object()
        }),
    }
}

fn resolve_forward<L: ModuleLoader + ?Sized>(path: &str, module: &RuntimeModule, loader: &L) -> Option<TypeRef> {
    if let Some(builtin) = Builtin::from_builtins_name(path) {
        return Some(TypeRef::Builtin(builtin));
    }
    if OTHER_BUILTIN_TYPES.contains(&path) {
        return Some(TypeRef::user("builtins", path));
    }

    let mut scope = module;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let member = scope.member(segment)?;
        match &member.kind {
            MemberKind::Module { target } => scope = loader.import(target)?,
            MemberKind::Class(class) if segments.peek().is_none() => {
                return Some(TypeRef::from_runtime(&class.module, class.own_name(&member.name)));
            }
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{RuntimeParameter, RuntimeSnapshot};

    fn function(module: &str, params: &[(&str, Option<Annotation>, bool)], returns: Option<Annotation>) -> MemberKind {
        MemberKind::Function(RuntimeFunction {
            module: module.to_string(),
            parameters: params
                .iter()
                .map(|(name, annotation, has_default)| RuntimeParameter {
                    name: name.to_string(),
                    annotation: annotation.clone(),
                    has_default: *has_default,
                })
                .collect(),
            returns,
            error: None,
        })
    }

    fn member(name: &str, kind: MemberKind) -> RuntimeMember {
        RuntimeMember {
            name: name.to_string(),
            kind,
        }
    }

    fn class(module: &str, members: Vec<RuntimeMember>) -> RuntimeClass {
        RuntimeClass {
            name: None,
            module: module.to_string(),
            bases: vec![RuntimeType::new("builtins", "object")],
            metaclass: None,
            members,
            error: None,
        }
    }

    fn forward(s: &str) -> Option<Annotation> {
        Some(Annotation::Forward(s.to_string()))
    }

    fn snapshot() -> RuntimeSnapshot {
        let shapes = RuntimeModule {
            name: "geo.shapes".into(),
            file: Some("/src/geo/shapes.py".into()),
            members: vec![
                member("Circle", MemberKind::Class(class("geo.shapes", vec![]))),
                member("helpers", MemberKind::Module { target: "geo.helpers".into() }),
                member(
                    "area",
                    function(
                        "geo.shapes",
                        &[("shape", forward("Circle"), false), ("_", None, false)],
                        Some(Annotation::Type(RuntimeType::new("builtins", "float"))),
                    ),
                ),
                member("imported", function("geo.other", &[], None)),
                member("<lambda>", function("geo.shapes", &[], None)),
                member(
                    "Square",
                    MemberKind::Class(class(
                        "geo.shapes",
                        vec![
                            member("side", function("geo.shapes", &[("self", None, false)], forward("float"))),
                            member("__init__", function("geo.shapes", &[("self", None, false), ("size", forward("int"), true)], None)),
                        ],
                    )),
                ),
                member("Borrowed", MemberKind::Class(class("geo.other", vec![]))),
            ],
            submodules: vec![],
        };
        let helpers = RuntimeModule {
            name: "geo.helpers".into(),
            file: Some("/src/geo/helpers.py".into()),
            members: vec![member("Vector", MemberKind::Class(class("geo.helpers", vec![])))],
            submodules: vec![],
        };
        RuntimeSnapshot::new(vec![shapes, helpers]).unwrap()
    }

    #[test]
    fn test_functions_defined_in_module_only() {
        let snapshot = snapshot();
        let module = snapshot.import("geo.shapes").unwrap();
        let functions = extract_functions(module, &snapshot);

        let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["area"]);

        let area = &functions[0];
        assert_eq!(area.params[0].ty, TypeRef::user("geo.shapes", "Circle"));
        assert_eq!(area.params[1].name, "ignored1");
        assert_eq!(area.params[1].ty, TypeRef::object());
        assert_eq!(area.return_type, TypeRef::Builtin(Builtin::Float));
    }

    #[test]
    fn test_classes_sorted_and_local() {
        let snapshot = snapshot();
        let module = snapshot.import("geo.shapes").unwrap();
        let classes = extract_classes(module, &snapshot);

        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Circle", "Square"]);

        let square = &classes[1];
        assert_eq!(square.source_type, Some(TypeRef::user("geo.shapes", "Square")));
        assert_eq!(square.methods[0].name, "__init__");
        assert!(square.methods[0].params[1].is_keyword);
        assert_eq!(square.methods[0].params[1].ty, TypeRef::Builtin(Builtin::Int));
        assert_eq!(square.methods[0].return_type, TypeRef::object());
        assert_eq!(square.methods[1].return_type, TypeRef::Builtin(Builtin::Float));
        assert!(!square.has_metaclass);
    }

    #[test]
    fn test_class_with_broken_member_is_skipped() {
        let mut snapshot = snapshot();
        let mut broken = class("geo.shapes", vec![]);
        broken.members.push(member(
            "explode",
            MemberKind::Function(RuntimeFunction {
                module: "geo.shapes".into(),
                parameters: vec![],
                returns: None,
                error: Some("no signature found for builtin".into()),
            }),
        ));
        snapshot.modules[0].members.push(member("Broken", MemberKind::Class(broken)));
        let snapshot = RuntimeSnapshot::new(snapshot.modules).unwrap();

        let module = snapshot.import("geo.shapes").unwrap();
        let names: Vec<_> = extract_classes(module, &snapshot)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Circle", "Square"]);
    }

    #[test]
    fn test_class_member_listing_failure_is_skipped() {
        let mut broken = class("geo.shapes", vec![]);
        broken.error = Some("descriptor raised".into());
        let module = RuntimeModule {
            name: "geo.shapes".into(),
            file: None,
            members: vec![member("Broken", MemberKind::Class(broken))],
            submodules: vec![],
        };
        let snapshot = RuntimeSnapshot::new(vec![module]).unwrap();
        let module = snapshot.import("geo.shapes").unwrap();
        assert!(extract_classes(module, &snapshot).is_empty());
    }

    #[test]
    fn test_metaclass_detected() {
        let mut meta = class("orm", vec![]);
        meta.metaclass = Some(RuntimeType::new("orm.base", "ModelMeta"));
        let module = RuntimeModule {
            name: "orm".into(),
            file: None,
            members: vec![member("Model", MemberKind::Class(meta))],
            submodules: vec![],
        };
        let snapshot = RuntimeSnapshot::new(vec![module]).unwrap();
        let classes = extract_classes(snapshot.import("orm").unwrap(), &snapshot);
        assert!(classes[0].has_metaclass);
    }

    #[test]
    fn test_resolve_annotations() {
        let snapshot = snapshot();
        let module = snapshot.import("geo.shapes").unwrap();
        let resolve = |a: Option<Annotation>| resolve_annotation(a.as_ref(), module, &snapshot);

        assert_eq!(resolve(None), TypeRef::object());
        assert_eq!(resolve(forward("str")), TypeRef::Builtin(Builtin::Str));
        assert_eq!(resolve(forward("None")), TypeRef::none());
        assert_eq!(resolve(forward("tuple")), TypeRef::user("builtins", "tuple"));
        assert_eq!(resolve(forward("helpers.Vector")), TypeRef::user("geo.helpers", "Vector"));
        assert_eq!(resolve(forward("Borrowed")), TypeRef::user("geo.other", "Borrowed"));
        assert_eq!(resolve(forward("Missing")), TypeRef::object());
        assert_eq!(resolve(forward("helpers")), TypeRef::object());
        assert_eq!(resolve(forward("Optional[Circle]")), TypeRef::object());
        assert_eq!(
            resolve(Some(Annotation::Other { other: "typing.Optional[int]".into() })),
            TypeRef::object()
        );
        assert_eq!(
            resolve(Some(Annotation::Type(RuntimeType::new("typing", "Any")))),
            TypeRef::object()
        );
    }

    #[test]
    fn test_aliased_class_uses_own_name() {
        let mut money = class("decimal", vec![]);
        money.name = Some("Decimal".into());
        let mut local = class("ledger", vec![]);
        local.name = Some("Entry".into());
        let module = RuntimeModule {
            name: "ledger".into(),
            file: Some("/src/ledger.py".into()),
            members: vec![
                member("Money", MemberKind::Class(money)),
                member("Row", MemberKind::Class(local)),
            ],
            submodules: vec![],
        };
        let snapshot = RuntimeSnapshot::new(vec![module]).unwrap();
        let module = snapshot.import("ledger").unwrap();

        let forward_ref = resolve_annotation(forward("Money").as_ref(), module, &snapshot);
        let direct = resolve_annotation(
            Some(&Annotation::Type(RuntimeType::new("decimal", "Decimal"))),
            module,
            &snapshot,
        );
        assert_eq!(forward_ref, TypeRef::user("decimal", "Decimal"));
        assert_eq!(forward_ref, direct);

        let classes = extract_classes(module, &snapshot);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "Entry");
        assert_eq!(classes[0].source_type, Some(TypeRef::user("ledger", "Entry")));
    }

    #[test]
    fn test_generic_annotation_keeps_origin() {
        let mut list_of_int = RuntimeType::new("builtins", "list");
        list_of_int.origin = Some(Box::new(RuntimeType::new("builtins", "list")));
        assert_eq!(
            type_ref(&list_of_int),
            TypeRef::Generic(Box::new(TypeRef::Builtin(Builtin::List)))
        );
    }
}
