//! Bridgegen Core Library
//!
//! Generates Java interface bindings for modules of a reflective runtime:
//! - Naming conventions (snake_case to camelCase, reserved-word escaping)
//! - Type qualification (builtin table, base package, per-module overrides)
//! - Binding model (parameters, functions, classes, module globals)
//! - Interface emission (static proxy, factory method, identity annotations)
//! - Introspection snapshot loading and member extraction
//! - Module traversal with emit-once output sinks

pub mod emit;
pub mod error;
pub mod extract;
pub mod model;
pub mod naming;
pub mod output;
pub mod reflect;
pub mod traverse;
pub mod types;

pub use emit::{AmbiguityTable, BindOptions, Emitter};
pub use error::{BindError, ExtractError, SnapshotError, TraversalError};
pub use extract::{extract_classes, extract_functions};
pub use model::{Class, Function, Parameter};
pub use output::{EmitCache, EmittedUnit, MemorySink, OutputSink, UnitWriter};
pub use reflect::{ModuleLoader, RuntimeModule, RuntimeSnapshot};
pub use traverse::{Traversal, TraversalReport};
pub use types::{
    BasePackageRegistry, Builtin, CachedRegistry, NoOverrides, StaticOverrides, TypeQualifier,
    TypeRef,
};
