//! Traversal driver
//!
//! Walks a module (and, for packages, its submodules), binds every local
//! class plus the module's globals container, and hands each rendered unit
//! to an [`OutputSink`].

use log::{debug, error, info, warn};

use crate::emit::{BindOptions, Emitter};
use crate::error::{BindError, TraversalError};
use crate::extract::{extract_classes, extract_functions};
use crate::model::{split_module, Class};
use crate::output::{OutputSink, UnitWriter};
use crate::reflect::{ModuleLoader, RuntimeModule};

/// What one traversal produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    /// Modules whose classes and globals were emitted
    pub modules: Vec<String>,
    /// Qualified names of emitted units
    pub units: Vec<String>,
    /// Units skipped because they were already produced in this run
    pub cached: Vec<String>,
    /// Submodules listed by a package that could not be imported
    pub missing: Vec<String>,
    /// Modules that failed to bind, with the reason
    pub failures: Vec<(String, String)>,
}

impl TraversalReport {
    /// Whether every visited module bound cleanly
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives extraction and emission over a module tree
pub struct Traversal<'a, L: ModuleLoader + ?Sized, S: OutputSink> {
    loader: &'a L,
    emitter: &'a Emitter,
    sink: &'a mut S,
    options: BindOptions,
    report: TraversalReport,
}

impl<'a, L: ModuleLoader + ?Sized, S: OutputSink> Traversal<'a, L, S> {
    /// Create a driver with default options
    pub fn new(loader: &'a L, emitter: &'a Emitter, sink: &'a mut S) -> Self {
        Self {
            loader,
            emitter,
            sink,
            options: BindOptions::default(),
            report: TraversalReport::default(),
        }
    }

    /// Replace the bind options
    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve `qualname` through the loader and bind it recursively.
    pub fn bind_qualname(&mut self, qualname: &str) -> Result<(), TraversalError> {
        let loader = self.loader;
        let module = loader
            .import_submodule(qualname)
            .ok_or_else(|| TraversalError::ModuleNotFound(qualname.to_string()))?;
        self.bind_recursive(module)
    }

    /// Bind `module`; for a package, descend into every listed submodule.
    ///
    /// Bind failures are recorded in the report and the walk continues with
    /// the next module. Output failures abort the walk.
    pub fn bind_recursive(&mut self, module: &RuntimeModule) -> Result<(), TraversalError> {
        if module.file.is_none() {
            debug!("skipping {}: no source file", module.name);
            return Ok(());
        }

        if !module.is_package() {
            return match self.bind_module(module) {
                Err(TraversalError::Bind { module, source }) => {
                    error!("failed to bind {}: {}", module, source);
                    self.report.failures.push((module, source.to_string()));
                    Ok(())
                }
                other => other,
            };
        }

        let loader = self.loader;
        for child in module.submodule_names() {
            let qualname = format!("{}.{}", module.name, child);
            match loader.import_submodule(&qualname) {
                Some(submodule) => self.bind_recursive(submodule)?,
                None => {
                    warn!("cannot import {}, skipping", qualname);
                    self.report.missing.push(qualname);
                }
            }
        }
        Ok(())
    }

    /// Bind the classes and globals of a single module.
    pub fn bind_module(&mut self, module: &RuntimeModule) -> Result<(), TraversalError> {
        info!("binding module {}", module.name);
        let emitter = self.emitter;
        let options = self.options;

        for class in extract_classes(module, self.loader) {
            let unit = match &class.source_type {
                Some(ty) => emitter.qualifier().qualify(ty),
                None => format!("{}.{}", emitter.qualifier().package_name(&module.name), class.name),
            };
            self.emit_unit(&module.name, &unit, true, || {
                class.bind(emitter, Some(&module.name), &options)
            })?;
        }

        let (parent, _) = split_module(&module.name);
        let globals = Class::globals(&module.name, extract_functions(module, self.loader));
        let unit = format!("{}.{}", emitter.qualifier().package_name(parent), globals.name);
        let globals_options = options.for_globals();
        self.emit_unit(&module.name, &unit, false, || {
            globals.bind(emitter, Some(parent), &globals_options)
        })?;

        self.report.modules.push(module.name.clone());
        Ok(())
    }

    /// Consume the driver, returning what it produced
    pub fn finish(self) -> TraversalReport {
        self.report
    }

    /// Report so far
    pub fn report(&self) -> &TraversalReport {
        &self.report
    }

    fn emit_unit<F>(&mut self, module: &str, unit: &str, skip_produced: bool, render: F) -> Result<(), TraversalError>
    where
        F: FnOnce() -> Result<String, BindError>,
    {
        let output_error = |source| TraversalError::Output {
            unit: unit.to_string(),
            source,
        };

        let mut writer = self.sink.writer(unit).map_err(output_error)?;
        if skip_produced && writer.is_already_produced() {
            debug!("{} already produced", unit);
            writer.close().map_err(output_error)?;
            self.report.cached.push(unit.to_string());
            return Ok(());
        }

        let text = match render() {
            Ok(text) => text,
            Err(source) => {
                writer.discard().map_err(output_error)?;
                return Err(TraversalError::Bind {
                    module: module.to_string(),
                    source,
                });
            }
        };
        let written = writer.write_line(&text);
        writer.close().map_err(output_error)?;
        written.map_err(output_error)?;

        debug!("emitted {}", unit);
        self.report.units.push(unit.to_string());
        Ok(())
    }
}
