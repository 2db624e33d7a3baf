//! Base-package override registry
//!
//! Every bindings project registers the modules it generates, so that other
//! projects referring to those modules' types use the declaring project's
//! package instead of their own.
//!
//! Directory structure:
//! ```text
//! ~/.bridgegen/modules/
//! ├── bank.toml          (copy of the declaring project's bridgegen.toml)
//! └── bank.native.toml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bridgegen_core::BasePackageRegistry;
use log::{debug, warn};
use thiserror::Error;

use crate::config::{ConfigError, ProjectConfig};

/// Errors that can occur during registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Registry directory could not be located
    #[error("Failed to locate registry directory: {0}")]
    RegistryInitError(String),

    /// A registered configuration is unreadable
    #[error("Invalid registry entry: {0}")]
    ConfigError(#[from] ConfigError),
}

/// On-disk registry of module declarations
#[derive(Debug, Clone)]
pub struct OverrideRegistry {
    /// Root registry directory (~/.bridgegen/modules/)
    root: PathBuf,
}

impl OverrideRegistry {
    /// Open the registry in the user's home directory
    pub fn open() -> Result<Self, RegistryError> {
        let home = dirs::home_dir().ok_or_else(|| {
            RegistryError::RegistryInitError("Could not determine home directory".to_string())
        })?;
        Ok(Self::with_root(home.join(".bridgegen").join("modules")))
    }

    /// Open a registry rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Registry directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record every module of `config` as declared by it.
    ///
    /// Returns the written entry paths.
    pub fn register(&self, config: &ProjectConfig) -> Result<Vec<PathBuf>, RegistryError> {
        fs::create_dir_all(&self.root)?;
        let content = config.to_toml_string()?;

        let mut written = Vec::with_capacity(config.modules.len());
        for module in &config.modules {
            let path = self.entry_path(&module.qualname);
            fs::write(&path, &content)?;
            debug!("registered {} -> {}", module.qualname, path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Configuration that declares `module` or its nearest registered ancestor
    pub fn lookup(&self, module: &str) -> Result<Option<ProjectConfig>, RegistryError> {
        let mut candidate = module;
        while !candidate.is_empty() {
            let path = self.entry_path(candidate);
            if path.is_file() {
                return Ok(Some(ProjectConfig::from_file(&path)?));
            }
            candidate = candidate.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
        Ok(None)
    }

    /// Qualnames of all registered modules, sorted
    pub fn registered_modules(&self) -> Result<Vec<String>, RegistryError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut modules = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    modules.push(stem.to_string());
                }
            }
        }
        modules.sort();
        Ok(modules)
    }

    fn entry_path(&self, module: &str) -> PathBuf {
        self.root.join(format!("{}.toml", module))
    }
}

impl BasePackageRegistry for OverrideRegistry {
    fn resolve_base_package(&self, module_qualname: &str, default_base_package: &str) -> String {
        match self.lookup(module_qualname) {
            Ok(Some(config)) => config.project.group_id,
            Ok(None) => default_base_package.to_string(),
            Err(e) => {
                warn!("ignoring registry entry for {}: {}", module_qualname, e);
                default_base_package.to_string()
            }
        }
    }
}
