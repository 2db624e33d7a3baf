//! Project configuration (bridgegen.toml)
//!
//! Describes which modules to bind, under which Maven coordinates, and how
//! the generated sources are built.

use std::path::{Path, PathBuf};

use bridgegen_core::naming::is_identifier;
use bridgegen_core::BindOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration file name looked up in a project directory
pub const CONFIG_FILE: &str = "bridgegen.toml";

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write a configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Project configuration (bridgegen.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Maven coordinates of the generated bindings
    pub project: ProjectInfo,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Modules to bind
    #[serde(default)]
    pub modules: Vec<TargetModule>,

    /// Maven dependencies of the generated project
    #[serde(default)]
    pub dependencies: Vec<MavenDependency>,

    /// Directory the configuration was loaded from
    #[serde(skip)]
    root: PathBuf,
}

/// Maven coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectInfo {
    /// Group id; also the default base package
    pub group_id: String,

    /// Artifact id
    pub artifact_id: String,

    /// Version
    pub version: String,
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Output directory, relative to the config directory (default: "build")
    #[serde(default = "default_target_dir")]
    pub target_dir: String,

    /// Java release for compiler source and target (default: "11")
    #[serde(default = "default_java_version")]
    pub java_version: String,

    /// Run the build tool after generation (default: true)
    #[serde(default = "default_true")]
    pub run_build: bool,

    /// Introspection snapshot, relative to the config directory
    #[serde(default = "default_snapshot")]
    pub snapshot: String,
}

fn default_target_dir() -> String {
    "build".to_string()
}

fn default_java_version() -> String {
    "11".to_string()
}

fn default_snapshot() -> String {
    "introspection.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            java_version: default_java_version(),
            run_build: true,
            snapshot: default_snapshot(),
        }
    }
}

/// A module to bind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TargetModule {
    /// Dotted module qualname
    pub qualname: String,

    /// Skip `_`-prefixed members (default: true)
    #[serde(default = "default_true")]
    pub public_only: bool,

    /// Convert names to camelCase (default: true)
    #[serde(default = "default_true")]
    pub use_conventions: bool,

    /// Bindings are maintained by hand: registered, never generated
    #[serde(default)]
    pub manual: bool,
}

impl TargetModule {
    /// Bind options for this module
    pub fn bind_options(&self) -> BindOptions {
        BindOptions {
            public_only: self.public_only,
            use_conventions: self.use_conventions,
            ..BindOptions::default()
        }
    }
}

/// Maven dependency coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MavenDependency {
    /// Group id
    pub group_id: String,

    /// Artifact id
    pub artifact_id: String,

    /// Version
    pub version: String,
}

impl ProjectConfig {
    /// Load `bridgegen.toml` from a project directory
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Self::from_file(&dir.join(CONFIG_FILE))
    }

    /// Parse a configuration file; relative paths resolve against its directory
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse a configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ProjectConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("project.group-id", &self.project.group_id)?;
        require("project.artifact-id", &self.project.artifact_id)?;
        require("project.version", &self.project.version)?;
        require("build.java-version", &self.build.java_version)?;

        if !is_dotted_identifier(&self.project.group_id) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid group-id: {}. Must be a dotted package name (e.g., org.example)",
                self.project.group_id
            )));
        }

        if self.modules.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one module must be listed".to_string(),
            ));
        }

        for module in &self.modules {
            if !is_dotted_identifier(&module.qualname) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid module qualname: {:?}",
                    module.qualname
                )));
            }
        }

        for dependency in &self.dependencies {
            require("dependencies.group-id", &dependency.group_id)?;
            require("dependencies.artifact-id", &dependency.artifact_id)?;
            require("dependencies.version", &dependency.version)?;
        }

        Ok(())
    }

    /// Directory the configuration was loaded from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default base package of the generated bindings
    pub fn base_package(&self) -> &str {
        &self.project.group_id
    }

    /// Resolved output directory
    pub fn target_dir(&self) -> PathBuf {
        self.root.join(&self.build.target_dir)
    }

    /// Resolved snapshot path
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(&self.build.snapshot)
    }

    /// Modules whose bindings are generated
    pub fn generated_modules(&self) -> impl Iterator<Item = &TargetModule> {
        self.modules.iter().filter(|m| !m.manual)
    }
}

fn require(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn is_dotted_identifier(name: &str) -> bool {
    name.split('.').all(is_identifier)
}
