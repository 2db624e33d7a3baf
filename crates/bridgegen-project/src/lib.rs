//! Bridgegen Project Library
//!
//! This crate connects the binding generator to a bindings project on disk:
//! - Project configuration parsing (bridgegen.toml)
//! - Base-package override registry (~/.bridgegen/modules/)
//! - Maven source tree output with per-run emit-once tracking
//! - Maven descriptor generation (pom.xml)
//! - Build tool invocation

pub mod build;
pub mod config;
pub mod output;
pub mod pom;
pub mod registry;

pub use build::{run_build, BuildError};
pub use config::{
    BuildConfig, ConfigError, MavenDependency, ProjectConfig, ProjectInfo, TargetModule, CONFIG_FILE,
};
pub use output::{SourceFile, SourceTree};
pub use pom::{render_pom, write_pom, PomError};
pub use registry::{OverrideRegistry, RegistryError};
