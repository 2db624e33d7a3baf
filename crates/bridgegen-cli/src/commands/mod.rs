pub mod generate;
pub mod register;

use std::path::Path;

use anyhow::Context;
use bridgegen_project::{OverrideRegistry, ProjectConfig, CONFIG_FILE};

/// Load the project configuration in `dir`.
fn load_config(dir: &Path) -> anyhow::Result<ProjectConfig> {
    ProjectConfig::load(dir)
        .with_context(|| format!("failed to load {}", dir.join(CONFIG_FILE).display()))
}

/// The override registry at `root`, or the one in the home directory.
fn open_registry(root: Option<&Path>) -> anyhow::Result<OverrideRegistry> {
    match root {
        Some(root) => Ok(OverrideRegistry::with_root(root)),
        None => Ok(OverrideRegistry::open()?),
    }
}
