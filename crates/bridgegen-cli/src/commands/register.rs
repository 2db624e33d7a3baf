//! `bridgegen register`: Record the project's modules in the override registry.

use std::path::PathBuf;

use anyhow::Context;

use crate::output::{self, StyledOutput};

pub fn execute(config_dir: PathBuf, registry: Option<PathBuf>, color: String) -> anyhow::Result<()> {
    let mut out = StyledOutput::new(output::resolve_color_choice(&color));

    let config = super::load_config(&config_dir)?;
    let registry = super::open_registry(registry.as_deref())?;
    let written = registry
        .register(&config)
        .context("failed to register modules")?;

    for (module, path) in config.modules.iter().zip(&written) {
        out.success("Registered");
        out.plain(&format!(" {} ", module.qualname));
        out.info(&format!("({})", config.base_package()));
        out.plain(&format!(" -> {}", path.display()));
        out.newline();
    }
    out.flush();
    Ok(())
}
