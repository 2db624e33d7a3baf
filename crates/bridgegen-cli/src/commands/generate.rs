//! `bridgegen generate`: Generate bindings for every configured module.

use std::path::PathBuf;

use anyhow::{bail, Context};
use bridgegen_core::{
    EmitCache, Emitter, MemorySink, OutputSink, RuntimeSnapshot, Traversal, TraversalReport,
    TypeQualifier,
};
use bridgegen_project::{run_build, write_pom, ProjectConfig, SourceTree};

use crate::output::{self, StyledOutput};

/// Arguments for the generate command.
pub struct GenerateArgs {
    pub config_dir: PathBuf,
    pub snapshot: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub stdout: bool,
    pub no_build: bool,
    pub color: String,
}

pub fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let mut out = StyledOutput::new(output::resolve_color_choice(&args.color));

    let config = super::load_config(&args.config_dir)?;
    let registry = super::open_registry(args.registry.as_deref())?;
    registry
        .register(&config)
        .context("failed to register modules")?;

    let snapshot_path = args.snapshot.unwrap_or_else(|| config.snapshot_path());
    let snapshot = RuntimeSnapshot::from_file(&snapshot_path)
        .with_context(|| format!("failed to load snapshot {}", snapshot_path.display()))?;

    let emitter = Emitter::new(TypeQualifier::with_registry(config.base_package(), registry));
    let cache = EmitCache::new();

    if args.stdout {
        let mut sink = MemorySink::with_cache(cache);
        let reports = traverse_all(&config, &snapshot, &emitter, &mut sink)?;
        for unit in sink.units() {
            println!("// {}", unit.name);
            print!("{}", unit.text);
        }
        return check_reports(&reports);
    }

    let target_dir = config.target_dir();
    let mut sink = SourceTree::new(&target_dir, cache);
    let reports = traverse_all(&config, &snapshot, &emitter, &mut sink)?;
    for (module, report) in &reports {
        out.module_summary(module, report);
    }
    check_reports(&reports)?;

    let pom = write_pom(&config).context("failed to write pom.xml")?;
    out.success("Generated");
    out.plain(&format!(" {}", sink.source_root().display()));
    out.newline();
    out.info(&format!("Wrote {}", pom.display()));
    out.newline();
    out.flush();

    if config.build.run_build && !args.no_build {
        run_build(&target_dir).context("build failed")?;
        out.success("Build finished");
        out.newline();
    }
    Ok(())
}

/// Traverse every non-manual module into `sink`.
fn traverse_all<S: OutputSink>(
    config: &ProjectConfig,
    snapshot: &RuntimeSnapshot,
    emitter: &Emitter,
    sink: &mut S,
) -> anyhow::Result<Vec<(String, TraversalReport)>> {
    let mut reports = Vec::new();
    for module in config.generated_modules() {
        let mut traversal =
            Traversal::new(snapshot, emitter, &mut *sink).with_options(module.bind_options());
        traversal
            .bind_qualname(&module.qualname)
            .with_context(|| format!("failed to generate bindings for {}", module.qualname))?;
        reports.push((module.qualname.clone(), traversal.finish()));
    }
    Ok(reports)
}

fn check_reports(reports: &[(String, TraversalReport)]) -> anyhow::Result<()> {
    let failed: usize = reports.iter().map(|(_, r)| r.failures.len()).sum();
    if failed > 0 {
        bail!("{} module(s) failed to bind", failed);
    }
    Ok(())
}
