//! Build tool invocation

use std::path::Path;
use std::process::Command;

use log::info;
use thiserror::Error;

/// Build tool executable
pub const BUILD_TOOL: &str = "mvn";

/// Goals run on the generated project
pub const BUILD_GOALS: [&str; 2] = ["clean", "install"];

/// Errors that can occur while running the build
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build tool could not be started
    #[error("Failed to run {tool}: {source}")]
    SpawnError {
        /// Executable name
        tool: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The build tool exited unsuccessfully
    #[error("{tool} exited with {status}")]
    Failed {
        /// Executable name
        tool: String,
        /// Exit status as reported by the OS
        status: String,
    },
}

/// Run `mvn clean install` in `project_dir`
pub fn run_build(project_dir: &Path) -> Result<(), BuildError> {
    run_tool(BUILD_TOOL, &BUILD_GOALS, project_dir)
}

/// Run `tool args..` in `dir`, inheriting stdio
pub fn run_tool(tool: &str, args: &[&str], dir: &Path) -> Result<(), BuildError> {
    info!("running {} {} in {}", tool, args.join(" "), dir.display());
    let status = Command::new(tool)
        .args(args)
        .current_dir(dir)
        .status()
        .map_err(|source| BuildError::SpawnError {
            tool: tool.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(BuildError::Failed {
            tool: tool.to_string(),
            status: status.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_tool() {
        let temp = TempDir::new().unwrap();
        let err = run_tool("bridgegen-no-such-tool", &[], temp.path()).unwrap_err();
        assert!(matches!(err, BuildError::SpawnError { tool, .. } if tool == "bridgegen-no-such-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        let temp = TempDir::new().unwrap();
        assert!(run_tool("true", &[], temp.path()).is_ok());
        assert!(matches!(
            run_tool("false", &[], temp.path()),
            Err(BuildError::Failed { .. })
        ));
    }
}
