//! Java source tree output
//!
//! Units are written to `{target}/src/main/java/{package/path}/{Name}.java`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bridgegen_core::{EmitCache, OutputSink, UnitWriter};
use log::debug;

/// Maven source root below the target directory
const SOURCE_ROOT: [&str; 3] = ["src", "main", "java"];

/// File-system sink laid out as a Maven source tree
#[derive(Debug, Clone)]
pub struct SourceTree {
    target_dir: PathBuf,
    cache: EmitCache,
}

impl SourceTree {
    /// Sink writing below `target_dir`, sharing `cache` with other sinks of the run
    pub fn new(target_dir: impl Into<PathBuf>, cache: EmitCache) -> Self {
        Self {
            target_dir: target_dir.into(),
            cache,
        }
    }

    /// Target directory
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Directory holding the package tree
    pub fn source_root(&self) -> PathBuf {
        SOURCE_ROOT
            .iter()
            .fold(self.target_dir.clone(), |path, segment| path.join(segment))
    }

    /// File a qualified Java type name is written to
    pub fn path_for(&self, qualified_name: &str) -> PathBuf {
        let mut path = self.source_root();
        path.extend(qualified_name.split('.'));
        path.set_extension("java");
        path
    }
}

impl OutputSink for SourceTree {
    type Writer = SourceFile;

    fn writer(&mut self, qualified_name: &str) -> io::Result<SourceFile> {
        let path = self.path_for(qualified_name);
        let already_produced = !self.cache.claim(&path.to_string_lossy());
        Ok(SourceFile {
            path,
            already_produced,
            buffer: String::new(),
            cache: self.cache.clone(),
        })
    }
}

/// A buffered `.java` file, written on close
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    already_produced: bool,
    buffer: String,
    cache: EmitCache,
}

impl SourceFile {
    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UnitWriter for SourceFile {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        self.buffer.push('\n');
        Ok(())
    }

    fn is_already_produced(&self) -> bool {
        self.already_produced
    }

    fn close(self) -> io::Result<()> {
        // a path is written at most once per run
        if self.already_produced || self.buffer.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.buffer)?;
        debug!("wrote {}", self.path.display());
        Ok(())
    }

    fn discard(self) -> io::Result<()> {
        if !self.already_produced {
            self.cache.release(&self.path.to_string_lossy());
        }
        Ok(())
    }
}
