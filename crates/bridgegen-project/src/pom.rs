//! Maven project descriptor (pom.xml)

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::config::ProjectConfig;

/// Descriptor file name
pub const POM_FILE: &str = "pom.xml";

/// Errors that can occur while writing the descriptor
#[derive(Debug, Error)]
pub enum PomError {
    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// XML serialization failed
    #[error("Failed to write XML: {0}")]
    XmlError(String),
}

/// Render the descriptor for `config`
pub fn render_pom(config: &ProjectConfig) -> Result<String, PomError> {
    let mut pom = PomWriter::new();
    pom.decl()?;
    pom.start("project")?;
    pom.element("modelVersion", "4.0.0")?;
    pom.element("groupId", &config.project.group_id)?;
    pom.element("artifactId", &config.project.artifact_id)?;
    pom.element("version", &config.project.version)?;

    pom.start("properties")?;
    pom.element("maven.compiler.source", &config.build.java_version)?;
    pom.element("maven.compiler.target", &config.build.java_version)?;
    pom.element("project.build.sourceEncoding", "UTF-8")?;
    pom.end("properties")?;

    pom.start("dependencies")?;
    for dependency in &config.dependencies {
        pom.start("dependency")?;
        pom.element("groupId", &dependency.group_id)?;
        pom.element("artifactId", &dependency.artifact_id)?;
        pom.element("version", &dependency.version)?;
        pom.end("dependency")?;
    }
    pom.end("dependencies")?;

    pom.end("project")?;
    pom.finish()
}

/// Write the descriptor into `config`'s target directory
pub fn write_pom(config: &ProjectConfig) -> Result<PathBuf, PomError> {
    write_pom_to(config, &config.target_dir())
}

/// Write the descriptor into `dir`
pub fn write_pom_to(config: &ProjectConfig, dir: &Path) -> Result<PathBuf, PomError> {
    let content = render_pom(config)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(POM_FILE);
    fs::write(&path, content)?;
    Ok(path)
}

struct PomWriter {
    writer: Writer<Vec<u8>>,
}

impl PomWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), PomError> {
        self.writer
            .write_event(event)
            .map_err(|e| PomError::XmlError(e.to_string()))
    }

    fn decl(&mut self) -> Result<(), PomError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, tag: &str) -> Result<(), PomError> {
        self.write(Event::Start(BytesStart::new(tag)))
    }

    fn end(&mut self, tag: &str) -> Result<(), PomError> {
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn element(&mut self, tag: &str, text: &str) -> Result<(), PomError> {
        self.start(tag)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(tag)
    }

    fn finish(self) -> Result<String, PomError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| PomError::XmlError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[project]
group-id = "org.example"
artifact-id = "bank-bindings"
version = "1.0.0"

[build]
java-version = "17"

[[modules]]
qualname = "bank"

[[dependencies]]
group-id = "org.jbind"
artifact-id = "base"
version = "1.0"
"#;

    #[test]
    fn test_render_pom() {
        let config = ProjectConfig::from_str(CONFIG).unwrap();
        let pom = render_pom(&config).unwrap();

        assert!(pom.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(pom.contains("<modelVersion>4.0.0</modelVersion>"));
        assert!(pom.contains("<groupId>org.example</groupId>"));
        assert!(pom.contains("<artifactId>bank-bindings</artifactId>"));
        assert!(pom.contains("<maven.compiler.source>17</maven.compiler.source>"));
        assert!(pom.contains("<maven.compiler.target>17</maven.compiler.target>"));
        assert!(pom.contains("<project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>"));
        assert!(pom.contains("<artifactId>base</artifactId>"));
        assert!(pom.trim_end().ends_with("</project>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let config = ProjectConfig::from_str(&CONFIG.replace("\"1.0.0\"", "\"1.0.0<beta>\"")).unwrap();
        let pom = render_pom(&config).unwrap();
        assert!(pom.contains("<version>1.0.0&lt;beta&gt;</version>"));
    }

    #[test]
    fn test_write_pom_to_dir() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::from_str(CONFIG).unwrap();
        let path = write_pom_to(&config, &temp.path().join("build")).unwrap();
        assert_eq!(path, temp.path().join("build").join("pom.xml"));
        assert!(fs::read_to_string(path).unwrap().contains("<dependency>"));
    }
}
