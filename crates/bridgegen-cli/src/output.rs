//! Colored terminal output for CLI commands.
//!
//! `NO_COLOR` disables color regardless of `--color`.

use std::io::Write;

use bridgegen_core::TraversalReport;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from the `--color` flag and environment.
pub fn resolve_color_choice(flag: &str) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        "always" => ColorChoice::Always,
        "never" => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer over stdout.
pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn write_styled(&mut self, text: &str, spec: &ColorSpec) {
        let _ = self.stdout.set_color(spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    fn fg(&mut self, text: &str, color: Color, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);
        self.write_styled(text, &spec);
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        self.fg(text, Color::Green, true);
    }

    /// Red bold text.
    pub fn error(&mut self, text: &str) {
        self.fg(text, Color::Red, true);
    }

    /// Yellow bold text.
    pub fn warning(&mut self, text: &str) {
        self.fg(text, Color::Yellow, true);
    }

    /// Cyan text.
    pub fn info(&mut self, text: &str) {
        self.fg(text, Color::Cyan, false);
    }

    /// Bold text.
    pub fn bold(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_bold(true);
        self.write_styled(text, &spec);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    /// One line per root module, followed by indented details for
    /// missing submodules and failures.
    pub fn module_summary(&mut self, module: &str, report: &TraversalReport) {
        let mut spec = ColorSpec::new();
        if report.is_clean() {
            spec.set_bg(Some(Color::Green)).set_fg(Some(Color::White));
            self.write_styled(" OK ", spec.set_bold(true));
        } else {
            spec.set_bg(Some(Color::Red)).set_fg(Some(Color::White));
            self.write_styled(" FAIL ", spec.set_bold(true));
        }
        self.plain(" ");
        self.bold(module);
        self.plain(&format!(
            "  {} modules, {} units",
            report.modules.len(),
            report.units.len()
        ));
        if !report.cached.is_empty() {
            self.info(&format!(", {} already generated", report.cached.len()));
        }
        self.newline();

        for missing in &report.missing {
            self.plain("    ");
            self.warning("skipped");
            self.plain(&format!(" {} (not importable)", missing));
            self.newline();
        }
        for (failed, reason) in &report.failures {
            self.plain("    ");
            self.error("failed");
            self.plain(&format!(" {}: {}", failed, reason));
            self.newline();
        }
    }
}
