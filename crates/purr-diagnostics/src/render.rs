//! Cargo-style diagnostic rendering.
//!
//! Produces a header line, a `-->` location, the offending source line with a
//! caret underline, and trailing notes. Colors are optional.

use std::io::Write;

use purr_span::{LineCol, SourceFile, Span};

use crate::{Diagnostic, Label, Severity, SourceMap};

/// ANSI color codes for terminal output.
pub mod colors {
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
    /// Bold red text.
    pub const BOLD_RED: &str = "\x1b[1;31m";
    /// Bold yellow text.
    pub const BOLD_YELLOW: &str = "\x1b[1;33m";
    /// Bold blue text.
    pub const BOLD_BLUE: &str = "\x1b[1;34m";
    /// Bold cyan text.
    pub const BOLD_CYAN: &str = "\x1b[1;36m";
    /// Bold green text.
    pub const BOLD_GREEN: &str = "\x1b[1;32m";
}

/// Configuration for the diagnostic renderer.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Whether to use colors in output.
    pub colors: bool,
    /// Whether to show error codes.
    pub show_codes: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            colors: true,
            show_codes: true,
        }
    }
}

impl RenderConfig {
    /// Create a config with colors enabled.
    #[must_use]
    pub fn colored() -> Self {
        Self::default()
    }

    /// Create a config without colors (for testing or piping).
    #[must_use]
    pub fn plain() -> Self {
        Self {
            colors: false,
            ..Self::default()
        }
    }
}

/// Start and end of a span as 1-indexed line/column pairs.
struct SpanLines {
    start: LineCol,
    end: LineCol,
}

impl SpanLines {
    fn of(file: &SourceFile, span: Span) -> Self {
        Self {
            start: file.lookup_line_col(span.lo),
            end: file.lookup_line_col(span.hi),
        }
    }

    fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

/// A Cargo-style diagnostic renderer.
pub struct CargoRenderer<'a> {
    source_map: &'a SourceMap,
    config: RenderConfig,
}

impl<'a> CargoRenderer<'a> {
    /// Create a new renderer with the given source map.
    #[must_use]
    pub fn new(source_map: &'a SourceMap) -> Self {
        Self {
            source_map,
            config: RenderConfig::default(),
        }
    }

    /// Create a new renderer with custom configuration.
    #[must_use]
    pub fn with_config(source_map: &'a SourceMap, config: RenderConfig) -> Self {
        Self { source_map, config }
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.config.colors {
            code
        } else {
            ""
        }
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        self.paint(match severity {
            Severity::Error => colors::BOLD_RED,
            Severity::Warning => colors::BOLD_YELLOW,
            Severity::Note => colors::BOLD_CYAN,
            Severity::Help => colors::BOLD_GREEN,
        })
    }

    /// Render a diagnostic to the given writer.
    pub fn render(&self, diagnostic: &Diagnostic, w: &mut impl Write) -> std::io::Result<()> {
        let color = self.severity_color(diagnostic.severity);
        let blue = self.paint(colors::BOLD_BLUE);
        let reset = self.paint(colors::RESET);

        write!(w, "{color}{}", diagnostic.severity.label())?;
        if self.config.show_codes {
            if let Some(code) = &diagnostic.code {
                write!(w, "[{code}]")?;
            }
        }
        writeln!(w, "{reset}: {}", diagnostic.message)?;

        for label in &diagnostic.labels {
            let Some(file) = self.source_map.get_file(label.span.file) else {
                continue;
            };
            self.render_label(file, label, diagnostic.severity, w)?;
        }

        for note in &diagnostic.notes {
            writeln!(w, " {blue}={reset} note: {note}")?;
        }

        writeln!(w)?;
        Ok(())
    }

    fn render_label(
        &self,
        file: &SourceFile,
        label: &Label,
        severity: Severity,
        w: &mut impl Write,
    ) -> std::io::Result<()> {
        let blue = self.paint(colors::BOLD_BLUE);
        let reset = self.paint(colors::RESET);
        let mark = if label.primary {
            self.severity_color(severity)
        } else {
            blue
        };

        let lines = SpanLines::of(file, label.span.span);
        let arrow = if label.primary { "-->" } else { ":::" };
        writeln!(
            w,
            " {blue}{arrow}{reset} {}:{}:{}",
            file.name, lines.start.line, lines.start.col
        )?;

        let width = lines.end.line.to_string().len().max(3);
        let Some(source) = file.line_content(lines.start.line as usize - 1) else {
            return Ok(());
        };

        writeln!(w, " {blue}{:>width$} |{reset}", "")?;
        writeln!(w, " {blue}{:>width$} |{reset} {source}", lines.start.line)?;

        // Multi-line spans underline to the end of their first line.
        let start_col = lines.start.col as usize - 1;
        let end_col = if lines.is_multiline() {
            source.chars().count()
        } else {
            lines.end.col as usize - 1
        };
        let carets = "^".repeat(end_col.saturating_sub(start_col).max(1));
        write!(
            w,
            " {blue}{:>width$} |{reset} {}{mark}{carets}",
            "",
            " ".repeat(start_col)
        )?;
        if label.message.is_empty() {
            writeln!(w, "{reset}")?;
        } else {
            writeln!(w, " {}{reset}", label.message)?;
        }
        if lines.is_multiline() {
            writeln!(
                w,
                " {blue}{:>width$} |{reset} {mark}...through line {}{reset}",
                "", lines.end.line
            )?;
        }
        Ok(())
    }
}
