//! Diagnostics for purr.
//!
//! Lexing never fails and parsing always produces a tree, so problems with
//! the input are reported out of band as [`Diagnostic`] values. A
//! [`DiagnosticHandler`] collects them and the renderers in [`render`] and
//! [`json`] turn them into terminal text or machine-readable output.
//!
//! ```ignore
//! use purr_diagnostics::{CargoRenderer, Diagnostic, SourceMap};
//!
//! let mut sm = SourceMap::new();
//! let file = sm.add_file("Main.purs".into(), "x = )".into());
//!
//! let diag = Diagnostic::error("unexpected token `)`")
//!     .with_code("P0001")
//!     .with_label(FullSpan::new(file, Span::from_raw(4, 5)), "expected expression");
//!
//! CargoRenderer::new(&sm).render(&diag, &mut std::io::stderr())?;
//! ```

#![warn(missing_docs)]

pub mod json;
pub mod render;

use purr_span::{FileId, SourceFile};
pub use purr_span::{FullSpan, Span};
use serde::{Deserialize, Serialize};

pub use json::{diagnostic_to_json, diagnostics_to_json, to_json_lines};
pub use json::{JsonDiagnostic, JsonSeverity, JsonSpan};
pub use render::{colors, CargoRenderer, RenderConfig};

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Input the parser could not accept.
    Error,
    /// Input that was accepted but looks suspicious.
    Warning,
    /// Additional context.
    Note,
    /// A hint on how to fix the input.
    Help,
}

impl Severity {
    /// Get the label for this severity.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Help => "help",
        }
    }
}

/// A labeled span for diagnostics.
#[derive(Clone, Debug)]
pub struct Label {
    /// The span being labeled.
    pub span: FullSpan,
    /// The message for this label.
    pub message: String,
    /// Whether this is the primary label.
    pub primary: bool,
}

impl Label {
    /// Create a primary label.
    #[must_use]
    pub fn primary(span: FullSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: true,
        }
    }

    /// Create a secondary label.
    #[must_use]
    pub fn secondary(span: FullSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: false,
        }
    }
}

/// A message about the input with its source locations.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The severity of this diagnostic.
    pub severity: Severity,
    /// The main message.
    pub message: String,
    /// An optional error code, e.g. `P0001`.
    pub code: Option<String>,
    /// Labeled spans with messages.
    pub labels: Vec<Label>,
    /// Additional notes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the given severity.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Add an error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add a primary label.
    #[must_use]
    pub fn with_label(mut self, span: FullSpan, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label.
    #[must_use]
    pub fn with_secondary_label(mut self, span: FullSpan, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Add a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The span of the first primary label, if any.
    #[must_use]
    pub fn primary_span(&self) -> Option<FullSpan> {
        self.labels.iter().find(|l| l.primary).map(|l| l.span)
    }
}

/// Collects diagnostics while a file is processed.
#[derive(Debug, Default)]
pub struct DiagnosticHandler {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticHandler {
    /// Create a new diagnostic handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Emit every diagnostic from an iterator.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = impl IntoDiagnostic>) {
        for diag in diagnostics {
            self.emit(diag.into_diagnostic());
        }
    }

    /// Check if any errors have been emitted.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get all diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// The set of source files diagnostics can point into.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create a new empty source map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the source map.
    pub fn add_file(&mut self, name: String, src: String) -> FileId {
        let id = FileId::new(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name, src));
        id
    }

    /// Get a file by ID.
    #[must_use]
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    /// Get the number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the source map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Types that can be reported as a [`Diagnostic`].
pub trait IntoDiagnostic {
    /// Convert into a diagnostic.
    fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
    fn into_diagnostic(self) -> Diagnostic {
        self
    }
}
