//! JSON diagnostic output.
//!
//! ```json
//! {
//!   "message": "unexpected token `)`: expected {expression}",
//!   "code": "P0001",
//!   "severity": "error",
//!   "spans": [
//!     {
//!       "file": "src/Main.purs",
//!       "line_start": 4,
//!       "line_end": 4,
//!       "column_start": 13,
//!       "column_end": 14,
//!       "is_primary": true,
//!       "text": ")"
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Diagnostic, Severity, SourceMap};

/// A diagnostic in JSON format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// The main message.
    pub message: String,

    /// The error code, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// The severity level.
    pub severity: JsonSeverity,

    /// The source spans associated with this diagnostic.
    pub spans: Vec<JsonSpan>,

    /// Additional notes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Severity level in JSON format.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JsonSeverity {
    /// An error.
    Error,
    /// A warning.
    Warning,
    /// A note.
    Note,
    /// A help message.
    Help,
}

impl From<Severity> for JsonSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Error,
            Severity::Warning => Self::Warning,
            Severity::Note => Self::Note,
            Severity::Help => Self::Help,
        }
    }
}

/// A source span in JSON format. Lines and columns are 1-indexed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonSpan {
    /// The file path.
    pub file: String,
    /// The starting line.
    pub line_start: u32,
    /// The ending line.
    pub line_end: u32,
    /// The starting column, in chars.
    pub column_start: u32,
    /// The ending column, in chars.
    pub column_end: u32,
    /// Whether this is the primary span.
    pub is_primary: bool,

    /// The label for this span, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// The source text under this span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Convert a diagnostic to JSON format.
#[must_use]
pub fn diagnostic_to_json(diagnostic: &Diagnostic, source_map: &SourceMap) -> JsonDiagnostic {
    let spans = diagnostic
        .labels
        .iter()
        .filter_map(|label| {
            let file = source_map.get_file(label.span.file)?;
            let start = file.lookup_line_col(label.span.span.lo);
            let end = file.lookup_line_col(label.span.span.hi);
            let text = file.source_text(label.span.span);

            Some(JsonSpan {
                file: file.name.clone(),
                line_start: start.line,
                line_end: end.line,
                column_start: start.col,
                column_end: end.col,
                is_primary: label.primary,
                label: (!label.message.is_empty()).then(|| label.message.clone()),
                text: (!text.is_empty()).then(|| text.to_string()),
            })
        })
        .collect();

    JsonDiagnostic {
        message: diagnostic.message.clone(),
        code: diagnostic.code.clone(),
        severity: diagnostic.severity.into(),
        spans,
        notes: diagnostic.notes.clone(),
    }
}

/// Convert multiple diagnostics to JSON format.
#[must_use]
pub fn diagnostics_to_json(
    diagnostics: &[Diagnostic],
    source_map: &SourceMap,
) -> Vec<JsonDiagnostic> {
    diagnostics
        .iter()
        .map(|d| diagnostic_to_json(d, source_map))
        .collect()
}

/// Serialize diagnostics as JSON lines, one compact object per line.
pub fn to_json_lines(
    diagnostics: &[Diagnostic],
    source_map: &SourceMap,
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for diag in diagnostics {
        output.push_str(&serde_json::to_string(&diagnostic_to_json(diag, source_map))?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use purr_span::{FileId, FullSpan, Span};

    fn create_test_source_map() -> SourceMap {
        let mut sm = SourceMap::new();
        sm.add_file(
            "Test.purs".to_string(),
            "module Test where\n\nfoo x = x + )\n".to_string(),
        );
        sm
    }

    #[test]
    fn test_secondary_span_is_not_primary() {
        let sm = create_test_source_map();
        let diag = Diagnostic::error("unexpected token `)`")
            .with_label(FullSpan::new(FileId::new(0), Span::from_raw(31, 32)), "")
            .with_secondary_label(FullSpan::new(FileId::new(0), Span::from_raw(19, 32)), "left unparsed");

        let json = diagnostic_to_json(&diag, &sm);
        let primary: Vec<bool> = json.spans.iter().map(|s| s.is_primary).collect();
        assert_eq!(primary, [true, false]);
        assert_eq!(json.spans[0].label, None);
        assert_eq!(json.spans[1].label.as_deref(), Some("left unparsed"));
    }

    #[test]
    fn test_json_diagnostic() {
        let sm = create_test_source_map();

        let diag = Diagnostic::error("unexpected token `)`")
            .with_code("P0001")
            .with_label(
                FullSpan::new(FileId::new(0), Span::from_raw(31, 32)),
                "expected expression",
            )
            .with_note("inside the declaration of `foo`");

        let json = diagnostic_to_json(&diag, &sm);

        assert_eq!(json.code.as_deref(), Some("P0001"));
        assert_eq!(json.severity, JsonSeverity::Error);
        assert_eq!(json.spans.len(), 1);
        let span = &json.spans[0];
        assert_eq!(span.file, "Test.purs");
        assert_eq!((span.line_start, span.column_start), (3, 13));
        assert_eq!((span.line_end, span.column_end), (3, 14));
        assert_eq!(span.text.as_deref(), Some(")"));
        assert_eq!(json.notes.len(), 1);
    }

    #[test]
    fn test_json_serialization() {
        let sm = create_test_source_map();

        let diag = Diagnostic::error("test error")
            .with_code("P0002")
            .with_label(FullSpan::new(FileId::new(0), Span::from_raw(0, 6)), "here");

        let json_str = to_json_lines(&[diag], &sm).unwrap();

        assert!(json_str.contains("\"message\":\"test error\""));
        assert!(json_str.contains("\"severity\":\"error\""));
        assert!(json_str.contains("\"text\":\"module\""));
        assert!(!json_str.contains("\"notes\""));
    }

    #[test]
    fn test_json_lines() {
        let sm = create_test_source_map();

        let output = to_json_lines(
            &[
                Diagnostic::error("error 1"),
                Diagnostic::new(Severity::Warning, "warning 1"),
            ],
            &sm,
        )
        .unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        let back: JsonDiagnostic = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back.severity, JsonSeverity::Warning);
        assert!(back.spans.is_empty());
    }
}
