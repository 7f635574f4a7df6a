//! Diagnostic rendering for lowering errors.
//!
//! Wraps lowering errors into codespan diagnostics with source context, plus
//! a JSON projection for editor integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use termcolor::{ColorChoice, StandardStream};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::frontend::Span;
use crate::lower::LowerError;

/// Stable error code attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A renderable diagnostic with source context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        let label =
            Label::primary(file_id, span.start as usize..span.end as usize).with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create a diagnostic from a lowering error
    pub fn from_lower_error(error: &LowerError, file_id: usize) -> Self {
        let diag = Diagnostic::error(error.to_string()).with_code(ErrorCode(error.code()));
        match error {
            LowerError::InvalidMacroMember { span, .. } => diag
                .with_primary_label(file_id, *span, "no Lua translation for this member")
                .with_note("capability members compile to target operators, not real fields"),
            LowerError::FunctionIndex { span } => {
                diag.with_primary_label(file_id, *span, "function values have no elements")
            }
            LowerError::ClassPrototypeAccess { span } => diag
                .with_primary_label(file_id, *span, "prototype is internal to the class shape")
                .with_help("access members through an instance instead"),
            LowerError::ConstructorReturn { span } => diag
                .with_primary_label(file_id, *span, "remove the return value")
                .with_note("a constructor always produces the new instance"),
            LowerError::InvalidGeneratorReturn { span, .. } => diag
                .with_primary_label(file_id, *span, "declared return type is not an iterator"),
            LowerError::ReservedName { span, .. } => diag
                .with_primary_label(file_id, *span, "reserved for compiler-generated names")
                .with_help("pick a name without the '____' or '__vela' prefix"),
        }
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic for IDE integration
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "V1002")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: Option<String>,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file_id = label.file_id;
                let file_name = files.get(file_id).ok()?.name().to_string();
                let start_location = files.get(file_id).ok()?.location((), label.range.start).ok()?;
                let end_location = files.get(file_id).ok()?.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file_name,
                    start_line: start_location.line_number,
                    start_column: start_location.column_number,
                    end_line: end_location.line_number,
                    end_column: end_location.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        codespan_reporting::diagnostic::LabelStyle::Primary => "primary",
                        codespan_reporting::diagnostic::LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(
    path: impl Into<PathBuf>,
    source: impl Into<String>,
) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_error_diagnostic() {
        let diag = Diagnostic::error("Test error message");
        assert_eq!(diag.inner.severity, Severity::Error);
    }

    #[test]
    fn test_from_lower_error_carries_code() {
        let error = LowerError::FunctionIndex {
            span: Span::new(10, 15, 1, 10),
        };
        let diag = Diagnostic::from_lower_error(&error, 0);
        assert_eq!(diag.inner.severity, Severity::Error);
        assert_eq!(diag.code, Some(ErrorCode("V1002")));
    }

    #[test]
    fn test_json_output() {
        let error = LowerError::ReservedName {
            name: "____x".to_string(),
            span: Span::new(4, 9, 1, 4),
        };
        let diag = Diagnostic::from_lower_error(&error, 0);
        let files = create_files("test.vela", "let ____x = 1;");

        let json = diag.to_json(&files).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"V1006\""));
        assert!(json.contains("\"severity\""));
        assert!(json.contains("\"error\""));
        assert!(json.contains("\"labels\""));
        assert!(json.contains("\"start_line\""));
    }
}
