//! The diagnostic sink every compiler component reports into.
//!
//! No component raises errors across a boundary: lexer, parser, resolver,
//! and checker all record structured diagnostics here and continue. The
//! driver renders the collected list for the terminal; the language server
//! maps the same list to LSP diagnostics.

use serde::Serialize;

use crate::span::Span;

/// Diagnostic severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// Stable diagnostic codes, grouped by pipeline stage.
///
/// `E01xx` lex, `E02xx` parse, `E03xx` import, `E04xx` name, `E05xx` type,
/// `W01xx` warnings.
pub mod codes {
    pub const LEX_UNEXPECTED_CHAR: &str = "E0101";
    pub const LEX_UNTERMINATED_STRING: &str = "E0102";
    pub const LEX_UNTERMINATED_RAW_BLOCK: &str = "E0103";

    pub const PARSE_UNEXPECTED_TOKEN: &str = "E0201";
    pub const PARSE_EXPECTED_TYPE: &str = "E0202";
    pub const PARSE_EXPECTED_EXPR: &str = "E0203";
    pub const PARSE_INT_OUT_OF_RANGE: &str = "E0204";

    pub const IMPORT_UNRESOLVED: &str = "E0301";
    pub const IMPORT_PRIVATE_SYMBOL: &str = "E0302";

    pub const NAME_UNDECLARED: &str = "E0401";
    pub const NAME_DUPLICATE: &str = "E0402";

    pub const TYPE_MISMATCH: &str = "E0501";
    pub const TYPE_ARITY: &str = "E0502";
    pub const TYPE_BAD_OPERAND: &str = "E0503";
    pub const TYPE_NO_SUCH_MEMBER: &str = "E0504";
    pub const TYPE_PRIVATE_MEMBER: &str = "E0505";
    pub const TYPE_NOT_CALLABLE: &str = "E0506";

    pub const WARN_NON_EXHAUSTIVE_MATCH: &str = "W0101";
    pub const WARN_UNUSED_IMPORT: &str = "W0102";
}

/// A secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

/// A single structured diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// File the primary span points into.
    pub file: String,
    pub span: Span,
    pub code: Option<&'static str>,
    pub message: String,
    /// Optional fix suggestion, rendered as a `help:` line.
    pub hint: Option<String>,
    pub notes: Vec<Note>,
}

/// Accumulates diagnostics for one source unit.
///
/// Components receive a `&mut DiagnosticSink` and keep going after
/// reporting; `has_error` flips once any Error-severity entry lands.
#[derive(Debug)]
pub struct DiagnosticSink {
    file: String,
    diagnostics: Vec<Diagnostic>,
    has_error: bool,
}

impl DiagnosticSink {
    /// Create a sink for the given file name.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            diagnostics: Vec::new(),
            has_error: false,
        }
    }

    /// File this sink reports against.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Record an error.
    pub fn error(&mut self, code: &'static str, span: Span, message: impl Into<String>) {
        self.push(Severity::Error, Some(code), span, message.into(), None);
    }

    /// Record an error with a fix suggestion.
    pub fn error_with_hint(
        &mut self,
        code: &'static str,
        span: Span,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, Some(code), span, message.into(), Some(hint.into()));
    }

    /// Record a warning.
    pub fn warning(&mut self, code: &'static str, span: Span, message: impl Into<String>) {
        self.push(Severity::Warning, Some(code), span, message.into(), None);
    }

    /// Attach a secondary note to the most recent diagnostic.
    pub fn add_note(&mut self, span: Span, message: impl Into<String>) {
        if let Some(last) = self.diagnostics.last_mut() {
            last.notes.push(Note {
                span,
                message: message.into(),
            });
        }
    }

    fn push(
        &mut self,
        severity: Severity,
        code: Option<&'static str>,
        span: Span,
        message: String,
        hint: Option<String>,
    ) {
        if severity == Severity::Error {
            self.has_error = true;
        }
        self.diagnostics.push(Diagnostic {
            severity,
            file: self.file.clone(),
            span,
            code,
            message,
            hint,
            notes: Vec::new(),
        });
    }

    /// Whether any Error-severity diagnostic has been recorded.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// All diagnostics in recording order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the sink, returning diagnostics ordered by starting span.
    ///
    /// Recording order is already source order within one stage; sorting
    /// keeps the guarantee when stages interleave.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diags = self.diagnostics;
        diags.sort_by_key(|d| (d.span.start, d.span.end));
        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_sets_flag() {
        let mut sink = DiagnosticSink::new("main.mg");
        assert!(!sink.has_error());
        sink.warning(codes::WARN_UNUSED_IMPORT, Span::new(0, 5), "unused import");
        assert!(!sink.has_error());
        sink.error(codes::NAME_UNDECLARED, Span::new(6, 9), "undeclared identifier `x`");
        assert!(sink.has_error());
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn hint_and_notes_attach() {
        let mut sink = DiagnosticSink::new("main.mg");
        sink.error_with_hint(
            codes::TYPE_MISMATCH,
            Span::new(4, 8),
            "expected int, found string",
            "use Std.parseInt",
        );
        sink.add_note(Span::new(0, 3), "declared here");
        let diag = &sink.diagnostics()[0];
        assert_eq!(diag.hint.as_deref(), Some("use Std.parseInt"));
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].message, "declared here");
        assert_eq!(diag.code, Some(codes::TYPE_MISMATCH));
    }

    #[test]
    fn into_sorted_orders_by_span() {
        let mut sink = DiagnosticSink::new("main.mg");
        sink.error(codes::PARSE_UNEXPECTED_TOKEN, Span::new(20, 21), "late");
        sink.error(codes::LEX_UNEXPECTED_CHAR, Span::new(2, 3), "early");
        let sorted = sink.into_sorted();
        assert_eq!(sorted[0].message, "early");
        assert_eq!(sorted[1].message, "late");
    }
}
