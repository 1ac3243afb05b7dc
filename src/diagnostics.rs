//! Diagnostics and the sink that accumulates them.
//!
//! Spec §4.1.6/§7: there is no throw/catch discipline anywhere in the
//! parser or analyzer. Every error is recorded here and the caller presses
//! on with an `Invalid`-typed node. `ErrorSink` is the single place that
//! counts — spec §8.1.6's invariant ("error count is monotonic
//! non-decreasing and equals the number of emitted diagnostic lines")
//! holds by construction because `push` is the only way to grow it.

use std::fmt;

use crate::lexer::Span;

/// Parser-stage diagnostic kinds (spec §4.1.6).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParseErrorKind {
    Expected { wanted: String, found: String },
    UndefinedSymbol { name: String },
    IllegalBreak,
    IdentOutsideDecl { name: String },
    DuplicateSymbol { name: String },
}

/// Analyzer-stage diagnostic kinds (spec §4.1.6/§7). `NotAnLvalue` is an
/// addition resolving spec §9 Open Question 1: it is modeled as a variant
/// of `operatorRequires`, not a new top-level family, since "requires an
/// lvalue operand" is just another instance of "operator requires its
/// operand to be X".
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AnalyzeErrorKind {
    Expected { wanted: String, found: String },
    ExpectedType { wanted: String, found: String },
    OperatorRequires { op: String, requirement: String },
    NotAnLvalue { op: String },
    TypeMismatch { lhs: String, rhs: String },
    DegreeMismatch { expected: usize, found: usize, callee: String },
    ParamMismatch { index: usize, expected: String, found: String },
    MissingMember { op: String, record: String, field: String },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticKind {
    Parse(ParseErrorKind),
    Analyze(AnalyzeErrorKind),
    /// Value-discard warning (spec §9 Open Question 3) — never affects
    /// `error_count`, only `warning_count`.
    UnusedValue,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Span,
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        matches!(self.kind, DiagnosticKind::UnusedValue)
    }

    /// The canonical single-line rendering required by spec §6.4:
    /// `error(LINE:COL): <message>.`
    pub fn render(&self) -> String {
        self.location.to_line(self.message())
    }

    fn message(&self) -> String {
        match &self.kind {
            DiagnosticKind::Parse(k) => match k {
                ParseErrorKind::Expected { wanted, found } => {
                    format!("expected {wanted}, found {found}")
                }
                ParseErrorKind::UndefinedSymbol { name } => {
                    format!("undefined symbol '{name}'")
                }
                ParseErrorKind::IllegalBreak => "'break' outside a loop or switch".to_string(),
                ParseErrorKind::IdentOutsideDecl { name } => {
                    format!("'{name}' used outside a declaration context")
                }
                ParseErrorKind::DuplicateSymbol { name } => {
                    format!("duplicate symbol '{name}'")
                }
            },
            DiagnosticKind::Analyze(k) => match k {
                AnalyzeErrorKind::Expected { wanted, found } => {
                    format!("expected {wanted}, found {found}")
                }
                AnalyzeErrorKind::ExpectedType { wanted, found } => {
                    format!("return of {wanted} expected, found {found}")
                }
                AnalyzeErrorKind::OperatorRequires { op, requirement } => {
                    format!("operator '{op}' requires {requirement}")
                }
                AnalyzeErrorKind::NotAnLvalue { op } => {
                    format!("operator '{op}' requires a modifiable lvalue operand")
                }
                AnalyzeErrorKind::TypeMismatch { lhs, rhs } => {
                    format!("type mismatch between '{lhs}' and '{rhs}'")
                }
                AnalyzeErrorKind::DegreeMismatch { expected, found, callee } => {
                    format!("{expected} parameters expected, {found} given to {callee}")
                }
                AnalyzeErrorKind::ParamMismatch { index, expected, found } => {
                    format!("parameter {index}: expected '{expected}', found '{found}'")
                }
                AnalyzeErrorKind::MissingMember { op, record, field } => {
                    format!("'{op}' expected field of {record}, found {field}")
                }
            },
            DiagnosticKind::UnusedValue => "expression result unused".to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Accumulates diagnostics for one parse/analyze run. `error_count` is the
/// value both `parse` and `analyze` hand back per spec §4.1.1/§6.4.
#[derive(Debug, Default)]
pub struct ErrorSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorSink {
    pub fn new() -> ErrorSink {
        ErrorSink::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, location: Span) {
        let diagnostic = Diagnostic { kind, location };
        if diagnostic.is_warning() {
            self.warning_count += 1;
        } else {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new((4, 2), (4, 5), std::rc::Rc::from("int x = y;"))
    }

    #[test]
    fn test_render_matches_canonical_format() {
        let mut sink = ErrorSink::new();
        sink.push(
            DiagnosticKind::Parse(ParseErrorKind::UndefinedSymbol { name: "y".into() }),
            span(),
        );
        assert_eq!(
            sink.diagnostics()[0].render(),
            "error(5:3): undefined symbol 'y'."
        );
    }

    #[test]
    fn test_warning_does_not_count_as_error() {
        let mut sink = ErrorSink::new();
        sink.push(DiagnosticKind::UnusedValue, span());
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn test_error_count_matches_pushed_errors() {
        let mut sink = ErrorSink::new();
        sink.push(DiagnosticKind::Parse(ParseErrorKind::IllegalBreak), span());
        sink.push(
            DiagnosticKind::Analyze(AnalyzeErrorKind::NotAnLvalue { op: "=".into() }),
            span(),
        );
        assert_eq!(sink.error_count(), 2);
        assert_eq!(sink.diagnostics().len(), 2);
    }
}
