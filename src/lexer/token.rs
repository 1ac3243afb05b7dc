//! Source positions and the token shape the parser consumes.
//!
//! The lexer deliberately carries almost no structure of its own: a token is
//! a class, its literal text, and a location. The parser decides what a
//! punctuation or keyword token *means* by comparing `text` directly (spec
//! §3.2) rather than matching on a large generated enum of punctuation
//! variants, the way the teacher's `lex_derive`-based `Token` does.

use std::fmt::{self, Display};
use std::rc::Rc;

/// A half-open source range, `(line, column)` pairs, zero-indexed.
///
/// `source` is a cheaply-cloned handle to the whole input so that
/// diagnostics can print the offending line without the lexer threading a
/// borrow through every token it hands out — the same tradeoff the
/// teacher's `Span` makes, except with an `Rc<str>` instead of an owned
/// `String` per span.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
    #[serde(skip)]
    pub source: Option<Rc<str>>,
}

impl PartialEq for Span {
    // Position data is irrelevant to AST/type equality in tests; only the
    // variant shape matters there, exactly as in the teacher's `Span`.
    fn eq(&self, _other: &Span) -> bool {
        true
    }
}
impl Eq for Span {}

impl Span {
    pub fn new(start: (usize, usize), end: (usize, usize), source: Rc<str>) -> Span {
        Span {
            start,
            end,
            source: Some(source),
        }
    }

    /// Merge two spans into the range spanning both (`self` supplies the
    /// start, `other` the end) — used to widen a sub-expression's span to
    /// cover an enclosing production.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            source: self.source.clone(),
        }
    }

    /// Render the canonical single-line diagnostic required by spec §6.4.
    pub fn to_line(&self, msg: impl Display) -> String {
        format!(
            "error({}:{}): {}.",
            self.start.0 + 1,
            self.start.1 + 1,
            msg
        )
    }

    /// A colorized multi-line excerpt in the teacher's style, for tools
    /// that want more than the canonical diagnostic line. Never used for
    /// the required diagnostic count or format.
    pub fn render_snippet(&self, msg: impl Display) -> String {
        use colored::Colorize;

        let Some(source) = &self.source else {
            return self.to_line(msg);
        };
        let lines: Vec<&str> = source.lines().collect();
        let (line, col) = self.start;
        let Some(line_str) = lines.get(line) else {
            return self.to_line(msg);
        };
        let margin = format!("{}", line + 1).len();
        let fill = " ".repeat(margin);
        let caret_fill = " ".repeat(col);
        format!(
            "{fill} |\n{:>margin$} |{line_str}\n{fill} |{caret_fill}{} {msg}",
            line + 1,
            "^---".red(),
            margin = margin
        )
    }
}

/// The four classes the core needs from the lexer contract (spec §3.2 /
/// §6.1). Everything that is neither an identifier-shaped word nor a
/// decimal integer nor end-of-input is `Other` — punctuation and keywords
/// alike are told apart purely by `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TokenClass {
    Other,
    Eof,
    Ident,
    Int,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
    pub location: Span,
}

impl Token {
    pub fn eof(location: Span) -> Token {
        Token {
            class: TokenClass::Eof,
            text: String::new(),
            location,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TokenClass::Eof => f.write_str("<eof>"),
            _ => f.write_str(&self.text),
        }
    }
}
