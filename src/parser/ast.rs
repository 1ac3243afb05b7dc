//! The AST: a tagged-variant enum tree.
//!
//! Spec §9's redesign note replaces the source's single class-tagged node
//! (a long `switch` on a `class` discriminant) with exhaustive pattern
//! matching over real Rust variants — the same shape the teacher's
//! `parser::ast::Expression`/`Statement` enums use. Where the original
//! design reused its one generic node shape for declarator postfixes too
//! (spec §4.1.4: "array bounds and parameter lists build `Index` and
//! `Call` nodes... in the declarator AST"), this crate gives declarators
//! their own dedicated fields instead of overloading `Expr::Index`/
//! `Expr::Call` — the overloading was a symptom of the single-node design,
//! not something worth preserving once real variants are available.

use crate::lexer::Span;
use crate::parser::operators::{BinaryOp, MemberOp, PostfixOp, UnaryOp};
use crate::symbol::SymbolId;
use crate::types::Type;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Module {
    pub items: Vec<TopLevel>,
    pub location: Span,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum TopLevel {
    Decl(Decl),
    FnImpl(FnImpl),
    /// A bare statement at module scope (`if`/`while`/`for`/`break`/an
    /// expression statement/…) — spec §8.3 scenario 4 parses `break` inside
    /// an `if` directly at the top level, so `TopLevel` can't collapse to
    /// only `Decl`/`FnImpl`.
    Stmt(Stmt),
}

/// `BasicType Declarator { "," Declarator } ";"` (spec §4.1.4). A struct or
/// union specifier that introduces a body is carried alongside as
/// `inline_record`, corresponding to the spec's "`DeclStruct` AST child".
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Decl {
    pub inline_record: Option<RecordDecl>,
    pub declarators: Vec<Declarator>,
    pub location: Span,
}

/// A struct/union/enum body introduction. `kind` mirrors the defining
/// symbol's `SymbolKind` (`Struct`, `Union`, or `Enum`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecordDecl {
    pub symbol: SymbolId,
    pub members: Vec<Decl>,
    pub location: Span,
}

/// One declared name: pointer depth and array/parameter postfixes have
/// already been folded into `symbol`'s resolved `Type` by the time parsing
/// finishes the declarator (spec §4.1.4); `params` is kept on the
/// declarator itself only when it introduces a function, since the
/// analyzer's call-arity check (spec §4.3.2 "Call") needs to walk a
/// callee's `Param` children, which live on the symbol, not here.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Declarator {
    pub symbol: SymbolId,
    pub init: Option<Expr>,
    pub location: Span,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Param {
    pub symbol: SymbolId,
    pub location: Span,
}

/// A function declarator immediately followed by a compound statement
/// (spec §4.1.4). The declarator's scope becomes the body's scope.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FnImpl {
    pub symbol: SymbolId,
    pub params: Vec<Param>,
    pub body: Stmt,
    pub location: Span,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Stmt {
    Code(Vec<Stmt>, Span),
    Decl(Decl),
    Expr(Expr),
    Branch {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: Span,
    },
    Loop {
        cond: Expr,
        body: Box<Stmt>,
        /// `true` for `do { } while (cond);` — the condition is still
        /// checked against `condition` the same way, only the parser's
        /// grammar shape differs.
        is_do_while: bool,
        location: Span,
    },
    /// `for (init; cond; step) body` — fields are named and ordered
    /// exactly `init, cond, step` per spec §9 Open Question 4, rather than
    /// an anonymous three-child list, so reordering them is a compile
    /// error, not a silent bug.
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
        location: Span,
    },
    Return {
        value: Option<Expr>,
        location: Span,
    },
    Break {
        location: Span,
    },
    Empty(Span),
}

impl Stmt {
    pub fn location(&self) -> &Span {
        match self {
            Stmt::Code(_, loc) => loc,
            Stmt::Decl(d) => &d.location,
            Stmt::Expr(e) => e.location(),
            Stmt::Branch { location, .. }
            | Stmt::Loop { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Break { location } => location,
            Stmt::Empty(loc) => loc,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum LiteralKind {
    Int(i64),
    Bool(bool),
    /// Resolved at parse time (spec §4.1.4); an undefined reference never
    /// reaches this variant — the parser emits `undefinedSymbol` and
    /// produces `Expr::Invalid` instead (spec §8.1 invariant 1).
    Ident(SymbolId),
    /// Sugar for a `char` array (spec `SPEC_FULL.md` §3 "String literals");
    /// `value` excludes the implicit trailing NUL, which is accounted for
    /// only in the derived array length.
    Str(String),
    /// A brace-enclosed list whose elements must be mutually `compatible`
    /// (spec §9 Open Question 2).
    Array(Vec<Expr>),
    /// A brace-enclosed initializer list for a non-array aggregate (e.g. a
    /// struct). Element homogeneity does not apply; this crate type-checks
    /// each element for its own sake (so every node still gets a `dt`) but
    /// does not attempt field-wise validation against a record's layout.
    Init(Vec<Expr>),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    Literal {
        kind: LiteralKind,
        dt: Option<Type>,
        location: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        dt: Option<Type>,
        location: Span,
    },
    Member {
        op: MemberOp,
        base: Box<Expr>,
        field: String,
        /// Resolved at analysis time once the base's record type is
        /// known (spec §3.5 `symbol`: "bound... at analysis time for
        /// member accesses").
        symbol: Option<SymbolId>,
        dt: Option<Type>,
        location: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        dt: Option<Type>,
        location: Span,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
        dt: Option<Type>,
        location: Span,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        dt: Option<Type>,
        location: Span,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        dt: Option<Type>,
        location: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// Resolved at analysis time: "refers to the function being
        /// called" once the callee's type/symbol are known (spec §6.3).
        symbol: Option<SymbolId>,
        dt: Option<Type>,
        location: Span,
    },
    /// Produced in place of a primary that failed to parse or resolve —
    /// e.g. an undefined identifier reference (spec §4.1.4). Always
    /// analyzes to `Type::Invalid`.
    Invalid(Span),
    /// An absent expression, e.g. an omitted `for`-header slot (spec §9
    /// Open Question 4). Always analyzes to `Type::Invalid`.
    Empty(Span),
}

impl Expr {
    pub fn location(&self) -> &Span {
        match self {
            Expr::Literal { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Member { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Postfix { location, .. }
            | Expr::Ternary { location, .. }
            | Expr::Index { location, .. }
            | Expr::Call { location, .. }
            | Expr::Invalid(location)
            | Expr::Empty(location) => location,
        }
    }

    pub fn dt(&self) -> Option<&Type> {
        match self {
            Expr::Literal { dt, .. }
            | Expr::Binary { dt, .. }
            | Expr::Member { dt, .. }
            | Expr::Unary { dt, .. }
            | Expr::Postfix { dt, .. }
            | Expr::Ternary { dt, .. }
            | Expr::Index { dt, .. }
            | Expr::Call { dt, .. } => dt.as_ref(),
            Expr::Invalid(_) | Expr::Empty(_) => None,
        }
    }
}
