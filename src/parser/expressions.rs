//! Expression grammar: standard C precedence (spec §4.1.4 "Expression").
//!
//! Each precedence tier gets its own function, from `parse_expression`
//! (comma, the loosest) down to `parse_primary` (the tightest). Assignment
//! and ternary are right-associative, modeled the ordinary way — parse the
//! looser left operand first, then recurse back into the same or a looser
//! tier for the right operand instead of looping.

use crate::diagnostics::{DiagnosticKind, ParseErrorKind};
use crate::lexer::Span;
use crate::parser::operators::{BinaryOp, MemberOp, PostfixOp, UnaryOp};
use crate::types::Type;

use super::ast::{Expr, LiteralKind};
use super::Parser;

impl Parser {
    /// Top-level entry: the comma operator.
    pub(super) fn parse_expression(&mut self) -> Expr {
        let mut lhs = self.parse_assignment();
        while self.is(",") {
            let op_location = self.advance().location;
            let rhs = self.parse_assignment();
            let location = lhs.location().merge(rhs.location()).merge(&op_location);
            lhs = Expr::Binary {
                op: BinaryOp::Comma,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                dt: None,
                location,
            };
        }
        lhs
    }

    /// An initializer position: `{ ... }` classifies by the declared
    /// type's shape (`record()` ⇒ `Init`, else `Array`); anything else
    /// falls back to a plain assignment-expression.
    pub(super) fn parse_initializer(&mut self, expected: &Type) -> Expr {
        if self.is("{") {
            self.parse_brace_list(expected.record())
        } else {
            self.parse_assignment()
        }
    }

    fn parse_brace_list(&mut self, is_init: bool) -> Expr {
        let start = self.current().location.clone();
        self.advance(); // "{"
        let mut elements = Vec::new();
        if !self.is("}") {
            loop {
                elements.push(self.parse_assignment());
                if !self.try_match_text(",") {
                    break;
                }
            }
        }
        let end = self.match_text("}").location;
        let location = start.merge(&end);
        let kind = if is_init {
            LiteralKind::Init(elements)
        } else {
            LiteralKind::Array(elements)
        };
        Expr::Literal { kind, dt: None, location }
    }

    pub(super) fn parse_assignment(&mut self) -> Expr {
        let lhs = self.parse_ternary();
        if let Some(op) = self.peek_binary_op_if(BinaryOp::is_assignment) {
            let op_location = self.advance().location;
            let rhs = self.parse_assignment();
            let location = lhs.location().merge(rhs.location()).merge(&op_location);
            return Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                dt: None,
                location,
            };
        }
        lhs
    }

    fn parse_ternary(&mut self) -> Expr {
        let cond = self.parse_logical_or();
        if self.try_match_text("?") {
            let then_expr = self.parse_assignment();
            self.match_text(":");
            let else_expr = self.parse_ternary();
            let location = cond.location().merge(else_expr.location());
            return Expr::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                dt: None,
                location,
            };
        }
        cond
    }

    fn parse_logical_or(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_logical_and, &["||"])
    }

    fn parse_logical_and(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_bitwise, &["&&"])
    }

    /// Spec §4.1.4 lists "bitwise or/xor/and" as a single precedence tier,
    /// unlike standard C's three separate levels — implemented literally
    /// as one combined left-associative level.
    fn parse_bitwise(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_equality, &["|", "^", "&"])
    }

    fn parse_equality(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_relational, &["==", "!="])
    }

    fn parse_relational(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_shift, &["<", ">", "<=", ">="])
    }

    fn parse_shift(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_additive, &["<<", ">>"])
    }

    fn parse_additive(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_multiplicative, &["+", "-"])
    }

    fn parse_multiplicative(&mut self) -> Expr {
        self.parse_left_assoc(Self::parse_unary, &["*", "/", "%"])
    }

    fn parse_left_assoc(&mut self, next: fn(&mut Self) -> Expr, ops: &[&str]) -> Expr {
        let mut lhs = next(self);
        loop {
            let Some(op_text) = ops.iter().find(|&&op| self.is(op)) else {
                break;
            };
            let op_location = self.advance().location;
            let op = BinaryOp::from_text(op_text).expect("op_text is one of the known operators");
            let rhs = next(self);
            let location = lhs.location().merge(rhs.location()).merge(&op_location);
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                dt: None,
                location,
            };
        }
        lhs
    }

    fn peek_binary_op_if(&self, pred: impl Fn(BinaryOp) -> bool) -> Option<BinaryOp> {
        BinaryOp::from_text(&self.current().text).filter(|&op| pred(op))
    }

    /// `+ - ! ~ ++ -- * &` (spec §4.1.4 "unary").
    fn parse_unary(&mut self) -> Expr {
        let start = self.current().location.clone();
        let op = match self.current().text.as_str() {
            "+" => Some(UnaryOp::Plus),
            "-" => Some(UnaryOp::Minus),
            "!" => Some(UnaryOp::Not),
            "~" => Some(UnaryOp::BitNot),
            "++" => Some(UnaryOp::PreInc),
            "--" => Some(UnaryOp::PreDec),
            "*" => Some(UnaryOp::Deref),
            "&" => Some(UnaryOp::AddrOf),
            _ => None,
        };
        let Some(op) = op else {
            return self.parse_postfix();
        };
        self.advance();
        let operand = self.parse_unary();
        let location = start.merge(operand.location());
        Expr::Unary {
            op,
            operand: Box::new(operand),
            dt: None,
            location,
        }
    }

    /// `++ --`, `()`, `[]`, `. ->` (spec §4.1.4 "postfix").
    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            if self.try_match_text("++") {
                let location = expr.location().clone();
                expr = Expr::Postfix {
                    op: PostfixOp::Inc,
                    operand: Box::new(expr),
                    dt: None,
                    location,
                };
            } else if self.try_match_text("--") {
                let location = expr.location().clone();
                expr = Expr::Postfix {
                    op: PostfixOp::Dec,
                    operand: Box::new(expr),
                    dt: None,
                    location,
                };
            } else if self.try_match_text("(") {
                let mut args = Vec::new();
                if !self.is(")") {
                    loop {
                        args.push(self.parse_assignment());
                        if !self.try_match_text(",") {
                            break;
                        }
                    }
                }
                let end = self.match_text(")").location;
                let location = expr.location().merge(&end);
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    symbol: None,
                    dt: None,
                    location,
                };
            } else if self.try_match_text("[") {
                let index = self.parse_expression();
                let end = self.match_text("]").location;
                let location = expr.location().merge(&end);
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                    dt: None,
                    location,
                };
            } else if self.is(".") || self.is("->") {
                let op = if self.is(".") { MemberOp::Dot } else { MemberOp::Arrow };
                self.advance();
                let field_location = self.current().location.clone();
                let field = if self.is_ident() {
                    self.match_ident()
                } else {
                    self.error_generic(
                        ParseErrorKind::Expected {
                            wanted: "field name".to_string(),
                            found: self.current().to_string(),
                        },
                        field_location.clone(),
                    );
                    self.advance();
                    String::new()
                };
                let location = expr.location().merge(&field_location);
                expr = Expr::Member {
                    op,
                    base: Box::new(expr),
                    field,
                    symbol: None,
                    dt: None,
                    location,
                };
            } else {
                break;
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.current().location.clone();

        if self.is_int() {
            let text = self.advance().text;
            let value = text.parse().unwrap_or(0);
            return Expr::Literal {
                kind: LiteralKind::Int(value),
                dt: None,
                location: start,
            };
        }

        if self.is("true") || self.is("false") {
            let value = self.advance().text == "true";
            return Expr::Literal {
                kind: LiteralKind::Bool(value),
                dt: None,
                location: start,
            };
        }

        if self.is("(") {
            self.advance();
            let inner = self.parse_expression();
            let end = self.match_text(")").location;
            let _ = end;
            return inner;
        }

        if self.is("{") {
            return self.parse_brace_list(false);
        }

        if self.current().text.starts_with('"') {
            let raw = self.advance().text;
            let inner = &raw[1..raw.len().saturating_sub(1)];
            let value = unescape::unescape(inner).unwrap_or_else(|| inner.to_string());
            return Expr::Literal {
                kind: LiteralKind::Str(value),
                dt: None,
                location: start,
            };
        }

        if self.is_ident() {
            let name = self.advance().text;
            return match self.table.resolve(&name) {
                Some(id) => Expr::Literal {
                    kind: LiteralKind::Ident(id),
                    dt: None,
                    location: start,
                },
                None => {
                    self.error_undefined_symbol(&name, start.clone());
                    Expr::Invalid(start)
                }
            };
        }

        self.error_generic(
            ParseErrorKind::Expected {
                wanted: "expression".to_string(),
                found: self.current().to_string(),
            },
            start.clone(),
        );
        self.advance();
        Expr::Invalid(start)
    }

    fn error_generic(&mut self, kind: ParseErrorKind, location: Span) {
        self.sink.push(DiagnosticKind::Parse(kind), location);
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    #[test]
    fn test_precedence_multiplicative_over_additive() {
        let (module, _, sink) = parse("int x = 1 + 2 * 3;");
        assert_eq!(sink.error_count(), 0);
        assert_eq!(module.items.len(), 1);
    }

    #[test]
    fn test_ternary_right_associative() {
        let (_, _, sink) = parse("int x = 1 ? 2 : 3 ? 4 : 5;");
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_call_and_member_postfix() {
        let (_, _, sink) = parse("struct S { int a; }; struct S s; int f(); int x = f() + s.a;");
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_undefined_identifier_reports_and_recovers() {
        let (_, _, sink) = parse("int x = y + 1;");
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_array_literal_initializer() {
        let (_, _, sink) = parse("int a[3] = {1, 2, 3};");
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_string_literal_with_escape() {
        let (module, _, sink) = parse(r#"char *s = "hi\nthere";"#);
        assert_eq!(sink.error_count(), 0);
        assert_eq!(module.items.len(), 1);
    }
}
