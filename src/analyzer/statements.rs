//! Statement-level checks (spec §4.3.3).

use crate::diagnostics::{AnalyzeErrorKind, DiagnosticKind};
use crate::parser::ast::Stmt;
use crate::types::Type;

use super::Analyzer;

impl<'a> Analyzer<'a> {
    pub(super) fn analyze_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Code(stmts, _) => {
                for s in stmts {
                    self.analyze_stmt(s);
                }
            }
            Stmt::Decl(decl) => self.analyze_decl(decl),
            Stmt::Expr(expr) => {
                let (ty, _) = self.value(expr);
                if !ty.void() && !ty.is_invalid() && !Self::is_side_effecting(expr) {
                    self.sink.push(DiagnosticKind::UnusedValue, expr.location().clone());
                }
            }
            Stmt::Branch {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(cond, "if");
                self.analyze_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.analyze_stmt(else_branch);
                }
            }
            Stmt::Loop { cond, body, .. } => {
                self.check_condition(cond, "loop");
                self.analyze_stmt(body);
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.analyze_stmt(init);
                }
                if let Some(cond) = cond {
                    self.check_condition(cond, "for");
                }
                if let Some(step) = step {
                    self.value(step);
                }
                self.analyze_stmt(body);
            }
            Stmt::Return { value, location } => {
                let actual = match value {
                    Some(expr) => self.value(expr).0,
                    None => Type::Invalid,
                };
                let expected = self.return_type.clone().unwrap_or(Type::Invalid);
                if !Type::compatible(&expected, &actual) {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::ExpectedType {
                            wanted: expected.to_string(""),
                            found: actual.to_string(""),
                        }),
                        location.clone(),
                    );
                }
            }
            // The parser already rejected an illegally placed `break`
            // (spec §4.1.6); the analyzer has nothing left to check.
            Stmt::Break { .. } | Stmt::Empty(_) => {}
        }
    }

    fn check_condition(&mut self, cond: &mut crate::parser::ast::Expr, context: &str) {
        let (ty, _) = self.value(cond);
        if !ty.condition() {
            self.sink.push(
                DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                    op: context.to_string(),
                    requirement: "a condition-typed expression".to_string(),
                }),
                cond.location().clone(),
            );
        }
    }

    /// An expression statement whose value is conventionally discarded on
    /// purpose — an assignment or a call — does not warrant the
    /// value-discard warning (spec §9 Open Question 3 leaves the exact
    /// trigger unspecified; this crate only warns when neither applies).
    fn is_side_effecting(expr: &crate::parser::ast::Expr) -> bool {
        use crate::parser::ast::Expr;
        matches!(
            expr,
            Expr::Binary { op, .. } if op.is_assignment()
        ) || matches!(expr, Expr::Call { .. })
            || matches!(expr, Expr::Postfix { .. })
            || matches!(
                expr,
                Expr::Unary { op, .. }
                    if matches!(op, crate::parser::operators::UnaryOp::PreInc | crate::parser::operators::UnaryOp::PreDec)
            )
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::analyze;
    use crate::parser::parse;

    #[test]
    fn test_branch_requires_condition_type() {
        let (mut module, table, mut sink) = parse("struct S { int a; }; struct S s; if (s) { }");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_value_discard_warns_without_counting_as_error() {
        let (mut module, table, mut sink) = parse("int x = 1; x + 1;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn test_assignment_statement_does_not_warn() {
        let (mut module, table, mut sink) = parse("int x; x = 1;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn test_for_loop_with_empty_header_slots() {
        let (mut module, table, mut sink) = parse("int i = 0; for (;;) { break; }");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 0);
    }
}
