//! Expression type derivation (spec §4.3.2).
//!
//! `value` is the one function every expression passes through. It writes
//! the derived type onto the node's `dt` field as a side effect and hands
//! the caller back `(Type, bool)` — the type, and whether the expression is
//! a modifiable lvalue. The lvalue half never gets a home on the AST itself
//! (spec §9 Open Question 1): nothing downstream needs to ask "was this
//! lvalue?" once its immediate parent has used the answer.

use crate::diagnostics::{AnalyzeErrorKind, DiagnosticKind};
use crate::parser::ast::{Expr, LiteralKind};
use crate::parser::operators::{BinaryOp, MemberOp, UnaryOp};
use crate::symbol::{Builtin, SymbolKind};
use crate::types::{BasicKind, Type};

use super::Analyzer;

impl<'a> Analyzer<'a> {
    pub(super) fn value(&mut self, expr: &mut Expr) -> (Type, bool) {
        let result = self.derive(expr);
        if let Some(dt) = expr_dt_mut(expr) {
            *dt = Some(result.0.clone());
        }
        result
    }

    fn derive(&mut self, expr: &mut Expr) -> (Type, bool) {
        match expr {
            Expr::Literal { kind, location, .. } => self.value_literal(kind, location.clone()),
            Expr::Binary { op, lhs, rhs, location, .. } => {
                self.value_binary(*op, lhs, rhs, location.clone())
            }
            Expr::Member {
                op,
                base,
                field,
                symbol,
                location,
                ..
            } => self.value_member(*op, base, field, symbol, location.clone()),
            Expr::Unary { op, operand, location, .. } => {
                self.value_unary(*op, operand, location.clone())
            }
            Expr::Postfix { op, operand, location, .. } => {
                let (operand_t, lvalue) = self.value(operand);
                if !lvalue {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::NotAnLvalue { op: op.text().to_string() }),
                        location.clone(),
                    );
                } else if !operand_t.numeric() && !operand_t.pointer() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: op.text().to_string(),
                            requirement: "a numeric or pointer operand".to_string(),
                        }),
                        location.clone(),
                    );
                }
                (operand_t, false)
            }
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
                location,
                ..
            } => {
                let (cond_t, _) = self.value(cond);
                if !cond_t.condition() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: "?:".to_string(),
                            requirement: "a condition-typed expression".to_string(),
                        }),
                        location.clone(),
                    );
                }
                let (then_t, _) = self.value(then_expr);
                let (else_t, _) = self.value(else_expr);
                (Type::derive_unified(&then_t, &else_t), false)
            }
            Expr::Index { base, index, location, .. } => {
                let (base_t, _) = self.value(base);
                let (index_t, _) = self.value(index);
                if !base_t.array() && !base_t.pointer() && !base_t.is_invalid() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: "[]".to_string(),
                            requirement: "an array or pointer operand".to_string(),
                        }),
                        location.clone(),
                    );
                }
                if !index_t.numeric() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: "[]".to_string(),
                            requirement: "a numeric index".to_string(),
                        }),
                        location.clone(),
                    );
                }
                (Type::derive_base(&base_t), true)
            }
            Expr::Call {
                callee,
                args,
                symbol,
                location,
                ..
            } => self.value_call(callee, args, symbol, location.clone()),
            Expr::Invalid(_) | Expr::Empty(_) => (Type::Invalid, false),
        }
    }

    fn value_literal(&mut self, kind: &mut LiteralKind, location: crate::lexer::Span) -> (Type, bool) {
        match kind {
            LiteralKind::Int(_) => (self.builtin_type(Builtin::Int, BasicKind::Int), false),
            LiteralKind::Bool(_) => (self.builtin_type(Builtin::Bool, BasicKind::Bool), false),
            LiteralKind::Ident(sym) => {
                let ty = self
                    .table
                    .get(*sym)
                    .data_type
                    .clone()
                    .unwrap_or(Type::Invalid);
                (ty, true)
            }
            LiteralKind::Str(text) => {
                let char_t = self.builtin_type(Builtin::Char, BasicKind::Char);
                (Type::derive_array(&char_t, text.len() + 1), false)
            }
            LiteralKind::Array(elements) => {
                let mut elem_t: Option<Type> = None;
                for element in elements.iter_mut() {
                    let (t, _) = self.value(element);
                    elem_t = Some(match elem_t {
                        None => t,
                        Some(prev) => {
                            if !Type::compatible(&prev, &t) {
                                self.sink.push(
                                    DiagnosticKind::Analyze(AnalyzeErrorKind::TypeMismatch {
                                        lhs: prev.to_string(""),
                                        rhs: t.to_string(""),
                                    }),
                                    location.clone(),
                                );
                            }
                            Type::derive_unified(&prev, &t)
                        }
                    });
                }
                let elem_t = elem_t.unwrap_or(Type::Invalid);
                let len = elements.len();
                (Type::derive_array(&elem_t, len), false)
            }
            LiteralKind::Init(elements) => {
                for element in elements.iter_mut() {
                    self.value(element);
                }
                (Type::Invalid, false)
            }
        }
    }

    fn value_binary(
        &mut self,
        op: BinaryOp,
        lhs: &mut Expr,
        rhs: &mut Expr,
        location: crate::lexer::Span,
    ) -> (Type, bool) {
        if op.is_comma() {
            self.value(lhs);
            let (rhs_t, _) = self.value(rhs);
            return (rhs_t, false);
        }

        if op.is_assignment() {
            let (lhs_t, lvalue) = self.value(lhs);
            let (rhs_t, _) = self.value(rhs);
            if !lvalue {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::NotAnLvalue { op: op.text().to_string() }),
                    location.clone(),
                );
            }
            if op.is_compound_assignment() && !lhs_t.numeric() {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                        op: op.text().to_string(),
                        requirement: "a numeric operand".to_string(),
                    }),
                    location.clone(),
                );
            } else if !Type::compatible(&lhs_t, &rhs_t) {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::TypeMismatch {
                        lhs: lhs_t.to_string(""),
                        rhs: rhs_t.to_string(""),
                    }),
                    location.clone(),
                );
            }
            return (lhs_t, false);
        }

        let (lhs_t, _) = self.value(lhs);
        let (rhs_t, _) = self.value(rhs);

        if op.is_numeric() {
            if op.is_additive() {
                if !lhs_t.ordinal() || !rhs_t.ordinal() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: op.text().to_string(),
                            requirement: "a numeric or pointer operand".to_string(),
                        }),
                        location.clone(),
                    );
                }
            } else if !lhs_t.numeric() || !rhs_t.numeric() {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                        op: op.text().to_string(),
                        requirement: "a numeric operand".to_string(),
                    }),
                    location.clone(),
                );
            }
            return (Type::derive_from_two(&lhs_t, &rhs_t), false);
        }

        if op.is_ordinal() {
            if !lhs_t.ordinal() || !rhs_t.ordinal() {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                        op: op.text().to_string(),
                        requirement: "an ordinal operand".to_string(),
                    }),
                    location.clone(),
                );
            }
            return (self.builtin_type(Builtin::Bool, BasicKind::Bool), false);
        }

        if op.is_equality() {
            if !lhs_t.equality() || !rhs_t.equality() {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                        op: op.text().to_string(),
                        requirement: "comparable operands".to_string(),
                    }),
                    location.clone(),
                );
            }
            return (self.builtin_type(Builtin::Bool, BasicKind::Bool), false);
        }

        // `&&`/`||` (spec §4.3.2's operator table omits them; this crate
        // treats them as their own family rather than folding them into
        // Numeric, since their operand requirement is `condition`, not
        // `numeric`, and their result is always `bool`).
        debug_assert!(op.is_logical());
        if !lhs_t.condition() || !rhs_t.condition() {
            self.sink.push(
                DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                    op: op.text().to_string(),
                    requirement: "a condition-typed expression".to_string(),
                }),
                location,
            );
        }
        (self.builtin_type(Builtin::Bool, BasicKind::Bool), false)
    }

    fn value_member(
        &mut self,
        op: MemberOp,
        base: &mut Expr,
        field: &str,
        symbol: &mut Option<crate::symbol::SymbolId>,
        location: crate::lexer::Span,
    ) -> (Type, bool) {
        let (base_t, _) = self.value(base);
        let record_t = match op {
            MemberOp::Dot => base_t.clone(),
            MemberOp::Arrow => Type::derive_base(&base_t),
        };

        if base_t.is_invalid() || record_t.is_invalid() {
            return (Type::Invalid, true);
        }

        let wrong_shape = match op {
            MemberOp::Dot => !base_t.record(),
            MemberOp::Arrow => !base_t.pointer() || !record_t.record(),
        };
        if wrong_shape {
            self.sink.push(
                DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                    op: op.text().to_string(),
                    requirement: "a struct or union operand".to_string(),
                }),
                location,
            );
            return (Type::Invalid, true);
        }

        let record_symbol = match &record_t {
            Type::Basic { symbol, .. } => *symbol,
            _ => unreachable!("record() only admits Type::Basic"),
        };

        match self.table.resolve_in(record_symbol, field) {
            Some(member) => {
                *symbol = Some(member);
                let ty = self.table.get(member).data_type.clone().unwrap_or(Type::Invalid);
                (ty, true)
            }
            None => {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::MissingMember {
                        op: op.text().to_string(),
                        record: record_t.to_string(""),
                        field: field.to_string(),
                    }),
                    location,
                );
                (Type::Invalid, true)
            }
        }
    }

    fn value_unary(&mut self, op: UnaryOp, operand: &mut Expr, location: crate::lexer::Span) -> (Type, bool) {
        let (operand_t, lvalue) = self.value(operand);

        if op.requires_lvalue() && !lvalue {
            self.sink.push(
                DiagnosticKind::Analyze(AnalyzeErrorKind::NotAnLvalue { op: op.text().to_string() }),
                location.clone(),
            );
        }

        match op {
            UnaryOp::Deref => {
                if !operand_t.pointer() && !operand_t.is_invalid() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: op.text().to_string(),
                            requirement: "a pointer operand".to_string(),
                        }),
                        location,
                    );
                }
                (Type::derive_base(&operand_t), true)
            }
            UnaryOp::AddrOf => (Type::derive_pointer(&operand_t), false),
            _ => {
                if op.is_numeric() && !operand_t.numeric() {
                    self.sink.push(
                        DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                            op: op.text().to_string(),
                            requirement: "a numeric operand".to_string(),
                        }),
                        location,
                    );
                }
                (Type::derive_from(&operand_t), false)
            }
        }
    }

    fn value_call(
        &mut self,
        callee: &mut Expr,
        args: &mut [Expr],
        symbol: &mut Option<crate::symbol::SymbolId>,
        location: crate::lexer::Span,
    ) -> (Type, bool) {
        let (callee_t, _) = self.value(callee);

        let direct_fn = match callee {
            Expr::Literal { kind: LiteralKind::Ident(sym), .. }
                if self.table.get(*sym).kind == SymbolKind::Id =>
            {
                Some(*sym)
            }
            _ => None,
        };
        *symbol = direct_fn;

        let arg_types: Vec<Type> = args.iter_mut().map(|arg| self.value(arg).0).collect();

        if !callee_t.callable() {
            self.sink.push(
                DiagnosticKind::Analyze(AnalyzeErrorKind::OperatorRequires {
                    op: "()".to_string(),
                    requirement: "a callable operand".to_string(),
                }),
                location.clone(),
            );
            return (Type::Invalid, false);
        }

        if let Some(sym) = direct_fn {
            let params: Vec<crate::symbol::SymbolId> = self
                .table
                .get(sym)
                .children
                .iter()
                .copied()
                .filter(|&c| self.table.get(c).kind == SymbolKind::Param)
                .collect();
            if params.len() != arg_types.len() {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::DegreeMismatch {
                        expected: params.len(),
                        found: arg_types.len(),
                        callee: self.table.get(sym).identifier.clone(),
                    }),
                    location.clone(),
                );
            } else {
                for (index, (&param, arg_t)) in params.iter().zip(arg_types.iter()).enumerate() {
                    let param_t = self.table.get(param).data_type.clone().unwrap_or(Type::Invalid);
                    if !Type::compatible(&param_t, arg_t) {
                        self.sink.push(
                            DiagnosticKind::Analyze(AnalyzeErrorKind::ParamMismatch {
                                index,
                                expected: param_t.to_string(""),
                                found: arg_t.to_string(""),
                            }),
                            location.clone(),
                        );
                    }
                }
            }
        } else if let Type::Function(_, degree) = unwrap_pointer(&callee_t) {
            if *degree != arg_types.len() {
                self.sink.push(
                    DiagnosticKind::Analyze(AnalyzeErrorKind::DegreeMismatch {
                        expected: *degree,
                        found: arg_types.len(),
                        callee: "<expr>".to_string(),
                    }),
                    location.clone(),
                );
            }
        }

        (Type::derive_return(&callee_t), false)
    }

    fn builtin_type(&self, which: Builtin, kind: BasicKind) -> Type {
        Type::basic(self.table.builtin(which), kind)
    }
}

fn unwrap_pointer(t: &Type) -> &Type {
    match t {
        Type::Pointer(inner) => unwrap_pointer(inner),
        other => other,
    }
}

fn expr_dt_mut(expr: &mut Expr) -> Option<&mut Option<Type>> {
    match expr {
        Expr::Literal { dt, .. }
        | Expr::Binary { dt, .. }
        | Expr::Member { dt, .. }
        | Expr::Unary { dt, .. }
        | Expr::Postfix { dt, .. }
        | Expr::Ternary { dt, .. }
        | Expr::Index { dt, .. }
        | Expr::Call { dt, .. } => Some(dt),
        Expr::Invalid(_) | Expr::Empty(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::analyze;
    use crate::parser::parse;

    #[test]
    fn test_pointer_dereference_is_lvalue() {
        let (mut module, table, mut sink) = parse("int *p; int x; x = *p;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_increment_requires_lvalue() {
        let (mut module, table, mut sink) = parse("int x; x++; 1++;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_address_of_non_lvalue_is_rejected() {
        let (mut module, table, mut sink) = parse("int x = &1;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_logical_and_yields_bool_and_requires_condition_operands() {
        let (mut module, table, mut sink) = parse("int a = 1; int b = 0; int c = a && b;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_array_literal_requires_homogeneous_elements() {
        let (mut module, table, mut sink) = parse("struct S { int a; }; struct S s;");
        assert_eq!(sink.error_count(), 0);
        let (mut module2, table2, mut sink2) = parse("int xs[2] = {1, 2};");
        analyze(&mut module2, &table2, &mut sink2);
        assert_eq!(sink2.error_count(), 0);
        let _ = (module, table);
    }

    #[test]
    fn test_call_through_function_pointer_expression_checks_arity() {
        // This dialect's declarator grammar has no syntax for a named
        // pointer-to-function variable, but the value itself is still
        // reachable as an intermediate expression — `&f` taken on a
        // function name, then called directly.
        let (mut module, table, mut sink) =
            parse("int f(int a) { return a; } int y = (&f)(1, 2);");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }
}
