//! Black-box end-to-end scenarios against the crate's public API,
//! exercising the full parse-then-analyze pipeline the way a driver would.
//! Mirrors the scenario table the semantic core's own documentation
//! enumerates: each case below corresponds to one row of that table.

use cminor_core::compile;
use cminor_core::diagnostics::{AnalyzeErrorKind, DiagnosticKind, ParseErrorKind};
use cminor_core::parser::ast::{Expr, Stmt, TopLevel};
use cminor_core::types::Type;

#[test]
fn scenario_1_simple_arithmetic_binds_and_types_cleanly() {
    let (module, table, sink) = compile("int x = 3; int y = x + 1;");
    assert_eq!(sink.error_count(), 0);

    let y_id = table.resolve("y").expect("y should be bound");
    assert!(table.get(y_id).data_type.as_ref().unwrap().numeric());

    let TopLevel::Decl(decl) = &module.items[1] else {
        panic!("expected a declaration");
    };
    let init = decl.declarators[0].init.as_ref().expect("y has an initializer");
    assert!(matches!(init.dt(), Some(t) if t.numeric()));
}

#[test]
fn scenario_2_call_arity_mismatch_reports_degree_mismatch() {
    let (_, _, sink) = compile("int f(int a, int b) { return a + b; } int z = f(1);");
    assert_eq!(sink.error_count(), 1);
    let diag = &sink.diagnostics()[0];
    assert!(matches!(
        diag.kind,
        DiagnosticKind::Analyze(AnalyzeErrorKind::DegreeMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn scenario_3_missing_struct_member_yields_invalid_type() {
    let (module, _, sink) = compile("struct S { int a; }; struct S s; int k = s.b;");
    assert_eq!(sink.error_count(), 1);
    assert!(matches!(
        sink.diagnostics()[0].kind,
        DiagnosticKind::Analyze(AnalyzeErrorKind::MissingMember { .. })
    ));

    let TopLevel::Decl(decl) = &module.items[2] else {
        panic!("expected k's declaration");
    };
    let init = decl.declarators[0].init.as_ref().unwrap();
    assert_eq!(init.dt(), Some(&Type::Invalid));
}

#[test]
fn scenario_4_break_outside_loop_is_illegal() {
    let (_, _, sink) = compile("int a = 1; if (a) { break; }");
    assert_eq!(sink.error_count(), 1);
    assert!(matches!(
        sink.diagnostics()[0].kind,
        DiagnosticKind::Parse(ParseErrorKind::IllegalBreak)
    ));
}

#[test]
fn scenario_5_pointer_arithmetic_is_permitted() {
    let (module, table, sink) = compile("int *p; int x = p + 1;");
    assert_eq!(sink.error_count(), 0);

    let x_id = table.resolve("x").unwrap();
    assert!(table.get(x_id).data_type.as_ref().unwrap().pointer());

    let TopLevel::Decl(decl) = &module.items[1] else {
        panic!("expected x's declaration");
    };
    let init = decl.declarators[0].init.as_ref().unwrap();
    assert!(matches!(init.dt(), Some(t) if t.pointer()));
}

#[test]
fn scenario_6_return_type_mismatch_on_bare_function_reference() {
    let (_, _, sink) = compile("int g(); int h(void) { return g; }");
    assert_eq!(sink.error_count(), 1);
    assert!(matches!(
        sink.diagnostics()[0].kind,
        DiagnosticKind::Analyze(AnalyzeErrorKind::ExpectedType { .. })
    ));
}

#[test]
fn void_parameter_list_means_zero_arguments() {
    let (_, table, sink) = compile("int h(void) { return 0; } int z = h();");
    assert_eq!(sink.error_count(), 0);
    let h = table.resolve("h").unwrap();
    let param_count = table
        .get(h)
        .children
        .iter()
        .filter(|&&c| table.get(c).kind == cminor_core::symbol::SymbolKind::Param)
        .count();
    assert_eq!(param_count, 0);
}

#[test]
fn diagnostic_lines_match_the_canonical_format() {
    let (_, _, sink) = compile("int x = y;");
    assert_eq!(sink.diagnostics().len(), 1);
    let line = sink.diagnostics()[0].render();
    assert!(line.starts_with("error("));
    assert!(line.ends_with('.'));
}

#[test]
fn nested_scopes_shadow_without_diagnostics() {
    let (_, _, sink) = compile(
        "int x = 1; int f() { int x = 2; return x; } ",
    );
    assert_eq!(sink.error_count(), 0);
}

#[test]
fn every_expression_node_gets_a_derived_type_after_analysis() {
    let (module, _, sink) = compile("int a = 1; int b = 2; int c = a + b * (a - b);");
    assert_eq!(sink.error_count(), 0);

    let TopLevel::Decl(decl) = &module.items[2] else {
        panic!("expected c's declaration");
    };
    let init = decl.declarators[0].init.as_ref().unwrap();
    assert!(init.dt().is_some());
    let Expr::Binary { lhs, rhs, .. } = init else {
        panic!("expected a binary expression");
    };
    assert!(lhs.dt().is_some());
    assert!(rhs.dt().is_some());
}

#[test]
fn undefined_identifier_leaves_invalid_node_instead_of_panicking() {
    let (module, _, sink) = compile("int x = y + 1;");
    assert_eq!(sink.error_count(), 1);
    let TopLevel::Decl(decl) = &module.items[0] else {
        panic!("expected x's declaration");
    };
    let init = decl.declarators[0].init.as_ref().unwrap();
    let Expr::Binary { lhs, .. } = init else {
        panic!("expected a binary expression");
    };
    assert!(matches!(**lhs, Expr::Invalid(_)));
}

#[test]
fn for_loop_preserves_init_cond_step_order() {
    let (module, _, sink) = compile(
        "int f() { int s = 0; for (int i = 0; i < 10; i = i + 1) { s = s + i; } return s; }",
    );
    assert_eq!(sink.error_count(), 0);
    let TopLevel::FnImpl(f) = &module.items[0] else {
        panic!("expected a function implementation");
    };
    let Stmt::Code(stmts, _) = &f.body else {
        panic!("expected a compound statement body");
    };
    let Stmt::For { init, cond, step, .. } = &stmts[1] else {
        panic!("expected the for statement");
    };
    assert!(init.is_some());
    assert!(cond.is_some());
    assert!(step.is_some());
}

#[test]
fn running_the_analyzer_twice_doubles_the_error_count_deterministically() {
    let (mut module, table, mut sink) = cminor_core::parser::parse("struct S { int a; }; struct S s; int k = s.b;");
    cminor_core::analyzer::analyze(&mut module, &table, &mut sink);
    assert_eq!(sink.error_count(), 1);
    cminor_core::analyzer::analyze(&mut module, &table, &mut sink);
    assert_eq!(sink.error_count(), 2);
}
