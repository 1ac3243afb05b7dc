//! The tree-walking analyzer.
//!
//! Spec §4.3.1: statement-level dispatch on AST variant, expression
//! evaluation through one function (`value`) that always records a node's
//! derived type and returns it. There is no `TypeCheckable`-style trait
//! here the way the teacher's generic `TypeInformation<T>` progression
//! needs one — this dialect's checking is single-pass (symbols already
//! carry their declared types from parsing), so a plain `&mut Analyzer`
//! walking `&mut Module` is the whole mechanism.

mod expressions;
mod statements;

use crate::diagnostics::ErrorSink;
use crate::parser::ast::{Decl, Module, TopLevel};
use crate::symbol::SymbolTable;
use crate::types::Type;

/// Analyzes `module` in place against `table`, appending diagnostics to
/// `sink`. Returns nothing: every expression node's `dt` and every
/// resolved `Call`/`Member` symbol are written directly onto the AST
/// (spec §6.3).
pub fn analyze(module: &mut Module, table: &SymbolTable, sink: &mut ErrorSink) {
    let mut analyzer = Analyzer {
        table,
        sink,
        return_type: None,
    };
    analyzer.analyze_module(module);
}

struct Analyzer<'a> {
    table: &'a SymbolTable,
    sink: &'a mut ErrorSink,
    /// Set for the duration of a `FnImpl`'s body walk (spec §4.3.3).
    return_type: Option<Type>,
}

impl<'a> Analyzer<'a> {
    fn analyze_module(&mut self, module: &mut Module) {
        for item in &mut module.items {
            match item {
                TopLevel::Decl(decl) => self.analyze_decl(decl),
                TopLevel::Stmt(stmt) => self.analyze_stmt(stmt),
                TopLevel::FnImpl(f) => {
                    let ret = self
                        .table
                        .get(f.symbol)
                        .data_type
                        .as_ref()
                        .map(Type::derive_return)
                        .unwrap_or(Type::Invalid);
                    self.return_type = Some(ret);
                    self.analyze_stmt(&mut f.body);
                    self.return_type = None;
                }
            }
        }
    }

    fn analyze_decl(&mut self, decl: &mut Decl) {
        if let Some(record) = &mut decl.inline_record {
            for member in &mut record.members {
                self.analyze_decl(member);
            }
        }
        for declarator in &mut decl.declarators {
            if let Some(init) = &mut declarator.init {
                self.value(init);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    use super::analyze;

    #[test]
    fn test_scenario_1_no_errors_and_bound_types() {
        let (mut module, table, mut sink) = parse("int x = 3; int y = x + 1;");
        assert_eq!(sink.error_count(), 0);
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_scenario_2_degree_mismatch() {
        let (mut module, table, mut sink) =
            parse("int f(int a, int b) { return a + b; } int z = f(1);");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_scenario_3_missing_member() {
        let (mut module, table, mut sink) =
            parse("struct S { int a; }; struct S s; int k = s.b;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_scenario_5_pointer_arithmetic_permitted() {
        let (mut module, table, mut sink) = parse("int *p; int x = p + 1;");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_scenario_6_return_type_mismatch() {
        let (mut module, table, mut sink) = parse("int g(); int h(void) { return g; }");
        analyze(&mut module, &table, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }
}
