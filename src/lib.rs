//! Parser, symbol resolver, type algebra, and semantic analyzer for a
//! small statically-typed C-like language (spec §1 OVERVIEW).
//!
//! [`compile`] is the single convenience entry point most callers want:
//! parse, then analyze, handing back the fully annotated module alongside
//! its symbol table and the combined diagnostic sink.

pub mod analyzer;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod symbol;
pub mod types;

use diagnostics::ErrorSink;
use parser::ast::Module;
use symbol::SymbolTable;

/// Parses and analyzes `source` in one call. Diagnostics from both stages
/// land in the same sink, in the order they were raised (spec §6.4).
pub fn compile(source: &str) -> (Module, SymbolTable, ErrorSink) {
    let (mut module, table, mut sink) = parser::parse(source);
    analyzer::analyze(&mut module, &table, &mut sink);
    (module, table, sink)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::compile;

    #[test]
    fn test_compile_runs_both_stages() {
        let (_, _, sink) = compile("int x = 3; int y = x + 1;");
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_compile_surfaces_parse_errors_without_analyzing_garbage() {
        let (_, _, sink) = compile("int x = ;");
        assert!(sink.error_count() >= 1);
    }

    #[test]
    fn test_compiled_function_symbol_is_well_formed() -> Result<()> {
        let (_, table, sink) = compile("int add(int a, int b) { return a + b; }");
        assert_eq!(sink.error_count(), 0);

        let add = table
            .resolve("add")
            .ok_or_else(|| anyhow::anyhow!("'add' should have been bound at the root scope"))?;
        let dt = table
            .get(add)
            .data_type
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("'add' should carry a derived type"))?;
        assert!(dt.callable());
        Ok(())
    }
}
