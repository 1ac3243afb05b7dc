//! Statement grammar (spec §4.1.4 "Statement").

use super::ast::Stmt;
use super::Parser;

impl Parser {
    /// The function-body block. Reuses the scope the parameter list
    /// already pushed, rather than pushing a further nested one — the
    /// parameter-list scope *becomes* the body scope (spec §4.1.4
    /// "ParameterList").
    pub(super) fn parse_function_body(&mut self) -> Stmt {
        self.parse_code_statements()
    }

    pub(super) fn parse_statement(&mut self) -> Stmt {
        if self.is("{") {
            self.table.push_scope();
            let code = self.parse_code_statements();
            self.table.pop_scope();
            return code;
        }
        if self.is("if") {
            return self.parse_branch();
        }
        if self.is("while") {
            return self.parse_while();
        }
        if self.is("do") {
            return self.parse_do_while();
        }
        if self.is("for") {
            return self.parse_for();
        }
        if self.is("return") {
            return self.parse_return();
        }
        if self.is("break") {
            return self.parse_break();
        }
        if self.is(";") {
            let location = self.advance().location;
            return Stmt::Empty(location);
        }
        if self.is_decl_start() {
            return Stmt::Decl(self.parse_local_decl());
        }
        let expr = self.parse_expression();
        self.match_text(";");
        Stmt::Expr(expr)
    }

    /// `{ stmt* }`, assuming the enclosing scope has already been pushed
    /// by the caller (spec §4.1.5 — `Code` pushes a scope on entry, except
    /// the function body which reuses its parameter scope).
    fn parse_code_statements(&mut self) -> Stmt {
        let start = self.match_text("{").location;
        let mut stmts = Vec::new();
        while !self.is("}") && !self.is_eof() {
            stmts.push(self.parse_statement());
        }
        let end = self.match_text("}").location;
        Stmt::Code(stmts, start.merge(&end))
    }

    fn parse_branch(&mut self) -> Stmt {
        let start = self.advance().location; // "if"
        self.match_text("(");
        let cond = self.parse_expression();
        self.match_text(")");
        let then_branch = Box::new(self.parse_statement());
        let else_branch = if self.try_match_text("else") {
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .map(|s| s.location().clone())
            .unwrap_or_else(|| then_branch.location().clone());
        Stmt::Branch {
            cond,
            then_branch,
            else_branch,
            location: start.merge(&end),
        }
    }

    fn parse_while(&mut self) -> Stmt {
        let start = self.advance().location; // "while"
        self.match_text("(");
        let cond = self.parse_expression();
        self.match_text(")");
        self.breakable_depth += 1;
        let body = Box::new(self.parse_statement());
        self.breakable_depth -= 1;
        let location = start.merge(body.location());
        Stmt::Loop {
            cond,
            body,
            is_do_while: false,
            location,
        }
    }

    fn parse_do_while(&mut self) -> Stmt {
        let start = self.advance().location; // "do"
        self.breakable_depth += 1;
        let body = Box::new(self.parse_statement());
        self.breakable_depth -= 1;
        self.match_text("while");
        self.match_text("(");
        let cond = self.parse_expression();
        self.match_text(")");
        let end = self.match_text(";").location;
        Stmt::Loop {
            cond,
            body,
            is_do_while: true,
            location: start.merge(&end),
        }
    }

    /// `for (init; cond; step) body`; any header slot may be empty (spec
    /// §4.1.4/§9 Open Question 4). The header opens its own scope so a
    /// declaration in `init` is visible to `cond`/`step`/`body` only.
    fn parse_for(&mut self) -> Stmt {
        let start = self.advance().location; // "for"
        self.table.push_scope();
        self.match_text("(");

        let init = if self.is(";") {
            self.advance();
            None
        } else if self.is_decl_start() {
            Some(Box::new(Stmt::Decl(self.parse_local_decl())))
        } else {
            let expr = self.parse_expression();
            self.match_text(";");
            Some(Box::new(Stmt::Expr(expr)))
        };

        let cond = if self.is(";") {
            None
        } else {
            Some(self.parse_expression())
        };
        self.match_text(";");

        let step = if self.is(")") {
            None
        } else {
            Some(self.parse_expression())
        };
        self.match_text(")");

        self.breakable_depth += 1;
        let body = Box::new(self.parse_statement());
        self.breakable_depth -= 1;

        let end = body.location().clone();
        self.table.pop_scope();
        Stmt::For {
            init,
            cond,
            step,
            body,
            location: start.merge(&end),
        }
    }

    fn parse_return(&mut self) -> Stmt {
        let start = self.advance().location; // "return"
        let value = if self.is(";") { None } else { Some(self.parse_expression()) };
        let end = self.match_text(";").location;
        Stmt::Return {
            value,
            location: start.merge(&end),
        }
    }

    /// `break` is diagnosed here, at parse time, if no enclosing loop is
    /// open (spec §4.1.6); the analyzer treats `Break` as a no-op (spec
    /// §4.3.3).
    fn parse_break(&mut self) -> Stmt {
        let start = self.advance().location; // "break"
        let end = self.match_text(";").location;
        let location = start.merge(&end);
        if self.breakable_depth == 0 {
            self.error_illegal_break(location.clone());
        }
        Stmt::Break { location }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    #[test]
    fn test_if_else_parses() {
        let (_, _, sink) = parse("int a = 1; int b; if (a) { b = 1; } else { b = 0; }");
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_while_allows_break() {
        let (_, _, sink) = parse("int a = 1; while (a) { break; }");
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_break_outside_loop_is_illegal() {
        let (_, _, sink) = parse("int a = 1; if (a) { break; }");
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_for_loop_scopes_init_declaration() {
        let (_, table, sink) = parse("int s = 0; for (int i = 0; i; i) { s = i; }");
        assert_eq!(sink.error_count(), 0);
        assert!(table.resolve("i").is_some());
    }

    #[test]
    fn test_do_while_parses() {
        let (_, _, sink) = parse("int a = 1; do { a = 0; } while (a);");
        assert_eq!(sink.error_count(), 0);
    }
}
