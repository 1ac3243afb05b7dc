//! `BasicType`, `Declarator`, `Decl`, and `FnImpl` (spec §4.1.4).

use crate::lexer::Span;
use crate::symbol::{Builtin, SymbolId, SymbolKind};
use crate::types::{BasicKind, Type};

use super::ast::{Decl, Declarator, FnImpl, Param, RecordDecl, TopLevel};
use super::Parser;

impl Parser {
    /// `Decl` which may collapse into `FnImpl` if the first declarator is
    /// immediately followed by `{` (spec §4.1.4 "TopLevel").
    pub(super) fn parse_top_level(&mut self) -> TopLevel {
        if !self.is_decl_start() {
            // Not a declaration: fall back to the statement grammar so
            // constructs like `if (a) { break; }` at module scope parse
            // (and bind/diagnose) the same way they would inside a function
            // body (spec §8.3 scenario 4).
            return TopLevel::Stmt(self.parse_statement());
        }

        let start = self.current().location.clone();
        let (base, inline_record) = self.parse_basic_type();

        if self.is(";") {
            // A tag-only declaration (`struct S { ... };`) introduces no
            // variable; there is no declarator to parse at all, matching
            // the same guard `parse_local_decl` already applies.
            let end = self.advance().location;
            return TopLevel::Decl(Decl {
                inline_record,
                declarators: Vec::new(),
                location: start.merge(&end),
            });
        }

        let (first, param_scope, params) = self.parse_declarator(&base, SymbolKind::Id);

        if self.is("{") {
            let body = self.parse_function_body();
            if param_scope.is_some() {
                self.table.pop_scope();
            }
            let end = body.location().clone();
            return TopLevel::FnImpl(FnImpl {
                symbol: first.symbol,
                params,
                body,
                location: start.merge(&end),
            });
        }
        if param_scope.is_some() {
            self.table.pop_scope();
        }

        let mut declarators = vec![first];
        while self.try_match_text(",") {
            let (next, scope, _) = self.parse_declarator(&base, SymbolKind::Id);
            if scope.is_some() {
                self.table.pop_scope();
            }
            declarators.push(next);
        }
        let end = self.match_text(";").location;
        TopLevel::Decl(Decl {
            inline_record,
            declarators,
            location: start.merge(&end),
        })
    }

    /// A declaration appearing inside a block or a struct/union body. Same
    /// shape as a top-level `Decl`, minus the `FnImpl` collapse (a nested
    /// function implementation is not part of this dialect's grammar).
    pub(super) fn parse_local_decl(&mut self) -> Decl {
        let start = self.current().location.clone();
        let (base, inline_record) = self.parse_basic_type();

        let mut declarators = Vec::new();
        if !self.is(";") {
            loop {
                let (decl, scope, _) = self.parse_declarator(&base, SymbolKind::Id);
                if scope.is_some() {
                    self.table.pop_scope();
                }
                declarators.push(decl);
                if !self.try_match_text(",") {
                    break;
                }
            }
        }
        let end = self.match_text(";").location;
        Decl {
            inline_record,
            declarators,
            location: start.merge(&end),
        }
    }

    /// `"const"? (StructSpecifier | UnionSpecifier | EnumSpecifier | TypeName)`
    /// (spec §4.1.4 "BasicType").
    fn parse_basic_type(&mut self) -> (Type, Option<RecordDecl>) {
        self.try_match_text("const");

        if self.is("struct") {
            return self.parse_record_specifier(SymbolKind::Struct);
        }
        if self.is("union") {
            return self.parse_record_specifier(SymbolKind::Union);
        }
        if self.is("enum") {
            return self.parse_enum_specifier();
        }

        let location = self.current().location.clone();
        let name = self.match_ident();
        match self.table.resolve(&name) {
            Some(id) => (Type::basic(id, self.basic_kind_of(id)), None),
            None => {
                self.error_undefined_symbol(&name, location);
                (Type::Invalid, None)
            }
        }
    }

    fn parse_record_specifier(&mut self, kind: SymbolKind) -> (Type, Option<RecordDecl>) {
        let start = self.current().location.clone();
        self.advance(); // "struct" | "union"

        let tag = if self.is_ident() {
            Some(self.match_ident())
        } else {
            None
        };

        if !self.is("{") {
            // Tag-only reference to a previously introduced record.
            let name = tag.unwrap_or_default();
            return match self.table.resolve(&name) {
                Some(id) => (Type::basic(id, self.basic_kind_of(id)), None),
                None => {
                    self.error_undefined_symbol(&name, start);
                    (Type::Invalid, None)
                }
            };
        }

        let symbol = self.declare_tag(tag, kind, start.clone());
        self.advance(); // "{"
        self.table.push_scope();
        let mut members = Vec::new();
        while !self.is("}") && !self.is_eof() {
            members.push(self.parse_local_decl());
        }
        let end = self.match_text("}").location;
        self.table.pop_scope();

        let basic_kind = if kind == SymbolKind::Union {
            BasicKind::Union
        } else {
            BasicKind::Struct
        };
        (
            Type::basic(symbol, basic_kind),
            Some(RecordDecl {
                symbol,
                members,
                location: start.merge(&end),
            }),
        )
    }

    /// `enum Tag { A, B, C }` introduces `A`, `B`, `C` as `Basic(int)`
    /// constants in the *enclosing* scope, not nested under the tag
    /// (`SPEC_FULL.md` §4 "enum constants").
    fn parse_enum_specifier(&mut self) -> (Type, Option<RecordDecl>) {
        let start = self.current().location.clone();
        self.advance(); // "enum"

        let tag = if self.is_ident() {
            Some(self.match_ident())
        } else {
            None
        };

        if !self.is("{") {
            let name = tag.unwrap_or_default();
            return match self.table.resolve(&name) {
                Some(id) => (Type::basic(id, BasicKind::Enum), None),
                None => {
                    self.error_undefined_symbol(&name, start);
                    (Type::Invalid, None)
                }
            };
        }

        let symbol = self.declare_tag(tag, SymbolKind::Enum, start.clone());
        self.advance(); // "{"
        loop {
            if self.is("}") || self.is_eof() {
                break;
            }
            let location = self.current().location.clone();
            let name = self.match_ident();
            if let Some(member) = self.table.insert(&name, SymbolKind::Id) {
                let int_sym = self.table.builtin(Builtin::Int);
                self.table.get_mut(member).data_type = Some(Type::basic(int_sym, BasicKind::Int));
            } else {
                self.error_duplicate_symbol(&name, location);
            }
            if !self.try_match_text(",") {
                break;
            }
        }
        let end = self.match_text("}").location;
        (
            Type::basic(symbol, BasicKind::Enum),
            Some(RecordDecl {
                symbol,
                members: Vec::new(),
                location: start.merge(&end),
            }),
        )
    }

    fn declare_tag(&mut self, tag: Option<String>, kind: SymbolKind, location: Span) -> SymbolId {
        let name = tag.unwrap_or_else(|| "<anonymous>".to_string());
        match self.table.insert(&name, kind) {
            Some(id) => id,
            None => {
                self.error_duplicate_symbol(&name, location);
                self.table.resolve_local(&name).expect("just failed to insert because present")
            }
        }
    }

    pub(super) fn basic_kind_of(&self, id: SymbolId) -> BasicKind {
        match self.table.get(id).kind {
            SymbolKind::Struct => BasicKind::Struct,
            SymbolKind::Union => BasicKind::Union,
            SymbolKind::Enum => BasicKind::Enum,
            _ => match self.table.get(id).identifier.as_str() {
                "void" => BasicKind::Void,
                "bool" => BasicKind::Bool,
                "char" => BasicKind::Char,
                _ => BasicKind::Int,
            },
        }
    }

    /// Pointer stars, then a primary identifier, then at most one postfix
    /// (array dimensions or a parameter list). Returns the declarator, the
    /// pushed parameter-list scope if this declarator turned out to be a
    /// function (left current so a following `{` can reuse it as the body
    /// scope), and that function's `Param` list.
    fn parse_declarator(
        &mut self,
        base: &Type,
        insert_kind: SymbolKind,
    ) -> (Declarator, Option<SymbolId>, Vec<Param>) {
        let start = self.current().location.clone();
        let mut depth = 0usize;
        while self.try_match_text("*") {
            depth += 1;
        }

        let name_location = self.current().location.clone();
        let name = self.match_ident();

        let pointed = (0..depth).fold(base.clone(), |t, _| Type::derive_pointer(&t));

        if self.is("(") {
            self.advance();
            // Insert the function symbol first, with a placeholder type,
            // then make it the current scope so its `Param` children end
            // up as its own children rather than an anonymous sibling
            // scope's — that's what lets the analyzer later find a
            // callee's parameter list by walking the callee symbol's
            // children (spec §3.4).
            let symbol = self.insert_declarator_symbol(&name, name_location, insert_kind, Type::Invalid);
            self.table.enter(symbol);
            let mut params = Vec::new();
            if self.is("void") && self.next_is(")") {
                // `(void)` is C's sugar for "no parameters", not a single
                // unnamed `void`-typed parameter (`SPEC_FULL.md` §4).
                self.advance();
            } else if !self.is(")") {
                loop {
                    params.push(self.parse_param());
                    if !self.try_match_text(",") {
                        break;
                    }
                }
            }
            let end = self.match_text(")").location;
            let fn_type = Type::Function(Box::new(pointed), params.len());
            self.table.get_mut(symbol).data_type = Some(fn_type);
            return (
                Declarator {
                    symbol,
                    init: None,
                    location: start.merge(&end),
                },
                Some(symbol),
                params,
            );
        }

        let mut dims = Vec::new();
        while self.try_match_text("[") {
            let len_location = self.current().location.clone();
            let len = if self.is(")") || self.is("]") {
                0
            } else {
                self.match_int().max(0) as usize
            };
            let _ = len_location;
            self.match_text("]");
            dims.push(len);
        }
        let array_type = dims
            .into_iter()
            .rev()
            .fold(pointed, |t, len| Type::derive_array(&t, len));

        let symbol = self.insert_declarator_symbol(&name, name_location, insert_kind, array_type.clone());

        let init = if self.try_match_text("=") {
            Some(self.parse_initializer(&array_type))
        } else {
            None
        };
        let end = init
            .as_ref()
            .map(|e| e.location().clone())
            .unwrap_or_else(|| self.current().location.clone());
        (
            Declarator {
                symbol,
                init,
                location: start.merge(&end),
            },
            None,
            Vec::new(),
        )
    }

    fn parse_param(&mut self) -> Param {
        let start = self.current().location.clone();
        self.try_match_text("const");
        let (base, _) = self.parse_basic_type_name_only();
        let mut depth = 0usize;
        while self.try_match_text("*") {
            depth += 1;
        }
        let location = self.current().location.clone();
        let name = if self.is_ident() {
            self.match_ident()
        } else {
            String::new()
        };
        let ty = (0..depth).fold(base, |t, _| Type::derive_pointer(&t));
        let symbol = self
            .table
            .insert(&name, SymbolKind::Param)
            .unwrap_or_else(|| {
                self.error_duplicate_symbol(&name, location.clone());
                self.table.resolve_local(&name).expect("param name just failed to insert")
            });
        self.table.get_mut(symbol).data_type = Some(ty);
        let end = self.current().location.clone();
        Param {
            symbol,
            location: start.merge(&end),
        }
    }

    /// A restricted `BasicType` used for parameter types: tag specifiers
    /// without a body only (a parameter cannot introduce a new struct).
    /// Unlike `parse_basic_type`, a `struct`/`union`/`enum` keyword here is
    /// never followed by `{` — only a tag naming an already-declared record.
    fn parse_basic_type_name_only(&mut self) -> (Type, Span) {
        let location = self.current().location.clone();
        if matches!(self.current().text.as_str(), "struct" | "union" | "enum") {
            self.advance();
        }
        let name = self.match_ident();
        let ty = match self.table.resolve(&name) {
            Some(id) => Type::basic(id, self.basic_kind_of(id)),
            None => {
                self.error_undefined_symbol(&name, location.clone());
                Type::Invalid
            }
        };
        (ty, location)
    }

    fn insert_declarator_symbol(
        &mut self,
        name: &str,
        location: Span,
        kind: SymbolKind,
        ty: Type,
    ) -> SymbolId {
        match self.table.insert(name, kind) {
            Some(id) => {
                self.table.get_mut(id).data_type = Some(ty);
                id
            }
            None => {
                self.error_duplicate_symbol(name, location);
                self.table.resolve_local(name).expect("just failed to insert because present")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::symbol::SymbolKind;
    use crate::types::{BasicKind, Type};

    #[test]
    fn test_simple_int_decl() {
        let (module, table, sink) = parse("int x = 3;");
        assert_eq!(sink.error_count(), 0);
        assert_eq!(module.items.len(), 1);
        let id = table.resolve("x").expect("x should be bound");
        assert_eq!(table.get(id).kind, SymbolKind::Id);
        assert_eq!(table.get(id).data_type, Some(Type::basic(table.builtin(crate::symbol::Builtin::Int), BasicKind::Int)));
    }

    #[test]
    fn test_pointer_declarator() {
        let (_, table, sink) = parse("int *p;");
        assert_eq!(sink.error_count(), 0);
        let id = table.resolve("p").unwrap();
        assert!(table.get(id).data_type.as_ref().unwrap().pointer());
    }

    #[test]
    fn test_array_declarator() {
        let (_, table, sink) = parse("int a[10];");
        assert_eq!(sink.error_count(), 0);
        let id = table.resolve("a").unwrap();
        assert!(table.get(id).data_type.as_ref().unwrap().array());
    }

    #[test]
    fn test_function_prototype_then_impl_collapses() {
        let (module, table, sink) = parse("int f(int a, int b) { return a + b; }");
        assert_eq!(sink.error_count(), 0);
        assert_eq!(module.items.len(), 1);
        let id = table.resolve("f").unwrap();
        assert!(table.get(id).data_type.as_ref().unwrap().callable());
    }

    #[test]
    fn test_struct_declaration_introduces_tag_and_members() {
        let (_, table, sink) = parse("struct S { int a; }; struct S s;");
        assert_eq!(sink.error_count(), 0);
        let tag = table.resolve("S").unwrap();
        assert_eq!(table.get(tag).kind, SymbolKind::Struct);
        let s = table.resolve("s").unwrap();
        assert!(table.get(s).data_type.as_ref().unwrap().record());
    }

    /// A struct/union/enum body introduced at top level with no declared
    /// variable (`struct S { ... };` alone) must not force-parse a
    /// declarator that isn't there — it has no name to consume, only the
    /// closing `;`.
    #[test]
    fn test_tag_only_struct_declaration_consumes_no_declarator() {
        let (module, table, sink) = parse("struct S { int a; };");
        assert_eq!(sink.error_count(), 0);
        assert_eq!(module.items.len(), 1);
        assert_eq!(table.get(table.resolve("S").unwrap()).kind, SymbolKind::Struct);
    }

    #[test]
    fn test_tag_only_enum_declaration_still_allows_following_decls() {
        let (module, table, sink) = parse("enum Color { Red, Green }; int c = Red;");
        assert_eq!(sink.error_count(), 0);
        assert_eq!(module.items.len(), 2);
        let c = table.resolve("c").unwrap();
        assert!(table.get(c).data_type.as_ref().unwrap().numeric());
    }

    #[test]
    fn test_duplicate_symbol_diagnosed() {
        let (_, _, sink) = parse("int x; int x;");
        assert_eq!(sink.error_count(), 1);
    }
}
