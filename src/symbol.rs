//! Symbols and the scope tree they live in.
//!
//! Spec §9 flags the obvious hazard here: symbols reference their parent
//! scope while scopes own their children, which is a reference cycle if
//! modeled with `Rc`/`Weak` naively. This module sidesteps it the way the
//! spec's own design note recommends — an arena (`SymbolTable` owning a
//! flat `Vec<Symbol>`) addressed by `SymbolId`, with parent links and child
//! lists stored as plain indices into that same arena. An index is not an
//! ownership edge, so there is no cycle to worry about.

use std::cell::Cell;
use std::fmt;

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SymbolId(pub usize);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four builtin `Type`-kind symbols a root scope is required to carry
/// (spec §6.2), indexed so literal rules can reach them without a name
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Builtin {
    Void,
    Bool,
    Char,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SymbolKind {
    Scope,
    Type,
    Struct,
    /// Not named in spec §3.3's `kind` list, which only enumerates `Struct`
    /// among the record kinds, but §4.2.2 defines `record` over "Basic
    /// where the symbol kind is `Struct` or `Union`" and §4.1.4's grammar
    /// has a `UnionSpecifier`. Added as a sibling of `Struct` to make that
    /// predicate expressible; see DESIGN.md.
    Union,
    Enum,
    Id,
    Param,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StorageClass {
    Auto,
    Static,
    Extern,
}

/// A named entity in some scope, or an anonymous scope container itself
/// (`kind == Scope`). Offset/size/label are left for a backend to fill in
/// during layout; this crate never reads them, only reserves the slots
/// (spec §3.3).
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub identifier: String,
    pub kind: SymbolKind,
    pub data_type: Option<Type>,
    pub storage_class: StorageClass,
    pub parent: Option<SymbolId>,
    pub children: Vec<SymbolId>,
    pub offset: Cell<i64>,
    pub size: Cell<i64>,
    #[serde(skip)]
    pub label: Cell<Option<&'static str>>,
}

impl Symbol {
    fn new(identifier: impl Into<String>, kind: SymbolKind, parent: Option<SymbolId>) -> Symbol {
        Symbol {
            identifier: identifier.into(),
            kind,
            data_type: None,
            storage_class: StorageClass::Auto,
            parent,
            children: Vec::new(),
            offset: Cell::new(0),
            size: Cell::new(0),
            label: Cell::new(None),
        }
    }
}

/// The symbol arena plus a cursor (`current`) naming the scope new symbols
/// are inserted into. Parsing pushes/pops the cursor as the grammar enters
/// and leaves scope-introducing constructs (spec §4.1.5); nothing about
/// the arena itself is parser-specific.
pub struct SymbolTable {
    arena: Vec<Symbol>,
    root: SymbolId,
    current: SymbolId,
    builtins: [SymbolId; 4],
}

impl SymbolTable {
    /// A freshly constructed table already has the builtin root scope
    /// populated (spec §6.2) — there is no separate bootstrap step a
    /// caller must remember to invoke.
    pub fn new() -> SymbolTable {
        let mut arena = vec![Symbol::new("<root>", SymbolKind::Scope, None)];
        let root = SymbolId(0);

        let mut push_builtin = |arena: &mut Vec<Symbol>, name: &str| -> SymbolId {
            let id = SymbolId(arena.len());
            let mut sym = Symbol::new(name, SymbolKind::Type, Some(root));
            sym.data_type = None;
            arena.push(sym);
            arena[root.0].children.push(id);
            id
        };

        let void = push_builtin(&mut arena, "void");
        let bool_ = push_builtin(&mut arena, "bool");
        let char_ = push_builtin(&mut arena, "char");
        let int = push_builtin(&mut arena, "int");

        SymbolTable {
            arena,
            root,
            current: root,
            builtins: [void, bool_, char_, int],
        }
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    pub fn current(&self) -> SymbolId {
        self.current
    }

    pub fn builtin(&self, which: Builtin) -> SymbolId {
        self.builtins[which as usize]
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.0]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.0]
    }

    /// Push a new anonymous scope as a child of the current one and make
    /// it current. Used on entry to a compound statement, function
    /// prototype, struct/union body, or `for`-header (spec §4.1.5).
    pub fn push_scope(&mut self) -> SymbolId {
        let id = self.new_child(self.current, "<scope>", SymbolKind::Scope);
        self.current = id;
        id
    }

    /// Restore the cursor to a scope's parent. Panics if called on the
    /// root, which would be a parser bug (unbalanced push/pop).
    pub fn pop_scope(&mut self) {
        self.current = self.get(self.current).parent.expect("popped root scope");
    }

    /// Makes an existing symbol double as the current scope, without
    /// creating a new node. Used when a function's `Param` children must
    /// live directly under the function's own `Id` symbol rather than
    /// under an anonymous `Scope` sibling (spec §3.4: "parameter types
    /// live on the corresponding `Param` symbols of the function
    /// symbol"). `pop_scope` still works afterward, since `id`'s `parent`
    /// was already fixed when it was inserted.
    pub fn enter(&mut self, id: SymbolId) {
        self.current = id;
    }

    /// Insert a symbol into the current scope. spec §3.3: sibling
    /// identifiers within one scope are unique **per kind family** — types,
    /// tags, and ordinary identifiers share one namespace in this dialect,
    /// so the check here does not discriminate by `kind`. Returns the new
    /// symbol id, or `None` on a name collision (caller emits
    /// `duplicateSymbol` and keeps the pre-existing binding, per spec
    /// §4.1.5).
    pub fn insert(&mut self, name: &str, kind: SymbolKind) -> Option<SymbolId> {
        if self.resolve_local(name).is_some() {
            return None;
        }
        Some(self.new_child(self.current, name, kind))
    }

    fn new_child(&mut self, parent: SymbolId, name: &str, kind: SymbolKind) -> SymbolId {
        let id = SymbolId(self.arena.len());
        self.arena.push(Symbol::new(name, kind, Some(parent)));
        self.arena[parent.0].children.push(id);
        id
    }

    /// Look up `name` only among the current scope's direct children — no
    /// ascent. Used for the duplicate check on insertion.
    pub fn resolve_local(&self, name: &str) -> Option<SymbolId> {
        self.resolve_in(self.current, name)
    }

    pub fn resolve_in(&self, scope: SymbolId, name: &str) -> Option<SymbolId> {
        self.get(scope)
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).identifier == name)
    }

    /// Walk from the current scope outward to the root, returning the
    /// first match (spec §8.1.5: "finds children before ascending;
    /// identical names in nested scopes shadow without diagnostic").
    pub fn resolve(&self, name: &str) -> Option<SymbolId> {
        let mut scope = Some(self.current);
        while let Some(s) = scope {
            if let Some(found) = self.resolve_in(s, name) {
                return Some(found);
            }
            scope = self.get(s).parent;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}
