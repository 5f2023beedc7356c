//! A hand-rolled scope arena: `Vec<Scope>` indexed by `ScopeId`, with
//! explicit parent links instead of `Rc`/lifetime-parameterized references —
//! the same back-pointer-by-index shape `hlb-ast`'s `Cell<Option<ScopeId>>`
//! fields are built to plug into.

use hlb_ast::{CallId, FuncId, ScopeId};
use hlb_span::Range;
use indexmap::IndexMap;

use crate::builtins;
use hlb_ast::Type;

/// What a name in scope actually refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A top-level function declaration.
    Func(FuncId),
    /// A function parameter.
    Param,
    /// An `as [local] name` alias bound to a call's result.
    Alias(CallId),
}

#[derive(Debug, Clone)]
pub struct Object {
    pub kind: ObjectKind,
    pub ty: Type,
    pub range: Range,
}

/// One lexical scope: a root (per file), or a function body's scope holding
/// its parameters and aliases. Lookup walks `parent` links upward; each
/// scope's own table preserves insertion order, matching the "most recently
/// declared alias wins on shadowing, order otherwise doesn't matter for
/// lookup" rule.
#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    names: IndexMap<String, Object>,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            names: IndexMap::new(),
        }
    }
}

/// Owns every `Scope` created while checking one compile unit's worth of
/// modules. `ScopeId`s handed out by `push` remain valid for the arena's
/// whole lifetime — nothing is ever removed.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent));
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Declares `name` in `scope`, returning the previous `Object` at that
    /// name *within the same scope* (not an outer one) if it already existed
    /// — the caller turns that into a `DuplicateDecl`/`DuplicateField`.
    pub fn declare(&mut self, scope: ScopeId, name: String, object: Object) -> Option<Object> {
        self.scopes[scope.index()].names.insert(name, object)
    }

    /// Resolves `name` starting at `scope` and walking up through parents,
    /// returning the nearest (most local) binding.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<&Object> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let s = &self.scopes[id.index()];
            if let Some(obj) = s.names.get(name) {
                return Some(obj);
            }
            cur = s.parent;
        }
        None
    }

    /// Every name visible from `scope` (own scope first, then ancestors),
    /// used to build the `IdentNotDefined` suggestion candidate set.
    pub fn visible_names(&self, scope: ScopeId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let s = &self.scopes[id.index()];
            out.extend(s.names.keys().map(String::as_str));
            cur = s.parent;
        }
        out
    }
}

/// Whether `name` shadows a built-in call valid for `ty` — used by the
/// linter, not the checker itself (aliases are always allowed to shadow
/// built-ins; only the lint rule cares).
pub fn shadows_builtin(ty: Type, name: &str) -> bool {
    builtins::lookup(ty, name).is_some()
}
