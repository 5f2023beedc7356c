use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

// Opaque indices into arenas owned by `hlb-checker`. Defined here (rather than
// in the checker crate) so AST nodes can hold back-references to scopes and
// calls without `hlb-ast` depending on `hlb-checker` — see DESIGN.md's note on
// arena-indexed back-pointers instead of `Rc`/owning references.
arena_id!(ScopeId);
arena_id!(FuncId);
arena_id!(CallId);
arena_id!(ModuleId);
