mod builtins;
mod checker;
mod error;
mod scope;

pub use builtins::{is_source, lookup as lookup_builtin, names_for as builtin_names_for, Signature};
pub use checker::{check_module, CheckedModule};
pub use error::CheckError;
pub use scope::{shadows_builtin, Object, ObjectKind, Scope, ScopeArena};
