//! Typed AST, walker, and round-trip unparser for HLB source files.
//!
//! Node kinds are a closed set of tagged enums dispatched with `match`
//! (see DESIGN.md) rather than a trait-object visitor hierarchy — the
//! grammar is fixed and known at compile time, so there's nothing a
//! dynamic dispatch layer would buy.

mod decl;
mod expr;
mod ids;
mod literal;
mod module;
mod stmt;
mod ty;
mod unparse;
mod walker;

pub use decl::{Decl, ExportDecl, FuncDecl, ImportDecl, Param};
pub use expr::{BasicLit, BlockLit, Expr, IdentExpr, WithOpt};
pub use ids::{CallId, FuncId, ModuleId, ScopeId};
pub use literal::LiteralValue;
pub use module::Module;
pub use stmt::{AliasDecl, Block, CallStmt, CommentNode, NewlineNode, Stmt};
pub use ty::{OptionSubtype, Type};
pub use unparse::format_module;
pub use walker::{inspect, walk, Node};
