use std::cell::Cell;

use hlb_span::Range;
use serde::{Deserialize, Serialize};

use crate::expr::{Expr, WithOpt};
use crate::ids::CallId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub text: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewlineNode {
    pub range: Range,
}

/// `as [local] name`, binding a call's result as a named symbol in scope.
/// `call_id` is filled in by the checker's declaration pass, letting a scope
/// `Object` point back at the statement that produced the binding without
/// re-walking the owning block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasDecl {
    pub name: String,
    pub local: bool,
    pub range: Range,
    #[serde(skip)]
    pub call_id: Cell<Option<CallId>>,
}

impl PartialEq for AliasDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.local == other.local && self.range == other.range
    }
}

impl AliasDecl {
    pub fn new(name: String, local: bool, range: Range) -> Self {
        Self {
            name,
            local,
            range,
            call_id: Cell::new(None),
        }
    }
}

/// `doc? func args[] withOpt? alias?`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStmt {
    pub doc: Option<String>,
    pub func: String,
    pub func_range: Range,
    pub args: Vec<Expr>,
    pub with_opt: Option<WithOpt>,
    pub alias: Option<AliasDecl>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Call(CallStmt),
    Comment(CommentNode),
    Newline(NewlineNode),
}

impl Stmt {
    pub fn range(&self) -> Range {
        match self {
            Stmt::Call(s) => s.range.clone(),
            Stmt::Comment(s) => s.range.clone(),
            Stmt::Newline(s) => s.range.clone(),
        }
    }
}

/// `"{" { Stmt } "}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub range: Range,
}

impl Block {
    /// Statements that actually count toward §4.6's "first/subsequent call"
    /// rules — comments and blank lines don't participate in source checking.
    pub fn calls(&self) -> impl Iterator<Item = &CallStmt> {
        self.stmts.iter().filter_map(|s| match s {
            Stmt::Call(c) => Some(c),
            _ => None,
        })
    }

    /// True when every statement begins on the same source line as the
    /// first one — the unparser's cue to inline the block.
    pub fn fits_one_line(&self) -> bool {
        match self.stmts.first() {
            Some(first) => {
                let line = first.range().start.line;
                self.stmts.iter().all(|s| s.range().start.line == line)
            }
            None => true,
        }
    }
}
