use std::cell::Cell;

use hlb_span::Range;
use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::ids::ScopeId;
use crate::stmt::{Block, CommentNode, NewlineNode};
use crate::ty::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub variadic: bool,
    pub ty: Type,
    pub name: String,
    pub range: Range,
}

/// `doc? returnType name "(" params ")" body`. `scope` is filled in by the
/// checker's declaration pass (a back-reference to the child scope holding
/// this function's parameters, per the AST's documented lifecycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub doc: Option<String>,
    pub return_type: Type,
    pub name: String,
    pub name_range: Range,
    pub params: Vec<Param>,
    pub body: Block,
    pub range: Range,
    #[serde(skip)]
    pub scope: Cell<Option<ScopeId>>,
}

impl PartialEq for FuncDecl {
    fn eq(&self, other: &Self) -> bool {
        self.doc == other.doc
            && self.return_type == other.return_type
            && self.name == other.name
            && self.params == other.params
            && self.body == other.body
            && self.range == other.range
    }
}

impl FuncDecl {
    pub fn new(
        doc: Option<String>,
        return_type: Type,
        name: String,
        name_range: Range,
        params: Vec<Param>,
        body: Block,
        range: Range,
    ) -> Self {
        Self {
            doc,
            return_type,
            name,
            name_range,
            params,
            body,
            range,
            scope: Cell::new(None),
        }
    }

    pub fn last_variadic(&self) -> Option<&Param> {
        self.params.last().filter(|p| p.variadic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub name: String,
    pub name_range: Range,
    pub source: Expr,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub name: String,
    pub name_range: Range,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    Import(ImportDecl),
    Export(ExportDecl),
    Comment(CommentNode),
    Newline(NewlineNode),
}

impl Decl {
    pub fn range(&self) -> Range {
        match self {
            Decl::Func(d) => d.range.clone(),
            Decl::Import(d) => d.range.clone(),
            Decl::Export(d) => d.range.clone(),
            Decl::Comment(d) => d.range.clone(),
            Decl::Newline(d) => d.range.clone(),
        }
    }
}
