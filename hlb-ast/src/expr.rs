use hlb_span::Range;
use serde::{Deserialize, Serialize};

use crate::literal::LiteralValue;
use crate::stmt::Block;
use crate::ty::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentExpr {
    pub name: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicLit {
    pub value: LiteralValue,
    /// Exact source text, including quotes for strings and the original
    /// numeric base for ints (`0x1f` stays `0x1f`, not `31`).
    pub raw: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLit {
    pub ty: Type,
    pub block: Block,
    pub range: Range,
}

/// `Ident(name) | BasicLit(string|int|bool) | BlockLit(type, block)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(IdentExpr),
    BasicLit(BasicLit),
    BlockLit(BlockLit),
}

impl Expr {
    pub fn range(&self) -> Range {
        match self {
            Expr::Ident(e) => e.range.clone(),
            Expr::BasicLit(e) => e.range.clone(),
            Expr::BlockLit(e) => e.range.clone(),
        }
    }
}

/// `WithOpt` is either a named reference to an alias/function or an inline
/// option block — never a bare string or call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WithOpt {
    Ident(IdentExpr),
    Inline(BlockLit),
}

impl WithOpt {
    pub fn range(&self) -> Range {
        match self {
            WithOpt::Ident(e) => e.range.clone(),
            WithOpt::Inline(e) => e.range.clone(),
        }
    }
}
