//! Regex-driven, single-pass lexer for HLB source files.
//!
//! Comments and newlines are kept as real tokens (not skipped) so the parser's
//! post-pass can assign doc-comments and the unparser can reproduce input
//! byte-for-byte.

mod cursor;
mod error;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use error::LexError;
pub use lexer::tokenize;
pub use token::{Keyword, Punct, Token, TokenKind};
