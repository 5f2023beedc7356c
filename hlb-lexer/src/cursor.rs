use crate::token::Token;

/// A peekable, two-token-lookahead view over a pre-lexed token stream.
///
/// The parser never mutates tokens, only advances through them, so eagerly
/// lexing the whole file up front (rather than lexing lazily token-by-token)
/// keeps this type a plain index into a `Vec` with no borrow-checker friction.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn peek2(&self) -> &Token {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Consume and return the current token, advancing the cursor.
    pub fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub fn at_eof(&self) -> bool {
        matches!(self.peek().kind, crate::token::TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use hlb_span::SourceFile;

    #[test]
    fn peek_does_not_advance() {
        let mut f = SourceFile::new("t.hlb", "fs a()");
        let toks = tokenize(&mut f).unwrap();
        let mut c = Cursor::new(toks);
        let first = c.peek().lexeme.clone();
        assert_eq!(c.peek().lexeme, first);
        let bumped = c.bump();
        assert_eq!(bumped.lexeme, first);
    }

    #[test]
    fn peek2_looks_one_past_current() {
        let mut f = SourceFile::new("t.hlb", "fs a()");
        let toks = tokenize(&mut f).unwrap();
        let c = Cursor::new(toks);
        assert_eq!(c.peek().lexeme, "fs");
        assert_eq!(c.peek2().lexeme, "a");
    }

    #[test]
    fn bumping_past_eof_stays_at_eof() {
        let mut f = SourceFile::new("t.hlb", "fs");
        let toks = tokenize(&mut f).unwrap();
        let mut c = Cursor::new(toks);
        c.bump();
        c.bump();
        assert!(c.at_eof());
        c.bump();
        assert!(c.at_eof());
    }
}
