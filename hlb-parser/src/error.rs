use hlb_diagnostics::{DiagnosticCtx, Span, SpanError};
use hlb_lexer::LexError;
use hlb_span::Position;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ParseError {
    #[error("{pos}: unexpected {got}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        got: String,
        pos: Position,
    },

    #[error("{0}: unmatched '{{'")]
    UnmatchedBrace(Position),

    #[error("{0}: expected a function signature")]
    ExpectedSignature(Position),

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    pub fn position(&self) -> &Position {
        match self {
            ParseError::UnexpectedToken { pos, .. } => pos,
            ParseError::UnmatchedBrace(pos) => pos,
            ParseError::ExpectedSignature(pos) => pos,
            ParseError::Lex(e) => e.position(),
        }
    }

    pub fn to_span_error(&self, ctx: &DiagnosticCtx) -> SpanError {
        if let ParseError::Lex(e) = self {
            return e.to_span_error(ctx);
        }
        let pos = self.position().clone();
        SpanError::error(self.to_string(), Span::primary(pos.clone(), pos, self.to_string()))
    }
}

/// A syntax error never recovers: the parser stops where it failed and hands
/// back whatever declarations it had already built, so the diagnostic engine
/// and editor tooling still have something to show.
#[derive(Debug)]
pub struct ParseFailure {
    pub error: ParseError,
    pub partial: hlb_ast::Module,
}

impl ParseFailure {
    pub fn partial(&self) -> &hlb_ast::Module {
        &self.partial
    }
}
