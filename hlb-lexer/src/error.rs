use hlb_diagnostics::{DiagnosticCtx, Span, SpanError};
use hlb_span::Position;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("{0}: invalid token")]
    InvalidToken(Position),

    #[error("{0}: string literal not terminated")]
    LiteralNotTerminated(Position),

    #[error("{0}: invalid escape sequence '\\{1}'")]
    InvalidEscape(Position, char),
}

impl LexError {
    pub fn position(&self) -> &Position {
        match self {
            LexError::InvalidToken(p) => p,
            LexError::LiteralNotTerminated(p) => p,
            LexError::InvalidEscape(p, _) => p,
        }
    }

    /// `ctx` isn't consulted for a lexer error (there's no candidate set to
    /// search, just a single bad offset) but every crate's error enum takes
    /// one so the driver can flatten any stage's failures uniformly.
    pub fn to_span_error(&self, _ctx: &DiagnosticCtx) -> SpanError {
        let pos = self.position().clone();
        SpanError::error(self.to_string(), Span::primary(pos.clone(), pos, self.to_string()))
    }
}
