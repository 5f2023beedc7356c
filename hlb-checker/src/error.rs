use hlb_diagnostics::{DiagnosticCtx, Span, SpanError};
use hlb_span::Position;
use thiserror::Error;

/// Every failure the two-pass checker can report. Each variant carries its
/// own `Position` rather than relying on caller-supplied context, matching
/// `ParseError`/`LexError`'s pattern for a uniform `to_span_error` call site.
#[derive(Debug, Error, Clone)]
pub enum CheckError {
    #[error("{pos}: '{name}' is already declared in this scope")]
    DuplicateDecl {
        name: String,
        pos: Position,
        first: Position,
    },

    #[error("{pos}: parameter '{name}' is already declared")]
    DuplicateField {
        name: String,
        pos: Position,
        first: Position,
    },

    #[error("{pos}: block has no statements")]
    EmptyBlock { pos: Position },

    #[error("{pos}: a '{ty}' block must open with a source call")]
    ExpectedSource { ty: String, pos: Position },

    #[error("{pos}: '{name}' is a source call, only valid as the first statement in a block")]
    UnexpectedSource { name: String, pos: Position },

    #[error("{pos}: no function '{name}' returning '{ty}'")]
    UnknownFunc {
        name: String,
        ty: String,
        pos: Position,
        suggestion: Option<String>,
    },

    #[error("{pos}: '{name}' takes {expected} argument(s), got {got}")]
    ArgCount {
        name: String,
        expected: usize,
        got: usize,
        pos: Position,
    },

    #[error("{pos}: argument {index} to '{name}' has type '{got}', expected '{expected}'")]
    ArgType {
        name: String,
        index: usize,
        expected: String,
        got: String,
        pos: Position,
    },

    #[error("{pos}: '{name}' is not defined")]
    IdentNotDefined {
        name: String,
        pos: Position,
        suggestion: Option<String>,
    },

    #[error("{pos}: '{name}' does not accept a function argument here")]
    FuncArg { name: String, pos: Position },

    #[error("{pos}: function declares return type '{declared}' but its body produces '{got}'")]
    WrongReturnType {
        declared: String,
        got: String,
        pos: Position,
    },

    #[error("{pos}: 'as local' may only bind a call's result")]
    InvalidTarget { pos: Position },
}

impl CheckError {
    pub fn position(&self) -> &Position {
        match self {
            CheckError::DuplicateDecl { pos, .. } => pos,
            CheckError::DuplicateField { pos, .. } => pos,
            CheckError::EmptyBlock { pos } => pos,
            CheckError::ExpectedSource { pos, .. } => pos,
            CheckError::UnexpectedSource { pos, .. } => pos,
            CheckError::UnknownFunc { pos, .. } => pos,
            CheckError::ArgCount { pos, .. } => pos,
            CheckError::ArgType { pos, .. } => pos,
            CheckError::IdentNotDefined { pos, .. } => pos,
            CheckError::FuncArg { pos, .. } => pos,
            CheckError::WrongReturnType { pos, .. } => pos,
            CheckError::InvalidTarget { pos } => pos,
        }
    }

    fn suggestion(&self) -> Option<&str> {
        match self {
            CheckError::UnknownFunc { suggestion, .. } => suggestion.as_deref(),
            CheckError::IdentNotDefined { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    pub fn to_span_error(&self, _ctx: &DiagnosticCtx) -> SpanError {
        let pos = self.position().clone();
        let mut message = self.to_string();
        if let Some(s) = self.suggestion() {
            message.push_str(&format!(" (did you mean '{s}'?)"));
        }
        let err = SpanError::error(message.clone(), Span::primary(pos.clone(), pos, message));

        match self {
            CheckError::DuplicateDecl { first, name, .. }
            | CheckError::DuplicateField { first, name, .. } => err.with_secondary(
                Span::secondary(first.clone(), first.clone(), format!("'{name}' first declared here")),
            ),
            _ => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlb_diagnostics::ColorMode;
    use hlb_span::Sources;

    fn pos(line: usize) -> Position {
        Position {
            file: "t.hlb".into(),
            offset: 0,
            line,
            column: 1,
        }
    }

    #[test]
    fn unknown_func_appends_suggestion() {
        let err = CheckError::UnknownFunc {
            name: "scrach".into(),
            ty: "fs".into(),
            pos: pos(1),
            suggestion: Some("scratch".into()),
        };
        let ctx = DiagnosticCtx::new(Sources::new(), ColorMode::Never, 2);
        let span = err.to_span_error(&ctx);
        assert!(span.message.contains("did you mean 'scratch'?"));
    }

    #[test]
    fn duplicate_decl_carries_secondary_span() {
        let err = CheckError::DuplicateDecl {
            name: "build".into(),
            pos: pos(5),
            first: pos(1),
        };
        let ctx = DiagnosticCtx::new(Sources::new(), ColorMode::Never, 2);
        let span = err.to_span_error(&ctx);
        assert_eq!(span.secondary.len(), 1);
    }
}
