use hlb_diagnostics::{DiagnosticCtx, Span, SpanError};
use hlb_span::Position;
use thiserror::Error;

/// Failures raised while evaluating a checked module into LLB state. Kept
/// separate from `hlb_checker::CheckError` — codegen runs only after the
/// checker has already accepted the module, so these are runtime/resolution
/// failures rather than static type errors.
#[derive(Debug, Error, Clone)]
pub enum CodegenError {
    #[error("{pos}: could not resolve image reference '{reference}': {cause}")]
    UnresolvableImage {
        reference: String,
        cause: String,
        pos: Position,
    },

    #[error("{pos}: '{op}' requires a platform but none was configured")]
    PlatformRequired { op: String, pos: Position },

    #[error("{pos}: '{value}' is not a valid RFC 3339 timestamp for '{opt}'")]
    InvalidTimestamp {
        opt: String,
        value: String,
        pos: Position,
    },

    #[error("local command '{command}' failed: {cause}")]
    LocalExecFailed {
        command: String,
        cause: String,
        pos: Position,
    },

    #[error("no target function named '{0}'")]
    UnknownTarget(String),

    /// Raised only by `Evaluator::eval_standalone_fs`, used by `hlb-resolver`
    /// to codegen an `ImportDecl.source` expression — that expression isn't
    /// inside a checked function body, so nothing upstream already
    /// guarantees it evaluates to `fs`.
    #[error("import source did not evaluate to an `fs` value")]
    InvalidImportSource,

    #[error("debugger aborted at '{0}'")]
    DebugExit(String),
}

impl CodegenError {
    /// `DebugExit` is a clean termination signal, not a fatal problem (§7) —
    /// it carries no `Position` because it isn't reported through the
    /// diagnostic engine at all.
    pub fn position(&self) -> Option<&Position> {
        match self {
            CodegenError::UnresolvableImage { pos, .. } => Some(pos),
            CodegenError::PlatformRequired { pos, .. } => Some(pos),
            CodegenError::InvalidTimestamp { pos, .. } => Some(pos),
            CodegenError::LocalExecFailed { pos, .. } => Some(pos),
            CodegenError::UnknownTarget(_) => None,
            CodegenError::InvalidImportSource => None,
            CodegenError::DebugExit(_) => None,
        }
    }

    pub fn to_span_error(&self, _ctx: &DiagnosticCtx) -> Option<SpanError> {
        let pos = self.position()?.clone();
        let message = self.to_string();
        Some(SpanError::error(
            message.clone(),
            Span::primary(pos.clone(), pos, message),
        ))
    }
}
