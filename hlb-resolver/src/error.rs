use hlb_diagnostics::{DiagnosticCtx, Span, SpanError};
use hlb_span::Position;
use thiserror::Error;

use crate::digest::VertexDigest;

/// Failures raised while fetching, caching, or linking the import graph.
/// Resolver errors fail only the import subtree they occur in — a sibling
/// import unaffected by the failure still resolves (§7 propagation policy).
#[derive(Debug, Error, Clone)]
pub enum ResolveError {
    #[error("failed to resolve import '{name}': {cause}")]
    ImportFailed {
        name: String,
        cause: String,
        pos: Option<Position>,
    },

    #[error("{pos}: import cycle detected: {}", path.join(" -> "))]
    ImportCycle { path: Vec<String>, pos: Position },

    #[error("vendored module at '{digest}' failed to parse: {cause}")]
    ModuleParseFailed { digest: VertexDigest, cause: String },

    /// The vendor path for `digest` already holds content that doesn't match
    /// what was just fetched — either a hash collision or a corrupted/
    /// hand-edited vendor tree. Either way the resolver refuses to silently
    /// pick one.
    #[error("'{digest}' is ambiguous: vendored content differs from the freshly fetched module")]
    AmbiguousDigest { digest: VertexDigest },
}

impl ResolveError {
    pub fn position(&self) -> Option<&Position> {
        match self {
            ResolveError::ImportFailed { pos, .. } => pos.as_ref(),
            ResolveError::ImportCycle { pos, .. } => Some(pos),
            ResolveError::ModuleParseFailed { .. } => None,
            ResolveError::AmbiguousDigest { .. } => None,
        }
    }

    pub fn to_span_error(&self, _ctx: &DiagnosticCtx) -> Option<SpanError> {
        let pos = self.position()?.clone();
        let message = self.to_string();
        Some(SpanError::error(message.clone(), Span::primary(pos.clone(), pos, message)))
    }
}
