use hlb_diagnostics::Span;
use thiserror::Error;

/// Failures originating from the executor side of the `Solver` boundary.
/// `source_span`, when present, lets the front-end map an opaque executor
/// failure back onto the HLB source that produced the offending op.
#[derive(Debug, Error, Clone)]
pub enum SolverError {
    #[error("solve failed: {cause}")]
    SolveFailed {
        cause: String,
        source_span: Option<Span>,
    },

    #[error("failed to read '{filename}' from solve result: {cause}")]
    ReadFailed { filename: String, cause: String },
}

#[derive(Debug, Error, Clone)]
pub enum RegistryError {
    #[error("failed to resolve image '{reference}': {cause}")]
    ResolveFailed { reference: String, cause: String },
}
