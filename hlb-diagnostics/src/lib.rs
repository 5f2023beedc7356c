//! Span-tracked diagnostics: `SpanError`/`Span`, a compiler-style pretty
//! printer, and Levenshtein-based "did you mean" suggestions.
//!
//! Diagnostics are never routed through `tracing` — they're first-class
//! return values threaded through the pipeline via [`DiagnosticCtx`].

mod ctx;
mod render;
mod span;
mod suggest;

pub use ctx::{ColorMode, DiagnosticCtx};
pub use render::render;
pub use span::{ErrorKind, Span, SpanError, SpanSeverity};
pub use suggest::{levenshtein, suggest};
