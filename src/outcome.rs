use hlb_diagnostics::SpanError;
use hlb_solve::SolveRequest;

/// Everything one [`crate::compile`] call produced. `request` is `None`
/// whenever any stage after parsing raised a fatal diagnostic — callers
/// should always check `diagnostics` before assuming a `None` request means
/// "nothing to build" rather than "build failed".
#[derive(Debug, Default)]
pub struct CompileOutcome {
    pub request: Option<SolveRequest>,
    pub diagnostics: Vec<SpanError>,
    pub lints: Vec<SpanError>,
}

impl CompileOutcome {
    pub fn is_success(&self) -> bool {
        self.request.is_some() && self.diagnostics.is_empty()
    }
}
