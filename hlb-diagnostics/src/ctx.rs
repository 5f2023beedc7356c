use std::io::IsTerminal;

use hlb_span::Sources;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolves `Auto` against whether stdout is a terminal; `Always`/`Never`
    /// are unconditional, matching the teacher's terminal/non-terminal split
    /// in its own error reporting.
    pub fn use_color(self) -> bool {
        match self {
            ColorMode::Auto => std::io::stdout().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Threaded explicitly through the compile pipeline rather than held as
/// process-global state (§9 open-question resolution).
pub struct DiagnosticCtx {
    pub sources: Sources,
    pub color: ColorMode,
    pub num_context: usize,
}

impl DiagnosticCtx {
    pub fn new(sources: Sources, color: ColorMode, num_context: usize) -> Self {
        Self {
            sources,
            color,
            num_context,
        }
    }
}
