use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Crate target prefix used to scope the default filter directive, mirroring
/// the teacher's per-crate `ai_llm_service=...` directive convention.
const TARGET_PREFIX: &str = "hlb";

/// Installs a process-global `tracing` subscriber reading `HLB_LOG`
/// (`EnvFilter` syntax, e.g. `hlb=debug,hlb_resolver=trace`), falling back
/// to `hlb=info` when unset or unparseable. Out of scope for this crate's
/// own tests (`#[tokio::test]` doesn't need a subscriber); the excluded CLI
/// collaborator is the intended caller, once at process start.
///
/// Safe to call more than once — a second call's `Err` (a subscriber is
/// already installed) is swallowed rather than propagated, since nothing
/// downstream of this function treats "logging already on" as a failure.
pub fn init_from_env() {
    let filter = EnvFilter::try_from_env("HLB_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("{TARGET_PREFIX}=info")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stdout().is_terminal())
        .try_init();
}
