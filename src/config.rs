use std::path::PathBuf;

use hlb_diagnostics::ColorMode;

/// Runtime knobs for one [`crate::compile`] call. Everything here has a
/// documented default and is safe to leave unset — there's nothing in this
/// crate's own scope that should hard-fail a build over a missing env var
/// the way `EMBEDDING_DIM == 0` does for the teacher's `RagConfig`.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Root directory vendored import copies are cached under.
    pub vendor_root: PathBuf,
    /// Sweep the vendor tree of anything not reached by this resolve.
    pub tidy: bool,
    /// Upper bound on concurrently in-flight import fetches.
    pub max_resolve_concurrency: usize,
    /// Lines of source context a rendered diagnostic shows around its span.
    pub num_context: usize,
    pub color: ColorMode,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            vendor_root: PathBuf::from(".hlb/vendor"),
            tidy: false,
            max_resolve_concurrency: 8,
            num_context: 2,
            color: ColorMode::Auto,
        }
    }
}

impl CompileConfig {
    /// Builds a config from the process environment, falling back to
    /// [`CompileConfig::default`] field-by-field — the same
    /// read-with-fallback shape as the teacher's `RagConfig::from_env`,
    /// minus the teacher's post-hoc validation: every field here already
    /// has a default that is itself a valid value, so there's nothing left
    /// that could fail.
    ///
    /// Environment variables used:
    /// - `HLB_VENDOR_ROOT` (default: `.hlb/vendor`)
    /// - `HLB_RESOLVE_CONCURRENCY` (default: 8)
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            vendor_root: std::env::var("HLB_VENDOR_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.vendor_root),
            max_resolve_concurrency: read_usize_env("HLB_RESOLVE_CONCURRENCY")
                .unwrap_or(default.max_resolve_concurrency),
            ..default
        }
    }
}

/// Reads a `usize` from `key`, discarding (rather than surfacing) a missing
/// or unparseable value — this crate only ever uses it for optional knobs
/// that already have a sane default.
fn read_usize_env(key: &str) -> Option<usize> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        // SAFETY: test-only, single-threaded access to these two keys.
        unsafe {
            std::env::remove_var("HLB_VENDOR_ROOT");
            std::env::remove_var("HLB_RESOLVE_CONCURRENCY");
        }
        let config = CompileConfig::from_env();
        assert_eq!(config.vendor_root, PathBuf::from(".hlb/vendor"));
        assert_eq!(config.max_resolve_concurrency, 8);
    }

    #[test]
    fn an_unparseable_concurrency_falls_back_to_the_default_instead_of_panicking() {
        // SAFETY: test-only, single-threaded access to this key.
        unsafe { std::env::set_var("HLB_RESOLVE_CONCURRENCY", "not-a-number") };
        let config = CompileConfig::from_env();
        assert_eq!(config.max_resolve_concurrency, 8);
        unsafe { std::env::remove_var("HLB_RESOLVE_CONCURRENCY") };
    }
}
