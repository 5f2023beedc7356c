//! In-memory `Solver`/`Registry` fakes, feature-gated behind `test-fakes` so
//! the reference-graph shape used throughout the test suite (§9) never
//! leaks into a production dependency chain.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{RegistryError, SolverError};
use crate::llb::{ImageDigest, LlbDefinition, Platform, SolveResult, State};
use crate::request::SolveOptions;
use crate::traits::{Registry, Solver};

/// Every `solve` call is assigned a digest derived from a monotonic counter,
/// and `read` looks files up by `(digest, filename)` from whatever the test
/// seeded ahead of time — there's no real execution behind it.
#[derive(Default)]
pub struct InMemorySolver {
    next_digest: Mutex<u64>,
    files: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl InMemorySolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the bytes a future `read(result, filename)` should return
    /// once `solve` has produced `result`'s digest.
    pub fn seed_file(&self, digest: impl Into<String>, filename: impl Into<String>, contents: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert((digest.into(), filename.into()), contents);
    }
}

impl Solver for InMemorySolver {
    async fn solve(&self, _def: &LlbDefinition, _opts: &SolveOptions) -> Result<SolveResult, SolverError> {
        let mut next = self.next_digest.lock().unwrap();
        let digest = format!("sha256:fake{:08x}", *next);
        *next += 1;
        Ok(SolveResult { digest })
    }

    async fn read(&self, result: &SolveResult, filename: &str) -> Result<Vec<u8>, SolverError> {
        self.files
            .lock()
            .unwrap()
            .get(&(result.digest.clone(), filename.to_string()))
            .cloned()
            .ok_or_else(|| SolverError::ReadFailed {
                filename: filename.to_string(),
                cause: "not seeded".into(),
            })
    }

    fn inputs(&self) -> HashMap<String, State> {
        HashMap::new()
    }
}

/// Maps `(reference, platform)` to a digest the test pre-registers with
/// `seed`; anything unseeded reports `ResolveFailed`.
#[derive(Default)]
pub struct InMemoryRegistry {
    digests: Mutex<HashMap<(String, Option<String>), ImageDigest>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, reference: impl Into<String>, platform: Option<&str>, digest: impl Into<String>) {
        self.digests.lock().unwrap().insert(
            (reference.into(), platform.map(str::to_string)),
            digest.into(),
        );
    }
}

impl Registry for InMemoryRegistry {
    async fn resolve_image(
        &self,
        reference: &str,
        platform: Option<&Platform>,
    ) -> Result<ImageDigest, RegistryError> {
        let key = (reference.to_string(), platform.map(|p| format!("{}/{}", p.os, p.arch)));
        self.digests
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::ResolveFailed {
                reference: reference.to_string(),
                cause: "not seeded".into(),
            })
    }
}
