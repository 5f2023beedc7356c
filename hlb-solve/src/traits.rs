use std::collections::HashMap;
use std::future::Future;

use crate::error::{RegistryError, SolverError};
use crate::llb::{ImageDigest, LlbDefinition, Platform, SolveResult, State};
use crate::request::SolveOptions;

/// The only way the front-end submits work and reads results back. No
/// `async-trait`, no `dyn Solver` — callers are generic over `S: Solver`
/// (grounded on the teacher's explicit no-async-trait/no-dyn provider-facade
/// convention; see DESIGN.md).
pub trait Solver: Send + Sync {
    fn solve(
        &self,
        def: &LlbDefinition,
        opts: &SolveOptions,
    ) -> impl Future<Output = Result<SolveResult, SolverError>> + Send;

    fn read(
        &self,
        result: &SolveResult,
        filename: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SolverError>> + Send;

    /// Local directory bindings currently available to `local` sources.
    fn inputs(&self) -> HashMap<String, State>;
}

/// Resolves an image reference to an immutable digest. Separate from
/// `Solver` because a registry lookup doesn't require a full solve.
pub trait Registry: Send + Sync {
    fn resolve_image(
        &self,
        reference: &str,
        platform: Option<&Platform>,
    ) -> impl Future<Output = Result<ImageDigest, RegistryError>> + Send;
}
