#[cfg(feature = "test-fakes")]
pub mod fake;
mod error;
mod llb;
mod request;
mod traits;

pub use error::{RegistryError, SolverError};
pub use llb::{ImageDigest, LlbDefinition, Op, OptionApply, Platform, SolveResult, State, Value};
pub use request::{next, peer, SolveOptions, SolveRequest};
pub use traits::{Registry, Solver};
