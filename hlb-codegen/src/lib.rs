mod debugger;
mod error;
mod eval;
mod image_cache;
mod value;

pub use debugger::{DebugAction, Debugger, NullDebugger};
pub use error::CodegenError;
pub use eval::Evaluator;
pub use image_cache::CachedImageResolver;
pub use value::Value;
