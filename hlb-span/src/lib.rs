//! Source buffers, positions, and the cross-file [`Sources`] registry.
//!
//! Every other HLB crate anchors diagnostics and AST nodes in the types
//! defined here instead of carrying raw string/offset pairs around.

mod position;
mod source_file;
mod sources;

pub use position::{Position, Range};
pub use source_file::SourceFile;
pub use sources::Sources;
