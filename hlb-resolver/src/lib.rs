mod digest;
mod error;
mod resolver;
mod visitor;

pub use digest::VertexDigest;
pub use error::ResolveError;
pub use resolver::{ResolvedGraph, Resolver};
pub use visitor::{TidyVisitor, VendorVisitor, Visitor};
