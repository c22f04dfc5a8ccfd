//! Annotation state: per-image records, sidecar persistence, and the
//! ordered collection the export pipeline consumes.

mod annotations;
mod types;

pub use annotations::*;
pub use types::*;
