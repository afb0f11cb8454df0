pub(crate) mod base;
pub(crate) mod local;

pub use base::*;
pub use local::{FlatStore, IndexArtifact, IndexEntry};
