pub(crate) mod flat;

pub use flat::{FlatStore, IndexArtifact, IndexEntry};
