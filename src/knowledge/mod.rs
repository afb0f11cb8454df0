pub(crate) mod base;
pub(crate) mod custom_knowledge;
pub(crate) mod vector_store_knowledge;

pub use base::{Knowledge, KnowledgeBehavior};
pub use custom_knowledge::{CustomKnowledge, CustomKnowledgeRetrieveFunc};
pub use vector_store_knowledge::VectorStoreKnowledge;
