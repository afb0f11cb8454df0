pub(crate) mod api;
pub(crate) mod custom;
pub(crate) mod embedding_model;
pub(crate) mod language_model;

pub use api::{APIModel, APISpecification};
pub use custom::{CustomEmbeddingModelInferFunc, CustomLangModelInferFunc};
pub use embedding_model::{EmbeddingModel, EmbeddingModelInference};
pub use language_model::{LangModel, LangModelInferConfig, LangModelInference};
