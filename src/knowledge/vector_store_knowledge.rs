use anyhow::{Context as _, bail};
use async_trait::async_trait;

use crate::{
    knowledge::KnowledgeBehavior,
    model::{EmbeddingModel, EmbeddingModelInference as _},
    value::RetrievedChunk,
    vector_store::{VectorStore, VectorStoreBehavior as _, VectorStoreRetrieveResult},
};

/// Embeds the query with the same model the index was built with, then runs a
/// similarity search over the loaded store.
#[derive(Debug, Clone)]
pub struct VectorStoreKnowledge {
    store: VectorStore,
    embedding_model: EmbeddingModel,
}

impl VectorStoreKnowledge {
    pub fn try_new(store: VectorStore, embedding_model: EmbeddingModel) -> anyhow::Result<Self> {
        if let Some(name) = embedding_model.model_name()
            && name != store.embedding_model()
        {
            bail!(
                "Index was built with embedding model `{}` but `{}` is configured",
                store.embedding_model(),
                name
            );
        }
        Ok(Self {
            store,
            embedding_model,
        })
    }
}

fn to_chunk(result: VectorStoreRetrieveResult) -> RetrievedChunk {
    let source_ref = result
        .metadata
        .as_ref()
        .and_then(|m| m.get("source"))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .unwrap_or(result.id);
    RetrievedChunk::new(result.document, source_ref).with_score(result.similarity)
}

#[async_trait]
impl KnowledgeBehavior for VectorStoreKnowledge {
    async fn retrieve(&self, query: String, top_k: usize) -> anyhow::Result<Vec<RetrievedChunk>> {
        let query_embedding = self
            .embedding_model
            .infer(query)
            .await
            .context("Failed to embed query")?;
        let results = self
            .store
            .retrieve(&query_embedding, top_k)
            .await
            .context("Similarity search failed")?;
        log::debug!(
            "Retrieved {} of {} chunks",
            results.len(),
            self.store.count()
        );
        Ok(results.into_iter().map(to_chunk).collect())
    }
}
