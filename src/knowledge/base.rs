use std::path::Path;

use async_trait::async_trait;

use crate::{
    knowledge::{CustomKnowledge, VectorStoreKnowledge},
    model::EmbeddingModel,
    value::RetrievedChunk,
    vector_store::VectorStore,
};

/// Read-only access to the documentation index.
#[async_trait]
pub trait KnowledgeBehavior: std::fmt::Debug + Send + Sync {
    /// Up to `top_k` chunks relevant to `query`, most relevant first.
    async fn retrieve(&self, query: String, top_k: usize) -> anyhow::Result<Vec<RetrievedChunk>>;
}

#[derive(Debug, Clone)]
enum KnowledgeInner {
    VectorStore(VectorStoreKnowledge),
    Custom(CustomKnowledge),
}

#[derive(Debug, Clone)]
pub struct Knowledge {
    inner: KnowledgeInner,
}

impl Knowledge {
    pub fn new_vector_store(
        store: VectorStore,
        embedding_model: EmbeddingModel,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            inner: KnowledgeInner::VectorStore(VectorStoreKnowledge::try_new(
                store,
                embedding_model,
            )?),
        })
    }

    /// Loads the persisted index at `path`. Any failure here means the bot
    /// has nothing to answer from and must not start.
    pub async fn load(
        path: impl AsRef<Path>,
        embedding_model: EmbeddingModel,
    ) -> anyhow::Result<Self> {
        let store = VectorStore::load_flat(path).await?;
        Self::new_vector_store(store, embedding_model)
    }

    pub fn new_custom(knowledge: CustomKnowledge) -> Self {
        Self {
            inner: KnowledgeInner::Custom(knowledge),
        }
    }
}

#[async_trait]
impl KnowledgeBehavior for Knowledge {
    async fn retrieve(&self, query: String, top_k: usize) -> anyhow::Result<Vec<RetrievedChunk>> {
        match &self.inner {
            KnowledgeInner::VectorStore(knowledge) => knowledge.retrieve(query, top_k).await,
            KnowledgeInner::Custom(knowledge) => knowledge.retrieve(query, top_k).await,
        }
    }
}
