use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::local::FlatStore;
use crate::value::Embedding;

pub type VectorStoreMetadata = HashMap<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorStoreRetrieveResult {
    pub id: String,
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VectorStoreMetadata>,
    /// Cosine similarity to the query, higher is closer.
    pub similarity: f64,
}

/// Read side of a similarity index. Stores are loaded whole and never mutated
/// while serving, so implementations must be shareable without locking.
#[async_trait]
pub trait VectorStoreBehavior: Send + Sync {
    /// Up to `top_k` entries, most similar first.
    async fn retrieve(
        &self,
        query_embedding: &Embedding,
        top_k: usize,
    ) -> anyhow::Result<Vec<VectorStoreRetrieveResult>>;

    fn count(&self) -> usize;

    fn dimension(&self) -> usize;
}

#[derive(Debug, Clone)]
enum VectorStoreInner {
    Flat(Arc<FlatStore>),
}

#[derive(Debug, Clone)]
pub struct VectorStore {
    inner: VectorStoreInner,
}

impl VectorStore {
    pub async fn load_flat(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::from_flat(FlatStore::load(path).await?))
    }

    pub fn from_flat(store: FlatStore) -> Self {
        Self {
            inner: VectorStoreInner::Flat(Arc::new(store)),
        }
    }

    /// Name of the embedding model the stored vectors were produced with.
    pub fn embedding_model(&self) -> &str {
        match &self.inner {
            VectorStoreInner::Flat(store) => store.embedding_model(),
        }
    }
}

#[async_trait]
impl VectorStoreBehavior for VectorStore {
    async fn retrieve(
        &self,
        query_embedding: &Embedding,
        top_k: usize,
    ) -> anyhow::Result<Vec<VectorStoreRetrieveResult>> {
        match &self.inner {
            VectorStoreInner::Flat(store) => store.retrieve(query_embedding, top_k).await,
        }
    }

    fn count(&self) -> usize {
        match &self.inner {
            VectorStoreInner::Flat(store) => store.count(),
        }
    }

    fn dimension(&self) -> usize {
        match &self.inner {
            VectorStoreInner::Flat(store) => store.dimension(),
        }
    }
}
