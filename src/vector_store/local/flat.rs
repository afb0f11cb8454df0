use std::{cmp::Reverse, path::Path};

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    constants::INDEX_ARTIFACT_VERSION,
    value::Embedding,
    vector_store::{VectorStoreBehavior, VectorStoreMetadata, VectorStoreRetrieveResult},
};

/// On-disk form of the knowledge index, written by the offline ingestion job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexArtifact {
    pub version: u32,
    pub embedding_model: String,
    pub dimension: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<usize>,
    pub entries: Vec<IndexEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VectorStoreMetadata>,
    pub embedding: Embedding,
}

/// Exhaustive cosine-similarity search over every stored vector.
#[derive(Debug)]
pub struct FlatStore {
    embedding_model: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl FlatStore {
    pub fn from_artifact(artifact: IndexArtifact) -> anyhow::Result<Self> {
        if artifact.version != INDEX_ARTIFACT_VERSION {
            bail!(
                "Unsupported index artifact version {} (expected {})",
                artifact.version,
                INDEX_ARTIFACT_VERSION
            );
        }
        if artifact.dimension == 0 {
            bail!("Index artifact declares a zero embedding dimension");
        }
        if let Some(entry) = artifact
            .entries
            .iter()
            .find(|e| e.embedding.dim() != artifact.dimension)
        {
            bail!(
                "Index entry `{}` has {} dimensions, expected {}",
                entry.id,
                entry.embedding.dim(),
                artifact.dimension
            );
        }
        if let Some(entry) = artifact
            .entries
            .iter()
            .find(|e| e.embedding.iter().any(|v| !v.is_finite()))
        {
            bail!("Index entry `{}` has a non-finite embedding component", entry.id);
        }

        log::info!(
            "Loaded {} chunks (dim={}, model={}, chunk_size={:?}, chunk_overlap={:?})",
            artifact.entries.len(),
            artifact.dimension,
            artifact.embedding_model,
            artifact.chunk_size,
            artifact.chunk_overlap
        );
        Ok(Self {
            embedding_model: artifact.embedding_model,
            dimension: artifact.dimension,
            entries: artifact.entries,
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Cannot read index artifact at {}", path.display()))?;
        let artifact: IndexArtifact = serde_json::from_slice(&bytes)
            .with_context(|| format!("Malformed index artifact at {}", path.display()))?;
        Self::from_artifact(artifact)
            .with_context(|| format!("Invalid index artifact at {}", path.display()))
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl VectorStoreBehavior for FlatStore {
    async fn retrieve(
        &self,
        query_embedding: &Embedding,
        top_k: usize,
    ) -> anyhow::Result<Vec<VectorStoreRetrieveResult>> {
        if query_embedding.dim() != self.dimension {
            bail!(
                "Query embedding has {} dimensions, index expects {}",
                query_embedding.dim(),
                self.dimension
            );
        }

        let mut scored = self
            .entries
            .iter()
            .map(|entry| {
                let similarity = query_embedding.cosine_similarity(&entry.embedding)?;
                Ok((entry, similarity))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        // Stable: equal scores keep artifact order.
        scored.sort_by_key(|(_, similarity)| Reverse(OrderedFloat(*similarity)));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(entry, similarity)| VectorStoreRetrieveResult {
                id: entry.id.clone(),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                similarity: similarity as f64,
            })
            .collect())
    }

    fn count(&self) -> usize {
        self.entries.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
