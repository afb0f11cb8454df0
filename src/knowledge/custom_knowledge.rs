use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{knowledge::KnowledgeBehavior, utils::BoxFuture, value::RetrievedChunk};

pub type CustomKnowledgeRetrieveFunc =
    dyn Fn(String, usize) -> BoxFuture<'static, anyhow::Result<Vec<RetrievedChunk>>> + Send + Sync;

#[derive(Clone)]
pub struct CustomKnowledge {
    f: Arc<CustomKnowledgeRetrieveFunc>,
}

impl Debug for CustomKnowledge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomKnowledge")
            .field("f", &"function")
            .finish()
    }
}

impl CustomKnowledge {
    pub fn new(f: Arc<CustomKnowledgeRetrieveFunc>) -> Self {
        Self { f }
    }
}

#[async_trait]
impl KnowledgeBehavior for CustomKnowledge {
    async fn retrieve(&self, query: String, top_k: usize) -> anyhow::Result<Vec<RetrievedChunk>> {
        (self.f)(query, top_k).await
    }
}
