use std::ops::Deref;

use anyhow::bail;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Cosine similarity in `[-1, 1]`. A zero vector is similar to nothing.
    pub fn cosine_similarity(&self, other: &Embedding) -> anyhow::Result<f32> {
        if self.dim() != other.dim() {
            bail!(
                "Embedding dimension mismatch: {} != {}",
                self.dim(),
                other.dim()
            );
        }
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return Ok(0.0);
        }
        let dot = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a * b)
            .sum::<f32>();
        Ok(dot / denom)
    }
}

impl Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(value: Vec<f32>) -> Self {
        Self(value)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(value: Embedding) -> Self {
        value.0
    }
}
