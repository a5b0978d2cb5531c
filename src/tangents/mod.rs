//! Tangent collaborator: follow-up query suggestions for a source card.
//!
//! Tangents are consumed opaquely by the rest of the system; whatever
//! generates them sits behind [`TangentSource`]. The bundled
//! [`PoolTangents`] draws from a fixed pool so no language-model
//! integration is required.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;

/// Context handed to the tangent generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TangentContext {
    /// Title of the card the user is looking at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// URL of the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Snippet or other free-text context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A source of follow-up query suggestions.
#[async_trait]
pub trait TangentSource: Send + Sync {
    /// Generate follow-up queries for the given context.
    async fn generate(&self, context: &TangentContext) -> SearchResult<Vec<String>>;
}

/// Number of tangents returned per request.
const TANGENTS_PER_REQUEST: usize = 3;

const TANGENT_POOL: [&str; 12] = [
    "quantum computing applications",
    "AI in healthcare",
    "robotics integration",
    "natural language processing",
    "computer vision advances",
    "AI governance policies",
    "machine learning ethics",
    "neural network architectures",
    "deep learning frameworks",
    "AI safety research",
    "automated reasoning",
    "cognitive computing",
];

/// Tangent source drawing random entries from a fixed pool.
#[derive(Debug, Clone, Default)]
pub struct PoolTangents;

impl PoolTangents {
    /// Create a pool-backed tangent source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TangentSource for PoolTangents {
    async fn generate(&self, _context: &TangentContext) -> SearchResult<Vec<String>> {
        let mut pool: Vec<String> = TANGENT_POOL.iter().map(|s| s.to_string()).collect();
        pool.shuffle(&mut rand::thread_rng());
        pool.truncate(TANGENTS_PER_REQUEST);
        Ok(pool)
    }
}
