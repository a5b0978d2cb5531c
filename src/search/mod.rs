//! Search collaborator: source cards and the provider-facing interface.
//!
//! The trail engine never fetches or ranks anything itself; it consumes
//! [`SourceCard`] values produced by a [`SearchSource`]. The bundled
//! [`FixtureSearch`] implementation serves a fixed card set so the rest of
//! the system can be exercised without any provider integration.

mod fixtures;

pub use fixtures::FixtureSearch;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;

/// Category label used to diversify search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// General reference works.
    Encyclopedia,
    /// Primary sources: papers, preprints, original documents.
    Primary,
    /// News coverage.
    News,
    /// Personal or company blogs.
    Blog,
    /// Community discussion threads.
    Forum,
    /// Datasets and benchmarks.
    Dataset,
}

impl Bucket {
    /// All buckets, in presentation order.
    pub const ALL: [Bucket; 6] = [
        Bucket::Encyclopedia,
        Bucket::Primary,
        Bucket::News,
        Bucket::Blog,
        Bucket::Forum,
        Bucket::Dataset,
    ];
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Encyclopedia => write!(f, "encyclopedia"),
            Bucket::Primary => write!(f, "primary"),
            Bucket::News => write!(f, "news"),
            Bucket::Blog => write!(f, "blog"),
            Bucket::Forum => write!(f, "forum"),
            Bucket::Dataset => write!(f, "dataset"),
        }
    }
}

impl std::str::FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "encyclopedia" => Ok(Bucket::Encyclopedia),
            "primary" => Ok(Bucket::Primary),
            "news" => Ok(Bucket::News),
            "blog" => Ok(Bucket::Blog),
            "forum" => Ok(Bucket::Forum),
            "dataset" => Ok(Bucket::Dataset),
            _ => Err(format!("Unknown bucket: {}", s)),
        }
    }
}

/// Search provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Parallel search API.
    #[default]
    Parallel,
    /// Perplexity Sonar.
    Sonar,
    /// Brave search API.
    Brave,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Parallel => write!(f, "parallel"),
            Provider::Sonar => write!(f, "sonar"),
            Provider::Brave => write!(f, "brave"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parallel" => Ok(Provider::Parallel),
            "sonar" => Ok(Provider::Sonar),
            "brave" => Ok(Provider::Brave),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// One search result presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCard {
    /// Full URL of the source.
    pub url: String,
    /// Display title.
    pub title: String,
    /// Registrable domain, used for trail metrics.
    pub domain: String,
    /// Diversity bucket the card belongs to.
    pub bucket: Bucket,
    /// Short excerpt for the card body.
    pub snippet: String,
    /// Publication timestamp, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Suggested follow-up queries.
    pub tangents: Vec<String>,
}

/// Parameters for a single search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of cards to return.
    pub k: usize,
    /// MMR relevance/diversity trade-off, 0..=1.
    pub lambda: f64,
    /// Serendipity level, 0..=1. Above 0.5 the returned cards carry
    /// tangents drawn from the serendipity pool instead of their own.
    pub sigma: f64,
    /// Which provider backs the search.
    pub provider: Provider,
    /// Buckets the caller wants represented.
    pub buckets: Vec<Bucket>,
    /// Bias results toward dissenting sources.
    pub contrarian: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k: 8,
            lambda: 0.6,
            sigma: 0.5,
            provider: Provider::default(),
            buckets: Bucket::ALL.to_vec(),
            contrarian: false,
        }
    }
}

/// A source of search results.
///
/// Provider integrations live behind this trait; the server only ever
/// talks to it. Implementations must tolerate empty queries.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Run a search and return at most `params.k` cards.
    async fn search(&self, query: &str, params: &SearchParams) -> SearchResult<Vec<SourceCard>>;
}
