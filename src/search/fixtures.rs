//! Fixture-backed search source.
//!
//! Serves a fixed set of cards spanning every bucket, filtered the same
//! way a real provider adapter would be asked to: bucket membership,
//! case-insensitive query match against title or snippet, truncation to
//! `k`, and a serendipity swap of tangents when `sigma` is high.

use async_trait::async_trait;
use chrono::DateTime;
use rand::seq::SliceRandom;

use super::{Bucket, SearchParams, SearchSource, SourceCard};
use crate::error::SearchResult;

/// Follow-up queries used when serendipity displaces a card's own tangents.
const SERENDIPITY_POOL: [&str; 6] = [
    "quantum computing applications",
    "AI in healthcare",
    "robotics integration",
    "natural language processing",
    "computer vision advances",
    "AI governance policies",
];

/// Number of tangents attached per card on a serendipity draw.
const TANGENTS_PER_CARD: usize = 3;

/// Search source returning cards from a built-in fixture set.
#[derive(Debug, Clone, Default)]
pub struct FixtureSearch;

impl FixtureSearch {
    /// Create a fixture-backed search source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchSource for FixtureSearch {
    async fn search(&self, query: &str, params: &SearchParams) -> SearchResult<Vec<SourceCard>> {
        let needle = query.to_lowercase();
        let mut rng = rand::thread_rng();

        let cards = fixture_cards()
            .into_iter()
            .filter(|card| params.buckets.contains(&card.bucket))
            .filter(|card| {
                needle.is_empty()
                    || card.title.to_lowercase().contains(&needle)
                    || card.snippet.to_lowercase().contains(&needle)
            })
            .take(params.k)
            .map(|mut card| {
                if params.sigma > 0.5 {
                    let mut pool: Vec<String> =
                        SERENDIPITY_POOL.iter().map(|s| s.to_string()).collect();
                    pool.shuffle(&mut rng);
                    pool.truncate(TANGENTS_PER_CARD);
                    card.tangents = pool;
                }
                card
            })
            .collect();

        Ok(cards)
    }
}

fn published(ts: &str) -> Option<DateTime<chrono::Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}

/// The fixture card set, one card per bucket.
fn fixture_cards() -> Vec<SourceCard> {
    vec![
        SourceCard {
            url: "https://en.wikipedia.org/wiki/Artificial_intelligence".to_string(),
            title: "Artificial Intelligence - Wikipedia".to_string(),
            domain: "wikipedia.org".to_string(),
            bucket: Bucket::Encyclopedia,
            snippet: "Artificial intelligence (AI) is intelligence demonstrated by machines, \
                      in contrast to the natural intelligence displayed by humans and animals."
                .to_string(),
            published_at: published("2024-01-15T10:00:00Z"),
            tangents: vec![
                "machine learning basics".to_string(),
                "AI ethics debate".to_string(),
                "neural networks explained".to_string(),
            ],
        },
        SourceCard {
            url: "https://arxiv.org/abs/2301.00001".to_string(),
            title: "Large Language Models and Their Applications".to_string(),
            domain: "arxiv.org".to_string(),
            bucket: Bucket::Primary,
            snippet: "This paper explores the current state and future directions of large \
                      language models in various applications."
                .to_string(),
            published_at: published("2024-01-10T14:30:00Z"),
            tangents: vec![
                "transformer architecture".to_string(),
                "LLM training methods".to_string(),
                "AI safety research".to_string(),
            ],
        },
        SourceCard {
            url: "https://techcrunch.com/2024/01/20/ai-breakthrough".to_string(),
            title: "Major AI Breakthrough Announced by Leading Tech Company".to_string(),
            domain: "techcrunch.com".to_string(),
            bucket: Bucket::News,
            snippet: "A significant advancement in artificial intelligence has been announced, \
                      promising to revolutionize how we interact with technology."
                .to_string(),
            published_at: published("2024-01-20T09:15:00Z"),
            tangents: vec![
                "tech industry trends".to_string(),
                "AI commercialization".to_string(),
                "startup funding AI".to_string(),
            ],
        },
        SourceCard {
            url: "https://blog.openai.com/gpt-insights".to_string(),
            title: "Understanding GPT: A Deep Dive into Language Models".to_string(),
            domain: "blog.openai.com".to_string(),
            bucket: Bucket::Blog,
            snippet: "An in-depth exploration of how GPT models work and their implications \
                      for the future of AI."
                .to_string(),
            published_at: published("2024-01-18T16:45:00Z"),
            tangents: vec![
                "GPT architecture".to_string(),
                "language model training".to_string(),
                "AI research methods".to_string(),
            ],
        },
        SourceCard {
            url: "https://reddit.com/r/MachineLearning/comments/ai_discussion".to_string(),
            title: "Discussion: Current State of AI Research".to_string(),
            domain: "reddit.com".to_string(),
            bucket: Bucket::Forum,
            snippet: "Community discussion about the latest developments in AI research and \
                      their practical applications."
                .to_string(),
            published_at: published("2024-01-19T12:20:00Z"),
            tangents: vec![
                "AI research community".to_string(),
                "ML paper discussions".to_string(),
                "AI career advice".to_string(),
            ],
        },
        SourceCard {
            url: "https://huggingface.co/datasets/ai-benchmark".to_string(),
            title: "AI Performance Benchmark Dataset".to_string(),
            domain: "huggingface.co".to_string(),
            bucket: Bucket::Dataset,
            snippet: "Comprehensive dataset for benchmarking AI model performance across \
                      various tasks and domains."
                .to_string(),
            published_at: published("2024-01-12T08:00:00Z"),
            tangents: vec![
                "AI benchmarking".to_string(),
                "model evaluation".to_string(),
                "dataset creation".to_string(),
            ],
        },
    ]
}
