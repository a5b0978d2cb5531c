//! Trail engine: the append-only exploration log and its derived metrics.
//!
//! A [`Trail`] records one exploration session as an ordered ledger of
//! [`TrailStep`] events. Steps are only ever appended; metrics and the
//! exploration score are recomputed from the step log on demand rather
//! than maintained as mutable counters.

mod score;

#[cfg(test)]
#[path = "score_tests.rs"]
mod score_tests;

pub use score::exploration_score;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TrailError, TrailResult};

/// One atomic recorded event in a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrailStep {
    /// The user followed a source link.
    Open {
        /// Full URL of the opened source.
        url: String,
        /// Source title as shown on its card.
        title: String,
        /// Registrable domain of the source.
        domain: String,
        /// When the source was opened.
        ts: DateTime<Utc>,
    },
    /// The user pivoted the trail into a new query.
    Branch {
        /// The follow-up query text.
        query: String,
        /// When the branch was taken.
        ts: DateTime<Utc>,
    },
    /// A free-text annotation attached to the trail at this point.
    Note {
        /// The note text.
        text: String,
        /// When the note was written.
        ts: DateTime<Utc>,
    },
}

impl TrailStep {
    /// Create an open step stamped with the current time
    pub fn open(
        url: impl Into<String>,
        title: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        TrailStep::Open {
            url: url.into(),
            title: title.into(),
            domain: domain.into(),
            ts: Utc::now(),
        }
    }

    /// Create a branch step stamped with the current time
    pub fn branch(query: impl Into<String>) -> Self {
        TrailStep::Branch {
            query: query.into(),
            ts: Utc::now(),
        }
    }

    /// Create a note step stamped with the current time
    pub fn note(text: impl Into<String>) -> Self {
        TrailStep::Note {
            text: text.into(),
            ts: Utc::now(),
        }
    }

    /// Timestamp of the step, regardless of variant.
    pub fn ts(&self) -> DateTime<Utc> {
        match self {
            TrailStep::Open { ts, .. } | TrailStep::Branch { ts, .. } | TrailStep::Note { ts, .. } => {
                *ts
            }
        }
    }
}

/// The ordered record of one exploration session, anchored to its query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trail {
    /// Opaque unique identifier, immutable after creation.
    pub id: String,
    /// The free-text query that started the trail.
    pub query: String,
    /// When the trail was started.
    pub created_at: DateTime<Utc>,
    /// Append-only step ledger; insertion order is session chronology.
    pub steps: Vec<TrailStep>,
    /// Cached exploration score. Advisory on the wire: recomputed from
    /// `steps` whenever the trail is loaded or exported.
    #[serde(default)]
    pub score: u32,
}

/// Metrics derived from a trail's step log in a single ordered scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailMetrics {
    /// Count of open steps.
    pub outbound_clicks: u32,
    /// Distinct domains across all open steps.
    pub unique_domains: BTreeSet<String>,
    /// Count of branch steps.
    pub depth: u32,
}

impl TrailMetrics {
    /// Number of distinct domains visited.
    pub fn domain_count(&self) -> usize {
        self.unique_domains.len()
    }
}

impl Trail {
    /// Start a new trail with a fresh id and an empty step log.
    ///
    /// The query may be empty; starting a trail without one is allowed.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.into(),
            created_at: Utc::now(),
            steps: Vec::new(),
            score: 0,
        }
    }

    /// Append a step, producing the next trail snapshot.
    ///
    /// All prior steps are preserved unchanged; the score cache is
    /// recomputed so it always equals [`exploration_score`] of the log.
    /// Persisting the step anywhere else is the caller's concern and must
    /// not block on this value.
    #[must_use]
    pub fn append(mut self, step: TrailStep) -> Self {
        self.steps.push(step);
        self.score = exploration_score(&self.steps);
        self
    }

    /// Derive metrics by scanning the step log once, in order.
    pub fn metrics(&self) -> TrailMetrics {
        let mut metrics = TrailMetrics::default();
        for step in &self.steps {
            match step {
                TrailStep::Open { domain, .. } => {
                    metrics.outbound_clicks += 1;
                    metrics.unique_domains.insert(domain.clone());
                }
                TrailStep::Branch { .. } => metrics.depth += 1,
                // Notes affect the score but none of the navigation metrics.
                TrailStep::Note { .. } => {}
            }
        }
        metrics
    }

    /// Load a fully materialized trail, recomputing everything derived.
    ///
    /// This is the only path by which derived metrics enter the system;
    /// whatever score the input carried is discarded. Idempotent: loading
    /// the same trail twice yields identical metrics.
    pub fn load(mut self) -> (Self, TrailMetrics) {
        let metrics = self.metrics();
        self.score = exploration_score(&self.steps);
        (self, metrics)
    }

    /// Exploration score, recomputed from the step log.
    pub fn exploration_score(&self) -> u32 {
        exploration_score(&self.steps)
    }

    /// Serialize the trail to its lossless textual form.
    ///
    /// The score cache is refreshed first so the emitted value matches the
    /// step log; [`Trail::import_from_text`] recomputes it regardless.
    pub fn export_to_text(&self) -> TrailResult<String> {
        let mut snapshot = self.clone();
        snapshot.score = exploration_score(&snapshot.steps);
        serde_json::to_string_pretty(&snapshot).map_err(TrailError::Serialize)
    }

    /// Parse a trail from its textual form.
    ///
    /// Fails with [`TrailError::MalformedTrailData`] when the text is not
    /// well-formed or is missing required fields. Derived metrics come
    /// from [`Trail::load`], never from the parsed payload, so a tampered
    /// or stale export cannot corrupt them.
    pub fn import_from_text(text: &str) -> TrailResult<Self> {
        let trail: Trail =
            serde_json::from_str(text).map_err(|e| TrailError::MalformedTrailData {
                message: e.to_string(),
            })?;
        let (trail, _) = trail.load();
        Ok(trail)
    }
}
