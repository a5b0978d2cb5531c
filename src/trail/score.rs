//! Exploration score computation.
//!
//! The score rewards branching, domain diversity, primary-source visits,
//! and note-taking, and penalizes repeat visits to the same domain. It is
//! a pure function of the step log: two trails with equal steps always
//! score the same.

use std::collections::HashMap;

use super::TrailStep;

const BRANCH_WEIGHT: f64 = 10.0;
const DOMAIN_WEIGHT: f64 = 6.0;
const PRIMARY_WEIGHT: f64 = 8.0;
const NOTE_WEIGHT: f64 = 4.0;
const RETURN_BONUS: f64 = 12.0;
const REPEAT_PENALTY: f64 = 5.0;

/// Case-sensitive substring markers, not exact domain matches.
const PRIMARY_MARKERS: [&str; 2] = ["wikipedia", "arxiv"];

/// Depth (branch count) beyond which the return bonus applies.
const RETURN_DEPTH: usize = 2;

/// Compute the exploration score for a step log.
///
/// `10·log2(1+branches) + 6·log2(1+domains) + 8·primaryClicks + 4·notes
/// + 12·returns − 5·sameDomainRepeats`, rounded to the nearest integer
/// (half away from zero, via [`f64::round`]) and clamped at zero. The
/// empty log scores 0.
pub fn exploration_score(steps: &[TrailStep]) -> u32 {
    let mut branches = 0usize;
    let mut notes = 0usize;
    let mut primary_clicks = 0usize;
    let mut domain_visits: HashMap<&str, usize> = HashMap::new();

    for step in steps {
        match step {
            TrailStep::Open { domain, .. } => {
                *domain_visits.entry(domain.as_str()).or_insert(0) += 1;
                if PRIMARY_MARKERS.iter().any(|m| domain.contains(m)) {
                    primary_clicks += 1;
                }
            }
            TrailStep::Branch { .. } => branches += 1,
            TrailStep::Note { .. } => notes += 1,
        }
    }

    let domain_count = domain_visits.len();
    let returns = if branches > RETURN_DEPTH { 1.0 } else { 0.0 };

    // Total visits beyond the first to any repeated domain.
    let same_domain_repeats: usize = domain_visits
        .values()
        .filter(|&&count| count > 1)
        .map(|&count| count - 1)
        .sum();

    let raw = BRANCH_WEIGHT * (1.0 + branches as f64).log2()
        + DOMAIN_WEIGHT * (1.0 + domain_count as f64).log2()
        + PRIMARY_WEIGHT * primary_clicks as f64
        + NOTE_WEIGHT * notes as f64
        + RETURN_BONUS * returns
        - REPEAT_PENALTY * same_domain_repeats as f64;

    raw.round().max(0.0) as u32
}
