use super::{exploration_score, TrailStep};

fn open(domain: &str) -> TrailStep {
    TrailStep::open(format!("https://{domain}/page"), "A page", domain)
}

#[test]
fn test_empty_log_scores_zero() {
    assert_eq!(exploration_score(&[]), 0);
}

#[test]
fn test_single_primary_open() {
    // 6*log2(2) + 8 = 14
    let steps = vec![open("arxiv.org")];
    assert_eq!(exploration_score(&steps), 14);
}

#[test]
fn test_repeat_domain_with_branch() {
    // branches=1, domains=1, repeats=1: 10 + 6 - 5 = 11
    let steps = vec![
        open("reddit.com"),
        open("reddit.com"),
        TrailStep::branch("related question"),
    ];
    assert_eq!(exploration_score(&steps), 11);
}

#[test]
fn test_single_note() {
    let steps = vec![TrailStep::note("worth revisiting")];
    assert_eq!(exploration_score(&steps), 4);
}

#[test]
fn test_branch_and_note() {
    // 10*log2(2) + 4 = 14
    let steps = vec![TrailStep::branch("pivot"), TrailStep::note("why pivot")];
    assert_eq!(exploration_score(&steps), 14);
}

#[test]
fn test_return_bonus_requires_depth_over_two() {
    let two = vec![TrailStep::branch("a"), TrailStep::branch("b")];
    // 10*log2(3) = 15.849... -> 16, no bonus at depth 2
    assert_eq!(exploration_score(&two), 16);

    let three = vec![
        TrailStep::branch("a"),
        TrailStep::branch("b"),
        TrailStep::branch("c"),
    ];
    // 10*log2(4) + 12 = 32
    assert_eq!(exploration_score(&three), 32);
}

#[test]
fn test_negative_raw_clamps_to_zero() {
    // domains=1 (+6), repeats=2 (-10): raw = -4
    let steps = vec![open("example.com"), open("example.com"), open("example.com")];
    assert_eq!(exploration_score(&steps), 0);
}

#[test]
fn test_primary_match_is_substring_not_exact() {
    // Subdomains and lookalikes both count; the marker is a substring.
    let steps = vec![open("en.wikipedia.org"), open("my-arxiv-mirror.net")];
    // domains=2 (+6*log2(3)=9.509), primary=2 (+16): 25.509 -> 26
    assert_eq!(exploration_score(&steps), 26);
}

#[test]
fn test_primary_match_is_case_sensitive() {
    let steps = vec![open("WIKIPEDIA.org")];
    // Not a primary click; only the domain diversity term applies.
    assert_eq!(exploration_score(&steps), 6);
}

#[test]
fn test_score_is_deterministic() {
    let steps = vec![
        open("wikipedia.org"),
        TrailStep::branch("follow-up"),
        TrailStep::note("note"),
        open("arxiv.org"),
    ];
    assert_eq!(exploration_score(&steps), exploration_score(&steps));
}

#[test]
fn test_repeats_sum_across_domains() {
    // a.com x3 and b.com x2: repeats = 2 + 1 = 3
    let steps = vec![
        open("a.com"),
        open("a.com"),
        open("a.com"),
        open("b.com"),
        open("b.com"),
    ];
    // domains=2: 6*log2(3)=9.509; penalty 15; raw = -5.49 -> 0
    assert_eq!(exploration_score(&steps), 0);
}
