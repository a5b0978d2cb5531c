use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::SharedState;
use crate::error::{RpcError, RpcResult, StorageError};
use crate::search::{Bucket, Provider, SearchSource, SourceCard};
use crate::storage::Storage;
use crate::tangents::{TangentContext, TangentSource};
use crate::trail::{Trail, TrailStep};

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        // Trail lifecycle
        "trail_start" => handle_trail_start(state, arguments).await,
        "trail_open_source" => handle_trail_open_source(state, arguments).await,
        "trail_branch" => handle_trail_branch(state, arguments).await,
        "trail_note" => handle_trail_note(state, arguments).await,
        "trail_summary" => handle_trail_summary(state).await,
        // Sharing
        "trail_export" => handle_trail_export(state).await,
        "trail_import" => handle_trail_import(state, arguments).await,
        "trail_load" => handle_trail_load(state, arguments).await,
        // Collaborators
        "search_sources" => handle_search_sources(state, arguments).await,
        "search_configure" => handle_search_configure(state, arguments).await,
        "tangents_generate" => handle_tangents_generate(state, arguments).await,
        _ => Err(RpcError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Summary of a trail returned by several tools.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailSummary {
    /// Trail identifier.
    pub trail_id: String,
    /// The query that anchors the trail.
    pub query: String,
    /// When the trail was started.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Exploration score, recomputed from the step log.
    pub score: u32,
    /// Total recorded steps.
    pub step_count: usize,
    /// Count of open steps.
    pub outbound_clicks: u32,
    /// Distinct domains across open steps.
    pub unique_domains: Vec<String>,
    /// Count of branch steps.
    pub depth: u32,
}

impl TrailSummary {
    fn of(trail: &Trail) -> Self {
        let metrics = trail.metrics();
        Self {
            trail_id: trail.id.clone(),
            query: trail.query.clone(),
            created_at: trail.created_at,
            score: trail.exploration_score(),
            step_count: trail.steps.len(),
            outbound_clicks: metrics.outbound_clicks,
            unique_domains: metrics.unique_domains.into_iter().collect(),
            depth: metrics.depth,
        }
    }
}

/// Result of appending a step to the active trail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepAppended {
    trail_id: String,
    step_count: usize,
    score: u32,
}

fn no_active_trail() -> RpcError {
    RpcError::ExecutionFailed {
        message: "No active trail; start one with trail_start".to_string(),
    }
}

/// Append a step to the active trail and kick off its background write.
///
/// The in-memory append is the source of truth. The storage write is
/// detached and never awaited by the caller; failure is logged and the
/// trail state stands.
async fn append_to_active(state: &SharedState, step: TrailStep) -> RpcResult<StepAppended> {
    let mut session = state.session.lock().await;
    let trail = session.trail.take().ok_or_else(no_active_trail)?;

    let trail_id = trail.id.clone();
    let next = trail.append(step.clone());
    let result = StepAppended {
        trail_id: trail_id.clone(),
        step_count: next.steps.len(),
        score: next.score,
    };
    session.trail = Some(next);
    drop(session);

    let storage = state.storage.clone();
    tokio::spawn(async move {
        if let Err(e) = storage.append_step(&trail_id, &step).await {
            warn!(trail_id = %trail_id, error = %e, "Background step persistence failed");
        }
    });

    Ok(result)
}

/// Handle trail_start tool call
async fn handle_trail_start(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct StartParams {
        query: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct StartResult {
        trail: Trail,
        cards: Vec<SourceCard>,
        #[serde(skip_serializing_if = "Option::is_none")]
        search_error: Option<String>,
    }

    let params: StartParams = parse_arguments("trail_start", arguments)?;

    let trail = Trail::new(params.query);

    // Recording the fresh trail is best-effort; a storage failure must
    // not prevent the session from exploring.
    if let Err(e) = state.storage.create_trail(&trail).await {
        warn!(trail_id = %trail.id, error = %e, "Failed to record new trail");
    }

    let mut session = state.session.lock().await;
    session.trail = Some(trail.clone());
    let settings = session.settings.clone();
    drop(session);

    info!(trail_id = %trail.id, query = %trail.query, "Trail started");

    let (cards, search_error) = match state.search.search(&trail.query, &settings).await {
        Ok(cards) => (cards, None),
        Err(e) => {
            warn!(trail_id = %trail.id, error = %e, "Initial search failed");
            (Vec::new(), Some(e.to_string()))
        }
    };

    serde_json::to_value(StartResult {
        trail,
        cards,
        search_error,
    })
    .map_err(RpcError::Json)
}

/// Handle trail_open_source tool call
async fn handle_trail_open_source(
    state: &SharedState,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct OpenParams {
        url: String,
        title: String,
        domain: String,
    }

    let params: OpenParams = parse_arguments("trail_open_source", arguments)?;
    let step = TrailStep::open(params.url, params.title, params.domain);

    let result = append_to_active(state, step).await?;
    serde_json::to_value(result).map_err(RpcError::Json)
}

/// Handle trail_branch tool call
async fn handle_trail_branch(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct BranchParams {
        query: String,
    }

    let params: BranchParams = parse_arguments("trail_branch", arguments)?;
    let step = TrailStep::branch(params.query);

    let result = append_to_active(state, step).await?;
    serde_json::to_value(result).map_err(RpcError::Json)
}

/// Handle trail_note tool call
async fn handle_trail_note(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct NoteParams {
        text: String,
    }

    let params: NoteParams = parse_arguments("trail_note", arguments)?;
    let step = TrailStep::note(params.text);

    let result = append_to_active(state, step).await?;
    serde_json::to_value(result).map_err(RpcError::Json)
}

/// Handle trail_summary tool call
async fn handle_trail_summary(state: &SharedState) -> RpcResult<Value> {
    let session = state.session.lock().await;
    let trail = session.trail.as_ref().ok_or_else(no_active_trail)?;

    serde_json::to_value(TrailSummary::of(trail)).map_err(RpcError::Json)
}

/// Handle trail_export tool call
async fn handle_trail_export(state: &SharedState) -> RpcResult<Value> {
    #[derive(Debug, Serialize)]
    struct ExportResult {
        text: String,
    }

    let session = state.session.lock().await;
    let trail = session.trail.as_ref().ok_or_else(no_active_trail)?;

    let text = trail.export_to_text().map_err(|e| RpcError::ExecutionFailed {
        message: e.to_string(),
    })?;

    serde_json::to_value(ExportResult { text }).map_err(RpcError::Json)
}

/// Handle trail_import tool call
async fn handle_trail_import(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct ImportParams {
        text: String,
    }

    let params: ImportParams = parse_arguments("trail_import", arguments)?;

    // Parse and recompute before touching the session: a malformed
    // import leaves the current trail exactly as it was.
    let trail = Trail::import_from_text(&params.text).map_err(|e| RpcError::ExecutionFailed {
        message: e.to_string(),
    })?;

    if let Err(e) = state.storage.save_trail(&trail).await {
        warn!(trail_id = %trail.id, error = %e, "Failed to record imported trail");
    }

    let summary = TrailSummary::of(&trail);

    let mut session = state.session.lock().await;
    session.trail = Some(trail);
    drop(session);

    info!(trail_id = %summary.trail_id, "Trail imported");

    serde_json::to_value(summary).map_err(RpcError::Json)
}

/// Handle trail_load tool call
async fn handle_trail_load(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct LoadParams {
        trail_id: String,
    }

    let params: LoadParams = parse_arguments("trail_load", arguments)?;

    let stored = state
        .storage
        .get_trail(&params.trail_id)
        .await
        .map_err(|e| RpcError::ExecutionFailed {
            message: e.to_string(),
        })?;

    // Absence is an error surfaced to the caller; the active trail is
    // not replaced by a trail that does not exist.
    let stored = stored.ok_or_else(|| RpcError::ExecutionFailed {
        message: StorageError::TrailNotFound {
            trail_id: params.trail_id.clone(),
        }
        .to_string(),
    })?;

    let (trail, _) = stored.load();
    let summary = TrailSummary::of(&trail);

    let mut session = state.session.lock().await;
    session.trail = Some(trail);
    drop(session);

    info!(trail_id = %summary.trail_id, "Trail loaded");

    serde_json::to_value(summary).map_err(RpcError::Json)
}

/// Handle search_sources tool call
async fn handle_search_sources(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    #[derive(Debug, Deserialize)]
    struct SearchSourcesParams {
        query: String,
        k: Option<usize>,
        lambda: Option<f64>,
        sigma: Option<f64>,
        provider: Option<Provider>,
        buckets: Option<Vec<Bucket>>,
        contrarian: Option<bool>,
    }

    #[derive(Debug, Serialize)]
    struct SearchResult {
        cards: Vec<SourceCard>,
    }

    let params: SearchSourcesParams = parse_arguments("search_sources", arguments)?;

    let session = state.session.lock().await;
    let mut search_params = session.settings.clone();
    drop(session);

    if let Some(k) = params.k {
        search_params.k = k;
    }
    if let Some(lambda) = params.lambda {
        search_params.lambda = lambda;
    }
    if let Some(sigma) = params.sigma {
        search_params.sigma = sigma;
    }
    if let Some(provider) = params.provider {
        search_params.provider = provider;
    }
    if let Some(buckets) = params.buckets {
        search_params.buckets = buckets;
    }
    if let Some(contrarian) = params.contrarian {
        search_params.contrarian = contrarian;
    }

    let cards = state
        .search
        .search(&params.query, &search_params)
        .await
        .map_err(|e| RpcError::ExecutionFailed {
            message: e.to_string(),
        })?;

    serde_json::to_value(SearchResult { cards }).map_err(RpcError::Json)
}

/// Handle search_configure tool call
async fn handle_search_configure(
    state: &SharedState,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    #[derive(Debug, Default, Deserialize)]
    struct ConfigureParams {
        k: Option<usize>,
        lambda: Option<f64>,
        sigma: Option<f64>,
        provider: Option<Provider>,
        buckets: Option<Vec<Bucket>>,
        contrarian: Option<bool>,
    }

    // All fields are optional; a missing arguments object means "no changes".
    let params: ConfigureParams = match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| RpcError::InvalidParameters {
            tool_name: "search_configure".to_string(),
            message: e.to_string(),
        })?,
        None => ConfigureParams::default(),
    };

    let mut session = state.session.lock().await;
    if let Some(k) = params.k {
        session.settings.k = k;
    }
    if let Some(lambda) = params.lambda {
        session.settings.lambda = lambda;
    }
    if let Some(sigma) = params.sigma {
        session.settings.sigma = sigma;
    }
    if let Some(provider) = params.provider {
        session.settings.provider = provider;
    }
    if let Some(buckets) = params.buckets {
        session.settings.buckets = buckets;
    }
    if let Some(contrarian) = params.contrarian {
        session.settings.contrarian = contrarian;
    }

    let settings = session.settings.clone();
    drop(session);

    serde_json::to_value(settings).map_err(RpcError::Json)
}

/// Handle tangents_generate tool call
async fn handle_tangents_generate(
    state: &SharedState,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    #[derive(Debug, Serialize)]
    struct TangentsResult {
        queries: Vec<String>,
    }

    // Context fields are all optional; no arguments is a valid call.
    let context: TangentContext = match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| RpcError::InvalidParameters {
            tool_name: "tangents_generate".to_string(),
            message: e.to_string(),
        })?,
        None => TangentContext::default(),
    };

    let queries = state
        .tangents
        .generate(&context)
        .await
        .map_err(|e| RpcError::ExecutionFailed {
            message: e.to_string(),
        })?;

    serde_json::to_value(TangentsResult { queries }).map_err(RpcError::Json)
}

/// Parse typed arguments for a tool call
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> RpcResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| RpcError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(RpcError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatabaseConfig, LogFormat, LoggingConfig, SearchDefaults};
    use crate::search::FixtureSearch;
    use crate::storage::SqliteStorage;
    use crate::tangents::PoolTangents;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;

    async fn test_state() -> SharedState {
        let config = Config {
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            search: SearchDefaults::default(),
        };
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        Arc::new(super::super::AppState::new(
            config,
            storage,
            FixtureSearch::new(),
            PoolTangents::new(),
        ))
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let state = test_state().await;
        let err = handle_tool_call(&state, "no_such_tool", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::UnknownTool { .. }));
    }

    #[tokio::test]
    async fn test_trail_start_sets_active_trail() {
        let state = test_state().await;
        let result = handle_tool_call(&state, "trail_start", Some(json!({ "query": "ai" })))
            .await
            .unwrap();

        assert!(result["trail"]["id"].is_string());
        assert_eq!(result["trail"]["query"], "ai");
        assert_eq!(result["trail"]["score"], 0);
        assert!(result["cards"].is_array());

        let session = state.session.lock().await;
        assert!(session.trail.is_some());
    }

    #[tokio::test]
    async fn test_trail_start_replaces_prior_trail() {
        let state = test_state().await;
        let first = handle_tool_call(&state, "trail_start", Some(json!({ "query": "first" })))
            .await
            .unwrap();
        let second = handle_tool_call(&state, "trail_start", Some(json!({ "query": "second" })))
            .await
            .unwrap();

        assert_ne!(first["trail"]["id"], second["trail"]["id"]);

        let session = state.session.lock().await;
        let active = session.trail.as_ref().unwrap();
        assert_eq!(active.query, "second");
        assert!(active.steps.is_empty());
    }

    #[tokio::test]
    async fn test_append_requires_active_trail() {
        let state = test_state().await;
        let err = handle_tool_call(&state, "trail_note", Some(json!({ "text": "hi" })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No active trail"));
    }

    #[tokio::test]
    async fn test_append_steps_accumulate() {
        let state = test_state().await;
        handle_tool_call(&state, "trail_start", Some(json!({ "query": "ai" })))
            .await
            .unwrap();

        handle_tool_call(
            &state,
            "trail_open_source",
            Some(json!({
                "url": "https://arxiv.org/abs/2301.00001",
                "title": "A Paper",
                "domain": "arxiv.org"
            })),
        )
        .await
        .unwrap();

        let result = handle_tool_call(&state, "trail_branch", Some(json!({ "query": "llms" })))
            .await
            .unwrap();

        assert_eq!(result["stepCount"], 2);
        // 10*log2(2) + 6*log2(2) + 8 = 24
        assert_eq!(result["score"], 24);
    }

    #[tokio::test]
    async fn test_trail_summary_reports_metrics() {
        let state = test_state().await;
        handle_tool_call(&state, "trail_start", Some(json!({ "query": "ai" })))
            .await
            .unwrap();
        handle_tool_call(
            &state,
            "trail_open_source",
            Some(json!({
                "url": "https://en.wikipedia.org/wiki/AI",
                "title": "AI - Wikipedia",
                "domain": "wikipedia.org"
            })),
        )
        .await
        .unwrap();
        handle_tool_call(&state, "trail_note", Some(json!({ "text": "dig deeper" })))
            .await
            .unwrap();

        let summary = handle_tool_call(&state, "trail_summary", None).await.unwrap();
        assert_eq!(summary["outboundClicks"], 1);
        assert_eq!(summary["uniqueDomains"], json!(["wikipedia.org"]));
        assert_eq!(summary["depth"], 0);
        assert_eq!(summary["stepCount"], 2);
        // 6*log2(2) + 8 + 4 = 18
        assert_eq!(summary["score"], 18);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let state = test_state().await;
        handle_tool_call(&state, "trail_start", Some(json!({ "query": "ai" })))
            .await
            .unwrap();
        handle_tool_call(&state, "trail_branch", Some(json!({ "query": "agents" })))
            .await
            .unwrap();

        let exported = handle_tool_call(&state, "trail_export", None).await.unwrap();
        let text = exported["text"].as_str().unwrap().to_string();

        // Supersede the trail, then bring the exported one back.
        handle_tool_call(&state, "trail_start", Some(json!({ "query": "other" })))
            .await
            .unwrap();
        let imported = handle_tool_call(&state, "trail_import", Some(json!({ "text": text })))
            .await
            .unwrap();

        assert_eq!(imported["query"], "ai");
        assert_eq!(imported["stepCount"], 1);
        assert_eq!(imported["depth"], 1);
        assert_eq!(imported["score"], 10);
    }

    #[tokio::test]
    async fn test_import_malformed_leaves_active_trail_untouched() {
        let state = test_state().await;
        handle_tool_call(&state, "trail_start", Some(json!({ "query": "keep me" })))
            .await
            .unwrap();

        let err = handle_tool_call(
            &state,
            "trail_import",
            Some(json!({ "text": "{\"id\": \"x\"}" })),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Malformed trail data"));

        let session = state.session.lock().await;
        assert_eq!(session.trail.as_ref().unwrap().query, "keep me");
    }

    #[tokio::test]
    async fn test_load_unknown_trail_keeps_active_trail() {
        let state = test_state().await;
        handle_tool_call(&state, "trail_start", Some(json!({ "query": "keep me" })))
            .await
            .unwrap();

        let err = handle_tool_call(
            &state,
            "trail_load",
            Some(json!({ "trail_id": "missing-id" })),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Trail not found"));

        let session = state.session.lock().await;
        assert_eq!(session.trail.as_ref().unwrap().query, "keep me");
    }

    #[tokio::test]
    async fn test_search_sources_uses_overrides() {
        let state = test_state().await;
        let result = handle_tool_call(
            &state,
            "search_sources",
            Some(json!({ "query": "", "k": 2, "sigma": 0.0 })),
        )
        .await
        .unwrap();

        assert_eq!(result["cards"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_configure_persists_settings() {
        let state = test_state().await;
        let result = handle_tool_call(
            &state,
            "search_configure",
            Some(json!({ "k": 3, "provider": "brave", "buckets": ["primary"] })),
        )
        .await
        .unwrap();

        assert_eq!(result["k"], 3);
        assert_eq!(result["provider"], "brave");

        let session = state.session.lock().await;
        assert_eq!(session.settings.k, 3);
        assert_eq!(session.settings.provider, Provider::Brave);
        assert_eq!(session.settings.buckets, vec![Bucket::Primary]);
    }

    #[tokio::test]
    async fn test_tangents_generate_returns_queries() {
        let state = test_state().await;
        let result = handle_tool_call(
            &state,
            "tangents_generate",
            Some(json!({ "title": "A Paper" })),
        )
        .await
        .unwrap();

        assert_eq!(result["queries"].as_array().unwrap().len(), 3);
    }
}
