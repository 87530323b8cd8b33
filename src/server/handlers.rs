use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::runtime::{ShaderCacheStats, StageResults, StepRecord};
use crate::server::state::AppState;

/// Pipeline run request
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Engine asset path; the configured default when absent
    #[serde(default)]
    pub asset: Option<String>,
}

/// Pipeline run response
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: String,
    pub serial_number: String,
    pub asset: String,
    pub imported: bool,
    pub results: StageResults,
    pub steps: Vec<StepRecord>,
}

#[derive(Serialize)]
struct PipelineStatus<'a> {
    version: &'a str,
    serial_number: &'a str,
    build_time: &'a str,
    host: &'a str,
    uptime_secs: i64,
    runs_completed: u64,
    caches: ShaderCacheStats,
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Pipeline status endpoint
pub async fn status(State(state): State<AppState>) -> Response {
    let coordinator = &state.coordinator;
    let build = coordinator.build_info();
    let status = PipelineStatus {
        version: &coordinator.config().slizzai_version,
        serial_number: &build.serial_number,
        build_time: &build.build_time,
        host: &build.host,
        uptime_secs: state.uptime_secs(),
        runs_completed: coordinator.runs_completed(),
        caches: coordinator.cache_stats(),
    };
    Json(status).into_response()
}

/// Parse a run request; an empty body means "use the defaults"
fn parse_run_request(body: &[u8]) -> Result<RunRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunRequest::default());
    }
    serde_json::from_slice(body)
}

/// Run the pipeline over one asset
pub async fn run_pipeline(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Extract run ID from headers or generate new one
    let run_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let request = match parse_run_request(&body) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid run request: {}", e))
                .into_response();
        }
    };

    let asset = request
        .asset
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| state.default_asset().to_string());

    let run = state.coordinator.run_report(&asset).await;
    let imported = run.is_some();
    let run = run.unwrap_or_default();

    let response = RunResponse {
        run_id: run_id.to_string(),
        serial_number: state.coordinator.build_info().serial_number.clone(),
        asset,
        imported,
        results: run.results,
        steps: run.steps,
    };

    Json(response).into_response()
}
