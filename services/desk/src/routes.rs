use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use school_desk::error::AppError;
use school_desk::ingest::{parse_admissions, AdmissionBatch, IngestError, Sheet, SheetFormat};
use school_desk::scoring::{
    monthly_standings, Cohort, CohortSummary, MonthlyStanding, Report, SchemePolicy, Solution,
    TestResult, TestScorer,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_TOPPERS: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreRequest {
    pub(crate) solutions: Vec<Solution>,
    pub(crate) reports: Vec<Report>,
    #[serde(default)]
    pub(crate) top: Option<usize>,
    /// Overrides the configured policy for this request.
    #[serde(default)]
    pub(crate) policy: Option<SchemePolicy>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoredCohort {
    #[serde(flatten)]
    pub(crate) cohort: Cohort,
    pub(crate) summary: CohortSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreResponse {
    pub(crate) cohorts: Vec<ScoredCohort>,
    pub(crate) monthly: Vec<MonthlyStanding>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdmissionsPreviewRequest {
    pub(crate) csv: String,
}

pub(crate) fn desk_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/results/score", post(score_endpoint))
        .route("/api/v1/admissions/preview", post(admissions_preview_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let ScoreRequest {
        solutions,
        reports,
        top,
        policy,
    } = payload;

    let policy = policy.unwrap_or(state.marking_policy);
    let top = top.unwrap_or(DEFAULT_TOPPERS);
    let cohorts = TestScorer::new(solutions, policy).score(&reports)?;

    let all_results: Vec<TestResult> = cohorts
        .iter()
        .flat_map(|cohort| cohort.results.iter().cloned())
        .collect();
    let monthly = monthly_standings(&all_results);

    let cohorts = cohorts
        .into_iter()
        .map(|cohort| ScoredCohort {
            summary: cohort.summary(top),
            cohort,
        })
        .collect();

    Ok(Json(ScoreResponse { cohorts, monthly }))
}

pub(crate) async fn admissions_preview_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AdmissionsPreviewRequest>,
) -> Result<Json<AdmissionBatch>, AppError> {
    let size = payload.csv.len() as u64;
    if size > state.max_upload_bytes {
        return Err(IngestError::TooLarge {
            size,
            limit: state.max_upload_bytes,
        }
        .into());
    }

    let sheet = Sheet::from_bytes(payload.csv.into_bytes(), SheetFormat::Csv)?;
    Ok(Json(parse_admissions(&sheet)?))
}
