//! Axum route handlers for the polarity HTTP server.
//!
//! # Routes
//!
//! - `GET    /health`                  — Liveness probe
//! - `GET    /traits`                  — Trait listing with time estimates
//! - `POST   /sessions`                — Start an assessment session
//! - `GET    /sessions/{id}`           — Session progress
//! - `DELETE /sessions/{id}`           — Discard a session (reset)
//! - `POST   /sessions/{id}/answers`   — Record one answer
//! - `POST   /sessions/{id}/analysis`  — Assemble payload, forward to the analysis service
//! - `POST   /sessions/{id}/report`    — Forward payload + analysis to the report service
//!
//! Sessions live only in process memory; discarding one is irreversible and
//! the handlers perform no implicit autosave. Service failures map to 502
//! without touching session state, so re-invoking the action retries with
//! the already-captured answers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::catalog::{self, Catalog, PoleValue, Question};
use crate::payload::assemble;
use crate::selection::{trait_listing, TraitSelection};
use crate::services::{AnalysisClient, ReportClient};
use crate::session::AssessmentSession;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The immutable trait catalog.
    pub catalog: &'static Catalog,
    /// In-memory sessions keyed by id. Nothing survives the process.
    pub sessions: Arc<DashMap<Uuid, AssessmentSession>>,
    /// Client for the external analysis service.
    pub analysis: Arc<AnalysisClient>,
    /// Client for the external report service.
    pub report: Arc<ReportClient>,
}

impl AppState {
    /// State with clients configured from the environment.
    pub fn new() -> Self {
        Self::with_clients(AnalysisClient::from_env(), ReportClient::from_env())
    }

    /// State with explicit service clients.
    pub fn with_clients(analysis: AnalysisClient, report: ReportClient) -> Self {
        Self {
            catalog: catalog::catalog(),
            sessions: Arc::new(DashMap::new()),
            analysis: Arc::new(analysis),
            report: Arc::new(report),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/traits", get(list_traits_handler))
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(session_progress_handler).delete(discard_session_handler),
        )
        .route("/sessions/{id}/answers", post(answer_handler))
        .route("/sessions/{id}/analysis", post(analysis_handler))
        .route("/sessions/{id}/report", post(report_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type HandlerError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

fn session_not_found(id: Uuid) -> HandlerError {
    error_body(StatusCode::NOT_FOUND, format!("Session '{}' not found", id))
}

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    #[serde(default)]
    selected_traits: Vec<String>,
}

/// A pooled question in presentation order, tagged with its owning trait.
#[derive(Serialize)]
struct SessionQuestionView<'a> {
    #[serde(rename = "trait")]
    trait_key: &'a str,
    #[serde(flatten)]
    question: &'a Question,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCreatedResponse<'a> {
    session_id: Uuid,
    total_questions: usize,
    estimated_minutes: u32,
    questions: Vec<SessionQuestionView<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    question_id: String,
    value: PoleValue,
}

fn progress_body(session: &AssessmentSession) -> Value {
    serde_json::json!({
        "sessionId": session.id(),
        "complete": session.is_complete(),
        "answered": session.answered_count(),
        "total": session.total_questions(),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "polarity",
    }))
}

/// GET /traits — the catalog's axes with question counts and estimates.
async fn list_traits_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "traits": trait_listing(state.catalog) }))
}

/// POST /sessions — validate the selection and start a session.
///
/// Returns 422 on an empty or unknown selection; no session is created in
/// that case.
async fn create_session_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Response, HandlerError> {
    let selection = TraitSelection::new(state.catalog, &request.selected_traits)
        .map_err(|e| error_body(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let session = AssessmentSession::start(state.catalog, &selection);
    let session_id = session.id();
    let estimated_minutes = selection.estimated_minutes(state.catalog);

    tracing::info!(
        session_id = %session_id,
        traits = selection.len(),
        questions = session.total_questions(),
        "assessment session started"
    );

    let body = {
        let questions = session.questions_in_order(state.catalog);
        let response = SessionCreatedResponse {
            session_id,
            total_questions: session.total_questions(),
            estimated_minutes,
            questions: questions
                .iter()
                .map(|presented| SessionQuestionView {
                    trait_key: presented.trait_key,
                    question: presented.question,
                })
                .collect(),
        };
        serde_json::to_value(&response)
            .map_err(|e| error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    };

    state.sessions.insert(session_id, session);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /sessions/{id} — completeness flag and progress counters.
async fn session_progress_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HandlerError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(progress_body(&session)))
}

/// DELETE /sessions/{id} — the reset operation. Discards answers, order and
/// pool unconditionally.
async fn discard_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    state
        .sessions
        .remove(&id)
        .ok_or_else(|| session_not_found(id))?;
    tracing::info!(session_id = %id, "assessment session discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/{id}/answers — record one answer and return progress.
///
/// Re-answering a question overwrites the prior value; 422 when the
/// question does not belong to the session's pool.
async fn answer_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<Value>, HandlerError> {
    let mut session = state
        .sessions
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))?;

    session
        .answer(&request.question_id, request.value)
        .map_err(|e| error_body(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    Ok(Json(progress_body(&session)))
}

/// POST /sessions/{id}/analysis — completeness-gated submission to the
/// analysis service.
///
/// 409 while any question is unanswered (no outbound request is made).
/// On success the opaque result is cached on the session for later report
/// generation and returned verbatim. 502 if the service fails; session
/// state is untouched and the action can simply be re-invoked.
async fn analysis_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HandlerError> {
    let payload = {
        let session = state
            .sessions
            .get(&id)
            .ok_or_else(|| session_not_found(id))?;
        assemble(&session, state.catalog)
            .map_err(|e| error_body(StatusCode::CONFLICT, e.to_string()))?
    };

    let result = state.analysis.analyze(&payload).await.map_err(|e| {
        tracing::warn!(session_id = %id, error = %e, "analysis request failed");
        error_body(StatusCode::BAD_GATEWAY, "Analysis request failed")
    })?;

    if let Some(mut session) = state.sessions.get_mut(&id) {
        session.record_analysis(result.clone());
    }

    Ok(Json(result))
}

/// POST /sessions/{id}/report — forward the payload plus the cached
/// analysis result to the report service and relay the artifact.
///
/// 409 until an analysis result has been received for the session.
async fn report_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, HandlerError> {
    let (payload, analysis) = {
        let session = state
            .sessions
            .get(&id)
            .ok_or_else(|| session_not_found(id))?;
        let analysis = session.analysis().cloned().ok_or_else(|| {
            error_body(
                StatusCode::CONFLICT,
                "No analysis result available; request analysis first",
            )
        })?;
        let payload = assemble(&session, state.catalog)
            .map_err(|e| error_body(StatusCode::CONFLICT, e.to_string()))?;
        (payload, analysis)
    };

    let artifact = state.report.render(&payload, &analysis).await.map_err(|e| {
        tracing::warn!(session_id = %id, error = %e, "report request failed");
        error_body(StatusCode::BAD_GATEWAY, "Report request failed")
    })?;

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        ),
    ];
    Ok((headers, artifact.bytes).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
