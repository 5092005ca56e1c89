use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::flow::{FlowError, RawAnswer};
use super::features::AssemblyError;
use super::prediction::{PredictionError, Predictor};
use super::repository::{SessionId, SessionStore, StoreError};
use super::service::{LoanIntakeService, SessionServiceError};

/// Body of an answer submission. A missing answer is treated as blank input.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub answer: Option<RawAnswer>,
}

/// Router builder exposing HTTP endpoints for interview sessions and predictions.
pub fn intake_router<S, P>(service: Arc<LoanIntakeService<S, P>>) -> Router
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    Router::new()
        .route("/api/v1/loan/sessions", post(start_handler::<S, P>))
        .route(
            "/api/v1/loan/sessions/:session_id",
            get(view_handler::<S, P>).delete(end_handler::<S, P>),
        )
        .route(
            "/api/v1/loan/sessions/:session_id/answers",
            post(submit_handler::<S, P>),
        )
        .route(
            "/api/v1/loan/sessions/:session_id/reset",
            post(reset_handler::<S, P>),
        )
        .route(
            "/api/v1/loan/sessions/:session_id/summary",
            get(summary_handler::<S, P>),
        )
        .route(
            "/api/v1/loan/sessions/:session_id/prediction",
            post(prediction_handler::<S, P>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    match service.start() {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn view_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    match service.view(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SubmitAnswerRequest>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    let raw = request
        .answer
        .unwrap_or_else(|| RawAnswer::Text(String::new()));
    match service.submit(&SessionId(session_id), raw) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    match service.reset(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    match service.summary(&SessionId(session_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn prediction_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    match service.predict(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn end_handler<S, P>(
    State(service): State<Arc<LoanIntakeService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    match service.end(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: SessionServiceError) -> Response {
    let status = match &err {
        SessionServiceError::NotFound(_) | SessionServiceError::Store(StoreError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        SessionServiceError::Flow(FlowError::SessionComplete { .. })
        | SessionServiceError::Assembly(AssemblyError::IncompleteSession { .. }) => {
            StatusCode::CONFLICT
        }
        SessionServiceError::Prediction(PredictionError::UnrecognizedLabel(_)) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
