use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::super::domain::EventId;
use super::repository::{AwardRepository, NotificationPublisher, RepositoryError};
use super::service::{
    AdjudicationRequest, ComparativeMapRequest, DefaultsRequest, EconomyRequest,
    FinalizationRequest, PremiacaoService, PremiacaoServiceError, RankingRequest,
};

/// Router exposing the comparative map, scoring helpers and premiação endpoints.
pub fn premiacao_router<R, N>(service: Arc<PremiacaoService<R, N>>) -> Router
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/sourcing/scenarios", get(scenarios_handler::<R, N>))
        .route("/api/v1/sourcing/defaults", post(defaults_handler::<R, N>))
        .route("/api/v1/sourcing/ranking", post(ranking_handler::<R, N>))
        .route("/api/v1/sourcing/economy", post(economy_handler::<R, N>))
        .route(
            "/api/v1/sourcing/adjudication",
            post(adjudication_handler::<R, N>),
        )
        .route(
            "/api/v1/sourcing/comparative-map",
            post(comparative_map_handler::<R, N>),
        )
        .route(
            "/api/v1/sourcing/events/:event_id/premiacao",
            post(finalize_handler::<R, N>).get(award_handler::<R, N>),
        )
        .with_state(service)
}

/// HTTP status for a service error, shared with `AppError` responses.
pub(crate) fn status_for(error: &PremiacaoServiceError) -> StatusCode {
    match error {
        PremiacaoServiceError::Configuration(_)
        | PremiacaoServiceError::Adjudication(_)
        | PremiacaoServiceError::MissingApprover => StatusCode::UNPROCESSABLE_ENTITY,
        PremiacaoServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PremiacaoServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PremiacaoServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: PremiacaoServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, PremiacaoServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scenarios_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    (StatusCode::OK, axum::Json(service.scenarios())).into_response()
}

pub(crate) async fn defaults_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    axum::Json(request): axum::Json<DefaultsRequest>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.defaults(&request))
}

pub(crate) async fn ranking_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    axum::Json(request): axum::Json<RankingRequest>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.rank(request))
}

pub(crate) async fn economy_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    axum::Json(request): axum::Json<EconomyRequest>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.economy(&request))
}

pub(crate) async fn adjudication_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    axum::Json(request): axum::Json<AdjudicationRequest>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.adjudicate(&request))
}

pub(crate) async fn comparative_map_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    axum::Json(request): axum::Json<ComparativeMapRequest>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.comparative_map(request))
}

pub(crate) async fn finalize_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    Path(event_id): Path<String>,
    axum::Json(request): axum::Json<FinalizationRequest>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let event_id = EventId(event_id);
    respond(StatusCode::CREATED, service.finalize(&event_id, request))
}

pub(crate) async fn award_handler<R, N>(
    State(service): State<Arc<PremiacaoService<R, N>>>,
    Path(event_id): Path<String>,
) -> Response
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = EventId(event_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(PremiacaoServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "event_id": id.0,
                "error": "event has no finalized award",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}
