use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sourcing_engine::error::AppError;
use sourcing_engine::workflows::planilha::ProposalCsvImporter;
use sourcing_engine::workflows::sourcing::premiacao::{
    premiacao_router, AwardRepository, NotificationPublisher, PremiacaoService,
    PremiacaoServiceError,
};
use sourcing_engine::workflows::sourcing::{preset, ComparativeMap};
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct CsvComparativeMapRequest {
    #[serde(alias = "planilha")]
    pub(crate) proposals_csv: String,
    #[serde(default)]
    pub(crate) profile: Option<String>,
    #[serde(default, alias = "valorEstimado")]
    pub(crate) estimated_value: Option<Decimal>,
}

pub(crate) fn with_sourcing_routes<R, N>(service: Arc<PremiacaoService<R, N>>) -> axum::Router
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    premiacao_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/sourcing/comparative-map/csv",
            axum::routing::post(csv_comparative_map_endpoint),
        )
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

pub(crate) async fn csv_comparative_map_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CsvComparativeMapRequest>,
) -> Result<Json<ComparativeMap>, AppError> {
    let CsvComparativeMapRequest {
        proposals_csv,
        profile,
        estimated_value,
    } = payload;

    let proposals = ProposalCsvImporter::from_reader(Cursor::new(proposals_csv.into_bytes()))?;
    let profile_id = profile.unwrap_or_else(|| state.scoring.default_profile.clone());
    let profile = preset(&profile_id).map_err(PremiacaoServiceError::from)?;

    let map = ComparativeMap::build(
        &proposals,
        profile,
        estimated_value,
        state.scoring.weight_policy,
    )
    .map_err(PremiacaoServiceError::from)?;

    Ok(Json(map))
}
