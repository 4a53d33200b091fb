use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAwardRepository, InMemoryNotificationPublisher};
use crate::routes::with_sourcing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sourcing_engine::config::AppConfig;
use sourcing_engine::error::AppError;
use sourcing_engine::telemetry;
use sourcing_engine::workflows::sourcing::premiacao::PremiacaoService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        scoring: config.scoring.clone(),
    };

    let repository = Arc::new(InMemoryAwardRepository::default());
    let notifications = Arc::new(InMemoryNotificationPublisher::default());
    let premiacao_service = Arc::new(PremiacaoService::new(
        repository,
        notifications,
        config.scoring.clone(),
    ));

    let app = with_sourcing_routes(premiacao_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_profile = %config.scoring.default_profile,
        "sourcing engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
