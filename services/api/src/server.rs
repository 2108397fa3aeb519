use crate::cli::ServeArgs;
use crate::infra::{AppState, EventStore};
use crate::routes::with_meeting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use hiperfarma_meeting::config::AppConfig;
use hiperfarma_meeting::error::AppError;
use hiperfarma_meeting::meeting::seed::mock_snapshot;
use hiperfarma_meeting::meeting::{MeetingService, SweepstakeDrawEngine};
use hiperfarma_meeting::telemetry;
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
    if let Some(data_file) = args.data_file.take() {
        config.storage.data_file = Some(data_file);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = EventStore::from_config(&config.storage);
    let storage = repository.describe();
    let meeting_service = Arc::new(MeetingService::new(
        Arc::new(repository),
        SweepstakeDrawEngine::from_config(&config.draw),
    ));

    if config.storage.seed_mock_data && meeting_service.seed_if_empty(mock_snapshot(Utc::now()))? {
        info!(%storage, "empty event seeded with mock data");
    }

    let app = with_meeting_routes(meeting_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, %storage, "business meeting manager ready");

    axum::serve(listener, app).await?;
    Ok(())
}
