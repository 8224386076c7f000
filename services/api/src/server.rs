use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pawhaven::catalog::seed_sample_data;
use pawhaven::config::AppConfig;
use pawhaven::error::AppError;
use pawhaven::notifications::TracingMailer;
use pawhaven::store::RecordStore;
use pawhaven::telemetry;
use pawhaven::Platform;
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
    if args.seed {
        config.seed_sample_data = true;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let platform = Platform::new(
        Arc::new(RecordStore::new()),
        Arc::new(TracingMailer),
        config.email.clone(),
        config.pagination,
    );
    if config.seed_sample_data {
        let summary = seed_sample_data(&platform)?;
        info!(
            skipped = summary.skipped,
            pets = summary.pets,
            "sample data step finished"
        );
    }

    let app = with_operational_routes(platform.router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pet adoption platform ready");

    axum::serve(listener, app).await?;
    Ok(())
}
