use crate::cli::ServeArgs;
use crate::infra::{assessment_service, directory_source, lead_store, AppState};
use crate::routes::with_assessment_routes;
use aura_insight::config::AppConfig;
use aura_insight::error::AppError;
use aura_insight::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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
    };

    let source = directory_source(&config.partners)?;
    let leads = lead_store(&config.leads);
    let assessment_service = assessment_service(&config, source, Arc::clone(&leads));
    if !config.admin.enabled() {
        info!("ADMIN_TOKEN not set; lead administration routes disabled");
    }

    let app = with_assessment_routes(assessment_service, leads, config.admin.token.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        profile = config.scoring.profile.label(),
        leads = %config.leads.path.display(),
        "aura insight intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
