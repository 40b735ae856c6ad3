use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use pursuit_crm::auth::{AccessService, AuthContext};
use pursuit_crm::config::AppConfig;
use pursuit_crm::error::AppError;
use pursuit_crm::telemetry;
use pursuit_crm::workflows::gzero::GzeroAssessmentService;
use pursuit_crm::workflows::pipeline::PipelineService;

use crate::cli::ServeArgs;
use crate::infra::{
    scoring_engine, seed_admin, AppState, DomainHandles, InMemoryAssessmentRepository,
    InMemoryAuditLog, InMemoryPipelineRepository, InMemorySessionStore, InMemoryUserDirectory,
};
use crate::routes::with_domain_routes;

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

    let assessments = Arc::new(InMemoryAssessmentRepository::default());
    let registry = Arc::new(InMemoryPipelineRepository::default());
    let directory = Arc::new(InMemoryUserDirectory::default());
    let sessions = Arc::new(InMemorySessionStore::default());
    let audit = Arc::new(InMemoryAuditLog::default());

    seed_admin(&directory, &config.access.admin_access_code);

    let gzero = Arc::new(GzeroAssessmentService::new(
        assessments.clone(),
        audit.clone(),
        scoring_engine(&config),
    ));
    let pipeline = Arc::new(PipelineService::new(
        registry.clone(),
        gzero.clone(),
        audit.clone(),
    ));
    let access = Arc::new(AccessService::new(
        directory,
        sessions.clone(),
        audit.clone(),
    ));

    let handles = DomainHandles {
        assessments,
        registry,
        audit,
        engine: Arc::new(scoring_engine(&config)),
    };

    let app = with_domain_routes(
        gzero,
        pipeline,
        access,
        AuthContext::new(sessions),
        handles,
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pursuit crm api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
