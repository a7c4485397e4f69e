use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use expert_match::config::AppConfig;
use expert_match::error::AppError;
use expert_match::invitations::{InvitationService, SelectionCoordinator};
use expert_match::matching::CandidateRanker;
use expert_match::notifications::EventDispatcher;
use expert_match::router::EngineState;
use expert_match::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{
    default_match_settings, seed_marketplace, AppState, InMemoryDispatchStore,
    InMemoryInviteRepository, InMemoryMarketplace, InMemoryRunStore, LoggingEmailSender,
};
use crate::routes::with_marketplace_routes;

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

    let marketplace = Arc::new(InMemoryMarketplace::default());
    let seeded_brief = seed_marketplace(&marketplace);
    info!(brief_id = %seeded_brief.0, "marketplace seeded");

    let invites = Arc::new(InMemoryInviteRepository::default());
    let runs = Arc::new(InMemoryRunStore::default());
    let dispatch_store = Arc::new(InMemoryDispatchStore::default());
    let email = Arc::new(LoggingEmailSender);

    let engine = Arc::new(EngineState {
        ranker: CandidateRanker::new(marketplace.clone(), runs, default_match_settings()),
        invitations: InvitationService::new(
            invites.clone(),
            config.invites.response_window_hours,
        ),
        selection: SelectionCoordinator::new(invites, marketplace.clone()),
        dispatcher: EventDispatcher::new(dispatch_store, email, marketplace),
    });

    let app = with_marketplace_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "matching engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
