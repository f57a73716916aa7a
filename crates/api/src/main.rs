use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upgrader_api::background;
use upgrader_api::config::ServerConfig;
use upgrader_api::notifications::ObserverRegistry;
use upgrader_api::router::build_app_router;
use upgrader_api::state::AppState;
use upgrader_automation::{
    AutomationConfig, DataManagementApi, DesignAutomationApi, StaticToken, TokenSource,
};
use upgrader_core::registry::WorkitemRegistry;
use upgrader_events::{EventBus, NotificationSink};
use upgrader_lifecycle::{UpgradeSettings, WorkitemOrchestrator};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "upgrader_api=debug,upgrader_lifecycle=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let automation = AutomationConfig::from_env();
    tracing::info!(
        da_endpoint = %automation.da_endpoint,
        activity_id = %automation.activity_id(),
        webhook_url = %automation.webhook_url,
        "Loaded automation configuration"
    );
    if automation.service_token.is_empty() {
        tracing::warn!("APS_SERVICE_TOKEN is not set, workitem calls will be rejected");
    }

    // --- Platform clients ---
    let tokens: Arc<dyn TokenSource> = Arc::new(StaticToken::new(automation.service_token.clone()));
    let execution = Arc::new(
        DesignAutomationApi::new(&automation, tokens).expect("Failed to build execution client"),
    );
    let data = Arc::new(
        DataManagementApi::new(&automation).expect("Failed to build data-management client"),
    );

    // --- Registry, event bus, orchestrator ---
    let registry = Arc::new(WorkitemRegistry::new());
    tracing::warn!("Workitem registry is in-memory; in-flight workitems are forgotten on restart");

    let event_bus = Arc::new(EventBus::default());
    let orchestrator = WorkitemOrchestrator::new(
        execution,
        data,
        Arc::clone(&registry),
        Arc::clone(&event_bus) as Arc<dyn NotificationSink>,
        UpgradeSettings::from_automation(&automation),
    );

    // --- Notification observers ---
    let observers = Arc::new(ObserverRegistry::new());

    // --- Background services ---
    let background_cancel = CancellationToken::new();
    let stale_handle = tokio::spawn(background::stale_workitems::run(
        Arc::clone(&registry),
        Duration::from_secs(config.stale_workitem_secs),
        background_cancel.clone(),
    ));

    tracing::info!("Stale workitem monitor started");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
        registry: Arc::clone(&registry),
        observers: Arc::clone(&observers),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Observer sockets never end on their own.
    let closing_observers = Arc::clone(&observers);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            closing_observers.close_all().await;
        })
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    background_cancel.cancel();
    let _ = tokio::time::timeout(shutdown_timeout, stale_handle).await;
    tracing::info!("Stale workitem monitor stopped");

    let outstanding = registry.len().await;
    if outstanding > 0 {
        tracing::warn!(outstanding, "Shutting down with unresolved workitems");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
