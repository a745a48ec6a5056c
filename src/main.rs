use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carelink_notification_service::channel::LogOnlySender;
use carelink_notification_service::config::Settings;
use carelink_notification_service::event::Priority;
use carelink_notification_service::scheduler::DeliveryScheduler;
use carelink_notification_service::server::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::new()?;
    tracing::info!("Configuration loaded");

    // Create application state
    let state = AppState::new(settings.clone());
    tracing::info!("Application state initialized");

    // Shutdown channel shared by the schedulers
    let (shutdown_tx, _) = broadcast::channel(1);

    // One delivery scheduler per priority tier. The wire transport is
    // external; the log-only sender stands in for it here.
    let sender = Arc::new(LogOnlySender);
    let mut scheduler_handles = Vec::new();
    for tier in Priority::ALL {
        let scheduler = DeliveryScheduler::new(
            tier,
            settings.scheduler.interval_for(tier),
            state.events.clone(),
            state.templates.clone(),
            state.notifications.clone(),
            sender.clone(),
            sender.clone(),
            shutdown_tx.subscribe(),
        );
        scheduler_handles.push(tokio::spawn(scheduler.run()));
    }

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_tx))
        .await?;

    // Wait for background tasks to finish
    tracing::info!("Waiting for delivery schedulers to finish...");
    for handle in scheduler_handles {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop the delivery schedulers
    let _ = shutdown_tx.send(());
}
