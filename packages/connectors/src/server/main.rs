// Main entry point for the deployment connectors service

use std::sync::Arc;

use anyhow::{Context, Result};
use connectors_core::domains::deployment::activities::{DeploymentOrchestrator, HealthAggregator};
use connectors_core::domains::deployment::edges::ApprovalConsumer;
use connectors_core::domains::deployment::models::Platform;
use connectors_core::kernel::{
    HttpPlatformAdapter, NatsClientPublisher, NatsPublisher, PlatformRegistry, ServerDeps,
};
use connectors_core::server::{build_app, AppState};
use connectors_core::{Config, LogFormat};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config);
    info!(
        environment = %config.environment,
        port = config.port,
        max_retry_attempts = config.deployment.max_retry_attempts,
        "Starting deployment connectors"
    );
    config.check_platforms()?;

    // Connect to the event bus
    info!(url = %config.nats.url, "Connecting to NATS...");
    let client = async_nats::connect(&config.nats.url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
    info!("NATS connected");

    let platforms = build_platforms(&config)?;
    if platforms.is_empty() {
        warn!("No platform endpoints configured, approvals will be skipped");
    }

    let nats: Arc<dyn NatsPublisher> = Arc::new(NatsClientPublisher::new(client.clone()));
    let deps = ServerDeps::new(nats, platforms, config.deployment.clone())
        .with_subject_prefix(config.nats.subject_prefix.clone());

    let app = build_app(AppState {
        health: HealthAggregator::new(deps.clone(), config.health_check_timeout),
        stats: deps.stats.clone(),
    });

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, draining in-flight deployments");
        cancel_on_signal.cancel();
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    info!("Health check: http://localhost:{}/health", config.port);
    info!("Metrics: http://localhost:{}/metrics", config.port);

    let server_cancel = cancel.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
    });

    // Consume approvals until shutdown
    let consumer = ApprovalConsumer::new(
        DeploymentOrchestrator::new(deps),
        config.nats.max_in_flight,
    );
    let consumed = consumer.run(client.clone(), &config.nats, cancel.clone()).await;
    if let Err(e) = &consumed {
        error!(error = %format!("{:#}", e), "Approval consumer failed");
        cancel.cancel();
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Server error"),
        Err(e) => error!(error = %e, "Server task failed"),
    }

    if let Err(e) = client.flush().await {
        warn!(error = %e, "Failed to flush pending NATS publishes");
    }

    consumed?;
    info!("Deployment connectors stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_platforms(config: &Config) -> Result<PlatformRegistry> {
    let mut platforms = PlatformRegistry::new();

    for (platform, options) in [
        (Platform::GoogleAds, config.google_ads.clone()),
        (Platform::Meta, config.meta.clone()),
    ] {
        let Some(options) = options else {
            warn!(platform = %platform, "No endpoint configured, platform disabled");
            continue;
        };

        info!(platform = %platform, endpoint = %options.endpoint, "Platform adapter configured");
        let adapter = HttpPlatformAdapter::new(platform, options)
            .with_context(|| format!("Failed to build {} adapter", platform))?;
        platforms.register(Arc::new(adapter));
    }

    Ok(platforms)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
