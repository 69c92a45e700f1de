use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fuelock_core::{
    create_audit_system, load_config, validate_config, AccountApi, AcquisitionOrchestrator,
    AuditEvent, AuditStore, Mailbox, MemoryAuditStore, PriceSource, RandomIdentityGenerator,
    VoucherApi,
};
use fuelock_core::services::{OneSecMailClient, ProjectZeroThreeClient, SevenElevenClient};
use fuelock_server::api::create_router;
use fuelock_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("FUELOCK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Account API: {}", config.accounts.base_url);
    info!(
        "Verification polling: {} attempts every {}ms",
        config.acquisition.max_attempts, config.acquisition.poll_interval_ms
    );

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Create in-memory audit store
    let audit_store: Arc<dyn AuditStore> = Arc::new(MemoryAuditStore::new(config.audit.capacity));
    info!("Audit store initialized (capacity {})", config.audit.capacity);

    // Create audit system
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);

    // Spawn audit writer task
    let writer_handle = tokio::spawn(audit_writer.run());

    // Emit ServiceStarted event
    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    // Create external service clients
    let seven_eleven = Arc::new(
        SevenElevenClient::new(config.accounts.clone())
            .context("Failed to create account API client")?,
    );
    let accounts: Arc<dyn AccountApi> = seven_eleven.clone();
    let vouchers: Arc<dyn VoucherApi> = seven_eleven;

    let prices: Arc<dyn PriceSource> = Arc::new(
        ProjectZeroThreeClient::new(config.fuel_prices.clone())
            .context("Failed to create fuel price client")?,
    );
    info!(
        "Fuel prices from {} (region {})",
        config.fuel_prices.url, config.fuel_prices.region
    );

    let mailbox: Arc<dyn Mailbox> = Arc::new(
        OneSecMailClient::new(config.mailbox.clone()).context("Failed to create mailbox client")?,
    );
    let identities = Arc::new(RandomIdentityGenerator::new(config.mailbox.domains.clone()));

    // Create orchestrator
    let orchestrator = Arc::new(
        AcquisitionOrchestrator::new(
            config.acquisition.clone(),
            identities,
            accounts,
            Arc::clone(&prices),
            Arc::clone(&mailbox),
            vouchers,
        )
        .context("Failed to create acquisition orchestrator")?
        .with_audit(audit_handle.clone()),
    );
    info!("Acquisition orchestrator initialized");

    // Cancelled on shutdown so in-flight acquisitions stop polling
    let shutdown = CancellationToken::new();

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        orchestrator,
        prices,
        mailbox,
        audit_store,
        shutdown.clone(),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    // Emit ServiceStopped event
    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // The router (and with it the orchestrator's handle clone) is gone once
    // serve returns, so this is the last sender.
    drop(audit_handle);

    // Wait for writer to finish processing remaining events
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM), then cancel `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
