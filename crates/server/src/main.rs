use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::Registry;
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retrato_core::{
    load_config, metrics::register_metrics, validate_config, AgingPipeline, BlobStore,
    FsBlobStore, HttpAgingClient, RecordStore, SqliteRecordStore,
};

use retrato_server::api::create_router;
use retrato_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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
    let config_path = std::env::var("RETRATO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully (version {})", VERSION);
    info!("Database path: {:?}", config.database.path);
    info!("Storage root: {:?}", config.storage.root);

    // Log a config fingerprint without leaking secrets
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Create blob store
    let storage: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(config.storage.clone()));
    storage
        .validate()
        .await
        .context("Failed to prepare blob storage")?;
    info!("Blob store initialized ({})", storage.name());

    // Create aging API client
    let client = Arc::new(
        HttpAgingClient::new(config.aging.clone()).context("Failed to create aging client")?,
    );
    info!("Aging API client initialized for {}", config.aging.base_url);

    // Create record store
    let records: Arc<dyn RecordStore> = Arc::new(
        SqliteRecordStore::new(&config.database.path).context("Failed to create record store")?,
    );
    info!("Record store initialized");

    // Create the pipeline
    let pipeline = Arc::new(AgingPipeline::new(
        config.upload.clone(),
        config.poller.clone(),
        config.aging.params.clone(),
        Arc::clone(&storage),
        client,
        Arc::clone(&records),
    ));
    info!("Aging pipeline initialized");

    // Register metrics
    let registry = Registry::new();
    register_metrics(&registry).context("Failed to register metrics")?;

    let media_root = config.storage.root.clone();
    let addr = SocketAddr::new(config.server.host, config.server.port);

    let app_state = Arc::new(AppState::new(
        config,
        Arc::clone(&pipeline),
        records,
        registry,
    ));

    let app = create_router(app_state, &media_root);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Stopping background pollers");
    pipeline.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
