//! imgpress - compress uploaded images under a byte budget and serve them.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgpress::{
    compress::{CompressionEngine, CompressionTarget, ImageRsCodec},
    config::Config,
    server::{create_router, RouterConfig},
    storage::LocalDirStore,
    upload::UploadService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let upload_root = match config.upload_root() {
        Ok(root) => root,
        Err(e) => {
            error!(
                "Cannot resolve upload directory '{}': {}",
                config.upload_dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };
    let public_base_url = config.public_base_url();

    info!("imgpress v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Upload directory: {}", upload_root.display());
    info!("  Public URL: {}", public_base_url);
    info!(
        "  Target size: {} bytes, body limit: {} bytes",
        config.target_size, config.max_body_size
    );
    info!("  Cache max-age: {}s", config.cache_max_age);
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    // Create the upload pipeline
    let engine = CompressionEngine::new(
        ImageRsCodec::new(),
        CompressionTarget::new(config.target_size),
    );
    let upload_service = UploadService::new(
        LocalDirStore::new(upload_root),
        engine,
        public_base_url,
    );

    // Create router
    let router = create_router(upload_service, build_router_config(&config));

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/ping", addr);
    info!("    curl -F image=@photo.jpg http://{}/upload", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "imgpress=debug,tower_http=debug"
    } else {
        "imgpress=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_max_body_size(config.max_body_size)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
