//! Router configuration for imgpress.
//!
//! This module defines the HTTP routes and applies middleware for CORS, the
//! upload body limit, and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /ping                 - Liveness check
//! /upload               - Multipart image upload (POST)
//! /uploads/{filename}   - Stored derivatives (static)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use imgpress::compress::{CompressionEngine, ImageRsCodec};
//! use imgpress::server::routes::{create_router, RouterConfig};
//! use imgpress::storage::LocalDirStore;
//! use imgpress::upload::UploadService;
//!
//! let service = UploadService::new(
//!     LocalDirStore::new("uploads"),
//!     CompressionEngine::with_default_target(ImageRsCodec::new()),
//!     "http://localhost:8888",
//! );
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{
    HeaderName, HeaderValue, ACCEPT_ENCODING, AUTHORIZATION, CACHE_CONTROL, CONTENT_LENGTH,
    CONTENT_TYPE, ORIGIN,
};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;
use tower_http::trace::TraceLayer;

use super::handlers::{ping_handler, upload_handler, AppState};
use crate::compress::ImageCodec;
use crate::config::{DEFAULT_CACHE_MAX_AGE, DEFAULT_MAX_BODY_SIZE};
use crate::storage::DerivativeStore;
use crate::upload::{UploadService, UPLOADS_ROUTE};

/// Header sent by browser clients that attach a CSRF token.
const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds for stored derivatives
    pub cache_max_age: u32,

    /// Maximum upload request body size in bytes
    pub max_body_size: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Upload bodies are limited to 20 MiB
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Set the upload request body limit in bytes.
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The upload endpoint, behind the configured body limit
/// - Static serving of the store's content root under `/uploads`
/// - The liveness check
/// - CORS configuration
/// - Request tracing (optional)
pub fn create_router<S, C>(upload_service: UploadService<S, C>, config: RouterConfig) -> Router
where
    S: DerivativeStore + 'static,
    C: ImageCodec + 'static,
{
    let derivatives = build_derivative_service(upload_service.store().root(), config.cache_max_age);
    let app_state = AppState::new(upload_service);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/ping", get(ping_handler))
        .route(
            "/upload",
            post(upload_handler::<S, C>).layer(DefaultBodyLimit::max(config.max_body_size)),
        )
        .with_state(app_state)
        .nest_service(UPLOADS_ROUTE, derivatives)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Static file service over the content root.
///
/// Derivatives are never rewritten, so every response carries a public
/// Cache-Control header.
fn build_derivative_service(
    root: &std::path::Path,
    cache_max_age: u32,
) -> SetResponseHeader<ServeDir, HeaderValue> {
    let cache_control = HeaderValue::from_str(&cache_control_value(cache_max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("public"));

    SetResponseHeader::if_not_present(ServeDir::new(root), CACHE_CONTROL, cache_control)
}

fn cache_control_value(max_age: u32) -> String {
    format!("public, max-age={}", max_age)
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            CONTENT_TYPE,
            CONTENT_LENGTH,
            ACCEPT_ENCODING,
            X_CSRF_TOKEN,
            AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
