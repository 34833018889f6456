//! # imgpress
//!
//! An image upload service that stores every upload as a derivative no larger
//! than a byte budget (1 MiB by default) and serves it back over HTTP.
//!
//! ## Features
//!
//! - **Adaptive compression**: Re-encodes oversized uploads down a fixed quality
//!   ladder, then falls back to shrinking the width
//! - **Format preserving**: JPEG, PNG, GIF, BMP and WebP stay in their container
//! - **Collision-free names**: Derivatives are named by nanosecond timestamp
//! - **Static serving**: Stored derivatives are served with long-lived cache headers
//!
//! ## Architecture
//!
//! - [`mod@format`] - Extension-based upload validation
//! - [`compress`] - Codec capability and the compression ladder
//! - [`storage`] - Filename allocation and the content root
//! - [`upload`] - The validate, compress, name, store pipeline
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use imgpress::{
//!     create_router, CompressionEngine, ImageRsCodec, LocalDirStore, RouterConfig,
//!     UploadService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let service = UploadService::new(
//!         LocalDirStore::new("uploads"),
//!         CompressionEngine::with_default_target(ImageRsCodec::new()),
//!         "http://localhost:8888",
//!     );
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod compress;
pub mod config;
pub mod error;
pub mod format;
pub mod server;
pub mod storage;
pub mod upload;

// Re-export commonly used types
pub use compress::{
    CompressionEngine, CompressionOutcome, CompressionStrategy, CompressionTarget, ImageCodec,
    ImageRsCodec, DEFAULT_TARGET_BYTES,
};
pub use config::Config;
pub use error::{CodecError, StorageError, UploadError, ValidationError};
pub use format::{extension_of, is_supported_image, SUPPORTED_EXTENSIONS};
pub use server::{
    create_router, ping_handler, upload_handler, AppState, ErrorResponse, PingResponse,
    RouterConfig, UploadResponse,
};
pub use storage::{Clock, DerivativeStore, IdentityAllocator, LocalDirStore, SystemClock};
pub use upload::{UploadResult, UploadService, UPLOADS_ROUTE};
