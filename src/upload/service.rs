//! Upload service orchestrating the derivative pipeline.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        UploadService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                     process()                           │    │
//! │  │  1. Check extension    3. Allocate filename             │    │
//! │  │  2. Compress (blocking) 4. Store & summarize            │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │         │                  │                     │              │
//! │         ▼                  ▼                     ▼              │
//! │ ┌─────────────────┐ ┌───────────────────┐ ┌─────────────────┐   │
//! │ │CompressionEngine│ │ IdentityAllocator │ │ DerivativeStore │   │
//! │ └─────────────────┘ └───────────────────┘ └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written until compression has succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use crate::compress::{CompressionEngine, CompressionStrategy, ImageCodec};
use crate::error::{UploadError, ValidationError};
use crate::format::{extension_of, is_supported_image};
use crate::storage::{DerivativeStore, IdentityAllocator};

/// URL prefix under which stored derivatives are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Summary of a stored derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Size of the uploaded file in bytes
    pub original_size: usize,

    /// Size of the stored derivative in bytes
    pub compressed_size: usize,

    /// Allocated derivative filename
    pub filename: String,

    /// Public URL of the derivative
    pub url: String,

    /// Where the derivative was written
    pub storage_path: PathBuf,
}

/// Service turning uploaded images into stored derivatives.
///
/// # Type Parameters
///
/// * `S` - Where derivatives are stored
/// * `C` - The codec the compression engine re-encodes with
///
/// # Example
///
/// ```ignore
/// use imgpress::compress::{CompressionEngine, ImageRsCodec};
/// use imgpress::storage::LocalDirStore;
/// use imgpress::upload::UploadService;
///
/// let service = UploadService::new(
///     LocalDirStore::new("uploads"),
///     CompressionEngine::with_default_target(ImageRsCodec::new()),
///     "https://img.example.com",
/// );
///
/// let result = service.process("holiday.jpg", bytes).await?;
/// println!("{} -> {} bytes at {}", result.original_size, result.compressed_size, result.url);
/// ```
pub struct UploadService<S, C> {
    store: Arc<S>,
    engine: Arc<CompressionEngine<C>>,
    allocator: IdentityAllocator,
    public_base_url: String,
}

impl<S, C> UploadService<S, C>
where
    S: DerivativeStore,
    C: ImageCodec + 'static,
{
    /// Create a service.
    ///
    /// Trailing `/` on `public_base_url` are stripped.
    pub fn new(
        store: S,
        engine: CompressionEngine<C>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            store: Arc::new(store),
            engine: Arc::new(engine),
            allocator: IdentityAllocator::new(),
            public_base_url,
        }
    }

    /// Replace the filename allocator.
    pub fn with_allocator(mut self, allocator: IdentityAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// The derivative store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The compression engine.
    pub fn engine(&self) -> &CompressionEngine<C> {
        &self.engine
    }

    /// Base URL used in [`UploadResult::url`].
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Public URL of a stored derivative.
    pub fn public_url_for(&self, filename: &str) -> String {
        format!("{}{}/{}", self.public_base_url, UPLOADS_ROUTE, filename)
    }

    /// Reject filenames without a supported image extension.
    pub fn validate(&self, original_filename: &str) -> Result<(), ValidationError> {
        if is_supported_image(original_filename) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedExtension {
                filename: original_filename.to_string(),
            })
        }
    }

    /// Compress and store an uploaded image.
    ///
    /// # Errors
    ///
    /// - [`UploadError::Validation`] if the filename has no supported extension
    /// - [`UploadError::Codec`] if the payload cannot be decoded or re-encoded
    /// - [`UploadError::Storage`] if the derivative cannot be written
    /// - [`UploadError::Task`] if the compression task dies
    pub async fn process(
        &self,
        original_filename: &str,
        payload: Bytes,
    ) -> Result<UploadResult, UploadError> {
        self.validate(original_filename)?;

        let original_size = payload.len();
        let engine = Arc::clone(&self.engine);

        let outcome = tokio::task::spawn_blocking(move || engine.compress_with_report(payload))
            .await
            .map_err(|e| UploadError::Task {
                message: e.to_string(),
            })??;

        debug!(
            strategy = ?outcome.strategy,
            attempts = outcome.attempts.len(),
            "Compression finished"
        );

        let filename = self.allocator.allocate(extension_of(original_filename));
        let storage_path = self.store.put(&filename, &outcome.data).await?;

        let compressed_size = outcome.data.len();
        info!(
            filename = %filename,
            original_size,
            compressed_size,
            recompressed = outcome.strategy != CompressionStrategy::Passthrough,
            "Stored derivative"
        );

        Ok(UploadResult {
            original_size,
            compressed_size,
            url: self.public_url_for(&filename),
            filename,
            storage_path,
        })
    }
}

impl<S, C> std::fmt::Debug for UploadService<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("public_base_url", &self.public_base_url)
            .field("allocator", &self.allocator)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
