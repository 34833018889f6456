use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning an upload request into a candidate image.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The multipart form has no file part under the expected field name
    #[error("Missing image file in form field '{field}'")]
    MissingField { field: String },

    /// The uploaded filename does not carry a supported image extension
    #[error("Uploaded file is not a valid image: {filename}")]
    UnsupportedExtension { filename: String },

    /// The request is not a readable multipart form
    #[error("Malformed upload request: {message}")]
    Malformed { message: String },

    /// The request body exceeds the configured upload limit (maps to HTTP 413)
    #[error("Upload too large: {message}")]
    BodyTooLarge { message: String },
}

/// Errors from the image codec.
///
/// Any of these aborts a compression run; there are no partial results.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Payload could not be recognized or decoded
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Decoded pixels could not be written back out
    #[error("Failed to encode image at quality {quality}: {message}")]
    Encode { quality: u8, message: String },

    /// Payload decoded to a container the codec cannot write
    #[error("Unsupported image container: {format}")]
    UnsupportedFormat { format: String },
}

/// Errors from persisting derivatives under the content root.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The content root could not be created
    #[error("Failed to create content root {}: {message}", path.display())]
    CreateRoot { path: PathBuf, message: String },

    /// The derivative file could not be written
    #[error("Failed to write derivative {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// The name would resolve outside the content root
    #[error("Invalid derivative name: {filename:?}")]
    InvalidName { filename: String },
}

/// Every way an upload can fail, as seen by the HTTP layer.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The blocking compression task panicked or was cancelled
    #[error("Compression task failed: {message}")]
    Task { message: String },
}
