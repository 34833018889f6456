//! HTTP request handlers for the imgpress API.
//!
//! # Endpoints
//!
//! - `POST /upload` - Upload an image, get back the stored derivative's summary
//! - `GET /ping` - Liveness check
//!
//! Stored derivatives (`GET /uploads/{filename}`) are served by a static file
//! service, see [`routes`](super::routes).

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::compress::ImageCodec;
use crate::error::{UploadError, ValidationError};
use crate::storage::DerivativeStore;
use crate::upload::{UploadResult, UploadService};

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Message returned with every successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Image uploaded and compressed successfully";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the upload service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S, C> {
    /// The service compressing and storing uploads
    pub upload_service: Arc<UploadService<S, C>>,
}

impl<S, C> AppState<S, C> {
    /// Create a new application state around an upload service.
    pub fn new(upload_service: UploadService<S, C>) -> Self {
        Self {
            upload_service: Arc::new(upload_service),
        }
    }
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            upload_service: Arc::clone(&self.upload_service),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "missing_field", "compression_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Response from a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub original_size: usize,
    pub compressed_size: usize,
    pub filename: String,
    pub url: String,
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            original_size: result.original_size,
            compressed_size: result.compressed_size,
            filename: result.filename,
            url: result.url,
        }
    }
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert UploadError to HTTP response.
///
/// Client errors are logged at WARN level, server errors at ERROR level.
impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            UploadError::Validation(err) => match err {
                ValidationError::MissingField { .. } => (StatusCode::BAD_REQUEST, "missing_field"),
                ValidationError::UnsupportedExtension { .. } => {
                    (StatusCode::BAD_REQUEST, "unsupported_extension")
                }
                ValidationError::Malformed { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
                ValidationError::BodyTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
                }
            },
            UploadError::Codec(_) => (StatusCode::INTERNAL_SERVER_ERROR, "compression_error"),
            UploadError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            UploadError::Task { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

fn multipart_error(err: MultipartError) -> ValidationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::BodyTooLarge {
            message: err.body_text(),
        }
    } else {
        ValidationError::Malformed {
            message: err.body_text(),
        }
    }
}

fn multipart_rejection(rejection: MultipartRejection) -> ValidationError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::BodyTooLarge {
            message: rejection.body_text(),
        }
    } else {
        ValidationError::Malformed {
            message: rejection.body_text(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image uploads.
///
/// # Endpoint
///
/// `POST /upload` (multipart/form-data)
///
/// # Form Fields
///
/// - `image`: the image file (jpg, jpeg, png, gif, bmp or webp)
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "message": "Image uploaded and compressed successfully",
///   "original_size": 2097152,
///   "compressed_size": 1001234,
///   "filename": "1718031234567890123.jpg",
///   "url": "http://localhost:8888/uploads/1718031234567890123.jpg"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing `image` field, unsupported extension, malformed form
/// - `413 Payload Too Large`: request exceeds the body limit
/// - `500 Internal Server Error`: image cannot be compressed or stored
pub async fn upload_handler<S, C>(
    State(state): State<AppState<S, C>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError>
where
    S: DerivativeStore + 'static,
    C: ImageCodec + 'static,
{
    let mut multipart = multipart.map_err(multipart_rejection)?;
    let service = &state.upload_service;

    let (filename, data) = read_image_field(&mut multipart, |name| service.validate(name)).await?;
    debug!(filename = %filename, size = data.len(), "Received upload");

    let result = service.process(&filename, data).await?;

    Ok(Json(result.into()))
}

/// Find the `image` file part, validate its name, then read its bytes.
///
/// The name is checked before the body is read so unsupported uploads are
/// rejected without buffering them.
async fn read_image_field<F>(
    multipart: &mut Multipart,
    validate: F,
) -> Result<(String, Bytes), ValidationError>
where
    F: Fn(&str) -> Result<(), ValidationError>,
{
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_owned) else {
            break;
        };
        validate(&filename)?;

        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok((filename, data));
    }

    Err(ValidationError::MissingField {
        field: IMAGE_FIELD.to_string(),
    })
}

/// Handle liveness checks.
///
/// # Endpoint
///
/// `GET /ping`
///
/// # Response
///
/// `200 OK` with JSON body `{"message": "pong"}`
pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
