//! HTTP server layer for imgpress.
//!
//! This module provides the HTTP API around the upload pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │      POST /upload     GET /uploads/{filename}     GET /ping     │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (multipart, JSON errors) │  │ (CORS, body limit, static)  │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    ping_handler, upload_handler, AppState, ErrorResponse, PingResponse, UploadResponse,
    IMAGE_FIELD, UPLOAD_SUCCESS_MESSAGE,
};
pub use routes::{create_router, RouterConfig};
