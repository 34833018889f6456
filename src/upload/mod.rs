//! Upload pipeline: validate, compress, name, store.
//!
//! [`UploadService`] is what the HTTP layer calls with the uploaded filename
//! and raw bytes; it returns an [`UploadResult`] describing the stored
//! derivative.

mod service;

pub use service::{UploadResult, UploadService, UPLOADS_ROUTE};
