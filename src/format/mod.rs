//! Upload format classification.
//!
//! Uploads are accepted or rejected on their filename alone. The supported
//! containers are JPEG, PNG, GIF, BMP and WebP; content is never inspected
//! here, so a mislabeled file passes this gate and fails later in the codec.

mod extension;

pub use extension::{extension_of, is_supported_image, SUPPORTED_EXTENSIONS};
