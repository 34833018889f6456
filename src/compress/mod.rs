//! Size-bounded image compression.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           CompressionEngine             │
//! │  passthrough → quality ladder →         │
//! │  dimension fallback                     │
//! └────────────────────┬────────────────────┘
//!                      │ encode(bytes, quality, max_width)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         ImageCodec (trait)              │
//! │   ImageRsCodec: JPEG/PNG/GIF/BMP/WebP   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! - [`CompressionEngine`]: applies the ladder to a payload
//! - [`CompressionTarget`]: the byte budget (1 MiB by default)
//! - [`ImageCodec`]: re-encode capability, injected so the ladder can be tested
//!   without real images
//! - [`ImageRsCodec`]: production codec on the `image` crate

mod codec;
mod engine;

pub use codec::{clamp_quality, ImageCodec, ImageRsCodec, MAX_QUALITY, MIN_QUALITY};
pub use engine::{
    quality_ladder, CompressionAttempt, CompressionEngine, CompressionOutcome,
    CompressionStrategy, CompressionTarget, DEFAULT_TARGET_BYTES, FALLBACK_MAX_WIDTH,
    FALLBACK_QUALITY, LADDER_MIN_QUALITY, LADDER_START_QUALITY, LADDER_STEP,
};
