//! Adaptive compression engine.
//!
//! The engine takes an encoded image and a byte budget and returns an encoded
//! image in the same container that fits the budget whenever a path exists.
//!
//! # Algorithm
//!
//! ```text
//! len <= target ──────────────────────────────► return payload untouched
//!       │
//!       ▼
//! quality 80, 70, 60, 50, 40, 30, 20
//!   re-encode ORIGINAL at q ── fits? ─────────► return that encode
//!       │ (none fit)
//!       ▼
//! re-encode ORIGINAL at q=70, width <= 800 ──► return unconditionally
//! ```
//!
//! The first fitting quality wins; the search never looks for a better one
//! below it. A codec failure at any step aborts the whole run.

use bytes::Bytes;
use tracing::debug;

use crate::error::CodecError;

use super::codec::ImageCodec;

/// Default byte budget for derivatives (1 MiB).
pub const DEFAULT_TARGET_BYTES: usize = 1024 * 1024;

/// First quality tried by the ladder.
pub const LADDER_START_QUALITY: u8 = 80;

/// Quality decrement between ladder steps.
pub const LADDER_STEP: u8 = 10;

/// Last quality tried by the ladder (inclusive).
pub const LADDER_MIN_QUALITY: u8 = 20;

/// Quality used by the dimension fallback.
pub const FALLBACK_QUALITY: u8 = 70;

/// Width cap used by the dimension fallback.
pub const FALLBACK_MAX_WIDTH: u32 = 800;

/// The quality ladder, highest quality first: 80, 70, ..., 20.
pub fn quality_ladder() -> impl Iterator<Item = u8> {
    (LADDER_MIN_QUALITY..=LADDER_START_QUALITY)
        .rev()
        .step_by(LADDER_STEP as usize)
}

// =============================================================================
// Target
// =============================================================================

/// Maximum byte size a compressed payload should have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionTarget {
    max_bytes: usize,
}

impl CompressionTarget {
    /// Create a target of `max_bytes`.
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// The byte budget.
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Whether a payload of `len` bytes satisfies the budget.
    #[inline]
    pub const fn fits(&self, len: usize) -> bool {
        len <= self.max_bytes
    }
}

impl Default for CompressionTarget {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_BYTES)
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// One ladder or fallback encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionAttempt {
    /// Quality passed to the codec
    pub quality: u8,

    /// Width cap passed to the codec, if any
    pub max_width: Option<u32>,

    /// Length of the encoded output
    pub len: usize,
}

/// Which path produced the engine's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStrategy {
    /// Payload already fit and was returned as-is
    Passthrough,

    /// A ladder step fit the target
    Quality(u8),

    /// Ladder exhausted; the width-capped encode was returned
    Fallback { quality: u8, max_width: u32 },
}

/// Result of a compression run with the attempts that led to it.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    /// The compressed payload
    pub data: Bytes,

    /// How `data` was produced
    pub strategy: CompressionStrategy,

    /// Every encode performed, in order
    pub attempts: Vec<CompressionAttempt>,
}

// =============================================================================
// Engine
// =============================================================================

/// Size-bounded re-encoder built on an [`ImageCodec`].
///
/// The engine holds no mutable state and can be shared between threads.
///
/// # Example
///
/// ```ignore
/// use imgpress::compress::{CompressionEngine, CompressionTarget, ImageRsCodec};
///
/// let engine = CompressionEngine::new(ImageRsCodec::new(), CompressionTarget::default());
/// let derivative = engine.compress(upload_bytes)?;
/// ```
#[derive(Debug, Clone)]
pub struct CompressionEngine<C> {
    codec: C,
    target: CompressionTarget,
}

impl<C: ImageCodec> CompressionEngine<C> {
    /// Create an engine bound to `target`.
    pub fn new(codec: C, target: CompressionTarget) -> Self {
        Self { codec, target }
    }

    /// Create an engine with the default 1 MiB target.
    pub fn with_default_target(codec: C) -> Self {
        Self::new(codec, CompressionTarget::default())
    }

    /// The byte budget this engine compresses to.
    pub fn target(&self) -> CompressionTarget {
        self.target
    }

    /// The underlying codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Compress `payload` to the engine's target.
    pub fn compress(&self, payload: Bytes) -> Result<Bytes, CodecError> {
        self.compress_with_report(payload).map(|outcome| outcome.data)
    }

    /// Compress `payload` and report how the result was reached.
    pub fn compress_with_report(&self, payload: Bytes) -> Result<CompressionOutcome, CodecError> {
        if self.target.fits(payload.len()) {
            return Ok(CompressionOutcome {
                data: payload,
                strategy: CompressionStrategy::Passthrough,
                attempts: Vec::new(),
            });
        }

        let mut attempts = Vec::new();

        for quality in quality_ladder() {
            let encoded = self.codec.encode(&payload, quality, None)?;
            attempts.push(CompressionAttempt {
                quality,
                max_width: None,
                len: encoded.len(),
            });

            debug!(
                quality,
                size = encoded.len(),
                target = self.target.max_bytes(),
                "Ladder attempt"
            );

            if self.target.fits(encoded.len()) {
                return Ok(CompressionOutcome {
                    data: encoded,
                    strategy: CompressionStrategy::Quality(quality),
                    attempts,
                });
            }
        }

        let encoded = self
            .codec
            .encode(&payload, FALLBACK_QUALITY, Some(FALLBACK_MAX_WIDTH))?;
        attempts.push(CompressionAttempt {
            quality: FALLBACK_QUALITY,
            max_width: Some(FALLBACK_MAX_WIDTH),
            len: encoded.len(),
        });

        debug!(
            size = encoded.len(),
            target = self.target.max_bytes(),
            fits = self.target.fits(encoded.len()),
            "Quality ladder exhausted, using dimension fallback"
        );

        Ok(CompressionOutcome {
            data: encoded,
            strategy: CompressionStrategy::Fallback {
                quality: FALLBACK_QUALITY,
                max_width: FALLBACK_MAX_WIDTH,
            },
            attempts,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
