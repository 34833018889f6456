//! Property tests for the compression pipeline and upload validation.

use bytes::Bytes;
use proptest::prelude::*;

use imgpress::compress::{CompressionEngine, CompressionTarget, ImageCodec};
use imgpress::error::CodecError;
use imgpress::format::{extension_of, is_supported_image, SUPPORTED_EXTENSIONS};
use imgpress::storage::IdentityAllocator;

/// Codec that fails every call; passthrough must never reach it.
struct RefusingCodec;

impl ImageCodec for RefusingCodec {
    fn encode(
        &self,
        _source: &[u8],
        quality: u8,
        _max_width: Option<u32>,
    ) -> Result<Bytes, CodecError> {
        Err(CodecError::Encode {
            quality,
            message: "codec should not be called".to_string(),
        })
    }
}

proptest! {
    #[test]
    fn payload_within_target_is_returned_unchanged(
        payload in prop::collection::vec(any::<u8>(), 0..2048),
        slack in 0usize..1024,
    ) {
        let target = CompressionTarget::new(payload.len() + slack);
        let engine = CompressionEngine::new(RefusingCodec, target);

        let output = engine.compress(Bytes::from(payload.clone())).unwrap();

        prop_assert_eq!(output.as_ref(), payload.as_slice());
    }

    #[test]
    fn payload_over_target_reaches_codec(
        payload in prop::collection::vec(any::<u8>(), 2..2048),
    ) {
        let engine = CompressionEngine::new(RefusingCodec, CompressionTarget::new(payload.len() - 1));

        prop_assert!(engine.compress(Bytes::from(payload)).is_err());
    }

    #[test]
    fn supported_extensions_match_in_any_case(
        stem in "[a-zA-Z0-9_-]{1,16}",
        index in 0usize..SUPPORTED_EXTENSIONS.len(),
        upper in prop::collection::vec(any::<bool>(), 4),
    ) {
        let ext: String = SUPPORTED_EXTENSIONS[index]
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        let filename = format!("{}.{}", stem, ext);

        prop_assert!(is_supported_image(&filename));
        prop_assert_eq!(extension_of(&filename), format!(".{}", ext));
    }

    #[test]
    fn names_without_extension_are_rejected(stem in "[a-zA-Z0-9_-]{1,16}") {
        prop_assert!(!is_supported_image(&stem));
        prop_assert_eq!(extension_of(&stem), "");
    }

    #[test]
    fn allocated_names_keep_extension(ext in "\\.[a-zA-Z]{1,5}") {
        let allocator = IdentityAllocator::new();

        let first = allocator.allocate(&ext);
        let second = allocator.allocate(&ext);

        prop_assert_ne!(&first, &second);
        let stem = first.strip_suffix(ext.as_str()).unwrap();
        prop_assert!(stem.bytes().all(|b| b.is_ascii_digit()));
    }
}
