//! Extension-based classification of uploaded filenames.
//!
//! Uploads are gated on the filename alone. Content is never sniffed here: a
//! file with a spoofed extension passes the gate and is rejected later by the
//! codec, which reports a [`CodecError`](crate::error::CodecError) rather than
//! a validation error.

/// Extensions (lowercase, without the dot) accepted for upload.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Return the extension of the final path element, including its leading `.`.
///
/// The suffix is returned verbatim (case preserved). Returns `""` when the
/// final element has no `.`. Both `/` and `\` count as path separators, so a
/// client-supplied directory never leaks into the result.
///
/// ```
/// use imgpress::format::extension_of;
///
/// assert_eq!(extension_of("holiday.JPG"), ".JPG");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("dir.d/README"), "");
/// ```
pub fn extension_of(filename: &str) -> &str {
    let base = filename
        .rfind(['/', '\\'])
        .map_or(filename, |idx| &filename[idx + 1..]);

    base.rfind('.').map_or("", |idx| &base[idx..])
}

/// Check whether a filename carries a supported image extension.
///
/// Matching is case-insensitive against [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image(filename: &str) -> bool {
    let ext = extension_of(filename);
    let Some(ext) = ext.strip_prefix('.') else {
        return false;
    };

    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(ext))
}
