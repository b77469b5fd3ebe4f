//! Error types for cloud-init user-data generation.

use std::string::FromUtf8Error;

/// Result type alias for cloud-init generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Cloud-init generation error types.
///
/// Every variant is caused by malformed or ambiguous caller input, or by a
/// payload that cannot satisfy the user-data size ceiling. None of them are
/// transient.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The first line is a `#` comment that does not name a known part type.
    #[error("Unrecognized cloud-init comment header: {0}")]
    UnrecognizedHeader(String),

    /// A MIME header block was supplied without a `Content-Type` header.
    #[error("MIME header block has no Content-Type header: {0}")]
    MissingContentType(String),

    /// No MIME type was given and the content carries no identifying header.
    #[error("Cannot identify part type; no MIME type and no header line: {0}")]
    UnidentifiableContent(String),

    /// A shell-script MIME type was given but the content lacks a `#!` line.
    #[error("Content-Type \"{mime_type}\" requires a shebang on the first line of content: {first_line}")]
    MissingShebang {
        /// The shell-script MIME type.
        mime_type: String,
        /// The offending first line.
        first_line: String,
    },

    /// Parts were added to a document that holds a raw binary payload.
    #[error("Cannot add parts to a document initialized with a raw binary payload")]
    RawBinaryConflict,

    /// The payload does not fit in the user-data size ceiling.
    #[error("{}", payload_too_large_message(.uncompressed, .compressed))]
    PayloadTooLarge {
        /// Size in bytes before compression.
        uncompressed: usize,
        /// Size in bytes after compression, if compression was attempted.
        compressed: Option<usize>,
    },

    /// The outermost render of a non-empty document omitted MIME-Version.
    #[error("include_mime_version must be true for the outermost cloud-init document")]
    MimeVersionRequired,

    /// Structured content was not a key/value mapping.
    #[error("Structured content must be a mapping, got: {0}")]
    NotAMapping(String),

    /// Invalid Content-Type value.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// YAML serialization error.
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Conversion of a serializable value into structured content failed.
    #[error("Structured content conversion error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gzip compression error.
    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn payload_too_large_message(uncompressed: &usize, compressed: &Option<usize>) -> String {
    compressed.map_or_else(
        || format!("Raw binary user-data too big: {uncompressed} bytes"),
        |compressed| {
            format!(
                "cloud-init user-data too big: {uncompressed} bytes before compression, {compressed} after"
            )
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_too_large_reports_both_sizes() {
        let err = Error::PayloadTooLarge {
            uncompressed: 40_000,
            compressed: Some(20_000),
        };
        let msg = err.to_string();
        assert!(msg.contains("40000"));
        assert!(msg.contains("20000"));
    }

    #[test]
    fn test_payload_too_large_raw() {
        let err = Error::PayloadTooLarge {
            uncompressed: 16384,
            compressed: None,
        };
        assert_eq!(err.to_string(), "Raw binary user-data too big: 16384 bytes");
    }

    #[test]
    fn test_missing_shebang_message() {
        let err = Error::MissingShebang {
            mime_type: "text/x-shellscript".to_string(),
            first_line: "echo hi".to_string(),
        };
        assert!(err.to_string().contains("text/x-shellscript"));
    }
}
