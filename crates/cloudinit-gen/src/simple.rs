//! One-shot helpers that build a document and render it.
//!
//! These accept anything convertible into a [`DocumentInput`], so callers
//! can hand over content, raw bytes or a finished [`Document`] without
//! normalizing it first. cloud-init requires MIME-Version on the outermost
//! document, so it is always included.

use crate::document::{Document, DocumentInput};
use crate::error::Result;

/// Renders user-data as text, or `None` for an empty document.
///
/// # Errors
///
/// Returns an error if the document cannot be built or rendered.
pub fn render_cloud_init_text(input: impl Into<DocumentInput>) -> Result<Option<String>> {
    Document::from_input(input)?.render_text()
}

/// Renders user-data as bytes, gzip-compressed if oversized.
///
/// # Errors
///
/// Returns an error if the document cannot be built or rendered, or is too
/// big even after compression.
pub fn render_cloud_init_binary(input: impl Into<DocumentInput>) -> Result<Option<Vec<u8>>> {
    Document::from_input(input)?.render_binary(true)
}

/// Renders user-data as a base64 string of the binary form.
///
/// # Errors
///
/// Returns an error if the document cannot be built or rendered, or is too
/// big even after compression.
pub fn render_cloud_init_base64(input: impl Into<DocumentInput>) -> Result<Option<String>> {
    Document::from_input(input)?.render_base64(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::encoding::decode_base64;

    #[test]
    fn test_render_text_from_str() {
        let text = render_cloud_init_text("#cloud-config\na: 1\n").unwrap();
        assert_eq!(text.as_deref(), Some("#cloud-config\na: 1\n"));
    }

    #[test]
    fn test_render_null() {
        assert_eq!(render_cloud_init_text(Content::Null).unwrap(), None);
        assert_eq!(render_cloud_init_binary(Content::Null).unwrap(), None);
        assert_eq!(render_cloud_init_base64(Content::Null).unwrap(), None);
    }

    #[test]
    fn test_render_binary_raw_passthrough() {
        let raw = b"#!/bin/sh\necho hi".to_vec();
        assert_eq!(render_cloud_init_binary(raw.clone()).unwrap(), Some(raw));
    }

    #[test]
    fn test_render_base64_decodes_to_text() {
        let b64 = render_cloud_init_base64("#!/bin/sh\necho hi").unwrap().unwrap();
        assert_eq!(decode_base64(&b64).unwrap(), b"#!/bin/sh\necho hi");
    }

    #[test]
    fn test_render_existing_document() {
        let mut doc = Document::new();
        doc.add("#cloud-config\na: 1\n").unwrap();
        doc.add("#!/bin/sh\necho hi").unwrap();
        let expected = doc.render_text().unwrap();
        assert_eq!(render_cloud_init_text(doc).unwrap(), expected);
    }
}
