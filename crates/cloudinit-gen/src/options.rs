//! Render configuration and fixed limits.

/// Maximum size in bytes of a user-data payload accepted by cloud-init.
///
/// Rendered payloads at or above this size are gzip-compressed; if they are
/// still too large, rendering fails.
pub const MAX_USER_DATA_SIZE: usize = 16383;

/// Modification time written into gzip headers.
///
/// Fixed so that compressing the same payload always produces the same bytes
/// and infrastructure tools diffing user-data see no spurious changes.
pub const GZIP_FIXED_MTIME: u32 = 0;

/// Gzip compression level (best).
pub const GZIP_LEVEL: u32 = 9;

/// MIME-Version emitted when a part does not carry its own.
pub const DEFAULT_MIME_VERSION: &str = "1.0";

/// Options controlling how a part or document is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a `MIME-Version` header. cloud-init requires it on the outermost
    /// MIME document. Ignored for comment-style rendering.
    pub include_mime_version: bool,
    /// Use MIME-style headers even when a comment header is available.
    pub force_mime: bool,
    /// Keep a `From` header; it is stripped otherwise.
    pub include_from: bool,
}

impl RenderOptions {
    /// Options for the outermost document: MIME-Version on, comment headers
    /// preferred, `From` stripped.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_mime_version: true,
            force_mime: false,
            include_from: false,
        }
    }

    /// Options used for each child of a multipart document.
    #[must_use]
    pub const fn sub_part() -> Self {
        Self {
            include_mime_version: false,
            force_mime: true,
            include_from: false,
        }
    }

    /// Creates an options builder.
    #[must_use]
    pub const fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::new()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`RenderOptions`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    /// Creates a builder starting from the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: RenderOptions::new(),
        }
    }

    /// Sets whether the `MIME-Version` header is emitted.
    #[must_use]
    pub const fn include_mime_version(mut self, include: bool) -> Self {
        self.options.include_mime_version = include;
        self
    }

    /// Sets whether MIME-style headers are forced.
    #[must_use]
    pub const fn force_mime(mut self, force: bool) -> Self {
        self.options.force_mime = force;
        self
    }

    /// Sets whether a `From` header is kept.
    #[must_use]
    pub const fn include_from(mut self, include: bool) -> Self {
        self.options.include_from = include;
        self
    }

    /// Builds the options.
    #[must_use]
    pub const fn build(self) -> RenderOptions {
        self.options
    }
}

impl Default for RenderOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RenderOptions::default();
        assert!(opts.include_mime_version);
        assert!(!opts.force_mime);
        assert!(!opts.include_from);
    }

    #[test]
    fn test_builder() {
        let opts = RenderOptions::builder()
            .include_mime_version(false)
            .force_mime(true)
            .include_from(true)
            .build();
        assert!(!opts.include_mime_version);
        assert!(opts.force_mime);
        assert!(opts.include_from);
    }

    #[test]
    fn test_sub_part() {
        let opts = RenderOptions::sub_part();
        assert!(!opts.include_mime_version);
        assert!(opts.force_mime);
    }
}
