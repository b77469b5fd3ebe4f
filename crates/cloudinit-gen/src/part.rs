//! A single part of a potentially multipart user-data document.

use crate::content::{Content, to_yaml};
use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::options::{DEFAULT_MIME_VERSION, RenderOptions};
use crate::part_type::{self, SHEBANG};
use crate::render::Renderable;
use std::fmt::Write as _;
use tracing::debug;

/// MIME type assumed for structured (YAML) content.
pub const CLOUD_CONFIG_MIME_TYPE: &str = "text/cloud-config";

/// One fragment of a cloud-init document with a resolved MIME type.
///
/// Built once from raw input, then immutable. Depending on the render
/// options it renders with a terse `#tag` comment header or a full MIME
/// header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    content: Option<String>,
    mime_type: String,
    mime_version: Option<String>,
    comment_line: Option<String>,
    comment_type: Option<String>,
    comment_line_included: bool,
    headers: Headers,
}

impl Part {
    /// Creates a part, inferring its MIME type from the content.
    ///
    /// # Errors
    ///
    /// Returns an error if the type cannot be inferred, the comment header is
    /// unknown, or a shell-script part lacks a shebang.
    pub fn new(content: impl Into<Content>) -> Result<Self> {
        Self::builder(content).build()
    }

    /// Creates a part builder for the given content.
    #[must_use]
    pub fn builder(content: impl Into<Content>) -> PartBuilder {
        PartBuilder::new(content)
    }

    /// Creates a null part, which renders to nothing.
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// Parses a MIME header block and returns the payload and the headers.
    #[must_use]
    pub fn extract_headers(text: &str) -> (String, Headers) {
        let (headers, body) = Headers::parse(text);
        (body, headers)
    }

    /// The content, without any stripped comment header. `None` for a null
    /// part.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// The full MIME type, e.g. `text/cloud-config`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// MIME-Version taken from the input headers, if any.
    #[must_use]
    pub fn mime_version(&self) -> Option<&str> {
        self.mime_version.as_deref()
    }

    /// The full comment line; for shebang parts the whole `#!` line.
    #[must_use]
    pub fn comment_line(&self) -> Option<&str> {
        self.comment_line.as_deref()
    }

    /// The part of the comment line that identifies the type (`#!` for
    /// shebang parts).
    #[must_use]
    pub fn comment_type(&self) -> Option<&str> {
        self.comment_type.as_deref()
    }

    /// The comment tag without the leading `#`, e.g. `cloud-config`, or `!`
    /// for shebang parts.
    #[must_use]
    pub fn comment_tag(&self) -> Option<&str> {
        self.comment_type.as_deref().and_then(|t| t.strip_prefix('#'))
    }

    /// True for shebang parts, whose comment line stays inside the content.
    #[must_use]
    pub const fn comment_line_included(&self) -> bool {
        self.comment_line_included
    }

    /// Additional MIME headers. Never contains Content-Type or MIME-Version.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns true if this is a null part.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.content.is_none()
    }

    /// Renders the part, or returns `None` for a null part.
    ///
    /// A comment-style header is used when one exists for the MIME type and
    /// `force_mime` is off; otherwise a MIME header block is emitted.
    #[must_use]
    pub fn render(&self, options: &RenderOptions) -> Option<String> {
        let content = self.content.as_deref()?;

        if !options.force_mime {
            if let Some(line) = &self.comment_line {
                if self.comment_line_included {
                    return Some(content.to_string());
                }
                return Some(format!("{line}\n{content}"));
            }
        }

        let mut out = String::with_capacity(content.len() + 64);
        let _ = writeln!(out, "Content-Type: {}", self.mime_type);
        if options.include_mime_version {
            let version = self.mime_version.as_deref().unwrap_or(DEFAULT_MIME_VERSION);
            let _ = writeln!(out, "MIME-Version: {version}");
        }
        let headers: Headers = self
            .headers
            .iter()
            .filter(|(name, _)| options.include_from || !name.eq_ignore_ascii_case("From"))
            .collect();
        let _ = write!(out, "{headers}");
        out.push('\n');
        out.push_str(content);
        Some(out)
    }
}

impl Renderable for Part {
    fn is_null(&self) -> bool {
        Self::is_null(self)
    }

    fn render(&self, options: &RenderOptions) -> Result<Option<String>> {
        Ok(Self::render(self, options))
    }

    fn box_clone(&self) -> Box<dyn Renderable> {
        Box::new(self.clone())
    }
}

/// Builder for [`Part`] with an optional explicit MIME type and headers.
#[derive(Debug, Clone)]
pub struct PartBuilder {
    content: Content,
    mime_type: Option<String>,
    headers: Headers,
}

impl PartBuilder {
    /// Creates a builder for the given content.
    #[must_use]
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            mime_type: None,
            headers: Headers::new(),
        }
    }

    /// Sets the MIME type explicitly, disabling inference from the content.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Sets an optional MIME type.
    #[must_use]
    pub fn maybe_mime_type(mut self, mime_type: Option<impl Into<String>>) -> Self {
        self.mime_type = mime_type.map(Into::into);
        self
    }

    /// Adds a MIME header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Merges a set of MIME headers.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.merge(headers);
        self
    }

    /// Builds the part.
    ///
    /// An existing part is cloned as is; the MIME type and headers given to
    /// the builder are ignored in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if the type cannot be inferred, the comment header is
    /// unknown, a MIME header block lacks Content-Type, a shell-script part
    /// lacks a shebang, or YAML serialization fails.
    pub fn build(self) -> Result<Part> {
        match self.content {
            Content::Null => Ok(Part::null()),
            Content::Existing(part) => Ok(*part),
            Content::Text(text) => classify(text, false, self.mime_type, self.headers),
            Content::Structured(data) => {
                let yaml = to_yaml(&data)?;
                classify(yaml, true, self.mime_type, self.headers)
            }
        }
    }
}

fn classify(
    mut content: String,
    is_yaml: bool,
    mime_type: Option<String>,
    mut headers: Headers,
) -> Result<Part> {
    let header_type = headers.remove("Content-Type");
    let mut mime_type = mime_type.or(header_type);
    if mime_type.is_none() && is_yaml {
        mime_type = Some(CLOUD_CONFIG_MIME_TYPE.to_string());
    }

    let mut comment_line: Option<String> = None;
    let mut comment_type: Option<String> = None;
    let mut comment_line_included = false;

    let mime_type = if let Some(mime_type) = mime_type {
        mime_type
    } else {
        let Some(newline) = content.find('\n') else {
            return Err(Error::UnidentifiableContent(content));
        };
        let (first, rest) = (&content[..newline], &content[newline + 1..]);
        let first = first.strip_suffix('\r').unwrap_or(first);

        if first.starts_with('#') {
            let tag = if first.starts_with(SHEBANG) { SHEBANG } else { first };
            let part_type = part_type::lookup_by_comment(tag)
                .ok_or_else(|| Error::UnrecognizedHeader(first.to_string()))?;
            comment_line = Some(first.to_string());
            let rest = rest.to_string();
            if tag == SHEBANG {
                // The shebang line is part of the script.
                comment_line_included = true;
            } else {
                content = rest;
            }
            part_type.mime_type().to_string()
        } else if first.starts_with("MIME-Version:") || first.starts_with("Content-Type:") {
            let first = first.to_string();
            let (mut embedded, body) = Headers::parse(&content);
            let mime_type = embedded
                .remove("Content-Type")
                .ok_or(Error::MissingContentType(first))?;
            headers.merge(embedded);
            content = body;
            mime_type
        } else {
            return Err(Error::UnidentifiableContent(first.to_string()));
        }
    };

    let essence = ContentType::parse(&mime_type)
        .map_or_else(|_| mime_type.trim().to_lowercase(), |ct| ct.essence());

    if part_type::is_shell_script(&essence) {
        let first = comment_line.take().unwrap_or_else(|| {
            let line = content.split('\n').next().unwrap_or_default();
            line.strip_suffix('\r').unwrap_or(line).to_string()
        });
        if !first.starts_with(SHEBANG) {
            return Err(Error::MissingShebang {
                mime_type,
                first_line: first,
            });
        }
        // Only plain x-shellscript may drop its MIME headers; the per-boot,
        // per-instance and per-once variants have no comment form.
        let has_comment_form = part_type::lookup_by_mime(&essence)
            .is_some_and(|t| t.comment_line().is_some());
        comment_type = Some(SHEBANG.to_string());
        comment_line = has_comment_form.then_some(first);
        comment_line_included = true;
    } else if let Some(part_type) = part_type::lookup_by_mime(&essence) {
        comment_type = part_type.comment_line().map(str::to_string);
        comment_line.clone_from(&comment_type);
    }

    let mime_version = headers.remove("MIME-Version");

    debug!(
        mime_type = %mime_type,
        comment_line = comment_line.as_deref().unwrap_or(""),
        included = comment_line_included,
        "classified part"
    );

    Ok(Part {
        content: Some(content),
        mime_type,
        mime_version,
        comment_line,
        comment_type,
        comment_line_included,
        headers,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: serde_json::Value) -> Content {
        Content::structured(&value).unwrap()
    }

    #[test]
    fn test_null_part() {
        let part = Part::new(Content::Null).unwrap();
        assert!(part.is_null());
        assert_eq!(part.mime_type(), "");
        assert!(part.headers().is_empty());
        assert_eq!(part.render(&RenderOptions::default()), None);
        assert_eq!(part.render(&RenderOptions::sub_part()), None);
    }

    #[test]
    fn test_comment_header_cloud_config() {
        let part = Part::new("#cloud-config\npackages:\n- jq\n").unwrap();
        assert_eq!(part.mime_type(), "text/cloud-config");
        assert_eq!(part.content(), Some("packages:\n- jq\n"));
        assert_eq!(part.comment_line(), Some("#cloud-config"));
        assert_eq!(part.comment_type(), Some("#cloud-config"));
        assert_eq!(part.comment_tag(), Some("cloud-config"));
        assert!(!part.comment_line_included());

        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "#cloud-config\npackages:\n- jq\n"
        );
    }

    #[test]
    fn test_force_mime_rendering() {
        let part = Part::new("#cloud-config\npackages:\n- jq\n").unwrap();
        let opts = RenderOptions::builder().force_mime(true).build();
        assert_eq!(
            part.render(&opts).unwrap(),
            "Content-Type: text/cloud-config\nMIME-Version: 1.0\n\npackages:\n- jq\n"
        );
        assert_eq!(
            part.render(&RenderOptions::sub_part()).unwrap(),
            "Content-Type: text/cloud-config\n\npackages:\n- jq\n"
        );
    }

    #[test]
    fn test_shebang_part() {
        let part = Part::new("#!/bin/bash\necho hi").unwrap();
        assert_eq!(part.mime_type(), "text/x-shellscript");
        assert_eq!(part.comment_line(), Some("#!/bin/bash"));
        assert_eq!(part.comment_type(), Some("#!"));
        assert_eq!(part.comment_tag(), Some("!"));
        assert!(part.comment_line_included());
        assert_eq!(part.content(), Some("#!/bin/bash\necho hi"));

        let rendered = part.render(&RenderOptions::default()).unwrap();
        assert_eq!(rendered, "#!/bin/bash\necho hi");
        assert_eq!(rendered.matches("#!/bin/bash").count(), 1);

        let mime = part.render(&RenderOptions::sub_part()).unwrap();
        assert_eq!(mime, "Content-Type: text/x-shellscript\n\n#!/bin/bash\necho hi");
    }

    #[test]
    fn test_boothook_keeps_inner_shebang() {
        let part = Part::new("#boothook\n#!/bin/bash\necho hi").unwrap();
        assert_eq!(part.mime_type(), "text/cloud-boothook");
        assert_eq!(part.content(), Some("#!/bin/bash\necho hi"));
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "#boothook\n#!/bin/bash\necho hi"
        );
    }

    #[test]
    fn test_jinja_header() {
        let part = Part::new("## template: jinja\n#cloud-config\n").unwrap();
        assert_eq!(part.mime_type(), "text/jinja2");
        assert_eq!(part.content(), Some("#cloud-config\n"));
    }

    #[test]
    fn test_unrecognized_header() {
        let err = Part::new("#not-a-thing\nbody").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedHeader(ref line) if line == "#not-a-thing"));
    }

    #[test]
    fn test_unidentifiable_content() {
        let err = Part::new("just some text\nmore").unwrap_err();
        assert!(matches!(err, Error::UnidentifiableContent(_)));

        // A single line can't carry a header line and a body.
        let err = Part::new("#cloud-config").unwrap_err();
        assert!(matches!(err, Error::UnidentifiableContent(_)));
    }

    #[test]
    fn test_mime_header_block() {
        let text = "Content-Type: text/x-include-url\nMIME-Version: 2.0\nX-Note: a\n\nhttp://example.com/a\n";
        let part = Part::builder(text)
            .header("X-Note", "overridden")
            .header("X-Other", "b")
            .build()
            .unwrap();
        assert_eq!(part.mime_type(), "text/x-include-url");
        assert_eq!(part.mime_version(), Some("2.0"));
        assert_eq!(part.content(), Some("http://example.com/a\n"));
        assert_eq!(part.headers().get("X-Note"), Some("a"));
        assert_eq!(part.headers().get("X-Other"), Some("b"));
        assert!(part.headers().get("Content-Type").is_none());
        assert!(part.headers().get("MIME-Version").is_none());

        // Registry has a comment form for include-url.
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "#include\nhttp://example.com/a\n"
        );
        let opts = RenderOptions::builder().force_mime(true).build();
        assert_eq!(
            part.render(&opts).unwrap(),
            "Content-Type: text/x-include-url\nMIME-Version: 2.0\nX-Note: a\nX-Other: b\n\nhttp://example.com/a\n"
        );
    }

    #[test]
    fn test_mime_header_block_missing_content_type() {
        let err = Part::new("MIME-Version: 1.0\nX-A: b\n\nbody").unwrap_err();
        assert!(matches!(err, Error::MissingContentType(_)));
    }

    #[test]
    fn test_explicit_mime_type_without_comment_form() {
        let part = Part::builder("some data")
            .mime_type("text/plain")
            .build()
            .unwrap();
        assert!(part.comment_line().is_none());
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "Content-Type: text/plain\nMIME-Version: 1.0\n\nsome data"
        );
    }

    #[test]
    fn test_content_type_from_headers() {
        let part = Part::builder("echo hi")
            .header("Content-Type", "text/upstart-job")
            .build()
            .unwrap();
        assert_eq!(part.mime_type(), "text/upstart-job");
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "#upstart-job\necho hi"
        );
    }

    #[test]
    fn test_explicit_mime_type_with_parameters() {
        let part = Part::builder("a: 1\n")
            .mime_type("text/cloud-config; charset=utf-8")
            .build()
            .unwrap();
        assert_eq!(part.comment_line(), Some("#cloud-config"));
        assert_eq!(part.mime_type(), "text/cloud-config; charset=utf-8");
    }

    #[test]
    fn test_shell_script_requires_shebang() {
        let err = Part::builder("echo hi")
            .mime_type("text/x-shellscript-per-boot")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingShebang { .. }));

        let part = Part::builder("#!/bin/sh\necho hi")
            .mime_type("text/x-shellscript-per-boot")
            .build()
            .unwrap();
        assert!(part.comment_line_included());
        assert_eq!(part.comment_type(), Some("#!"));
        assert_eq!(part.comment_line(), None);
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "Content-Type: text/x-shellscript-per-boot\nMIME-Version: 1.0\n\n#!/bin/sh\necho hi"
        );

        let part = Part::builder("#!/bin/sh\necho hi")
            .mime_type("text/x-shellscript")
            .build()
            .unwrap();
        assert_eq!(part.comment_line(), Some("#!/bin/sh"));
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "#!/bin/sh\necho hi"
        );
    }

    #[test]
    fn test_structured_defaults_to_cloud_config() {
        let part = Part::new(structured(json!({"packages": ["jq"]}))).unwrap();
        assert_eq!(part.mime_type(), CLOUD_CONFIG_MIME_TYPE);
        assert_eq!(part.content(), Some("packages:\n- jq\n"));
        assert_eq!(
            part.render(&RenderOptions::default()).unwrap(),
            "#cloud-config\npackages:\n- jq\n"
        );
    }

    #[test]
    fn test_structured_with_explicit_type() {
        let part = Part::builder(structured(json!({"a": 1})))
            .mime_type("text/cloud-config-archive")
            .build()
            .unwrap();
        assert_eq!(part.mime_type(), "text/cloud-config-archive");
        assert_eq!(part.comment_line(), Some("#cloud-config-archive"));
    }

    #[test]
    fn test_from_header_suppressed() {
        let part = Part::builder("body")
            .mime_type("text/plain")
            .header("From", "nobody@example.com")
            .header("X-Keep", "1")
            .build()
            .unwrap();

        let stripped = part.render(&RenderOptions::sub_part()).unwrap();
        assert!(!stripped.contains("From:"));
        assert!(stripped.contains("X-Keep: 1\n"));

        let opts = RenderOptions::builder()
            .include_mime_version(false)
            .force_mime(true)
            .include_from(true)
            .build();
        assert!(part.render(&opts).unwrap().contains("From: nobody@example.com\n"));
    }

    #[test]
    fn test_mime_headers_keep_order_without_from() {
        let part = Part::builder("body")
            .mime_type("text/plain")
            .header("X-First", "1")
            .header("From", "nobody@example.com")
            .header("X-Second", "2")
            .build()
            .unwrap();
        assert_eq!(part.comment_tag(), None);
        assert_eq!(
            part.render(&RenderOptions::sub_part()).unwrap(),
            "Content-Type: text/plain\nX-First: 1\nX-Second: 2\n\nbody"
        );
    }

    #[test]
    fn test_clone_existing_part() {
        let original = Part::new("#cloud-config\na: 1\n").unwrap();
        let copy = Part::builder(original.clone())
            .mime_type("text/ignored")
            .build()
            .unwrap();
        assert_eq!(copy, original);
    }

    #[test]
    fn test_extract_headers() {
        let (body, headers) = Part::extract_headers("Content-Type: text/cloud-config\n\nx: 1\n");
        assert_eq!(body, "x: 1\n");
        assert_eq!(headers.get("Content-Type"), Some("text/cloud-config"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let part = Part::new("#cloud-config\na: 1\n").unwrap();
        let opts = RenderOptions::default();
        assert_eq!(part.render(&opts), part.render(&opts));
    }
}
