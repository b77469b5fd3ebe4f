//! Complete cloud-init user-data documents.

use crate::content::{Content, StructuredData};
use crate::content_type::ContentType;
use crate::encoding::{encode_base64, gzip_deterministic};
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::options::{DEFAULT_MIME_VERSION, MAX_USER_DATA_SIZE, RenderOptions};
use crate::part::Part;
use crate::render::Renderable;
use std::fmt::Write as _;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
enum Body {
    Parts(Vec<Box<dyn Renderable>>),
    Raw(Vec<u8>),
}

/// A complete user-data document.
///
/// Holds either an ordered list of parts or a raw, already rendered payload.
/// Zero parts render to nothing, a single part renders bare, and two or more
/// parts are wrapped in a `multipart/mixed` MIME envelope.
#[derive(Debug, Clone)]
pub struct Document {
    body: Body,
}

/// Input accepted when creating a document.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// Content for a single initial part.
    Content(Content),
    /// A raw payload passed through verbatim.
    Raw(Vec<u8>),
    /// An existing document to clone.
    Document(Document),
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            body: Body::Parts(Vec::new()),
        }
    }

    /// Creates a document with a single initial part.
    ///
    /// # Errors
    ///
    /// Returns an error if the part cannot be built.
    pub fn from_content(content: impl Into<Content>) -> Result<Self> {
        let mut doc = Self::new();
        doc.add(content)?;
        Ok(doc)
    }

    /// Creates a document with a single initial part of an explicit MIME type
    /// and extra headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the part cannot be built.
    pub fn from_content_with(
        content: impl Into<Content>,
        mime_type: Option<&str>,
        headers: Headers,
    ) -> Result<Self> {
        let mut doc = Self::new();
        doc.add_with(content, mime_type, headers)?;
        Ok(doc)
    }

    /// Creates a document from a raw, already rendered payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload exceeds
    /// [`MAX_USER_DATA_SIZE`].
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Result<Self> {
        let raw = raw.into();
        if raw.len() > MAX_USER_DATA_SIZE {
            warn!(size = raw.len(), "raw user-data too big");
            return Err(Error::PayloadTooLarge {
                uncompressed: raw.len(),
                compressed: None,
            });
        }
        Ok(Self {
            body: Body::Raw(raw),
        })
    }

    /// Creates a document from any supported input.
    ///
    /// # Errors
    ///
    /// Returns an error if the raw payload is too big or the initial part
    /// cannot be built.
    pub fn from_input(input: impl Into<DocumentInput>) -> Result<Self> {
        match input.into() {
            DocumentInput::Content(content) => Self::from_content(content),
            DocumentInput::Raw(raw) => Self::from_raw(raw),
            DocumentInput::Document(doc) => Ok(doc),
        }
    }

    /// Adds a part, inferring its MIME type from the content.
    ///
    /// Null content is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the document holds a raw payload or the part
    /// cannot be built.
    pub fn add(&mut self, content: impl Into<Content>) -> Result<&mut Self> {
        self.add_with(content, None, Headers::new())
    }

    /// Adds a part with an optional explicit MIME type and extra headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the document holds a raw payload or the part
    /// cannot be built.
    pub fn add_with(
        &mut self,
        content: impl Into<Content>,
        mime_type: Option<&str>,
        headers: Headers,
    ) -> Result<&mut Self> {
        if self.is_raw() {
            return Err(Error::RawBinaryConflict);
        }
        let part = match content.into() {
            Content::Null => {
                trace!("ignoring null content");
                return Ok(self);
            }
            Content::Existing(part) => *part,
            content => Part::builder(content)
                .maybe_mime_type(mime_type)
                .headers(headers)
                .build()?,
        };
        push_part(self.parts_mut()?, Box::new(part));
        Ok(self)
    }

    /// Adds structured data as a `text/cloud-config` part.
    ///
    /// # Errors
    ///
    /// Returns an error if the document holds a raw payload or YAML
    /// serialization fails.
    pub fn add_structured(&mut self, data: StructuredData) -> Result<&mut Self> {
        self.add(Content::Structured(data))
    }

    /// Adds any renderable item as a part, e.g. a nested document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RawBinaryConflict`] if the document holds a raw
    /// payload.
    pub fn add_renderable(&mut self, item: Box<dyn Renderable>) -> Result<&mut Self> {
        push_part(self.parts_mut()?, item);
        Ok(self)
    }

    fn parts_mut(&mut self) -> Result<&mut Vec<Box<dyn Renderable>>> {
        match &mut self.body {
            Body::Parts(parts) => Ok(parts),
            Body::Raw(_) => Err(Error::RawBinaryConflict),
        }
    }

    /// Returns true if the document renders to nothing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(&self.body, Body::Parts(parts) if parts.is_empty())
    }

    /// Returns true if the document holds a raw payload.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self.body, Body::Raw(_))
    }

    /// The raw payload, if the document was created from one.
    #[must_use]
    pub fn raw_binary(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Raw(raw) => Some(raw),
            Body::Parts(_) => None,
        }
    }

    /// Number of (non-null) parts. Zero for raw documents.
    #[must_use]
    pub fn parts_len(&self) -> usize {
        match &self.body {
            Body::Parts(parts) => parts.len(),
            Body::Raw(_) => 0,
        }
    }

    /// Renders the document as text suitable for cloud-init.
    ///
    /// A raw payload is decoded as UTF-8. Returns `None` for an empty
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MimeVersionRequired`] if the document has parts and
    /// `include_mime_version` is off: cloud-init requires the header on the
    /// outermost document.
    pub fn render(&self, options: &RenderOptions) -> Result<Option<String>> {
        if let Body::Parts(parts) = &self.body {
            if !parts.is_empty() && !options.include_mime_version {
                return Err(Error::MimeVersionRequired);
            }
        }
        self.render_nested(options)
    }

    /// Renders with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if a part fails to render or a raw payload is not
    /// valid UTF-8.
    pub fn render_text(&self) -> Result<Option<String>> {
        self.render(&RenderOptions::default())
    }

    /// Renders the document as bytes, gzip-compressing payloads that reach
    /// [`MAX_USER_DATA_SIZE`].
    ///
    /// A raw payload is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload is still too big
    /// after compression, or any error from [`Document::render`].
    pub fn render_binary(&self, include_mime_version: bool) -> Result<Option<Vec<u8>>> {
        if let Body::Raw(raw) = &self.body {
            return Ok(Some(raw.clone()));
        }

        let options = RenderOptions::builder()
            .include_mime_version(include_mime_version)
            .build();
        let Some(text) = self.render(&options)? else {
            return Ok(None);
        };

        let bytes = text.into_bytes();
        if bytes.len() < MAX_USER_DATA_SIZE {
            return Ok(Some(bytes));
        }

        let compressed = gzip_deterministic(&bytes)?;
        debug!(
            uncompressed = bytes.len(),
            compressed = compressed.len(),
            "compressed user-data"
        );
        if compressed.len() >= MAX_USER_DATA_SIZE {
            warn!(
                uncompressed = bytes.len(),
                compressed = compressed.len(),
                "user-data too big after compression"
            );
            return Err(Error::PayloadTooLarge {
                uncompressed: bytes.len(),
                compressed: Some(compressed.len()),
            });
        }
        Ok(Some(compressed))
    }

    /// Renders the document as base64 of [`Document::render_binary`].
    ///
    /// # Errors
    ///
    /// Returns any error from [`Document::render_binary`].
    pub fn render_base64(&self, include_mime_version: bool) -> Result<Option<String>> {
        Ok(self
            .render_binary(include_mime_version)?
            .map(|bytes| encode_base64(&bytes)))
    }

    fn render_nested(&self, options: &RenderOptions) -> Result<Option<String>> {
        match &self.body {
            Body::Raw(raw) => Ok(Some(String::from_utf8(raw.clone())?)),
            Body::Parts(parts) => match parts.as_slice() {
                [] => Ok(None),
                [single] => single.render(options),
                parts => render_multipart(parts, options.include_mime_version).map(Some),
            },
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderable for Document {
    fn is_null(&self) -> bool {
        Self::is_null(self)
    }

    /// Renders the document as a child of another document. The
    /// outermost-only MIME-Version requirement is not applied here.
    fn render(&self, options: &RenderOptions) -> Result<Option<String>> {
        self.render_nested(options)
    }

    fn box_clone(&self) -> Box<dyn Renderable> {
        Box::new(self.clone())
    }
}

fn push_part(parts: &mut Vec<Box<dyn Renderable>>, item: Box<dyn Renderable>) {
    if item.is_null() {
        trace!("dropping null part");
    } else {
        parts.push(item);
    }
}

fn render_multipart(parts: &[Box<dyn Renderable>], include_mime_version: bool) -> Result<String> {
    let sub_options = RenderOptions::sub_part();
    let mut rendered = Vec::with_capacity(parts.len());
    for part in parts {
        if let Some(text) = part.render(&sub_options)? {
            rendered.push(text);
        }
    }

    let boundary = choose_boundary(&rendered);
    let content_type = ContentType::multipart_mixed(boundary.as_str());

    let mut out = String::with_capacity(rendered.iter().map(String::len).sum::<usize>() + 128);
    let _ = writeln!(out, "Content-Type: {content_type}");
    if include_mime_version {
        let _ = writeln!(out, "MIME-Version: {DEFAULT_MIME_VERSION}");
    }
    out.push('\n');
    for text in &rendered {
        let _ = writeln!(out, "--{boundary}\n{text}");
    }
    let _ = writeln!(out, "--{boundary}--");
    Ok(out)
}

/// Picks the first boundary `::n::` (n = 0, 1, 2, ...) that occurs in none
/// of the rendered parts.
#[must_use]
pub fn choose_boundary<S: AsRef<str>>(rendered: &[S]) -> String {
    let mut n: u64 = 0;
    loop {
        let boundary = format!("::{n}::");
        if rendered.iter().all(|text| !text.as_ref().contains(&boundary)) {
            debug!(boundary = %boundary, attempts = n + 1, "selected multipart boundary");
            return boundary;
        }
        n += 1;
    }
}

impl From<Content> for DocumentInput {
    fn from(content: Content) -> Self {
        Self::Content(content)
    }
}

impl From<&str> for DocumentInput {
    fn from(text: &str) -> Self {
        Self::Content(text.into())
    }
}

impl From<String> for DocumentInput {
    fn from(text: String) -> Self {
        Self::Content(text.into())
    }
}

impl From<StructuredData> for DocumentInput {
    fn from(data: StructuredData) -> Self {
        Self::Content(data.into())
    }
}

impl From<Part> for DocumentInput {
    fn from(part: Part) -> Self {
        Self::Content(part.into())
    }
}

impl From<Vec<u8>> for DocumentInput {
    fn from(raw: Vec<u8>) -> Self {
        Self::Raw(raw)
    }
}

impl From<&[u8]> for DocumentInput {
    fn from(raw: &[u8]) -> Self {
        Self::Raw(raw.to_vec())
    }
}

impl From<Document> for DocumentInput {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}
