//! # cloudinit-gen
//!
//! Build cloud-init user-data documents.
//!
//! ## Features
//!
//! - **Type inference**: Recognizes `#cloud-config`, `#boothook`, `#!` and the
//!   other cloud-init comment headers, as well as embedded MIME header blocks
//! - **Structured config**: Key/value data is rendered as YAML and typed
//!   `text/cloud-config`
//! - **Compact output**: Single-part documents keep the terse comment header
//! - **Multipart**: Several parts are wrapped in `multipart/mixed` with a
//!   boundary guaranteed absent from every part
//! - **Size ceiling**: Payloads reaching 16383 bytes are gzip-compressed
//!   deterministically; still-oversized payloads are rejected
//!
//! ## Quick Start
//!
//! ### Single Part
//!
//! ```ignore
//! use cloudinit_gen::Document;
//!
//! let doc = Document::from_content("#!/bin/bash\necho hello")?;
//! assert_eq!(doc.render_text()?.as_deref(), Some("#!/bin/bash\necho hello"));
//! ```
//!
//! ### Multipart Documents
//!
//! ```ignore
//! use cloudinit_gen::{Content, Document};
//! use serde_json::json;
//!
//! let mut user_data = Document::new();
//! user_data
//!     .add("#boothook\n#!/bin/bash\necho booted > /var/log/boothook.log")?
//!     .add(Content::structured(&json!({ "packages": ["jq"] }))?)?;
//!
//! // Pass this to the cloud provider at instance creation time.
//! let encoded = user_data.render_base64(true)?;
//! ```
//!
//! ### Explicit Types and Headers
//!
//! ```ignore
//! use cloudinit_gen::{Document, Headers};
//!
//! let mut doc = Document::new();
//! doc.add_with(
//!     "https://example.com/cloud-config.yaml",
//!     Some("text/x-include-url"),
//!     Headers::new().with("X-Origin", "provisioner"),
//! )?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content;
mod content_type;
mod document;
mod error;
mod header;
mod options;
mod part;
mod render;
mod simple;

pub mod encoding;
pub mod part_type;

pub use content::{Content, StructuredData};
pub use content_type::ContentType;
pub use document::{Document, DocumentInput, choose_boundary};
pub use error::{Error, Result};
pub use header::Headers;
pub use options::{
    DEFAULT_MIME_VERSION, GZIP_FIXED_MTIME, GZIP_LEVEL, MAX_USER_DATA_SIZE, RenderOptions,
    RenderOptionsBuilder,
};
pub use part::{CLOUD_CONFIG_MIME_TYPE, Part, PartBuilder};
pub use part_type::PartType;
pub use render::Renderable;
pub use simple::{render_cloud_init_base64, render_cloud_init_binary, render_cloud_init_text};
