//! Registry of part types known to cloud-init.
//!
//! Each entry correlates a MIME type with its `#` comment header convention,
//! e.g. `Content-Type: text/cloud-config` with `#cloud-config`. The renderer
//! uses it to pick the tersest valid rendering of a part.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Comment line that identifies a shebang-style part. The rest of the line
/// (the interpreter) varies per script.
pub const SHEBANG: &str = "#!";

/// Shell-script MIME types. Content of these types must begin with a shebang
/// line, which stays part of the content.
pub const SHELL_SCRIPT_MIME_TYPES: [&str; 4] = [
    "text/x-shellscript",
    "text/x-shellscript-per-boot",
    "text/x-shellscript-per-instance",
    "text/x-shellscript-per-once",
];

/// A registry entry mapping a MIME subtype to its optional comment tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartType {
    mime_subtype: &'static str,
    mime_type: String,
    comment_tag: Option<&'static str>,
    comment_line: Option<String>,
}

impl PartType {
    fn new(mime_subtype: &'static str, comment_tag: Option<&'static str>) -> Self {
        Self {
            mime_subtype,
            mime_type: format!("text/{mime_subtype}"),
            comment_tag,
            comment_line: comment_tag.map(|tag| format!("#{tag}")),
        }
    }

    /// MIME subtype without the leading `text/`.
    #[must_use]
    pub const fn mime_subtype(&self) -> &'static str {
        self.mime_subtype
    }

    /// Full MIME type, e.g. `text/cloud-boothook`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Comment tag without the leading `#`. For shebang types this is `!`.
    #[must_use]
    pub const fn comment_tag(&self) -> Option<&'static str> {
        self.comment_tag
    }

    /// Comment line (`#` + tag), or `None` when the type has no comment form
    /// and always needs full MIME headers.
    #[must_use]
    pub fn comment_line(&self) -> Option<&str> {
        self.comment_line.as_deref()
    }
}

/// (subtype, comment tag) pairs known to cloud-init.
const PART_TYPES: [(&str, Option<&str>); 13] = [
    // Script run early in boot; content still carries its own shebang.
    ("cloud-boothook", Some("boothook")),
    ("cloud-config", Some("cloud-config")),
    // YAML list of documents, similar to multipart.
    ("cloud-config-archive", Some("cloud-config-archive")),
    // Fine-grained merging with vendor-provided cloud-config.
    ("cloud-config-jsonp", Some("cloud-config-jsonp")),
    // Second line names the rendered part type.
    ("jinja2", Some("# template: jinja")),
    ("part-handler", Some("part-handler")),
    ("upstart-job", Some("upstart-job")),
    ("x-include-once-url", Some("include-once")),
    ("x-include-url", Some("include")),
    ("x-shellscript", Some("!")),
    ("x-shellscript-per-boot", None),
    ("x-shellscript-per-instance", None),
    ("x-shellscript-per-once", None),
];

struct Registry {
    by_mime: HashMap<String, PartType>,
    by_comment: HashMap<String, PartType>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let types: Vec<PartType> = PART_TYPES
        .iter()
        .map(|&(subtype, tag)| PartType::new(subtype, tag))
        .collect();

    let by_comment = types
        .iter()
        .filter_map(|t| t.comment_line.clone().map(|line| (line, t.clone())))
        .collect();
    let by_mime = types
        .into_iter()
        .map(|t| (t.mime_type.clone(), t))
        .collect();

    Registry {
        by_mime,
        by_comment,
    }
});

/// Looks up a part type by full MIME type, e.g. `text/cloud-config`.
///
/// Matching is case-insensitive.
#[must_use]
pub fn lookup_by_mime(mime_type: &str) -> Option<&'static PartType> {
    REGISTRY.by_mime.get(&mime_type.trim().to_lowercase())
}

/// Looks up a part type by comment line, e.g. `#cloud-config`.
///
/// For shebang lines pass just [`SHEBANG`], not the whole interpreter line.
#[must_use]
pub fn lookup_by_comment(comment_line: &str) -> Option<&'static PartType> {
    REGISTRY.by_comment.get(comment_line)
}

/// Returns true if `mime_type` is one of the shell-script types.
#[must_use]
pub fn is_shell_script(mime_type: &str) -> bool {
    SHELL_SCRIPT_MIME_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(mime_type.trim()))
}
