//! Input content accepted when building a part.

use crate::error::{Error, Result};
use crate::part::Part;
use serde::Serialize;
use serde_json::{Map, Value};

/// Structured key/value data, rendered as YAML.
///
/// Insertion order does not matter: keys are sorted when the data is
/// marshalled, so the YAML output is stable.
pub type StructuredData = Map<String, Value>;

/// Content from which a [`Part`] is built.
#[derive(Debug, Clone, Default)]
pub enum Content {
    /// A null part. It is dropped from rendered output.
    #[default]
    Null,
    /// Raw text: a comment-tagged script or config, a MIME header block
    /// followed by a body, or a plain body when a MIME type is given.
    Text(String),
    /// Structured data, marshalled to YAML and typed `text/cloud-config`
    /// unless another MIME type is given.
    Structured(StructuredData),
    /// An already-built part, cloned as is.
    Existing(Box<Part>),
}

impl Content {
    /// Builds structured content from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted, or if it does not
    /// serialize to a key/value mapping.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self::Structured(map)),
            Value::Null => Ok(Self::Null),
            other => Err(Error::NotAMapping(kind_of(&other).to_string())),
        }
    }

    /// Returns true if this is null content.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Marshals structured data to YAML text in block style, with the keys of
/// every mapping sorted.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn to_yaml(data: &StructuredData) -> Result<String> {
    let sorted = sorted_mapping(data)?;
    serde_yaml::to_string(&sorted).map_err(Into::into)
}

// serde_json::Map keeps insertion order when `preserve_order` is enabled
// anywhere in the build.
fn sorted_mapping(map: &StructuredData) -> Result<serde_yaml::Value> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut mapping = serde_yaml::Mapping::with_capacity(entries.len());
    for (key, value) in entries {
        mapping.insert(serde_yaml::Value::String(key.clone()), sorted_value(value)?);
    }
    Ok(serde_yaml::Value::Mapping(mapping))
}

fn sorted_value(value: &Value) -> Result<serde_yaml::Value> {
    match value {
        Value::Object(map) => sorted_mapping(map),
        Value::Array(items) => items
            .iter()
            .map(sorted_value)
            .collect::<Result<Vec<_>>>()
            .map(serde_yaml::Value::Sequence),
        scalar => serde_yaml::to_value(scalar).map_err(Into::into),
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Option<String>> for Content {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::Null, Self::Text)
    }
}

impl From<StructuredData> for Content {
    fn from(data: StructuredData) -> Self {
        Self::Structured(data)
    }
}

impl From<Part> for Content {
    fn from(part: Part) -> Self {
        Self::Existing(Box::new(part))
    }
}
