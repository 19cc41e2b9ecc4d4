//! Structured validation errors returned with HTTP 422.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of a 422 response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct HttpValidationError {
    /// One entry per rejected field.
    #[serde(default)]
    pub detail: Vec<ValidationError>,
}

/// A single rejected field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path to the offending value, e.g. `["query", "prompt"]`.
    pub loc: Vec<LocItem>,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable error kind.
    #[serde(rename = "type")]
    pub kind: String,
}

/// One component of a [`ValidationError::loc`] path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum LocItem {
    /// Field or parameter name.
    Name(String),
    /// Index into a list.
    Index(u64),
}

impl fmt::Display for LocItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocItem::Name(name) => f.write_str(name),
            LocItem::Index(i) => write!(f, "{i}"),
        }
    }
}

impl ValidationError {
    /// Error for a named request field.
    pub fn field(section: &str, name: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec![LocItem::Name(section.into()), LocItem::Name(name.into())],
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.loc.iter().map(ToString::to_string).collect();
        write!(f, "{}: {}", path.join("."), self.msg)
    }
}

impl fmt::Display for HttpValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            return f.write_str("validation failed");
        }
        let parts: Vec<String> = self.detail.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<ValidationError> for HttpValidationError {
    fn from(error: ValidationError) -> Self {
        Self {
            detail: vec![error],
        }
    }
}
