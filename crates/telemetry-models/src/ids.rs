//! Identifier newtypes for projects and applications.
//!
//! Both identifiers are opaque strings chosen by the tracking service (or,
//! for applications, typed in by the user). They are kept as distinct types
//! so a project id can never be passed where an application id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// ProjectId
// ---------------------------------------------------------------------------

/// Identifier of a project, the top-level grouping of applications.
///
/// # Examples
///
/// ```
/// use telemetry_models::ProjectId;
///
/// let id = ProjectId::new("demo:email-assistant");
/// assert_eq!(id.to_string(), "demo:email-assistant");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a new project identifier.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for ProjectId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier {
                kind: "project",
                value: s.to_string(),
            });
        }
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AppId
// ---------------------------------------------------------------------------

/// Identifier of one application instance (a conversation or workflow run).
///
/// The special value [`AppId::CREATE_NEW`] asks the service to allocate a
/// fresh identifier instead of addressing an existing application.
///
/// # Examples
///
/// ```
/// use telemetry_models::AppId;
///
/// let id: AppId = "demo1".into();
/// assert!(!id.is_create_new());
/// assert!(AppId::create_new().is_create_new());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Sentinel requesting server-side creation of a new application.
    pub const CREATE_NEW: &'static str = "create_new";

    /// Create a new application identifier.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// The [`Self::CREATE_NEW`] sentinel as an identifier.
    pub fn create_new() -> Self {
        Self(Self::CREATE_NEW.to_string())
    }

    /// Whether this identifier is the creation sentinel.
    pub fn is_create_new(&self) -> bool {
        self.0 == Self::CREATE_NEW
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for AppId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier {
                kind: "application",
                value: s.to_string(),
            });
        }
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
