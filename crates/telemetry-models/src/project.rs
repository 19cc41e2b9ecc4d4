//! Projects and application summaries as listed by the tracking service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AppId, ProjectId};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A project visible to the current user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    /// Display name.
    pub name: String,
    /// Identifier used in every project-scoped route.
    pub id: ProjectId,
    /// Location of the project's data on the service side.
    pub uri: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Time of the most recent write to any application in the project.
    pub last_written: DateTime<Utc>,
    /// Number of applications in the project.
    pub num_apps: u64,
}

// ---------------------------------------------------------------------------
// ApplicationSummary
// ---------------------------------------------------------------------------

/// One running application instance, as shown in selection lists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationSummary {
    /// Identifier of the application.
    pub app_id: AppId,
    /// Optional partition the application belongs to.
    #[serde(default)]
    pub partition_key: Option<String>,
    /// Time the first step was written.
    pub first_written: DateTime<Utc>,
    /// Time the most recent step was written.
    pub last_written: DateTime<Utc>,
    /// Number of steps recorded so far.
    pub num_steps: u64,
    /// Free-form tags attached by the application.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl ApplicationSummary {
    /// Summary for an application with no steps yet.
    pub fn empty(app_id: AppId, at: DateTime<Utc>) -> Self {
        Self {
            app_id,
            partition_key: None,
            first_written: at,
            last_written: at,
            num_steps: 0,
            tags: HashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
