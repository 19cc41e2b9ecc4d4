//! Step logs recorded for a single application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::AppId;

/// Full step history of one application, oldest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationLogs {
    /// Application the steps belong to.
    pub app_id: AppId,
    /// Recorded steps in execution order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One executed action with its outcome.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Step {
    /// Position of the step in the application's history.
    pub sequence_id: u64,
    /// Name of the action that ran.
    pub action: String,
    /// When the action started.
    pub start_time: DateTime<Utc>,
    /// When the action finished, if it has.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Value returned by the action.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error message when the action raised.
    #[serde(default)]
    pub exception: Option<String>,
}

impl Step {
    /// Whether the step completed without raising.
    pub fn succeeded(&self) -> bool {
        self.end_time.is_some() && self.exception.is_none()
    }

    /// Wall-clock duration, when the step has finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
