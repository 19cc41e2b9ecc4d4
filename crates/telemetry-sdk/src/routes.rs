//! Canonical route definitions for the tracking API.
//!
//! Every path used by the client, and every route pattern mounted by the
//! mock service, is produced by [`ApiRoutes`], so both sides agree on a
//! single layout.
//!
//! # Route layout
//!
//! ```text
//! /api/v0/projects
//! /api/v0/ready
//! /api/v0/{project_id}/apps
//! /api/v0/{project_id}/{app_id}/apps
//! /api/v0/chatbot/response/{project_id}/{app_id}
//! /api/v0/chatbot/create/{project_id}/{app_id}
//! /api/v0/email_assistant/{project_id}/{app_id}/{state|initialize_draft|answer_questions|provide_feedback|create}
//! /{rest_of_path}
//! ```

use std::fmt;

use telemetry_models::{AppId, ProjectId};

/// Current API version segment.
const VERSION: &str = "v0";

/// A route as a list of unencoded path segments.
///
/// Segments are percent-encoded only when joined onto a base URL (see
/// [`crate::TelemetryClient`]), so identifiers containing `/` or spaces stay
/// single segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath(Vec<String>);

impl ApiPath {
    fn api(segments: &[&str]) -> Self {
        let mut all = vec!["api".to_string(), VERSION.to_string()];
        all.extend(segments.iter().map(|s| (*s).to_string()));
        Self(all)
    }

    /// The raw segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Which email-assistant operation a route addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantOp {
    /// `GET …/state`
    State,
    /// `POST …/initialize_draft`
    InitializeDraft,
    /// `POST …/answer_questions`
    AnswerQuestions,
    /// `POST …/provide_feedback`
    ProvideFeedback,
    /// `POST …/create`
    Create,
}

impl AssistantOp {
    /// Final path segment of the operation.
    pub fn segment(self) -> &'static str {
        match self {
            AssistantOp::State => "state",
            AssistantOp::InitializeDraft => "initialize_draft",
            AssistantOp::AnswerQuestions => "answer_questions",
            AssistantOp::ProvideFeedback => "provide_feedback",
            AssistantOp::Create => "create",
        }
    }
}

/// Central authority for all API paths.
///
/// # Examples
///
/// ```
/// use telemetry_models::{AppId, ProjectId};
/// use telemetry_sdk::ApiRoutes;
///
/// let project = ProjectId::new("demo");
/// let app = AppId::new("a1");
///
/// assert_eq!(ApiRoutes::apps(&project).to_string(), "/api/v0/demo/apps");
/// assert_eq!(
///     ApiRoutes::application_logs(&project, &app).to_string(),
///     "/api/v0/demo/a1/apps",
/// );
/// ```
pub struct ApiRoutes;

impl ApiRoutes {
    // ------------------------------------------------------------------
    // Concrete paths
    // ------------------------------------------------------------------

    /// All projects.
    pub fn projects() -> ApiPath {
        ApiPath::api(&["projects"])
    }

    /// Liveness check.
    pub fn ready() -> ApiPath {
        ApiPath::api(&["ready"])
    }

    /// Application summaries of a project.
    pub fn apps(project: &ProjectId) -> ApiPath {
        ApiPath::api(&[project.as_str(), "apps"])
    }

    /// Step logs of one application.
    pub fn application_logs(project: &ProjectId, app: &AppId) -> ApiPath {
        ApiPath::api(&[project.as_str(), app.as_str(), "apps"])
    }

    /// Chat history (GET) or new prompt (POST).
    pub fn chat_response(project: &ProjectId, app: &AppId) -> ApiPath {
        ApiPath::api(&["chatbot", "response", project.as_str(), app.as_str()])
    }

    /// Create a chat application.
    pub fn chat_create(project: &ProjectId, app: &AppId) -> ApiPath {
        ApiPath::api(&["chatbot", "create", project.as_str(), app.as_str()])
    }

    /// An email-assistant operation on one application.
    pub fn assistant(project: &ProjectId, app: &AppId, op: AssistantOp) -> ApiPath {
        ApiPath::api(&[
            "email_assistant",
            project.as_str(),
            app.as_str(),
            op.segment(),
        ])
    }

    /// A static asset of the bundled dashboard.
    pub fn static_asset(rest_of_path: &str) -> ApiPath {
        ApiPath(
            rest_of_path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    // ------------------------------------------------------------------
    // Route patterns (axum syntax)
    // ------------------------------------------------------------------

    /// Pattern for [`Self::projects`].
    pub const PROJECTS: &'static str = "/api/v0/projects";
    /// Pattern for [`Self::ready`].
    pub const READY: &'static str = "/api/v0/ready";
    /// Pattern for [`Self::apps`].
    pub const APPS: &'static str = "/api/v0/{project_id}/apps";
    /// Pattern for [`Self::application_logs`].
    pub const APPLICATION_LOGS: &'static str = "/api/v0/{project_id}/{app_id}/apps";
    /// Pattern for [`Self::chat_response`].
    pub const CHAT_RESPONSE: &'static str = "/api/v0/chatbot/response/{project_id}/{app_id}";
    /// Pattern for [`Self::chat_create`].
    pub const CHAT_CREATE: &'static str = "/api/v0/chatbot/create/{project_id}/{app_id}";
    /// Pattern for [`Self::static_asset`].
    pub const STATIC_ASSET: &'static str = "/{*rest_of_path}";

    /// Pattern for [`Self::assistant`] with the given operation.
    pub fn assistant_pattern(op: AssistantOp) -> String {
        format!(
            "/api/{VERSION}/email_assistant/{{project_id}}/{{app_id}}/{}",
            op.segment()
        )
    }
}
