//! Mock service configuration.
//!
//! Built from environment variables at startup.

use telemetry_models::ProjectId;

/// Settings for the `mock-telemetry` binary.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Port to listen on (default `7241`).
    pub listen_port: u16,
    /// Projects created empty at startup.
    pub projects: Vec<ProjectId>,
}

impl MockConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                 | Default                                   | Description              |
    /// |--------------------------|-------------------------------------------|--------------------------|
    /// | `MOCK_TELEMETRY_PORT`     | `7241`                                    | HTTP listen port         |
    /// | `MOCK_TELEMETRY_PROJECTS` | `demo:email-assistant,demo:chatbot`       | Comma-separated projects |
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("MOCK_TELEMETRY_PORT").ok().as_deref(),
            std::env::var("MOCK_TELEMETRY_PROJECTS").ok().as_deref(),
        )
    }

    fn from_vars(port: Option<&str>, projects: Option<&str>) -> Self {
        let listen_port = port.and_then(|v| v.parse().ok()).unwrap_or(7241);
        let projects = projects
            .unwrap_or("demo:email-assistant,demo:chatbot")
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ProjectId::new)
            .collect();
        Self {
            listen_port,
            projects,
        }
    }
}
