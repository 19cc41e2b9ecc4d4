//! CLI configuration.
//!
//! Defaults come from environment variables; command-line flags override
//! them in `main`.

use std::path::PathBuf;

use telemetry_models::ProjectId;

const APP_DIR: &str = "telemetry-cli";
const LOG_FILE: &str = "telemetry.log";

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Base URL of the tracking service.
    pub base_url: String,
    /// Project the assistant view works in.
    pub project: ProjectId,
    /// Where the terminal UI writes its logs.
    pub log_file: PathBuf,
}

impl CliConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable             | Default                          | Description               |
    /// |----------------------|----------------------------------|---------------------------|
    /// | `TELEMETRY_URL`      | `http://localhost:7241`          | Tracking service base URL |
    /// | `TELEMETRY_PROJECT`  | `demo:email-assistant`           | Assistant project         |
    /// | `TELEMETRY_LOG_FILE` | `<cache dir>/telemetry-cli/telemetry.log` | TUI log file     |
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("TELEMETRY_URL").ok(),
            std::env::var("TELEMETRY_PROJECT").ok(),
            std::env::var("TELEMETRY_LOG_FILE").ok(),
        )
    }

    fn from_vars(url: Option<String>, project: Option<String>, log_file: Option<String>) -> Self {
        let base_url = url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:7241".to_string());
        let project = project
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| ProjectId::new("demo:email-assistant"), ProjectId::from);
        let log_file = log_file.map_or_else(default_log_file, PathBuf::from);
        Self {
            base_url,
            project,
            log_file,
        }
    }
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join(LOG_FILE)
}
