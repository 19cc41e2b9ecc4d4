//! Mock telemetry service: serves the tracking API from memory.

use mock_telemetry::{MockConfig, MockService};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = MockConfig::from_env();

    let mut service = MockService::new();
    for project in &config.projects {
        info!(project = %project, "project registered");
        service = service.with_project(project);
    }

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    service.serve(listener).await
}
