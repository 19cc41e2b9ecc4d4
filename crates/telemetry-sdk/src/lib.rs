//! # Telemetry SDK
//!
//! Typed HTTP client for the telemetry tracking API.
//!
//! The SDK provides:
//!
//! * [`TelemetryClient`]: one async method per REST endpoint.
//! * [`ApiRoutes`]: canonical route definitions shared by clients and
//!   servers alike.
//! * [`SdkError`]: unified error type for all SDK operations.
//!
//! Model types from [`telemetry_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use telemetry_sdk::{AppId, DraftInit, ProjectId, TelemetryClient};
//!
//! # async fn run() -> Result<(), telemetry_sdk::SdkError> {
//! let client = TelemetryClient::new("http://localhost:7241")?;
//! let state = client
//!     .initialize_draft(
//!         &ProjectId::new("demo:email-assistant"),
//!         &AppId::create_new(),
//!         &DraftInit {
//!             email_to_respond: "Lunch on Friday?".into(),
//!             response_instructions: "Say yes".into(),
//!         },
//!     )
//!     .await?;
//! println!("next step: {:?}", state.next_step);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod routes;

pub use client::TelemetryClient;
pub use error::SdkError;
pub use routes::{ApiPath, ApiRoutes, AssistantOp};

// Re-export models for ergonomic usage.
pub use telemetry_models::{
    AppId, ApplicationLogs, ApplicationSummary, AssistantState, ChatItem, DraftInit, Feedbacks,
    NextStep, Project, ProjectId, QuestionAnswers,
};
