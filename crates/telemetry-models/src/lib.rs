#![deny(missing_docs)]

//! # Telemetry Models
//!
//! Wire types for the telemetry tracking API: projects, applications and
//! their step logs, chat history, and the email-assistant workflow state.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ids`] | `ProjectId`, `AppId` and the `create_new` sentinel |
//! | [`project`] | `Project`, `ApplicationSummary` |
//! | [`logs`] | `ApplicationLogs`, `Step` |
//! | [`chat`] | `ChatItem`, `Role`, `ChatType` |
//! | [`assistant`] | `AssistantState`, `NextStep`, mutation bodies |
//! | [`validation`] | HTTP 422 payload |

pub mod assistant;
pub mod chat;
pub mod error;
pub mod ids;
pub mod logs;
pub mod project;
pub mod validation;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `telemetry_models::AppId` directly.
pub use assistant::*;
pub use chat::*;
pub use error::*;
pub use ids::*;
pub use logs::*;
pub use project::*;
pub use validation::*;
