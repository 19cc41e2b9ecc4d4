//! # Mock telemetry service
//!
//! An in-memory stand-in for the tracking service. It mounts every route of
//! [`telemetry_sdk::ApiRoutes`] and advances the email-assistant workflow
//! the way the real service does, so the client and terminal UI can be run
//! and tested without a backend.
//!
//! ```rust,no_run
//! use mock_telemetry::{MockService, SeedApp};
//! use telemetry_models::ProjectId;
//!
//! # async fn run() -> std::io::Result<()> {
//! let addr = MockService::new()
//!     .with_app(&ProjectId::new("demo:email-assistant"), SeedApp::new("demo1", 3, 10))
//!     .spawn_local()
//!     .await?;
//! println!("mock service on http://{addr}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod handlers;
pub mod store;
pub mod workflow;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use telemetry_models::ProjectId;
use telemetry_sdk::{ApiRoutes, AssistantOp};
use tokio::net::TcpListener;
use tracing::{error, info};

pub use config::MockConfig;
pub use error::MockError;
pub use store::{SeedApp, Store};

use handlers::SharedStore;

/// The mock service: a shared store plus the routes that serve it.
#[derive(Clone, Default)]
pub struct MockService {
    store: SharedStore,
}

impl MockService {
    /// An empty service with no projects.
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
        }
    }

    /// Pre-create an empty project.
    #[must_use]
    pub fn with_project(self, project: &ProjectId) -> Self {
        if let Ok(mut store) = self.store.lock() {
            store.ensure_project(project);
        }
        self
    }

    /// Pre-load an application into a project.
    #[must_use]
    pub fn with_app(self, project: &ProjectId, app: SeedApp) -> Self {
        if let Ok(mut store) = self.store.lock() {
            store.seed(project, app);
        }
        self
    }

    /// Build the router serving every tracking-API route.
    pub fn router(&self) -> Router {
        Router::new()
            .route(ApiRoutes::PROJECTS, get(handlers::projects))
            .route(ApiRoutes::READY, get(handlers::ready))
            .route(ApiRoutes::APPS, get(handlers::apps))
            .route(ApiRoutes::APPLICATION_LOGS, get(handlers::application_logs))
            .route(
                ApiRoutes::CHAT_RESPONSE,
                get(handlers::chat_history).post(handlers::chat_response),
            )
            .route(ApiRoutes::CHAT_CREATE, post(handlers::create_application))
            .route(
                &ApiRoutes::assistant_pattern(AssistantOp::State),
                get(handlers::assistant_state),
            )
            .route(
                &ApiRoutes::assistant_pattern(AssistantOp::InitializeDraft),
                post(handlers::initialize_draft),
            )
            .route(
                &ApiRoutes::assistant_pattern(AssistantOp::AnswerQuestions),
                post(handlers::answer_questions),
            )
            .route(
                &ApiRoutes::assistant_pattern(AssistantOp::ProvideFeedback),
                post(handlers::provide_feedback),
            )
            .route(
                &ApiRoutes::assistant_pattern(AssistantOp::Create),
                post(handlers::create_application),
            )
            .route(ApiRoutes::STATIC_ASSET, get(handlers::static_asset))
            .with_state(self.store.clone())
    }

    /// Serve on `listener` until the process exits.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        info!(address = ?listener.local_addr().ok(), "mock telemetry service listening");
        axum::serve(listener, app).await
    }

    /// Bind an ephemeral port on 127.0.0.1 and serve in the background.
    ///
    /// Returns the bound address. Intended for tests and demos.
    pub async fn spawn_local(self) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = self.serve(listener).await {
                error!(error = %e, "mock telemetry service stopped");
            }
        });
        Ok(addr)
    }
}
