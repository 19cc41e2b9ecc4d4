//! High-level HTTP client for the tracking API.
//!
//! [`TelemetryClient`] exposes one async method per REST endpoint. Each call
//! issues exactly one request and returns the typed payload, or an
//! [`SdkError`] describing why it could not. Nothing is retried or cached.
//!
//! # Typical usage
//!
//! ```rust,no_run
//! use telemetry_models::ProjectId;
//! use telemetry_sdk::TelemetryClient;
//!
//! # async fn run() -> Result<(), telemetry_sdk::SdkError> {
//! let client = TelemetryClient::new("http://localhost:7241")?;
//! for app in client.apps(&ProjectId::new("demo:email-assistant")).await? {
//!     println!("{} ({} steps)", app.app_id, app.num_steps);
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use telemetry_models::{
    AppId, ApplicationLogs, ApplicationSummary, AssistantState, ChatItem, DraftInit, Feedbacks,
    HttpValidationError, Project, ProjectId, QuestionAnswers,
};
use tracing::debug;

use crate::error::SdkError;
use crate::routes::{ApiPath, ApiRoutes, AssistantOp};

/// Client bound to one tracking-service base URL.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TelemetryClient {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a client for the service at `base_url`.
    ///
    /// The URL may carry a path prefix (e.g. behind a reverse proxy); API
    /// paths are appended to it.
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, SdkError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SdkError::Config(format!("invalid base URL \"{base_url}\": {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SdkError::Config(format!(
                "base URL \"{base_url}\" cannot carry a path"
            )));
        }
        Ok(Self { http, base_url })
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Projects & applications
    // ------------------------------------------------------------------

    /// `GET /api/v0/projects`: every project visible to the user.
    pub async fn projects(&self) -> Result<Vec<Project>, SdkError> {
        self.get(&ApiRoutes::projects()).await
    }

    /// `GET /api/v0/{project_id}/apps`: application summaries of a project.
    pub async fn apps(&self, project: &ProjectId) -> Result<Vec<ApplicationSummary>, SdkError> {
        self.get(&ApiRoutes::apps(project)).await
    }

    /// `GET /api/v0/{project_id}/{app_id}/apps`: step logs of one application.
    pub async fn application_logs(
        &self,
        project: &ProjectId,
        app: &AppId,
    ) -> Result<ApplicationLogs, SdkError> {
        self.get(&ApiRoutes::application_logs(project, app)).await
    }

    /// `GET /api/v0/ready`: liveness check.
    pub async fn ready(&self) -> Result<bool, SdkError> {
        self.get(&ApiRoutes::ready()).await
    }

    // ------------------------------------------------------------------
    // Chatbot
    // ------------------------------------------------------------------

    /// `POST /api/v0/chatbot/response/{project_id}/{app_id}`: send a prompt.
    ///
    /// Returns the full chat history including the new exchange.
    pub async fn chat_response(
        &self,
        project: &ProjectId,
        app: &AppId,
        prompt: &str,
    ) -> Result<Vec<ChatItem>, SdkError> {
        let mut url = self.url(&ApiRoutes::chat_response(project, app))?;
        url.query_pairs_mut().append_pair("prompt", prompt);
        self.send(Method::POST, url, None::<&()>).await
    }

    /// `GET /api/v0/chatbot/response/{project_id}/{app_id}`: chat history.
    pub async fn chat_history(
        &self,
        project: &ProjectId,
        app: &AppId,
    ) -> Result<Vec<ChatItem>, SdkError> {
        self.get(&ApiRoutes::chat_response(project, app)).await
    }

    /// `POST /api/v0/chatbot/create/{project_id}/{app_id}`: create a chat
    /// application and return its identifier.
    pub async fn create_chat_application(
        &self,
        project: &ProjectId,
        app: &AppId,
    ) -> Result<AppId, SdkError> {
        self.post(&ApiRoutes::chat_create(project, app), None::<&()>)
            .await
    }

    // ------------------------------------------------------------------
    // Email assistant
    // ------------------------------------------------------------------

    /// `GET …/email_assistant/{project_id}/{app_id}/state`.
    pub async fn assistant_state(
        &self,
        project: &ProjectId,
        app: &AppId,
    ) -> Result<AssistantState, SdkError> {
        self.get(&ApiRoutes::assistant(project, app, AssistantOp::State))
            .await
    }

    /// `POST …/initialize_draft`: submit the email and instructions.
    ///
    /// Pass [`AppId::create_new`] to let the service allocate the
    /// application.
    pub async fn initialize_draft(
        &self,
        project: &ProjectId,
        app: &AppId,
        draft: &DraftInit,
    ) -> Result<AssistantState, SdkError> {
        let path = ApiRoutes::assistant(project, app, AssistantOp::InitializeDraft);
        self.post(&path, Some(draft)).await
    }

    /// `POST …/answer_questions`: answer the clarification questions.
    pub async fn answer_questions(
        &self,
        project: &ProjectId,
        app: &AppId,
        answers: &QuestionAnswers,
    ) -> Result<AssistantState, SdkError> {
        let path = ApiRoutes::assistant(project, app, AssistantOp::AnswerQuestions);
        self.post(&path, Some(answers)).await
    }

    /// `POST …/provide_feedback`: comment on the latest draft.
    pub async fn provide_feedback(
        &self,
        project: &ProjectId,
        app: &AppId,
        feedbacks: &Feedbacks,
    ) -> Result<AssistantState, SdkError> {
        let path = ApiRoutes::assistant(project, app, AssistantOp::ProvideFeedback);
        self.post(&path, Some(feedbacks)).await
    }

    /// `POST …/create`: create an email-assistant application.
    pub async fn create_assistant_application(
        &self,
        project: &ProjectId,
        app: &AppId,
    ) -> Result<AppId, SdkError> {
        let path = ApiRoutes::assistant(project, app, AssistantOp::Create);
        self.post(&path, None::<&()>).await
    }

    // ------------------------------------------------------------------
    // Static assets
    // ------------------------------------------------------------------

    /// `GET /{rest_of_path}`: a raw asset of the bundled dashboard.
    pub async fn static_asset(&self, rest_of_path: &str) -> Result<Vec<u8>, SdkError> {
        let url = self.url(&ApiRoutes::static_asset(rest_of_path))?;
        debug!(method = "GET", %url, "request");
        let res = self.http.get(url).send().await?;
        let res = check_status(res).await?;
        Ok(res.bytes().await?.to_vec())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn url(&self, path: &ApiPath) -> Result<Url, SdkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SdkError::Config(format!(
                    "base URL \"{}\" cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &ApiPath) -> Result<T, SdkError> {
        let url = self.url(path)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    async fn post<B, T>(&self, path: &ApiPath, body: Option<&B>) -> Result<T, SdkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.send(Method::POST, url, body).await
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, SdkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%method, %url, "request");
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = check_status(req.send().await?).await?;
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Turn a non-success response into the matching [`SdkError`].
async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, SdkError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await?;
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(detail) = serde_json::from_str::<HttpValidationError>(&text) {
            debug!(%status, error = %detail, "request rejected");
            return Err(SdkError::Validation(detail));
        }
    }
    debug!(%status, body = %text, "request failed");
    Err(SdkError::Status {
        status: status.as_u16(),
        body: text,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mock_telemetry::{MockService, SeedApp};
    use telemetry_models::{NextStep, Role};

    async fn client_for(service: MockService) -> TelemetryClient {
        let addr = service.spawn_local().await.unwrap();
        TelemetryClient::new(&format!("http://{addr}")).unwrap()
    }

    fn demo() -> ProjectId {
        ProjectId::new("demo:email-assistant")
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            TelemetryClient::new("not a url"),
            Err(SdkError::Config(_))
        ));
        assert!(matches!(
            TelemetryClient::new("mailto:ops@example.com"),
            Err(SdkError::Config(_))
        ));
    }

    #[test]
    fn urls_keep_base_prefix_and_encode_segments() {
        let client = TelemetryClient::new("http://localhost:7241/tracking/").unwrap();
        let url = client
            .url(&ApiRoutes::apps(&ProjectId::new("team a")))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:7241/tracking/api/v0/team%20a/apps");
    }

    #[tokio::test]
    async fn ready_reports_true() {
        let client = client_for(MockService::new()).await;
        assert!(client.ready().await.unwrap());
    }

    #[tokio::test]
    async fn lists_projects_and_apps() {
        let service = MockService::new()
            .with_app(&demo(), SeedApp::new("older", 2, 10))
            .with_app(&demo(), SeedApp::new("newer", 5, 60));
        let client = client_for(service).await;

        let projects = client.projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, demo());
        assert_eq!(projects[0].num_apps, 2);

        let mut apps = client.apps(&demo()).await.unwrap();
        apps.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].app_id, AppId::new("newer"));
        assert_eq!(apps[0].num_steps, 5);
    }

    #[tokio::test]
    async fn unknown_project_has_no_apps() {
        let client = client_for(MockService::new()).await;
        let apps = client.apps(&ProjectId::new("nobody")).await.unwrap();
        assert!(apps.is_empty());
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let client = client_for(MockService::new()).await;
        let p = ProjectId::new("demo:chatbot");
        let app = client
            .create_chat_application(&p, &AppId::new("chat1"))
            .await
            .unwrap();
        assert_eq!(app, AppId::new("chat1"));

        let history = client.chat_response(&p, &app, "hello there").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "hello there");
        assert_eq!(history[1].role, Role::Assistant);

        let again = client.chat_history(&p, &app).await.unwrap();
        assert_eq!(again, history);
    }

    #[tokio::test]
    async fn empty_prompt_is_a_validation_error() {
        let client = client_for(MockService::new()).await;
        let p = ProjectId::new("demo:chatbot");
        let app = client
            .create_chat_application(&p, &AppId::new("chat1"))
            .await
            .unwrap();
        let err = client.chat_response(&p, &app, "").await.unwrap_err();
        let detail = err.validation().expect("422 payload");
        assert_eq!(detail.detail[0].msg, "prompt must not be empty");
    }

    #[tokio::test]
    async fn unknown_application_state_is_a_validation_error() {
        let client = client_for(MockService::new()).await;
        let err = client
            .assistant_state(&demo(), &AppId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[tokio::test]
    async fn rejected_create_new_initialize_stores_nothing() {
        let client = client_for(MockService::new()).await;
        let p = demo();
        let blank = DraftInit {
            email_to_respond: "  ".into(),
            response_instructions: "Accept politely".into(),
        };
        for _ in 0..3 {
            let err = client
                .initialize_draft(&p, &AppId::create_new(), &blank)
                .await
                .unwrap_err();
            assert!(matches!(err, SdkError::Validation(_)));
        }
        assert!(client.apps(&p).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assistant_workflow_advances_server_side() {
        let client = client_for(MockService::new()).await;
        let p = demo();

        let state = client
            .initialize_draft(
                &p,
                &AppId::create_new(),
                &DraftInit {
                    email_to_respond: "Can we meet Tuesday?".into(),
                    response_instructions: "Accept politely".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(state.next_step, Some(NextStep::ClarifyInstructions));
        assert!(!state.app_id.is_create_new());
        let questions = state.pending_questions().len();
        assert!(questions > 0);

        let app = state.app_id.clone();
        let state = client
            .answer_questions(
                &p,
                &app,
                &QuestionAnswers {
                    answers: vec!["yes".into(); questions],
                },
            )
            .await
            .unwrap();
        assert_eq!(state.next_step, Some(NextStep::ProcessFeedback));
        assert_eq!(state.drafts.len(), 1);

        let state = client
            .provide_feedback(&p, &app, &Feedbacks { feedbacks: vec![] })
            .await
            .unwrap();
        assert!(state.is_finished());
        assert_eq!(state.final_draft.as_deref(), state.latest_draft());

        let logs = client.application_logs(&p, &app).await.unwrap();
        let actions: Vec<&str> = logs.steps.iter().map(|s| s.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["process_input", "clarify_instructions", "process_feedback"]
        );
    }

    #[tokio::test]
    async fn static_asset_is_served() {
        let client = client_for(MockService::new()).await;
        let body = client.static_asset("index.html").await.unwrap();
        assert!(String::from_utf8(body).unwrap().contains("<html"));
    }
}
