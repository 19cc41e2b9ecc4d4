//! Client-side copy of one email-assistant application.
//!
//! [`AssistantSession`] holds the last state the service emitted and the
//! application it belongs to. Requests are described as owned
//! [`AssistantRequest`]s so they can run on a spawned task; their outcome is
//! fed back through [`AssistantSession::apply`]. A successful response
//! replaces the local state wholesale. A failed one is logged and leaves the
//! previous state untouched.

use telemetry_models::{
    AppId, AssistantState, DraftInit, Feedbacks, ProjectId, QuestionAnswers,
};
use telemetry_sdk::{SdkError, TelemetryClient};
use tracing::{info, warn};

use crate::view::AssistantView;

/// A call that yields a fresh [`AssistantState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Re-fetch the state without changing it.
    Refresh,
    /// Submit the email and instructions.
    Initialize(DraftInit),
    /// Answer the clarification questions.
    Answer(QuestionAnswers),
    /// Comment on (or accept) the latest draft.
    Feedback(Feedbacks),
}

impl Mutation {
    /// Endpoint name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Refresh => "refresh",
            Mutation::Initialize(_) => "initialize_draft",
            Mutation::Answer(_) => "answer_questions",
            Mutation::Feedback(_) => "provide_feedback",
        }
    }
}

/// A fully addressed request, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantRequest {
    pub project: ProjectId,
    pub app: AppId,
    pub mutation: Mutation,
}

impl AssistantRequest {
    /// Issue the request. Exactly one HTTP call; no retry.
    pub async fn execute(self, client: &TelemetryClient) -> Result<AssistantState, SdkError> {
        let Self {
            project,
            app,
            mutation,
        } = self;
        match mutation {
            Mutation::Refresh => client.assistant_state(&project, &app).await,
            Mutation::Initialize(draft) => client.initialize_draft(&project, &app, &draft).await,
            Mutation::Answer(answers) => client.answer_questions(&project, &app, &answers).await,
            Mutation::Feedback(feedbacks) => {
                client.provide_feedback(&project, &app, &feedbacks).await
            }
        }
    }
}

/// Local view of one assistant application.
#[derive(Debug, Clone)]
pub struct AssistantSession {
    project: ProjectId,
    app: Option<AppId>,
    state: Option<AssistantState>,
}

impl AssistantSession {
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            app: None,
            state: None,
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// The selected application, if any.
    pub fn app(&self) -> Option<&AppId> {
        self.app.as_ref()
    }

    /// The last state the service emitted.
    pub fn state(&self) -> Option<&AssistantState> {
        self.state.as_ref()
    }

    pub fn view(&self) -> AssistantView {
        AssistantView::from_state(self.state.as_ref())
    }

    /// Switch to another application, discarding the current state.
    ///
    /// Returns `false` when `app` is already selected.
    pub fn select_app(&mut self, app: AppId) -> bool {
        if self.app.as_ref() == Some(&app) {
            return false;
        }
        info!(project = %self.project, app = %app, "application selected");
        self.app = Some(app);
        self.state = None;
        true
    }

    /// Forget the current application so the next initialize asks the
    /// service to allocate one.
    pub fn start_new(&mut self) {
        info!(project = %self.project, "starting a new application");
        self.app = None;
        self.state = None;
    }

    /// Address `mutation` to the current application.
    ///
    /// Without a selected application the request falls back to the id in
    /// the current state, then to the `create_new` sentinel so the service
    /// allocates one.
    pub fn request(&self, mutation: Mutation) -> AssistantRequest {
        let app = self
            .app
            .clone()
            .or_else(|| self.state.as_ref().map(|s| s.app_id.clone()))
            .unwrap_or_else(AppId::create_new);
        AssistantRequest {
            project: self.project.clone(),
            app,
            mutation,
        }
    }

    /// Record the outcome of a request.
    ///
    /// On success the response becomes the new state, and its application
    /// becomes current when none was selected. On failure nothing changes
    /// and the error is handed back for display.
    pub fn apply(&mut self, outcome: Result<AssistantState, SdkError>) -> Result<(), SdkError> {
        match outcome {
            Ok(state) => {
                info!(
                    app = %state.app_id,
                    next_step = ?state.next_step,
                    "assistant state updated"
                );
                if self.app.is_none() {
                    self.app = Some(state.app_id.clone());
                }
                self.state = Some(state);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "assistant request failed; keeping previous state");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_telemetry::MockService;
    use telemetry_models::NextStep;

    async fn client() -> TelemetryClient {
        let addr = MockService::new().spawn_local().await.unwrap();
        TelemetryClient::new(&format!("http://{addr}")).unwrap()
    }

    fn project() -> ProjectId {
        ProjectId::new("demo:email-assistant")
    }

    /// Address, execute and apply a mutation, as the UI does across its
    /// spawned task.
    async fn send(
        session: &mut AssistantSession,
        client: &TelemetryClient,
        mutation: Mutation,
    ) -> Result<(), SdkError> {
        let outcome = session.request(mutation).execute(client).await;
        session.apply(outcome)
    }

    fn draft() -> DraftInit {
        DraftInit {
            email_to_respond: "Are you free Friday?".into(),
            response_instructions: "Decline".into(),
        }
    }

    #[test]
    fn requests_without_an_app_use_the_create_sentinel() {
        let session = AssistantSession::new(project());
        let request = session.request(Mutation::Initialize(draft()));
        assert!(request.app.is_create_new());
        assert_eq!(request.project, project());
    }

    #[test]
    fn selecting_another_app_discards_state() {
        let mut session = AssistantSession::new(project());
        assert!(session.select_app(AppId::new("a")));
        session
            .apply(Ok(AssistantState::new(AppId::new("a"))))
            .unwrap();
        assert_eq!(session.view(), AssistantView::SubmitInitial);

        assert!(!session.select_app(AppId::new("a")));
        assert!(session.state().is_some());

        assert!(session.select_app(AppId::new("b")));
        assert!(session.state().is_none());
        assert_eq!(session.view(), AssistantView::Empty);
    }

    #[test]
    fn start_new_targets_the_create_sentinel_again() {
        let mut session = AssistantSession::new(project());
        session.select_app(AppId::new("a"));
        session
            .apply(Ok(AssistantState::new(AppId::new("a"))))
            .unwrap();
        session.start_new();
        assert!(session.app().is_none());
        assert_eq!(session.view(), AssistantView::Empty);
        assert!(session.request(Mutation::Refresh).app.is_create_new());
    }

    #[tokio::test]
    async fn initialize_switches_to_the_view_the_response_implies() {
        let client = client().await;
        let mut session = AssistantSession::new(project());
        session.select_app(AppId::new("demo1"));
        client
            .create_assistant_application(&project(), &AppId::new("demo1"))
            .await
            .unwrap();

        send(&mut session, &client, Mutation::Refresh).await.unwrap();
        assert_eq!(session.view(), AssistantView::SubmitInitial);

        send(&mut session, &client, Mutation::Initialize(draft()))
            .await
            .unwrap();
        let state = session.state().unwrap();
        assert_eq!(state.next_step, Some(NextStep::ClarifyInstructions));
        assert_eq!(session.view(), AssistantView::SubmitAnswers);
    }

    #[tokio::test]
    async fn create_new_adopts_the_allocated_app() {
        let client = client().await;
        let mut session = AssistantSession::new(project());
        send(&mut session, &client, Mutation::Initialize(draft()))
            .await
            .unwrap();
        let app = session.app().cloned().unwrap();
        assert!(!app.is_create_new());
        assert_eq!(session.state().unwrap().app_id, app);
    }

    #[tokio::test]
    async fn validation_error_leaves_state_unchanged() {
        let client = client().await;
        let mut session = AssistantSession::new(project());
        send(&mut session, &client, Mutation::Initialize(draft()))
            .await
            .unwrap();
        let before = session.state().cloned();

        let err = send(
            &mut session,
            &client,
            Mutation::Answer(QuestionAnswers {
                answers: vec!["too few".into()],
            }),
        )
        .await
        .unwrap_err();
        assert!(err.validation().is_some());
        assert_eq!(session.state().cloned(), before);
        assert_eq!(session.view(), AssistantView::SubmitAnswers);
    }

    #[tokio::test]
    async fn transport_error_leaves_state_unchanged() {
        let mut session = AssistantSession::new(project());
        session.select_app(AppId::new("a"));
        session
            .apply(Ok(AssistantState::new(AppId::new("a"))))
            .unwrap();

        // Nothing listens on port 9 of the loopback interface.
        let offline = TelemetryClient::new("http://127.0.0.1:9").unwrap();
        assert!(send(&mut session, &offline, Mutation::Refresh).await.is_err());
        assert_eq!(session.view(), AssistantView::SubmitInitial);
    }
}
