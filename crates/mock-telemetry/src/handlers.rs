//! Axum handlers, one per tracking-API route.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use telemetry_models::{
    AppId, ApplicationLogs, ApplicationSummary, AssistantState, ChatItem, DraftInit, Feedbacks,
    Project, ProjectId, QuestionAnswers, ValidationError,
};
use tracing::info;

use crate::error::MockError;
use crate::store::Store;
use crate::workflow;

/// Store shared by every handler.
pub type SharedStore = Arc<Mutex<Store>>;

fn lock(store: &SharedStore) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Projects & applications
// ---------------------------------------------------------------------------

pub async fn projects(State(store): State<SharedStore>) -> Json<Vec<Project>> {
    Json(lock(&store).projects())
}

pub async fn apps(
    State(store): State<SharedStore>,
    Path(project): Path<ProjectId>,
) -> Json<Vec<ApplicationSummary>> {
    Json(lock(&store).apps(&project))
}

pub async fn application_logs(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
) -> Result<Json<ApplicationLogs>, MockError> {
    Ok(Json(lock(&store).logs(&project, &app)?))
}

pub async fn ready() -> Json<bool> {
    Json(true)
}

// ---------------------------------------------------------------------------
// Chatbot
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PromptQuery {
    prompt: Option<String>,
}

pub async fn chat_response(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
    Query(query): Query<PromptQuery>,
) -> Result<Json<Vec<ChatItem>>, MockError> {
    let prompt = query.prompt.unwrap_or_default();
    if prompt.trim().is_empty() {
        return Err(MockError::Invalid(ValidationError::field(
            "query",
            "prompt",
            "prompt must not be empty",
            "value_error",
        )));
    }
    let mut store = lock(&store);
    let record = store.app_mut(&project, &app)?;
    record.chat.push(ChatItem::user(prompt.clone()));
    record
        .chat
        .push(ChatItem::assistant(format!("You said: {prompt}")));
    record.record_step("chat_response", Some(json!({ "prompt": prompt })));
    info!(%project, %app, "chat prompt answered");
    Ok(Json(record.chat.clone()))
}

pub async fn chat_history(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
) -> Result<Json<Vec<ChatItem>>, MockError> {
    Ok(Json(lock(&store).app(&project, &app)?.chat.clone()))
}

pub async fn create_application(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
) -> Json<AppId> {
    let created = lock(&store).create(&project, &app);
    info!(%project, app = %created, "application created");
    Json(created)
}

// ---------------------------------------------------------------------------
// Email assistant
// ---------------------------------------------------------------------------

pub async fn assistant_state(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
) -> Result<Json<AssistantState>, MockError> {
    Ok(Json(lock(&store).app(&project, &app)?.assistant.clone()))
}

pub async fn initialize_draft(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
    body: Result<Json<DraftInit>, JsonRejection>,
) -> Result<Json<AssistantState>, MockError> {
    let Json(draft) = body?;
    let mut store = lock(&store);
    let fresh = app.is_create_new();
    let app = Store::allocate(&app);
    let mut next = if fresh {
        AssistantState::new(app.clone())
    } else {
        store.app(&project, &app)?.assistant.clone()
    };
    workflow::initialize(&mut next, draft)?;
    if fresh {
        store.create(&project, &app);
    }
    let record = store.app_mut(&project, &app)?;
    record.assistant = next;
    record.record_step("process_input", None);
    info!(%project, %app, "draft initialized");
    Ok(Json(record.assistant.clone()))
}

pub async fn answer_questions(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
    body: Result<Json<QuestionAnswers>, JsonRejection>,
) -> Result<Json<AssistantState>, MockError> {
    let Json(answers) = body?;
    let mut store = lock(&store);
    let record = store.app_mut(&project, &app)?;
    let mut next = record.assistant.clone();
    workflow::answer(&mut next, answers.answers)?;
    record.assistant = next;
    record.record_step("clarify_instructions", None);
    info!(%project, %app, "questions answered");
    Ok(Json(record.assistant.clone()))
}

pub async fn provide_feedback(
    State(store): State<SharedStore>,
    Path((project, app)): Path<(ProjectId, AppId)>,
    body: Result<Json<Feedbacks>, JsonRejection>,
) -> Result<Json<AssistantState>, MockError> {
    let Json(feedbacks) = body?;
    let mut store = lock(&store);
    let record = store.app_mut(&project, &app)?;
    let mut next = record.assistant.clone();
    workflow::feedback(&mut next, feedbacks.feedbacks)?;
    record.assistant = next;
    record.record_step("process_feedback", None);
    info!(%project, %app, finished = record.assistant.is_finished(), "feedback applied");
    Ok(Json(record.assistant.clone()))
}

// ---------------------------------------------------------------------------
// Static assets
// ---------------------------------------------------------------------------

const INDEX_HTML: &str = "<!doctype html>\n<html><head><title>Telemetry</title></head>\
<body><div id=\"root\"></div></body></html>\n";

/// Every path resolves to the dashboard's entry page.
pub async fn static_asset(Path(rest_of_path): Path<String>) -> impl IntoResponse {
    tracing::debug!(path = %rest_of_path, "static asset");
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], INDEX_HTML)
}
