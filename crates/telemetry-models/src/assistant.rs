//! Email-assistant workflow state and the bodies of its mutations.
//!
//! The service owns the workflow. After every call it returns the complete
//! [`AssistantState`], whose [`next_step`](AssistantState::next_step) tells
//! the client which input to collect next. Clients never compute the next
//! step themselves.
//!
//! ```text
//! ProcessInput ──initialize_draft──▶ ClarifyInstructions
//!                                        │ answer_questions
//!                                        ▼
//!                                   ProcessFeedback ──provide_feedback──┐
//!                                        ▲                              │
//!                                        └──────── non-empty ───────────┤
//!                                                                empty  ▼
//!                                                                  (finished)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::AppId;

// ---------------------------------------------------------------------------
// NextStep
// ---------------------------------------------------------------------------

/// Stage the workflow is waiting in.
///
/// Serialized as a snake_case string. A finished workflow carries no step at
/// all (`null` on the wire, `None` in [`AssistantState::next_step`]).
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NextStep {
    /// Waiting for the email to answer and the response instructions.
    ProcessInput,
    /// Waiting for answers to the assistant's clarification questions.
    ClarifyInstructions,
    /// Waiting for feedback on the latest draft.
    ProcessFeedback,
}

impl std::str::FromStr for NextStep {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process_input" => Ok(NextStep::ProcessInput),
            "clarify_instructions" => Ok(NextStep::ClarifyInstructions),
            "process_feedback" => Ok(NextStep::ProcessFeedback),
            other => Err(ModelError::UnknownStep {
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// AssistantState
// ---------------------------------------------------------------------------

/// Snapshot of one email-assistant application, as last emitted by the
/// service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssistantState {
    /// Application this state belongs to.
    pub app_id: AppId,
    /// The email the user wants to answer.
    #[serde(default)]
    pub email_to_respond: Option<String>,
    /// How the user wants the answer written.
    #[serde(default)]
    pub response_instructions: Option<String>,
    /// Clarification questions asked by the assistant.
    #[serde(default)]
    pub questions: Option<Vec<String>>,
    /// Answers to [`Self::questions`], in the same order.
    #[serde(default)]
    pub answers: Option<Vec<String>>,
    /// Every draft produced so far, oldest first.
    #[serde(default)]
    pub drafts: Vec<String>,
    /// Feedback given on the drafts, oldest first.
    #[serde(default)]
    pub feedbacks: Vec<String>,
    /// The accepted draft, once the workflow has finished.
    #[serde(default)]
    pub final_draft: Option<String>,
    /// What the service expects next; `None` once finished.
    pub next_step: Option<NextStep>,
}

impl AssistantState {
    /// A freshly created application waiting for its first input.
    pub fn new(app_id: AppId) -> Self {
        Self {
            app_id,
            email_to_respond: None,
            response_instructions: None,
            questions: None,
            answers: None,
            drafts: Vec::new(),
            feedbacks: Vec::new(),
            final_draft: None,
            next_step: Some(NextStep::ProcessInput),
        }
    }

    /// Pending clarification questions, empty when none were asked.
    pub fn pending_questions(&self) -> &[String] {
        self.questions.as_deref().unwrap_or_default()
    }

    /// The most recent draft, if any.
    pub fn latest_draft(&self) -> Option<&str> {
        self.drafts.last().map(String::as_str)
    }

    /// Whether the workflow has run to completion.
    pub fn is_finished(&self) -> bool {
        self.next_step.is_none()
    }
}

// ---------------------------------------------------------------------------
// Mutation bodies
// ---------------------------------------------------------------------------

/// Body of the "initialize draft" mutation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftInit {
    /// The email to respond to.
    pub email_to_respond: String,
    /// Instructions for the response.
    pub response_instructions: String,
}

/// Body of the "answer questions" mutation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionAnswers {
    /// One answer per question, in question order.
    pub answers: Vec<String>,
}

/// Body of the "provide feedback" mutation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedbacks {
    /// Feedback lines; an empty list accepts the latest draft.
    pub feedbacks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_step_wire_names() {
        assert_eq!(
            serde_json::to_string(&NextStep::ClarifyInstructions).unwrap(),
            "\"clarify_instructions\""
        );
        assert_eq!(NextStep::ProcessFeedback.to_string(), "process_feedback");
        let name: &'static str = NextStep::ProcessInput.into();
        assert_eq!(name, "process_input");
    }

    #[test]
    fn next_step_parse_round_trips_every_variant() {
        use strum::IntoEnumIterator;
        for step in NextStep::iter() {
            assert_eq!(step.to_string().parse::<NextStep>().unwrap(), step);
        }
        assert!(matches!(
            "final_result".parse::<NextStep>(),
            Err(ModelError::UnknownStep { .. })
        ));
    }

    #[test]
    fn null_next_step_means_finished() {
        let json = r#"{
            "app_id": "a1",
            "email_to_respond": "hi",
            "response_instructions": "be brief",
            "questions": ["q1"],
            "answers": ["a1"],
            "drafts": ["d1"],
            "feedbacks": [],
            "final_draft": "d1",
            "next_step": null
        }"#;
        let state: AssistantState = serde_json::from_str(json).unwrap();
        assert!(state.is_finished());
        assert_eq!(state.latest_draft(), Some("d1"));
    }

    #[test]
    fn unknown_next_step_is_rejected() {
        let json = r#"{"app_id": "a1", "next_step": "final_result"}"#;
        assert!(serde_json::from_str::<AssistantState>(json).is_err());
    }

    #[test]
    fn new_state_waits_for_input() {
        let state = AssistantState::new(AppId::new("a1"));
        assert_eq!(state.next_step, Some(NextStep::ProcessInput));
        assert!(state.pending_questions().is_empty());
        assert!(state.latest_draft().is_none());
    }
}
