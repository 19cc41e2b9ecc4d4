//! Server-side progression of the email-assistant workflow.
//!
//! Each function checks that the state is waiting for the given input,
//! applies it, and moves `next_step` forward. The client only ever sees the
//! resulting state.

use telemetry_models::{AssistantState, DraftInit, NextStep, ValidationError};

use crate::error::MockError;

/// Ensure `state` is waiting for `step`.
fn expect_step(state: &AssistantState, step: NextStep) -> Result<(), MockError> {
    if state.next_step == Some(step) {
        return Ok(());
    }
    let expected = state
        .next_step
        .map_or_else(|| "finished".to_string(), |s| s.to_string());
    Err(MockError::WrongStep {
        expected,
        got: step,
    })
}

/// Questions the assistant asks before drafting.
fn clarification_questions(draft: &DraftInit) -> Vec<String> {
    let mut questions = vec![
        "Who should the reply be addressed to?".to_string(),
        "What tone should the reply take?".to_string(),
    ];
    if draft.email_to_respond.contains('?') {
        questions.push("Should the reply answer every question in the email?".to_string());
    }
    questions
}

fn compose_draft(state: &AssistantState) -> String {
    let instructions = state.response_instructions.as_deref().unwrap_or_default();
    let mut body = format!("Hello,\n\n{instructions}");
    if let Some(answers) = &state.answers {
        for answer in answers.iter().filter(|a| !a.trim().is_empty()) {
            body.push_str("\n- ");
            body.push_str(answer);
        }
    }
    for feedback in &state.feedbacks {
        body.push_str("\n(revised: ");
        body.push_str(feedback);
        body.push(')');
    }
    body.push_str("\n\nBest regards");
    body
}

/// Apply the initial email and instructions.
pub fn initialize(state: &mut AssistantState, draft: DraftInit) -> Result<(), MockError> {
    expect_step(state, NextStep::ProcessInput)?;
    if draft.email_to_respond.trim().is_empty() {
        return Err(MockError::Invalid(ValidationError::field(
            "body",
            "email_to_respond",
            "email_to_respond must not be empty",
            "value_error",
        )));
    }
    state.questions = Some(clarification_questions(&draft));
    state.email_to_respond = Some(draft.email_to_respond);
    state.response_instructions = Some(draft.response_instructions);
    state.next_step = Some(NextStep::ClarifyInstructions);
    Ok(())
}

/// Apply answers to the clarification questions and produce a first draft.
pub fn answer(state: &mut AssistantState, answers: Vec<String>) -> Result<(), MockError> {
    expect_step(state, NextStep::ClarifyInstructions)?;
    let expected = state.pending_questions().len();
    if answers.len() != expected {
        return Err(MockError::Invalid(ValidationError::field(
            "body",
            "answers",
            format!("expected {expected} answers, got {}", answers.len()),
            "value_error.list",
        )));
    }
    state.answers = Some(answers);
    let draft = compose_draft(state);
    state.drafts.push(draft);
    state.next_step = Some(NextStep::ProcessFeedback);
    Ok(())
}

/// Apply feedback on the latest draft.
///
/// Empty feedback accepts the latest draft and finishes the workflow;
/// otherwise a revised draft is produced and more feedback is expected.
pub fn feedback(state: &mut AssistantState, feedbacks: Vec<String>) -> Result<(), MockError> {
    expect_step(state, NextStep::ProcessFeedback)?;
    let feedbacks: Vec<String> = feedbacks
        .into_iter()
        .filter(|f| !f.trim().is_empty())
        .collect();
    if feedbacks.is_empty() {
        state.final_draft = state.drafts.last().cloned();
        state.next_step = None;
        return Ok(());
    }
    state.feedbacks.extend(feedbacks);
    let draft = compose_draft(state);
    state.drafts.push(draft);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_models::AppId;

    fn initialized() -> AssistantState {
        let mut state = AssistantState::new(AppId::new("a"));
        initialize(
            &mut state,
            DraftInit {
                email_to_respond: "Lunch?".into(),
                response_instructions: "Say yes".into(),
            },
        )
        .unwrap();
        state
    }

    #[test]
    fn initialize_asks_questions() {
        let state = initialized();
        assert_eq!(state.next_step, Some(NextStep::ClarifyInstructions));
        assert_eq!(state.pending_questions().len(), 3);
        assert_eq!(state.email_to_respond.as_deref(), Some("Lunch?"));
    }

    #[test]
    fn initialize_rejects_empty_email() {
        let mut state = AssistantState::new(AppId::new("a"));
        let err = initialize(&mut state, DraftInit::default()).unwrap_err();
        assert!(matches!(err, MockError::Invalid(_)));
        assert_eq!(state, AssistantState::new(AppId::new("a")));
    }

    #[test]
    fn answers_must_match_question_count() {
        let mut state = initialized();
        let before = state.clone();
        assert!(answer(&mut state, vec!["only one".into()]).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn answers_produce_a_draft() {
        let mut state = initialized();
        answer(&mut state, vec!["Bob".into(), "warm".into(), "yes".into()]).unwrap();
        assert_eq!(state.next_step, Some(NextStep::ProcessFeedback));
        let draft = state.latest_draft().unwrap();
        assert!(draft.contains("Say yes"));
        assert!(draft.contains("- Bob"));
    }

    #[test]
    fn feedback_revises_until_empty() {
        let mut state = initialized();
        answer(&mut state, vec![String::new(); 3]).unwrap();
        feedback(&mut state, vec!["shorter".into()]).unwrap();
        assert_eq!(state.drafts.len(), 2);
        assert_eq!(state.next_step, Some(NextStep::ProcessFeedback));

        feedback(&mut state, vec!["  ".into()]).unwrap();
        assert!(state.is_finished());
        assert_eq!(state.final_draft, state.drafts.last().cloned());
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut state = AssistantState::new(AppId::new("a"));
        let err = answer(&mut state, vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "application is waiting for process_input, not clarify_instructions"
        );
    }
}
