//! Which assistant screen to show.
//!
//! The mode is a pure function of the last state emitted by the service.
//! There is no client-side transition table: a new stage only appears when
//! the service's response says so.

use telemetry_models::{AssistantState, NextStep};

/// The assistant screen for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantView {
    /// No state loaded: pick or create an application.
    Empty,
    /// Collect the email and the response instructions.
    SubmitInitial,
    /// Show the current state and collect one answer per question.
    SubmitAnswers,
    /// Show the latest draft and collect feedback on it.
    SubmitFeedback,
    /// Workflow finished: show the final draft.
    Completed,
}

impl AssistantView {
    /// Select the view for the latest server-emitted state.
    pub fn from_state(state: Option<&AssistantState>) -> Self {
        let Some(state) = state else {
            return AssistantView::Empty;
        };
        match state.next_step {
            Some(NextStep::ProcessInput) => AssistantView::SubmitInitial,
            Some(NextStep::ClarifyInstructions) => AssistantView::SubmitAnswers,
            Some(NextStep::ProcessFeedback) => AssistantView::SubmitFeedback,
            None => AssistantView::Completed,
        }
    }

    /// Title shown above the view.
    pub fn title(self) -> &'static str {
        match self {
            AssistantView::Empty => "Email assistant",
            AssistantView::SubmitInitial => "New email",
            AssistantView::SubmitAnswers => "Clarifications",
            AssistantView::SubmitFeedback => "Feedback",
            AssistantView::Completed => "Final draft",
        }
    }

    /// Whether the view shows the email and instructions read-only.
    pub fn shows_current_state(self) -> bool {
        matches!(
            self,
            AssistantView::SubmitAnswers | AssistantView::SubmitFeedback | AssistantView::Completed
        )
    }
}
