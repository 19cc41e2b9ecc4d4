//! Text-input forms for each assistant view.
//!
//! A form is rebuilt from scratch every time a new state arrives, so its
//! shape always matches the state on screen: the answer form has exactly one
//! field per displayed question.

use telemetry_models::{AssistantState, DraftInit, Feedbacks, QuestionAnswers};

use crate::session::Mutation;
use crate::view::AssistantView;

/// A labelled single-value input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub label: String,
    pub value: String,
}

/// An ordered set of fields with one focused field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    fields: Vec<TextField>,
    focused: usize,
}

impl Form {
    fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: labels
                .into_iter()
                .map(|label| TextField {
                    label: label.into(),
                    value: String::new(),
                })
                .collect(),
            focused: 0,
        }
    }

    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Whether the focused field is the last one (or there are none).
    pub fn on_last_field(&self) -> bool {
        self.fields.is_empty() || self.focused + 1 == self.fields.len()
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.value.pop();
        }
    }

    fn values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }
}

/// The form belonging to the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveForm {
    /// Nothing to fill in.
    None,
    /// Email and instructions.
    Draft(Form),
    /// One answer per clarification question.
    Answers(Form),
    /// Feedback on the latest draft.
    Feedback(Form),
}

impl ActiveForm {
    /// Fresh, empty form for `state`.
    pub fn for_state(state: Option<&AssistantState>) -> Self {
        match AssistantView::from_state(state) {
            AssistantView::Empty | AssistantView::Completed => ActiveForm::None,
            AssistantView::SubmitInitial => ActiveForm::new_draft(),
            AssistantView::SubmitAnswers => {
                let questions = state.map(AssistantState::pending_questions).unwrap_or_default();
                ActiveForm::Answers(Form::new(questions.iter().cloned()))
            }
            AssistantView::SubmitFeedback => ActiveForm::Feedback(Form::new([
                "Feedback (leave empty to accept the draft)",
            ])),
        }
    }

    /// Empty draft form for a workflow that has no application yet.
    pub fn new_draft() -> Self {
        ActiveForm::Draft(Form::new(["Email to respond to", "Response instructions"]))
    }

    pub fn form(&self) -> Option<&Form> {
        match self {
            ActiveForm::None => None,
            ActiveForm::Draft(form) | ActiveForm::Answers(form) | ActiveForm::Feedback(form) => {
                Some(form)
            }
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        match self {
            ActiveForm::None => None,
            ActiveForm::Draft(form) | ActiveForm::Answers(form) | ActiveForm::Feedback(form) => {
                Some(form)
            }
        }
    }

    /// The mutation that submitting this form sends.
    pub fn submission(&self) -> Option<Mutation> {
        match self {
            ActiveForm::None => None,
            ActiveForm::Draft(form) => {
                let mut values = form.values().into_iter();
                Some(Mutation::Initialize(DraftInit {
                    email_to_respond: values.next().unwrap_or_default(),
                    response_instructions: values.next().unwrap_or_default(),
                }))
            }
            ActiveForm::Answers(form) => Some(Mutation::Answer(QuestionAnswers {
                answers: form.values(),
            })),
            ActiveForm::Feedback(form) => {
                let feedbacks = form
                    .values()
                    .into_iter()
                    .filter(|v| !v.trim().is_empty())
                    .collect();
                Some(Mutation::Feedback(Feedbacks { feedbacks }))
            }
        }
    }
}
