//! Request and response bodies exchanged between the outcomes app and its
//! browser tests.

use chrono::{DateTime, Utc};
use outcomes::{
    ChoiceId, Feedback, Messages, Mode, Outcome, OutcomeEditorSession, OutcomeId, OutputChoice,
    PendingChoiceEdit, ValidationReport,
};
use serde::{Deserialize, Serialize};

pub const PAGE_TITLE: &str = "Outcomes";
pub const TABLE_COLUMNS: [&str; 5] = [
    "Output type",
    "Output choice",
    "Date Created",
    "Updated at",
    "Actions",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

impl TextPayload {
    pub fn new(text: impl Into<String>) -> Self {
        TextPayload { text: text.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderPayload {
    pub before: ChoiceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub id: OutcomeId,
    pub output_type: String,
    pub output_choice: String,
    pub date_created: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Outcome> for OutcomeRow {
    fn from(outcome: &Outcome) -> Self {
        OutcomeRow {
            id: outcome.id,
            output_type: outcome.name.clone(),
            output_choice: outcome.choice_texts().join(", "),
            date_created: outcome.created_at,
            updated_at: outcome.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomesTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<OutcomeRow>,
}

impl OutcomesTable {
    pub fn new(outcomes: &[Outcome]) -> Self {
        OutcomesTable {
            title: PAGE_TITLE.to_string(),
            columns: TABLE_COLUMNS.iter().map(|column| column.to_string()).collect(),
            rows: outcomes.iter().map(OutcomeRow::from).collect(),
        }
    }

    pub fn row(&self, output_type: &str) -> Option<&OutcomeRow> {
        self.rows.iter().find(|row| row.output_type == output_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDialogView {
    pub outcome_id: OutcomeId,
    /// `None` once the outcome has been removed by another client; the
    /// dialog still renders so it can be cancelled.
    pub outcome_name: Option<String>,
    pub title: String,
    pub prompt: String,
}

/// Everything a client needs to render its drawer and delete dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorView {
    pub mode: Mode,
    pub target_id: Option<OutcomeId>,
    pub draft_name: String,
    pub draft_choices: Vec<OutputChoice>,
    pub pending_choice_edit: Option<PendingChoiceEdit>,
    pub save_attempted: bool,
    pub feedback: Feedback,
    pub delete_dialog: Option<DeleteDialogView>,
}

impl EditorView {
    pub fn new(session: &OutcomeEditorSession, messages: &Messages) -> Self {
        let state = session.state();
        let delete_dialog = session.delete_dialog().map(|id| DeleteDialogView {
            outcome_id: id,
            outcome_name: session.store().get(id).ok().map(|outcome| outcome.name),
            title: messages.delete_title.clone(),
            prompt: messages.delete_prompt.clone(),
        });

        EditorView {
            mode: state.mode,
            target_id: state.target_id,
            draft_name: state.draft_name.clone(),
            draft_choices: state.draft_choices.clone(),
            pending_choice_edit: state.pending_choice_edit.clone(),
            save_attempted: state.save_attempted,
            feedback: session.feedback(messages),
            delete_dialog,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode != Mode::Closed
    }

    pub fn choice_texts(&self) -> Vec<&str> {
        self.draft_choices
            .iter()
            .map(|choice| choice.text.as_str())
            .collect()
    }

    pub fn choice_id(&self, text: &str) -> Option<ChoiceId> {
        self.draft_choices
            .iter()
            .find(|choice| choice.text == text)
            .map(|choice| choice.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveResponse {
    Saved {
        outcome: Outcome,
    },
    Rejected {
        errors: ValidationReport,
        feedback: Feedback,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
