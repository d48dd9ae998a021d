use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::SessionError,
    ids::{ChoiceId, OutcomeId},
    messages::{Feedback, Messages},
    model::{default_choices, Outcome, OutputChoice},
    store::OutcomeStore,
    validation::ValidationReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Closed,
    Creating,
    Viewing,
    Editing,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Closed
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Mode::Closed => "closed",
                Mode::Creating => "creating",
                Mode::Viewing => "viewing",
                Mode::Editing => "editing",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "choice_id", rename_all = "snake_case")]
pub enum PendingTarget {
    New,
    Existing(ChoiceId),
}

/// The add-value / edit-value sub-draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoiceEdit {
    pub target: PendingTarget,
    pub text: String,
}

impl PendingChoiceEdit {
    pub fn can_confirm(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Snapshot of everything the drawer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Mode,
    pub target_id: Option<OutcomeId>,
    pub draft_name: String,
    pub draft_choices: Vec<OutputChoice>,
    pub pending_choice_edit: Option<PendingChoiceEdit>,
    pub save_attempted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Outcome),
    Rejected(ValidationReport),
}

/// One client's drawer: the draft of the outcome being created, viewed or
/// edited, plus the delete confirmation dialog.
///
/// Drafts are private copies; nothing reaches the store before a save.
#[derive(Debug)]
pub struct OutcomeEditorSession {
    store: Arc<OutcomeStore>,
    state: SessionState,
    delete_dialog: Option<OutcomeId>,
}

impl OutcomeEditorSession {
    pub fn new(store: Arc<OutcomeStore>) -> Self {
        OutcomeEditorSession {
            store,
            state: SessionState::default(),
            delete_dialog: None,
        }
    }

    pub fn store(&self) -> &OutcomeStore {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Live validation of the draft. Empty unless creating or editing.
    pub fn validation(&self) -> ValidationReport {
        match self.state.mode {
            Mode::Creating | Mode::Editing => self.store.validate_draft(
                &self.state.draft_name,
                &self.state.draft_choices,
                self.state.target_id,
            ),
            Mode::Closed | Mode::Viewing => ValidationReport::default(),
        }
    }

    pub fn feedback(&self, messages: &Messages) -> Feedback {
        match self.state.mode {
            Mode::Creating | Mode::Editing => {
                Feedback::new(&self.validation(), self.state.save_attempted, messages)
            }
            Mode::Closed | Mode::Viewing => Feedback::default(),
        }
    }

    pub fn delete_dialog(&self) -> Option<OutcomeId> {
        self.delete_dialog
    }

    /// Nothing open: no drawer and no delete dialog.
    pub fn is_idle(&self) -> bool {
        self.state.mode == Mode::Closed && self.delete_dialog.is_none()
    }

    pub fn open_for_create(&mut self) -> Result<(), SessionError> {
        self.require("open_for_create", &[Mode::Closed])?;
        self.state = SessionState {
            mode: Mode::Creating,
            draft_choices: default_choices(),
            ..SessionState::default()
        };
        debug!("editor opened for create");
        Ok(())
    }

    pub fn open_for_view(&mut self, id: OutcomeId) -> Result<(), SessionError> {
        self.require("open_for_view", &[Mode::Closed])?;
        let outcome = self.store.get(id)?;
        self.state = SessionState {
            mode: Mode::Viewing,
            target_id: Some(outcome.id),
            draft_name: outcome.name,
            draft_choices: outcome.choices,
            ..SessionState::default()
        };
        debug!(outcome_id = %id, "editor opened for view");
        Ok(())
    }

    /// The table's edit action: view, then switch straight to editing.
    pub fn open_for_edit(&mut self, id: OutcomeId) -> Result<(), SessionError> {
        self.open_for_view(id)?;
        self.switch_to_edit()
    }

    pub fn switch_to_edit(&mut self) -> Result<(), SessionError> {
        self.require("switch_to_edit", &[Mode::Viewing])?;
        self.state.mode = Mode::Editing;
        debug!(outcome_id = ?self.state.target_id, "editor switched to edit");
        Ok(())
    }

    pub fn set_name(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.require_editable("set_name")?;
        self.state.draft_name = text.into();
        Ok(())
    }

    pub fn begin_add_choice(&mut self) -> Result<(), SessionError> {
        self.begin_pending("begin_add_choice", PendingTarget::New, String::new())
    }

    pub fn begin_edit_choice(&mut self, choice_id: ChoiceId) -> Result<(), SessionError> {
        self.require_editable("begin_edit_choice")?;
        let text = self.choice(choice_id)?.text.clone();
        self.begin_pending("begin_edit_choice", PendingTarget::Existing(choice_id), text)
    }

    pub fn set_pending_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.require_editable("set_pending_text")?;
        let pending = self
            .state
            .pending_choice_edit
            .as_mut()
            .ok_or(SessionError::NoPendingEdit)?;
        pending.text = text.into();
        Ok(())
    }

    /// Applies the pending add or edit and returns the id of the affected choice.
    pub fn confirm_pending_choice(&mut self) -> Result<ChoiceId, SessionError> {
        self.require_editable("confirm_pending_choice")?;
        let pending = self
            .state
            .pending_choice_edit
            .as_ref()
            .ok_or(SessionError::NoPendingEdit)?;
        if !pending.can_confirm() {
            return Err(SessionError::EmptyPendingText);
        }

        let target = pending.target;
        let text = pending.text.clone();

        let id = match target {
            PendingTarget::New => {
                let choice = OutputChoice::new(text);
                let id = choice.id;
                self.state.draft_choices.push(choice);
                id
            }
            PendingTarget::Existing(id) => {
                self.choice_mut(id)?.text = text;
                id
            }
        };
        self.state.pending_choice_edit = None;

        debug!(choice_id = %id, "pending choice confirmed");
        Ok(id)
    }

    pub fn cancel_pending_choice(&mut self) -> Result<(), SessionError> {
        self.require_editable("cancel_pending_choice")?;
        self.state
            .pending_choice_edit
            .take()
            .map(drop)
            .ok_or(SessionError::NoPendingEdit)
    }

    /// Removes a choice. Going below the minimum is allowed here and only
    /// blocks saving.
    pub fn delete_choice(&mut self, choice_id: ChoiceId) -> Result<(), SessionError> {
        self.require_editable("delete_choice")?;
        let index = self.position(choice_id)?;
        self.state.draft_choices.remove(index);

        let editing_deleted = matches!(
            self.state.pending_choice_edit,
            Some(PendingChoiceEdit {
                target: PendingTarget::Existing(id),
                ..
            }) if id == choice_id
        );
        if editing_deleted {
            self.state.pending_choice_edit = None;
        }

        debug!(choice_id = %choice_id, remaining = self.state.draft_choices.len(), "choice deleted");
        Ok(())
    }

    /// Moves `choice_id` to sit immediately before `before_id`.
    pub fn reorder(&mut self, choice_id: ChoiceId, before_id: ChoiceId) -> Result<(), SessionError> {
        self.require_editable("reorder")?;
        let from = self.position(choice_id)?;
        self.position(before_id)?;
        if choice_id == before_id {
            return Ok(());
        }

        let choice = self.state.draft_choices.remove(from);
        let to = self.position(before_id)?;
        self.state.draft_choices.insert(to, choice);

        debug!(choice_id = %choice_id, before_id = %before_id, "choices reordered");
        Ok(())
    }

    /// Validates the draft and, if clean, writes it to the store and closes
    /// the drawer. Rule violations come back as `Rejected`; the drawer stays
    /// open. An outcome deleted in the meantime is an error.
    pub fn attempt_save(&mut self) -> Result<SaveOutcome, SessionError> {
        self.require_editable("attempt_save")?;
        self.state.save_attempted = true;

        let report = self.validation();
        if !report.is_empty() {
            debug!(errors = ?report, "save rejected");
            return Ok(SaveOutcome::Rejected(report));
        }

        let name = &self.state.draft_name;
        let choices = self.state.draft_choices.clone();
        let result = match self.state.target_id {
            Some(id) => self.store.update(id, name, choices),
            None => self.store.create(name, choices),
        };

        match result {
            Ok(outcome) => {
                self.state = SessionState::default();
                Ok(SaveOutcome::Saved(outcome))
            }
            // Another session got there first between validation and write.
            Err(err) => match err.as_validation_error() {
                Some(error) => Ok(SaveOutcome::Rejected(std::iter::once(error).collect())),
                None => Err(err.into()),
            },
        }
    }

    /// Discards the draft. Always ends closed.
    pub fn cancel(&mut self) {
        debug!(mode = %self.state.mode, "editor cancelled");
        self.state = SessionState::default();
    }

    /// Opens the delete confirmation. A dialog left open for an outcome that
    /// has since been removed elsewhere is replaced.
    pub fn request_delete(&mut self, id: OutcomeId) -> Result<(), SessionError> {
        if let Some(open) = self.delete_dialog {
            if self.store.get(open).is_ok() {
                return Err(SessionError::DeleteDialogOpen);
            }
            debug!(outcome_id = %open, "stale delete dialog replaced");
        }
        self.store.get(id)?;
        self.delete_dialog = Some(id);
        Ok(())
    }

    /// Removes the outcome the dialog was opened for. If the drawer was showing
    /// that outcome it closes too.
    pub fn confirm_delete(&mut self, id: OutcomeId) -> Result<Outcome, SessionError> {
        match self.delete_dialog {
            None => return Err(SessionError::NoDeleteDialog),
            Some(expected) if expected != id => {
                return Err(SessionError::DeleteDialogMismatch {
                    expected,
                    actual: id,
                })
            }
            Some(_) => {}
        }
        self.delete_dialog = None;

        let removed = self.store.remove(id)?;
        if self.state.target_id == Some(id) {
            self.state = SessionState::default();
        }
        Ok(removed)
    }

    pub fn cancel_delete(&mut self) -> Result<(), SessionError> {
        self.delete_dialog
            .take()
            .map(drop)
            .ok_or(SessionError::NoDeleteDialog)
    }

    fn begin_pending(
        &mut self,
        op: &'static str,
        target: PendingTarget,
        text: String,
    ) -> Result<(), SessionError> {
        self.require_editable(op)?;
        if self.state.pending_choice_edit.is_some() {
            return Err(SessionError::PendingEditOpen);
        }
        self.state.pending_choice_edit = Some(PendingChoiceEdit { target, text });
        Ok(())
    }

    fn require(&self, op: &'static str, allowed: &[Mode]) -> Result<(), SessionError> {
        if allowed.contains(&self.state.mode) {
            Ok(())
        } else {
            Err(SessionError::InvalidMode {
                op,
                mode: self.state.mode,
            })
        }
    }

    fn require_editable(&self, op: &'static str) -> Result<(), SessionError> {
        self.require(op, &[Mode::Creating, Mode::Editing])
    }

    fn position(&self, choice_id: ChoiceId) -> Result<usize, SessionError> {
        self.state
            .draft_choices
            .iter()
            .position(|choice| choice.id == choice_id)
            .ok_or(SessionError::UnknownChoice(choice_id))
    }

    fn choice(&self, choice_id: ChoiceId) -> Result<&OutputChoice, SessionError> {
        let index = self.position(choice_id)?;
        Ok(&self.state.draft_choices[index])
    }

    fn choice_mut(&mut self, choice_id: ChoiceId) -> Result<&mut OutputChoice, SessionError> {
        let index = self.position(choice_id)?;
        Ok(&mut self.state.draft_choices[index])
    }
}
