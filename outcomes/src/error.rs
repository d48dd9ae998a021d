use thiserror::Error;

use crate::{
    ids::{ChoiceId, OutcomeId},
    session::Mode,
    validation::ValidationError,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Outcome not found: {0}")]
    NotFound(OutcomeId),

    #[error("Outcome name is required")]
    EmptyName,

    #[error("Outcome needs at least 2 output choices, got {count}")]
    InvalidChoices { count: usize },

    #[error("Outcome name already exists: {0}")]
    DuplicateName(String),
}

impl StoreError {
    /// The draft rule this error corresponds to, if it is a rule violation
    /// rather than a missing outcome.
    pub fn as_validation_error(&self) -> Option<ValidationError> {
        match self {
            StoreError::NotFound(_) => None,
            StoreError::EmptyName => Some(ValidationError::EmptyName),
            StoreError::InvalidChoices { .. } => Some(ValidationError::TooFewChoices),
            StoreError::DuplicateName(_) => Some(ValidationError::DuplicateName),
        }
    }
}

/// Misuse of the editor session, or a store failure it could not absorb.
///
/// Everything except `Store` means the caller issued an intent the current
/// state does not allow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{op} is not allowed while the editor is {mode}")]
    InvalidMode { op: &'static str, mode: Mode },

    #[error("No output choice {0} in the draft")]
    UnknownChoice(ChoiceId),

    #[error("No output choice edit is pending")]
    NoPendingEdit,

    #[error("An output choice edit is already pending")]
    PendingEditOpen,

    #[error("Output choice text is empty")]
    EmptyPendingText,

    #[error("A delete confirmation is already open")]
    DeleteDialogOpen,

    #[error("No delete confirmation is open")]
    NoDeleteDialog,

    #[error("Delete confirmation is open for {expected}, not {actual}")]
    DeleteDialogMismatch {
        expected: OutcomeId,
        actual: OutcomeId,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::Store(StoreError::NotFound(_)))
    }
}
