use std::{collections::BTreeSet, iter::FromIterator};

use serde::{Deserialize, Serialize};

use crate::{
    ids::OutcomeId,
    model::{Outcome, OutputChoice},
};

/// An outcome needs at least this many output choices to be saved.
pub const MIN_CHOICES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    EmptyName,
    TooFewChoices,
    DuplicateName,
}

/// Every rule a draft currently breaks. Rules are independent, so a draft can
/// break all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport(BTreeSet<ValidationError>);

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }

    pub fn first(&self) -> Option<ValidationError> {
        self.0.iter().next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ValidationError> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ValidationError> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        ValidationReport(iter.into_iter().collect())
    }
}

/// Checks a draft against the saved outcomes. `self_id` is the outcome being
/// edited, which never counts as its own duplicate. Name matching is exact.
pub fn validate(
    name: &str,
    choices: &[OutputChoice],
    existing: &[Outcome],
    self_id: Option<OutcomeId>,
) -> ValidationReport {
    let mut errors = BTreeSet::new();

    if name.trim().is_empty() {
        errors.insert(ValidationError::EmptyName);
    }
    if existing
        .iter()
        .any(|outcome| Some(outcome.id) != self_id && outcome.name == name)
    {
        errors.insert(ValidationError::DuplicateName);
    }
    if choices.len() < MIN_CHOICES {
        errors.insert(ValidationError::TooFewChoices);
    }

    ValidationReport(errors)
}
