use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;

use crate::{
    error::StoreError,
    ids::OutcomeId,
    model::{Outcome, OutputChoice},
    validation::{validate, ValidationError, ValidationReport},
};

/// The saved outcomes, in creation order.
///
/// Shared between editor sessions behind an `Arc`. Every mutation holds the
/// write lock for its whole check-then-write, so the name uniqueness and
/// existence rules hold across sessions.
#[derive(Debug, Default)]
pub struct OutcomeStore {
    outcomes: RwLock<Vec<Outcome>>,
}

impl OutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Outcome> {
        self.outcomes.read().clone()
    }

    pub fn len(&self) -> usize {
        self.outcomes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.read().is_empty()
    }

    pub fn get(&self, id: OutcomeId) -> Result<Outcome, StoreError> {
        self.outcomes
            .read()
            .iter()
            .find(|outcome| outcome.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Validates a draft against the current contents.
    pub fn validate_draft(
        &self,
        name: &str,
        choices: &[OutputChoice],
        self_id: Option<OutcomeId>,
    ) -> ValidationReport {
        validate(name, choices, &self.outcomes.read(), self_id)
    }

    pub fn create(&self, name: &str, choices: Vec<OutputChoice>) -> Result<Outcome, StoreError> {
        let mut outcomes = self.outcomes.write();
        check(&outcomes, name, &choices, None)?;

        let now = Utc::now();
        let outcome = Outcome {
            id: OutcomeId::new(),
            name: name.to_string(),
            choices,
            created_at: now,
            updated_at: now,
        };
        outcomes.push(outcome.clone());

        info!(outcome_id = %outcome.id, name = %outcome.name, "outcome created");
        Ok(outcome)
    }

    pub fn update(
        &self,
        id: OutcomeId,
        name: &str,
        choices: Vec<OutputChoice>,
    ) -> Result<Outcome, StoreError> {
        let mut outcomes = self.outcomes.write();
        let index = outcomes
            .iter()
            .position(|outcome| outcome.id == id)
            .ok_or(StoreError::NotFound(id))?;
        check(&outcomes, name, &choices, Some(id))?;

        let outcome = &mut outcomes[index];
        outcome.name = name.to_string();
        outcome.choices = choices;
        outcome.updated_at = Utc::now();

        info!(outcome_id = %id, name = %outcome.name, "outcome updated");
        Ok(outcome.clone())
    }

    pub fn remove(&self, id: OutcomeId) -> Result<Outcome, StoreError> {
        let mut outcomes = self.outcomes.write();
        let index = outcomes
            .iter()
            .position(|outcome| outcome.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let outcome = outcomes.remove(index);

        info!(outcome_id = %id, name = %outcome.name, "outcome removed");
        Ok(outcome)
    }

    /// Drops every outcome.
    pub fn reset(&self) {
        let mut outcomes = self.outcomes.write();
        info!(count = outcomes.len(), "outcome store reset");
        outcomes.clear();
    }
}

fn check(
    outcomes: &[Outcome],
    name: &str,
    choices: &[OutputChoice],
    self_id: Option<OutcomeId>,
) -> Result<(), StoreError> {
    match validate(name, choices, outcomes, self_id).first() {
        None => Ok(()),
        Some(ValidationError::EmptyName) => Err(StoreError::EmptyName),
        Some(ValidationError::TooFewChoices) => Err(StoreError::InvalidChoices {
            count: choices.len(),
        }),
        Some(ValidationError::DuplicateName) => Err(StoreError::DuplicateName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_choices;

    #[test]
    fn create_appends_in_creation_order() {
        let store = OutcomeStore::new();
        let first = store.create("First", default_choices()).unwrap();
        let second = store.create("Second", default_choices()).unwrap();

        let names: Vec<_> = store.list().into_iter().map(|outcome| outcome.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn create_rejects_invalid_drafts() {
        let store = OutcomeStore::new();
        store.create("Taken", default_choices()).unwrap();

        assert_eq!(
            store.create(" ", default_choices()),
            Err(StoreError::EmptyName)
        );
        assert_eq!(
            store.create("One choice", default_choices()[..1].to_vec()),
            Err(StoreError::InvalidChoices { count: 1 })
        );
        assert_eq!(
            store.create("Taken", default_choices()),
            Err(StoreError::DuplicateName("Taken".to_string()))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_keeps_position_and_may_keep_its_own_name() {
        let store = OutcomeStore::new();
        let first = store.create("First", default_choices()).unwrap();
        store.create("Second", default_choices()).unwrap();

        let mut choices = first.choices.clone();
        choices.pop();
        let updated = store.update(first.id, "First", choices.clone()).unwrap();

        assert_eq!(updated.choices, choices);
        assert_eq!(updated.created_at, first.created_at);
        assert!(updated.updated_at >= first.updated_at);
        assert_eq!(store.list()[0].id, first.id);
    }

    #[test]
    fn update_cannot_take_another_outcomes_name() {
        let store = OutcomeStore::new();
        let first = store.create("First", default_choices()).unwrap();
        store.create("Second", default_choices()).unwrap();

        assert_eq!(
            store.update(first.id, "Second", default_choices()),
            Err(StoreError::DuplicateName("Second".to_string()))
        );
        assert_eq!(store.get(first.id).unwrap().name, "First");
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let store = OutcomeStore::new();
        let id = OutcomeId::new();
        assert_eq!(store.get(id), Err(StoreError::NotFound(id)));
        assert_eq!(
            store.update(id, "Name", default_choices()),
            Err(StoreError::NotFound(id))
        );
        assert_eq!(store.remove(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn remove_is_permanent() {
        let store = OutcomeStore::new();
        let outcome = store.create("Gone", default_choices()).unwrap();

        assert_eq!(store.remove(outcome.id).unwrap().id, outcome.id);
        assert!(store.is_empty());
        assert!(store.get(outcome.id).is_err());
        // The name is free again.
        assert!(store.create("Gone", default_choices()).is_ok());
    }

    #[test]
    fn reset_empties_the_store() {
        let store = OutcomeStore::new();
        store.create("A", default_choices()).unwrap();
        store.create("B", default_choices()).unwrap();
        store.reset();
        assert!(store.list().is_empty());
    }
}
