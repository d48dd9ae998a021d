use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationReport};

/// User-facing copy. Loaded from configuration so wording can change without
/// touching the editor logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub required: String,
    pub duplicate_name: String,
    pub too_few_choices: String,
    pub save_blocked: String,
    pub delete_title: String,
    pub delete_prompt: String,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            required: "This is required".to_string(),
            duplicate_name: "An outcome with this name already exists.".to_string(),
            // Product copy, typos included.
            too_few_choices: "A urle set need at least 2 output choices. Add another choice."
                .to_string(),
            save_blocked:
                "THere are some issues to fix before you can save this outcome. See above."
                    .to_string(),
            delete_title: "Delete outcome".to_string(),
            delete_prompt: "Are you sure you want to delete this outcome?".to_string(),
        }
    }
}

impl Messages {
    pub fn for_error(&self, error: ValidationError) -> &str {
        match error {
            ValidationError::EmptyName => &self.required,
            ValidationError::DuplicateName => &self.duplicate_name,
            ValidationError::TooFewChoices => &self.too_few_choices,
        }
    }
}

/// What the drawer shows for the current draft.
///
/// The save control and the choice list message follow the draft live. The name
/// message and the summary banner only appear once a save has been attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub save_enabled: bool,
    pub name_error: Option<String>,
    pub choices_error: Option<String>,
    pub banner: Option<String>,
}

impl Feedback {
    pub fn new(report: &ValidationReport, save_attempted: bool, messages: &Messages) -> Self {
        let message = |error| {
            if report.contains(error) {
                Some(messages.for_error(error).to_string())
            } else {
                None
            }
        };

        let name_error = if save_attempted {
            message(ValidationError::EmptyName).or_else(|| message(ValidationError::DuplicateName))
        } else {
            None
        };
        let banner = if save_attempted && !report.is_empty() {
            Some(messages.save_blocked.clone())
        } else {
            None
        };

        Feedback {
            save_enabled: report.is_empty(),
            name_error,
            choices_error: message(ValidationError::TooFewChoices),
            banner,
        }
    }
}
