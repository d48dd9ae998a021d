use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChoiceId, OutcomeId};

/// Choices a freshly opened create drawer starts with, in display order.
pub const DEFAULT_CHOICES: [&str; 3] = ["Route to labs", "Refer to UW", "Offer"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChoice {
    pub id: ChoiceId,
    pub text: String,
}

impl OutputChoice {
    pub fn new(text: impl Into<String>) -> Self {
        OutputChoice {
            id: ChoiceId::new(),
            text: text.into(),
        }
    }
}

pub fn default_choices() -> Vec<OutputChoice> {
    DEFAULT_CHOICES.iter().map(|&text| OutputChoice::new(text)).collect()
}

/// A persisted outcome. Choice order is the output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub name: String,
    pub choices: Vec<OutputChoice>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Outcome {
    pub fn choice_texts(&self) -> Vec<&str> {
        self.choices.iter().map(|choice| choice.text.as_str()).collect()
    }
}
