//! Outcome editing core: the outcome store, the editor session state machine
//! and the validation rules shared by both.

mod error;
mod ids;
mod messages;
mod model;
mod session;
mod store;
mod validation;

pub use error::{SessionError, StoreError};
pub use ids::{ChoiceId, OutcomeId};
pub use messages::{Feedback, Messages};
pub use model::{default_choices, Outcome, OutputChoice, DEFAULT_CHOICES};
pub use session::{
    Mode, OutcomeEditorSession, PendingChoiceEdit, PendingTarget, SaveOutcome, SessionState,
};
pub use store::OutcomeStore;
pub use validation::{validate, ValidationError, ValidationReport, MIN_CHOICES};
