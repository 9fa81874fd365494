//! The questionnaire: steps, events, validation and the engine that runs them.

pub mod engine;
pub mod event;
pub mod locks;
pub mod model;
pub mod reply;
pub mod state;
pub mod validate;

pub use engine::{FormEngine, Handled, Transition};
pub use event::{Command, FormEvent};
pub use locks::UserLocks;
pub use model::{Education, Gender, PhotoRef, PhotoSize, Profile, ProfileDraft, StepValue};
pub use reply::{ChoiceButton, Reply};
pub use state::{FormSession, FormStep};
