pub mod envelope;
pub mod form;
pub mod model;
pub mod popup;
pub mod wizard;

pub use envelope::{Envelope, STATUS_OK};
pub use form::{AvailabilityState, CheckField, CheckOutcome, FieldErrors, SignupField};
pub use model::{Capsule, CapsuleDetail, Jar, LoginData, LoginForm, SignupForm, User, WritePayload};
pub use popup::{ButtonCount, PopupAction, PopupPatch, PopupState};
pub use wizard::{WizardDraft, WizardStep, EMOJI_CHOICES, MIN_CONTENT_CHARS};
