//! Field validation and the signup availability-check state machine.
//!
//! Validation errors are field-level and synchronous; they are attached to
//! the owning input and never surfaced through the popup manager.

use std::collections::BTreeMap;

pub const MIN_ID_CHARS: usize = 4;
pub const MIN_NICKNAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignupField {
    Id,
    Password,
    PasswordConfirm,
    Nickname,
    PhoneNumber,
}

pub type FieldErrors = BTreeMap<SignupField, String>;

/// The two fields that require a server-side duplicate check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckField {
    Id,
    Nickname,
}

impl CheckField {
    pub fn query_key(self) -> &'static str {
        match self {
            CheckField::Id => "id",
            CheckField::Nickname => "nickname",
        }
    }

    pub fn signup_field(self) -> SignupField {
        match self {
            CheckField::Id => SignupField::Id,
            CheckField::Nickname => SignupField::Nickname,
        }
    }

    pub fn min_chars(self) -> usize {
        match self {
            CheckField::Id => MIN_ID_CHARS,
            CheckField::Nickname => MIN_NICKNAME_CHARS,
        }
    }

    pub fn too_short_message(self) -> &'static str {
        match self {
            CheckField::Id => "ID must be at least 4 characters",
            CheckField::Nickname => "Nickname must be at least 2 characters",
        }
    }

    pub fn taken_message(self) -> &'static str {
        match self {
            CheckField::Id => "This ID is already taken",
            CheckField::Nickname => "This nickname is already taken",
        }
    }

    pub fn check_failed_message(self) -> &'static str {
        match self {
            CheckField::Id => "Error checking ID",
            CheckField::Nickname => "Error checking nickname",
        }
    }

    pub fn unconfirmed_message(self) -> &'static str {
        match self {
            CheckField::Id => "Please check if this ID is available",
            CheckField::Nickname => "Please check if this nickname is available",
        }
    }
}

/// How a remote duplicate check settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    Accepted,
    /// Non-200 envelope, carrying the server message when present.
    Rejected(Option<String>),
    TransportFailed,
}

/// Per-field availability state. `checked` only ever becomes true through
/// a successful remote check; any edit drops it back to unchecked before
/// the next render. The in-flight request for a stale value is not
/// cancelled, so its completion still lands (see the core tests).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AvailabilityState {
    pub checked: bool,
    pub checking: bool,
}

impl AvailabilityState {
    pub fn note_edit(&mut self) {
        self.checked = false;
    }

    /// Guarded transition into `checking`. A value below the field's
    /// minimum length rejects the transition and returns the validation
    /// message to attach instead of issuing a request.
    pub fn begin_check(&mut self, field: CheckField, value: &str) -> Result<(), String> {
        if value.chars().count() < field.min_chars() {
            return Err(field.too_short_message().to_string());
        }
        self.checking = true;
        Ok(())
    }

    /// Settles a remote check. `Ok(())` means the field is confirmed
    /// available and any prior error should be cleared; `Err` carries the
    /// validation message to attach.
    pub fn finish_check(&mut self, field: CheckField, outcome: CheckOutcome) -> Result<(), String> {
        self.checking = false;
        match outcome {
            CheckOutcome::Accepted => {
                self.checked = true;
                Ok(())
            }
            CheckOutcome::Rejected(message) => {
                self.checked = false;
                Err(message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| field.taken_message().to_string()))
            }
            CheckOutcome::TransportFailed => {
                self.checked = false;
                Err(field.check_failed_message().to_string())
            }
        }
    }
}

fn chars(value: &str) -> usize {
    value.chars().count()
}

fn is_valid_phone_number(value: &str) -> bool {
    (10..=11).contains(&value.len()) && value.bytes().all(|byte| byte.is_ascii_digit())
}

/// Synchronous login-form validation.
pub fn validate_login(id: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if id.is_empty() {
        errors.insert(SignupField::Id, "ID is required".to_string());
    }
    if password.is_empty() {
        errors.insert(SignupField::Password, "Password is required".to_string());
    } else if chars(password) < MIN_PASSWORD_CHARS {
        errors.insert(
            SignupField::Password,
            "Password must be at least 6 characters".to_string(),
        );
    }
    errors
}

/// Synchronous signup-form validation. Availability confirmation is a
/// separate gate, see [`submission_gate`].
pub fn validate_signup(form: &crate::model::SignupForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.id.is_empty() {
        errors.insert(SignupField::Id, "ID is required".to_string());
    } else if chars(&form.id) < MIN_ID_CHARS {
        errors.insert(
            SignupField::Id,
            CheckField::Id.too_short_message().to_string(),
        );
    }
    if form.password.is_empty() {
        errors.insert(SignupField::Password, "Password is required".to_string());
    } else if chars(&form.password) < MIN_PASSWORD_CHARS {
        errors.insert(
            SignupField::Password,
            "Password must be at least 6 characters".to_string(),
        );
    }
    if form.password_confirm.is_empty() {
        errors.insert(
            SignupField::PasswordConfirm,
            "Please confirm your password".to_string(),
        );
    } else if form.password_confirm != form.password {
        errors.insert(
            SignupField::PasswordConfirm,
            "Passwords do not match".to_string(),
        );
    }
    if form.nickname.is_empty() {
        errors.insert(SignupField::Nickname, "Nickname is required".to_string());
    } else if chars(&form.nickname) < MIN_NICKNAME_CHARS {
        errors.insert(
            SignupField::Nickname,
            CheckField::Nickname.too_short_message().to_string(),
        );
    }
    if form.phone_number.is_empty() {
        errors.insert(
            SignupField::PhoneNumber,
            "Phone number is required".to_string(),
        );
    } else if !is_valid_phone_number(&form.phone_number) {
        errors.insert(
            SignupField::PhoneNumber,
            "Please enter a valid phone number (10-11 digits)".to_string(),
        );
    }
    errors
}

/// Final gate before the signup request: both checked fields must be
/// confirmed available. Returns the errors to attach to exactly the
/// unconfirmed field(s); a non-empty result means no request is issued.
pub fn submission_gate(id: AvailabilityState, nickname: AvailabilityState) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !id.checked {
        errors.insert(
            SignupField::Id,
            CheckField::Id.unconfirmed_message().to_string(),
        );
    }
    if !nickname.checked {
        errors.insert(
            SignupField::Nickname,
            CheckField::Nickname.unconfirmed_message().to_string(),
        );
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SignupForm;

    fn valid_form() -> SignupForm {
        SignupForm {
            id: "capsule".to_string(),
            password: "secret99".to_string(),
            password_confirm: "secret99".to_string(),
            nickname: "ami".to_string(),
            phone_number: "01012345678".to_string(),
        }
    }

    #[test]
    fn valid_form_passes_sync_validation() {
        assert!(validate_signup(&valid_form()).is_empty());
    }

    #[test]
    fn short_id_is_rejected_before_any_check() {
        let mut state = AvailabilityState::default();
        let err = state.begin_check(CheckField::Id, "abc").unwrap_err();
        assert_eq!(err, "ID must be at least 4 characters");
        assert!(!state.checking);
        assert!(!state.checked);
    }

    #[test]
    fn accepted_check_confirms_field() {
        let mut state = AvailabilityState::default();
        state.begin_check(CheckField::Nickname, "ami").unwrap();
        assert!(state.checking);
        assert!(state
            .finish_check(CheckField::Nickname, CheckOutcome::Accepted)
            .is_ok());
        assert!(state.checked);
        assert!(!state.checking);
    }

    #[test]
    fn rejected_check_uses_server_message_when_present() {
        let mut state = AvailabilityState::default();
        state.begin_check(CheckField::Id, "capsule").unwrap();
        let err = state
            .finish_check(
                CheckField::Id,
                CheckOutcome::Rejected(Some("id is reserved".to_string())),
            )
            .unwrap_err();
        assert_eq!(err, "id is reserved");
        assert!(!state.checked);
    }

    #[test]
    fn rejected_check_falls_back_to_taken_message() {
        let mut state = AvailabilityState::default();
        state.begin_check(CheckField::Id, "capsule").unwrap();
        let err = state
            .finish_check(CheckField::Id, CheckOutcome::Rejected(None))
            .unwrap_err();
        assert_eq!(err, "This ID is already taken");
    }

    #[test]
    fn transport_failure_attaches_generic_message() {
        let mut state = AvailabilityState::default();
        state.begin_check(CheckField::Nickname, "ami").unwrap();
        let err = state
            .finish_check(CheckField::Nickname, CheckOutcome::TransportFailed)
            .unwrap_err();
        assert_eq!(err, "Error checking nickname");
    }

    #[test]
    fn edit_resets_checked_flag() {
        let mut state = AvailabilityState {
            checked: true,
            checking: false,
        };
        state.note_edit();
        assert!(!state.checked);
    }

    #[test]
    fn phone_number_rules() {
        assert!(is_valid_phone_number("0101234567"));
        assert!(is_valid_phone_number("01012345678"));
        assert!(!is_valid_phone_number("010123456"));
        assert!(!is_valid_phone_number("010123456789"));
        assert!(!is_valid_phone_number("0101234567a"));
    }

    #[test]
    fn login_validation_mirrors_form_rules() {
        assert!(validate_login("abc", "123456").is_empty());
        let errors = validate_login("", "12345");
        assert_eq!(errors.get(&SignupField::Id).unwrap(), "ID is required");
        assert_eq!(
            errors.get(&SignupField::Password).unwrap(),
            "Password must be at least 6 characters"
        );
    }
}
