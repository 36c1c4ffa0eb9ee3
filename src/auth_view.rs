//! Login and signup pages. Field errors render inline next to the owning
//! input; only submit-level failures go through the popup manager.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, InputEvent, MouseEvent};
use yew::prelude::*;

use capsulejar_core::form::{
    submission_gate, validate_login, validate_signup, AvailabilityState, CheckField, CheckOutcome,
    FieldErrors, SignupField,
};
use capsulejar_core::{LoginForm, SignupForm};

use crate::api::ApiClient;
use crate::app_router::{navigate, Route, UserType};
use crate::context::{LoadingHandle, PopupHandle, GENERIC_ERROR_BODY, GENERIC_ERROR_TITLE};
use crate::persisted_store::save_auth_token;

#[derive(Properties)]
pub(crate) struct AuthProps {
    pub(crate) api: Rc<ApiClient>,
}

impl PartialEq for AuthProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api)
    }
}

fn field_error(errors: &FieldErrors, field: SignupField) -> Html {
    match errors.get(&field) {
        Some(message) => html! { <p class="field-error">{message.clone()}</p> },
        None => Html::default(),
    }
}

/// Applies a settled availability check to the error map, touching only
/// the owning field's entry.
fn apply_check_result(errors: &mut FieldErrors, field: CheckField, result: &Result<(), String>) {
    match result {
        Ok(()) => {
            errors.remove(&field.signup_field());
        }
        Err(message) => {
            errors.insert(field.signup_field(), message.clone());
        }
    }
}

/// Signup error map with a live mirror. Async settles go through the
/// mirror so they see the current map, not the snapshot from the render
/// that spawned them.
#[derive(Clone)]
struct ErrorStore {
    state: UseStateHandle<FieldErrors>,
    live: Rc<RefCell<FieldErrors>>,
}

impl ErrorStore {
    fn new(state: UseStateHandle<FieldErrors>, live: Rc<RefCell<FieldErrors>>) -> Self {
        Self { state, live }
    }

    fn replace(&self, errors: FieldErrors) {
        *self.live.borrow_mut() = errors.clone();
        self.state.set(errors);
    }

    fn set_field(&self, field: SignupField, message: String) {
        let mut live = self.live.borrow_mut();
        live.insert(field, message);
        self.state.set(live.clone());
    }

    fn clear_field(&self, field: SignupField) {
        let mut live = self.live.borrow_mut();
        live.remove(&field);
        self.state.set(live.clone());
    }

    fn settle_check(&self, field: CheckField, result: &Result<(), String>) {
        let mut live = self.live.borrow_mut();
        apply_check_result(&mut live, field, result);
        self.state.set(live.clone());
    }
}

#[function_component(LoginPage)]
pub(crate) fn login_page(props: &AuthProps) -> Html {
    let popup = use_context::<PopupHandle>().expect("popup context");
    let loading = use_context::<LoadingHandle>().expect("loading context");
    let id = use_state(String::new);
    let password = use_state(String::new);
    let errors = use_state(FieldErrors::new);

    let on_id_input = {
        let id = id.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            id.set(input.value());
        })
    };
    let on_password_input = {
        let password = password.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            password.set(input.value());
        })
    };

    let on_submit = {
        let api = props.api.clone();
        let popup = popup.clone();
        let loading = loading.clone();
        let id = id.clone();
        let password = password.clone();
        let errors = errors.clone();
        Callback::from(move |_: MouseEvent| {
            let found = validate_login(&id, &password);
            if !found.is_empty() {
                errors.set(found);
                return;
            }
            errors.set(FieldErrors::new());
            let form = LoginForm {
                id: (*id).clone(),
                password: (*password).clone(),
            };
            let api = api.clone();
            let popup = popup.clone();
            let loading = loading.clone();
            loading.set(true);
            spawn_local(async move {
                let result = api.login(&form).await;
                loading.set(false);
                match result {
                    Ok(envelope) if envelope.is_ok() => {
                        let Some(data) = envelope.data else {
                            popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY);
                            return;
                        };
                        save_auth_token(&data.token);
                        if data.jar_id.is_empty() {
                            popup.show_message(
                                "Welcome!",
                                "Your account has been created, but you don't have a jar yet.",
                            );
                        } else {
                            navigate(&Route::Jar {
                                user_type: UserType::Master,
                                jar_id: data.jar_id,
                            });
                        }
                    }
                    Ok(envelope) => {
                        popup.show_message(
                            "Login Failed",
                            envelope.message_or("Please check your ID and password."),
                        );
                    }
                    Err(_) => popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY),
                }
            });
        })
    };

    let on_to_signup = Callback::from(|_: MouseEvent| navigate(&Route::Signup));

    html! {
        <div class="page auth-page">
            <h1>{"Log In"}</h1>
            <div class="field">
                <label for="login-id">{"ID"}</label>
                <input id="login-id" type="text" value={(*id).clone()} oninput={on_id_input} />
                {field_error(&errors, SignupField::Id)}
            </div>
            <div class="field">
                <label for="login-password">{"Password"}</label>
                <input
                    id="login-password"
                    type="password"
                    value={(*password).clone()}
                    oninput={on_password_input}
                />
                {field_error(&errors, SignupField::Password)}
            </div>
            <button class="primary" onclick={on_submit}>{"Log In"}</button>
            <button class="link" onclick={on_to_signup}>
                {"Don't have an account? Sign up"}
            </button>
        </div>
    }
}

#[function_component(SignupPage)]
pub(crate) fn signup_page(props: &AuthProps) -> Html {
    let popup = use_context::<PopupHandle>().expect("popup context");
    let loading = use_context::<LoadingHandle>().expect("loading context");
    let form = use_state(SignupForm::default);
    let errors = use_state(FieldErrors::new);
    let errors_live = use_mut_ref(FieldErrors::new);
    let error_store = ErrorStore::new(errors.clone(), errors_live.clone());
    let id_check = use_state(AvailabilityState::default);
    let nickname_check = use_state(AvailabilityState::default);

    let update_field = |apply: fn(&mut SignupForm, String), field: SignupField| {
        let form = form.clone();
        let error_store = error_store.clone();
        let id_check = id_check.clone();
        let nickname_check = nickname_check.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = (*form).clone();
            apply(&mut next, input.value());
            form.set(next);
            error_store.clear_field(field);
            // Editing a checked field drops its confirmation.
            match field {
                SignupField::Id => {
                    let mut state = *id_check;
                    state.note_edit();
                    id_check.set(state);
                }
                SignupField::Nickname => {
                    let mut state = *nickname_check;
                    state.note_edit();
                    nickname_check.set(state);
                }
                _ => {}
            }
        })
    };

    let on_id_input = update_field(|form, value| form.id = value, SignupField::Id);
    let on_password_input = update_field(|form, value| form.password = value, SignupField::Password);
    let on_password_confirm_input = update_field(
        |form, value| form.password_confirm = value,
        SignupField::PasswordConfirm,
    );
    let on_nickname_input =
        update_field(|form, value| form.nickname = value, SignupField::Nickname);
    let on_phone_input = update_field(
        |form, value| form.phone_number = value,
        SignupField::PhoneNumber,
    );

    let run_check = |field: CheckField,
                     state: UseStateHandle<AvailabilityState>,
                     value_of: fn(&SignupForm) -> &str| {
        let api = props.api.clone();
        let form = form.clone();
        let error_store = error_store.clone();
        Callback::from(move |_: MouseEvent| {
            let value = value_of(&form).to_string();
            let mut next = *state;
            if let Err(message) = next.begin_check(field, &value) {
                error_store.set_field(field.signup_field(), message);
                return;
            }
            state.set(next);
            error_store.clear_field(field.signup_field());
            let api = api.clone();
            let state = state.clone();
            let error_store = error_store.clone();
            spawn_local(async move {
                let outcome = match api.check_duplicate(field, &value).await {
                    Ok(envelope) if envelope.is_ok() => CheckOutcome::Accepted,
                    Ok(envelope) => CheckOutcome::Rejected(envelope.message),
                    Err(_) => CheckOutcome::TransportFailed,
                };
                // The settled state does not depend on what happened while
                // the request was in flight; a response for an edited value
                // still lands.
                let mut settled = AvailabilityState {
                    checked: false,
                    checking: true,
                };
                let result = settled.finish_check(field, outcome);
                error_store.settle_check(field, &result);
                state.set(settled);
            });
        })
    };

    let on_check_id = run_check(CheckField::Id, id_check.clone(), |form| &form.id);
    let on_check_nickname = run_check(CheckField::Nickname, nickname_check.clone(), |form| {
        &form.nickname
    });

    let on_submit = {
        let api = props.api.clone();
        let popup = popup.clone();
        let loading = loading.clone();
        let form = form.clone();
        let error_store = error_store.clone();
        let id_check = id_check.clone();
        let nickname_check = nickname_check.clone();
        Callback::from(move |_: MouseEvent| {
            let found = validate_signup(&form);
            if !found.is_empty() {
                error_store.replace(found);
                return;
            }
            let gate = submission_gate(*id_check, *nickname_check);
            if !gate.is_empty() {
                error_store.replace(gate);
                return;
            }
            error_store.replace(FieldErrors::new());
            let payload = (*form).clone();
            let api = api.clone();
            let popup = popup.clone();
            let loading = loading.clone();
            loading.set(true);
            spawn_local(async move {
                let result = api.signup(&payload).await;
                loading.set(false);
                match result {
                    Ok(envelope) if envelope.is_ok() => {
                        popup.show_message_with_confirm(
                            "Account Created",
                            "Your account has been created successfully! Please log in.",
                            Callback::from(|_| navigate(&Route::Login)),
                        );
                    }
                    Ok(envelope) => {
                        popup.show_message(
                            "Signup Failed",
                            envelope.message_or("An error occurred during signup."),
                        );
                    }
                    Err(_) => popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY),
                }
            });
        })
    };

    let on_to_login = Callback::from(|_: MouseEvent| navigate(&Route::Login));

    let id_button_disabled =
        id_check.checking || form.id.chars().count() < CheckField::Id.min_chars();
    let nickname_button_disabled = nickname_check.checking
        || form.nickname.chars().count() < CheckField::Nickname.min_chars();

    html! {
        <div class="page auth-page">
            <h1>{"Sign Up"}</h1>
            <div class="field">
                <label for="signup-id">{"ID"}</label>
                <div class="field-with-action">
                    <input
                        id="signup-id"
                        type="text"
                        value={form.id.clone()}
                        oninput={on_id_input}
                    />
                    <button class="check-button" disabled={id_button_disabled} onclick={on_check_id}>
                        { if id_check.checking { "Checking..." } else { "Check" } }
                    </button>
                </div>
                {field_error(&errors, SignupField::Id)}
                if id_check.checked {
                    <p class="field-confirm">{"ID available!"}</p>
                }
            </div>
            <div class="field">
                <label for="signup-password">{"Password"}</label>
                <input
                    id="signup-password"
                    type="password"
                    value={form.password.clone()}
                    oninput={on_password_input}
                />
                {field_error(&errors, SignupField::Password)}
            </div>
            <div class="field">
                <label for="signup-password-confirm">{"Confirm Password"}</label>
                <input
                    id="signup-password-confirm"
                    type="password"
                    value={form.password_confirm.clone()}
                    oninput={on_password_confirm_input}
                />
                {field_error(&errors, SignupField::PasswordConfirm)}
            </div>
            <div class="field">
                <label for="signup-nickname">{"Nickname"}</label>
                <div class="field-with-action">
                    <input
                        id="signup-nickname"
                        type="text"
                        value={form.nickname.clone()}
                        oninput={on_nickname_input}
                    />
                    <button
                        class="check-button"
                        disabled={nickname_button_disabled}
                        onclick={on_check_nickname}
                    >
                        { if nickname_check.checking { "Checking..." } else { "Check" } }
                    </button>
                </div>
                {field_error(&errors, SignupField::Nickname)}
                if nickname_check.checked {
                    <p class="field-confirm">{"Nickname available!"}</p>
                }
            </div>
            <div class="field">
                <label for="signup-phone">{"Phone Number"}</label>
                <input
                    id="signup-phone"
                    type="tel"
                    value={form.phone_number.clone()}
                    oninput={on_phone_input}
                />
                {field_error(&errors, SignupField::PhoneNumber)}
            </div>
            <button class="primary" onclick={on_submit}>{"Sign Up"}</button>
            <button class="link" onclick={on_to_login}>
                {"Already have an account? Log in"}
            </button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_check_touches_only_its_own_field() {
        let mut errors = FieldErrors::new();
        errors.insert(
            SignupField::Nickname,
            "Nickname is required".to_string(),
        );
        errors.insert(
            SignupField::PhoneNumber,
            "Phone number is required".to_string(),
        );

        // A check that settles after other fields picked up errors must
        // leave those entries alone.
        apply_check_result(
            &mut errors,
            CheckField::Id,
            &Err("This ID is already taken".to_string()),
        );
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get(&SignupField::Id).map(String::as_str),
            Some("This ID is already taken"),
        );

        apply_check_result(&mut errors, CheckField::Id, &Ok(()));
        assert!(!errors.contains_key(&SignupField::Id));
        assert!(errors.contains_key(&SignupField::Nickname));
        assert!(errors.contains_key(&SignupField::PhoneNumber));
    }
}
