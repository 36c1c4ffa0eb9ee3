//! Two-step capsule composition wizard. The draft lives in component
//! state for the lifetime of one mount, so moving between steps through
//! the route keeps the content; a reload starts over.

use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlTextAreaElement, InputEvent, MouseEvent};
use yew::prelude::*;

use capsulejar_core::wizard::{WizardDraft, WizardStep, EMOJI_CHOICES};

use crate::api::ApiClient;
use crate::app_router::{navigate, Route, UserType, WriteKind};
use crate::context::{LoadingHandle, PopupHandle, GENERIC_ERROR_BODY, GENERIC_ERROR_TITLE};

#[derive(Properties)]
pub(crate) struct WriteProps {
    pub(crate) api: Rc<ApiClient>,
    pub(crate) user_type: UserType,
    pub(crate) jar_id: String,
    pub(crate) kind: WriteKind,
    pub(crate) step: u8,
    pub(crate) capsule_id: Option<String>,
}

impl PartialEq for WriteProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api)
            && self.user_type == other.user_type
            && self.jar_id == other.jar_id
            && self.kind == other.kind
            && self.step == other.step
            && self.capsule_id == other.capsule_id
    }
}

impl WriteProps {
    fn route_at_step(&self, step: WizardStep) -> Route {
        Route::Write {
            user_type: self.user_type,
            jar_id: self.jar_id.clone(),
            kind: self.kind,
            step: step.route_index(),
            capsule_id: self.capsule_id.clone(),
        }
    }

    fn jar_route(&self) -> Route {
        Route::Jar {
            user_type: self.user_type,
            jar_id: self.jar_id.clone(),
        }
    }
}

#[function_component(WritePage)]
pub(crate) fn write_page(props: &WriteProps) -> Html {
    let popup = use_context::<PopupHandle>().expect("popup context");
    let loading = use_context::<LoadingHandle>().expect("loading context");
    let draft = use_state(WizardDraft::default);
    let step = WizardStep::from_route(props.step);

    let on_content_input = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| {
            let textarea: HtmlTextAreaElement = event.target_unchecked_into();
            let mut next = (*draft).clone();
            next.content = textarea.value();
            draft.set(next);
        })
    };

    let on_back = {
        let jar_route = props.jar_route();
        let compose_route = props.route_at_step(WizardStep::Compose);
        Callback::from(move |_: MouseEvent| match step {
            WizardStep::Compose => navigate(&jar_route),
            WizardStep::Decorate => navigate(&compose_route),
        })
    };

    let on_next = {
        let draft = draft.clone();
        let popup = popup.clone();
        let decorate_route = props.route_at_step(WizardStep::Decorate);
        Callback::from(move |_: MouseEvent| {
            if !draft.can_advance() {
                popup.show_message("Content Too Short", "Please write at least 10 characters.");
                return;
            }
            navigate(&decorate_route);
        })
    };

    let select_emoji = {
        let draft = draft.clone();
        Callback::from(move |index: u32| {
            let mut next = (*draft).clone();
            next.emoji = index;
            draft.set(next);
        })
    };

    let on_public_toggle = {
        let draft = draft.clone();
        Callback::from(move |_: Event| {
            let mut next = (*draft).clone();
            next.is_public = !next.is_public;
            draft.set(next);
        })
    };

    let on_submit = {
        let api = props.api.clone();
        let popup = popup.clone();
        let loading = loading.clone();
        let draft = draft.clone();
        let jar_id = props.jar_id.clone();
        let capsule_id = props.capsule_id.clone();
        let kind = props.kind;
        let jar_route = props.jar_route();
        Callback::from(move |_: MouseEvent| {
            // Deep links straight into step 2 still have to pass the
            // content gate.
            if !draft.can_advance() {
                popup.show_message("Content Too Short", "Please write at least 10 characters.");
                return;
            }
            let payload = draft.payload();
            let api = api.clone();
            let popup = popup.clone();
            let loading = loading.clone();
            let jar_id = jar_id.clone();
            let capsule_id = capsule_id.clone();
            let jar_route = jar_route.clone();
            loading.set(true);
            spawn_local(async move {
                let result = match (kind, capsule_id) {
                    (WriteKind::Reply, Some(capsule_id)) => {
                        api.reply_capsule(&jar_id, &capsule_id, &payload).await
                    }
                    _ => api.create_capsule(&jar_id, &payload).await,
                };
                loading.set(false);
                match result {
                    Ok(envelope) if envelope.is_ok() => {
                        popup.show_message_with_confirm(
                            "Success",
                            "Your message has been sent!",
                            Callback::from(move |_| navigate(&jar_route)),
                        );
                    }
                    Ok(envelope) => {
                        popup.show_message(
                            "Error",
                            envelope.message_or("Failed to send the message."),
                        );
                    }
                    Err(_) => popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY),
                }
            });
        })
    };

    let step_indicator = html! {
        <div class="step-indicator">
            {
                [WizardStep::Compose, WizardStep::Decorate]
                    .into_iter()
                    .map(|dot| {
                        let class = if dot == step {
                            "step-dot active"
                        } else {
                            "step-dot"
                        };
                        html! { <span class={class} /> }
                    })
                    .collect::<Html>()
            }
        </div>
    };

    let body = match step {
        WizardStep::Compose => html! {
            <>
                <textarea
                    class="capsule-content"
                    placeholder="Write your message (at least 10 characters)"
                    value={draft.content.clone()}
                    oninput={on_content_input}
                />
                <button class="primary" disabled={!draft.can_advance()} onclick={on_next}>
                    {"Next"}
                </button>
            </>
        },
        WizardStep::Decorate => {
            let emoji_buttons: Html = EMOJI_CHOICES
                .iter()
                .enumerate()
                .map(|(index, glyph)| {
                    let index = index as u32;
                    let class = if draft.emoji == index {
                        "emoji-choice selected"
                    } else {
                        "emoji-choice"
                    };
                    let on_click = {
                        let select_emoji = select_emoji.clone();
                        Callback::from(move |_: MouseEvent| select_emoji.emit(index))
                    };
                    html! {
                        <button class={class} onclick={on_click}>{*glyph}</button>
                    }
                })
                .collect();
            html! {
                <>
                    <div class="emoji-row">{emoji_buttons}</div>
                    <label class="public-toggle">
                        <input
                            type="checkbox"
                            checked={draft.is_public}
                            onchange={on_public_toggle}
                        />
                        {"Public"}
                    </label>
                    <button class="primary" onclick={on_submit}>{"Send"}</button>
                </>
            }
        }
    };

    let title = match props.kind {
        WriteKind::Normal => "Write a Capsule",
        WriteKind::Reply => "Reply to a Capsule",
    };

    html! {
        <div class="page write-page">
            <header class="write-header">
                <button class="link" onclick={on_back}>{"Back"}</button>
                <h1>{title}</h1>
            </header>
            {step_indicator}
            {body}
        </div>
    }
}
