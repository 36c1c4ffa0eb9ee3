//! The jar page: capsule dots, coin balance, and the two open flows
//! (pick a capsule or draw one at random). Opened capsules surface
//! through the popup manager.

use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;
use yew::prelude::*;

use capsulejar_core::popup::ButtonCount;
use capsulejar_core::{CapsuleDetail, Envelope};

use crate::api::ApiClient;
use crate::app_router::{navigate, Route, UserType, WriteKind};
use crate::context::{
    AppPopupPatch, LoadingHandle, PopupHandle, GENERIC_ERROR_BODY, GENERIC_ERROR_TITLE,
};
use crate::query_cache::QueryCache;

const LOAD_CAPSULE_FALLBACK: &str = "Failed to load capsule";
const RANDOM_CAPSULE_FALLBACK: &str = "Failed to get random capsule";

/// Failure popup for the open flows: generic title, server message in the
/// body with a per-operation fallback.
fn open_failure_notice<T>(envelope: &Envelope<T>, fallback: &'static str) -> (&'static str, String) {
    (GENERIC_ERROR_TITLE, envelope.message_or(fallback).to_string())
}

#[derive(Properties)]
pub(crate) struct JarProps {
    pub(crate) api: Rc<ApiClient>,
    pub(crate) cache: QueryCache,
    pub(crate) user_type: UserType,
    pub(crate) jar_id: String,
}

impl PartialEq for JarProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api)
            && self.cache == other.cache
            && self.user_type == other.user_type
            && self.jar_id == other.jar_id
    }
}

/// An opened capsule waiting to be surfaced, keyed by its id so a reply
/// route can be built from it.
#[derive(Clone, PartialEq)]
struct OpenedCapsule {
    capsule_id: Option<String>,
    detail: CapsuleDetail,
}

#[function_component(JarPage)]
pub(crate) fn jar_page(props: &JarProps) -> Html {
    let popup = use_context::<PopupHandle>().expect("popup context");
    let loading = use_context::<LoadingHandle>().expect("loading context");
    let opened = use_state(|| None::<OpenedCapsule>);

    // Cache notifications bump a counter to trigger a rerender; the jar
    // and user snapshots below are re-read on each pass.
    let tick = use_state(|| 0u64);
    {
        let cache = props.cache.clone();
        let jar_id = props.jar_id.clone();
        let tick = tick.clone();
        let counter = use_mut_ref(|| 0u64);
        use_effect_with((), move |_| {
            let listener: Rc<dyn Fn()> = Rc::new(move || {
                let mut count = counter.borrow_mut();
                *count += 1;
                tick.set(*count);
            });
            let subscription = cache.subscribe(listener);
            cache.ensure_jar(&jar_id);
            cache.ensure_user();
            move || drop(subscription)
        });
    }

    let jar = props.cache.jar(&props.jar_id);
    let user = props.cache.user();

    // Surfacing is driven by state so the popup outlives the click handler.
    {
        let popup = popup.clone();
        let opened_handle = opened.clone();
        let user_type = props.user_type;
        let jar_id = props.jar_id.clone();
        use_effect_with((*opened).clone(), move |current| {
            let Some(current) = current else {
                return;
            };
            let author = if current.detail.author_nickname.is_empty() {
                "Anonymous".to_string()
            } else {
                current.detail.author_nickname.clone()
            };
            let clear = {
                let opened_handle = opened_handle.clone();
                Callback::from(move |_| opened_handle.set(None))
            };
            let reply_target = current
                .capsule_id
                .clone()
                .filter(|_| user_type == UserType::Master);
            let patch = match reply_target {
                Some(capsule_id) => AppPopupPatch {
                    title: Some(format!("From: {author}")),
                    body: Some(current.detail.content.clone()),
                    button_count: Some(ButtonCount::Two),
                    confirm_label: Some("Reply".to_string()),
                    reject_label: Some("Close".to_string()),
                    on_confirm: Some({
                        let opened_handle = opened_handle.clone();
                        Callback::from(move |_| {
                            opened_handle.set(None);
                            navigate(&Route::Write {
                                user_type: UserType::Master,
                                jar_id: jar_id.clone(),
                                kind: WriteKind::Reply,
                                step: 1,
                                capsule_id: Some(capsule_id.clone()),
                            });
                        })
                    }),
                    on_reject: Some(clear),
                    ..AppPopupPatch::default()
                },
                None => AppPopupPatch {
                    title: Some(format!("From: {author}")),
                    body: Some(current.detail.content.clone()),
                    on_confirm: Some(clear),
                    ..AppPopupPatch::default()
                },
            };
            popup.show(patch);
        });
    }

    let open_capsule = {
        let api = props.api.clone();
        let cache = props.cache.clone();
        let popup = popup.clone();
        let loading = loading.clone();
        let opened = opened.clone();
        let jar_id = props.jar_id.clone();
        Callback::from(move |capsule_id: String| {
            let api = api.clone();
            let cache = cache.clone();
            let popup = popup.clone();
            let loading = loading.clone();
            let opened = opened.clone();
            let jar_id = jar_id.clone();
            loading.set(true);
            spawn_local(async move {
                let result = api.get_capsule(&jar_id, &capsule_id).await;
                loading.set(false);
                match result {
                    Ok(envelope) if envelope.is_ok() => {
                        let Some(detail) = envelope.data else {
                            popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY);
                            return;
                        };
                        opened.set(Some(OpenedCapsule {
                            capsule_id: Some(capsule_id),
                            detail,
                        }));
                        cache.refetch_jar(&jar_id);
                        cache.refetch_user();
                    }
                    Ok(envelope) => {
                        let (title, body) = open_failure_notice(&envelope, LOAD_CAPSULE_FALLBACK);
                        popup.show_message(title, &body);
                    }
                    Err(_) => popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY),
                }
            });
        })
    };

    let on_open_random = {
        let api = props.api.clone();
        let cache = props.cache.clone();
        let popup = popup.clone();
        let loading = loading.clone();
        let opened = opened.clone();
        let jar_id = props.jar_id.clone();
        Callback::from(move |_: MouseEvent| {
            let api = api.clone();
            let cache = cache.clone();
            let popup = popup.clone();
            let loading = loading.clone();
            let opened = opened.clone();
            let jar_id = jar_id.clone();
            loading.set(true);
            spawn_local(async move {
                let result = api.random_capsule(&jar_id).await;
                loading.set(false);
                match result {
                    Ok(envelope) if envelope.is_ok() => {
                        let Some(detail) = envelope.data else {
                            popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY);
                            return;
                        };
                        opened.set(Some(OpenedCapsule {
                            capsule_id: None,
                            detail,
                        }));
                        cache.refetch_jar(&jar_id);
                        cache.refetch_user();
                    }
                    Ok(envelope) => {
                        let (title, body) = open_failure_notice(&envelope, RANDOM_CAPSULE_FALLBACK);
                        popup.show_message(title, &body);
                    }
                    Err(_) => popup.show_message(GENERIC_ERROR_TITLE, GENERIC_ERROR_BODY),
                }
            });
        })
    };

    let on_write = {
        let popup = popup.clone();
        let user = user.clone();
        let user_type = props.user_type;
        let jar_id = props.jar_id.clone();
        Callback::from(move |_: MouseEvent| {
            if user.is_none() {
                popup.show_message_with_confirm(
                    "Login Required",
                    "You need to login to write a message.",
                    Callback::from(|_| navigate(&Route::Login)),
                );
                return;
            }
            navigate(&Route::Write {
                user_type,
                jar_id: jar_id.clone(),
                kind: WriteKind::Normal,
                step: 1,
                capsule_id: None,
            });
        })
    };

    let on_back = Callback::from(|_: MouseEvent| navigate(&Route::Splash));

    let capsule_dots: Html = match jar.as_ref() {
        Some(jar) => jar
            .capsules
            .iter()
            .map(|capsule| {
                let on_click = {
                    let open_capsule = open_capsule.clone();
                    let capsule_id = capsule.capsule_id.clone();
                    Callback::from(move |_: MouseEvent| open_capsule.emit(capsule_id.clone()))
                };
                let class = if capsule.read {
                    "capsule-dot read"
                } else {
                    "capsule-dot"
                };
                html! {
                    <button
                        class={class}
                        style={format!("background-color: {};", capsule.color)}
                        title={capsule.author_nickname.clone()}
                        onclick={on_click}
                    />
                }
            })
            .collect(),
        None => Html::default(),
    };

    let owner_label = jar
        .as_ref()
        .map(|jar| jar.user_nickname.clone())
        .unwrap_or_default();
    let coin_label = user.as_ref().map(|user| user.coin.to_string());

    html! {
        <div class="page jar-page">
            <header class="jar-header">
                <button class="link" onclick={on_back}>{"Back"}</button>
                <h1>{format!("{owner_label}'s Jar")}</h1>
                if let Some(coins) = coin_label {
                    <span class="coin-count">{format!("Coins: {coins}")}</span>
                }
            </header>
            <div class="capsule-grid">
                {capsule_dots}
            </div>
            <div class="jar-actions">
                <button class="primary" onclick={on_open_random}>{"Open Random"}</button>
                <button class="primary" onclick={on_write}>{"Write a Capsule"}</button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure_envelope(message: Option<&str>) -> Envelope<CapsuleDetail> {
        Envelope {
            status: 404,
            data: None,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn open_failure_keeps_generic_title_and_server_body() {
        let (title, body) =
            open_failure_notice(&failure_envelope(Some("capsule is gone")), LOAD_CAPSULE_FALLBACK);
        assert_eq!(title, "Error");
        assert_eq!(body, "capsule is gone");
    }

    #[test]
    fn open_failure_body_falls_back_per_operation() {
        let (title, body) = open_failure_notice(&failure_envelope(None), LOAD_CAPSULE_FALLBACK);
        assert_eq!(title, "Error");
        assert_eq!(body, "Failed to load capsule");

        let (_, body) = open_failure_notice(&failure_envelope(None), RANDOM_CAPSULE_FALLBACK);
        assert_eq!(body, "Failed to get random capsule");
    }
}
