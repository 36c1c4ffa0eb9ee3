//! Application shell: route switching, the popup and loading overlays,
//! and the splash page. Popup and loading handles are provided through
//! context so any page can reach them without prop drilling.

use std::rc::Rc;

use gloo::events::EventListener;
use web_sys::MouseEvent;
use yew::prelude::*;

use crate::api::{default_base_url, ApiClient};
use crate::app_router::{current_route, navigate, Route, UserType};
use crate::auth_view::{LoginPage, SignupPage};
use crate::context::{
    AppPopupState, LoadingHandle, PopupHandle, PopupStore,
};
use crate::jar_view::JarPage;
use crate::persisted_store::load_auth_token;
use crate::query_cache::QueryCache;
use crate::write_view::WritePage;

use capsulejar_core::popup::ButtonCount;

#[derive(Properties)]
pub(crate) struct AppProps {
    pub(crate) api: Rc<ApiClient>,
}

impl PartialEq for AppProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api)
    }
}

#[derive(Properties, PartialEq)]
struct PopupOverlayProps {
    state: AppPopupState,
    handle: PopupHandle,
}

#[function_component(PopupOverlay)]
fn popup_overlay(props: &PopupOverlayProps) -> Html {
    let state = &props.state;
    if !state.visible {
        return Html::default();
    }

    // Clicking the backdrop fires the dimmed handler but never closes.
    let on_backdrop_click = {
        let on_dimmed_click = state.on_dimmed_click.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(on_dimmed_click) = &on_dimmed_click {
                on_dimmed_click.emit(());
            }
        })
    };
    let stop_bubble = Callback::from(|event: MouseEvent| event.stop_propagation());

    let on_confirm = {
        let handle = props.handle.clone();
        let on_confirm = state.on_confirm.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(on_confirm) = &on_confirm {
                on_confirm.emit(());
            }
            handle.close();
        })
    };
    let on_reject = {
        let handle = props.handle.clone();
        let on_reject = state.on_reject.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(on_reject) = &on_reject {
                on_reject.emit(());
            }
            handle.close();
        })
    };

    let backdrop_class = if state.with_dimmed {
        "popup-backdrop dimmed"
    } else {
        "popup-backdrop"
    };
    let confirm_label = if state.confirm_label.is_empty() {
        "OK".to_string()
    } else {
        state.confirm_label.clone()
    };
    let reject_label = if state.reject_label.is_empty() {
        "Cancel".to_string()
    } else {
        state.reject_label.clone()
    };

    let panel = match state.element.clone() {
        Some(element) => element,
        None => html! {
            <>
                <h2 class="popup-title">{state.title.clone()}</h2>
                <p class="popup-body">{state.body.clone()}</p>
                <div class="popup-buttons">
                    if state.button_count == ButtonCount::Two {
                        <button class="popup-reject" onclick={on_reject}>{reject_label}</button>
                    }
                    <button class="popup-confirm" onclick={on_confirm}>{confirm_label}</button>
                </div>
            </>
        },
    };

    html! {
        <div class={backdrop_class} onclick={on_backdrop_click}>
            <div class="popup-panel" onclick={stop_bubble}>
                {panel}
            </div>
        </div>
    }
}

#[function_component(LoadingOverlay)]
fn loading_overlay() -> Html {
    html! {
        <div class="loading-overlay">
            <div class="spinner" />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SplashProps {
    cache: QueryCache,
}

#[function_component(SplashPage)]
fn splash_page(props: &SplashProps) -> Html {
    let tick = use_state(|| 0u64);
    {
        let cache = props.cache.clone();
        let tick = tick.clone();
        let counter = use_mut_ref(|| 0u64);
        use_effect_with((), move |_| {
            let listener: Rc<dyn Fn()> = Rc::new(move || {
                let mut count = counter.borrow_mut();
                *count += 1;
                tick.set(*count);
            });
            let subscription = cache.subscribe(listener);
            cache.ensure_user();
            move || drop(subscription)
        });
    }

    // A returning owner lands straight in their jar.
    let owned_jar = props
        .cache
        .user()
        .map(|user| user.jar_id.clone())
        .filter(|jar_id| !jar_id.is_empty());
    use_effect_with(owned_jar, |owned_jar| {
        if let Some(jar_id) = owned_jar {
            navigate(&Route::Jar {
                user_type: UserType::Master,
                jar_id: jar_id.clone(),
            });
        }
    });

    let on_login = Callback::from(|_: MouseEvent| navigate(&Route::Login));
    let on_signup = Callback::from(|_: MouseEvent| navigate(&Route::Signup));

    html! {
        <div class="page splash-page">
            <h1>{"Capsule Jar"}</h1>
            <p>{"Leave a message, open one later."}</p>
            <button class="primary" onclick={on_login}>{"Log In"}</button>
            <button class="primary" onclick={on_signup}>{"Sign Up"}</button>
        </div>
    }
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let popup_store = use_reducer(PopupStore::default);
    let loading = use_state(|| false);
    let cache_state = use_state({
        let api = props.api.clone();
        move || QueryCache::new(api)
    });
    let cache = (*cache_state).clone();

    let popup_handle = {
        let dispatcher = popup_store.dispatcher();
        (*use_memo((), move |_| PopupHandle::new(dispatcher))).clone()
    };
    let loading_handle = {
        let setter = loading.setter();
        (*use_memo((), move |_| {
            LoadingHandle::new(Callback::from(move |active| setter.set(active)))
        }))
        .clone()
    };

    let route = use_state(current_route);
    {
        let route = route.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window available");
            let listener = EventListener::new(&window, "hashchange", move |_| {
                route.set(current_route());
            });
            move || drop(listener)
        });
    }

    let page = match (*route).clone() {
        Route::Splash => html! { <SplashPage cache={cache} /> },
        Route::Login => html! { <LoginPage api={props.api.clone()} /> },
        Route::Signup => html! { <SignupPage api={props.api.clone()} /> },
        Route::Jar { user_type, jar_id } => html! {
            <JarPage api={props.api.clone()} cache={cache} {user_type} {jar_id} />
        },
        Route::Write {
            user_type,
            jar_id,
            kind,
            step,
            capsule_id,
        } => html! {
            <WritePage
                api={props.api.clone()}
                {user_type}
                {jar_id}
                {kind}
                {step}
                {capsule_id}
            />
        },
    };

    html! {
        <ContextProvider<PopupHandle> context={popup_handle.clone()}>
            <ContextProvider<LoadingHandle> context={loading_handle}>
                {page}
                <PopupOverlay state={(*popup_store).0.clone()} handle={popup_handle} />
                if *loading {
                    <LoadingOverlay />
                }
            </ContextProvider<LoadingHandle>>
        </ContextProvider<PopupHandle>>
    }
}

pub(crate) fn run_app() {
    let base_url = default_base_url();
    gloo::console::log!("boot", base_url.clone());
    let api = Rc::new(ApiClient::new(base_url, load_auth_token()));
    yew::Renderer::<App>::with_props(AppProps { api }).render();
}
