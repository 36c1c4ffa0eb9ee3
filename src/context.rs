//! App-wide popup and loading state. Both are owned by the application
//! root and injected through context providers; nothing here is a global.

use std::rc::Rc;

use yew::prelude::*;

use capsulejar_core::popup::{PopupAction, PopupPatch, PopupState};

pub(crate) type AppPopupState = PopupState<Html, Callback<()>>;
pub(crate) type AppPopupPatch = PopupPatch<Html, Callback<()>>;
pub(crate) type AppPopupAction = PopupAction<Html, Callback<()>>;

pub(crate) const GENERIC_ERROR_TITLE: &str = "Error";
pub(crate) const GENERIC_ERROR_BODY: &str = "An unexpected error occurred.";

/// Reducer store over the pure popup transition function.
#[derive(Clone, PartialEq, Default)]
pub(crate) struct PopupStore(pub(crate) AppPopupState);

impl Reducible for PopupStore {
    type Action = AppPopupAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new(Self(self.0.apply(action)))
    }
}

#[derive(Clone, PartialEq)]
pub(crate) struct PopupHandle {
    dispatcher: UseReducerDispatcher<PopupStore>,
}

impl PopupHandle {
    pub(crate) fn new(dispatcher: UseReducerDispatcher<PopupStore>) -> Self {
        Self { dispatcher }
    }

    pub(crate) fn show(&self, patch: AppPopupPatch) {
        self.dispatcher.dispatch(PopupAction::Show(patch));
    }

    pub(crate) fn close(&self) {
        self.dispatcher.dispatch(PopupAction::Close);
    }

    /// One-button informational popup.
    pub(crate) fn show_message(&self, title: &str, body: &str) {
        self.show(AppPopupPatch {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            ..AppPopupPatch::default()
        });
    }

    /// One-button popup whose confirm runs a follow-up action.
    pub(crate) fn show_message_with_confirm(
        &self,
        title: &str,
        body: &str,
        on_confirm: Callback<()>,
    ) {
        self.show(AppPopupPatch {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            on_confirm: Some(on_confirm),
            ..AppPopupPatch::default()
        });
    }
}

/// Boolean loading flag, not a counter: concurrent operations share one
/// flag and the first to finish clears it. Callers pair set-true/set-false
/// around every exit path of their operation.
#[derive(Clone, PartialEq)]
pub(crate) struct LoadingHandle {
    setter: Callback<bool>,
}

impl LoadingHandle {
    pub(crate) fn new(setter: Callback<bool>) -> Self {
        Self { setter }
    }

    pub(crate) fn set(&self, active: bool) {
        self.setter.emit(active);
    }
}
