//! Reducer behind the single process-wide popup.
//!
//! The state is generic over the host UI's opaque custom element `E` and
//! callback slot `A`, so the transition function stays pure and testable
//! away from the browser.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonCount {
    #[default]
    One,
    Two,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopupState<E, A> {
    pub visible: bool,
    /// When present, overrides title/body/button rendering entirely.
    pub element: Option<E>,
    pub title: String,
    pub body: String,
    pub on_confirm: Option<A>,
    pub on_reject: Option<A>,
    pub on_dimmed_click: Option<A>,
    pub button_count: ButtonCount,
    pub confirm_label: String,
    pub reject_label: String,
    pub with_dimmed: bool,
}

impl<E, A> Default for PopupState<E, A> {
    fn default() -> Self {
        Self {
            visible: false,
            element: None,
            title: String::new(),
            body: String::new(),
            on_confirm: None,
            on_reject: None,
            on_dimmed_click: None,
            button_count: ButtonCount::One,
            confirm_label: String::new(),
            reject_label: String::new(),
            with_dimmed: false,
        }
    }
}

/// Partial state; `None` fields keep their current value on `Show`.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupPatch<E, A> {
    pub element: Option<E>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub on_confirm: Option<A>,
    pub on_reject: Option<A>,
    pub on_dimmed_click: Option<A>,
    pub button_count: Option<ButtonCount>,
    pub confirm_label: Option<String>,
    pub reject_label: Option<String>,
    pub with_dimmed: Option<bool>,
}

impl<E, A> Default for PopupPatch<E, A> {
    fn default() -> Self {
        Self {
            element: None,
            title: None,
            body: None,
            on_confirm: None,
            on_reject: None,
            on_dimmed_click: None,
            button_count: None,
            confirm_label: None,
            reject_label: None,
            with_dimmed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PopupAction<E, A> {
    Show(PopupPatch<E, A>),
    Close,
}

impl<E: Clone, A: Clone> PopupState<E, A> {
    /// Pure transition. `Show` shallow-merges the patch over the current
    /// state and forces visibility; showing over an open popup overwrites
    /// it (no stacking). `Close` discards everything, including fields the
    /// overlay never consumed.
    pub fn apply(&self, action: PopupAction<E, A>) -> Self {
        match action {
            PopupAction::Show(patch) => Self {
                visible: true,
                element: patch.element.or_else(|| self.element.clone()),
                title: patch.title.unwrap_or_else(|| self.title.clone()),
                body: patch.body.unwrap_or_else(|| self.body.clone()),
                on_confirm: patch.on_confirm.or_else(|| self.on_confirm.clone()),
                on_reject: patch.on_reject.or_else(|| self.on_reject.clone()),
                on_dimmed_click: patch
                    .on_dimmed_click
                    .or_else(|| self.on_dimmed_click.clone()),
                button_count: patch.button_count.unwrap_or(self.button_count),
                confirm_label: patch
                    .confirm_label
                    .unwrap_or_else(|| self.confirm_label.clone()),
                reject_label: patch
                    .reject_label
                    .unwrap_or_else(|| self.reject_label.clone()),
                with_dimmed: patch.with_dimmed.unwrap_or(self.with_dimmed),
            },
            PopupAction::Close => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = PopupState<&'static str, u32>;
    type Patch = PopupPatch<&'static str, u32>;

    #[test]
    fn show_merges_over_defaults_and_sets_visible() {
        let state = State::default().apply(PopupAction::Show(Patch {
            title: Some("Error".to_string()),
            body: Some("boom".to_string()),
            ..Patch::default()
        }));
        assert!(state.visible);
        assert_eq!(state.title, "Error");
        assert_eq!(state.body, "boom");
        assert_eq!(state.button_count, ButtonCount::One);
        assert!(state.on_confirm.is_none());
    }

    #[test]
    fn successive_shows_merge_left_to_right() {
        let first = State::default().apply(PopupAction::Show(Patch {
            title: Some("First".to_string()),
            on_confirm: Some(1),
            ..Patch::default()
        }));
        let second = first.apply(PopupAction::Show(Patch {
            body: Some("second body".to_string()),
            button_count: Some(ButtonCount::Two),
            ..Patch::default()
        }));
        assert!(second.visible);
        assert_eq!(second.title, "First");
        assert_eq!(second.body, "second body");
        assert_eq!(second.on_confirm, Some(1));
        assert_eq!(second.button_count, ButtonCount::Two);
    }

    #[test]
    fn close_resets_to_exact_default() {
        let open = State::default().apply(PopupAction::Show(Patch {
            title: Some("anything".to_string()),
            element: Some("custom"),
            on_reject: Some(9),
            with_dimmed: Some(true),
            ..Patch::default()
        }));
        assert_eq!(open.apply(PopupAction::Close), State::default());
    }

    #[test]
    fn element_survives_merge_until_close() {
        let open = State::default().apply(PopupAction::Show(Patch {
            element: Some("custom"),
            ..Patch::default()
        }));
        let merged = open.apply(PopupAction::Show(Patch {
            title: Some("late title".to_string()),
            ..Patch::default()
        }));
        assert_eq!(merged.element, Some("custom"));
    }
}
