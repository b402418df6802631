//! Which screen the visitor belongs on.
//!
//! The classifier runs once per load cycle: when every load flag is set and
//! the view is still `Loading`. Terminal views never re-classify; only a
//! session reset returns to `Loading`.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

/// Discrete application view. Every terminal value has a route of the same name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Loading,
    Auth,
    Register,
    Profile,
}

impl ViewState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Auth => "auth",
            Self::Register => "register",
            Self::Profile => "profile",
        }
    }

    /// Route this view lives at; `Loading` has none.
    #[must_use]
    pub fn expected_route(self) -> Option<String> {
        match self {
            Self::Loading => None,
            other => Some(format!("/{}", other.name())),
        }
    }
}

/// First-attempt markers for each link of token -> user -> registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadFlags {
    pub token: bool,
    pub user: bool,
    pub registration: bool,
}

impl LoadFlags {
    #[must_use]
    pub fn all(self) -> bool {
        self.token && self.user && self.registration
    }
}

/// Map presence of token, user, and registration to a terminal view.
#[must_use]
pub fn classify(has_token: bool, has_user: bool, has_registration: bool) -> ViewState {
    if !has_token || !has_user {
        ViewState::Auth
    } else if !has_registration {
        ViewState::Register
    } else {
        ViewState::Profile
    }
}

/// The view to move to, if a transition is due.
#[must_use]
pub fn next_view(
    current: ViewState,
    loaded: LoadFlags,
    has_token: bool,
    has_user: bool,
    has_registration: bool,
) -> Option<ViewState> {
    if current != ViewState::Loading || !loaded.all() {
        return None;
    }
    Some(classify(has_token, has_user, has_registration))
}

/// Route to navigate to so `pathname` matches `view`, if it does not already.
#[must_use]
pub fn route_to_sync(view: ViewState, pathname: &str) -> Option<String> {
    view.expected_route().filter(|route| route != pathname)
}

/// True while data is loading or the router has not caught up with `view`.
#[must_use]
pub fn is_loading(view: ViewState, pathname: &str) -> bool {
    view.expected_route().is_none_or(|route| route != pathname)
}
