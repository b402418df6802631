//! Client-side routing port.
//!
//! `navigate` is a real page transition; `replace` rewrites the address bar
//! in place (history replace) and is used for cosmetic URL cleanup.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::GetUntracked;
use leptos_router::NavigateOptions;
use leptos_router::location::Location;

/// What the session needs from the router.
pub trait Router {
    /// Path of the current route, without query or fragment.
    fn pathname(&self) -> String;
    /// Path plus query string and fragment.
    fn location(&self) -> String;
    fn navigate(&self, path: &str);
    fn replace(&self, url: &str);
}

/// Rebuild `path?query#hash` from its parts, tolerating leading `?`/`#`.
pub fn join_location(pathname: &str, search: &str, hash: &str) -> String {
    let mut out = pathname.to_owned();
    let search = search.trim_start_matches('?');
    if !search.is_empty() {
        out.push('?');
        out.push_str(search);
    }
    let hash = hash.trim_start_matches('#');
    if !hash.is_empty() {
        out.push('#');
        out.push_str(hash);
    }
    out
}

fn pathname_of(location: &str) -> &str {
    location.split(['?', '#']).next().unwrap_or(location)
}

/// `Router` over the `leptos_router` context.
#[derive(Clone)]
pub struct LeptosRouter {
    location: Location,
    navigate: Rc<dyn Fn(&str, NavigateOptions)>,
}

impl LeptosRouter {
    /// Capture the router context. Must run inside `<Router>`.
    #[must_use]
    pub fn from_context() -> Self {
        let navigate = leptos_router::hooks::use_navigate();
        Self {
            location: leptos_router::hooks::use_location(),
            navigate: Rc::new(move |path, options| navigate(path, options)),
        }
    }
}

impl Router for LeptosRouter {
    fn pathname(&self) -> String {
        self.location.pathname.get_untracked()
    }

    fn location(&self) -> String {
        join_location(
            &self.location.pathname.get_untracked(),
            &self.location.search.get_untracked(),
            &self.location.hash.get_untracked(),
        )
    }

    fn navigate(&self, path: &str) {
        (self.navigate)(path, NavigateOptions::default());
    }

    fn replace(&self, url: &str) {
        (self.navigate)(url, NavigateOptions { replace: true, ..NavigateOptions::default() });
    }
}

/// A route transition recorded by `MemoryRouter`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteChange {
    Navigate(String),
    Replace(String),
}

/// In-memory router for SSR and tests. Clones share state.
#[derive(Clone, Debug)]
pub struct MemoryRouter {
    current: Rc<RefCell<String>>,
    history: Rc<RefCell<Vec<RouteChange>>>,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryRouter {
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            current: Rc::new(RefCell::new(location.to_owned())),
            history: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Move to `location` as if the user typed it; not recorded in history.
    pub fn visit(&self, location: &str) {
        *self.current.borrow_mut() = location.to_owned();
    }

    #[must_use]
    pub fn history(&self) -> Vec<RouteChange> {
        self.history.borrow().clone()
    }
}

impl Router for MemoryRouter {
    fn pathname(&self) -> String {
        pathname_of(&self.current.borrow()).to_owned()
    }

    fn location(&self) -> String {
        self.current.borrow().clone()
    }

    fn navigate(&self, path: &str) {
        self.visit(path);
        self.history.borrow_mut().push(RouteChange::Navigate(path.to_owned()));
    }

    fn replace(&self, url: &str) {
        self.visit(url);
        self.history.borrow_mut().push(RouteChange::Replace(url.to_owned()));
    }
}
