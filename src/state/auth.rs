//! Reactive session context for pages and components.
//!
//! SYSTEM CONTEXT
//! ==============
//! `provide_auth` wires an `AuthSession` into Leptos: every session change is
//! mirrored into a signal, and every route change re-runs token resolution
//! and the load pipeline. Pages call `use_auth` and read `loading`, `token`,
//! `user`, and `registration`, or call `reset`, `get_user`, and
//! `get_registration`.
//!
//! ERROR HANDLING
//! ==============
//! Pipeline runs started here have no caller to return to, so unrecovered
//! failures are logged with `leptos::logging::error!` and left to the page.

use leptos::logging::error;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use leptos_router::hooks::use_location;

use super::session::{AuthSession, AuthSnapshot, SessionError};
use super::view::{ViewState, is_loading};
use crate::config::{ApiConfig, AuthConfig};
use crate::net::api::HttpApi;
use crate::net::types::{Registration, User};
use crate::util::router::LeptosRouter;
use crate::util::storage::BrowserStorage;

/// Handle exposed to pages through context.
#[derive(Clone, Copy)]
pub struct AuthContext {
    snapshot: RwSignal<AuthSnapshot>,
    loading: Signal<bool>,
    session: StoredValue<AuthSession, LocalStorage>,
}

impl AuthContext {
    /// True while loading or while navigation to the right page is pending.
    pub fn loading(&self) -> Signal<bool> {
        self.loading
    }

    pub fn view(&self) -> Signal<ViewState> {
        let snapshot = self.snapshot;
        Signal::derive(move || snapshot.with(|s| s.view))
    }

    pub fn token(&self) -> Signal<Option<String>> {
        let snapshot = self.snapshot;
        Signal::derive(move || snapshot.with(|s| s.token.clone()))
    }

    pub fn user(&self) -> Signal<Option<User>> {
        let snapshot = self.snapshot;
        Signal::derive(move || snapshot.with(|s| s.user.clone()))
    }

    pub fn registration(&self) -> Signal<Option<Registration>> {
        let snapshot = self.snapshot;
        Signal::derive(move || snapshot.with(|s| s.registration.clone()))
    }

    /// The underlying session, for awaiting pipeline calls directly.
    pub fn session(&self) -> AuthSession {
        self.session.get_value()
    }

    /// Log out: drop the token and run the pipeline again.
    pub fn reset(&self) {
        let session = self.session();
        session.reset();
        spawn_local(async move { report(session.settle().await) });
    }

    pub async fn get_user(&self) -> Result<Option<User>, SessionError> {
        self.session().get_user().await
    }

    pub async fn get_registration(&self) -> Result<Option<Registration>, SessionError> {
        self.session().get_registration().await
    }
}

fn report(result: Result<ViewState, SessionError>) {
    if let Err(err) = result {
        error!("auth: {err}");
    }
}

/// Bind `session` to the current router and provide it as context.
///
/// Must be called inside `<Router>`.
pub fn provide_auth(session: AuthSession) -> AuthContext {
    let snapshot = RwSignal::new(session.snapshot());
    session.subscribe(move |next| snapshot.set(next.clone()));

    let location = use_location();
    let loading = Signal::derive(move || {
        let pathname = location.pathname.get();
        snapshot.with(|s| is_loading(s.view, &pathname))
    });

    let session = StoredValue::new_local(session);
    Effect::new(move || {
        location.pathname.track();
        location.search.track();
        let session = session.get_value();
        spawn_local(async move { report(session.on_route_change().await) });
    });

    let auth = AuthContext { snapshot, loading, session };
    provide_context(auth);
    auth
}

/// `provide_auth` with the browser's storage, router, and HTTP API.
pub fn provide_browser_auth(api: ApiConfig) -> AuthContext {
    let session = AuthSession::new(
        AuthConfig::default(),
        HttpApi::new(api),
        BrowserStorage,
        LeptosRouter::from_context(),
    );
    provide_auth(session)
}

/// The auth context provided by an ancestor.
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}
