//! Session bootstrap pipeline: token -> user -> registration -> view.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthSession` is the single owner of the session token. It resolves the
//! token, loads the user and their registration in strict order, classifies
//! the view once everything has had a first attempt, and keeps the router on
//! the matching page. Presentation code reads snapshots and calls `reset`,
//! `get_user`, and `get_registration`.
//!
//! DESIGN
//! ======
//! Each stage is an async transition from its inputs (token; token + user
//! id) to a value. `settle` walks the dependency chain and re-runs whichever
//! stage's inputs no longer match the inputs its current value was loaded
//! for. A stage result is committed only if it is still current:
//!
//! - same epoch (no reset since the stage started),
//! - latest invocation of that stage (sequence number),
//! - inputs unchanged.
//!
//! Anything else is dropped, so a slow response can never overwrite newer
//! state. While a newer invocation of a stage is in flight, `settle` leaves
//! it to that invocation's caller to continue the chain.
//!
//! ERROR HANDLING
//! ==============
//! 401 resets the session, 404 on the registration means "not registered",
//! and every other failure is returned to whoever triggered the stage.
//! Nothing is retried here.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::Rc;

use leptos::logging::{log, warn};

use super::view::{LoadFlags, ViewState, next_view, route_to_sync};
use crate::config::AuthConfig;
use crate::net::api::RegistrationApi;
use crate::net::error::{ApiError, FailureKind};
use crate::net::types::{Registration, User};
use crate::util::router::Router;
use crate::util::storage::KeyValueStore;
use crate::util::token;

/// Unrecovered stage failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("failed to load user: {0}")]
    User(#[source] ApiError),
    #[error("failed to load registration: {0}")]
    Registration(#[source] ApiError),
}

/// Point-in-time copy of the session, handed to subscribers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthSnapshot {
    pub view: ViewState,
    pub loaded: LoadFlags,
    pub token: Option<String>,
    pub user: Option<User>,
    pub registration: Option<Registration>,
}

type RegistrationInput = (Option<String>, Option<String>);

#[derive(Debug, Default)]
struct StageTracker<I> {
    seq: u64,
    in_flight: bool,
    /// Inputs the committed value was loaded for.
    settled_for: Option<I>,
}

impl<I: PartialEq> StageTracker<I> {
    fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.in_flight = true;
        self.seq
    }

    /// Returns whether `seq` is the latest invocation.
    fn finish(&mut self, seq: u64) -> bool {
        let latest = seq == self.seq;
        if latest {
            self.in_flight = false;
        }
        latest
    }

    fn is_settled(&self, input: &I) -> bool {
        self.settled_for.as_ref() == Some(input)
    }

    fn invalidate(&mut self) {
        self.in_flight = false;
        self.settled_for = None;
    }
}

struct Ticket<I> {
    epoch: u64,
    seq: u64,
    input: I,
}

enum Commit {
    Applied,
    Stale,
    InvalidCredential,
    Failed(ApiError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    ResolveToken,
    LoadUser,
    LoadRegistration,
    Classify,
    Idle,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    registration: Option<Registration>,
    loaded: LoadFlags,
    view: ViewState,
    /// Set after the first token resolution; storage is never cleared before it.
    token_resolved: bool,
    epoch: u64,
    user_stage: StageTracker<Option<String>>,
    registration_stage: StageTracker<RegistrationInput>,
}

impl SessionState {
    fn registration_input(&self) -> RegistrationInput {
        (self.token.clone(), self.user.as_ref().map(|u| u.id.clone()))
    }

    fn next_step(&self) -> Step {
        if !self.loaded.token {
            return Step::ResolveToken;
        }
        if !self.user_stage.is_settled(&self.token) {
            return if self.user_stage.in_flight { Step::Idle } else { Step::LoadUser };
        }
        if !self.registration_stage.is_settled(&self.registration_input()) {
            return if self.registration_stage.in_flight { Step::Idle } else { Step::LoadRegistration };
        }
        if self.pending_view().is_some() { Step::Classify } else { Step::Idle }
    }

    fn pending_view(&self) -> Option<ViewState> {
        next_view(
            self.view,
            self.loaded,
            self.token.is_some(),
            self.user.is_some(),
            self.registration.is_some(),
        )
    }

    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            view: self.view,
            loaded: self.loaded,
            token: self.token.clone(),
            user: self.user.clone(),
            registration: self.registration.clone(),
        }
    }
}

type Listener = Rc<dyn Fn(&AuthSnapshot)>;

struct Shared {
    config: AuthConfig,
    api: Rc<dyn RegistrationApi>,
    store: Rc<dyn KeyValueStore>,
    router: Rc<dyn Router>,
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<Listener>>,
}

/// Handle to the browser session. Clones share the same session.
#[derive(Clone)]
pub struct AuthSession {
    shared: Rc<Shared>,
}

impl AuthSession {
    pub fn new<A, S, R>(config: AuthConfig, api: A, store: S, router: R) -> Self
    where
        A: RegistrationApi + 'static,
        S: KeyValueStore + 'static,
        R: Router + 'static,
    {
        Self {
            shared: Rc::new(Shared {
                config,
                api: Rc::new(api),
                store: Rc::new(store),
                router: Rc::new(router),
                state: RefCell::new(SessionState::default()),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.shared.config
    }

    /// The API port, for screens that make their own authenticated calls.
    #[must_use]
    pub fn api(&self) -> Rc<dyn RegistrationApi> {
        Rc::clone(&self.shared.api)
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.shared.state.borrow().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.shared.state.borrow().user.clone()
    }

    #[must_use]
    pub fn registration(&self) -> Option<Registration> {
        self.shared.state.borrow().registration.clone()
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.shared.state.borrow().view
    }

    #[must_use]
    pub fn loaded(&self) -> LoadFlags {
        self.shared.state.borrow().loaded
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.shared.state.borrow().snapshot()
    }

    /// True while loading or while the router is still on the wrong page.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        super::view::is_loading(self.view(), &self.shared.router.pathname())
    }

    /// Call `listener` with a fresh snapshot after every state change.
    pub fn subscribe(&self, listener: impl Fn(&AuthSnapshot) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Re-read the token from the URL or storage.
    pub fn resolve_token(&self) {
        let shared = &self.shared;
        let token = token::resolve_token(shared.router.as_ref(), shared.store.as_ref(), &shared.config);
        self.apply_token(token);
        {
            let mut state = shared.state.borrow_mut();
            state.loaded.token = true;
            state.token_resolved = true;
        }
        log!("auth: token loaded");
        self.notify();
    }

    /// Drop the token and start a new load cycle from `Loading`.
    ///
    /// Results of fetches started before the reset are discarded. Call
    /// `settle` afterwards to run the new cycle.
    pub fn reset(&self) {
        log!("auth: reset");
        self.apply_token(None);
        {
            let mut state = self.shared.state.borrow_mut();
            state.view = ViewState::Loading;
            state.epoch += 1;
            state.loaded = LoadFlags { token: state.token_resolved, ..LoadFlags::default() };
            state.user_stage.invalidate();
            state.registration_stage.invalidate();
        }
        self.notify();
    }

    /// Run the pipeline until nothing is left to do, then sync the route.
    pub async fn settle(&self) -> Result<ViewState, SessionError> {
        loop {
            let step = self.shared.state.borrow().next_step();
            match step {
                Step::ResolveToken => self.resolve_token(),
                Step::LoadUser => self.load_user().await?,
                Step::LoadRegistration => self.load_registration().await?,
                Step::Classify => self.classify(),
                Step::Idle => break,
            }
        }
        self.sync_route();
        Ok(self.view())
    }

    /// React to a route change: pick up any new URL token and settle.
    pub async fn on_route_change(&self) -> Result<ViewState, SessionError> {
        self.resolve_token();
        self.settle().await
    }

    /// Reload the user for the current token.
    pub async fn get_user(&self) -> Result<Option<User>, SessionError> {
        if self.loaded().token {
            self.load_user().await?;
        }
        self.settle().await?;
        Ok(self.user())
    }

    /// Reload the registration for the current token and user.
    pub async fn get_registration(&self) -> Result<Option<Registration>, SessionError> {
        if self.loaded().user {
            self.load_registration().await?;
        }
        self.settle().await?;
        Ok(self.registration())
    }

    /// Navigate to the current view's route if the router is elsewhere.
    pub fn sync_route(&self) -> Option<String> {
        let view = self.view();
        let target = route_to_sync(view, &self.shared.router.pathname())?;
        log!("auth: switching to {}", view.name());
        self.shared.router.navigate(&target);
        Some(target)
    }

    fn apply_token(&self, token: Option<String>) {
        let shared = &self.shared;
        let resolved_before = {
            let mut state = shared.state.borrow_mut();
            if state.token == token {
                return;
            }
            state.token.clone_from(&token);
            state.token_resolved
        };
        match token {
            Some(token) => shared.store.set(&shared.config.storage_key, &token),
            None if resolved_before => shared.store.remove(&shared.config.storage_key),
            None => {}
        }
    }

    fn classify(&self) {
        let view = {
            let mut state = self.shared.state.borrow_mut();
            let Some(view) = state.pending_view() else {
                return;
            };
            state.view = view;
            view
        };
        log!("auth: state is {}", view.name());
        self.notify();
    }

    async fn load_user(&self) -> Result<(), SessionError> {
        let ticket = {
            let mut state = self.shared.state.borrow_mut();
            Ticket { epoch: state.epoch, seq: state.user_stage.begin(), input: state.token.clone() }
        };

        let result = match ticket.input.as_deref() {
            Some(token) => {
                log!("auth: user loading");
                self.shared
                    .api
                    .fetch_user(&self.shared.config.self_user_id, token)
                    .await
                    .map(Some)
            }
            None => Ok(None),
        };

        let commit = {
            let mut state = self.shared.state.borrow_mut();
            let current = ticket.epoch == state.epoch
                && state.user_stage.finish(ticket.seq)
                && state.token == ticket.input;
            if !current {
                Commit::Stale
            } else {
                match result {
                    Ok(user) => {
                        state.user = user;
                        state.user_stage.settled_for = Some(ticket.input);
                        state.loaded.user = true;
                        Commit::Applied
                    }
                    Err(err) if err.is_unauthorized() => Commit::InvalidCredential,
                    Err(err) => Commit::Failed(err),
                }
            }
        };

        match commit {
            Commit::Applied => {
                log!("auth: user loaded");
                self.notify();
            }
            Commit::Stale => log!("auth: discarding stale user result"),
            Commit::InvalidCredential => {
                warn!("auth: token rejected while loading user");
                self.reset();
            }
            Commit::Failed(err) => return Err(SessionError::User(err)),
        }
        Ok(())
    }

    async fn load_registration(&self) -> Result<(), SessionError> {
        let ticket = {
            let mut state = self.shared.state.borrow_mut();
            let input = state.registration_input();
            Ticket { epoch: state.epoch, seq: state.registration_stage.begin(), input }
        };

        let result = match &ticket.input {
            (Some(token), Some(user_id)) => {
                log!("auth: registration loading");
                match self.shared.api.fetch_registration(user_id, token).await {
                    Ok(registration) => Ok(Some(registration)),
                    Err(err) if err.kind() == FailureKind::NotFound => Ok(None),
                    Err(err) => Err(err),
                }
            }
            _ => Ok(None),
        };

        let commit = {
            let mut state = self.shared.state.borrow_mut();
            let current = ticket.epoch == state.epoch
                && state.registration_stage.finish(ticket.seq)
                && state.registration_input() == ticket.input;
            if !current {
                Commit::Stale
            } else {
                match result {
                    Ok(registration) => {
                        state.registration = registration;
                        state.registration_stage.settled_for = Some(ticket.input);
                        state.loaded.registration = true;
                        Commit::Applied
                    }
                    Err(err) if err.is_unauthorized() => Commit::InvalidCredential,
                    Err(err) => Commit::Failed(err),
                }
            }
        };

        match commit {
            Commit::Applied => {
                log!("auth: registration loaded");
                self.notify();
            }
            Commit::Stale => log!("auth: discarding stale registration result"),
            Commit::InvalidCredential => {
                warn!("auth: token rejected while loading registration");
                self.reset();
                self.shared.state.borrow_mut().registration = None;
                self.notify();
            }
            Commit::Failed(err) => return Err(SessionError::Registration(err)),
        }
        Ok(())
    }

    fn notify(&self) {
        let listeners = self.shared.listeners.borrow().clone();
        if listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &listeners {
            listener(&snapshot);
        }
    }
}
