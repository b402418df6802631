//! Scripted collaborators shared by the session and registration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::config::AuthConfig;
use crate::net::api::RegistrationApi;
use crate::net::error::ApiError;
use crate::net::types::{Metadata, MetadataField, NewRegistration, Registration, User, UserUpdate};
use crate::state::session::AuthSession;
use crate::util::router::MemoryRouter;
use crate::util::storage::MemoryStore;

type Gate<T> = oneshot::Receiver<Result<T, ApiError>>;

struct FakeApiState {
    user: Result<User, ApiError>,
    registration: Result<Registration, ApiError>,
    emails: Result<Vec<String>, ApiError>,
    metadata: Result<Vec<MetadataField>, ApiError>,
    create: Option<ApiError>,
    user_gates: VecDeque<Gate<User>>,
    registration_gates: VecDeque<Gate<Registration>>,
    calls: Vec<String>,
    updates: Vec<UserUpdate>,
    created: Vec<NewRegistration>,
}

/// `RegistrationApi` answering from scripted results.
///
/// Queued gates take priority: the next matching call waits on the gate and
/// answers with whatever is sent through it.
#[derive(Clone)]
pub struct FakeApi {
    inner: Rc<RefCell<FakeApiState>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(FakeApiState {
                user: Err(status(500)),
                registration: Err(status(404)),
                emails: Ok(Vec::new()),
                metadata: Ok(Vec::new()),
                create: None,
                user_gates: VecDeque::new(),
                registration_gates: VecDeque::new(),
                calls: Vec::new(),
                updates: Vec::new(),
                created: Vec::new(),
            })),
        }
    }
}

impl FakeApi {
    pub fn set_user(&self, user: Result<User, ApiError>) {
        self.inner.borrow_mut().user = user;
    }

    pub fn set_registration(&self, registration: Result<Registration, ApiError>) {
        self.inner.borrow_mut().registration = registration;
    }

    pub fn set_emails(&self, emails: Result<Vec<String>, ApiError>) {
        self.inner.borrow_mut().emails = emails;
    }

    pub fn set_metadata(&self, metadata: Result<Vec<MetadataField>, ApiError>) {
        self.inner.borrow_mut().metadata = metadata;
    }

    pub fn fail_create(&self, err: ApiError) {
        self.inner.borrow_mut().create = Some(err);
    }

    pub fn gate_user(&self) -> oneshot::Sender<Result<User, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.inner.borrow_mut().user_gates.push_back(rx);
        tx
    }

    pub fn gate_registration(&self) -> oneshot::Sender<Result<Registration, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.inner.borrow_mut().registration_gates.push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    /// Number of calls equal to `call`, or to `call` followed by arguments.
    pub fn count(&self, call: &str) -> usize {
        let prefix = format!("{call} ");
        self.inner.borrow().calls.iter().filter(|c| *c == call || c.starts_with(&prefix)).count()
    }

    pub fn updates(&self) -> Vec<UserUpdate> {
        self.inner.borrow().updates.clone()
    }

    pub fn created(&self) -> Vec<NewRegistration> {
        self.inner.borrow().created.clone()
    }

    fn record(&self, call: String) {
        self.inner.borrow_mut().calls.push(call);
    }
}

async fn wait<T>(gate: Gate<T>) -> Result<T, ApiError> {
    gate.await.unwrap_or_else(|_| Err(ApiError::Transport("gate dropped".to_owned())))
}

#[async_trait(?Send)]
impl RegistrationApi for FakeApi {
    async fn fetch_user(&self, id: &str, token: &str) -> Result<User, ApiError> {
        self.record(format!("fetch_user {id} {token}"));
        let gate = self.inner.borrow_mut().user_gates.pop_front();
        match gate {
            Some(gate) => wait(gate).await,
            None => self.inner.borrow().user.clone(),
        }
    }

    async fn fetch_registration(&self, user_id: &str, token: &str) -> Result<Registration, ApiError> {
        self.record(format!("fetch_registration {user_id} {token}"));
        let gate = self.inner.borrow_mut().registration_gates.pop_front();
        match gate {
            Some(gate) => wait(gate).await,
            None => self.inner.borrow().registration.clone(),
        }
    }

    async fn fetch_user_emails(&self, user_id: &str, token: &str) -> Result<Vec<String>, ApiError> {
        self.record(format!("fetch_user_emails {user_id} {token}"));
        self.inner.borrow().emails.clone()
    }

    async fn fetch_metadata(&self, token: &str) -> Result<Vec<MetadataField>, ApiError> {
        self.record(format!("fetch_metadata {token}"));
        self.inner.borrow().metadata.clone()
    }

    async fn update_user(&self, user_id: &str, token: &str, update: &UserUpdate) -> Result<User, ApiError> {
        self.record(format!("update_user {user_id} {token}"));
        let mut state = self.inner.borrow_mut();
        state.updates.push(update.clone());
        let mut user = state.user.clone()?;
        if let Some(email) = &update.email {
            user.email.clone_from(email);
        }
        state.user = Ok(user.clone());
        Ok(user)
    }

    async fn create_registration(
        &self,
        user_id: &str,
        token: &str,
        registration: &NewRegistration,
    ) -> Result<Registration, ApiError> {
        self.record(format!("create_registration {user_id} {token}"));
        let mut state = self.inner.borrow_mut();
        if let Some(err) = state.create.clone() {
            return Err(err);
        }
        state.created.push(registration.clone());
        let created = Registration { metadata: registration.metadata.clone(), created_at: None };
        state.registration = Ok(created.clone());
        Ok(created)
    }
}

pub fn status(code: u16) -> ApiError {
    ApiError::Status { status: code, message: format!("status {code}") }
}

pub fn user(id: &str, email: &str) -> User {
    User { id: id.to_owned(), name: format!("User {id}"), email: email.to_owned() }
}

pub fn registration(pairs: &[(&str, serde_json::Value)]) -> Registration {
    let metadata: Metadata = pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect();
    Registration { metadata, created_at: None }
}

pub fn session(api: &FakeApi, store: &MemoryStore, router: &MemoryRouter) -> AuthSession {
    AuthSession::new(AuthConfig::default(), api.clone(), store.clone(), router.clone())
}

/// Returns `Pending` once, waking itself, so `join!` siblings get polled.
#[derive(Default)]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
