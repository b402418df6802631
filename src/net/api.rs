//! REST port for the registration API and its browser implementation.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR) and native tests: `HttpApi` answers every call with
//! `ApiError::Unavailable`; tests substitute their own `RegistrationApi`.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Status` with the response body as the
//! message, so the session can branch on 401/404 without string matching.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{MetadataField, NewRegistration, Registration, User, UserUpdate};
use crate::config::ApiConfig;

/// Calls the session and registration form make against the API.
///
/// Futures are `?Send`: everything runs on the browser event loop.
#[async_trait(?Send)]
pub trait RegistrationApi {
    /// `id` is a user id or the reserved self id.
    async fn fetch_user(&self, id: &str, token: &str) -> Result<User, ApiError>;
    async fn fetch_registration(&self, user_id: &str, token: &str) -> Result<Registration, ApiError>;
    async fn fetch_user_emails(&self, user_id: &str, token: &str) -> Result<Vec<String>, ApiError>;
    async fn fetch_metadata(&self, token: &str) -> Result<Vec<MetadataField>, ApiError>;
    async fn update_user(&self, user_id: &str, token: &str, update: &UserUpdate) -> Result<User, ApiError>;
    async fn create_registration(
        &self,
        user_id: &str,
        token: &str,
        registration: &NewRegistration,
    ) -> Result<Registration, ApiError>;
}

fn user_endpoint(config: &ApiConfig, id: &str) -> String {
    format!("{}/users/{id}", config.base_url)
}

fn user_emails_endpoint(config: &ApiConfig, user_id: &str) -> String {
    format!("{}/users/{user_id}/emails", config.base_url)
}

fn metadata_endpoint(config: &ApiConfig) -> String {
    format!("{}/events/{}/metadata", config.base_url, config.event_id)
}

fn registration_endpoint(config: &ApiConfig, user_id: &str) -> String {
    format!("{}/events/{}/registrations/{user_id}", config.base_url, config.event_id)
}

#[cfg(any(test, feature = "hydrate"))]
fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[derive(Clone, Copy, Debug)]
enum Method {
    Get,
    Post,
    Patch,
}

/// `RegistrationApi` over `fetch`, authenticated with a bearer token.
#[derive(Clone, Debug, Default)]
pub struct HttpApi {
    config: ApiConfig,
}

impl HttpApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait(?Send)]
impl RegistrationApi for HttpApi {
    async fn fetch_user(&self, id: &str, token: &str) -> Result<User, ApiError> {
        request(Method::Get, &user_endpoint(&self.config, id), token, None::<&()>).await
    }

    async fn fetch_registration(&self, user_id: &str, token: &str) -> Result<Registration, ApiError> {
        request(Method::Get, &registration_endpoint(&self.config, user_id), token, None::<&()>).await
    }

    async fn fetch_user_emails(&self, user_id: &str, token: &str) -> Result<Vec<String>, ApiError> {
        request(Method::Get, &user_emails_endpoint(&self.config, user_id), token, None::<&()>).await
    }

    async fn fetch_metadata(&self, token: &str) -> Result<Vec<MetadataField>, ApiError> {
        request(Method::Get, &metadata_endpoint(&self.config), token, None::<&()>).await
    }

    async fn update_user(&self, user_id: &str, token: &str, update: &UserUpdate) -> Result<User, ApiError> {
        request(Method::Patch, &user_endpoint(&self.config, user_id), token, Some(update)).await
    }

    async fn create_registration(
        &self,
        user_id: &str,
        token: &str,
        registration: &NewRegistration,
    ) -> Result<Registration, ApiError> {
        request(Method::Post, &registration_endpoint(&self.config, user_id), token, Some(registration)).await
    }
}

async fn request<T, B>(method: Method, url: &str, token: &str, body: Option<&B>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    #[cfg(feature = "hydrate")]
    {
        use gloo_net::http::Request;

        let builder = match method {
            Method::Get => Request::get(url),
            Method::Post => Request::post(url),
            Method::Patch => Request::patch(url),
        }
        .header("Authorization", &bearer(token));

        let resp = match body {
            Some(body) => builder
                .json(body)
                .map_err(|e| ApiError::Transport(e.to_string()))?
                .send()
                .await,
            None => builder.send().await,
        }
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !resp.ok() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: resp.status(), message });
        }
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (method, url, token, body);
        Err(ApiError::Unavailable)
    }
}
