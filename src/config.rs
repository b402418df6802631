//! Static client configuration.
//!
//! There is no runtime config file in the browser: session constants are
//! fixed, and API coordinates are baked in at build time through
//! `SIGNUP_API_URL` / `SIGNUP_EVENT_ID`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

const DEFAULT_API_URL: &str = "https://api.example.com";
const DEFAULT_EVENT_ID: &str = "@current";

/// Names used by the session bootstrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    /// `localStorage` key holding the session token.
    pub storage_key: String,
    /// Query parameter carrying a one-time token after login redirects.
    pub token_param: String,
    /// Query parameter sent alongside the token; stripped, never read.
    pub expiration_param: String,
    /// Reserved user id meaning "whoever owns the token".
    pub self_user_id: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage_key: "token".to_owned(),
            token_param: "token".to_owned(),
            expiration_param: "expiration".to_owned(),
            self_user_id: "@me".to_owned(),
        }
    }
}

/// Where the registration API lives and which event it is for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub event_id: String,
}

impl ApiConfig {
    /// Build a config, dropping any trailing `/` from `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, event_id: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, event_id: event_id.into() }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(
            option_env!("SIGNUP_API_URL").unwrap_or(DEFAULT_API_URL),
            option_env!("SIGNUP_EVENT_ID").unwrap_or(DEFAULT_EVENT_ID),
        )
    }
}
