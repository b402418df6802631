//! Session token discovery.
//!
//! Login redirects land on `/?token=...&expiration=...`. The token is taken
//! from the query exactly once: the parameters are stripped and the address
//! bar is rewritten before anything else reads the location. Without a URL
//! token the persisted one is used.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use url::Url;

use super::router::{Router, join_location};
use super::storage::KeyValueStore;
use crate::config::AuthConfig;

// Locations are paths; `url` needs an absolute base to parse them.
const LOCATION_BASE: &str = "http://localhost";

/// A token found in the query, plus the location with it removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlToken {
    /// `None` when the parameter was present but empty.
    pub token: Option<String>,
    pub stripped: String,
}

/// Pull the token parameter out of `location`, if it has one.
///
/// Both the token and the expiration parameter are removed from the returned
/// location; every other parameter and the fragment are kept.
pub fn take_url_token(location: &str, config: &AuthConfig) -> Option<UrlToken> {
    let mut url = Url::parse(LOCATION_BASE).ok()?.join(location).ok()?;

    let mut token = None;
    let mut kept = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == config.token_param.as_str() {
            token.get_or_insert_with(|| value.into_owned());
        } else if key != config.expiration_param.as_str() {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }
    let token = token?;

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&kept);
    }

    Some(UrlToken {
        token: Some(token).filter(|t| !t.is_empty()),
        stripped: join_location(url.path(), url.query().unwrap_or(""), url.fragment().unwrap_or("")),
    })
}

/// Find the current token: URL first (stripping it), then storage.
pub fn resolve_token(router: &dyn Router, store: &dyn KeyValueStore, config: &AuthConfig) -> Option<String> {
    if let Some(found) = take_url_token(&router.location(), config) {
        router.replace(&found.stripped);
        leptos::logging::log!("auth: token taken from url");
        return found.token;
    }
    store.get(&config.storage_key).filter(|t| !t.is_empty())
}
