//! # signup-client
//!
//! Leptos + WASM client core for the event registration site.
//!
//! The marketing pages are plain presentation; the interesting part lives
//! here: bootstrapping the browser session from a one-time URL token or
//! `localStorage`, loading the user and their event registration, and
//! deciding which screen (`/auth`, `/register`, `/profile`) the visitor
//! belongs on.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the registration API, `util` wraps browser collaborators
//! (storage, router, URL token) behind small ports, and `state` holds the
//! session pipeline plus its Leptos binding.

pub mod config;
pub mod net;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// Browser entry point: route panics and `log` output to the dev console.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
