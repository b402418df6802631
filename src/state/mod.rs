//! Session state and its Leptos binding.
//!
//! DESIGN
//! ======
//! `view` is a pure classifier with no I/O, `session` owns the load pipeline
//! and all side effects, `auth` adapts the session to signals, and `register`
//! drives the sign-up form on top of a loaded session.

pub mod auth;
pub mod register;
pub mod session;
pub mod view;
