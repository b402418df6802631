//! Networking modules for the registration API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the HTTP port and its `gloo-net` implementation, `error`
//! classifies failures by status, and `types` defines the wire schema.

pub mod api;
pub mod error;
pub mod types;
