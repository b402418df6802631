//! Browser collaborators behind small ports.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session core never touches `web_sys` or `leptos_router` directly; it
//! reads and writes through `KeyValueStore` and `Router` so tests can swap in
//! in-memory versions.

pub mod router;
pub mod storage;
pub mod token;
