//! Business logic layer.
//!
//! - `meet_client` - HTTP client for the remote conferencing provider
//! - `live_sessions` - session lifecycle coordination (remote-first CRUD)
//! - `publish` - notification trigger sites feeding the shared dispatcher

pub mod live_sessions;
pub mod meet_client;
pub mod publish;
