//! Persistence boundary.
//!
//! Schema and query design live outside this core; only the trait is
//! specified here. `aula-test-utils` provides an in-memory implementation.

pub mod live_sessions;

pub use live_sessions::LiveSessionRepository;
