//! Aula Classroom Platform Core Library
//!
//! This library provides the two cross-cutting behaviors of the Aula
//! classroom platform backend: best-effort notification fan-out to class
//! rosters, and coordination between locally persisted live sessions and
//! the remote conferencing provider that hosts them.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `models` - Data models
//! - `notify` - Notification jobs, mail transport boundary, and dispatcher
//! - `repositories` - Persistence boundary for live sessions
//! - `roster` - Class roster resolution boundary
//! - `services` - Business logic layer (remote client, session lifecycle,
//!   trigger-site fan-out)

pub mod config;
pub mod errors;
pub mod models;
pub mod notify;
pub mod repositories;
pub mod roster;
pub mod services;
