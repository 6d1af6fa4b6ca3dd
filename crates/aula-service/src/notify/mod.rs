//! Notification fan-out: jobs, the mail transport boundary, and the
//! dispatcher worker pool.
//!
//! Delivery is strictly best-effort, at most one attempt per job. Outcomes
//! are logged, never returned; callers of [`Notifier::submit`] get no
//! acknowledgment and no ordering guarantee.

pub mod dispatcher;

pub use dispatcher::Notifier;

use crate::errors::MailError;

/// One (recipient, subject, body) unit of work.
///
/// Immutable once created and carries no identifier; after submission it is
/// not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationJob {
    /// Delivery address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl NotificationJob {
    /// Build a job from its three resolved parts.
    #[must_use]
    pub fn new(recipient: String, subject: String, body: String) -> Self {
        Self {
            recipient,
            subject,
            body,
        }
    }
}

/// Mail delivery boundary.
///
/// Implementations are called concurrently by multiple dispatcher workers
/// and must be safe for that. Not implemented against a real server in this
/// crate; `aula-test-utils` provides a recording stub.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    /// Attempt delivery of one message.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
