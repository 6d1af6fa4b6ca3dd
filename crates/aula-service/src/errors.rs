//! Error types for the Aula core.

use thiserror::Error;

/// Errors surfaced to callers of the session lifecycle operations.
///
/// Mail delivery failures are deliberately absent: they are consumed inside
/// the dispatcher's workers (see [`crate::notify`]) and never reach the
/// caller of a triggering operation.
#[derive(Debug, Error)]
pub enum AulaError {
    /// Missing or malformed input, checked before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identity endpoint failure (unreachable, non-2xx, or malformed
    /// response).
    #[error("Credential error: {0}")]
    Credential(String),

    /// Meeting endpoint failure, or a 2xx response violating the wire
    /// contract.
    #[error("Remote resource error: {0}")]
    RemoteResource(String),

    /// Local record missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence boundary failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Per-message failure reported by a [`crate::notify::MailTransport`].
///
/// Caught and logged inside a dispatcher worker; never propagated.
#[derive(Debug, Error)]
#[error("Mail delivery failed for {recipient}: {reason}")]
pub struct MailError {
    /// Address the delivery was attempted to.
    pub recipient: String,
    /// Transport-specific failure description.
    pub reason: String,
}

/// Roster resolution failure.
#[derive(Debug, Error)]
#[error("Roster resolution failed for class {class_id}: {reason}")]
pub struct RosterError {
    /// Class whose membership could not be resolved.
    pub class_id: i64,
    /// Resolver-specific failure description.
    pub reason: String,
}

/// Result type alias using [`AulaError`].
pub type Result<T> = std::result::Result<T, AulaError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AulaError::Validation("subject is required".to_string());
        assert!(err.to_string().contains("subject is required"));

        let err = AulaError::Credential("no access token in response".to_string());
        assert!(err.to_string().contains("no access token"));

        let err = AulaError::RemoteResource("status 500".to_string());
        assert!(err.to_string().contains("status 500"));

        let err = AulaError::NotFound("live session 7".to_string());
        assert!(err.to_string().contains("live session 7"));

        let err = AulaError::Repository("insert failed".to_string());
        assert!(err.to_string().contains("insert failed"));
    }

    #[test]
    fn test_mail_error_names_recipient() {
        let err = MailError {
            recipient: "student@example.edu".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("student@example.edu"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_roster_error_names_class() {
        let err = RosterError {
            class_id: 42,
            reason: "backend unavailable".to_string(),
        };
        assert!(err.to_string().contains("42"));
    }
}
