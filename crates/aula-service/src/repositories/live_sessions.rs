//! Live session repository boundary.

use crate::errors::AulaError;
use crate::models::LiveSession;

/// CRUD over [`LiveSession`] records, keyed by identifier.
///
/// Implementations must be safe for concurrent use; the coordinator holds
/// one behind an `Arc`.
#[async_trait::async_trait]
pub trait LiveSessionRepository: Send + Sync {
    /// Persist a new record, returning it with its assigned identifier and
    /// audit timestamps populated.
    async fn insert(&self, session: LiveSession) -> Result<LiveSession, AulaError>;

    /// Persist changes to an existing record.
    async fn update(&self, session: LiveSession) -> Result<LiveSession, AulaError>;

    /// Remove the record with the given identifier.
    async fn delete(&self, id: i64) -> Result<(), AulaError>;

    /// Look up a record by identifier.
    async fn find(&self, id: i64) -> Result<Option<LiveSession>, AulaError>;

    /// All sessions owned by a professor.
    async fn find_by_professor(&self, professor_id: i64) -> Result<Vec<LiveSession>, AulaError>;
}
