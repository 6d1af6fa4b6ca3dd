//! Class roster resolution boundary.

use crate::errors::RosterError;
use crate::models::Recipient;

/// Resolves the current membership of a class.
///
/// Fan-out snapshots the roster once at submission time; later membership
/// changes do not affect jobs already built.
#[async_trait::async_trait]
pub trait RosterResolver: Send + Sync {
    /// Members of the class with the given identifier.
    async fn members_of(&self, class_id: i64) -> Result<Vec<Recipient>, RosterError>;
}
