//! Data models for the Aula core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The externally-assigned identity of a remote meeting.
///
/// Ephemeral: returned by the remote client and immediately folded into a
/// [`LiveSession`], never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMeetingHandle {
    /// Provider-assigned meeting identifier.
    pub meeting_id: i64,
    /// URL participants use to join.
    pub join_url: String,
}

/// A locally persisted live session record.
///
/// `meeting_id` and `join_url` are either both absent or both present.
/// They are only ever written together via [`LiveSession::attach_meeting`],
/// immediately after a successful remote create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSession {
    /// Local identifier (assigned by the persistence layer).
    pub id: i64,

    /// Session subject; never empty.
    pub subject: String,

    /// Scheduled start instant.
    pub start_time: DateTime<Utc>,

    /// Owning professor.
    pub professor_id: i64,

    /// Class whose roster is notified.
    pub class_id: i64,

    /// Provider meeting identifier; present only with `join_url`.
    pub meeting_id: Option<i64>,

    /// Join URL; present only with `meeting_id`.
    pub join_url: Option<String>,

    /// Set by the persistence layer, not by this core.
    pub created_at: Option<DateTime<Utc>>,

    /// Set by the persistence layer, not by this core.
    pub updated_at: Option<DateTime<Utc>>,
}

impl LiveSession {
    /// Create a session that has not yet been mirrored remotely.
    #[must_use]
    pub fn new(subject: String, start_time: DateTime<Utc>, professor_id: i64, class_id: i64) -> Self {
        Self {
            id: 0,
            subject,
            start_time,
            professor_id,
            class_id,
            meeting_id: None,
            join_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Attach the remote meeting identity, keeping the id/URL pair atomic.
    pub fn attach_meeting(&mut self, handle: RemoteMeetingHandle) {
        self.meeting_id = Some(handle.meeting_id);
        self.join_url = Some(handle.join_url);
    }

    /// Whether the record has a remote counterpart.
    #[must_use]
    pub fn has_remote_meeting(&self) -> bool {
        self.meeting_id.is_some() && self.join_url.is_some()
    }
}

/// One class member eligible for notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Display name used in the message greeting.
    pub name: String,
    /// Delivery address.
    pub email: String,
}

/// Summary of a published exercise, used only to build notification text.
#[derive(Debug, Clone)]
pub struct ExerciseSummary {
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub class_name: String,
    pub professor_name: String,
}

/// Summary of a posted announcement.
#[derive(Debug, Clone)]
pub struct AnnouncementSummary {
    pub title: String,
    pub description: String,
    pub content: String,
    pub professor_name: Option<String>,
}

/// Summary of a newly available quiz.
#[derive(Debug, Clone)]
pub struct QuizSummary {
    pub title: String,
}
