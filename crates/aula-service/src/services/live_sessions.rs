//! Session lifecycle coordination.
//!
//! Keeps a locally persisted [`LiveSession`] consistent with its remote
//! meeting. Ordering is deliberate and uniform: the remote resource is
//! mutated first, the local record second, so local success is never
//! claimed while the remote system disagrees. The inverse window (remote
//! succeeded, local write failed) is handled with a compensating delete on
//! the create path and logged as a divergence on the update path.
//!
//! Only the post-commit notification fan-out is asynchronous; the three
//! mutating operations block their caller until both systems have answered.

use crate::errors::AulaError;
use crate::models::{LiveSession, RemoteMeetingHandle};
use crate::notify::Notifier;
use crate::repositories::LiveSessionRepository;
use crate::roster::RosterResolver;
use crate::services::meet_client::MeetApi;
use crate::services::publish;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Coordinates remote meeting CRUD with local persistence and fan-out.
pub struct LiveSessionService {
    meet: Arc<dyn MeetApi>,
    repo: Arc<dyn LiveSessionRepository>,
    roster: Arc<dyn RosterResolver>,
    notifier: Arc<Notifier>,
}

impl LiveSessionService {
    /// Wire the coordinator to its collaborators. The `Notifier` is the
    /// process-wide dispatcher shared with the other trigger sites.
    #[must_use]
    pub fn new(
        meet: Arc<dyn MeetApi>,
        repo: Arc<dyn LiveSessionRepository>,
        roster: Arc<dyn RosterResolver>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            meet,
            repo,
            roster,
            notifier,
        }
    }

    /// Schedule a new live session.
    ///
    /// Creates the remote meeting first; only on success is a local record
    /// written, with the meeting id and join URL attached together. The
    /// class roster is then notified through the shared dispatcher.
    ///
    /// If the local insert fails after the remote create succeeded, the
    /// just-created remote meeting is deleted best-effort so no orphan is
    /// left behind, and the persistence error is surfaced.
    ///
    /// # Errors
    ///
    /// - `AulaError::Validation` if the subject is empty
    /// - `AulaError::Credential` / `AulaError::RemoteResource` from the
    ///   remote create; no local record exists in that case
    /// - `AulaError::Repository` if the local insert fails
    #[instrument(skip_all, fields(class_id = class_id, professor_id = professor_id))]
    pub async fn create(
        &self,
        subject: &str,
        start: DateTime<Utc>,
        professor_id: i64,
        class_id: i64,
    ) -> Result<LiveSession, AulaError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(AulaError::Validation(
                "Subject and start time are required".to_string(),
            ));
        }

        let handle = self.meet.create_meeting(subject, start).await?;

        let mut session = LiveSession::new(subject.to_string(), start, professor_id, class_id);
        session.attach_meeting(handle.clone());

        let session = match self.repo.insert(session).await {
            Ok(session) => session,
            Err(e) => {
                self.compensate_orphaned_meeting(&handle, &e).await;
                return Err(e);
            }
        };

        info!(
            target: "aula.live_sessions",
            session_id = session.id,
            meeting_id = ?session.meeting_id,
            "Live session created"
        );

        // The session is committed on both sides; roster trouble only costs
        // notifications, never the operation.
        match publish::notify_live_session_scheduled(
            self.roster.as_ref(),
            &self.notifier,
            &session,
        )
        .await
        {
            Ok(jobs) => {
                info!(
                    target: "aula.live_sessions",
                    session_id = session.id,
                    jobs,
                    "Roster notified of new live session"
                );
            }
            Err(e) => {
                warn!(
                    target: "aula.live_sessions",
                    session_id = session.id,
                    error = %e,
                    "Roster resolution failed, skipping notifications"
                );
            }
        }

        Ok(session)
    }

    /// Reschedule or retitle an existing session.
    ///
    /// The remote meeting is patched first; if that fails the local record
    /// is left byte-for-byte unchanged. A local save failure after a
    /// successful remote patch leaves the two systems disagreeing; that
    /// divergence is logged at error level and the save failure surfaced.
    ///
    /// # Errors
    ///
    /// - `AulaError::NotFound` if no record exists for `id`
    /// - `AulaError::Validation` for an empty subject
    /// - `AulaError::RemoteResource` / `AulaError::Credential` from the
    ///   remote patch
    /// - `AulaError::Repository` if the local save fails
    #[instrument(skip_all, fields(id = id))]
    pub async fn update(
        &self,
        id: i64,
        subject: &str,
        start: DateTime<Utc>,
    ) -> Result<LiveSession, AulaError> {
        let existing = self
            .repo
            .find(id)
            .await?
            .ok_or_else(|| AulaError::NotFound(format!("Live session {id}")))?;

        let subject = subject.trim();
        if subject.is_empty() {
            return Err(AulaError::Validation(
                "Subject and start time are required".to_string(),
            ));
        }

        match existing.meeting_id {
            Some(meeting_id) => {
                self.meet.update_meeting(meeting_id, subject, start).await?;
            }
            None => {
                // Record predates remote mirroring; nothing to patch.
                warn!(
                    target: "aula.live_sessions",
                    session_id = id,
                    "No remote meeting associated with live session, updating locally only"
                );
            }
        }

        let mut updated = existing;
        updated.subject = subject.to_string();
        updated.start_time = start;

        match self.repo.update(updated).await {
            Ok(session) => {
                info!(
                    target: "aula.live_sessions",
                    session_id = session.id,
                    "Live session updated"
                );
                Ok(session)
            }
            Err(e) => {
                error!(
                    target: "aula.live_sessions",
                    session_id = id,
                    error = %e,
                    "Remote meeting updated but local save failed; systems diverge"
                );
                Err(e)
            }
        }
    }

    /// Remove a session locally and remotely.
    ///
    /// The remote delete goes first; if it fails the local record is
    /// retained unchanged.
    ///
    /// # Errors
    ///
    /// - `AulaError::NotFound` if no record exists for `id`
    /// - `AulaError::RemoteResource` / `AulaError::Credential` from the
    ///   remote delete
    /// - `AulaError::Repository` if the local delete fails
    #[instrument(skip_all, fields(id = id))]
    pub async fn delete(&self, id: i64) -> Result<(), AulaError> {
        let existing = self
            .repo
            .find(id)
            .await?
            .ok_or_else(|| AulaError::NotFound(format!("Live session {id}")))?;

        match existing.meeting_id {
            Some(meeting_id) => {
                self.meet.delete_meeting(meeting_id).await?;
            }
            None => {
                warn!(
                    target: "aula.live_sessions",
                    session_id = id,
                    "No remote meeting associated with live session, deleting locally only"
                );
            }
        }

        self.repo.delete(id).await?;

        info!(target: "aula.live_sessions", session_id = id, "Live session deleted");
        Ok(())
    }

    /// Look up a session by identifier. No remote traffic.
    pub async fn find(&self, id: i64) -> Result<Option<LiveSession>, AulaError> {
        self.repo.find(id).await
    }

    /// All sessions owned by a professor. No remote traffic.
    pub async fn list_for_professor(
        &self,
        professor_id: i64,
    ) -> Result<Vec<LiveSession>, AulaError> {
        self.repo.find_by_professor(professor_id).await
    }

    /// Best-effort delete of a remote meeting whose local insert failed.
    ///
    /// A compensation failure is logged and swallowed; the caller surfaces
    /// the original persistence error either way.
    async fn compensate_orphaned_meeting(&self, handle: &RemoteMeetingHandle, cause: &AulaError) {
        error!(
            target: "aula.live_sessions",
            meeting_id = handle.meeting_id,
            error = %cause,
            "Local insert failed after remote create, deleting remote meeting"
        );

        match self.meet.delete_meeting(handle.meeting_id).await {
            Ok(()) => {
                info!(
                    target: "aula.live_sessions",
                    meeting_id = handle.meeting_id,
                    "Compensating delete succeeded, no orphaned remote meeting"
                );
            }
            Err(e) => {
                error!(
                    target: "aula.live_sessions",
                    meeting_id = handle.meeting_id,
                    error = %e,
                    "Compensating delete failed, remote meeting orphaned"
                );
            }
        }
    }
}
