//! Shared test doubles for the Aula workspace.
//!
//! These implement the collaborator boundaries (`MailTransport`,
//! `RosterResolver`, `LiveSessionRepository`) with scripted behavior and
//! call recording, so unit and integration tests can observe exactly what
//! the core submitted, persisted, or deleted.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use aula_service::errors::{AulaError, MailError, RosterError};
use aula_service::models::{LiveSession, Recipient};
use aula_service::notify::MailTransport;
use aula_service::repositories::LiveSessionRepository;
use aula_service::roster::RosterResolver;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// One delivery attempt observed by [`RecordingMailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail transport that records every attempt and fails for scripted
/// recipients. Safe for concurrent use by multiple dispatcher workers.
#[derive(Default)]
pub struct RecordingMailTransport {
    attempts: Mutex<Vec<DeliveryAttempt>>,
    fail_for: Mutex<Vec<String>>,
}

impl RecordingMailTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for every delivery to `recipient`.
    pub fn fail_for(&self, recipient: &str) {
        self.fail_for.lock().unwrap().push(recipient.to_string());
    }

    /// All attempts so far, successful or not, in arrival order.
    pub fn attempts(&self) -> Vec<DeliveryAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// Recipients whose delivery attempt succeeded.
    pub fn delivered_to(&self) -> Vec<String> {
        let failing = self.fail_for.lock().unwrap().clone();
        self.attempts()
            .into_iter()
            .map(|a| a.to)
            .filter(|to| !failing.contains(to))
            .collect()
    }
}

#[async_trait::async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.attempts.lock().unwrap().push(DeliveryAttempt {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        if self.fail_for.lock().unwrap().iter().any(|r| r == to) {
            return Err(MailError {
                recipient: to.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Roster resolver returning a fixed membership per class.
#[derive(Default)]
pub struct StaticRoster {
    classes: Mutex<HashMap<i64, Vec<Recipient>>>,
}

impl StaticRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the membership of a class.
    pub fn set_members(&self, class_id: i64, members: Vec<Recipient>) {
        self.classes.lock().unwrap().insert(class_id, members);
    }

    /// Convenience: a class of `n` students named `Student k`.
    pub fn with_class_of(class_id: i64, n: usize) -> Self {
        let roster = Self::new();
        roster.set_members(
            class_id,
            (0..n)
                .map(|k| Recipient {
                    name: format!("Student {k}"),
                    email: format!("student{k}@example.edu"),
                })
                .collect(),
        );
        roster
    }
}

#[async_trait::async_trait]
impl RosterResolver for StaticRoster {
    async fn members_of(&self, class_id: i64) -> Result<Vec<Recipient>, RosterError> {
        self.classes
            .lock()
            .unwrap()
            .get(&class_id)
            .cloned()
            .ok_or_else(|| RosterError {
                class_id,
                reason: "class not registered".to_string(),
            })
    }
}

/// In-memory live session repository with a fail-next-write switch for
/// exercising the coordinator's compensation path.
#[derive(Default)]
pub struct InMemoryLiveSessionRepository {
    sessions: Mutex<HashMap<i64, LiveSession>>,
    next_id: AtomicUsize,
    fail_next_write: AtomicBool,
}

impl InMemoryLiveSessionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            fail_next_write: AtomicBool::new(false),
        }
    }

    /// Make the next write (insert, update, or delete) fail with a repository error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing the coordinator.
    pub fn seed(&self, session: LiveSession) {
        self.sessions.lock().unwrap().insert(session.id, session);
    }

    /// Snapshot of a stored record.
    pub fn get(&self, id: i64) -> Option<LiveSession> {
        self.sessions.lock().unwrap().get(&id).cloned()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_failure(&self) -> bool {
        self.fail_next_write.swap(false, Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LiveSessionRepository for InMemoryLiveSessionRepository {
    async fn insert(&self, mut session: LiveSession) -> Result<LiveSession, AulaError> {
        if self.take_failure() {
            return Err(AulaError::Repository("scripted insert failure".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        session.id = id;
        session.created_at = Some(chrono::Utc::now());
        session.updated_at = session.created_at;
        self.sessions.lock().unwrap().insert(id, session.clone());
        Ok(session)
    }

    async fn update(&self, mut session: LiveSession) -> Result<LiveSession, AulaError> {
        if self.take_failure() {
            return Err(AulaError::Repository("scripted update failure".to_string()));
        }

        let mut sessions = self.sessions.lock().unwrap();
        if !sessions.contains_key(&session.id) {
            return Err(AulaError::Repository(format!(
                "No live session with id {}",
                session.id
            )));
        }
        session.updated_at = Some(chrono::Utc::now());
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete(&self, id: i64) -> Result<(), AulaError> {
        if self.take_failure() {
            return Err(AulaError::Repository("scripted delete failure".to_string()));
        }

        self.sessions.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Option<LiveSession>, AulaError> {
        Ok(self.sessions.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_professor(&self, professor_id: i64) -> Result<Vec<LiveSession>, AulaError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.professor_id == professor_id)
            .cloned()
            .collect())
    }
}
