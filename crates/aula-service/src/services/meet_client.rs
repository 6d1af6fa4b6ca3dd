//! HTTP client for the remote conferencing provider.
//!
//! Performs the client-credentials grant against the provider's identity
//! endpoint and the create/update/delete operations on the meetings
//! collection. Every resource operation fetches a fresh access token; no
//! token is cached or reused across calls, so an expired or revoked
//! credential can never be served stale.
//!
//! # Security
//!
//! - The client secret and fetched tokens are held as `SecretString`
//! - Request timeouts prevent hanging connections
//! - Error messages capture remote status and body, never credentials

use crate::config::MeetConfig;
use crate::errors::AulaError;
use crate::models::RemoteMeetingHandle;
use chrono::{DateTime, Utc};
use base64::{engine::general_purpose, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Meeting type for scheduled meetings in the provider API.
const MEETING_TYPE_SCHEDULED: u8 = 2;

/// Default meeting duration in minutes.
const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Timezone sent with every start time.
const MEETING_TIMEZONE: &str = "UTC";

/// Start-time pattern required by the provider API.
const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Remote meeting operations, as a trait so the coordinator can be tested
/// against a scripted implementation (see [`mock`]).
#[async_trait::async_trait]
pub trait MeetApi: Send + Sync {
    /// Create a scheduled meeting, returning its identity.
    async fn create_meeting(
        &self,
        subject: &str,
        start: DateTime<Utc>,
    ) -> Result<RemoteMeetingHandle, AulaError>;

    /// Partially update an existing meeting's topic and start time.
    async fn update_meeting(
        &self,
        meeting_id: i64,
        subject: &str,
        start: DateTime<Utc>,
    ) -> Result<(), AulaError>;

    /// Delete an existing meeting.
    async fn delete_meeting(&self, meeting_id: i64) -> Result<(), AulaError>;
}

#[derive(Serialize)]
struct MeetingSettings {
    host_video: bool,
    participant_video: bool,
    join_before_host: bool,
    auto_recording: &'static str,
}

impl MeetingSettings {
    fn default_block() -> Self {
        Self {
            host_video: true,
            participant_video: true,
            join_before_host: true,
            auto_recording: "none",
        }
    }
}

#[derive(Serialize)]
struct CreateMeetingRequest {
    topic: String,
    #[serde(rename = "type")]
    meeting_type: u8,
    start_time: String,
    timezone: &'static str,
    duration: u32,
    settings: MeetingSettings,
}

#[derive(Serialize)]
struct UpdateMeetingRequest {
    topic: String,
    start_time: String,
    timezone: &'static str,
}

/// Token response from the identity endpoint.
///
/// The token field is optional so its absence maps to a credential error
/// rather than a deserialization failure.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Creation response from the meetings endpoint.
///
/// Both fields optional for the same reason: a 2xx body missing either is a
/// protocol violation reported as a remote resource error.
#[derive(Deserialize)]
struct CreateMeetingResponse {
    id: Option<i64>,
    join_url: Option<String>,
}

/// reqwest-backed implementation of [`MeetApi`].
#[derive(Clone)]
pub struct MeetClient {
    client: reqwest::Client,
    config: MeetConfig,
}

impl MeetClient {
    /// Build the client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns `AulaError::RemoteResource` if the HTTP client cannot be
    /// built.
    pub fn new(config: MeetConfig) -> Result<Self, AulaError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                AulaError::RemoteResource(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Fetch a fresh access token via the account-credentials grant.
    ///
    /// # Errors
    ///
    /// `AulaError::Credential` if the endpoint is unreachable (DNS and
    /// connect failures are spelled out in the message), returns a non-2xx
    /// status (status and body captured), or answers 2xx without an
    /// `access_token` field.
    #[instrument(skip_all)]
    pub async fn get_access_token(&self) -> Result<SecretString, AulaError> {
        let url = format!("{}/oauth/token", self.config.oauth_base_url);
        let credentials = general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id,
            self.config.client_secret.expose_secret()
        ));

        debug!(
            target: "aula.meet_client",
            account_id = %self.config.account_id,
            "Requesting access token"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {credentials}"))
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.config.account_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "aula.meet_client", error = %e, "Identity endpoint unreachable");
                let kind = if e.is_connect() {
                    "connection failed (check DNS and network)"
                } else if e.is_timeout() {
                    "request timed out"
                } else {
                    "request failed"
                };
                AulaError::Credential(format!("Identity endpoint unreachable: {kind}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "aula.meet_client",
                status = %status,
                "Identity endpoint rejected token request"
            );
            return Err(AulaError::Credential(format!(
                "Identity endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AulaError::Credential(format!("Invalid token response: {e}"))
        })?;

        match token.access_token {
            Some(token) => {
                debug!(target: "aula.meet_client", "Access token acquired");
                Ok(SecretString::from(token))
            }
            None => {
                warn!(target: "aula.meet_client", "Token response missing access_token");
                Err(AulaError::Credential(
                    "No access token in identity endpoint response".to_string(),
                ))
            }
        }
    }

    fn format_start(start: DateTime<Utc>) -> String {
        start.format(START_TIME_FORMAT).to_string()
    }

    /// Map a transport-level failure on a meetings-endpoint call.
    fn transport_error(operation: &str, e: &reqwest::Error) -> AulaError {
        warn!(target: "aula.meet_client", error = %e, operation, "Meeting endpoint unreachable");
        AulaError::RemoteResource(format!("Failed to {operation}: {e}"))
    }

    /// Map a non-2xx meetings-endpoint response, capturing status and body.
    async fn status_error(operation: &str, response: reqwest::Response) -> AulaError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(
            target: "aula.meet_client",
            status = %status,
            operation,
            "Meeting endpoint returned error"
        );
        AulaError::RemoteResource(format!("Failed to {operation}: {status} - {body}"))
    }
}

#[async_trait::async_trait]
impl MeetApi for MeetClient {
    #[instrument(skip_all, fields(subject = %subject))]
    async fn create_meeting(
        &self,
        subject: &str,
        start: DateTime<Utc>,
    ) -> Result<RemoteMeetingHandle, AulaError> {
        let token = self.get_access_token().await?;
        let url = format!("{}/users/me/meetings", self.config.api_base_url);

        let request = CreateMeetingRequest {
            topic: subject.to_string(),
            meeting_type: MEETING_TYPE_SCHEDULED,
            start_time: Self::format_start(start),
            timezone: MEETING_TIMEZONE,
            duration: DEFAULT_DURATION_MINUTES,
            settings: MeetingSettings::default_block(),
        };

        debug!(target: "aula.meet_client", subject, "Creating remote meeting");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error("create meeting", &e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("create meeting", response).await);
        }

        let body: CreateMeetingResponse = response.json().await.map_err(|e| {
            AulaError::RemoteResource(format!("Invalid create meeting response: {e}"))
        })?;

        // A 2xx without both fields is a protocol violation, not a success.
        match (body.id, body.join_url) {
            (Some(meeting_id), Some(join_url)) => {
                debug!(
                    target: "aula.meet_client",
                    meeting_id,
                    "Remote meeting created"
                );
                Ok(RemoteMeetingHandle {
                    meeting_id,
                    join_url,
                })
            }
            _ => {
                warn!(
                    target: "aula.meet_client",
                    "Create meeting response missing id or join_url"
                );
                Err(AulaError::RemoteResource(
                    "Create meeting response missing id or join_url".to_string(),
                ))
            }
        }
    }

    #[instrument(skip_all, fields(meeting_id = meeting_id))]
    async fn update_meeting(
        &self,
        meeting_id: i64,
        subject: &str,
        start: DateTime<Utc>,
    ) -> Result<(), AulaError> {
        if meeting_id <= 0 {
            return Err(AulaError::Validation(format!(
                "Invalid meeting id: {meeting_id}"
            )));
        }
        if subject.trim().is_empty() {
            return Err(AulaError::Validation(
                "Meeting subject is required".to_string(),
            ));
        }

        let token = self.get_access_token().await?;
        let url = format!("{}/meetings/{meeting_id}", self.config.api_base_url);

        let request = UpdateMeetingRequest {
            topic: subject.to_string(),
            start_time: Self::format_start(start),
            timezone: MEETING_TIMEZONE,
        };

        debug!(target: "aula.meet_client", meeting_id, "Updating remote meeting");

        let response = self
            .client
            .patch(&url)
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error("update meeting", &e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("update meeting", response).await);
        }

        debug!(target: "aula.meet_client", meeting_id, "Remote meeting updated");
        Ok(())
    }

    #[instrument(skip_all, fields(meeting_id = meeting_id))]
    async fn delete_meeting(&self, meeting_id: i64) -> Result<(), AulaError> {
        if meeting_id <= 0 {
            return Err(AulaError::Validation(format!(
                "Invalid meeting id: {meeting_id}"
            )));
        }

        let token = self.get_access_token().await?;
        let url = format!("{}/meetings/{meeting_id}", self.config.api_base_url);

        debug!(target: "aula.meet_client", meeting_id, "Deleting remote meeting");

        let response = self
            .client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .send()
            .await
            .map_err(|e| Self::transport_error("delete meeting", &e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("delete meeting", response).await);
        }

        debug!(target: "aula.meet_client", meeting_id, "Remote meeting deleted");
        Ok(())
    }
}

/// Scripted [`MeetApi`] implementation for coordinator tests.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records calls and returns scripted outcomes.
    pub struct MockMeetClient {
        handle: RemoteMeetingHandle,
        create_error: Option<String>,
        update_error: Option<String>,
        delete_error: Option<String>,
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        deleted_ids: Mutex<Vec<i64>>,
    }

    impl MockMeetClient {
        /// Mock that accepts every operation, handing out `handle` on
        /// create.
        #[must_use]
        pub fn accepting(handle: RemoteMeetingHandle) -> Self {
            Self {
                handle,
                create_error: None,
                update_error: None,
                delete_error: None,
                create_calls: AtomicUsize::new(0),
                update_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
                deleted_ids: Mutex::new(Vec::new()),
            }
        }

        /// Fail creates with a remote resource error carrying `message`.
        #[must_use]
        pub fn with_create_error(mut self, message: &str) -> Self {
            self.create_error = Some(message.to_string());
            self
        }

        /// Fail updates with a remote resource error carrying `message`.
        #[must_use]
        pub fn with_update_error(mut self, message: &str) -> Self {
            self.update_error = Some(message.to_string());
            self
        }

        /// Fail deletes with a remote resource error carrying `message`.
        #[must_use]
        pub fn with_delete_error(mut self, message: &str) -> Self {
            self.delete_error = Some(message.to_string());
            self
        }

        /// Number of create calls observed.
        pub fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }

        /// Number of update calls observed.
        pub fn update_calls(&self) -> usize {
            self.update_calls.load(Ordering::SeqCst)
        }

        /// Number of delete calls observed.
        pub fn delete_calls(&self) -> usize {
            self.delete_calls.load(Ordering::SeqCst)
        }

        /// Meeting ids passed to delete, in call order.
        pub fn deleted_ids(&self) -> Vec<i64> {
            match self.deleted_ids.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            }
        }
    }

    #[async_trait::async_trait]
    impl MeetApi for MockMeetClient {
        async fn create_meeting(
            &self,
            _subject: &str,
            _start: DateTime<Utc>,
        ) -> Result<RemoteMeetingHandle, AulaError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            match &self.create_error {
                Some(message) => Err(AulaError::RemoteResource(message.clone())),
                None => Ok(self.handle.clone()),
            }
        }

        async fn update_meeting(
            &self,
            meeting_id: i64,
            subject: &str,
            _start: DateTime<Utc>,
        ) -> Result<(), AulaError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if meeting_id <= 0 {
                return Err(AulaError::Validation(format!(
                    "Invalid meeting id: {meeting_id}"
                )));
            }
            if subject.trim().is_empty() {
                return Err(AulaError::Validation(
                    "Meeting subject is required".to_string(),
                ));
            }
            match &self.update_error {
                Some(message) => Err(AulaError::RemoteResource(message.clone())),
                None => Ok(()),
            }
        }

        async fn delete_meeting(&self, meeting_id: i64) -> Result<(), AulaError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if meeting_id <= 0 {
                return Err(AulaError::Validation(format!(
                    "Invalid meeting id: {meeting_id}"
                )));
            }
            match &self.delete_error {
                Some(message) => Err(AulaError::RemoteResource(message.clone())),
                None => {
                    if let Ok(mut guard) = self.deleted_ids.lock() {
                        guard.push(meeting_id);
                    }
                    Ok(())
                }
            }
        }
    }
}
