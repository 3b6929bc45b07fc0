//! Client for the remote job-tracking REST API, the authoritative store behind [`JobStore`].
//!
//! [`JobStore`]: crate::jobs::JobStore

mod session;

pub use session::{SessionError, SessionFile};

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::jobs::{Interview, JobDraft, JobId, JobRecord, JobRepository, JobStatus, RepositoryError};

/// Header carrying the session token on every job request.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MIN_PASSWORD_LEN: usize = 6;

/// Response wrapper used by every endpoint of the remote API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApplicationsPayload {
    #[serde(default)]
    applications: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    token: String,
}

/// Body of create and update requests. The record id travels in the path, never in the body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobPayload<'a> {
    job_title: &'a str,
    company: &'a str,
    application_date: &'a str,
    status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_link: Option<&'a str>,
    notes: &'a str,
    last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "<[Interview]>::is_empty")]
    interviews: &'a [Interview],
}

impl<'a> JobPayload<'a> {
    fn from_draft(draft: &'a JobDraft, last_updated: DateTime<Utc>) -> Self {
        Self {
            job_title: &draft.job_title,
            company: &draft.company,
            application_date: &draft.application_date,
            status: draft.status,
            job_link: draft.job_link.as_deref().filter(|link| !link.trim().is_empty()),
            notes: &draft.notes,
            last_updated,
            interviews: &draft.interviews,
        }
    }

    fn from_record(record: &'a JobRecord, last_updated: DateTime<Utc>) -> Self {
        Self {
            job_title: &record.job_title,
            company: &record.company,
            application_date: record.application_date.as_deref().unwrap_or_default(),
            status: record.status,
            job_link: record.job_link.as_deref(),
            notes: &record.notes,
            last_updated,
            interviews: &record.interviews,
        }
    }
}

#[derive(Debug, Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Account details collected by the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ApiError::InvalidSignUp(
                "Username and email are required".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(ApiError::InvalidSignUp("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::InvalidSignUp(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("not signed in; run `jobtrack login` first")]
    NotSignedIn,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("No response from server. Please check your network connection.")]
    NoResponse(#[source] reqwest::Error),
    #[error("unexpected response from server: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    InvalidSignUp(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ApiError> for RepositoryError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status { status: 404, .. } => RepositoryError::NotFound,
            ApiError::Status {
                status: 401 | 403,
                message,
            } => RepositoryError::Unauthorized(message),
            ApiError::Status {
                status: 400,
                message,
            }
            | ApiError::Rejected(message) => RepositoryError::Rejected(message),
            err @ ApiError::NotSignedIn => RepositoryError::Unauthorized(err.to_string()),
            other => RepositoryError::Unavailable(other.to_string()),
        }
    }
}

/// Human-readable message for a failed HTTP status, preferring the server's own message where
/// the status allows it.
pub fn status_message(status: StatusCode, server_message: Option<&str>) -> String {
    let server_message = server_message.filter(|message| !message.trim().is_empty());
    match status.as_u16() {
        400 => server_message
            .unwrap_or("Bad request. Please check your input.")
            .to_string(),
        401 => "Unauthorized. Please log in again.".to_string(),
        403 => "Forbidden. You do not have permission to access this resource.".to_string(),
        404 => server_message.unwrap_or("Resource not found.").to_string(),
        500 => "Internal server error. Please try again later.".to_string(),
        _ => server_message
            .unwrap_or("An unexpected error occurred. Please try again.")
            .to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: parsed,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>, ApiError> {
        let request = self.client.get(self.endpoint(&["jobs"]));
        let envelope: Envelope<ApplicationsPayload> = self.send(request, true).await?;

        if !envelope.success {
            warn!(message = ?envelope.message, "job list request was not successful");
            return Ok(Vec::new());
        }
        let jobs: Vec<JobRecord> = envelope
            .data
            .map(|payload| payload.applications)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(job) => Some(job),
                Err(err) => {
                    warn!(%err, "skipping job application that could not be decoded");
                    None
                }
            })
            .collect();
        debug!(count = jobs.len(), "fetched job applications");
        Ok(jobs)
    }

    /// Fetches one application; a 404 or an unsuccessful envelope yields `None`.
    pub async fn get_job(&self, id: &JobId) -> Result<Option<JobRecord>, ApiError> {
        let request = self.client.get(self.endpoint(&["jobs", &id.0]));
        match self.send::<JobRecord>(request, true).await {
            Ok(envelope) if envelope.success => Ok(envelope.data),
            Ok(_) => Ok(None),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn create_job(
        &self,
        draft: &JobDraft,
        last_updated: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.endpoint(&["jobs"]))
            .json(&JobPayload::from_draft(draft, last_updated));
        let envelope: Envelope<serde_json::Value> = self.send(request, true).await?;
        expect_success(envelope, "Failed to add job application")
    }

    pub async fn update_job(
        &self,
        record: &JobRecord,
        last_updated: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.endpoint(&["jobs", &record.id.0]))
            .json(&JobPayload::from_record(record, last_updated));
        let envelope: Envelope<serde_json::Value> = self.send(request, true).await?;
        expect_success(envelope, "Failed to update job application")
    }

    pub async fn delete_job(&self, id: &JobId) -> Result<(), ApiError> {
        let request = self.client.delete(self.endpoint(&["jobs", &id.0]));
        let envelope: Envelope<serde_json::Value> = self.send(request, true).await?;
        expect_success(envelope, "Failed to delete job application")
    }

    /// Exchanges credentials for a session token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.endpoint(&["users", "signin"]))
            .json(&SignInBody { email, password });
        let envelope: Envelope<TokenPayload> = self.send(request, false).await?;

        match envelope.data {
            Some(payload) if envelope.success => Ok(payload.token),
            _ => Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Login failed".to_string()),
            )),
        }
    }

    /// Creates an account. The request is checked locally before anything is sent.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ApiError> {
        request.validate()?;
        let builder = self
            .client
            .post(self.endpoint(&["users", "signup"]))
            .json(request);
        let envelope: Envelope<serde_json::Value> = self.send(builder, false).await?;
        expect_success(envelope, "Signup failed")
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        authenticated: bool,
    ) -> Result<Envelope<T>, ApiError> {
        let request = if authenticated {
            let token = self.token.as_deref().ok_or(ApiError::NotSignedIn)?;
            request.header(ACCESS_TOKEN_HEADER, token)
        } else {
            request
        };

        let response = request.send().await.map_err(ApiError::NoResponse)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Envelope<serde_json::Value>>().await.ok();
            let message = status_message(status, body.as_ref().and_then(|b| b.message.as_deref()));
            warn!(status = status.as_u16(), %message, "remote API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<Envelope<T>>().await.map_err(ApiError::Decode)
    }
}

fn expect_success<T>(envelope: Envelope<T>, fallback: &str) -> Result<(), ApiError> {
    if envelope.success {
        Ok(())
    } else {
        Err(ApiError::Rejected(
            envelope.message.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

impl JobRepository for ApiClient {
    async fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        Ok(self.list_jobs().await?)
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        Ok(self.get_job(id).await?)
    }

    async fn create(
        &self,
        draft: JobDraft,
        last_updated: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Ok(self.create_job(&draft, last_updated).await?)
    }

    async fn replace(&self, record: JobRecord) -> Result<(), RepositoryError> {
        let last_updated = record.last_updated.unwrap_or_else(Utc::now);
        Ok(self.update_job(&record, last_updated).await?)
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        Ok(self.delete_job(id).await?)
    }
}
