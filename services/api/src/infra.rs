use chrono::NaiveDate;
use jobtrack::config::AppConfig;
use jobtrack::error::AppError;
use jobtrack::jobs::{JobStatus, JobStore, SnapshotMirror};
use jobtrack::remote::{ApiClient, ApiError, SessionFile};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wiring shared by every command: configuration plus the session and mirror files it names.
pub(crate) struct Context {
    pub(crate) config: AppConfig,
    pub(crate) offline: bool,
}

impl Context {
    pub(crate) fn new(config: AppConfig, offline: bool) -> Self {
        Self { config, offline }
    }

    pub(crate) fn session(&self) -> SessionFile {
        SessionFile::new(&self.config.storage.session_path)
    }

    pub(crate) fn mirror(&self) -> SnapshotMirror {
        SnapshotMirror::new(&self.config.storage.mirror_path)
    }

    /// Client without credentials, for the sign-in and sign-up endpoints.
    pub(crate) fn anonymous_client(&self) -> Result<ApiClient, AppError> {
        Ok(ApiClient::new(
            &self.config.api.base_url,
            self.config.api.timeout,
        )?)
    }

    /// Client carrying the configured token, or the one saved by `login`.
    pub(crate) fn client(&self) -> Result<ApiClient, AppError> {
        let token = match &self.config.api.token {
            Some(token) => token.clone(),
            None => self.session().load()?.ok_or(ApiError::NotSignedIn)?,
        };
        Ok(self.anonymous_client()?.with_token(token))
    }

    pub(crate) fn store(&self) -> Result<JobStore<ApiClient>, AppError> {
        if self.offline {
            return Err(AppError::Usage(
                "offline mode only reads the mirrored snapshot; drop --offline to make changes"
                    .to_string(),
            ));
        }
        Ok(JobStore::new(Arc::new(self.client()?)).with_mirror(self.mirror()))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_status(raw: &str) -> Result<JobStatus, String> {
    raw.parse().map_err(|err| format!("{err}"))
}
