use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::jobs::domain::{JobDraft, JobId, JobRecord, JobStatus};
use crate::jobs::repository::{InMemoryJobRepository, JobRepository, RepositoryError};
use crate::jobs::store::JobStore;

pub(super) fn record(
    id: &str,
    title: &str,
    company: &str,
    date: Option<&str>,
    status: JobStatus,
) -> JobRecord {
    JobRecord {
        id: JobId::from(id),
        job_title: title.to_string(),
        company: company.to_string(),
        application_date: date.map(str::to_string),
        status,
        job_link: None,
        notes: String::new(),
        last_updated: None,
        interviews: Vec::new(),
    }
}

pub(super) fn acme() -> JobRecord {
    record(
        "acme",
        "Engineer",
        "Acme",
        Some("2024-01-10"),
        JobStatus::Applied,
    )
}

pub(super) fn beta() -> JobRecord {
    record(
        "beta",
        "Analyst",
        "Beta",
        Some("2024-02-05"),
        JobStatus::Rejected,
    )
}

pub(super) fn two_record_collection() -> Vec<JobRecord> {
    vec![acme(), beta()]
}

/// Larger mixed collection: duplicate companies, notes, and one record without a usable date.
pub(super) fn pipeline() -> Vec<JobRecord> {
    let mut notes = record(
        "c",
        "Platform Engineer",
        "Cobalt",
        Some("2024-03-01"),
        JobStatus::InterviewScheduled,
    );
    notes.notes = "Recruiter mentioned ACME alumni on the team".to_string();

    vec![
        acme(),
        beta(),
        notes,
        record(
            "d",
            "Data Engineer",
            "acme",
            Some("2024-01-22T15:30:00Z"),
            JobStatus::OfferReceived,
        ),
        record("e", "Designer", "Delta", Some("soon"), JobStatus::Applied),
        record("f", "Support Lead", "Echo", None, JobStatus::Rejected),
    ]
}

pub(super) fn ids(jobs: &[JobRecord]) -> Vec<&str> {
    jobs.iter().map(|job| job.id.0.as_str()).collect()
}

pub(super) fn draft(title: &str, company: &str) -> JobDraft {
    JobDraft::new(
        title,
        company,
        NaiveDate::from_ymd_opt(2024, 4, 2).expect("valid date"),
    )
}

pub(super) fn store_with(jobs: Vec<JobRecord>) -> (JobStore<CountingRepository>, CountingRepository) {
    let repository = CountingRepository::with_records(jobs);
    let store = JobStore::new(Arc::new(repository.clone()));
    (store, repository)
}

/// In-memory repository that counts full-collection fetches.
#[derive(Default, Clone)]
pub(super) struct CountingRepository {
    inner: InMemoryJobRepository,
    lists: Arc<AtomicUsize>,
}

impl CountingRepository {
    pub(super) fn with_records(jobs: Vec<JobRecord>) -> Self {
        Self {
            inner: InMemoryJobRepository::with_records(jobs),
            lists: Arc::default(),
        }
    }

    pub(super) fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub(super) fn records(&self) -> Vec<JobRecord> {
        self.inner.records()
    }
}

impl JobRepository for CountingRepository {
    async fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list().await
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        self.inner.fetch(id).await
    }

    async fn create(
        &self,
        draft: JobDraft,
        last_updated: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.create(draft, last_updated).await
    }

    async fn replace(&self, record: JobRecord) -> Result<(), RepositoryError> {
        self.inner.replace(record).await
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        self.inner.delete(id).await
    }
}

/// Repository whose every call fails as if the remote service were down.
#[derive(Default, Clone)]
pub(super) struct UnavailableRepository;

impl JobRepository for UnavailableRepository {
    async fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        Err(unavailable())
    }

    async fn fetch(&self, _id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        Err(unavailable())
    }

    async fn create(
        &self,
        _draft: JobDraft,
        _last_updated: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    async fn replace(&self, _record: JobRecord) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &JobId) -> Result<(), RepositoryError> {
        Err(unavailable())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_string())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
