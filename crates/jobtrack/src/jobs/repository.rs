use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::domain::{JobDraft, JobId, JobRecord};

/// Authoritative job storage. The remote API client is the production implementation.
pub trait JobRepository: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<JobRecord>, RepositoryError>> + Send;

    fn fetch(
        &self,
        id: &JobId,
    ) -> impl Future<Output = Result<Option<JobRecord>, RepositoryError>> + Send;

    fn create(
        &self,
        draft: JobDraft,
        last_updated: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Replaces every field of the record with the given id.
    fn replace(&self, record: JobRecord)
        -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn delete(&self, id: &JobId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local repository keeping records in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryJobRepository {
    records: Arc<Mutex<Vec<JobRecord>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryJobRepository {
    pub fn with_records(records: Vec<JobRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            sequence: Arc::default(),
        }
    }

    pub fn records(&self) -> Vec<JobRecord> {
        self.lock().clone()
    }

    // Every mutation is a single push, replace, or retain, so a poisoned vector is still whole.
    fn lock(&self) -> MutexGuard<'_, Vec<JobRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> JobId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        JobId(format!("job-{id:06}"))
    }
}

impl JobRepository for InMemoryJobRepository {
    async fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        Ok(self.records())
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        let guard = self.lock();
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    async fn create(
        &self,
        draft: JobDraft,
        last_updated: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let record = draft.into_record(self.next_id(), last_updated);
        self.lock().push(record);
        Ok(())
    }

    async fn replace(&self, record: JobRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock();
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut guard = self.lock();
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}
