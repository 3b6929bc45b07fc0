use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{JobDraft, JobId, JobRecord, ValidationErrors};
use super::filter::{filter_jobs, FilterSpec};
use super::mirror::SnapshotMirror;
use super::repository::{JobRepository, RepositoryError};
use super::stats::{summarize, StatisticsSummary};

/// Where the current snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    Empty,
    Repository,
    Mirror,
}

struct Snapshot {
    jobs: Arc<Vec<JobRecord>>,
    origin: SnapshotOrigin,
}

/// Holds the current job snapshot and keeps it in step with the repository.
///
/// Every successful create, update, or delete is followed by a full re-fetch of the
/// collection; the snapshot is never patched locally. Readers get a cheap `Arc` clone and feed
/// it to [`filter_jobs`] or [`summarize`].
pub struct JobStore<R> {
    repository: Arc<R>,
    mirror: Option<SnapshotMirror>,
    snapshot: RwLock<Snapshot>,
}

impl<R> JobStore<R>
where
    R: JobRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            mirror: None,
            snapshot: RwLock::new(Snapshot {
                jobs: Arc::new(Vec::new()),
                origin: SnapshotOrigin::Empty,
            }),
        }
    }

    /// Mirror each fetched snapshot to disk and fall back to it when the first fetch fails.
    pub fn with_mirror(mut self, mirror: SnapshotMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn snapshot(&self) -> Arc<Vec<JobRecord>> {
        self.read_snapshot().jobs.clone()
    }

    pub fn origin(&self) -> SnapshotOrigin {
        self.read_snapshot().origin
    }

    /// Re-fetches the collection. On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<Vec<JobRecord>>, StoreError> {
        match self.repository.list().await {
            Ok(jobs) => {
                if let Some(mirror) = &self.mirror {
                    if let Err(err) = mirror.save(&jobs) {
                        warn!(%err, "could not mirror job snapshot");
                    }
                }
                let jobs = Arc::new(jobs);
                self.replace_snapshot(jobs.clone(), SnapshotOrigin::Repository);
                debug!(count = jobs.len(), "job snapshot refreshed");
                Ok(jobs)
            }
            Err(err) => {
                warn!(%err, "job snapshot refresh failed");
                if self.origin() == SnapshotOrigin::Empty {
                    self.restore_from_mirror();
                }
                Err(err.into())
            }
        }
    }

    pub async fn add(&self, draft: JobDraft) -> Result<(), StoreError> {
        draft.validate()?;
        self.repository.create(draft, Utc::now()).await?;
        info!("job application added");
        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn update(&self, mut record: JobRecord) -> Result<(), StoreError> {
        record.to_draft().validate()?;
        record.last_updated = Some(Utc::now());
        let id = record.id.clone();
        self.repository.replace(record).await?;
        info!(%id, "job application updated");
        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn delete(&self, id: &JobId) -> Result<(), StoreError> {
        self.repository.delete(id).await?;
        info!(%id, "job application deleted");
        self.refresh_after_write().await;
        Ok(())
    }

    /// Reads a single record straight from the repository.
    pub async fn get(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.repository.fetch(id).await?)
    }

    pub fn query(&self, spec: &FilterSpec) -> Vec<JobRecord> {
        filter_jobs(&self.snapshot(), spec)
    }

    pub fn statistics(&self) -> StatisticsSummary {
        summarize(&self.snapshot())
    }

    // The write already succeeded; a failed re-fetch only leaves the snapshot stale.
    async fn refresh_after_write(&self) {
        if let Err(err) = self.refresh().await {
            warn!(%err, "snapshot left stale after write");
        }
    }

    fn restore_from_mirror(&self) {
        let Some(mirror) = &self.mirror else {
            return;
        };

        match mirror.load() {
            Ok(Some(jobs)) => {
                info!(count = jobs.len(), path = %mirror.path().display(), "serving mirrored job snapshot");
                self.replace_snapshot(Arc::new(jobs), SnapshotOrigin::Mirror);
            }
            Ok(None) => {}
            Err(err) => warn!(%err, "could not read job snapshot mirror"),
        }
    }

    fn replace_snapshot(&self, jobs: Arc<Vec<JobRecord>>, origin: SnapshotOrigin) {
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Snapshot { jobs, origin };
    }

    // The snapshot is swapped in one assignment, so a poisoned lock still guards a whole value.
    fn read_snapshot(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
