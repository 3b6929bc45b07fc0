//! Job application tracking: the record model, the dashboard filter/sort engine, statistics,
//! and the store that keeps a snapshot of the collection in step with the authoritative
//! repository.

pub mod domain;
pub mod export;
pub mod filter;
pub mod mirror;
pub mod repository;
pub mod router;
pub mod stats;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_instant, FieldError, Interview, InterviewKind, JobDraft, JobId, JobRecord, JobStatus,
    UnknownStatus, ValidationErrors,
};
pub use export::write_csv;
pub use filter::{
    filter_jobs, DateRange, FilterSpec, SortDirection, SortKey, StatusFilter, UnknownSortDirection,
    UnknownSortKey,
};
pub use mirror::{MirrorError, SnapshotMirror};
pub use repository::{InMemoryJobRepository, JobRepository, RepositoryError};
pub use router::{job_router, FilterQuery};
pub use stats::{summarize, MonthlyCount, StatisticsSummary, StatusShare};
pub use store::{JobStore, SnapshotOrigin, StoreError};
