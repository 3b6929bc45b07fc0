//! Job application tracking.
//!
//! The [`jobs`] module holds the record model and the pure filter/sort and statistics engines,
//! together with the collection store that keeps the current snapshot in sync with a
//! [`jobs::JobRepository`]. The [`remote`] module talks to the job-storage REST API.

pub mod config;
pub mod error;
pub mod jobs;
pub mod remote;
pub mod telemetry;
