use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{JobDraft, JobId, JobRecord};
use super::filter::FilterSpec;
use super::repository::{JobRepository, RepositoryError};
use super::stats::{MonthlyCount, StatusShare};
use super::store::{JobStore, SnapshotOrigin, StoreError};

/// Query-string form of a [`FilterSpec`]; absent parameters fall back to the dashboard defaults.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl FilterQuery {
    pub fn into_spec(self) -> Result<FilterSpec, String> {
        let mut spec = FilterSpec::default();

        if let Some(status) = self.status {
            spec.status = status.parse().map_err(|err| format!("{err}"))?;
        }
        if let Some(search) = self.search {
            spec.search_term = search;
        }
        if let Some(sort_by) = self.sort_by {
            spec.sort_by = sort_by.parse().map_err(|err| format!("{err}"))?;
        }
        if let Some(direction) = self.sort_direction {
            spec.sort_direction = direction.parse().map_err(|err| format!("{err}"))?;
        }
        if self.start.is_some() || self.end.is_some() {
            spec = spec.with_date_range(
                self.start.unwrap_or_default(),
                self.end.unwrap_or_default(),
            );
        }

        Ok(spec)
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub total: usize,
    pub matched: usize,
    pub filter_active: bool,
    pub origin: SnapshotOrigin,
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: usize,
    pub statuses: Vec<StatusShare>,
    pub monthly_applications: Vec<MonthlyCount>,
    pub origin: SnapshotOrigin,
}

/// Router exposing the job snapshot, its derived views, and mutations through the store.
pub fn job_router<R>(store: Arc<JobStore<R>>) -> Router
where
    R: JobRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/jobs/stats", get(stats_handler::<R>))
        .route("/api/v1/jobs/refresh", post(refresh_handler::<R>))
        .route(
            "/api/v1/jobs/:job_id",
            get(show_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(store)
}

pub(crate) async fn list_handler<R>(
    State(store): State<Arc<JobStore<R>>>,
    Query(query): Query<FilterQuery>,
) -> Response
where
    R: JobRepository + 'static,
{
    let spec = match query.into_spec() {
        Ok(spec) => spec,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };

    let jobs = store.query(&spec);
    let body = JobListResponse {
        total: store.snapshot().len(),
        matched: jobs.len(),
        filter_active: spec.is_active(),
        origin: store.origin(),
        jobs,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn stats_handler<R>(State(store): State<Arc<JobStore<R>>>) -> Response
where
    R: JobRepository + 'static,
{
    let summary = store.statistics();
    let body = StatsResponse {
        total: summary.total,
        statuses: summary.status_breakdown(),
        monthly_applications: summary.monthly_applications,
        origin: store.origin(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn refresh_handler<R>(State(store): State<Arc<JobStore<R>>>) -> Response
where
    R: JobRepository + 'static,
{
    match store.refresh().await {
        Ok(jobs) => (
            StatusCode::OK,
            Json(json!({ "status": "refreshed", "total": jobs.len() })),
        )
            .into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(crate) async fn show_handler<R>(
    State(store): State<Arc<JobStore<R>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: JobRepository + 'static,
{
    let id = JobId(job_id);
    match store.get(&id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => store_error_response(RepositoryError::NotFound.into()),
        Err(err) => store_error_response(err),
    }
}

pub(crate) async fn create_handler<R>(
    State(store): State<Arc<JobStore<R>>>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: JobRepository + 'static,
{
    match store.add(draft).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "status": "created", "total": store.snapshot().len() })),
        )
            .into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(store): State<Arc<JobStore<R>>>,
    Path(job_id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: JobRepository + 'static,
{
    let id = JobId(job_id);
    let record = draft.into_record(id.clone(), Utc::now());
    match store.update(record).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "updated", "id": id })),
        )
            .into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(store): State<Arc<JobStore<R>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: JobRepository + 'static,
{
    let id = JobId(job_id);
    match store.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error_response(err),
    }
}

fn store_error_response(error: StoreError) -> Response {
    let status = match &error {
        StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        StoreError::Repository(RepositoryError::Rejected(_)) => StatusCode::BAD_REQUEST,
        StoreError::Repository(RepositoryError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
        StoreError::Repository(RepositoryError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
    };

    let payload = match &error {
        StoreError::Validation(errors) => json!({
            "error": error.to_string(),
            "fields": errors.field_map(),
        }),
        _ => json!({ "error": error.to_string() }),
    };
    (status, Json(payload)).into_response()
}
