use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::jobs::router::{delete_handler, job_router, show_handler};
use crate::jobs::store::JobStore;

async fn refreshed_store() -> Arc<JobStore<CountingRepository>> {
    let (store, _) = store_with(pipeline());
    store.refresh().await.expect("refresh succeeds");
    Arc::new(store)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn list_route_applies_query_filters() {
    let router = job_router(refreshed_store().await);

    let response = router
        .oneshot(get(
            "/api/v1/jobs?status=Rejected&sort_by=company&sort_direction=asc",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], json!(6));
    assert_eq!(payload["matched"], json!(2));
    assert_eq!(payload["filter_active"], json!(true));
    assert_eq!(payload["origin"], json!("repository"));
    let companies: Vec<&str> = payload["jobs"]
        .as_array()
        .expect("jobs array")
        .iter()
        .filter_map(|job| job["company"].as_str())
        .collect();
    assert_eq!(companies, vec!["Beta", "Echo"]);
}

#[tokio::test]
async fn list_route_defaults_to_newest_first() {
    let router = job_router(refreshed_store().await);

    let response = router
        .oneshot(get("/api/v1/jobs?search=acme"))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    let ids: Vec<&str> = payload["jobs"]
        .as_array()
        .expect("jobs array")
        .iter()
        .filter_map(|job| job["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["c", "d", "acme"]);
}

#[tokio::test]
async fn list_route_rejects_unknown_sort_direction() {
    let router = job_router(refreshed_store().await);

    let response = router
        .oneshot(get("/api/v1/jobs?sort_direction=sideways"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("sideways"));
}

#[tokio::test]
async fn stats_route_reports_full_collection() {
    let router = job_router(refreshed_store().await);

    let response = router
        .oneshot(get("/api/v1/jobs/stats"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], json!(6));
    assert_eq!(payload["statuses"][0]["label"], json!("Applied"));
    assert_eq!(payload["statuses"][0]["count"], json!(2));
    assert_eq!(payload["monthly_applications"][0]["month"], json!("2024-01"));
    assert_eq!(payload["monthly_applications"][0]["count"], json!(2));
}

#[tokio::test]
async fn create_route_returns_field_errors() {
    let router = job_router(refreshed_store().await);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs",
            json!({
                "jobTitle": "",
                "company": "Gamma",
                "applicationDate": "2024-04-02",
                "jobLink": "gamma careers"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["fields"]["jobTitle"], json!("Job title is required"));
    assert_eq!(payload["fields"]["jobLink"], json!("Please enter a valid URL"));
}

#[tokio::test]
async fn create_route_adds_and_refreshes() {
    let store = refreshed_store().await;
    let router = job_router(store.clone());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs",
            json!({
                "jobTitle": "Backend Engineer",
                "company": "Gamma",
                "applicationDate": "2024-04-02",
                "status": "Applied"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], json!(7));
    assert_eq!(store.snapshot().len(), 7);
}

#[tokio::test]
async fn update_route_returns_not_found_for_unknown_id() {
    let router = job_router(refreshed_store().await);

    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/v1/jobs/missing",
            json!({
                "jobTitle": "Engineer",
                "company": "Nowhere",
                "applicationDate": "2024-01-01"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn show_handler_returns_record_or_not_found() {
    let store = refreshed_store().await;

    let found = show_handler::<CountingRepository>(State(store.clone()), Path("beta".to_string())).await;
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["jobTitle"], json!("Analyst"));
    assert_eq!(payload["status"], json!("Rejected"));

    let missing = show_handler::<CountingRepository>(State(store), Path("nope".to_string())).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_handler_returns_no_content() {
    let store = refreshed_store().await;

    let response =
        delete_handler::<CountingRepository>(State(store.clone()), Path("acme".to_string())).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.snapshot().len(), 5);
}

#[tokio::test]
async fn refresh_route_maps_remote_failure_to_bad_gateway() {
    let router = job_router(Arc::new(JobStore::new(Arc::new(UnavailableRepository))));

    let response = router
        .oneshot(
            Request::post("/api/v1/jobs/refresh")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("connection refused"));
}
