//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use wardwatch_store_sqlite::SqliteStore;

use crate::{api_router, health_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  Router::new().nest("/api", api_router(Arc::new(store)).merge(health_router()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
  send(app, "POST", uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) { send(app, "GET", uri, None).await }

async fn created_id(app: &Router, uri: &str, body: Value, key: &str) -> String {
  let (status, json) = post(app, uri, body).await;
  assert_eq!(status, StatusCode::CREATED, "{json}");
  json["data"][key].as_str().unwrap().to_owned()
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn ward_create_search_delete_round() {
  let app = app().await;

  let (status, json) = post(&app, "/api/wards/add", json!({ "wardName": "East Ward" })).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["success"], true);
  let ward_id = json["data"]["wardId"].as_str().unwrap().to_owned();

  let (status, json) = get(&app, "/api/wards?search=East").await;
  assert_eq!(status, StatusCode::OK);
  let rows = json["data"].as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["wardName"], "East Ward");
  assert_eq!(rows[0]["workerCount"], 0);
  assert_eq!(json["pagination"]["total_items"], 1);

  let (status, json) = send(&app, "DELETE", &format!("/api/wards/{ward_id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["success"], true);

  let (_, json) = get(&app, "/api/wards?search=East").await;
  assert_eq!(json["data"].as_array().unwrap().len(), 0);
  assert_eq!(json["pagination"]["total_items"], 0);
  assert_eq!(json["pagination"]["total_pages"], 0);
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_ward_name_is_400_with_details() {
  let app = app().await;
  let (status, json) = post(&app, "/api/wards/add", json!({ "wardName": "   " })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["success"], false);
  assert_eq!(json["error"], "Validation error");
  assert_eq!(json["details"][0]["field"], "wardName");
}

#[tokio::test]
async fn malformed_json_is_400_envelope() {
  let app = app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/api/wards/add")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(json["success"], false);
}

#[tokio::test]
async fn unknown_sort_column_is_rejected() {
  let app = app().await;
  let (status, json) = get(&app, "/api/workers?sort_by=password").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["error"], "Invalid query parameters");
}

#[tokio::test]
async fn computed_sort_column_is_accepted() {
  let app = app().await;
  let (status, _) = get(&app, "/api/wards?sort_by=householdCount&sort_order=asc").await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn out_of_range_limit_is_rejected() {
  let app = app().await;
  let (status, json) = get(&app, "/api/households?limit=0").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["details"][0]["field"], "limit");
}

#[tokio::test]
async fn bad_path_id_is_400() {
  let app = app().await;
  let (status, json) = get(&app, "/api/wards/not-a-uuid").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["success"], false);
}

#[tokio::test]
async fn empty_update_is_400() {
  let app = app().await;
  let id = created_id(&app, "/api/wards/add", json!({ "wardName": "A" }), "wardId").await;
  let (status, json) = send(&app, "PUT", &format!("/api/wards/{id}"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["details"][0]["field"], "body");
}

#[tokio::test]
async fn unknown_ward_reference_is_400() {
  let app = app().await;
  let (status, json) = post(
    &app,
    "/api/households/add",
    json!({
      "ownerNumber": "0712345678",
      "address": "1 Long Street",
      "wardId": "00000000-0000-4000-8000-000000000000"
    }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["details"][0]["field"], "wardId");
}

// ── Conflicts and missing rows ───────────────────────────────────────────────

#[tokio::test]
async fn duplicate_worker_contact_is_409() {
  let app = app().await;
  let body = json!({ "workerName": "Thandi", "contactNumber": "+27 82 555 0100" });
  created_id(&app, "/api/workers/add", body.clone(), "workerId").await;

  let (status, json) = post(&app, "/api/workers/add", body).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(json["success"], false);

  let (_, json) = get(&app, "/api/workers").await;
  assert_eq!(json["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn missing_rows_are_404() {
  let app = app().await;
  let id = "00000000-0000-4000-8000-000000000000";
  let (status, _) = get(&app, &format!("/api/households/{id}")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "DELETE", &format!("/api/workers/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, json) = send(
    &app,
    "PUT",
    &format!("/api/wards/{id}"),
    Some(json!({ "wardName": "Ghost" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(json["success"], false);
}

#[tokio::test]
async fn redistribute_without_wards_is_409() {
  let app = app().await;
  let (status, _) = post(&app, "/api/wards/redistribute-workers", json!({})).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ── Updates ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_aliases_apply_sparse_patches() {
  let app = app().await;
  let boss = created_id(
    &app,
    "/api/workers/add",
    json!({ "workerName": "Boss", "contactNumber": "0800" }),
    "workerId",
  )
  .await;
  let ward = created_id(
    &app,
    "/api/wards/add",
    json!({ "wardName": "Old", "supervisorId": boss }),
    "wardId",
  )
  .await;

  let (status, json) = post(
    &app,
    "/api/wards/update",
    json!({ "wardId": ward, "wardName": "New" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["data"]["wardName"], "New");
  assert_eq!(json["data"]["supervisorId"], boss.as_str());

  let (status, json) = send(
    &app,
    "PUT",
    &format!("/api/wards/{ward}"),
    Some(json!({ "supervisorId": null })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["data"]["wardName"], "New");
  assert_eq!(json["data"]["supervisorId"], Value::Null);
}

#[tokio::test]
async fn deleting_a_ward_leaves_workers_unassigned() {
  let app = app().await;
  let ward = created_id(&app, "/api/wards/add", json!({ "wardName": "W" }), "wardId").await;
  let worker = created_id(
    &app,
    "/api/workers/add",
    json!({ "workerName": "A", "contactNumber": "0800", "wardId": ward, "status": true }),
    "workerId",
  )
  .await;

  let (status, _) = send(&app, "DELETE", &format!("/api/wards/{ward}"), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, json) = get(&app, &format!("/api/workers/{worker}")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["data"]["wardId"], Value::Null);
  assert_eq!(json["data"]["wardName"], Value::Null);
}

// ── Activity and dashboard ───────────────────────────────────────────────────

#[tokio::test]
async fn reports_and_scans_flow() {
  let app = app().await;
  let house = created_id(
    &app,
    "/api/households/add",
    json!({ "ownerNumber": "0712345678", "address": "1 Long Street" }),
    "houseId",
  )
  .await;

  let (status, json) = post(
    &app,
    "/api/scan-logs/add",
    json!({ "houseId": house, "scanMethod": "manual", "gpsLatitude": -33.92 }),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{json}");
  let (_, json) = get(&app, &format!("/api/scan-logs?house_id={house}&method=manual")).await;
  assert_eq!(json["pagination"]["total_items"], 1);
  assert_eq!(json["data"][0]["address"], "1 Long Street");

  let report = created_id(
    &app,
    "/api/citizen-reports/add",
    json!({ "houseId": house, "citizenContact": "0821112222", "priority": "high" }),
    "reportId",
  )
  .await;
  let (status, json) = send(
    &app,
    "PUT",
    &format!("/api/citizen-reports/{report}"),
    Some(json!({ "status": "resolved" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["data"]["status"], "resolved");
  assert_eq!(json["data"]["priority"], "high");

  let (_, json) = get(&app, "/api/citizen-reports?status=resolved").await;
  assert_eq!(json["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn tracker_can_be_linked_to_a_household() {
  let app = app().await;
  let (status, json) = post(&app, "/api/trackers/add", json!({ "method": "qr_code" })).await;
  assert_eq!(status, StatusCode::CREATED);
  let tracker_id = json["data"]["trackerId"].as_i64().unwrap();

  let (status, json) = post(
    &app,
    "/api/households/add",
    json!({ "ownerNumber": "0700", "address": "2 Short Street", "trackerId": tracker_id }),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["data"]["trackerId"], tracker_id);
}

#[tokio::test]
async fn stats_and_health() {
  let app = app().await;
  post(&app, "/api/wards/add", json!({ "wardName": "A" })).await;
  post(&app, "/api/workers/add", json!({ "workerName": "B", "contactNumber": "01" })).await;

  let (status, json) = get(&app, "/api/stats").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["data"], json!({ "totalWards": 1, "totalWorkers": 1, "totalHouseholds": 0 }));

  let (status, json) = get(&app, "/api/health").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["status"], "ok");
  assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn listing_pages_through_results() {
  let app = app().await;
  for i in 0..5 {
    post(&app, "/api/wards/add", json!({ "wardName": format!("Ward {i}") })).await;
  }
  let (_, json) = get(&app, "/api/wards?sort_by=wardName&sort_order=asc&page=2&limit=2").await;
  let names: Vec<&str> = json["data"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["wardName"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["Ward 2", "Ward 3"]);
  assert_eq!(
    json["pagination"],
    json!({ "page": 2, "limit": 2, "total_pages": 3, "total_items": 5 })
  );
}
