//! Async HTTP client wrapping the wardwatch JSON API.
//!
//! Listing responses are cached per request URL and query. Any successful
//! mutation drops the whole cache, since a change to one entity shows up in
//! the joined rows of the others (ward names on workers, counts on wards).

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;
use wardwatch_core::{
  activity::{
    CitizenReport, NewCitizenReport, NewScanLog, NewTracker, ReportPatch,
    ReportPriority, ReportStatus, ScanLog, ScanLogRow, ScanMethod, Tracker,
  },
  envelope::{Envelope, ErrorBody, Health, ListEnvelope, Redistribution},
  household::{Household, HouseholdPatch, HouseholdRow, NewHousehold},
  store::Stats,
  ward::{NewWard, Ward, WardPatch, WardRow},
  worker::{NewWorker, Worker, WorkerPatch, WorkerRow},
};

/// Connection settings for the wardwatch API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// The three entities with full CRUD endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  Wards,
  Workers,
  Households,
}

impl Resource {
  fn path(self) -> &'static str {
    match self {
      Self::Wards => "/wards",
      Self::Workers => "/workers",
      Self::Households => "/households",
    }
  }
}

/// Shared listing parameters (`search`, `ward`, dates, sort, paging).
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
  pub search:     Option<String>,
  pub ward:       Option<String>,
  pub from_date:  Option<String>,
  pub to_date:    Option<String>,
  pub sort_by:    Option<String>,
  pub sort_order: Option<String>,
  pub page:       Option<u32>,
  pub limit:      Option<u32>,
}

impl ListOptions {
  fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    push(&mut query, "search", self.search.as_ref());
    push(&mut query, "ward", self.ward.as_ref());
    push(&mut query, "from_date", self.from_date.as_ref());
    push(&mut query, "to_date", self.to_date.as_ref());
    push(&mut query, "sort_by", self.sort_by.as_ref());
    push(&mut query, "sort_order", self.sort_order.as_ref());
    push(&mut query, "page", self.page.as_ref());
    push(&mut query, "limit", self.limit.as_ref());
    query
  }
}

#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
  pub house_id:  Option<Uuid>,
  pub worker_id: Option<Uuid>,
  pub method:    Option<ScanMethod>,
  pub synced:    Option<bool>,
  pub page:      Option<u32>,
  pub limit:     Option<u32>,
}

impl ScanFilter {
  fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    push(&mut query, "house_id", self.house_id.as_ref());
    push(&mut query, "worker_id", self.worker_id.as_ref());
    push(&mut query, "method", self.method.map(enum_name).as_ref());
    push(&mut query, "synced", self.synced.as_ref());
    push(&mut query, "page", self.page.as_ref());
    push(&mut query, "limit", self.limit.as_ref());
    query
  }
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
  pub search:   Option<String>,
  pub status:   Option<ReportStatus>,
  pub priority: Option<ReportPriority>,
  pub page:     Option<u32>,
  pub limit:    Option<u32>,
}

impl ReportFilter {
  fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    push(&mut query, "search", self.search.as_ref());
    push(&mut query, "status", self.status.map(enum_name).as_ref());
    push(&mut query, "priority", self.priority.map(enum_name).as_ref());
    push(&mut query, "page", self.page.as_ref());
    push(&mut query, "limit", self.limit.as_ref());
    query
  }
}

fn push<T: ToString>(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&T>) {
  if let Some(value) = value {
    query.push((key, value.to_string()));
  }
}

/// The wire name of a unit enum variant, e.g. `ReportStatus::InProgress` →
/// `in_progress`.
fn enum_name<T: Serialize>(value: T) -> String {
  match serde_json::to_value(value) {
    Ok(Value::String(s)) => s,
    Ok(other) => other.to_string(),
    Err(_) => String::new(),
  }
}

/// Async HTTP client for the wardwatch JSON REST API.
///
/// Cheap to clone; clones share the inner [`reqwest::Client`] and the listing
/// cache.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  cache:  Arc<Mutex<HashMap<String, Value>>>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config, cache: Arc::default() })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.auth(self.client.request(method, self.url(path)))
  }

  // ── Cache ─────────────────────────────────────────────────────────────────

  fn cached(&self, key: &str) -> Option<Value> {
    let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
    cache.get(key).cloned()
  }

  fn remember(&self, key: String, value: Value) {
    let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
    cache.insert(key, value);
  }

  /// Drop every cached listing.
  pub fn invalidate(&self) {
    let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
    if !cache.is_empty() {
      tracing::debug!(entries = cache.len(), "listing cache invalidated");
      cache.clear();
    }
  }

  // ── Transport ─────────────────────────────────────────────────────────────

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) if body.details.is_empty() => body.error,
      Ok(body) => {
        let details: Vec<String> = body
          .details
          .iter()
          .map(|d| format!("{}: {}", d.field, d.message))
          .collect();
        format!("{} ({})", body.error, details.join("; "))
      }
      Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(anyhow!("{what} → {status}: {message}"))
  }

  async fn list<T: DeserializeOwned>(
    &self,
    path: &str,
    query: Vec<(&'static str, String)>,
  ) -> Result<ListEnvelope<T>> {
    let what = format!("GET {path}");
    let key = std::iter::once(path.to_string())
      .chain(query.iter().map(|(k, v)| format!("{k}={v}")))
      .collect::<Vec<_>>()
      .join("&");

    let value = match self.cached(&key) {
      Some(value) => value,
      None => {
        let resp = self
          .request(Method::GET, path)
          .query(&query)
          .send()
          .await
          .with_context(|| format!("{what} failed"))?;
        let value: Value = Self::check(resp, &what)
          .await?
          .json()
          .await
          .with_context(|| format!("deserialising {what}"))?;
        self.remember(key, value.clone());
        value
      }
    };
    serde_json::from_value(value).with_context(|| format!("deserialising {what}"))
  }

  async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let what = format!("GET {path}");
    let resp = self
      .request(Method::GET, path)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let envelope: Envelope<T> = Self::check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {what}"))?;
    envelope.data.ok_or_else(|| anyhow!("{what} returned no data"))
  }

  /// Send a mutation; on success the listing cache is dropped.
  async fn mutate<B: Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<&B>,
  ) -> Result<Envelope<T>> {
    let what = format!("{method} {path}");
    let mut req = self.request(method, path);
    if let Some(body) = body {
      req = req.json(body);
    }
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let resp = Self::check(resp, &what).await?;
    self.invalidate();
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  async fn mutate_data<B: Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: &B,
  ) -> Result<T> {
    let envelope = self.mutate::<B, T>(method, path, Some(body)).await?;
    envelope.data.ok_or_else(|| anyhow!("{path} returned no data"))
  }

  // ── Shared CRUD ───────────────────────────────────────────────────────────

  /// `DELETE /api/<resource>/{id}`
  pub async fn delete(&self, resource: Resource, id: Uuid) -> Result<()> {
    let path = format!("{}/{id}", resource.path());
    self.mutate::<(), ()>(Method::DELETE, &path, None).await?;
    Ok(())
  }

  /// Delete each id in turn, one outcome per id. A failure neither stops the
  /// loop nor undoes earlier deletions.
  pub async fn delete_many(
    &self,
    resource: Resource,
    ids: &[Uuid],
  ) -> Vec<(Uuid, Result<()>)> {
    let mut outcomes = Vec::with_capacity(ids.len());
    for &id in ids {
      let outcome = self.delete(resource, id).await;
      if let Err(e) = &outcome {
        tracing::warn!(%id, error = %e, "bulk delete item failed");
      }
      outcomes.push((id, outcome));
    }
    outcomes
  }

  // ── Wards ─────────────────────────────────────────────────────────────────

  /// `GET /api/wards`
  pub async fn list_wards(&self, options: &ListOptions) -> Result<ListEnvelope<WardRow>> {
    self.list("/wards", options.to_query()).await
  }

  /// `GET /api/wards/{id}`
  pub async fn get_ward(&self, id: Uuid) -> Result<WardRow> {
    self.fetch(&format!("/wards/{id}")).await
  }

  /// `POST /api/wards/add`
  pub async fn add_ward(&self, input: &NewWard) -> Result<Ward> {
    self.mutate_data(Method::POST, "/wards/add", input).await
  }

  /// `PUT /api/wards/{id}`
  pub async fn update_ward(&self, id: Uuid, patch: &WardPatch) -> Result<Ward> {
    self.mutate_data(Method::PUT, &format!("/wards/{id}"), patch).await
  }

  /// `POST /api/wards/redistribute-workers`
  pub async fn redistribute_workers(&self) -> Result<Redistribution> {
    self
      .mutate_data(Method::POST, "/wards/redistribute-workers", &Value::Object(Default::default()))
      .await
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  /// `GET /api/workers`
  pub async fn list_workers(&self, options: &ListOptions) -> Result<ListEnvelope<WorkerRow>> {
    self.list("/workers", options.to_query()).await
  }

  /// `GET /api/workers/{id}`
  pub async fn get_worker(&self, id: Uuid) -> Result<WorkerRow> {
    self.fetch(&format!("/workers/{id}")).await
  }

  /// `POST /api/workers/add`
  pub async fn add_worker(&self, input: &NewWorker) -> Result<Worker> {
    self.mutate_data(Method::POST, "/workers/add", input).await
  }

  /// `PUT /api/workers/{id}`
  pub async fn update_worker(&self, id: Uuid, patch: &WorkerPatch) -> Result<Worker> {
    self.mutate_data(Method::PUT, &format!("/workers/{id}"), patch).await
  }

  // ── Households ────────────────────────────────────────────────────────────

  /// `GET /api/households`
  pub async fn list_households(
    &self,
    options: &ListOptions,
  ) -> Result<ListEnvelope<HouseholdRow>> {
    self.list("/households", options.to_query()).await
  }

  /// `GET /api/households/{id}`
  pub async fn get_household(&self, id: Uuid) -> Result<HouseholdRow> {
    self.fetch(&format!("/households/{id}")).await
  }

  /// `POST /api/households/add`
  pub async fn add_household(&self, input: &NewHousehold) -> Result<Household> {
    self.mutate_data(Method::POST, "/households/add", input).await
  }

  /// `PUT /api/households/{id}`
  pub async fn update_household(
    &self,
    id: Uuid,
    patch: &HouseholdPatch,
  ) -> Result<Household> {
    self.mutate_data(Method::PUT, &format!("/households/{id}"), patch).await
  }

  // ── Field activity ────────────────────────────────────────────────────────

  /// `POST /api/trackers/add`
  pub async fn add_tracker(&self, input: &NewTracker) -> Result<Tracker> {
    self.mutate_data(Method::POST, "/trackers/add", input).await
  }

  /// `GET /api/scan-logs`
  pub async fn list_scans(&self, filter: &ScanFilter) -> Result<ListEnvelope<ScanLogRow>> {
    self.list("/scan-logs", filter.to_query()).await
  }

  /// `POST /api/scan-logs/add`
  pub async fn record_scan(&self, input: &NewScanLog) -> Result<ScanLog> {
    self.mutate_data(Method::POST, "/scan-logs/add", input).await
  }

  /// `GET /api/citizen-reports`
  pub async fn list_reports(
    &self,
    filter: &ReportFilter,
  ) -> Result<ListEnvelope<CitizenReport>> {
    self.list("/citizen-reports", filter.to_query()).await
  }

  /// `POST /api/citizen-reports/add`
  pub async fn file_report(&self, input: &NewCitizenReport) -> Result<CitizenReport> {
    self.mutate_data(Method::POST, "/citizen-reports/add", input).await
  }

  /// `PUT /api/citizen-reports/{id}`
  pub async fn update_report(&self, id: Uuid, patch: &ReportPatch) -> Result<CitizenReport> {
    self
      .mutate_data(Method::PUT, &format!("/citizen-reports/{id}"), patch)
      .await
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<Stats> { self.fetch("/stats").await }

  /// `GET /api/health`
  pub async fn health(&self) -> Result<Health> {
    let resp = self
      .request(Method::GET, "/health")
      .send()
      .await
      .context("GET /health failed")?;
    Self::check(resp, "GET /health")
      .await?
      .json()
      .await
      .context("deserialising health")
  }
}
