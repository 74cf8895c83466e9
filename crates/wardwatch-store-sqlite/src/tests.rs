//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use uuid::Uuid;
use wardwatch_core::{
  Entity, Error as CoreError, Patch,
  activity::{
    NewCitizenReport, NewScanLog, NewTracker, ReportPatch, ReportPriority,
    ReportStatus, ScanMethod, TrackerMethod,
  },
  household::{HouseholdPatch, HouseholdStatus, NewHousehold},
  query::{
    DateRange, HouseholdQuery, ListFilter, PageRequest, ReportQuery, ScanLogQuery,
    SortOrder, WardQuery, WardSort, WorkerQuery, WorkerSort,
  },
  store::{DomainError, WasteStore},
  ward::{NewWard, Ward, WardPatch},
  worker::{NewWorker, Worker, WorkerPatch},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn ward(s: &SqliteStore, name: &str) -> Ward {
  s.add_ward(NewWard { ward_name: name.into(), supervisor_id: None })
    .await
    .unwrap()
}

async fn worker(s: &SqliteStore, name: &str, contact: &str, ward_id: Option<Uuid>) -> Worker {
  s.add_worker(NewWorker {
    worker_name: name.into(),
    contact_number: contact.into(),
    ward_id,
    status: true,
  })
  .await
  .unwrap()
}

async fn household(s: &SqliteStore, owner: &str, ward_id: Option<Uuid>) -> Uuid {
  s.add_household(NewHousehold {
    owner_number: owner.into(),
    address: format!("{owner} Main Road"),
    status: HouseholdStatus::Active,
    ward_id,
    tracker_id: None,
  })
  .await
  .unwrap()
  .house_id
}

fn search(term: &str) -> ListFilter {
  ListFilter { search: Some(term.into()), ..Default::default() }
}

fn domain(err: &Error) -> &CoreError { err.domain().expect("domain error") }

// ─── Wards ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_ward() {
  let s = store().await;
  let added = ward(&s, "East Ward").await;

  let row = s.get_ward(added.ward_id).await.unwrap().unwrap();
  assert_eq!(row.ward, added);
  assert_eq!(row.worker_count, 0);
  assert_eq!(row.household_count, 0);
  assert_eq!(row.supervisor_name, None);
}

#[tokio::test]
async fn get_ward_missing_returns_none() {
  let s = store().await;
  assert!(s.get_ward(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_ward_name_conflicts() {
  let s = store().await;
  ward(&s, "North").await;

  let err = s
    .add_ward(NewWard { ward_name: "North".into(), supervisor_id: None })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict { entity: Entity::Ward, field: "wardName", .. }
  ));
  assert_eq!(s.stats().await.unwrap().total_wards, 1);
}

#[tokio::test]
async fn ward_supervisor_must_exist() {
  let s = store().await;
  let err = s
    .add_ward(NewWard { ward_name: "West".into(), supervisor_id: Some(Uuid::new_v4()) })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::MissingReference { field: "supervisorId", target: Entity::Worker, .. }
  ));
}

#[tokio::test]
async fn ward_row_carries_supervisor_name_and_counts() {
  let s = store().await;
  let boss = worker(&s, "Asha", "0700000001", None).await;
  let w = s
    .add_ward(NewWard { ward_name: "Central".into(), supervisor_id: Some(boss.worker_id) })
    .await
    .unwrap();
  worker(&s, "Ben", "0700000002", Some(w.ward_id)).await;
  worker(&s, "Cleo", "0700000003", Some(w.ward_id)).await;
  household(&s, "0800000001", Some(w.ward_id)).await;

  let row = s.get_ward(w.ward_id).await.unwrap().unwrap();
  assert_eq!(row.supervisor_name.as_deref(), Some("Asha"));
  assert_eq!(row.worker_count, 2);
  assert_eq!(row.household_count, 1);
}

#[tokio::test]
async fn update_ward_is_sparse() {
  let s = store().await;
  let boss = worker(&s, "Asha", "0700000001", None).await;
  let w = s
    .add_ward(NewWard { ward_name: "Old".into(), supervisor_id: Some(boss.worker_id) })
    .await
    .unwrap();

  let renamed = s
    .update_ward(w.ward_id, WardPatch { ward_name: Some("New".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(renamed.ward_name, "New");
  assert_eq!(renamed.supervisor_id, Some(boss.worker_id));
  assert_eq!(renamed.created_at, w.created_at);

  let cleared = s
    .update_ward(w.ward_id, WardPatch { ward_name: None, supervisor_id: Patch::Clear })
    .await
    .unwrap();
  assert_eq!(cleared.ward_name, "New");
  assert_eq!(cleared.supervisor_id, None);
}

#[tokio::test]
async fn update_ward_may_keep_its_own_name() {
  let s = store().await;
  let w = ward(&s, "Same").await;
  let patch = WardPatch { ward_name: Some("Same".into()), ..Default::default() };
  assert!(s.update_ward(w.ward_id, patch).await.is_ok());
}

#[tokio::test]
async fn update_ward_to_taken_name_conflicts() {
  let s = store().await;
  ward(&s, "A").await;
  let b = ward(&s, "B").await;
  let err = s
    .update_ward(b.ward_id, WardPatch { ward_name: Some("A".into()), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Conflict { .. }));
}

#[tokio::test]
async fn update_missing_ward_is_not_found() {
  let s = store().await;
  let id = Uuid::new_v4();
  let err = s
    .update_ward(id, WardPatch { ward_name: Some("X".into()), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::NotFound { entity: Entity::Ward, id: missing } if *missing == id
  ));
}

#[tokio::test]
async fn delete_missing_ward_is_not_found() {
  let s = store().await;
  let err = s.delete_ward(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound { entity: Entity::Ward, .. }));
}

#[tokio::test]
async fn deleting_a_ward_nulls_worker_and_household_assignments() {
  let s = store().await;
  let w = ward(&s, "Doomed").await;
  let wk = worker(&s, "Dev", "0700000009", Some(w.ward_id)).await;
  let hh = household(&s, "0800000009", Some(w.ward_id)).await;

  s.delete_ward(w.ward_id).await.unwrap();

  let wk = s.get_worker(wk.worker_id).await.unwrap().expect("worker kept");
  assert_eq!(wk.worker.ward_id, None);
  assert_eq!(wk.ward_name, None);
  let hh = s.get_household(hh).await.unwrap().expect("household kept");
  assert_eq!(hh.household.ward_id, None);
}

#[tokio::test]
async fn deleting_a_supervisor_clears_the_ward_reference() {
  let s = store().await;
  let boss = worker(&s, "Asha", "0700000001", None).await;
  let w = s
    .add_ward(NewWard { ward_name: "Central".into(), supervisor_id: Some(boss.worker_id) })
    .await
    .unwrap();

  s.delete_worker(boss.worker_id).await.unwrap();

  let row = s.get_ward(w.ward_id).await.unwrap().unwrap();
  assert_eq!(row.ward.supervisor_id, None);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ward_search_matches_ward_or_supervisor_name() {
  let s = store().await;
  let boss = worker(&s, "Zanele", "0700000001", None).await;
  s.add_ward(NewWard { ward_name: "Harbour".into(), supervisor_id: Some(boss.worker_id) })
    .await
    .unwrap();
  ward(&s, "Eastgate").await;
  ward(&s, "Hillside").await;

  let by_name = s
    .list_wards(&WardQuery { filter: search("EAST"), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_name.items.len(), 1);
  assert_eq!(by_name.items[0].ward.ward_name, "Eastgate");

  let by_supervisor = s
    .list_wards(&WardQuery { filter: search("zan"), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_supervisor.items.len(), 1);
  assert_eq!(by_supervisor.items[0].ward.ward_name, "Harbour");
}

#[tokio::test]
async fn search_folds_case_beyond_ascii() {
  let s = store().await;
  ward(&s, "Édouard Ward").await;
  ward(&s, "Eastgate").await;

  for term in ["ÉDOUARD", "édouard", "Édouard"] {
    let page = s
      .list_wards(&WardQuery { filter: search(term), ..Default::default() })
      .await
      .unwrap();
    assert_eq!(page.pagination.total_items, 1, "term {term:?}");
    assert_eq!(page.items[0].ward.ward_name, "Édouard Ward");
  }
}

#[tokio::test]
async fn search_term_is_matched_literally() {
  let s = store().await;
  ward(&s, "100% Recycled").await;
  ward(&s, "1000 Oaks").await;
  ward(&s, "Under_score").await;
  ward(&s, "Underscore").await;

  let percent = s
    .list_wards(&WardQuery { filter: search("0%"), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(percent.pagination.total_items, 1);

  let underscore = s
    .list_wards(&WardQuery { filter: search("r_s"), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(underscore.pagination.total_items, 1);
  assert_eq!(underscore.items[0].ward.ward_name, "Under_score");
}

#[tokio::test]
async fn blank_search_is_not_a_filter() {
  let s = store().await;
  ward(&s, "One").await;
  ward(&s, "Two").await;

  let page = s
    .list_wards(&WardQuery { filter: search("   "), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.pagination.total_items, 2);
}

#[tokio::test]
async fn worker_listing_filters_by_ward_name() {
  let s = store().await;
  let north = ward(&s, "North").await;
  let south = ward(&s, "South").await;
  worker(&s, "A", "01", Some(north.ward_id)).await;
  worker(&s, "B", "02", Some(south.ward_id)).await;
  worker(&s, "C", "03", None).await;

  let query = WorkerQuery {
    filter: ListFilter { ward: Some("nor".into()), ..Default::default() },
    ..Default::default()
  };
  let page = s.list_workers(&query).await.unwrap();
  assert_eq!(page.pagination.total_items, 1);
  assert_eq!(page.items[0].worker.worker_name, "A");
  assert_eq!(page.items[0].ward_name.as_deref(), Some("North"));
}

#[tokio::test]
async fn filters_combine_conjunctively() {
  let s = store().await;
  let north = ward(&s, "North").await;
  worker(&s, "Ann", "01", Some(north.ward_id)).await;
  worker(&s, "Ann", "02", None).await;
  worker(&s, "Bob", "03", Some(north.ward_id)).await;

  let query = WorkerQuery {
    filter: ListFilter {
      search: Some("ann".into()),
      ward: Some("north".into()),
      ..Default::default()
    },
    ..Default::default()
  };
  let page = s.list_workers(&query).await.unwrap();
  assert_eq!(page.pagination.total_items, 1);
  assert_eq!(page.items[0].worker.contact_number, "01");
}

#[tokio::test]
async fn date_range_bounds_the_creation_timestamp() {
  let s = store().await;
  ward(&s, "A").await;
  ward(&s, "B").await;

  let now = Utc::now();
  let both = DateRange { from: Some(now - Duration::days(1)), to: Some(now + Duration::days(1)) };
  let future = DateRange { from: Some(now + Duration::days(1)), to: None };
  let past = DateRange { from: None, to: Some(now - Duration::days(1)) };

  let count = |created: DateRange| {
    let s = s.clone();
    async move {
      s.list_wards(&WardQuery {
        filter: ListFilter { created, ..Default::default() },
        ..Default::default()
      })
      .await
      .unwrap()
      .pagination
      .total_items
    }
  };

  assert_eq!(count(both).await, 2);
  assert_eq!(count(future).await, 0);
  assert_eq!(count(past).await, 0);
  assert_eq!(count(DateRange::default()).await, 2);
}

#[tokio::test]
async fn total_items_counts_the_whole_filtered_set() {
  let s = store().await;
  for i in 0..12 {
    household(&s, &format!("07{i:02}"), None).await;
  }
  household(&s, "0900", None).await;

  let query = HouseholdQuery {
    filter: search("07"),
    page: PageRequest::new(2, 5).unwrap(),
    ..Default::default()
  };
  let page = s.list_households(&query).await.unwrap();
  assert_eq!(page.items.len(), 5);
  assert_eq!(page.pagination.total_items, 12);
  assert_eq!(page.pagination.total_pages, 3);
  assert_eq!(page.pagination.page, 2);
  assert_eq!(page.pagination.limit, 5);

  let everything = s
    .list_households(&HouseholdQuery {
      filter: search("07"),
      page: PageRequest::new(1, 100).unwrap(),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(everything.items.len() as u64, page.pagination.total_items);
}

#[tokio::test]
async fn pages_partition_the_sorted_result() {
  let s = store().await;
  let w = ward(&s, "Shared").await;
  // Same name for everyone, so ordering rests entirely on the tie-break.
  for i in 0..7 {
    worker(&s, "Same", &format!("07{i}"), Some(w.ward_id)).await;
  }

  let query = |page: u32, limit: u32| WorkerQuery {
    sort_by: WorkerSort::WorkerName,
    sort_order: SortOrder::Asc,
    page: PageRequest::new(page, limit).unwrap(),
    ..Default::default()
  };

  let all: Vec<Uuid> = s
    .list_workers(&query(1, 100))
    .await
    .unwrap()
    .items
    .into_iter()
    .map(|r| r.worker.worker_id)
    .collect();
  assert_eq!(all.len(), 7);

  let mut paged = Vec::new();
  for p in 1..=3 {
    let page = s.list_workers(&query(p, 3)).await.unwrap();
    let start = ((p - 1) * 3) as usize;
    let end = (p * 3).min(7) as usize;
    let ids: Vec<Uuid> = page.items.iter().map(|r| r.worker.worker_id).collect();
    assert_eq!(ids, all[start..end]);
    paged.extend(ids);
  }
  assert_eq!(paged, all);

  let beyond = s.list_workers(&query(4, 3)).await.unwrap();
  assert!(beyond.items.is_empty());
  assert_eq!(beyond.pagination.total_items, 7);
}

#[tokio::test]
async fn worker_count_sort_matches_direct_counts() {
  let s = store().await;
  let mut wards = Vec::new();
  for (name, workers) in [("A", 2), ("B", 0), ("C", 3), ("D", 2), ("E", 1)] {
    let w = ward(&s, name).await;
    for i in 0..workers {
      worker(&s, "W", &format!("{name}{i}"), Some(w.ward_id)).await;
    }
    wards.push(w.ward_id);
  }
  worker(&s, "Unassigned", "X0", None).await;

  let every_worker = s
    .list_workers(&WorkerQuery { page: PageRequest::new(1, 100).unwrap(), ..Default::default() })
    .await
    .unwrap();
  let mut direct: HashMap<Uuid, u64> = wards.iter().map(|id| (*id, 0)).collect();
  for row in &every_worker.items {
    if let Some(ward_id) = row.worker.ward_id {
      *direct.entry(ward_id).or_default() += 1;
    }
  }
  let mut expected: Vec<(Uuid, u64)> = direct.into_iter().collect();
  expected.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

  let listed = s
    .list_wards(&WardQuery {
      sort_by: WardSort::WorkerCount,
      sort_order: SortOrder::Desc,
      ..Default::default()
    })
    .await
    .unwrap();
  let actual: Vec<(Uuid, u64)> = listed
    .items
    .iter()
    .map(|r| (r.ward.ward_id, r.worker_count))
    .collect();

  assert_eq!(actual, expected);
}

#[tokio::test]
async fn household_count_sort_ascending() {
  let s = store().await;
  let busy = ward(&s, "Busy").await;
  let quiet = ward(&s, "Quiet").await;
  household(&s, "01", Some(busy.ward_id)).await;
  household(&s, "02", Some(busy.ward_id)).await;
  household(&s, "03", Some(quiet.ward_id)).await;

  let page = s
    .list_wards(&WardQuery {
      sort_by: WardSort::HouseholdCount,
      sort_order: SortOrder::Asc,
      ..Default::default()
    })
    .await
    .unwrap();
  let names: Vec<&str> = page.items.iter().map(|r| r.ward.ward_name.as_str()).collect();
  assert_eq!(names, ["Quiet", "Busy"]);
}

// ─── Workers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_contact_number_is_rejected_without_insert() {
  let s = store().await;
  worker(&s, "First", "0711111111", None).await;

  let err = s
    .add_worker(NewWorker {
      worker_name: "Second".into(),
      contact_number: "0711111111".into(),
      ward_id: None,
      status: false,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict { entity: Entity::Worker, field: "contactNumber", .. }
  ));

  let all = s.list_workers(&WorkerQuery::default()).await.unwrap();
  assert_eq!(all.pagination.total_items, 1);
  assert_eq!(all.items[0].worker.worker_name, "First");
}

#[tokio::test]
async fn worker_ward_must_exist() {
  let s = store().await;
  let err = s
    .add_worker(NewWorker {
      worker_name: "Lost".into(),
      contact_number: "01".into(),
      ward_id: Some(Uuid::new_v4()),
      status: true,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::MissingReference { field: "wardId", target: Entity::Ward, .. }
  ));
}

#[tokio::test]
async fn update_worker_contact_to_anothers_conflicts() {
  let s = store().await;
  worker(&s, "A", "01", None).await;
  let b = worker(&s, "B", "02", None).await;

  let err = s
    .update_worker(
      b.worker_id,
      WorkerPatch { contact_number: Some("01".into()), ..Default::default() },
    )
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Conflict { .. }));
}

#[tokio::test]
async fn update_worker_applies_only_supplied_fields() {
  let s = store().await;
  let w = ward(&s, "North").await;
  let wk = worker(&s, "A", "01", Some(w.ward_id)).await;

  let updated = s
    .update_worker(wk.worker_id, WorkerPatch { status: Some(false), ..Default::default() })
    .await
    .unwrap();
  assert!(!updated.status);
  assert_eq!(updated.ward_id, Some(w.ward_id));
  assert_eq!(updated.contact_number, "01");

  let unassigned = s
    .update_worker(wk.worker_id, WorkerPatch { ward_id: Patch::Clear, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(unassigned.ward_id, None);
  assert!(!unassigned.status);
}

#[tokio::test]
async fn delete_worker_then_missing() {
  let s = store().await;
  let wk = worker(&s, "A", "01", None).await;
  s.delete_worker(wk.worker_id).await.unwrap();
  assert!(s.get_worker(wk.worker_id).await.unwrap().is_none());

  let err = s.delete_worker(wk.worker_id).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound { entity: Entity::Worker, .. }));
}

// ─── Households ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_owner_number_conflicts() {
  let s = store().await;
  household(&s, "0800", None).await;
  let err = s
    .add_household(NewHousehold {
      owner_number: "0800".into(),
      address: "elsewhere".into(),
      status: HouseholdStatus::Active,
      ward_id: None,
      tracker_id: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict { entity: Entity::Household, field: "ownerNumber", .. }
  ));
}

#[tokio::test]
async fn update_household_refreshes_date_updated() {
  let s = store().await;
  let id = household(&s, "0800", None).await;
  let before = s.get_household(id).await.unwrap().unwrap().household;

  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  let after = s
    .update_household(
      id,
      HouseholdPatch { status: Some(HouseholdStatus::Suspended), ..Default::default() },
    )
    .await
    .unwrap();

  assert_eq!(after.status, HouseholdStatus::Suspended);
  assert_eq!(after.address, before.address);
  assert_eq!(after.date_created, before.date_created);
  assert!(after.date_updated > before.date_updated);

  let stored = s.get_household(id).await.unwrap().unwrap().household;
  assert_eq!(stored, after);
}

#[tokio::test]
async fn household_tracker_must_exist() {
  let s = store().await;
  let id = household(&s, "0800", None).await;
  let err = s
    .update_household(id, HouseholdPatch { tracker_id: Patch::Set(42), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::MissingReference { field: "trackerId", target: Entity::Tracker, .. }
  ));

  let tracker = s
    .add_tracker(NewTracker { method: TrackerMethod::QrCode, house_id: Some(id) })
    .await
    .unwrap();
  assert_eq!(tracker.method, TrackerMethod::QrCode);
  let updated = s
    .update_household(
      id,
      HouseholdPatch { tracker_id: Patch::Set(tracker.tracker_id), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!(updated.tracker_id, Some(tracker.tracker_id));
}

#[tokio::test]
async fn deleting_a_household_cascades_scans_and_reports() {
  let s = store().await;
  let id = household(&s, "0800", None).await;
  s.record_scan(NewScanLog {
    house_id: id,
    worker_id: None,
    gps_latitude: None,
    gps_longitude: None,
    sync_status: false,
    scan_method: ScanMethod::Manual,
  })
  .await
  .unwrap();
  s.file_report(NewCitizenReport {
    house_id: id,
    citizen_contact: "0900".into(),
    priority: None,
    additional_notes: None,
  })
  .await
  .unwrap();

  s.delete_household(id).await.unwrap();

  let scans = s.list_scans(&ScanLogQuery::default()).await.unwrap();
  assert_eq!(scans.pagination.total_items, 0);
  let reports = s.list_reports(&ReportQuery::default()).await.unwrap();
  assert_eq!(reports.pagination.total_items, 0);
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_every_table() {
  let s = store().await;
  let w = ward(&s, "A").await;
  worker(&s, "A", "01", Some(w.ward_id)).await;
  worker(&s, "B", "02", None).await;
  household(&s, "0800", None).await;

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_wards, 1);
  assert_eq!(stats.total_workers, 2);
  assert_eq!(stats.total_households, 1);
}

#[tokio::test]
async fn redistribute_without_wards_fails() {
  let s = store().await;
  worker(&s, "A", "01", None).await;
  let err = s.redistribute_workers().await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NoWards));
}

#[tokio::test]
async fn redistribute_assigns_every_worker_to_an_existing_ward() {
  let s = store().await;
  let a = ward(&s, "A").await;
  let b = ward(&s, "B").await;
  for i in 0..6 {
    worker(&s, "W", &format!("0{i}"), None).await;
  }

  assert_eq!(s.redistribute_workers().await.unwrap(), 6);

  let all = s.list_workers(&WorkerQuery::default()).await.unwrap();
  for row in all.items {
    let ward_id = row.worker.ward_id.expect("assigned");
    assert!(ward_id == a.ward_id || ward_id == b.ward_id);
  }
}

// ─── Field activity ──────────────────────────────────────────────────────────

#[tokio::test]
async fn scans_list_newest_first_with_joined_names() {
  let s = store().await;
  let w = ward(&s, "Harbour").await;
  let wk = worker(&s, "Sipho", "01", Some(w.ward_id)).await;
  let house = household(&s, "0800", Some(w.ward_id)).await;

  let scan = |method| NewScanLog {
    house_id: house,
    worker_id: Some(wk.worker_id),
    gps_latitude: Some(-33.9),
    gps_longitude: Some(18.4),
    sync_status: true,
    scan_method: method,
  };
  let first = s.record_scan(scan(ScanMethod::Nfc)).await.unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  let second = s.record_scan(scan(ScanMethod::Manual)).await.unwrap();

  let page = s.list_scans(&ScanLogQuery::default()).await.unwrap();
  let ids: Vec<Uuid> = page.items.iter().map(|r| r.scan.scan_id).collect();
  assert_eq!(ids, [second.scan_id, first.scan_id]);
  assert_eq!(page.items[0].worker_name.as_deref(), Some("Sipho"));
  assert_eq!(page.items[0].address, "0800 Main Road");
  assert_eq!(page.items[0].ward_name.as_deref(), Some("Harbour"));

  let nfc_only = s
    .list_scans(&ScanLogQuery { method: Some(ScanMethod::Nfc), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(nfc_only.pagination.total_items, 1);
  assert_eq!(nfc_only.items[0].scan.scan_id, first.scan_id);
}

#[tokio::test]
async fn deleting_a_worker_keeps_their_scans() {
  let s = store().await;
  let wk = worker(&s, "Gone", "01", None).await;
  let house = household(&s, "0800", None).await;
  s.record_scan(NewScanLog {
    house_id: house,
    worker_id: Some(wk.worker_id),
    gps_latitude: None,
    gps_longitude: None,
    sync_status: false,
    scan_method: ScanMethod::Nfc,
  })
  .await
  .unwrap();

  s.delete_worker(wk.worker_id).await.unwrap();

  let page = s.list_scans(&ScanLogQuery::default()).await.unwrap();
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.items[0].scan.worker_id, None);
  assert_eq!(page.items[0].worker_name, None);
}

#[tokio::test]
async fn scan_for_unknown_household_is_rejected() {
  let s = store().await;
  let err = s
    .record_scan(NewScanLog {
      house_id: Uuid::new_v4(),
      worker_id: None,
      gps_latitude: None,
      gps_longitude: None,
      sync_status: false,
      scan_method: ScanMethod::Nfc,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::MissingReference { field: "houseId", target: Entity::Household, .. }
  ));
}

#[tokio::test]
async fn reports_open_by_default_and_update_sparsely() {
  let s = store().await;
  let house = household(&s, "0800", None).await;
  let report = s
    .file_report(NewCitizenReport {
      house_id: house,
      citizen_contact: "0999".into(),
      priority: Some(ReportPriority::High),
      additional_notes: Some("bins not collected".into()),
    })
    .await
    .unwrap();
  assert_eq!(report.status, ReportStatus::Open);

  let updated = s
    .update_report(
      report.report_id,
      ReportPatch {
        status: Some(ReportStatus::InProgress),
        additional_notes: Patch::Clear,
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.status, ReportStatus::InProgress);
  assert_eq!(updated.priority, Some(ReportPriority::High));
  assert_eq!(updated.additional_notes, None);

  let open = s
    .list_reports(&ReportQuery { status: Some(ReportStatus::Open), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(open.pagination.total_items, 0);
  let in_progress = s
    .list_reports(&ReportQuery {
      status: Some(ReportStatus::InProgress),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(in_progress.items, [updated]);
}

#[tokio::test]
async fn report_search_covers_contact_and_notes() {
  let s = store().await;
  let house = household(&s, "0800", None).await;
  for (contact, notes) in [("0111", Some("overflowing bin")), ("0222", None)] {
    s.file_report(NewCitizenReport {
      house_id: house,
      citizen_contact: contact.into(),
      priority: None,
      additional_notes: notes.map(Into::into),
    })
    .await
    .unwrap();
  }

  let by_notes = s
    .list_reports(&ReportQuery { search: Some("OVERFLOW".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_notes.pagination.total_items, 1);
  let by_contact = s
    .list_reports(&ReportQuery { search: Some("0222".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_contact.items[0].citizen_contact, "0222");
}

#[tokio::test]
async fn update_missing_report_is_not_found() {
  let s = store().await;
  let err = s
    .update_report(
      Uuid::new_v4(),
      ReportPatch { status: Some(ReportStatus::Closed), ..Default::default() },
    )
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::NotFound { entity: Entity::CitizenReport, .. }
  ));
}

#[tokio::test]
async fn close_releases_the_connection() {
  let s = store().await;
  ward(&s, "A").await;
  s.close().await.unwrap();
}
