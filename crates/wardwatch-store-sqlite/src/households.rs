//! Household queries.

use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;
use wardwatch_core::{
  Entity,
  household::{Household, HouseholdPatch, HouseholdRow, NewHousehold},
  query::{HouseholdQuery, HouseholdSort, Page},
};

use crate::{
  Result,
  encode::{
    HOUSEHOLD_COLUMNS, RawHousehold, RawHouseholdRow, encode_dt,
    encode_household_status, encode_uuid, now,
  },
  listing::{Listing, Predicate, into_page, order_by},
  store::{delete_by_id, ensure_reference, ensure_unique, not_found, on_conflict},
};

const FROM: &str = "households hh LEFT JOIN wards wd ON wd.ward_id = hh.ward_id";

const OWNER_TAKEN: &str =
  "SELECT 1 FROM households WHERE owner_number = ?1 AND house_id IS NOT ?2";

fn row_columns() -> String { format!("{HOUSEHOLD_COLUMNS}, wd.ward_name") }

fn sort_expr(key: HouseholdSort) -> &'static str {
  match key {
    HouseholdSort::HouseId => "hh.house_id",
    HouseholdSort::OwnerNumber => "hh.owner_number",
    HouseholdSort::Address => "hh.address",
    HouseholdSort::WardId => "hh.ward_id",
    HouseholdSort::DateCreated => "hh.date_created",
    HouseholdSort::DateUpdated => "hh.date_updated",
    HouseholdSort::Status => "hh.status",
    HouseholdSort::WardName => "wd.ward_name",
  }
}

pub fn list(conn: &Connection, query: &HouseholdQuery) -> Result<Page<HouseholdRow>> {
  let mut predicate = Predicate::new();
  if let Some(term) = query.filter.search_term() {
    predicate.any_contains(&["hh.owner_number", "hh.address"], term);
  }
  if let Some(ward) = query.filter.ward_term() {
    predicate.any_contains(&["wd.ward_name"], ward);
  }
  predicate.created_within("hh.date_created", &query.filter.created);

  let listing = Listing {
    columns: row_columns(),
    from: FROM,
    predicate,
    order_by: order_by(sort_expr(query.sort_by), query.sort_order, "hh.house_id"),
    page: query.page,
  };
  let (raw, total) = listing.run(conn, RawHouseholdRow::read)?;
  into_page(raw, total, query.page, RawHouseholdRow::into_row)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<HouseholdRow>> {
  conn
    .query_row(
      &format!("SELECT {} FROM {FROM} WHERE hh.house_id = ?1", row_columns()),
      [encode_uuid(id)],
      RawHouseholdRow::read,
    )
    .optional()?
    .map(RawHouseholdRow::into_row)
    .transpose()
}

fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Household>> {
  conn
    .query_row(
      &format!("SELECT {HOUSEHOLD_COLUMNS} FROM households hh WHERE hh.house_id = ?1"),
      [encode_uuid(id)],
      |r| RawHousehold::read(r, 0),
    )
    .optional()?
    .map(RawHousehold::into_household)
    .transpose()
}

pub fn add(conn: &Connection, input: NewHousehold) -> Result<Household> {
  ensure_unique(
    conn,
    Entity::Household,
    "ownerNumber",
    OWNER_TAKEN,
    &input.owner_number,
    None,
  )?;
  if let Some(ward) = input.ward_id {
    ensure_reference(conn, "wardId", Entity::Ward, encode_uuid(ward))?;
  }
  if let Some(tracker) = input.tracker_id {
    ensure_reference(conn, "trackerId", Entity::Tracker, tracker)?;
  }

  let created = now();
  let household = Household {
    house_id:     Uuid::new_v4(),
    owner_number: input.owner_number,
    address:      input.address,
    status:       input.status,
    ward_id:      input.ward_id,
    tracker_id:   input.tracker_id,
    date_created: created,
    date_updated: created,
  };

  on_conflict(
    conn.execute(
      "INSERT INTO households
         (house_id, owner_number, address, status, ward_id, tracker_id,
          date_created, date_updated)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        encode_uuid(household.house_id),
        household.owner_number,
        household.address,
        encode_household_status(household.status),
        household.ward_id.map(encode_uuid),
        household.tracker_id,
        encode_dt(household.date_created),
        encode_dt(household.date_updated),
      ],
    ),
    Entity::Household,
    "ownerNumber",
    &household.owner_number,
  )?;

  debug!(house_id = %household.house_id, "household inserted");
  Ok(household)
}

/// Applies the supplied fields and stamps `date_updated`, even when the
/// values are unchanged.
pub fn update(conn: &Connection, id: Uuid, patch: HouseholdPatch) -> Result<Household> {
  let current = fetch(conn, id)?.ok_or_else(|| not_found(Entity::Household, id))?;
  let id_str = encode_uuid(id);

  if let Some(owner) = &patch.owner_number {
    ensure_unique(
      conn,
      Entity::Household,
      "ownerNumber",
      OWNER_TAKEN,
      owner,
      Some(id_str.as_str()),
    )?;
  }
  if let Some(ward) = patch.ward_id.as_set() {
    ensure_reference(conn, "wardId", Entity::Ward, encode_uuid(*ward))?;
  }
  if let Some(tracker) = patch.tracker_id.as_set() {
    ensure_reference(conn, "trackerId", Entity::Tracker, *tracker)?;
  }

  let household = Household {
    owner_number: patch.owner_number.unwrap_or(current.owner_number),
    address: patch.address.unwrap_or(current.address),
    status: patch.status.unwrap_or(current.status),
    ward_id: patch.ward_id.apply(current.ward_id),
    tracker_id: patch.tracker_id.apply(current.tracker_id),
    date_updated: now(),
    ..current
  };

  on_conflict(
    conn.execute(
      "UPDATE households
          SET owner_number = ?2, address = ?3, status = ?4, ward_id = ?5,
              tracker_id = ?6, date_updated = ?7
        WHERE house_id = ?1",
      params![
        id_str,
        household.owner_number,
        household.address,
        encode_household_status(household.status),
        household.ward_id.map(encode_uuid),
        household.tracker_id,
        encode_dt(household.date_updated),
      ],
    ),
    Entity::Household,
    "ownerNumber",
    &household.owner_number,
  )?;
  Ok(household)
}

/// Scan logs and citizen reports for the household cascade away; a tracker
/// pointing at it is kept with a null household.
pub fn delete(conn: &Connection, id: Uuid) -> Result<()> {
  delete_by_id(
    conn,
    Entity::Household,
    "DELETE FROM households WHERE house_id = ?1",
    id,
  )
}
