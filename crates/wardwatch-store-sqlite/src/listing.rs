//! Shared machinery for filtered, sorted, paginated listings.
//!
//! A [`Listing`] owns one FROM clause and one [`Predicate`]; the count query
//! and the data query are both rendered from them.

use rusqlite::{
  Connection, Row,
  functions::FunctionFlags,
  params_from_iter,
  types::Value,
};
use wardwatch_core::query::{DateRange, Page, PageRequest, Pagination, SortOrder};

use crate::encode::encode_dt;

// ─── Predicate ───────────────────────────────────────────────────────────────

/// A conjunction of SQL conditions with their positional parameters.
#[derive(Debug, Default)]
pub struct Predicate {
  clauses: Vec<String>,
  params:  Vec<Value>,
}

impl Predicate {
  pub fn new() -> Self { Self::default() }

  /// True when any of `columns` contains `term` as a case-insensitive
  /// substring. Both sides go through [`casefold`], so non-ASCII letters
  /// compare without case too.
  pub fn any_contains(&mut self, columns: &[&str], term: &str) {
    if columns.is_empty() {
      return;
    }
    let pattern = like_pattern(&casefold(term));
    let alternatives: Vec<String> = columns
      .iter()
      .map(|c| {
        self.params.push(Value::Text(pattern.clone()));
        format!("{CASEFOLD}({c}) LIKE ? ESCAPE '\\'")
      })
      .collect();
    self.clauses.push(format!("({})", alternatives.join(" OR ")));
  }

  /// Inclusive range on a timestamp column; one bound gives a one-sided
  /// inequality and no bounds add nothing.
  pub fn created_within(&mut self, column: &str, range: &DateRange) {
    match (range.from, range.to) {
      (Some(from), Some(to)) => {
        self.clauses.push(format!("{column} BETWEEN ? AND ?"));
        self.params.push(Value::Text(encode_dt(from)));
        self.params.push(Value::Text(encode_dt(to)));
      }
      (Some(from), None) => {
        self.clauses.push(format!("{column} >= ?"));
        self.params.push(Value::Text(encode_dt(from)));
      }
      (None, Some(to)) => {
        self.clauses.push(format!("{column} <= ?"));
        self.params.push(Value::Text(encode_dt(to)));
      }
      (None, None) => {}
    }
  }

  pub fn equals(&mut self, column: &str, value: impl Into<Value>) {
    self.clauses.push(format!("{column} = ?"));
    self.params.push(value.into());
  }

  /// `" WHERE a AND b"`, or an empty string when there are no conditions.
  pub fn where_clause(&self) -> String {
    if self.clauses.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", self.clauses.join(" AND "))
    }
  }

  pub fn params(&self) -> &[Value] { &self.params }
}

// ─── Case folding ────────────────────────────────────────────────────────────

/// Name of the SQL scalar function installed by [`register_functions`].
pub const CASEFOLD: &str = "casefold";

/// Lowercase with full Unicode rules. SQLite's own `LIKE` only folds ASCII.
pub fn casefold(text: &str) -> String { text.to_lowercase() }

/// Install `casefold(text)` on `conn`. NULL folds to NULL.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    CASEFOLD,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| casefold(&text))),
  )
}

/// Wrap `term` in `%…%`, escaping LIKE metacharacters so it matches
/// literally.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for ch in term.chars() {
    if matches!(ch, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(ch);
  }
  out.push('%');
  out
}

/// `"{expr} ASC|DESC, {tie_break} ASC"`
pub fn order_by(expr: &str, order: SortOrder, tie_break: &str) -> String {
  let dir = match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  };
  format!("{expr} {dir}, {tie_break} ASC")
}

// ─── Listing ─────────────────────────────────────────────────────────────────

pub struct Listing {
  pub columns:   String,
  pub from:      &'static str,
  pub predicate: Predicate,
  pub order_by:  String,
  pub page:      PageRequest,
}

impl Listing {
  pub fn count_sql(&self) -> String {
    format!("SELECT COUNT(*) FROM {}{}", self.from, self.predicate.where_clause())
  }

  pub fn data_sql(&self) -> String {
    format!(
      "SELECT {} FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
      self.columns,
      self.from,
      self.predicate.where_clause(),
      self.order_by,
    )
  }

  /// Count the full filtered set, then fetch the requested page.
  pub fn run<T>(
    &self,
    conn: &Connection,
    read: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
  ) -> rusqlite::Result<(Vec<T>, u64)> {
    let total: i64 = conn.query_row(
      &self.count_sql(),
      params_from_iter(self.predicate.params()),
      |r| r.get(0),
    )?;

    let mut params = self.predicate.params().to_vec();
    params.push(Value::Integer(i64::from(self.page.limit())));
    params.push(Value::Integer(
      i64::try_from(self.page.offset()).unwrap_or(i64::MAX),
    ));

    let mut stmt = conn.prepare(&self.data_sql())?;
    let rows = stmt
      .query_map(params_from_iter(params), |r| read(r))?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((rows, total.max(0) as u64))
  }
}

/// Decode a fetched page and attach its pagination summary.
pub fn into_page<R, T>(
  raw: Vec<R>,
  total: u64,
  page: PageRequest,
  decode: impl Fn(R) -> crate::Result<T>,
) -> crate::Result<Page<T>> {
  let items = raw.into_iter().map(decode).collect::<crate::Result<Vec<_>>>()?;
  Ok(Page { items, pagination: Pagination::new(page, total) })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_metacharacters() {
    assert_eq!(like_pattern("East"), "%East%");
    assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
  }

  #[test]
  fn count_and_data_share_the_predicate() {
    let mut predicate = Predicate::new();
    predicate.any_contains(&["a.x", "a.y"], "q");
    predicate.equals("a.z", 1_i64);
    let listing = Listing {
      columns: "a.x".into(),
      from: "things a",
      predicate,
      order_by: order_by("a.x", SortOrder::Asc, "a.id"),
      page: PageRequest::default(),
    };

    let where_clause =
      " WHERE (casefold(a.x) LIKE ? ESCAPE '\\' OR casefold(a.y) LIKE ? ESCAPE '\\') AND a.z = ?";
    assert_eq!(listing.count_sql(), format!("SELECT COUNT(*) FROM things a{where_clause}"));
    assert_eq!(
      listing.data_sql(),
      format!("SELECT a.x FROM things a{where_clause} ORDER BY a.x ASC, a.id ASC LIMIT ? OFFSET ?")
    );
    assert_eq!(listing.predicate.params().len(), 3);
  }

  #[test]
  fn search_pattern_is_folded() {
    let mut predicate = Predicate::new();
    predicate.any_contains(&["a.x"], "ÉDOUARD");
    assert_eq!(predicate.params(), &[Value::Text("%édouard%".into())]);
  }

  #[test]
  fn casefold_function_folds_non_ascii() {
    let conn = Connection::open_in_memory().unwrap();
    register_functions(&conn).unwrap();
    let folded: String = conn
      .query_row("SELECT casefold('ÉDOUARD Straße')", [], |r| r.get(0))
      .unwrap();
    assert_eq!(folded, "édouard straße");
    let null: Option<String> =
      conn.query_row("SELECT casefold(NULL)", [], |r| r.get(0)).unwrap();
    assert_eq!(null, None);
  }

  #[test]
  fn empty_predicate_renders_no_where() {
    assert_eq!(Predicate::new().where_clause(), "");
  }
}
