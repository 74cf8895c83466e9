//! Error types for `wardwatch-core`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The kind of row a domain error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Ward,
  Worker,
  Household,
  Tracker,
  ScanLog,
  CitizenReport,
}

impl Entity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ward => "ward",
      Self::Worker => "worker",
      Self::Household => "household",
      Self::Tracker => "tracker",
      Self::ScanLog => "scan log",
      Self::CitizenReport => "citizen report",
    }
  }
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: Uuid },

  /// A unique field already holds `value` on another row.
  #[error("{entity} already exists with {field} {value:?}")]
  Conflict {
    entity: Entity,
    field:  &'static str,
    value:  String,
  },

  /// A supplied foreign key does not resolve to an existing row.
  #[error("{field} references a {target} that does not exist: {id}")]
  MissingReference {
    field:  &'static str,
    target: Entity,
    id:     String,
  },

  #[error("no wards exist to assign workers to")]
  NoWards,

  #[error("invalid {field}: {message}")]
  InvalidValue { field: &'static str, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
