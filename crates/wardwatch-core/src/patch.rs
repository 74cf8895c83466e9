//! Sparse update fields.
//!
//! An update body distinguishes three states per nullable field: the field is
//! absent (keep the stored value), explicitly `null` (clear it), or carries a
//! value (replace it). Non-nullable fields use a plain `Option<T>` where
//! `None` means "keep".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a sparse update.
///
/// Use with `#[serde(default, skip_serializing_if = "Patch::is_keep")]` so an
/// absent key deserialises to [`Patch::Keep`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
  #[default]
  Keep,
  Clear,
  Set(T),
}

impl<T> Patch<T> {
  pub fn is_keep(&self) -> bool { matches!(self, Self::Keep) }

  /// Resolve against the currently stored value.
  pub fn apply(self, current: Option<T>) -> Option<T> {
    match self {
      Self::Keep => current,
      Self::Clear => None,
      Self::Set(v) => Some(v),
    }
  }

  /// The value being written, if any.
  pub fn as_set(&self) -> Option<&T> {
    match self {
      Self::Set(v) => Some(v),
      _ => None,
    }
  }
}

impl<T> From<Option<T>> for Patch<T> {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::Clear, Self::Set)
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    Option::<T>::deserialize(d).map(Self::from)
  }
}

impl<T: Serialize> Serialize for Patch<T> {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Set(v) => s.serialize_some(v),
      Self::Keep | Self::Clear => s.serialize_none(),
    }
  }
}
