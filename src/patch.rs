use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

use crate::error::ApiError;

/// One field of a merge-patch body.
///
/// A missing key leaves the stored value alone, an explicit `null` clears it
/// and any other value replaces it. Fields must carry `#[serde(default)]` so
/// that a missing key becomes `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// RFC 3339 timestamp as a patch value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Rfc3339(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

impl<T> Patch<T> {
    #[cfg(test)]
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Merge into a nullable column.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }

    /// Merge into a non-nullable column; `null` is rejected.
    pub fn apply_required(self, slot: &mut T, field: &str) -> Result<(), ApiError> {
        match self {
            Patch::Absent => Ok(()),
            Patch::Null => Err(ApiError::BadRequest(format!("{field} cannot be null"))),
            Patch::Value(v) => {
                *slot = v;
                Ok(())
            }
        }
    }

    /// The supplied value of a non-nullable field, if any.
    pub fn into_required(self, field: &str) -> Result<Option<T>, ApiError> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(ApiError::BadRequest(format!("{field} cannot be null"))),
            Patch::Value(v) => Ok(Some(v)),
        }
    }
}
