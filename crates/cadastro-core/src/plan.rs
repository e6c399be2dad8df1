//! Health plans. A plan is created the first time a patient references its
//! name and is never modified afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Surrogate key of a row in `planos`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlanId(i64);

impl PlanId {
  pub const fn new(id: i64) -> Self { Self(id) }

  pub const fn get(self) -> i64 { self.0 }
}

impl From<i64> for PlanId {
  fn from(id: i64) -> Self { Self(id) }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A health plan row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
  pub id:   PlanId,
  pub name: String,
}

/// Canonical form of a plan name: trimmed and upper-cased.
///
/// Returns `None` for a name that is empty after trimming.
pub fn normalize_plan_name(name: &str) -> Option<String> {
  let trimmed = name.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}
