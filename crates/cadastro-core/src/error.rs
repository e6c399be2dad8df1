//! Error types for `cadastro-core`.

use thiserror::Error;

use crate::{patient::PatientId, plan::PlanId};

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was left empty.
  #[error("required field is empty: {0}")]
  Validation(&'static str),

  #[error("patient not found: {0}")]
  PatientNotFound(PatientId),

  #[error("plan not found: {0}")]
  PlanNotFound(PlanId),

  /// More than one patient shares the name and phone used to resolve an
  /// identifier. Never resolved silently.
  #[error(
    "more than one patient named {name:?} with phone {phone:?} (records {})",
    join_ids(.ids)
  )]
  DuplicatePatient {
    name:  String,
    phone: String,
    ids:   Vec<PatientId>,
  },

  #[error("unknown sex label: {0:?}")]
  UnknownSex(String),
}

fn join_ids(ids: &[PatientId]) -> String {
  ids
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_message_lists_ids() {
    let err = Error::DuplicatePatient {
      name:  "Ana Silva".into(),
      phone: "111".into(),
      ids:   vec![PatientId::new(3), PatientId::new(7)],
    };
    assert_eq!(
      err.to_string(),
      "more than one patient named \"Ana Silva\" with phone \"111\" (records 3, 7)"
    );
  }
}
