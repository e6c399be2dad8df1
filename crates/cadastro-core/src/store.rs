//! The `PlanRegistry` and `PatientStore` traits.
//!
//! Implemented by storage backends (e.g. `cadastro-store-sqlite`). The form
//! controller and the XML interchange depend on these traits, not on any
//! concrete backend.

use crate::{
  patient::{NameMatch, PatientData, PatientEntry, PatientId, PatientRecord},
  plan::PlanId,
};

// ─── Plans ───────────────────────────────────────────────────────────────────

/// Health plans keyed by their upper-cased name.
pub trait PlanRegistry {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  /// Return the id of the plan called `name`, creating it on first use.
  ///
  /// Names are trimmed and upper-cased, so `"unimed"` and `"Unimed"` resolve
  /// to the same row. An empty name is a validation error.
  fn get_or_create_plan(&self, name: &str) -> Result<PlanId, Self::Error>;

  /// Case-insensitive lookup. `None` if no such plan exists.
  fn plan_id(&self, name: &str) -> Result<Option<PlanId>, Self::Error>;

  /// All plan names, ascending.
  fn plan_names(&self) -> Result<Vec<String>, Self::Error>;
}

// ─── Patients ────────────────────────────────────────────────────────────────

/// CRUD and lookup over patient records.
pub trait PatientStore: PlanRegistry {
  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a new patient and return its generated id.
  ///
  /// `name` and `phone` must be non-empty and `plan_id` must exist.
  fn insert_patient(
    &self,
    data: &PatientData,
    plan_id: PlanId,
  ) -> Result<PatientId, Self::Error>;

  /// Overwrite every field of an existing patient.
  ///
  /// Fails with [`crate::Error::PatientNotFound`] rather than inserting when
  /// `id` does not exist.
  fn update_patient(
    &self,
    id: PatientId,
    data: &PatientData,
    plan_id: PlanId,
  ) -> Result<(), Self::Error>;

  /// Remove a patient. Returns `false` (and does nothing) if `id` is absent.
  fn delete_patient(&self, id: PatientId) -> Result<bool, Self::Error>;

  /// Replace the whole registry with `entries` in one transaction.
  ///
  /// Both tables are cleared, every referenced plan is created, then every
  /// patient is inserted. On any failure nothing changes. Returns the number
  /// of patients written.
  fn replace_all(&mut self, entries: &[PatientEntry]) -> Result<usize, Self::Error>;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// Case-sensitive prefix match on the name, ordered by name.
  fn find_by_name_prefix(&self, prefix: &str) -> Result<Vec<NameMatch>, Self::Error>;

  /// Exact name match, ordered by name.
  fn find_by_exact_name(&self, name: &str) -> Result<Vec<NameMatch>, Self::Error>;

  /// Resolve the natural key. More than one match is a
  /// [`crate::Error::DuplicatePatient`], never a silent pick.
  fn find_id_by_name_and_phone(
    &self,
    name: &str,
    phone: &str,
  ) -> Result<Option<PatientId>, Self::Error>;

  /// Full record joined with its plan.
  fn get_patient(&self, id: PatientId) -> Result<PatientRecord, Self::Error>;

  // ── Listings ──────────────────────────────────────────────────────────

  /// Every patient name, ascending. Repeats are kept.
  fn patient_names(&self) -> Result<Vec<String>, Self::Error>;

  /// Every patient id, ascending.
  fn patient_ids(&self) -> Result<Vec<PatientId>, Self::Error>;

  fn patient_count(&self) -> Result<u64, Self::Error>;

  /// Every patient with its plan name, ordered by patient name.
  fn patient_entries(&self) -> Result<Vec<PatientEntry>, Self::Error>;
}
