//! The form controller: the state a registration front end keeps between
//! user actions.
//!
//! The only state is the *active record*, the id of the patient currently
//! loaded in the form. Save and remove target it when set and otherwise
//! resolve the patient by name and phone.

use crate::{
  Error,
  patient::{NameMatch, PatientData, PatientId, PatientRecord},
  store::PatientStore,
};

/// Outcome of [`FormController::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
  Inserted(PatientId),
  Updated(PatientId),
}

impl Saved {
  pub fn id(self) -> PatientId {
    match self {
      Saved::Inserted(id) | Saved::Updated(id) => id,
    }
  }
}

/// Outcome of a lookup by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
  NotFound,
  /// Exactly one match; it is now the active record.
  Opened(PatientRecord),
  /// Several matches. The caller must pick one by id.
  Ambiguous(Vec<NameMatch>),
}

/// Owns the store handle and the active record.
pub struct FormController<S> {
  store:  S,
  active: Option<PatientId>,
}

impl<S: PatientStore> FormController<S> {
  pub fn new(store: S) -> Self { Self { store, active: None } }

  pub fn store(&self) -> &S { &self.store }

  pub fn store_mut(&mut self) -> &mut S { &mut self.store }

  pub fn active(&self) -> Option<PatientId> { self.active }

  /// Make `id` the active record without loading it.
  pub fn select(&mut self, id: PatientId) { self.active = Some(id); }

  /// Start a new, blank record.
  pub fn clear(&mut self) { self.active = None; }

  /// Persist the form.
  ///
  /// The plan is resolved (and created if new) first. The target row is the
  /// active record, or else the single patient with the same name and phone;
  /// with neither, a new patient is inserted. The saved id becomes active.
  pub fn save(&mut self, data: &PatientData, plan: &str) -> Result<Saved, S::Error> {
    data.validate()?;
    let plan_id = self.store.get_or_create_plan(plan)?;

    let saved = match self.resolve(&data.name, &data.phone)? {
      Some(id) => {
        self.store.update_patient(id, data, plan_id)?;
        Saved::Updated(id)
      }
      None => Saved::Inserted(self.store.insert_patient(data, plan_id)?),
    };

    self.active = Some(saved.id());
    Ok(saved)
  }

  /// Delete the active record, or the patient matching `name` and `phone`.
  ///
  /// Returns the id that was removed, if any. The form is cleared unless the
  /// lookup or the delete fails.
  pub fn remove(&mut self, name: &str, phone: &str) -> Result<Option<PatientId>, S::Error> {
    let removed = match self.resolve(name, phone)? {
      Some(id) if self.store.delete_patient(id)? => Some(id),
      _ => None,
    };
    self.active = None;
    Ok(removed)
  }

  /// Open the patient whose name starts with `prefix`.
  pub fn open_prefix(&mut self, prefix: &str) -> Result<Lookup, S::Error> {
    if prefix.is_empty() {
      return Err(Error::Validation("name").into());
    }
    let matches = self.store.find_by_name_prefix(prefix)?;
    self.open_matches(matches)
  }

  /// Open the patient called exactly `name`.
  pub fn open_exact(&mut self, name: &str) -> Result<Lookup, S::Error> {
    let matches = self.store.find_by_exact_name(name)?;
    self.open_matches(matches)
  }

  /// Load a patient by id and make it the active record.
  pub fn open_id(&mut self, id: PatientId) -> Result<PatientRecord, S::Error> {
    let record = self.store.get_patient(id)?;
    self.active = Some(id);
    Ok(record)
  }

  fn open_matches(&mut self, matches: Vec<NameMatch>) -> Result<Lookup, S::Error> {
    match matches.len() {
      0 => Ok(Lookup::NotFound),
      1 => {
        let id = matches[0].id;
        Ok(Lookup::Opened(self.open_id(id)?))
      }
      _ => Ok(Lookup::Ambiguous(matches)),
    }
  }

  fn resolve(&self, name: &str, phone: &str) -> Result<Option<PatientId>, S::Error> {
    match self.active {
      Some(id) => Ok(Some(id)),
      None => self.store.find_id_by_name_and_phone(name.trim(), phone.trim()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn saved_exposes_id() {
    assert_eq!(Saved::Inserted(PatientId::new(1)).id(), PatientId::new(1));
    assert_eq!(Saved::Updated(PatientId::new(9)).id(), PatientId::new(9));
  }
}
