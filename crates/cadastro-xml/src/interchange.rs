//! Bulk export and import between a [`PatientStore`] and interchange
//! documents.

use std::{
  fs,
  io::Write as _,
  path::Path,
};

use cadastro_core::store::PatientStore;
use tempfile::NamedTempFile;

use crate::{Error, Result, parse, serialize};

/// Serialise every patient in `store`, ordered by name.
pub fn export<S: PatientStore>(store: &S) -> Result<String> {
  let entries = store.patient_entries().map_err(Error::store)?;
  serialize(&entries)
}

/// Export to `path`, returning the number of patients written.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it only once complete, so a failed export leaves no partial file.
pub fn export_to_path<S: PatientStore>(store: &S, path: impl AsRef<Path>) -> Result<usize> {
  let path = path.as_ref();
  let entries = store.patient_entries().map_err(Error::store)?;
  let document = serialize(&entries)?;

  let dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  let mut tmp = NamedTempFile::new_in(dir)?;
  tmp.write_all(document.as_bytes())?;
  tmp.as_file().sync_all()?;
  tmp.persist(path).map_err(|e| Error::Io(e.error))?;

  tracing::info!(path = %path.display(), patients = entries.len(), "exported registry");
  Ok(entries.len())
}

/// Replace the contents of `store` with the patients in `document`.
///
/// The document is parsed in full first; a malformed document leaves the
/// store untouched. Returns the number of patients imported.
pub fn import<S: PatientStore>(store: &mut S, document: &str) -> Result<usize> {
  let entries = parse(document)?;
  let count = store.replace_all(&entries).map_err(Error::store)?;
  tracing::info!(patients = count, "imported registry");
  Ok(count)
}

/// Read `path` and [`import`] it.
pub fn import_from_path<S: PatientStore>(store: &mut S, path: impl AsRef<Path>) -> Result<usize> {
  let path = path.as_ref();
  let document = fs::read_to_string(path)?;
  tracing::debug!(path = %path.display(), bytes = document.len(), "read interchange document");
  import(store, &document)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use cadastro_core::{
    Error as CoreError,
    patient::{BirthDate, PatientData, PatientEntry, Sex},
    store::PlanRegistry,
  };
  use cadastro_store_sqlite::{Error as StoreError, SqliteStore};

  use super::*;

  fn store() -> SqliteStore { SqliteStore::open_in_memory().expect("in-memory store") }

  fn seeded() -> SqliteStore {
    let s = store();
    let unimed = s.get_or_create_plan("Unimed").unwrap();
    let amil = s.get_or_create_plan("Amil").unwrap();
    let ana = PatientData {
      sex: Some(Sex::Female),
      card: Some("0042".into()),
      birth: BirthDate {
        day:   Some("01".into()),
        month: Some("Janeiro".into()),
        year:  Some("1950".into()),
      },
      address: Some("Rua \"A\" & <B>\nfundos".into()),
      city: Some("Recife".into()),
      state: Some("PE".into()),
      postal_code: Some("50000-000".into()),
      mobile: Some("9999".into()),
      ..PatientData::new("Ana & Silva", "111")
    };
    s.insert_patient(&ana, unimed).unwrap();
    s.insert_patient(&PatientData::new("Bruno", "222"), amil).unwrap();
    s.insert_patient(&PatientData::new("Bruno", "222"), unimed).unwrap();
    s
  }

  fn snapshot(s: &SqliteStore) -> (Vec<PatientEntry>, BTreeSet<String>) {
    let mut entries = s.patient_entries().unwrap();
    entries.sort_by(|a, b| format!("{a:?}").cmp(&format!("{b:?}")));
    (entries, s.plan_names().unwrap().into_iter().collect())
  }

  fn store_error(err: &Error) -> &StoreError {
    match err {
      Error::Store(e) => e.downcast_ref::<StoreError>().expect("sqlite store error"),
      other => panic!("expected a store error, got {other}"),
    }
  }

  #[test]
  fn export_then_import_round_trips() {
    let source = seeded();
    let document = export(&source).unwrap();

    let mut target = store();
    target.get_or_create_plan("Stale").unwrap();
    let count = import(&mut target, &document).unwrap();

    assert_eq!(count, 3);
    assert_eq!(snapshot(&target), snapshot(&source));
  }

  #[test]
  fn import_two_records_with_distinct_plans() {
    let mut s = seeded();
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<pacientes>
<pac plano="Golden Cross" telefone="1">Carla</pac>
<pac plano="sulamerica" telefone="2">Davi</pac>
</pacientes>
"#;
    assert_eq!(import(&mut s, xml).unwrap(), 2);
    assert_eq!(s.plan_names().unwrap(), ["GOLDEN CROSS", "SULAMERICA"]);
    assert_eq!(s.patient_count().unwrap(), 2);
  }

  #[test]
  fn import_accepts_none_as_unset_sex() {
    let mut s = store();
    let xml = r#"<pacientes>
<pac sexo="None" plano="UNIMED" telefone="111">Ana</pac>
</pacientes>"#;

    assert_eq!(import(&mut s, xml).unwrap(), 1);
    let entries = s.patient_entries().unwrap();
    assert_eq!(entries[0].data.sex, None);
    assert!(export(&s).unwrap().contains("sexo=\"\""));
  }

  #[test]
  fn plan_less_record_rejects_whole_import() {
    let mut s = seeded();
    let before = snapshot(&s);
    let xml = r#"<pacientes>
<pac plano="Amil" telefone="1">Carla</pac>
<pac telefone="2">Davi</pac>
</pacientes>"#;

    let err = import(&mut s, xml).unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { index: 1, attribute: "plano" }));
    assert_eq!(snapshot(&s), before);
  }

  #[test]
  fn malformed_document_leaves_store_untouched() {
    let mut s = seeded();
    let before = snapshot(&s);

    assert!(matches!(
      import(&mut s, "<pacientes><pac plano=\"A\">x</pacientes>"),
      Err(Error::Xml(_))
    ));
    assert_eq!(snapshot(&s), before);
  }

  #[test]
  fn failing_record_rolls_back_import() {
    let mut s = seeded();
    let before = snapshot(&s);
    let xml = r#"<pacientes>
<pac plano="Amil" telefone="1">Carla</pac>
<pac plano="Amil" telefone="">Davi</pac>
</pacientes>"#;

    let err = import(&mut s, xml).unwrap_err();
    let inner = store_error(&err);
    assert!(matches!(inner, StoreError::ImportRecord { index: 1, .. }));
    assert!(matches!(inner.core(), Some(CoreError::Validation("phone"))));
    assert_eq!(snapshot(&s), before);
  }

  #[test]
  fn export_to_path_writes_complete_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.xml");
    let s = seeded();

    assert_eq!(export_to_path(&s, &path).unwrap(), 3);
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, export(&s).unwrap());

    let mut copy = store();
    assert_eq!(import_from_path(&mut copy, &path).unwrap(), 3);
    assert_eq!(snapshot(&copy), snapshot(&s));
  }

  #[test]
  fn export_to_missing_directory_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("patients.xml");

    let err = export_to_path(&seeded(), &path).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
  }

  #[test]
  fn import_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = seeded();
    let err = import_from_path(&mut s, dir.path().join("nope.xml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(s.patient_count().unwrap(), 3);
  }
}
