//! [`SqliteStore`]: the SQLite implementation of [`PlanRegistry`] and
//! [`PatientStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, params};

use cadastro_core::{
  Error as CoreError,
  patient::{NameMatch, PatientData, PatientEntry, PatientId, PatientRecord},
  plan::{PlanId, normalize_plan_name},
  store::{PatientStore, PlanRegistry},
};

use crate::{
  Error, Result,
  encode::{PATIENT_COLUMNS, RawPatient, encode_opt, encode_sex},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A patient registry backed by a single SQLite file.
///
/// The connection is opened by [`SqliteStore::open`] and closed when the
/// store is dropped.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    let store = Self { conn };
    store.init_schema()?;
    tracing::debug!(path = %path.display(), "opened patient store");
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────
//
// Free functions over `&Connection` so the same statements run both directly
// and inside the import transaction.

fn select_plan_id(conn: &Connection, normalized: &str) -> Result<Option<PlanId>> {
  Ok(
    conn
      .query_row(
        "SELECT id FROM planos WHERE nome = ?1",
        params![normalized],
        |row| row.get::<_, i64>(0),
      )
      .optional()?
      .map(PlanId::new),
  )
}

fn get_or_create_plan(conn: &Connection, name: &str) -> Result<PlanId> {
  let name = normalize_plan_name(name).ok_or(CoreError::Validation("plan"))?;

  if let Some(id) = select_plan_id(conn, &name)? {
    return Ok(id);
  }

  conn.execute("INSERT INTO planos (nome) VALUES (?1)", params![name])?;
  let id = PlanId::new(conn.last_insert_rowid());
  tracing::debug!(%id, plan = %name, "created plan");
  Ok(id)
}

fn ensure_plan_exists(conn: &Connection, plan_id: PlanId) -> Result<()> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM planos WHERE id = ?1",
      params![plan_id.get()],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  if exists {
    Ok(())
  } else {
    Err(CoreError::PlanNotFound(plan_id).into())
  }
}

fn insert_patient(conn: &Connection, data: &PatientData, plan_id: PlanId) -> Result<PatientId> {
  data.validate()?;
  ensure_plan_exists(conn, plan_id)?;

  conn.execute(
    "INSERT INTO pacientes (
       nome, sexo, cartao, dia_nasc, mes_nasc, ano_nasc,
       endereco, cidade, estado, cep, telefone, celular, plano_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    params![
      data.name.trim(),
      encode_sex(data.sex),
      encode_opt(&data.card),
      encode_opt(&data.birth.day),
      encode_opt(&data.birth.month),
      encode_opt(&data.birth.year),
      encode_opt(&data.address),
      encode_opt(&data.city),
      encode_opt(&data.state),
      encode_opt(&data.postal_code),
      data.phone.trim(),
      encode_opt(&data.mobile),
      plan_id.get(),
    ],
  )?;

  let id = PatientId::new(conn.last_insert_rowid());
  tracing::debug!(%id, %plan_id, "inserted patient");
  Ok(id)
}

fn query_matches(conn: &Connection, sql: &str, arg: &str) -> Result<Vec<NameMatch>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params![arg], |row| {
      Ok(NameMatch {
        name: row.get(0)?,
        id:   PatientId::new(row.get(1)?),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Clear both tables, then create plans and insert patients in two passes.
fn fill(conn: &Connection, entries: &[PatientEntry]) -> Result<usize> {
  conn.execute("DELETE FROM pacientes", [])?;
  conn.execute("DELETE FROM planos", [])?;

  let plan_ids = entries
    .iter()
    .enumerate()
    .map(|(index, entry)| {
      get_or_create_plan(conn, &entry.plan).map_err(|e| import_error(index, entry, e))
    })
    .collect::<Result<Vec<_>>>()?;

  for (index, (entry, plan_id)) in entries.iter().zip(plan_ids).enumerate() {
    insert_patient(conn, &entry.data, plan_id).map_err(|e| import_error(index, entry, e))?;
  }

  Ok(entries.len())
}

fn import_error(index: usize, entry: &PatientEntry, source: Error) -> Error {
  Error::ImportRecord {
    index,
    name: entry.data.name.clone(),
    source: Box::new(source),
  }
}

// ─── PlanRegistry impl ───────────────────────────────────────────────────────

impl PlanRegistry for SqliteStore {
  type Error = Error;

  fn get_or_create_plan(&self, name: &str) -> Result<PlanId> {
    get_or_create_plan(&self.conn, name)
  }

  fn plan_id(&self, name: &str) -> Result<Option<PlanId>> {
    match normalize_plan_name(name) {
      Some(name) => select_plan_id(&self.conn, &name),
      None => Ok(None),
    }
  }

  fn plan_names(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("SELECT nome FROM planos ORDER BY nome")?;
    let names = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
  }
}

// ─── PatientStore impl ───────────────────────────────────────────────────────

impl PatientStore for SqliteStore {
  // ── Writes ────────────────────────────────────────────────────────────────

  fn insert_patient(&self, data: &PatientData, plan_id: PlanId) -> Result<PatientId> {
    insert_patient(&self.conn, data, plan_id)
  }

  fn update_patient(&self, id: PatientId, data: &PatientData, plan_id: PlanId) -> Result<()> {
    data.validate()?;
    ensure_plan_exists(&self.conn, plan_id)?;

    let affected = self.conn.execute(
      "UPDATE pacientes SET
         nome = ?2, sexo = ?3, cartao = ?4, dia_nasc = ?5, mes_nasc = ?6,
         ano_nasc = ?7, endereco = ?8, cidade = ?9, estado = ?10, cep = ?11,
         telefone = ?12, celular = ?13, plano_id = ?14
       WHERE id = ?1",
      params![
        id.get(),
        data.name.trim(),
        encode_sex(data.sex),
        encode_opt(&data.card),
        encode_opt(&data.birth.day),
        encode_opt(&data.birth.month),
        encode_opt(&data.birth.year),
        encode_opt(&data.address),
        encode_opt(&data.city),
        encode_opt(&data.state),
        encode_opt(&data.postal_code),
        data.phone.trim(),
        encode_opt(&data.mobile),
        plan_id.get(),
      ],
    )?;

    if affected == 0 {
      return Err(CoreError::PatientNotFound(id).into());
    }
    tracing::debug!(%id, %plan_id, "updated patient");
    Ok(())
  }

  fn delete_patient(&self, id: PatientId) -> Result<bool> {
    let affected = self
      .conn
      .execute("DELETE FROM pacientes WHERE id = ?1", params![id.get()])?;
    tracing::debug!(%id, removed = affected > 0, "delete patient");
    Ok(affected > 0)
  }

  fn replace_all(&mut self, entries: &[PatientEntry]) -> Result<usize> {
    let tx = self.conn.transaction()?;

    match fill(&tx, entries) {
      Ok(count) => {
        tx.commit()?;
        tracing::info!(patients = count, "replaced patient registry");
        Ok(count)
      }
      Err(e) => {
        if let Err(rollback) = tx.rollback() {
          tracing::error!(error = %rollback, "rollback of registry import failed");
        }
        tracing::warn!(error = %e, "registry import rolled back");
        Err(e)
      }
    }
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  fn find_by_name_prefix(&self, prefix: &str) -> Result<Vec<NameMatch>> {
    // substr() rather than LIKE: LIKE folds ASCII case and treats `%`/`_`
    // in the prefix as wildcards.
    query_matches(
      &self.conn,
      "SELECT nome, id FROM pacientes
       WHERE substr(nome, 1, length(?1)) = ?1
       ORDER BY nome, id",
      prefix,
    )
  }

  fn find_by_exact_name(&self, name: &str) -> Result<Vec<NameMatch>> {
    query_matches(
      &self.conn,
      "SELECT nome, id FROM pacientes WHERE nome = ?1 ORDER BY nome, id",
      name,
    )
  }

  fn find_id_by_name_and_phone(&self, name: &str, phone: &str) -> Result<Option<PatientId>> {
    let mut stmt = self
      .conn
      .prepare("SELECT id FROM pacientes WHERE nome = ?1 AND telefone = ?2 ORDER BY id")?;
    let ids = stmt
      .query_map(params![name, phone], |row| row.get::<_, i64>(0))?
      .map(|id| id.map(PatientId::new))
      .collect::<rusqlite::Result<Vec<_>>>()?;

    match ids.len() {
      0 => Ok(None),
      1 => Ok(Some(ids[0])),
      _ => Err(
        CoreError::DuplicatePatient {
          name: name.to_owned(),
          phone: phone.to_owned(),
          ids,
        }
        .into(),
      ),
    }
  }

  fn get_patient(&self, id: PatientId) -> Result<PatientRecord> {
    let raw = self
      .conn
      .query_row(
        &format!(
          "SELECT {PATIENT_COLUMNS}
           FROM pacientes p
           JOIN planos pl ON pl.id = p.plano_id
           WHERE p.id = ?1"
        ),
        params![id.get()],
        RawPatient::from_row,
      )
      .optional()?;

    match raw {
      Some(raw) => raw.into_record(),
      None => Err(CoreError::PatientNotFound(id).into()),
    }
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  fn patient_names(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("SELECT nome FROM pacientes ORDER BY nome")?;
    let names = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
  }

  fn patient_ids(&self) -> Result<Vec<PatientId>> {
    let mut stmt = self.conn.prepare("SELECT id FROM pacientes ORDER BY id")?;
    let ids = stmt
      .query_map([], |row| row.get::<_, i64>(0))?
      .map(|id| id.map(PatientId::new))
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
  }

  fn patient_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .query_row("SELECT COUNT(*) FROM pacientes", [], |row| row.get(0))?;
    Ok(count as u64)
  }

  fn patient_entries(&self) -> Result<Vec<PatientEntry>> {
    let mut stmt = self.conn.prepare(&format!(
      "SELECT {PATIENT_COLUMNS}
       FROM pacientes p
       JOIN planos pl ON pl.id = p.plano_id
       ORDER BY p.nome, p.id"
    ))?;
    let raws = stmt
      .query_map([], RawPatient::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter().map(RawPatient::into_entry).collect()
  }
}
