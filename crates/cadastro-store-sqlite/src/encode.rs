//! Conversions between domain types and the plain-text columns stored in
//! SQLite.
//!
//! Optional fields are stored as `NULL` when absent *or* empty, so the two
//! read back identically as `None`.

use cadastro_core::{
  patient::{BirthDate, PatientData, PatientEntry, PatientId, PatientRecord, Sex},
  plan::{Plan, PlanId},
};

use crate::Result;

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Projection shared by every query that reads a full patient row.
pub const PATIENT_COLUMNS: &str = "
  p.id, p.nome, p.sexo, p.cartao, p.dia_nasc, p.mes_nasc, p.ano_nasc,
  p.endereco, p.cidade, p.estado, p.cep, p.telefone, p.celular,
  pl.id, pl.nome
";

// ─── Text ────────────────────────────────────────────────────────────────────

pub fn encode_opt(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

pub fn encode_sex(sex: Option<Sex>) -> Option<&'static str> { sex.map(Sex::label) }

pub fn decode_sex(label: Option<&str>) -> Result<Option<Sex>> {
  match label {
    Some(l) => Ok(Sex::from_label(l)?),
    None => Ok(None),
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A patient row joined with its plan, before domain validation.
pub struct RawPatient {
  pub id:          i64,
  pub name:        String,
  pub sex:         Option<String>,
  pub card:        Option<String>,
  pub birth_day:   Option<String>,
  pub birth_month: Option<String>,
  pub birth_year:  Option<String>,
  pub address:     Option<String>,
  pub city:        Option<String>,
  pub state:       Option<String>,
  pub postal_code: Option<String>,
  pub phone:       String,
  pub mobile:      Option<String>,
  pub plan_id:     i64,
  pub plan_name:   String,
}

impl RawPatient {
  /// Read a row selected with [`PATIENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPatient {
      id:          row.get(0)?,
      name:        row.get(1)?,
      sex:         row.get(2)?,
      card:        row.get(3)?,
      birth_day:   row.get(4)?,
      birth_month: row.get(5)?,
      birth_year:  row.get(6)?,
      address:     row.get(7)?,
      city:        row.get(8)?,
      state:       row.get(9)?,
      postal_code: row.get(10)?,
      phone:       row.get(11)?,
      mobile:      row.get(12)?,
      plan_id:     row.get(13)?,
      plan_name:   row.get(14)?,
    })
  }

  pub fn into_record(self) -> Result<PatientRecord> {
    let sex = decode_sex(self.sex.as_deref())?;
    Ok(PatientRecord {
      id:   PatientId::new(self.id),
      data: PatientData {
        name: self.name,
        sex,
        card: self.card,
        birth: BirthDate {
          day:   self.birth_day,
          month: self.birth_month,
          year:  self.birth_year,
        },
        address: self.address,
        city: self.city,
        state: self.state,
        postal_code: self.postal_code,
        phone: self.phone,
        mobile: self.mobile,
      }
      .normalized(),
      plan: Plan {
        id:   PlanId::new(self.plan_id),
        name: self.plan_name,
      },
    })
  }

  pub fn into_entry(self) -> Result<PatientEntry> {
    Ok(self.into_record()?.into_entry())
  }
}
