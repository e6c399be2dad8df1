//! Patient records and the field types they are built from.
//!
//! Every field except `name` and `phone` is optional free text. An empty
//! string and an absent value mean the same thing; see [`non_empty`].

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, plan::Plan};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Surrogate key of a row in `pacientes`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
  pub const fn new(id: i64) -> Self { Self(id) }

  pub const fn get(self) -> i64 { self.0 }
}

impl From<i64> for PatientId {
  fn from(id: i64) -> Self { Self(id) }
}

impl fmt::Display for PatientId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for PatientId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    s.trim().parse().map(Self)
  }
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

/// Sex as offered by the registration form. The labels are what gets stored
/// in the database and written to interchange documents.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
pub enum Sex {
  #[strum(serialize = "Masculino")]
  #[serde(rename = "Masculino")]
  Male,
  #[strum(serialize = "Feminino")]
  #[serde(rename = "Feminino")]
  Female,
}

/// Text stored for an unset sex by registries predating this crate.
const UNSET_LABEL: &str = "None";

impl Sex {
  /// Parse a stored label. Empty input and the literal `None` (which older
  /// registries wrote for an unset choice) are "no value".
  pub fn from_label(label: &str) -> Result<Option<Self>> {
    let label = label.trim();
    if label.is_empty() || label == UNSET_LABEL {
      return Ok(None);
    }
    label
      .parse()
      .map(Some)
      .map_err(|_| Error::UnknownSex(label.to_owned()))
  }

  pub fn label(self) -> &'static str {
    match self {
      Sex::Male => "Masculino",
      Sex::Female => "Feminino",
    }
  }
}

// ─── Birth date ──────────────────────────────────────────────────────────────

/// Month names accepted in [`BirthDate::month`], in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
  "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho",
  "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// Day, month and year exactly as typed. Not validated on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
  pub day:   Option<String>,
  /// Either a number (`"3"`) or a month name (`"Março"`).
  pub month: Option<String>,
  pub year:  Option<String>,
}

impl BirthDate {
  /// The date these parts describe, if they form a real calendar date.
  pub fn to_date(&self) -> Option<NaiveDate> {
    let day: u32 = self.day.as_deref()?.trim().parse().ok()?;
    let month = parse_month(self.month.as_deref()?)?;
    let year: i32 = self.year.as_deref()?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
  }

  /// Age in whole years on `today`. `None` when the parts are not a valid
  /// date or the date lies after `today`.
  pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
    let born = self.to_date()?;
    if born > today {
      return None;
    }
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
      years -= 1;
    }
    u32::try_from(years).ok()
  }
}

fn parse_month(month: &str) -> Option<u32> {
  let month = month.trim();
  if let Ok(n) = month.parse::<u32>() {
    return (1..=12).contains(&n).then_some(n);
  }
  MONTH_NAMES
    .iter()
    .position(|name| name.to_lowercase() == month.to_lowercase())
    .map(|i| i as u32 + 1)
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Every user-editable patient field except the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientData {
  pub name:        String,
  pub sex:         Option<Sex>,
  pub card:        Option<String>,
  pub birth:       BirthDate,
  pub address:     Option<String>,
  pub city:        Option<String>,
  /// Two-letter state code; not validated.
  pub state:       Option<String>,
  pub postal_code: Option<String>,
  pub phone:       String,
  pub mobile:      Option<String>,
}

impl PatientData {
  pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      phone: phone.into(),
      ..Self::default()
    }
  }

  /// Check the fields every patient must have.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("name"));
    }
    if self.phone.trim().is_empty() {
      return Err(Error::Validation("phone"));
    }
    Ok(())
  }

  /// Collapse empty optional fields to `None`.
  pub fn normalized(self) -> Self {
    Self {
      card: non_empty(self.card),
      birth: BirthDate {
        day:   non_empty(self.birth.day),
        month: non_empty(self.birth.month),
        year:  non_empty(self.birth.year),
      },
      address: non_empty(self.address),
      city: non_empty(self.city),
      state: non_empty(self.state),
      postal_code: non_empty(self.postal_code),
      mobile: non_empty(self.mobile),
      ..self
    }
  }
}

/// A patient together with its plan name: the unit of bulk export/import.
/// Plan ids are local to one database, so interchange goes by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientEntry {
  #[serde(flatten)]
  pub data: PatientData,
  pub plan: String,
}

/// A stored patient joined with its plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
  pub id:   PatientId,
  #[serde(flatten)]
  pub data: PatientData,
  pub plan: Plan,
}

impl PatientRecord {
  pub fn into_entry(self) -> PatientEntry {
    PatientEntry {
      data: self.data,
      plan: self.plan.name,
    }
  }
}

/// One row of a name lookup, used to disambiguate by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMatch {
  pub name: String,
  pub id:   PatientId,
}

/// `None` for absent or empty text.
pub fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn birth(day: &str, month: &str, year: &str) -> BirthDate {
    BirthDate {
      day:   Some(day.into()),
      month: Some(month.into()),
      year:  Some(year.into()),
    }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn sex_labels_round_trip() {
    assert_eq!(Sex::Male.to_string(), "Masculino");
    assert_eq!(Sex::Female.label(), "Feminino");
    assert_eq!(Sex::from_label("Feminino").unwrap(), Some(Sex::Female));
    assert_eq!(Sex::from_label("").unwrap(), None);
  }

  #[test]
  fn none_literal_is_an_unset_sex() {
    assert_eq!(Sex::from_label("None").unwrap(), None);
    assert_eq!(Sex::from_label(" None ").unwrap(), None);
    assert!(Sex::from_label("none").is_err());
  }

  #[test]
  fn unknown_sex_label_is_rejected() {
    let err = Sex::from_label("Outro").unwrap_err();
    assert!(matches!(err, Error::UnknownSex(ref l) if l == "Outro"));
  }

  #[test]
  fn sex_serializes_as_label() {
    assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"Masculino\"");
  }

  #[test]
  fn age_with_month_name() {
    let b = birth("01", "Janeiro", "1950");
    assert_eq!(b.age_on(date(2026, 10, 16)), Some(76));
  }

  #[test]
  fn age_before_birthday_this_year() {
    let b = birth("20", "Outubro", "2000");
    assert_eq!(b.age_on(date(2026, 10, 16)), Some(25));
    assert_eq!(b.age_on(date(2026, 10, 20)), Some(26));
  }

  #[test]
  fn age_with_numeric_month_or_lowercase_name() {
    assert_eq!(birth("5", "3", "1990").age_on(date(2026, 3, 5)), Some(36));
    assert_eq!(birth("5", "março", "1990").age_on(date(2026, 3, 4)), Some(35));
  }

  #[test]
  fn invalid_dates_have_no_age() {
    let today = date(2026, 10, 16);
    assert_eq!(birth("31", "Fevereiro", "1990").age_on(today), None);
    assert_eq!(birth("xx", "Janeiro", "1990").age_on(today), None);
    assert_eq!(birth("1", "13", "1990").age_on(today), None);
    assert_eq!(birth("1", "Janeiro", "2030").age_on(today), None);
    assert_eq!(BirthDate::default().age_on(today), None);
  }

  #[test]
  fn validate_requires_name_and_phone() {
    assert!(PatientData::new("Ana", "111").validate().is_ok());
    assert!(matches!(
      PatientData::new("  ", "111").validate(),
      Err(Error::Validation("name"))
    ));
    assert!(matches!(
      PatientData::new("Ana", "").validate(),
      Err(Error::Validation("phone"))
    ));
  }

  #[test]
  fn normalized_drops_empty_optionals() {
    let data = PatientData {
      card: Some(String::new()),
      city: Some("Recife".into()),
      birth: BirthDate {
        day: Some(String::new()),
        ..BirthDate::default()
      },
      ..PatientData::new("Ana", "111")
    }
    .normalized();
    assert_eq!(data.card, None);
    assert_eq!(data.birth.day, None);
    assert_eq!(data.city.as_deref(), Some("Recife"));
  }

  #[test]
  fn patient_id_parses_from_text() {
    assert_eq!(" 42 ".parse::<PatientId>().unwrap(), PatientId::new(42));
    assert!("abc".parse::<PatientId>().is_err());
  }
}
