//! Plain-text and JSON presentation of command results.

use std::fmt::Write as _;

use cadastro_core::patient::{NameMatch, PatientRecord};
use chrono::NaiveDate;
use serde::Serialize;

pub struct Output {
  json: bool,
}

impl Output {
  pub fn new(json: bool) -> Self { Self { json } }

  /// Print `value` as JSON, or `text()` otherwise.
  pub fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      let text = text();
      if !text.is_empty() {
        println!("{text}");
      }
    }
    Ok(())
  }
}

/// A record as shown to the user, with the age derived from the birth date.
#[derive(Serialize)]
pub struct RecordView<'a> {
  #[serde(flatten)]
  pub record: &'a PatientRecord,
  pub age:    Option<u32>,
}

impl<'a> RecordView<'a> {
  pub fn new(record: &'a PatientRecord, today: NaiveDate) -> Self {
    Self {
      record,
      age: record.data.birth.age_on(today),
    }
  }
}

pub fn record_text(view: &RecordView<'_>) -> String {
  let r = view.record;
  let d = &r.data;
  let birth = [&d.birth.day, &d.birth.month, &d.birth.year]
    .into_iter()
    .flatten()
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(" ");

  let mut out = String::new();
  let mut line = |label: &str, value: &str| {
    if !value.is_empty() {
      let _ = writeln!(out, "{label:<12} {value}");
    }
  };
  line("Registro", &r.id.to_string());
  line("Nome", &d.name);
  line("Sexo", d.sex.map(|s| s.label()).unwrap_or(""));
  line("Cartão", d.card.as_deref().unwrap_or(""));
  line("Nascimento", &birth);
  line("Idade", &view.age.map(|a| format!("{a} anos")).unwrap_or_default());
  line("Endereço", d.address.as_deref().unwrap_or(""));
  line("Cidade", d.city.as_deref().unwrap_or(""));
  line("Estado", d.state.as_deref().unwrap_or(""));
  line("CEP", d.postal_code.as_deref().unwrap_or(""));
  line("Plano", &r.plan.name);
  line("Telefone", &d.phone);
  line("Celular", d.mobile.as_deref().unwrap_or(""));
  out.trim_end().to_owned()
}

pub fn ambiguous_text(matches: &[NameMatch]) -> String {
  let mut out = format!(
    "{} patients match; open one by record number with `open --id`:\n",
    matches.len()
  );
  for m in matches {
    let _ = writeln!(out, "{:>6}  {}", m.id.get(), m.name);
  }
  out.trim_end().to_owned()
}
