//! Interchange document reader.
//!
//! The whole document is read before anything is returned, so a malformed
//! file is rejected before the caller touches the database.

use cadastro_core::patient::{PatientData, PatientEntry, Sex, non_empty};
use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};

use crate::{Error, PATIENT, ROOT, Result};

/// A `pac` element whose text content is still being collected.
struct Pending {
  data: PatientData,
  plan: String,
  text: String,
}

impl Pending {
  fn finish(self) -> PatientEntry {
    PatientEntry {
      data: PatientData {
        name: self.text.trim().to_owned(),
        ..self.data
      },
      plan: self.plan,
    }
  }
}

/// Parse an interchange document into entries, in document order.
///
/// Absent and empty attributes both read as `None`. A `pac` element without a
/// non-empty `plano` attribute is rejected. Unknown attributes and elements
/// are ignored.
pub fn parse(document: &str) -> Result<Vec<PatientEntry>> {
  let mut reader = Reader::from_str(document);

  let mut entries: Vec<PatientEntry> = Vec::new();
  let mut pending: Option<Pending> = None;
  let mut depth = 0usize;
  let mut seen_root = false;

  loop {
    let event = reader
      .read_event()
      .map_err(|e| Error::Xml(format!("at byte {}: {e}", reader.buffer_position())))?;

    match event {
      Event::Start(ref e) => {
        if depth == 0 {
          check_root(e, seen_root)?;
          seen_root = true;
        } else if depth == 1 && e.name().as_ref() == PATIENT.as_bytes() {
          pending = Some(read_patient(e, entries.len())?);
        }
        depth += 1;
      }
      Event::Empty(ref e) => {
        if depth == 0 {
          check_root(e, seen_root)?;
          seen_root = true;
        } else if depth == 1 && e.name().as_ref() == PATIENT.as_bytes() {
          entries.push(read_patient(e, entries.len())?.finish());
        }
      }
      Event::Text(ref e) if depth == 2 => {
        if let Some(p) = pending.as_mut() {
          let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
          p.text.push_str(&text);
        }
      }
      Event::CData(e) if depth == 2 => {
        if let Some(p) = pending.as_mut() {
          p.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
        }
      }
      Event::End(_) => {
        depth = depth.saturating_sub(1);
        if depth == 1 {
          if let Some(p) = pending.take() {
            entries.push(p.finish());
          }
        }
      }
      Event::Eof => break,
      _ => {}
    }
  }

  if !seen_root {
    return Err(Error::Xml("document has no root element".into()));
  }
  if depth != 0 {
    return Err(Error::Xml("unexpected end of document".into()));
  }

  Ok(entries)
}

fn check_root(e: &BytesStart<'_>, seen_root: bool) -> Result<()> {
  if seen_root {
    return Err(Error::Xml("more than one root element".into()));
  }
  let name = e.name();
  if name.as_ref() != ROOT.as_bytes() {
    return Err(Error::UnexpectedRoot(
      String::from_utf8_lossy(name.as_ref()).into_owned(),
    ));
  }
  Ok(())
}

fn read_patient(e: &BytesStart<'_>, index: usize) -> Result<Pending> {
  let mut data = PatientData::default();
  let mut plan: Option<String> = None;

  for attr in e.attributes() {
    let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
    let value = attr
      .unescape_value()
      .map_err(|e| Error::Xml(e.to_string()))?
      .into_owned();
    let value = non_empty(Some(value));

    match attr.key.as_ref() {
      b"sexo" => {
        let label = value.unwrap_or_default();
        data.sex = Sex::from_label(&label).map_err(|_| Error::InvalidAttribute {
          index,
          attribute: "sexo",
          value: label.clone(),
        })?;
      }
      b"cartao" => data.card = value,
      b"dia_nasc" => data.birth.day = value,
      b"mes_nasc" => data.birth.month = value,
      b"ano_nasc" => data.birth.year = value,
      b"endereco" => data.address = value,
      b"cidade" => data.city = value,
      b"plano" => plan = value,
      b"estado" => data.state = value,
      b"cep" => data.postal_code = value,
      b"telefone" => data.phone = value.unwrap_or_default(),
      b"celular" => data.mobile = value,
      _ => {}
    }
  }

  let plan = plan
    .filter(|p| !p.trim().is_empty())
    .ok_or(Error::MissingAttribute { index, attribute: "plano" })?;

  Ok(Pending {
    data,
    plan,
    text: String::new(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const TWO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pacientes>
<pac sexo="Feminino" cartao="0042" dia_nasc="01" mes_nasc="Janeiro" ano_nasc="1950" endereco="Rua A &amp; B" cidade="Recife" plano="UNIMED" estado="PE" cep="50000" telefone="111" celular="">
    Ana Silva
</pac>
<pac sexo="" cartao="" dia_nasc="" mes_nasc="" ano_nasc="" endereco="" cidade="" plano="Amil" estado="" cep="" telefone="222" celular="">Bruno</pac>
</pacientes>
"#;

  #[test]
  fn parses_entries_in_order() {
    let entries = parse(TWO).unwrap();
    assert_eq!(entries.len(), 2);

    let ana = &entries[0];
    assert_eq!(ana.data.name, "Ana Silva");
    assert_eq!(ana.data.sex, Some(Sex::Female));
    assert_eq!(ana.data.card.as_deref(), Some("0042"));
    assert_eq!(ana.data.birth.month.as_deref(), Some("Janeiro"));
    assert_eq!(ana.data.address.as_deref(), Some("Rua A & B"));
    assert_eq!(ana.data.mobile, None);
    assert_eq!(ana.plan, "UNIMED");

    let bruno = &entries[1];
    assert_eq!(bruno.data, PatientData::new("Bruno", "222"));
    assert_eq!(bruno.plan, "Amil");
  }

  #[test]
  fn empty_root_has_no_entries() {
    assert!(parse("<pacientes/>").unwrap().is_empty());
    assert!(parse("<pacientes>\n</pacientes>").unwrap().is_empty());
  }

  #[test]
  fn missing_plan_is_rejected() {
    let xml = r#"<pacientes>
      <pac plano="Amil" telefone="1">A</pac>
      <pac telefone="2">B</pac>
    </pacientes>"#;
    let err = parse(xml).unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { index: 1, attribute: "plano" }));
  }

  #[test]
  fn blank_plan_is_rejected() {
    let err = parse(r#"<pacientes><pac plano="  " telefone="2">B</pac></pacientes>"#)
      .unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { index: 0, .. }));
  }

  #[test]
  fn unknown_sex_is_rejected() {
    let err = parse(r#"<pacientes><pac sexo="X" plano="A" telefone="2">B</pac></pacientes>"#)
      .unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidAttribute { index: 0, attribute: "sexo", ref value } if value == "X"
    ));
  }

  #[test]
  fn none_sex_reads_as_unset() {
    let xml = r#"<pacientes>
<pac sexo="None" cartao="" dia_nasc="" mes_nasc="" ano_nasc="" endereco="" cidade="" plano="UNIMED" estado="" cep="" telefone="111" celular="">Ana</pac>
</pacientes>"#;
    let entries = parse(xml).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].data.sex, None);
    assert_eq!(entries[0].plan, "UNIMED");
  }

  #[test]
  fn wrong_root_is_rejected() {
    let err = parse("<patients><pac plano=\"A\">B</pac></patients>").unwrap_err();
    assert!(matches!(err, Error::UnexpectedRoot(ref r) if r == "patients"));
  }

  #[test]
  fn malformed_documents_are_rejected() {
    for xml in [
      "",
      "not xml at all",
      "<pacientes><pac plano=\"A\">B</pacientes>",
      "<pacientes><pac plano=\"A\">B</pac>",
      "<pacientes/><pacientes/>",
    ] {
      assert!(parse(xml).is_err(), "accepted {xml:?}");
    }
  }

  #[test]
  fn unknown_attributes_and_children_are_ignored() {
    let xml = r#"<pacientes>
      <pac plano="A" telefone="1" extra="x">Ana</pac>
      <nota>ignored</nota>
    </pacientes>"#;
    let entries = parse(xml).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].data.name, "Ana");
  }

  #[test]
  fn escaped_whitespace_in_attributes_survives() {
    let xml = r#"<pacientes><pac plano="A" telefone="1" endereco="a&#10;b">Ana</pac></pacientes>"#;
    let entries = parse(xml).unwrap();
    assert_eq!(entries[0].data.address.as_deref(), Some("a\nb"));
  }

  #[test]
  fn cdata_name_is_read() {
    let xml = r#"<pacientes><pac plano="A" telefone="1"><![CDATA[Ana & Bia]]></pac></pacientes>"#;
    assert_eq!(parse(xml).unwrap()[0].data.name, "Ana & Bia");
  }
}
