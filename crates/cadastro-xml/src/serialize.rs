//! Interchange document writer.

use std::borrow::Cow;

use cadastro_core::patient::PatientEntry;
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attribute},
  name::QName,
};

use crate::{ATTRIBUTES, Error, PATIENT, ROOT, Result};

/// Write `entries` as an interchange document, one `pac` element per line.
pub fn serialize(entries: &[PatientEntry]) -> Result<String> {
  let mut w = Writer::new(Vec::new());

  emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
  newline(&mut w);
  emit(&mut w, Event::Start(BytesStart::new(ROOT)))?;
  newline(&mut w);

  for entry in entries {
    write_patient(&mut w, entry)?;
    newline(&mut w);
  }

  emit(&mut w, Event::End(BytesEnd::new(ROOT)))?;
  newline(&mut w);

  String::from_utf8(w.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

fn write_patient(w: &mut Writer<Vec<u8>>, entry: &PatientEntry) -> Result<()> {
  let data = &entry.data;
  let values: [&str; 12] = [
    data.sex.map(|s| s.label()).unwrap_or(""),
    text(&data.card),
    text(&data.birth.day),
    text(&data.birth.month),
    text(&data.birth.year),
    text(&data.address),
    text(&data.city),
    &entry.plan,
    text(&data.state),
    text(&data.postal_code),
    &data.phone,
    text(&data.mobile),
  ];

  let mut el = BytesStart::new(PATIENT);
  for (key, value) in ATTRIBUTES.iter().zip(values) {
    el.push_attribute(Attribute {
      key:   QName(key.as_bytes()),
      value: Cow::Owned(escape_attr(value).into_bytes()),
    });
  }

  emit(w, Event::Start(el))?;
  emit(w, Event::Text(BytesText::new(&data.name)))?;
  emit(w, Event::End(BytesEnd::new(PATIENT)))
}

fn text(value: &Option<String>) -> &str { value.as_deref().unwrap_or("") }

/// Escape an attribute value, including whitespace characters that a reader
/// would otherwise normalise to spaces.
fn escape_attr(value: &str) -> String {
  quick_xml::escape::escape(value)
    .replace('\n', "&#10;")
    .replace('\r', "&#13;")
    .replace('\t', "&#9;")
}

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
  w.write_event(event).map_err(|e| Error::Xml(e.to_string()))
}

fn newline(w: &mut Writer<Vec<u8>>) { w.get_mut().push(b'\n'); }
