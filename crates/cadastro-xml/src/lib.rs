//! XML interchange for the Cadastro patient registry.
//!
//! The interchange document is distinct from the database schema:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <pacientes>
//! <pac sexo="Feminino" cartao="" dia_nasc="01" mes_nasc="Janeiro"
//!      ano_nasc="1950" endereco="" cidade="Recife" plano="UNIMED" estado="PE"
//!      cep="" telefone="111" celular="">Ana Silva</pac>
//! </pacientes>
//! ```
//!
//! The patient name is element text; every other field is an attribute. The
//! plan travels by name because plan ids are local to one database.

pub mod error;
mod interchange;
mod parse;
mod serialize;

pub use error::{Error, Result};
pub use interchange::{export, export_to_path, import, import_from_path};
pub use parse::parse;
pub use serialize::serialize;

/// Root element name.
pub const ROOT: &str = "pacientes";

/// Per-patient element name.
pub const PATIENT: &str = "pac";

/// Attribute names, in the order they are written.
pub const ATTRIBUTES: [&str; 12] = [
  "sexo", "cartao", "dia_nasc", "mes_nasc", "ano_nasc", "endereco", "cidade",
  "plano", "estado", "cep", "telefone", "celular",
];
