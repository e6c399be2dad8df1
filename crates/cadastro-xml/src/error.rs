//! Error types for the XML interchange.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed XML: {0}")]
  Xml(String),

  #[error("unexpected root element <{0}>, expected <pacientes>")]
  UnexpectedRoot(String),

  #[error("patient #{} has no {attribute:?} attribute", .index + 1)]
  MissingAttribute {
    index:     usize,
    attribute: &'static str,
  },

  #[error("patient #{} has an invalid {attribute:?} value: {value:?}", .index + 1)]
  InvalidAttribute {
    index:     usize,
    attribute: &'static str,
    value:     String,
  },

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
