//! Error type for `cadastro-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] cadastro_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// A bulk import was rolled back because of this record.
  #[error("patient #{} ({name:?}) could not be imported: {source}", .index + 1)]
  ImportRecord {
    index:  usize,
    name:   String,
    source: Box<Error>,
  },
}

impl Error {
  /// The domain error behind this one, looking through import wrappers.
  pub fn core(&self) -> Option<&cadastro_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      Error::ImportRecord { source, .. } => source.core(),
      Error::Database(_) => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
