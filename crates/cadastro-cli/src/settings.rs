//! Layered configuration: defaults, then the TOML file, then `CADASTRO_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_STORE_PATH: &str = "patients.sdb";

#[derive(Debug, Deserialize)]
pub struct Settings {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl Settings {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("CADASTRO"))
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
