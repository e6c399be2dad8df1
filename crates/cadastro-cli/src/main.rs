//! `cadastro`: command-line front end for the patient registry.
//!
//! # Usage
//!
//! ```text
//! cadastro save --name "Ana Silva" --phone 111 --plan Unimed --sex feminino
//! cadastro open "Ana"
//! cadastro open --id 3
//! cadastro remove --name "Ana Silva" --phone 111
//! cadastro export patients.xml
//! cadastro import patients.xml --replace
//! ```
//!
//! The database file comes from `--store`, else `CADASTRO_STORE_PATH`, else
//! `store_path` in the config file (`--config`, default `cadastro.toml`),
//! else `patients.sdb`.

mod cli;
mod commands;
mod render;
mod settings;

use anyhow::Context as _;
use cadastro_core::form::FormController;
use cadastro_store_sqlite::SqliteStore;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{cli::Cli, render::Output, settings::Settings};

fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays clean for `--json`.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)?;
  let store_path = match cli.store {
    Some(path) => settings::expand_tilde(&path),
    None => settings.store_path,
  };

  let store = SqliteStore::open(&store_path)
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let mut form = FormController::new(store);

  commands::run(&mut form, cli.command, &Output::new(cli.json))
}
