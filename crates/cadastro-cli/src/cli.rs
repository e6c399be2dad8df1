use std::path::PathBuf;

use cadastro_core::patient::{BirthDate, PatientData, PatientId, Sex};
use clap::{Args, Parser, Subcommand, ValueEnum};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cadastro", version, about = "Patient registry for a medical practice")]
pub struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "cadastro.toml")]
  pub config: PathBuf,

  /// Database file; overrides the config file and environment.
  #[arg(long, value_name = "PATH")]
  pub store: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  pub json: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create a patient, or update the one with the same name and phone.
  Save(SaveArgs),
  /// Look a patient up by name prefix, exact name or record number.
  Open(OpenArgs),
  /// Delete a patient.
  Remove(RemoveArgs),
  /// List patient names, record numbers or plan names.
  List {
    #[arg(value_enum, default_value_t = Listing::Names)]
    what: Listing,
  },
  /// Number of registered patients.
  Count,
  /// Replace the whole registry with the contents of an XML file.
  Import {
    file:    PathBuf,
    /// Confirm that every existing patient and plan will be deleted.
    #[arg(long)]
    replace: bool,
  },
  /// Write the whole registry to an XML file.
  Export { file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listing {
  Names,
  Ids,
  Plans,
}

// ─── save ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct SaveArgs {
  /// Update this record instead of matching on name and phone.
  #[arg(long)]
  pub id: Option<PatientId>,

  #[arg(long)]
  pub name:  String,
  #[arg(long)]
  pub phone: String,
  /// Plan name; created if it does not exist yet.
  #[arg(long)]
  pub plan:  String,

  /// `masculino`/`m` or `feminino`/`f`.
  #[arg(long, value_parser = parse_sex)]
  pub sex:         Option<Sex>,
  #[arg(long)]
  pub card:        Option<String>,
  #[arg(long)]
  pub birth_day:   Option<String>,
  /// Month number or name (`3`, `Março`).
  #[arg(long)]
  pub birth_month: Option<String>,
  #[arg(long)]
  pub birth_year:  Option<String>,
  #[arg(long)]
  pub address:     Option<String>,
  #[arg(long)]
  pub city:        Option<String>,
  #[arg(long)]
  pub state:       Option<String>,
  #[arg(long)]
  pub postal_code: Option<String>,
  #[arg(long)]
  pub mobile:      Option<String>,
}

impl SaveArgs {
  /// Split into the form fields and the plan name.
  pub fn into_form(self) -> (PatientData, String) {
    let data = PatientData {
      name:        self.name,
      sex:         self.sex,
      card:        self.card,
      birth:       BirthDate {
        day:   self.birth_day,
        month: self.birth_month,
        year:  self.birth_year,
      },
      address:     self.address,
      city:        self.city,
      state:       self.state,
      postal_code: self.postal_code,
      phone:       self.phone,
      mobile:      self.mobile,
    };
    (data, self.plan)
  }
}

fn parse_sex(s: &str) -> Result<Sex, String> {
  match s.trim().to_lowercase().as_str() {
    "m" | "masculino" => Ok(Sex::Male),
    "f" | "feminino" => Ok(Sex::Female),
    other => Err(format!("unknown sex {other:?}; expected masculino or feminino")),
  }
}

// ─── open / remove ────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct OpenArgs {
  /// Leading characters of the name (case-sensitive).
  pub prefix: Option<String>,
  /// Full name, matched exactly.
  #[arg(long)]
  pub exact:  Option<String>,
  /// Record number.
  #[arg(long)]
  pub id:     Option<PatientId>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
  /// Record number.
  #[arg(long, conflicts_with_all = ["name", "phone"])]
  pub id:    Option<PatientId>,
  #[arg(long, required_unless_present = "id")]
  pub name:  Option<String>,
  #[arg(long, required_unless_present = "id")]
  pub phone: Option<String>,
}
