//! One handler per subcommand, all driving the same [`FormController`].

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use cadastro_core::{
  form::{FormController, Lookup, Saved},
  store::{PatientStore, PlanRegistry},
};
use serde_json::json;

use crate::{
  cli::{Command, Listing, OpenArgs, RemoveArgs, SaveArgs},
  render::{self, Output, RecordView},
};

pub fn run<S>(form: &mut FormController<S>, command: Command, out: &Output) -> Result<()>
where
  S: PatientStore,
{
  match command {
    Command::Save(args) => save(form, args, out),
    Command::Open(args) => open(form, args, out),
    Command::Remove(args) => remove(form, args, out),
    Command::List { what } => list(form.store(), what, out),
    Command::Count => {
      let count = form.store().patient_count()?;
      out.print(&json!({ "patients": count }), || count.to_string())
    }
    Command::Import { file, replace } => import(form.store_mut(), &file, replace, out),
    Command::Export { file } => {
      let count = cadastro_xml::export_to_path(form.store(), &file)
        .with_context(|| format!("failed to export to {}", file.display()))?;
      out.print(&json!({ "exported": count, "file": file }), || {
        format!("exported {count} patients to {}", file.display())
      })
    }
  }
}

fn save<S: PatientStore>(form: &mut FormController<S>, args: SaveArgs, out: &Output) -> Result<()> {
  if let Some(id) = args.id {
    form.select(id);
  }
  let (data, plan) = args.into_form();
  let saved = form.save(&data, &plan).context("patient not saved")?;

  let (status, verb) = match saved {
    Saved::Inserted(_) => ("inserted", "registered"),
    Saved::Updated(_) => ("updated", "updated"),
  };
  let id = saved.id();
  out.print(&json!({ "status": status, "id": id }), || {
    format!("{verb} {} as record {id}", data.name.trim())
  })
}

fn open<S: PatientStore>(form: &mut FormController<S>, args: OpenArgs, out: &Output) -> Result<()> {
  let (lookup, query) = match (args.id, args.exact, args.prefix) {
    (Some(id), ..) => (Lookup::Opened(form.open_id(id)?), id.to_string()),
    (None, Some(name), _) => (form.open_exact(&name)?, name),
    (None, None, Some(prefix)) => (form.open_prefix(&prefix)?, prefix),
    (None, None, None) => bail!("nothing to look up"),
  };

  match lookup {
    Lookup::Opened(record) => {
      let view = RecordView::new(&record, chrono::Local::now().date_naive());
      out.print(&view, || render::record_text(&view))
    }
    Lookup::Ambiguous(matches) => {
      out.print(&json!({ "ambiguous": matches }), || render::ambiguous_text(&matches))
    }
    Lookup::NotFound => bail!("no patient matches {query:?}"),
  }
}

fn remove<S: PatientStore>(form: &mut FormController<S>, args: RemoveArgs, out: &Output) -> Result<()> {
  if let Some(id) = args.id {
    form.select(id);
  }
  let name = args.name.unwrap_or_default();
  let phone = args.phone.unwrap_or_default();
  let removed = form.remove(&name, &phone)?;

  match removed {
    Some(id) => out.print(&json!({ "removed": id }), || format!("removed record {id}")),
    None => bail!("no matching patient"),
  }
}

fn list<S: PatientStore>(store: &S, what: Listing, out: &Output) -> Result<()> {
  match what {
    Listing::Names => {
      let names = store.patient_names()?;
      out.print(&names, || names.join("\n"))
    }
    Listing::Ids => {
      let ids = store.patient_ids()?;
      out.print(&ids, || {
        ids.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
      })
    }
    Listing::Plans => {
      let plans = store.plan_names()?;
      out.print(&plans, || plans.join("\n"))
    }
  }
}

fn import<S: PatientStore>(store: &mut S, file: &Path, replace: bool, out: &Output) -> Result<()> {
  if !replace {
    bail!(
      "import deletes every patient and plan before loading {}; pass --replace to confirm",
      file.display()
    );
  }
  let count = cadastro_xml::import_from_path(store, file)
    .with_context(|| format!("failed to import {}", file.display()))?;
  out.print(&json!({ "imported": count }), || format!("imported {count} patients"))
}
