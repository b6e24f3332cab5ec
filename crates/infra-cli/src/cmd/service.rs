use crate::output::emit;
use anyhow::Context;
use clap::Subcommand;
use infra_core::services::{self, Removal, Service};
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum ServiceSubcommand {
    /// List services recorded in SERVICES.md
    List,

    /// Append a service row, creating SERVICES.md if needed
    Add {
        name: String,
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        framework: Option<String>,
        #[arg(long)]
        port: Option<String>,
        #[arg(long)]
        path: Option<String>,
    },

    /// Remove a service row by name (case-insensitive)
    Remove { name: String },
}

pub fn run(root: &Path, subcmd: ServiceSubcommand, raw: bool) -> anyhow::Result<()> {
    match subcmd {
        ServiceSubcommand::List => list(root, raw),
        ServiceSubcommand::Add {
            name,
            kind,
            language,
            framework,
            port,
            path,
        } => {
            let mut service = Service::new(name);
            let defaults = service.clone();
            service.kind = kind.unwrap_or(defaults.kind);
            service.language = language.unwrap_or(defaults.language);
            service.framework = framework.unwrap_or(defaults.framework);
            service.port = port.unwrap_or(defaults.port);
            service.path = path.unwrap_or(defaults.path);
            add(root, &service, raw)
        }
        ServiceSubcommand::Remove { name } => remove(root, &name, raw),
    }
}

fn list(root: &Path, raw: bool) -> anyhow::Result<()> {
    let services = services::list(root).context("failed to read SERVICES.md")?;
    let count = services.len();
    emit(
        &json!({ "count": count, "services": services }),
        raw,
        count.to_string(),
    )
}

fn add(root: &Path, service: &Service, raw: bool) -> anyhow::Result<()> {
    let created = services::add(root, service).context("failed to write SERVICES.md")?;
    emit(
        &json!({ "added": true, "service": service.name, "created_file": created }),
        raw,
        "added",
    )
}

fn remove(root: &Path, name: &str, raw: bool) -> anyhow::Result<()> {
    match services::remove(root, name).context("failed to update SERVICES.md")? {
        Removal::Removed => emit(&json!({ "removed": true, "service": name }), raw, "true"),
        Removal::FileMissing => emit(
            &json!({ "removed": false, "reason": "SERVICES.md not found" }),
            raw,
            "false",
        ),
        Removal::NotFound => emit(
            &json!({ "removed": false, "reason": format!("Service \"{name}\" not found") }),
            raw,
            "false",
        ),
    }
}
