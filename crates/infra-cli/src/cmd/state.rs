use crate::output::{emit, print_json};
use anyhow::Context;
use clap::Subcommand;
use infra_core::context;
use infra_core::state::StateDoc;
use infra_core::types::Stage;
use serde_json::{json, Map, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum StateSubcommand {
    /// Load config, state and artifact existence (same as bare `state`)
    Load,

    /// Print the whole STATE.md, one `**Field:**` value, or one `## Section`
    Get {
        /// Field or section name (omit for the whole document)
        name: Option<String>,
    },

    /// Replace a single field value
    Update {
        field: Option<String>,
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Replace several fields at once: `--"Field Name" value ...`
    Patch {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Move the pipeline to a new stage and stamp Last Updated
    UpdateStage { stage: Option<String> },

    /// Count another detected service
    RecordService {
        name: Option<String>,
        /// Service type (default: unknown)
        #[arg(value_name = "TYPE")]
        kind: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: Option<StateSubcommand>, raw: bool) -> anyhow::Result<()> {
    match subcmd.unwrap_or(StateSubcommand::Load) {
        StateSubcommand::Load => load(root),
        StateSubcommand::Get { name } => get(root, name.as_deref(), raw),
        StateSubcommand::Update { field, value } => update(root, field, value),
        StateSubcommand::Patch { args } => {
            let (patches, raw_flag) = parse_patch_args(&args);
            patch(root, &patches, raw || raw_flag)
        }
        StateSubcommand::UpdateStage { stage } => update_stage(root, stage.as_deref(), raw),
        StateSubcommand::RecordService { name, kind } => {
            record_service(root, name.as_deref(), kind.as_deref(), raw)
        }
    }
}

fn load_doc(root: &Path) -> anyhow::Result<StateDoc> {
    Ok(StateDoc::load(root)?)
}

// ---------------------------------------------------------------------------
// load / get
// ---------------------------------------------------------------------------

fn load(root: &Path) -> anyhow::Result<()> {
    print_json(&context::state_snapshot(root))
}

fn get(root: &Path, name: Option<&str>, raw: bool) -> anyhow::Result<()> {
    let doc = load_doc(root)?;
    let Some(name) = name else {
        return emit(&json!({ "content": doc.content() }), raw, doc.content());
    };
    match doc.lookup(name)? {
        Some(value) => {
            let mut out = Map::new();
            out.insert(name.to_string(), Value::String(value.clone()));
            emit(&out, raw, value)
        }
        None => emit(
            &json!({ "error": format!("Section or field \"{name}\" not found") }),
            raw,
            "",
        ),
    }
}

// ---------------------------------------------------------------------------
// update / patch
// ---------------------------------------------------------------------------

fn update(root: &Path, field: Option<String>, value: Option<String>) -> anyhow::Result<()> {
    let (Some(field), Some(value)) = (field, value) else {
        anyhow::bail!("field and value required for state update");
    };
    let Ok(mut doc) = StateDoc::load(root) else {
        return print_json(&json!({ "updated": false, "reason": "STATE.md not found" }));
    };
    if doc.set_field(&field, &value)? {
        doc.save(root).context("failed to write STATE.md")?;
        print_json(&json!({ "updated": true }))
    } else {
        print_json(&json!({
            "updated": false,
            "reason": format!("Field \"{field}\" not found in STATE.md"),
        }))
    }
}

/// Pair up `--Field value` tokens. A `--` token without a following value is
/// ignored; a stray `--raw` turns on raw output.
fn parse_patch_args(args: &[String]) -> (Vec<(String, String)>, bool) {
    let mut patches = Vec::new();
    let mut raw = false;
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == "--raw" {
            raw = true;
            continue;
        }
        let Some(field) = arg.strip_prefix("--") else {
            continue;
        };
        if field.is_empty() {
            continue;
        }
        if let Some(value) = iter.next() {
            patches.push((field.to_string(), value.clone()));
        }
    }
    (patches, raw)
}

fn patch(root: &Path, patches: &[(String, String)], raw: bool) -> anyhow::Result<()> {
    let mut doc = load_doc(root)?;
    let report = doc.patch(patches)?;
    if !report.updated.is_empty() {
        doc.save(root).context("failed to write STATE.md")?;
    }
    let ok = if report.updated.is_empty() { "false" } else { "true" };
    emit(&report, raw, ok)
}

// ---------------------------------------------------------------------------
// update-stage / record-service
// ---------------------------------------------------------------------------

fn update_stage(root: &Path, stage: Option<&str>, raw: bool) -> anyhow::Result<()> {
    let Some(stage) = stage else {
        anyhow::bail!("stage required for state update-stage");
    };
    let stage: Stage = stage.parse()?;
    let mut doc = load_doc(root)?;
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

    if doc.update_stage(stage, &today)? {
        doc.save(root).context("failed to write STATE.md")?;
        emit(
            &json!({ "updated": true, "stage": stage, "date": today }),
            raw,
            stage.as_str(),
        )
    } else {
        emit(
            &json!({ "updated": false, "reason": "Current Stage field not found in STATE.md" }),
            raw,
            "false",
        )
    }
}

fn record_service(
    root: &Path,
    name: Option<&str>,
    kind: Option<&str>,
    raw: bool,
) -> anyhow::Result<()> {
    let Some(name) = name else {
        anyhow::bail!("service name required for record-service");
    };
    let mut doc = load_doc(root)?;
    match doc.record_service()? {
        Some(count) => {
            doc.save(root).context("failed to write STATE.md")?;
            emit(
                &json!({
                    "recorded": true,
                    "service": name,
                    "type": kind.unwrap_or("unknown"),
                    "count": count,
                }),
                raw,
                "true",
            )
        }
        None => emit(
            &json!({
                "recorded": false,
                "reason": "Services Detected field not found in STATE.md",
            }),
            raw,
            "false",
        ),
    }
}
