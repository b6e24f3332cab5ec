use crate::output::emit;
use anyhow::Context;
use clap::Subcommand;
use infra_core::config::Config;
use infra_core::terraform::{self, Validation};
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum TerraformSubcommand {
    /// List generated .tf files
    List,

    /// Report whether the terraform binary is on PATH and its version
    CheckBinary,

    /// Check generated files for common structural problems
    ValidateStructure,
}

pub fn run(root: &Path, subcmd: TerraformSubcommand, raw: bool) -> anyhow::Result<()> {
    let config = Config::load(root);
    let dir = config.terraform_output_dir.as_str();
    match subcmd {
        TerraformSubcommand::List => list(root, dir, raw),
        TerraformSubcommand::CheckBinary => check_binary(raw),
        TerraformSubcommand::ValidateStructure => validate(root, dir, raw),
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

fn list(root: &Path, dir: &str, raw: bool) -> anyhow::Result<()> {
    let files = terraform::list(root, dir).context("failed to list terraform files")?;
    let count = files.len();
    emit(
        &json!({ "count": count, "files": files }),
        raw,
        count.to_string(),
    )
}

fn check_binary(raw: bool) -> anyhow::Result<()> {
    let info = terraform::check_binary();
    emit(&info, raw, bool_str(info.available))
}

fn validate(root: &Path, dir: &str, raw: bool) -> anyhow::Result<()> {
    let result = terraform::validate_structure(root, dir).context("failed to read terraform files")?;
    let valid = result.is_valid();
    let value = match result {
        Validation::MissingDir => json!({
            "valid": false,
            "reason": "terraform directory not found",
            "issues": [],
        }),
        Validation::NoFiles => json!({
            "valid": false,
            "reason": "no .tf files found",
            "issues": [],
        }),
        Validation::Checked { files, issues } => json!({
            "valid": valid,
            "file_count": files.len(),
            "files": files,
            "issues": issues,
        }),
    };
    emit(&value, raw, bool_str(valid))
}
