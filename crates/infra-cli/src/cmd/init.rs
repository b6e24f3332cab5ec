use crate::output::print_json;
use clap::Subcommand;
use infra_core::context;
use std::path::Path;

#[derive(Subcommand)]
pub enum InitSubcommand {
    /// Context for starting a new infrastructure project
    NewProject,

    /// Context for scanning the codebase
    Analyze,

    /// Context for generating terraform and CI/CD
    Generate,

    /// Pipeline progress summary
    Progress,

    /// Context for the security audit and cost estimate
    Audit,
}

pub fn run(root: &Path, subcmd: InitSubcommand) -> anyhow::Result<()> {
    match subcmd {
        InitSubcommand::NewProject => print_json(&context::new_project(root)),
        InitSubcommand::Analyze => print_json(&context::analyze(root)),
        InitSubcommand::Generate => print_json(&context::generate(root)),
        InitSubcommand::Progress => print_json(&context::progress(root)),
        InitSubcommand::Audit => print_json(&context::audit(root)),
    }
}
