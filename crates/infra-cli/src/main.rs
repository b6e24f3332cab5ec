mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    init::InitSubcommand, service::ServiceSubcommand, state::StateSubcommand,
    terraform::TerraformSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "infra-tools",
    about = "Pipeline state, config and terraform helpers for get-infra-done workflows",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .infra/)
    #[arg(long, global = true, env = "INFRA_ROOT")]
    root: Option<PathBuf>,

    /// Print a bare value instead of JSON where the command defines one
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load or edit .infra/STATE.md
    State {
        #[command(subcommand)]
        subcommand: Option<StateSubcommand>,
    },

    /// Create .infra/config.json with defaults if missing
    ConfigEnsureSection,

    /// Set a dotted key in config.json
    ConfigSet {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Read a dotted key from config.json
    ConfigGet { key: String },

    /// Manage the SERVICES.md table
    Service {
        #[command(subcommand)]
        subcommand: ServiceSubcommand,
    },

    /// Inspect generated terraform
    Terraform {
        #[command(subcommand)]
        subcommand: TerraformSubcommand,
    },

    /// Turn text into a URL-safe slug
    GenerateSlug { text: Option<String> },

    /// Print the current UTC time (full, date or filename)
    CurrentTimestamp { format: Option<String> },

    /// Check whether a path exists relative to the project root
    VerifyPathExists { path: Option<String> },

    /// Commit planning docs under .infra/
    Commit {
        message: Option<String>,
        /// Paths to stage instead of .infra/
        #[arg(long, num_args = 1..)]
        files: Vec<String>,
    },

    /// Aggregated context for workflow startup
    Init {
        #[command(subcommand)]
        subcommand: InitSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let raw = cli.raw;

    let result = match cli.command {
        Commands::State { subcommand } => cmd::state::run(&root, subcommand, raw),
        Commands::ConfigEnsureSection => cmd::config::ensure_section(&root, raw),
        Commands::ConfigSet { key, value } => cmd::config::set(&root, &key, &value, raw),
        Commands::ConfigGet { key } => cmd::config::get(&root, &key, raw),
        Commands::Service { subcommand } => cmd::service::run(&root, subcommand, raw),
        Commands::Terraform { subcommand } => cmd::terraform::run(&root, subcommand, raw),
        Commands::GenerateSlug { text } => cmd::util::generate_slug(text.as_deref(), raw),
        Commands::CurrentTimestamp { format } => {
            cmd::util::current_timestamp(format.as_deref(), raw)
        }
        Commands::VerifyPathExists { path } => {
            cmd::util::verify_path_exists(&root, path.as_deref(), raw)
        }
        Commands::Commit { message, files } => {
            cmd::util::commit(&root, message.as_deref(), &files, raw)
        }
        Commands::Init { subcommand } => cmd::init::run(&root, subcommand),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
