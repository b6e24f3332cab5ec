mod install;
mod runtime;
mod settings;
mod uninstall;

use anyhow::Context;
use clap::Parser;
use runtime::{Runtime, Target};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "get-infra-done",
    about = "Install get-infra-done commands and agents for Claude Code, OpenCode or Gemini",
    version
)]
struct Cli {
    /// Install for Claude Code
    #[arg(long)]
    claude: bool,

    /// Install for OpenCode
    #[arg(long)]
    opencode: bool,

    /// Install for Gemini
    #[arg(long)]
    gemini: bool,

    /// Install for every supported runtime
    #[arg(long)]
    all: bool,

    /// Install into the runtime's global config directory (default)
    #[arg(short = 'g', long, conflicts_with = "local")]
    global: bool,

    /// Install into the current project
    #[arg(short = 'l', long)]
    local: bool,

    /// Custom global config directory
    #[arg(short = 'c', long, value_name = "DIR", conflicts_with = "local")]
    config_dir: Option<String>,

    /// Remove installed infra files instead of installing
    #[arg(short = 'u', long)]
    uninstall: bool,

    /// Directory holding commands/, agents/, workflows/ etc.
    /// (default: parent of the directory containing this binary)
    #[arg(long, env = "INFRA_SOURCE_DIR", value_name = "DIR")]
    source: Option<PathBuf>,
}

impl Cli {
    fn runtimes(&self) -> Vec<Runtime> {
        if self.all {
            return Runtime::all().to_vec();
        }
        let picked: Vec<Runtime> = [
            (self.claude, Runtime::Claude),
            (self.opencode, Runtime::OpenCode),
            (self.gemini, Runtime::Gemini),
        ]
        .into_iter()
        .filter_map(|(on, rt)| on.then_some(rt))
        .collect();
        if picked.is_empty() {
            vec![Runtime::Claude]
        } else {
            picked
        }
    }
}

fn default_source() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the installer binary")?;
    exe.parent()
        .and_then(|bin| bin.parent())
        .map(|p| p.to_path_buf())
        .context("cannot derive the source directory from the binary location")
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.uninstall && !cli.global && !cli.local {
        anyhow::bail!("--uninstall requires --global or --local");
    }

    let runtimes = cli.runtimes();
    let cwd = std::env::current_dir().context("cannot read the current directory")?;
    let home = if cli.local {
        None
    } else {
        Some(runtime::home_dir()?)
    };
    let source = match cli.source.clone() {
        Some(dir) => dir,
        None => default_source()?,
    };
    tracing::debug!("template source: {}", source.display());

    println!("\n  Get Infra Done v{}\n", install::VERSION);

    let mut failures = Vec::new();
    for rt in runtimes {
        let target = match &home {
            Some(home) => Target::global(rt, cli.config_dir.as_deref(), home),
            None => Target::local(rt, &cwd),
        };
        if cli.uninstall {
            uninstall::uninstall(&target)
                .with_context(|| format!("uninstall from {} failed", target.label))?;
        } else {
            failures.extend(
                install::install(&target, &source)
                    .into_iter()
                    .map(|step| format!("{} {step}", rt.label())),
            );
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("Installation incomplete! Failed: {}", failures.join(", "));
    }
    Ok(())
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

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
