#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn installer(cwd: &Path, home: &Path, source: &Path) -> Command {
    let mut cmd = Command::cargo_bin("get-infra-done").unwrap();
    cmd.current_dir(cwd)
        .env("HOME", home)
        .env_remove("CLAUDE_CONFIG_DIR")
        .env_remove("GEMINI_CONFIG_DIR")
        .env_remove("OPENCODE_CONFIG_DIR")
        .env_remove("OPENCODE_CONFIG")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("INFRA_SOURCE_DIR")
        .arg("--source")
        .arg(source);
    cmd
}

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

const HELP: &str = "---
name: infra:help
description: Show infra commands
allowed-tools:
  - Read
  - Bash
  - AskUserQuestion
---
Read ~/.claude/get-infra-done/workflows/help.md then run /infra:scan <sub>quick</sub>.
";

const SCANNER: &str = "---
name: infra-scanner
description: Scans the codebase
tools: Read, Grep, Bash
color: cyan
---
Write to ${OUTPUT_DIR} using ./.claude/get-infra-done/templates/report.md
";

struct Fixture {
    _dir: TempDir,
    source: std::path::PathBuf,
    home: std::path::PathBuf,
    project: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    write(&source, "commands/infra/help.md", HELP.as_bytes());
    write(&source, "commands/infra/plan/deep.md", b"Plan deeply.\n");
    write(&source, "agents/infra-scanner.md", SCANNER.as_bytes());
    write(&source, "agents/README.txt", b"not an agent");
    write(
        &source,
        "workflows/help.md",
        b"See ~/.claude/get-infra-done/templates.\n",
    );
    write(&source, "templates/report.md", b"# Report\n");
    write(&source, "bin/helper", b"\x7fELF\x00\x01");

    let home = dir.path().join("home");
    let project = dir.path().join("project");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&project).unwrap();
    Fixture {
        _dir: dir,
        source,
        home,
        project,
    }
}

// ---------------------------------------------------------------------------
// Claude
// ---------------------------------------------------------------------------

#[test]
fn claude_global_is_default() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Done! Launch Claude Code and run /infra:help."));

    let cfg = fx.home.join(".claude");
    let help = read(&cfg.join("commands/infra/help.md"));
    assert!(help.contains("name: infra:help"));
    assert!(help.contains(&format!("Read {}/get-infra-done/workflows", cfg.display())));
    assert!(help.contains("<sub>quick</sub>"));
    assert!(cfg.join("commands/infra/plan/deep.md").is_file());
    assert!(cfg.join("get-infra-done/workflows/help.md").is_file());
    assert!(cfg.join("get-infra-done/templates/report.md").is_file());
    assert_eq!(
        std::fs::read(cfg.join("get-infra-done/bin/helper")).unwrap(),
        b"\x7fELF\x00\x01".to_vec()
    );
    assert_eq!(
        read(&cfg.join("get-infra-done/VERSION")),
        env!("CARGO_PKG_VERSION")
    );
    let agent = read(&cfg.join("agents/infra-scanner.md"));
    assert!(agent.contains("color: cyan"));
    assert!(agent.contains("./.claude/get-infra-done/templates/report.md"));
    assert!(!cfg.join("agents/README.txt").exists());
}

#[test]
fn claude_local_uses_relative_paths() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--claude", "--local"])
        .assert()
        .success();

    let cfg = fx.project.join(".claude");
    let help = read(&cfg.join("commands/infra/help.md"));
    assert!(help.contains("Read ./.claude/get-infra-done/workflows/help.md"));
    assert!(!fx.home.join(".claude").exists());
}

#[test]
fn config_dir_overrides_global_location() {
    let fx = fixture();
    let custom = fx.home.join("custom-claude");
    installer(&fx.project, &fx.home, &fx.source)
        .args(["-g", "-c"])
        .arg(&custom)
        .assert()
        .success();
    assert!(custom.join("commands/infra/help.md").is_file());
    assert!(!fx.home.join(".claude").exists());
}

#[test]
fn claude_config_dir_env_is_honored() {
    let fx = fixture();
    let custom = fx.home.join("from-env");
    installer(&fx.project, &fx.home, &fx.source)
        .env("CLAUDE_CONFIG_DIR", &custom)
        .assert()
        .success();
    assert!(custom.join("get-infra-done/VERSION").is_file());
}

// ---------------------------------------------------------------------------
// OpenCode
// ---------------------------------------------------------------------------

#[test]
fn opencode_flattens_commands() {
    let fx = fixture();
    let xdg = fx.home.join("xdg");
    installer(&fx.project, &fx.home, &fx.source)
        .env("XDG_CONFIG_HOME", &xdg)
        .arg("--opencode")
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed 2 commands to command/"))
        .stdout(predicate::str::contains("run /infra-help."));

    let cfg = xdg.join("opencode");
    let help = read(&cfg.join("command/infra-help.md"));
    assert!(!help.contains("name:"));
    assert!(help.contains("tools:\n  read: true\n  bash: true\n  question: true\n---"));
    assert!(help.contains("run /infra-scan"));
    assert!(help.contains(&format!("Read {}/get-infra-done", cfg.display())));
    assert!(cfg.join("command/infra-plan-deep.md").is_file());
    assert!(!cfg.join("commands").exists());

    let agent = read(&cfg.join("agents/infra-scanner.md"));
    assert!(agent.contains("color: \"#00FFFF\""));
    assert!(agent.contains("  grep: true"));
}

#[test]
fn opencode_reinstall_removes_stale_commands() {
    let fx = fixture();
    let cfg = fx.project.join(".opencode");
    write(&cfg, "command/infra-retired.md", b"old");
    write(&cfg, "command/mine.md", b"keep");

    installer(&fx.project, &fx.home, &fx.source)
        .args(["--opencode", "--local"])
        .assert()
        .success();

    assert!(!cfg.join("command/infra-retired.md").exists());
    assert!(cfg.join("command/mine.md").exists());
    assert!(cfg.join("command/infra-help.md").exists());
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[test]
fn gemini_writes_toml_commands_and_settings() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--gemini", "-l"])
        .assert()
        .success();

    let cfg = fx.project.join(".gemini");
    assert!(!cfg.join("commands/infra/help.md").exists());
    let parsed: toml::Value = read(&cfg.join("commands/infra/help.toml")).parse().unwrap();
    assert_eq!(parsed["description"].as_str(), Some("Show infra commands"));
    let prompt = parsed["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("Read ./.gemini/get-infra-done/workflows/help.md"));
    assert!(prompt.contains("*(quick)*"));
    assert!(cfg.join("commands/infra/plan/deep.toml").is_file());

    let agent = read(&cfg.join("agents/infra-scanner.md"));
    assert!(!agent.contains("color:"));
    assert!(agent.contains("tools:\n  - read_file\n  - search_file_content\n  - run_shell_command\n---"));
    assert!(agent.contains("Write to $OUTPUT_DIR"));

    let settings: serde_json::Value =
        serde_json::from_str(&read(&cfg.join("settings.json"))).unwrap();
    assert_eq!(settings["experimental"]["enableAgents"], true);
}

#[test]
fn gemini_settings_keep_existing_keys() {
    let fx = fixture();
    let cfg = fx.project.join(".gemini");
    write(&cfg, "settings.json", br#"{"theme":"dark"}"#);

    installer(&fx.project, &fx.home, &fx.source)
        .args(["--gemini", "--local"])
        .assert()
        .success();

    let settings: serde_json::Value =
        serde_json::from_str(&read(&cfg.join("settings.json"))).unwrap();
    assert_eq!(settings["theme"], "dark");
    assert_eq!(settings["experimental"]["enableAgents"], true);
}

// ---------------------------------------------------------------------------
// All runtimes and failures
// ---------------------------------------------------------------------------

#[test]
fn all_installs_every_runtime() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--all", "--local"])
        .assert()
        .success();
    assert!(fx.project.join(".claude/commands/infra/help.md").is_file());
    assert!(fx.project.join(".opencode/command/infra-help.md").is_file());
    assert!(fx.project.join(".gemini/commands/infra/help.toml").is_file());
}

#[test]
fn missing_commands_reports_incomplete_install() {
    let fx = fixture();
    std::fs::remove_dir_all(fx.source.join("commands")).unwrap();
    installer(&fx.project, &fx.home, &fx.source)
        .arg("--local")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Installation incomplete! Failed:"))
        .stderr(predicate::str::contains("commands/infra"));
    // Later steps still ran.
    assert!(fx.project.join(".claude/get-infra-done/VERSION").is_file());
}

#[test]
fn global_and_local_conflict() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--global", "--local"])
        .assert()
        .failure();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--local", "--config-dir", "/tmp/x"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// Uninstall
// ---------------------------------------------------------------------------

#[test]
fn uninstall_requires_location() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .arg("--uninstall")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--uninstall requires --global or --local"));
}

#[test]
fn uninstall_removes_only_installed_files() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--all", "--local"])
        .assert()
        .success();
    write(&fx.project, ".claude/agents/mine.md", b"keep");
    write(&fx.project, ".claude/commands/other/x.md", b"keep");

    installer(&fx.project, &fx.home, &fx.source)
        .args(["--all", "--local", "--uninstall"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done! Infra has been uninstalled from Claude Code."));

    let claude = fx.project.join(".claude");
    assert!(!claude.join("commands/infra").exists());
    assert!(!claude.join("get-infra-done").exists());
    assert!(!claude.join("agents/infra-scanner.md").exists());
    assert!(claude.join("agents/mine.md").exists());
    assert!(claude.join("commands/other/x.md").exists());
    assert!(!fx.project.join(".opencode/command/infra-help.md").exists());
    let gemini = fx.project.join(".gemini");
    assert!(!gemini.join("commands/infra").exists());
    assert!(gemini.join("settings.json").exists());
}

#[test]
fn uninstall_with_nothing_installed() {
    let fx = fixture();
    installer(&fx.project, &fx.home, &fx.source)
        .args(["--gemini", "--global", "--uninstall"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to uninstall."));
}
