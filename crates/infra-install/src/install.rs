use crate::runtime::{Runtime, Target};
use crate::settings;
use anyhow::Context;
use infra_core::convert::{Dialect, DocKind, PathRewrite};
use infra_core::io;
use std::path::{Path, PathBuf};

/// Prefix every installed command and agent file carries.
pub const PREFIX: &str = "infra";
/// Bundle directory created inside the runtime's config directory.
pub const BUNDLE_DIR: &str = "get-infra-done";
/// Source directories copied into the bundle when present.
pub const BUNDLE_SUBDIRS: &[&str] = &["bin", "templates", "references", "workflows"];

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Install
// ---------------------------------------------------------------------------

/// Install commands, bundle, agents and VERSION into `target`. Each step is
/// checked independently; the names of failed steps are returned.
pub fn install(target: &Target, source: &Path) -> Vec<String> {
    println!(
        "  Installing for {} to {}\n",
        target.runtime.label(),
        target.label
    );
    let rewrite = target.path_rewrite();
    let dialect = target.runtime.dialect();
    let mut failures = Vec::new();

    // Commands
    let commands_src = source.join("commands").join(PREFIX);
    if target.runtime == Runtime::OpenCode {
        let dest = target.dir.join("command");
        let step = "command/infra-*";
        match install_flat_commands(&commands_src, &dest, &rewrite) {
            Ok(()) if io::dir_has_entries(&dest) => {
                let count = count_prefixed(&dest, ".md");
                println!("  ✓ Installed {count} commands to command/");
            }
            result => record_failure(&mut failures, step, result),
        }
    } else {
        let dest = target.dir.join("commands").join(PREFIX);
        let step = "commands/infra";
        match copy_tree(&commands_src, &dest, &rewrite, dialect, DocKind::Command) {
            Ok(()) if io::dir_has_entries(&dest) => println!("  ✓ Installed commands/infra"),
            result => record_failure(&mut failures, step, result),
        }
    }

    // Bundle
    let bundle = target.dir.join(BUNDLE_DIR);
    for sub in BUNDLE_SUBDIRS {
        let src = source.join(sub);
        if !src.is_dir() {
            continue;
        }
        let step = format!("{BUNDLE_DIR}/{sub}");
        let dest = bundle.join(sub);
        match copy_tree(&src, &dest, &rewrite, dialect, DocKind::Support) {
            Ok(()) if io::dir_has_entries(&dest) => println!("  ✓ Installed {step}"),
            result => record_failure(&mut failures, &step, result),
        }
    }

    // Agents
    let agents_src = source.join("agents");
    if agents_src.is_dir() {
        let dest = target.dir.join("agents");
        match install_agents(&agents_src, &dest, &rewrite, dialect) {
            Ok(()) if io::dir_has_entries(&dest) => {
                let count = count_prefixed(&dest, "");
                println!("  ✓ Installed {count} agents");
            }
            result => record_failure(&mut failures, "agents", result),
        }
    }

    // VERSION
    let version_path = bundle.join("VERSION");
    match io::atomic_write(&version_path, VERSION.as_bytes()) {
        Ok(()) if version_path.is_file() => println!("  ✓ Wrote VERSION ({VERSION})"),
        result => record_failure(&mut failures, "VERSION", result.map_err(Into::into)),
    }

    if target.runtime == Runtime::Gemini {
        match settings::enable_gemini_agents(&target.dir.join("settings.json")) {
            Ok(true) => println!("  ✓ Enabled experimental agents"),
            Ok(false) => {}
            Err(e) => record_failure(&mut failures, "settings.json", Err(e)),
        }
    }

    if failures.is_empty() {
        println!(
            "\n  Done! Launch {} and run {}.\n",
            target.runtime.label(),
            target.runtime.help_command()
        );
    }
    failures
}

fn record_failure(failures: &mut Vec<String>, step: &str, result: anyhow::Result<()>) {
    match result {
        Err(e) => eprintln!("  ✗ Failed to install {step}: {e:#}"),
        Ok(()) => eprintln!("  ✗ Failed to install {step}: directory is empty"),
    }
    failures.push(step.to_string());
}

/// Number of `infra-*` entries in `dir` ending with `suffix`.
fn count_prefixed(dir: &Path, suffix: &str) -> usize {
    sorted_entries(dir)
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
        .filter(|name| name.starts_with(&format!("{PREFIX}-")) && name.ends_with(suffix))
        .count()
}

fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read {}", dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Delete `infra-*.md` files directly inside `dir`.
pub fn remove_prefixed_md(dir: &Path) -> anyhow::Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for path in sorted_entries(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(&format!("{PREFIX}-")) && name.ends_with(".md") && path.is_file() {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Copy helpers
// ---------------------------------------------------------------------------

/// Flatten `commands/infra/**.md` into `dest/infra-<dirs>-<name>.md`, converted
/// to the OpenCode dialect. Stale `infra-*.md` files are removed first.
pub fn install_flat_commands(src: &Path, dest: &Path, rewrite: &PathRewrite) -> anyhow::Result<()> {
    io::ensure_dir(dest)?;
    remove_prefixed_md(dest)?;
    if !src.is_dir() {
        anyhow::bail!("source {} not found", src.display());
    }
    flatten_into(src, dest, PREFIX, rewrite)
}

fn flatten_into(src: &Path, dest: &Path, prefix: &str, rewrite: &PathRewrite) -> anyhow::Result<()> {
    for path in sorted_entries(src)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir() {
            flatten_into(&path, dest, &format!("{prefix}-{name}"), rewrite)?;
        } else if let Some(stem) = name.strip_suffix(".md") {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let converted = Dialect::FlatToolMap.convert(DocKind::Command, &rewrite.apply_flat(&content));
            io::atomic_write(&dest.join(format!("{prefix}-{stem}.md")), converted.as_bytes())?;
        }
    }
    Ok(())
}

/// Replace `dest` with a copy of `src`. Markdown is path-rewritten and
/// converted for `dialect`; Gemini commands land as `.toml`. Everything else
/// is copied byte for byte.
pub fn copy_tree(
    src: &Path,
    dest: &Path,
    rewrite: &PathRewrite,
    dialect: Dialect,
    kind: DocKind,
) -> anyhow::Result<()> {
    if !src.is_dir() {
        anyhow::bail!("source {} not found", src.display());
    }
    io::remove_if_exists(dest)?;
    io::ensure_dir(dest)?;

    for path in sorted_entries(src)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let target = dest.join(name);
        if path.is_dir() {
            copy_tree(&path, &target, rewrite, dialect, kind)?;
        } else if let Some(stem) = name.strip_suffix(".md") {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let converted = dialect.convert(kind, &rewrite.apply(&content));
            let file_name = match kind {
                DocKind::Command => format!("{stem}.{}", dialect.command_extension()),
                DocKind::Agent | DocKind::Support => name.to_string(),
            };
            io::atomic_write(&dest.join(file_name), converted.as_bytes())?;
        } else {
            std::fs::copy(&path, &target)
                .with_context(|| format!("cannot copy {}", path.display()))?;
        }
    }
    Ok(())
}

/// Replace installed `infra-*.md` agents with the converted top-level `*.md`
/// files from `src`.
pub fn install_agents(
    src: &Path,
    dest: &Path,
    rewrite: &PathRewrite,
    dialect: Dialect,
) -> anyhow::Result<()> {
    io::ensure_dir(dest)?;
    remove_prefixed_md(dest)?;
    for path in sorted_entries(src)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !name.ends_with(".md") {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let converted = dialect.convert(DocKind::Agent, &rewrite.apply(&content));
        io::atomic_write(&dest.join(name), converted.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn rewrite() -> PathRewrite {
        PathRewrite {
            prefix: "/cfg/".to_string(),
            local_dir: ".gemini".to_string(),
        }
    }

    #[test]
    fn flat_commands_are_renamed_and_stale_ones_removed() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("command");
        write(&src, "help.md", "---\nname: infra:help\n---\nSee ~/.claude/x and ~/.opencode/y");
        write(&src, "plan/deep.md", "body");
        write(&dest, "infra-old.md", "stale");
        write(&dest, "mine.md", "keep");

        install_flat_commands(&src, &dest, &rewrite()).unwrap();

        assert!(!dest.join("infra-old.md").exists());
        assert!(dest.join("mine.md").exists());
        assert!(dest.join("infra-plan-deep.md").exists());
        let help = std::fs::read_to_string(dest.join("infra-help.md")).unwrap();
        assert!(help.contains("See /cfg/x and /cfg/y"));
        assert!(!help.contains("name:"));
    }

    #[test]
    fn copy_tree_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        write(&src, "a.md", "read ./.claude/notes");
        write(&src, "tool.bin", "\u{0}\u{1}binary");
        write(&dest, "orphan.md", "old");

        copy_tree(&src, &dest, &rewrite(), Dialect::Nested, DocKind::Support).unwrap();

        assert!(!dest.join("orphan.md").exists());
        assert_eq!(
            std::fs::read_to_string(dest.join("a.md")).unwrap(),
            "read ./.gemini/notes"
        );
        assert_eq!(
            std::fs::read(dest.join("tool.bin")).unwrap(),
            b"\x00\x01binary".to_vec()
        );
    }

    #[test]
    fn gemini_commands_become_toml() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        write(&src, "scan.md", "---\ndescription: Scan\n---\nRun it <sub>now</sub>");

        copy_tree(&src, &dest, &rewrite(), Dialect::TomlPrompt, DocKind::Command).unwrap();

        assert!(!dest.join("scan.md").exists());
        let toml = std::fs::read_to_string(dest.join("scan.toml")).unwrap();
        assert_eq!(toml, "description = \"Scan\"\nprompt = \"Run it *(now)*\"\n");
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = copy_tree(
            &dir.path().join("nope"),
            &dir.path().join("dest"),
            &rewrite(),
            Dialect::Nested,
            DocKind::Command,
        );
        assert!(result.is_err());
    }

    #[test]
    fn agents_skip_non_markdown() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("agents-src");
        let dest = dir.path().join("agents");
        write(&src, "infra-scanner.md", "---\nname: infra-scanner\ncolor: cyan\n---\nbody");
        write(&src, "notes.txt", "skip");
        write(&dest, "infra-retired.md", "old");
        write(&dest, "other-agent.md", "keep");

        install_agents(&src, &dest, &rewrite(), Dialect::TomlPrompt).unwrap();

        assert!(!dest.join("infra-retired.md").exists());
        assert!(!dest.join("notes.txt").exists());
        assert!(dest.join("other-agent.md").exists());
        let agent = std::fs::read_to_string(dest.join("infra-scanner.md")).unwrap();
        assert_eq!(agent, "---\nname: infra-scanner\n---\nbody");
        assert_eq!(count_prefixed(&dest, ""), 1);
    }
}
