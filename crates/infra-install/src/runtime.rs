use infra_core::convert::{Dialect, PathRewrite};
use infra_core::InfraError;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// AI assistant whose configuration directory receives the install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Claude,
    OpenCode,
    Gemini,
}

impl Runtime {
    pub fn all() -> &'static [Runtime] {
        &[Runtime::Claude, Runtime::OpenCode, Runtime::Gemini]
    }

    /// Directory name used for project-local installs.
    pub fn dir_name(self) -> &'static str {
        match self {
            Runtime::Claude => ".claude",
            Runtime::OpenCode => ".opencode",
            Runtime::Gemini => ".gemini",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Runtime::Claude => "Claude Code",
            Runtime::OpenCode => "OpenCode",
            Runtime::Gemini => "Gemini",
        }
    }

    pub fn dialect(self) -> Dialect {
        match self {
            Runtime::Claude => Dialect::Nested,
            Runtime::OpenCode => Dialect::FlatToolMap,
            Runtime::Gemini => Dialect::TomlPrompt,
        }
    }

    /// Slash command users run first after installing.
    pub fn help_command(self) -> &'static str {
        match self {
            Runtime::OpenCode => "/infra-help",
            Runtime::Claude | Runtime::Gemini => "/infra:help",
        }
    }

    /// Global configuration directory. `explicit` wins, then the runtime's
    /// environment overrides, then the default under `home`.
    pub fn global_dir(
        self,
        explicit: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
        home: &Path,
    ) -> PathBuf {
        if let Some(dir) = explicit {
            return expand_tilde(dir, home);
        }
        let var = |name: &str| env(name).filter(|v| !v.is_empty());
        match self {
            Runtime::Claude => var("CLAUDE_CONFIG_DIR")
                .map(|d| expand_tilde(&d, home))
                .unwrap_or_else(|| home.join(".claude")),
            Runtime::Gemini => var("GEMINI_CONFIG_DIR")
                .map(|d| expand_tilde(&d, home))
                .unwrap_or_else(|| home.join(".gemini")),
            Runtime::OpenCode => {
                if let Some(dir) = var("OPENCODE_CONFIG_DIR") {
                    return expand_tilde(&dir, home);
                }
                if let Some(file) = var("OPENCODE_CONFIG") {
                    let file = expand_tilde(&file, home);
                    if let Some(parent) = file.parent() {
                        return parent.to_path_buf();
                    }
                }
                if let Some(xdg) = var("XDG_CONFIG_HOME") {
                    return expand_tilde(&xdg, home).join("opencode");
                }
                home.join(".config").join("opencode")
            }
        }
    }
}

/// Expand a leading `~/` against `home`.
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

pub fn home_dir() -> Result<PathBuf, InfraError> {
    home::home_dir().ok_or(InfraError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// A resolved install destination.
#[derive(Debug, Clone)]
pub struct Target {
    pub runtime: Runtime,
    pub dir: PathBuf,
    pub global: bool,
    /// `dir` with the home directory shown as `~` (global) or the working
    /// directory shown as `.` (local).
    pub label: String,
}

impl Target {
    pub fn global(runtime: Runtime, explicit: Option<&str>, home: &Path) -> Self {
        let dir = runtime.global_dir(explicit, |k| std::env::var(k).ok(), home);
        let label = replace_prefix(&dir, home, "~");
        Self {
            runtime,
            dir,
            global: true,
            label,
        }
    }

    pub fn local(runtime: Runtime, cwd: &Path) -> Self {
        let dir = cwd.join(runtime.dir_name());
        let label = replace_prefix(&dir, cwd, ".");
        Self {
            runtime,
            dir,
            global: false,
            label,
        }
    }

    /// Replacements for the `~/.claude/` and `./.claude/` references in templates.
    pub fn path_rewrite(&self) -> PathRewrite {
        let prefix = if self.global {
            format!("{}/", self.dir.display().to_string().replace('\\', "/"))
        } else {
            format!("./{}/", self.runtime.dir_name())
        };
        PathRewrite {
            prefix,
            local_dir: self.runtime.dir_name().to_string(),
        }
    }
}

fn replace_prefix(path: &Path, base: &Path, shown_as: &str) -> String {
    match path.strip_prefix(base) {
        Ok(rest) if rest.as_os_str().is_empty() => shown_as.to_string(),
        Ok(rest) => format!("{shown_as}/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_under_home() {
        let home = Path::new("/home/dev");
        assert_eq!(
            Runtime::Claude.global_dir(None, env(&[]), home),
            PathBuf::from("/home/dev/.claude")
        );
        assert_eq!(
            Runtime::Gemini.global_dir(None, env(&[]), home),
            PathBuf::from("/home/dev/.gemini")
        );
        assert_eq!(
            Runtime::OpenCode.global_dir(None, env(&[]), home),
            PathBuf::from("/home/dev/.config/opencode")
        );
    }

    #[test]
    fn explicit_dir_wins_and_expands() {
        let home = Path::new("/home/dev");
        let vars = env(&[("CLAUDE_CONFIG_DIR", "/elsewhere")]);
        assert_eq!(
            Runtime::Claude.global_dir(Some("~/.claude-bc"), vars, home),
            PathBuf::from("/home/dev/.claude-bc")
        );
    }

    #[test]
    fn opencode_env_precedence() {
        let home = Path::new("/home/dev");
        let all = env(&[
            ("OPENCODE_CONFIG_DIR", "~/oc"),
            ("OPENCODE_CONFIG", "/etc/oc/config.json"),
            ("XDG_CONFIG_HOME", "/xdg"),
        ]);
        assert_eq!(
            Runtime::OpenCode.global_dir(None, all, home),
            PathBuf::from("/home/dev/oc")
        );

        let file = env(&[("OPENCODE_CONFIG", "/etc/oc/config.json"), ("XDG_CONFIG_HOME", "/xdg")]);
        assert_eq!(
            Runtime::OpenCode.global_dir(None, file, home),
            PathBuf::from("/etc/oc")
        );

        let xdg = env(&[("XDG_CONFIG_HOME", "/xdg")]);
        assert_eq!(
            Runtime::OpenCode.global_dir(None, xdg, home),
            PathBuf::from("/xdg/opencode")
        );
    }

    #[test]
    fn gemini_env_override() {
        let home = Path::new("/home/dev");
        let vars = env(&[("GEMINI_CONFIG_DIR", "~/g")]);
        assert_eq!(
            Runtime::Gemini.global_dir(None, vars, home),
            PathBuf::from("/home/dev/g")
        );
    }

    #[test]
    fn local_target_labels_and_prefix() {
        let target = Target::local(Runtime::OpenCode, Path::new("/work/app"));
        assert_eq!(target.dir, PathBuf::from("/work/app/.opencode"));
        assert_eq!(target.label, "./.opencode");
        let rw = target.path_rewrite();
        assert_eq!(rw.prefix, "./.opencode/");
        assert_eq!(rw.local_dir, ".opencode");
    }

    #[test]
    fn global_prefix_uses_forward_slashes() {
        let target = Target {
            runtime: Runtime::Claude,
            dir: PathBuf::from("/home/dev/.claude"),
            global: true,
            label: "~/.claude".to_string(),
        };
        assert_eq!(target.path_rewrite().prefix, "/home/dev/.claude/");
        assert_eq!(
            replace_prefix(Path::new("/home/dev/.claude"), Path::new("/home/dev"), "~"),
            "~/.claude"
        );
    }

    #[test]
    fn dialects_and_commands() {
        assert_eq!(Runtime::Claude.dialect(), Dialect::Nested);
        assert_eq!(Runtime::OpenCode.dialect(), Dialect::FlatToolMap);
        assert_eq!(Runtime::Gemini.dialect(), Dialect::TomlPrompt);
        assert_eq!(Runtime::OpenCode.help_command(), "/infra-help");
        assert_eq!(Runtime::Gemini.help_command(), "/infra:help");
    }
}
