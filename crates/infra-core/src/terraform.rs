//! Checks over the generated Terraform directory.
//!
//! Files are never parsed as HCL. Validation is substring and pattern search,
//! enough to catch a missing provider or backend before `terraform init` runs.

use crate::error::Result;
use crate::types::Severity;
use regex::Regex;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub const RECOMMENDED_FILES: &[&str] = &["main.tf", "variables.tf"];
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

static RESOURCE_RE: OnceLock<Regex> = OnceLock::new();
static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn resource_re() -> &'static Regex {
    RESOURCE_RE.get_or_init(|| Regex::new(r#"resource\s+"(\w+)"\s+"([^"\n]+)""#).unwrap())
}

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| Regex::new(r"Terraform v([\d.]+)").unwrap())
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TfFile {
    pub name: String,
    pub path: String,
    pub size: u64,
}

/// Names of the `.tf` files directly inside `dir`, sorted.
pub fn tf_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".tf") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// List `.tf` files under `root/rel_dir`. A missing directory lists nothing.
pub fn list(root: &Path, rel_dir: &str) -> Result<Vec<TfFile>> {
    let dir = root.join(rel_dir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    tf_file_names(&dir)?
        .into_iter()
        .map(|name| {
            let size = std::fs::metadata(dir.join(&name))?.len();
            let path = format!("{}/{}", rel_dir.trim_end_matches('/'), name);
            Ok(TfFile { name, path, size })
        })
        .collect()
}

/// Number of `.tf` files, or `None` when the directory does not exist.
pub fn count(root: &Path, rel_dir: &str) -> Option<usize> {
    let dir = root.join(rel_dir);
    if !dir.is_dir() {
        return None;
    }
    tf_file_names(&dir).ok().map(|names| names.len())
}

// ---------------------------------------------------------------------------
// Structure validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub file: Option<String>,
    pub message: String,
}

impl Issue {
    fn warning(file: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            file: file.map(str::to_string),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    MissingDir,
    NoFiles,
    Checked {
        files: Vec<String>,
        issues: Vec<Issue>,
    },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        match self {
            Validation::Checked { issues, .. } => {
                !issues.iter().any(|i| i.severity == Severity::Error)
            }
            _ => false,
        }
    }
}

pub fn validate_structure(root: &Path, rel_dir: &str) -> Result<Validation> {
    let dir = root.join(rel_dir);
    if !dir.is_dir() {
        return Ok(Validation::MissingDir);
    }
    let files = tf_file_names(&dir)?;
    if files.is_empty() {
        return Ok(Validation::NoFiles);
    }

    let mut contents = Vec::with_capacity(files.len());
    for name in &files {
        contents.push((name.as_str(), std::fs::read_to_string(dir.join(name))?));
    }

    let mut issues = Vec::new();
    for required in RECOMMENDED_FILES.iter().copied() {
        if !files.iter().any(|f| f == required) {
            issues.push(Issue::warning(
                Some(required),
                format!("Missing recommended file: {required}"),
            ));
        }
    }

    let has_provider = contents
        .iter()
        .any(|(_, c)| c.contains("provider \"aws\"") || c.contains("required_providers"));
    if !has_provider {
        issues.push(Issue {
            severity: Severity::Error,
            file: None,
            message: "No AWS provider configuration found".to_string(),
        });
    }

    if !contents.iter().any(|(_, c)| c.contains("backend \"")) {
        issues.push(Issue::warning(
            None,
            "No backend configuration found (state will be local)".to_string(),
        ));
    }

    for (name, content) in &contents {
        for caps in resource_re().captures_iter(content) {
            let resource = &caps[2];
            if resource.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
                issues.push(Issue::warning(
                    Some(*name),
                    format!("Resource name \"{resource}\" should use snake_case"),
                ));
            }
        }
    }

    Ok(Validation::Checked { files, issues })
}

// ---------------------------------------------------------------------------
// Binary probe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BinaryInfo {
    pub available: bool,
    pub version: Option<String>,
}

/// Look for `terraform` on PATH and ask it for its version.
pub fn check_binary() -> BinaryInfo {
    let Ok(bin) = which::which("terraform") else {
        return BinaryInfo {
            available: false,
            version: None,
        };
    };

    if let Some(out) = run_with_timeout(&bin, &["version", "-json"], PROBE_TIMEOUT) {
        if let Ok(doc) = serde_json::from_str::<serde_json::Value>(&out) {
            let version = doc
                .get("terraform_version")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            return BinaryInfo {
                available: true,
                version: Some(version.to_string()),
            };
        }
    }

    match run_with_timeout(&bin, &["version"], PROBE_TIMEOUT) {
        Some(out) => BinaryInfo {
            available: true,
            version: Some(parse_version_text(&out).unwrap_or_else(|| "unknown".to_string())),
        },
        None => BinaryInfo {
            available: false,
            version: None,
        },
    }
}

/// Extract `1.7.5` from `Terraform v1.7.5 on linux_amd64`.
pub fn parse_version_text(text: &str) -> Option<String> {
    version_re().captures(text).map(|c| c[1].to_string())
}

/// Run a command, returning stdout only if it exits successfully before `timeout`.
/// Stdout is drained on a separate thread so a chatty child cannot fill the pipe.
fn run_with_timeout(bin: &Path, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;
    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut out = String::new();
        stdout.read_to_string(&mut out).map(|_| out)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                tracing::warn!("{} {} timed out", bin.display(), args.join(" "));
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(25)),
            Err(_) => {
                let _ = child.kill();
                return None;
            }
        }
    };

    let out = reader.join().ok()?.ok()?;
    status.success().then_some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TF_DIR: &str = ".infra/terraform";

    fn write_tf(dir: &TempDir, name: &str, content: &str) {
        let tf = dir.path().join(TF_DIR);
        std::fs::create_dir_all(&tf).unwrap();
        std::fs::write(tf.join(name), content).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn run_with_timeout_reads_output_larger_than_pipe() {
        let out = run_with_timeout(
            Path::new("sh"),
            &["-c", "head -c 200000 /dev/zero | tr '\\0' x"],
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.len(), 200_000);
        assert!(out.chars().all(|c| c == 'x'));
    }

    #[cfg(unix)]
    #[test]
    fn run_with_timeout_rejects_failure_and_timeout() {
        assert_eq!(
            run_with_timeout(Path::new("sh"), &["-c", "echo hi; exit 3"], Duration::from_secs(5)),
            None
        );
        assert_eq!(
            run_with_timeout(Path::new("sh"), &["-c", "sleep 5"], Duration::from_millis(100)),
            None
        );
    }

    #[test]
    fn list_sorts_and_filters() {
        let dir = TempDir::new().unwrap();
        write_tf(&dir, "variables.tf", "variable \"x\" {}");
        write_tf(&dir, "main.tf", "");
        write_tf(&dir, "README.md", "# notes");
        let files = list(dir.path(), TF_DIR).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main.tf", "variables.tf"]);
        assert_eq!(files[0].path, ".infra/terraform/main.tf");
        assert_eq!(files[1].size, 15);
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list(dir.path(), TF_DIR).unwrap().is_empty());
        assert_eq!(count(dir.path(), TF_DIR), None);
    }

    #[test]
    fn validate_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            validate_structure(dir.path(), TF_DIR).unwrap(),
            Validation::MissingDir
        );
        std::fs::create_dir_all(dir.path().join(TF_DIR)).unwrap();
        let v = validate_structure(dir.path(), TF_DIR).unwrap();
        assert_eq!(v, Validation::NoFiles);
        assert!(!v.is_valid());
    }

    #[test]
    fn validate_complete_module_is_clean() {
        let dir = TempDir::new().unwrap();
        write_tf(
            &dir,
            "main.tf",
            "terraform {\n  backend \"s3\" {}\n}\nprovider \"aws\" {}\nresource \"aws_s3_bucket\" \"assets\" {}\n",
        );
        write_tf(&dir, "variables.tf", "variable \"region\" {}\n");
        let v = validate_structure(dir.path(), TF_DIR).unwrap();
        assert!(v.is_valid());
        let Validation::Checked { files, issues } = v else {
            panic!("expected checked");
        };
        assert_eq!(files.len(), 2);
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn validate_flags_problems() {
        let dir = TempDir::new().unwrap();
        write_tf(&dir, "network.tf", "resource \"aws_vpc\" \"MainVpc\" {}\n");
        let v = validate_structure(dir.path(), TF_DIR).unwrap();
        assert!(!v.is_valid());
        let Validation::Checked { issues, .. } = v else {
            panic!("expected checked");
        };
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert!(messages.contains(&"Missing recommended file: main.tf"));
        assert!(messages.contains(&"Missing recommended file: variables.tf"));
        assert!(messages.contains(&"No AWS provider configuration found"));
        assert!(messages.contains(&"No backend configuration found (state will be local)"));
        assert!(messages.contains(&"Resource name \"MainVpc\" should use snake_case"));
        let naming = issues.iter().find(|i| i.message.contains("MainVpc")).unwrap();
        assert_eq!(naming.file.as_deref(), Some("network.tf"));
    }

    #[test]
    fn parse_version_text_extracts_semver() {
        assert_eq!(
            parse_version_text("Terraform v1.7.5\non linux_amd64\n").as_deref(),
            Some("1.7.5")
        );
        assert_eq!(parse_version_text("OpenTofu v1.6.0"), None);
    }
}
