use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const INFRA_DIR: &str = ".infra";

pub const CONFIG_FILE: &str = ".infra/config.json";
pub const STATE_FILE: &str = ".infra/STATE.md";
pub const SERVICES_FILE: &str = ".infra/SERVICES.md";
pub const ANALYSIS_FILE: &str = ".infra/ANALYSIS.md";
pub const RECOMMENDATIONS_FILE: &str = ".infra/RECOMMENDATIONS.md";
pub const DECISIONS_FILE: &str = ".infra/DECISIONS.md";
pub const ARCHITECTURE_FILE: &str = ".infra/ARCHITECTURE.md";
pub const SECURITY_AUDIT_FILE: &str = ".infra/SECURITY-AUDIT.md";
pub const COST_ESTIMATE_FILE: &str = ".infra/COST-ESTIMATE.md";

pub const DEFAULT_TERRAFORM_DIR: &str = ".infra/terraform";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn infra_dir(root: &Path) -> PathBuf {
    root.join(INFRA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn services_path(root: &Path) -> PathBuf {
    root.join(SERVICES_FILE)
}

/// True if `rel` exists under `root`, whether file or directory.
pub fn exists(root: &Path, rel: &str) -> bool {
    root.join(rel).exists()
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

static SLUG_SEP_RE: OnceLock<Regex> = OnceLock::new();

fn slug_sep_re() -> &'static Regex {
    SLUG_SEP_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Lowercase, collapse every run of non-alphanumerics into `-`, trim dashes.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    slug_sep_re()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
