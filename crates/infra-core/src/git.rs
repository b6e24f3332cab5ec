use std::path::Path;
use std::process::Command;

/// File name fragments whose changes suggest the infrastructure needs another look.
pub const INFRA_RELEVANT: &[&str] = &[
    "Dockerfile",
    "docker-compose",
    "package.json",
    "requirements.txt",
    "go.mod",
    "Cargo.toml",
    ".env",
    "Makefile",
];

/// Captured result of one `git` invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run `git <args>` in `root`. A spawn failure reads as an unsuccessful run.
pub fn run(root: &Path, args: &[&str]) -> GitOutput {
    match Command::new("git").args(args).current_dir(root).output() {
        Ok(out) => GitOutput {
            success: out.status.success(),
            stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        },
        Err(e) => {
            tracing::debug!("git {} failed to start: {e}", args.join(" "));
            GitOutput {
                success: false,
                stdout: String::new(),
                stderr: e.to_string(),
            }
        }
    }
}

pub fn is_ignored(root: &Path, rel: &str) -> bool {
    run(root, &["check-ignore", "-q", "--", rel]).success
}

/// Whether the last five commits touched any infra-relevant file.
pub fn has_recent_infra_changes(root: &Path) -> bool {
    let out = run(root, &["diff", "--name-only", "HEAD~5"]);
    if !out.success {
        return false;
    }
    out.stdout
        .lines()
        .filter(|l| !l.is_empty())
        .any(|f| INFRA_RELEVANT.iter().any(|p| f.contains(p)))
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    SkippedCommitDocsFalse,
    SkippedGitignored,
    NothingToCommit,
}

impl CommitOutcome {
    pub fn reason(self) -> &'static str {
        match self {
            CommitOutcome::Committed => "committed",
            CommitOutcome::SkippedCommitDocsFalse => "skipped_commit_docs_false",
            CommitOutcome::SkippedGitignored => "skipped_gitignored",
            CommitOutcome::NothingToCommit => "nothing_to_commit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommitResult {
    pub outcome: CommitOutcome,
    pub hash: Option<String>,
    pub error: Option<String>,
}

/// Stage `files` (default `.infra/`) and commit them with `message`.
pub fn commit_docs(root: &Path, message: &str, files: &[String], enabled: bool) -> CommitResult {
    let skipped = |outcome| CommitResult {
        outcome,
        hash: None,
        error: None,
    };
    if !enabled {
        return skipped(CommitOutcome::SkippedCommitDocsFalse);
    }
    if is_ignored(root, crate::paths::INFRA_DIR) {
        return skipped(CommitOutcome::SkippedGitignored);
    }

    let default_files = [format!("{}/", crate::paths::INFRA_DIR)];
    let to_stage = if files.is_empty() {
        &default_files[..]
    } else {
        files
    };
    for file in to_stage {
        let added = run(root, &["add", file]);
        if !added.success {
            tracing::warn!("git add {file}: {}", added.stderr);
        }
    }

    let committed = run(root, &["commit", "-m", message]);
    if !committed.success {
        let nothing = committed.stdout.contains("nothing to commit")
            || committed.stderr.contains("nothing to commit");
        return CommitResult {
            outcome: CommitOutcome::NothingToCommit,
            hash: None,
            error: (!nothing).then_some(committed.stderr),
        };
    }

    let head = run(root, &["rev-parse", "--short", "HEAD"]);
    CommitResult {
        outcome: CommitOutcome::Committed,
        hash: head.success.then_some(head.stdout),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn disabled_commit_is_skipped() {
        let dir = TempDir::new().unwrap();
        let result = commit_docs(dir.path(), "docs", &[], false);
        assert_eq!(result.outcome, CommitOutcome::SkippedCommitDocsFalse);
        assert_eq!(result.outcome.reason(), "skipped_commit_docs_false");
        assert!(result.hash.is_none());
    }

    #[test]
    fn outside_a_repo_has_no_recent_changes() {
        let dir = TempDir::new().unwrap();
        assert!(!has_recent_infra_changes(dir.path()));
    }
}
