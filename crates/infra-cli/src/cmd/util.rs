use crate::output::emit;
use chrono::{SecondsFormat, Utc};
use infra_core::config::Config;
use infra_core::{git, paths};
use serde_json::json;
use std::path::Path;

// ---------------------------------------------------------------------------
// generate-slug / current-timestamp
// ---------------------------------------------------------------------------

pub fn generate_slug(text: Option<&str>, raw: bool) -> anyhow::Result<()> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        anyhow::bail!("text required for slug generation");
    };
    let slug = paths::slugify(text);
    emit(&json!({ "slug": slug }), raw, slug.clone())
}

/// Timestamp in one of the formats `full`, `date` or `filename`. Anything else
/// falls back to `full`.
pub fn format_timestamp(now: chrono::DateTime<Utc>, format: &str) -> String {
    match format {
        "date" => now.format("%Y-%m-%d").to_string(),
        "filename" => now.format("%Y-%m-%dT%H-%M-%S").to_string(),
        _ => now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn current_timestamp(format: Option<&str>, raw: bool) -> anyhow::Result<()> {
    let timestamp = format_timestamp(Utc::now(), format.unwrap_or("full"));
    emit(&json!({ "timestamp": timestamp }), raw, timestamp.clone())
}

// ---------------------------------------------------------------------------
// verify-path-exists
// ---------------------------------------------------------------------------

pub fn verify_path_exists(root: &Path, target: Option<&str>, raw: bool) -> anyhow::Result<()> {
    let Some(target) = target.filter(|t| !t.is_empty()) else {
        anyhow::bail!("path required for verification");
    };
    // An absolute `target` replaces `root` in the join.
    let full = root.join(target);
    match std::fs::metadata(&full) {
        Ok(meta) => {
            let kind = if meta.is_dir() {
                "directory"
            } else if meta.is_file() {
                "file"
            } else {
                "other"
            };
            emit(&json!({ "exists": true, "type": kind }), raw, "true")
        }
        Err(_) => emit(&json!({ "exists": false, "type": null }), raw, "false"),
    }
}

// ---------------------------------------------------------------------------
// commit
// ---------------------------------------------------------------------------

pub fn commit(root: &Path, message: Option<&str>, files: &[String], raw: bool) -> anyhow::Result<()> {
    let Some(message) = message.filter(|m| !m.is_empty()) else {
        anyhow::bail!("commit message required");
    };
    let config = Config::load(root);
    let result = git::commit_docs(root, message, files, config.commit_docs);

    let raw_value = match result.outcome {
        git::CommitOutcome::Committed => result
            .hash
            .clone()
            .unwrap_or_else(|| "committed".to_string()),
        git::CommitOutcome::NothingToCommit => "nothing".to_string(),
        _ => "skipped".to_string(),
    };
    let mut value = json!({
        "committed": result.outcome == git::CommitOutcome::Committed,
        "hash": result.hash,
        "reason": result.outcome.reason(),
    });
    if let Some(err) = result.error {
        value["error"] = json!(err);
    }
    emit(&value, raw, raw_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_formats() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(format_timestamp(now, "date"), "2024-03-05");
        assert_eq!(format_timestamp(now, "filename"), "2024-03-05T14-07-09");
        assert_eq!(format_timestamp(now, "full"), "2024-03-05T14:07:09.000Z");
        assert_eq!(format_timestamp(now, "weird"), "2024-03-05T14:07:09.000Z");
    }
}
