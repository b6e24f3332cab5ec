use crate::output::emit;
use anyhow::Context;
use infra_core::config;
use infra_core::paths;
use serde_json::json;
use std::path::Path;

// ---------------------------------------------------------------------------
// config-ensure-section
// ---------------------------------------------------------------------------

pub fn ensure_section(root: &Path, raw: bool) -> anyhow::Result<()> {
    let created = config::ensure(root).context("failed to create config.json")?;
    if created {
        emit(
            &json!({ "created": true, "path": paths::CONFIG_FILE }),
            raw,
            "created",
        )
    } else {
        emit(
            &json!({ "created": false, "reason": "already_exists" }),
            raw,
            "exists",
        )
    }
}

// ---------------------------------------------------------------------------
// config-set / config-get
// ---------------------------------------------------------------------------

pub fn set(root: &Path, key: &str, value: &str, raw: bool) -> anyhow::Result<()> {
    let value = config::set(root, key, value).context("failed to write config.json")?;
    let raw_value = format!("{key}={}", config::display_value(&value));
    emit(
        &json!({ "updated": true, "key": key, "value": value }),
        raw,
        raw_value,
    )
}

pub fn get(root: &Path, key: &str, raw: bool) -> anyhow::Result<()> {
    let value = config::get(root, key)?;
    let raw_value = config::display_value(&value);
    emit(&value, raw, raw_value)
}
