use infra_core::io;
use serde_json::{Map, Value};
use std::path::Path;

/// Set `experimental.enableAgents = true` in a Gemini `settings.json`.
///
/// A missing or unparseable file starts from `{}`; other keys are kept.
/// Returns false without writing when the flag is already on.
pub fn enable_gemini_agents(path: &Path) -> anyhow::Result<bool> {
    let mut settings = match io::read_optional(path)? {
        Some(data) => serde_json::from_str::<Value>(&data).unwrap_or_else(|e| {
            tracing::warn!("replacing unparseable {}: {e}", path.display());
            Value::Object(Map::new())
        }),
        None => Value::Object(Map::new()),
    };
    if !settings.is_object() {
        settings = Value::Object(Map::new());
    }

    let already = settings
        .pointer("/experimental/enableAgents")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if already {
        return Ok(false);
    }

    infra_core::config::set_key(&mut settings, "experimental.enableAgents", Value::Bool(true));
    let data = format!("{}\n", serde_json::to_string_pretty(&settings)?);
    io::atomic_write(path, data.as_bytes())?;
    Ok(true)
}
