use crate::error::{InfraError, Result};
use crate::paths;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// WorkflowConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowConfig {
    pub auto_approve_recommendations: bool,
    pub run_security_audit: bool,
    pub run_cost_estimate: bool,
    pub generate_cicd: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            auto_approve_recommendations: false,
            run_security_audit: true,
            run_cost_estimate: true,
            generate_cicd: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Resolved project settings from `.infra/config.json`.
///
/// Loading never fails. A missing or unreadable file yields the defaults, and
/// every individual key falls back to its default when absent or mistyped.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Config {
    pub aws_region: String,
    pub environment: String,
    pub model_profile: String,
    pub commit_docs: bool,
    pub terraform_output_dir: String,
    pub workflow: WorkflowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_region: "us-east-1".to_string(),
            environment: "production".to_string(),
            model_profile: "balanced".to_string(),
            commit_docs: true,
            terraform_output_dir: paths::DEFAULT_TERRAFORM_DIR.to_string(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Self {
        let path = paths::config_path(root);
        let Ok(data) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(&data) {
            Ok(doc) => Self::from_value(&doc),
            Err(e) => {
                tracing::warn!("ignoring unparseable {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Build a config from an untyped document, key by key.
    pub fn from_value(doc: &Value) -> Self {
        let d = Self::default();
        let str_key = |key: &str, default: String| {
            doc.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(default)
        };
        // Workflow flags may sit at the top level or under `workflow`.
        let flag = |key: &str, default: bool| {
            doc.get(key)
                .and_then(Value::as_bool)
                .or_else(|| doc.get("workflow")?.get(key)?.as_bool())
                .unwrap_or(default)
        };
        Self {
            aws_region: str_key("aws_region", d.aws_region),
            environment: str_key("environment", d.environment),
            model_profile: str_key("model_profile", d.model_profile),
            commit_docs: doc
                .get("commit_docs")
                .and_then(Value::as_bool)
                .unwrap_or(d.commit_docs),
            terraform_output_dir: str_key("terraform_output_dir", d.terraform_output_dir),
            workflow: WorkflowConfig {
                auto_approve_recommendations: flag(
                    "auto_approve_recommendations",
                    d.workflow.auto_approve_recommendations,
                ),
                run_security_audit: flag("run_security_audit", d.workflow.run_security_audit),
                run_cost_estimate: flag("run_cost_estimate", d.workflow.run_cost_estimate),
                generate_cicd: flag("generate_cicd", d.workflow.generate_cicd),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Raw document access
// ---------------------------------------------------------------------------

/// Create `.infra/config.json` with the defaults. Returns false if it already exists.
pub fn ensure(root: &Path) -> Result<bool> {
    crate::io::ensure_dir(&paths::infra_dir(root))?;
    let data = serde_json::to_string_pretty(&Config::default())?;
    crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
}

/// Read the untyped config document. Errors when the file is missing or invalid.
pub fn read_document(root: &Path) -> Result<Value> {
    let path = paths::config_path(root);
    let Some(data) = crate::io::read_optional(&path)? else {
        return Err(InfraError::ConfigNotFound(path.display().to_string()));
    };
    Ok(serde_json::from_str(&data)?)
}

/// Look up a dotted key path such as `workflow.run_security_audit`.
pub fn get_key<'a>(doc: &'a Value, key_path: &str) -> Option<&'a Value> {
    key_path
        .split('.')
        .try_fold(doc, |current, key| current.as_object()?.get(key))
}

pub fn get(root: &Path, key_path: &str) -> Result<Value> {
    let doc = read_document(root)?;
    get_key(&doc, key_path)
        .cloned()
        .ok_or_else(|| InfraError::KeyNotFound(key_path.to_string()))
}

/// Assign `value` at a dotted key path, replacing any non-object on the way.
pub fn set_key(doc: &mut Value, key_path: &str, value: Value) {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    let mut keys: Vec<&str> = key_path.split('.').collect();
    let last = keys.pop().unwrap_or_default();
    let mut current = doc;
    for key in keys {
        let Value::Object(map) = current else {
            return;
        };
        let slot = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot;
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

/// Set a key in `.infra/config.json`, creating the file if needed.
pub fn set(root: &Path, key_path: &str, raw_value: &str) -> Result<Value> {
    let path = paths::config_path(root);
    let mut doc = match crate::io::read_optional(&path)? {
        Some(data) => serde_json::from_str(&data)?,
        None => Value::Object(Map::new()),
    };
    let value = parse_value(raw_value);
    set_key(&mut doc, key_path, value.clone());
    let data = serde_json::to_string_pretty(&doc)?;
    crate::io::atomic_write(&path, data.as_bytes())?;
    Ok(value)
}

/// Interpret a CLI value: `true`/`false` as booleans, numerics as numbers,
/// anything else as a string.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(raw.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::from(f as i64)
        }
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::String(raw.to_string()),
    }
}

/// Plain-text form of a JSON value for raw output.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
