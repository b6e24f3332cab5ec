use crate::error::Result;
use crate::paths;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

const TABLE_HEADER: &str = "| Name | Type | Language | Framework | Port | Path |\n\
                            |------|------|----------|-----------|------|------|\n";

static ROW_RE: OnceLock<Regex> = OnceLock::new();

fn row_re() -> &'static Regex {
    ROW_RE.get_or_init(|| {
        Regex::new(r"\|([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|").unwrap()
    })
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// One row of the `SERVICES.md` table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Service {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub language: String,
    pub framework: String,
    pub port: String,
    pub path: String,
}

impl Service {
    /// A service with every column but the name at its placeholder default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "unknown".to_string(),
            language: "unknown".to_string(),
            framework: "none".to_string(),
            port: "-".to_string(),
            path: ".".to_string(),
        }
    }

    pub fn to_row(&self) -> String {
        format!(
            "| {} | {} | {} | {} | {} | {} |",
            self.name, self.kind, self.language, self.framework, self.port, self.path
        )
    }
}

// ---------------------------------------------------------------------------
// Table operations
// ---------------------------------------------------------------------------

/// Parse every data row out of a services document. The first six-cell row
/// is the header; separator rows are skipped.
pub fn parse(content: &str) -> Vec<Service> {
    row_re()
        .captures_iter(content)
        .skip(1)
        .filter_map(|caps| {
            let cells: Vec<String> = (1..=6)
                .map(|i| caps.get(i).map_or("", |m| m.as_str()).trim().to_string())
                .collect();
            if cells[0].starts_with("---") || cells[0].starts_with(":--") {
                return None;
            }
            let [name, kind, language, framework, port, path]: [String; 6] =
                cells.try_into().ok()?;
            Some(Service {
                name,
                kind,
                language,
                framework,
                port,
                path,
            })
        })
        .collect()
}

pub fn list(root: &Path) -> Result<Vec<Service>> {
    Ok(crate::io::read_optional(&paths::services_path(root))?
        .map(|content| parse(&content))
        .unwrap_or_default())
}

/// Append a row, creating the document with its heading and header when
/// missing. Returns true if the file was created.
pub fn add(root: &Path, service: &Service) -> Result<bool> {
    let path = paths::services_path(root);
    crate::io::ensure_dir(&paths::infra_dir(root))?;
    let row = service.to_row();
    match crate::io::read_optional(&path)? {
        None => {
            let content = format!("# Services\n\n{TABLE_HEADER}{row}\n");
            crate::io::atomic_write(&path, content.as_bytes())?;
            Ok(true)
        }
        Some(existing) => {
            let content = format!("{}\n{row}\n", existing.trim_end());
            crate::io::atomic_write(&path, content.as_bytes())?;
            Ok(false)
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Removal {
    Removed,
    FileMissing,
    NotFound,
}

/// Drop every data row whose first cell matches `name` case-insensitively.
/// The header row always survives.
pub fn remove(root: &Path, name: &str) -> Result<Removal> {
    let path = paths::services_path(root);
    let Some(content) = crate::io::read_optional(&path)? else {
        return Ok(Removal::FileMissing);
    };
    let wanted = name.to_lowercase();
    let mut seen_header = false;
    let mut removed = false;
    let kept: Vec<&str> = content
        .split('\n')
        .filter(|line| {
            if !line.starts_with('|') {
                return true;
            }
            if !seen_header {
                seen_header = true;
                return true;
            }
            let first = line.split('|').map(str::trim).find(|c| !c.is_empty());
            let hit = first.is_some_and(|c| c.to_lowercase() == wanted);
            removed |= hit;
            !hit
        })
        .collect();
    if !removed {
        return Ok(Removal::NotFound);
    }
    crate::io::atomic_write(&path, kept.join("\n").as_bytes())?;
    Ok(Removal::Removed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
