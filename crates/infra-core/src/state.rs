use crate::error::{InfraError, Result};
use crate::paths;
use crate::types::Stage;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::path::Path;

pub const CURRENT_STAGE: &str = "Current Stage";
pub const LAST_UPDATED: &str = "Last Updated";
pub const SERVICES_DETECTED: &str = "Services Detected";
pub const DECISIONS_LOCKED: &str = "Decisions Locked";
pub const TERRAFORM_FILES: &str = "Terraform Files";

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `**Name:** value` on a single line. Group 1 is the prefix kept on
/// replacement, group 2 the value.
fn field_re(name: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&format!(
        r"(\*\*{}:\*\*[ \t]*)(.*)",
        regex::escape(name)
    ))
    .case_insensitive(true)
    .build()?)
}

fn section_re(name: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&format!(r"##\s*{}\s*\n", regex::escape(name)))
        .case_insensitive(true)
        .build()?)
}

/// First `**Name:**` value in `content`, trimmed.
pub fn extract_field(content: &str, name: &str) -> Result<Option<String>> {
    Ok(field_re(name)?
        .captures(content)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim().to_string()))
}

/// Leading integer of a field value; anything unparseable counts as zero.
pub fn leading_number(value: &str) -> u64 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// StateDoc
// ---------------------------------------------------------------------------

/// In-memory `STATE.md`. Fields are matched by name, case-insensitively,
/// and only the first occurrence of a duplicated field is ever read or written.
#[derive(Debug, Clone)]
pub struct StateDoc {
    content: String,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct PatchReport {
    pub updated: Vec<String>,
    pub failed: Vec<String>,
}

impl StateDoc {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        crate::io::read_optional(&paths::state_path(root))?
            .map(Self::new)
            .ok_or(InfraError::StateNotFound)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::atomic_write(&paths::state_path(root), self.content.as_bytes())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn field(&self, name: &str) -> Result<Option<String>> {
        extract_field(&self.content, name)
    }

    /// Body of the `## name` section up to the next `##` heading, trimmed.
    pub fn section(&self, name: &str) -> Result<Option<String>> {
        let Some(header) = section_re(name)?.find(&self.content) else {
            return Ok(None);
        };
        let rest = &self.content[header.end()..];
        let body = match rest.find("\n##") {
            Some(end) => &rest[..end],
            None => rest,
        };
        Ok(Some(body.trim().to_string()))
    }

    /// Field value if one matches, otherwise the section body.
    pub fn lookup(&self, name: &str) -> Result<Option<String>> {
        match self.field(name)? {
            Some(v) => Ok(Some(v)),
            None => self.section(name),
        }
    }

    /// Replace the first `**name:**` value. Returns false if the field is absent.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<bool> {
        let re = field_re(name)?;
        let Some(caps) = re.captures(&self.content) else {
            return Ok(false);
        };
        let (Some(prefix), Some(whole)) = (caps.get(1), caps.get(0)) else {
            return Ok(false);
        };
        let mut updated = String::with_capacity(self.content.len() + value.len());
        updated.push_str(&self.content[..prefix.end()]);
        updated.push_str(value);
        updated.push_str(&self.content[whole.end()..]);
        self.content = updated;
        Ok(true)
    }

    /// Apply each `(field, value)` in order, collecting which ones matched.
    pub fn patch(&mut self, patches: &[(String, String)]) -> Result<PatchReport> {
        let mut report = PatchReport::default();
        for (field, value) in patches {
            if self.set_field(field, value)? {
                report.updated.push(field.clone());
            } else {
                report.failed.push(field.clone());
            }
        }
        Ok(report)
    }

    /// Set `Current Stage` and, when present, `Last Updated`.
    /// Returns false if the document has no `Current Stage` field.
    pub fn update_stage(&mut self, stage: Stage, date: &str) -> Result<bool> {
        if !self.set_field(CURRENT_STAGE, stage.as_str())? {
            return Ok(false);
        }
        self.set_field(LAST_UPDATED, date)?;
        Ok(true)
    }

    /// Increment `Services Detected`. Returns the new count, or `None` if the
    /// field is missing.
    pub fn record_service(&mut self) -> Result<Option<u64>> {
        let Some(current) = self.field(SERVICES_DETECTED)? else {
            return Ok(None);
        };
        let count = leading_number(&current) + 1;
        self.set_field(SERVICES_DETECTED, &count.to_string())?;
        Ok(Some(count))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
