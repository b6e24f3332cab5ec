use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage recorded in `**Current Stage:**`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scan,
    Recommend,
    Discuss,
    Generate,
    Validate,
    Complete,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::Scan,
            Stage::Recommend,
            Stage::Discuss,
            Stage::Generate,
            Stage::Validate,
            Stage::Complete,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Scan => "scan",
            Stage::Recommend => "recommend",
            Stage::Discuss => "discuss",
            Stage::Generate => "generate",
            Stage::Validate => "validate",
            Stage::Complete => "complete",
        }
    }

    /// Comma-separated list of every stage name, in pipeline order.
    pub fn valid_list() -> String {
        Stage::all()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = crate::error::InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(Stage::Scan),
            "recommend" => Ok(Stage::Recommend),
            "discuss" => Ok(Stage::Discuss),
            "generate" => Ok(Stage::Generate),
            "validate" => Ok(Stage::Validate),
            "complete" => Ok(Stage::Complete),
            _ => Err(crate::error::InfraError::InvalidStage {
                stage: s.to_string(),
                valid: Stage::valid_list(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}
