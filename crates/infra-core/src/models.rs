use std::fmt;

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Sub-agents the workflow dispatches; each gets a model from the active profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agent {
    Scanner,
    ServiceDetector,
    Recommender,
    Architect,
    TerraformGen,
    SecurityAuditor,
    CostEstimator,
    CicdGen,
    Validator,
}

impl Agent {
    pub fn all() -> &'static [Agent] {
        &[
            Agent::Scanner,
            Agent::ServiceDetector,
            Agent::Recommender,
            Agent::Architect,
            Agent::TerraformGen,
            Agent::SecurityAuditor,
            Agent::CostEstimator,
            Agent::CicdGen,
            Agent::Validator,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Agent::Scanner => "infra-scanner",
            Agent::ServiceDetector => "infra-service-detector",
            Agent::Recommender => "infra-recommender",
            Agent::Architect => "infra-architect",
            Agent::TerraformGen => "infra-terraform-gen",
            Agent::SecurityAuditor => "infra-security-auditor",
            Agent::CostEstimator => "infra-cost-estimator",
            Agent::CicdGen => "infra-cicd-gen",
            Agent::Validator => "infra-validator",
        }
    }

    /// `[quality, balanced, budget]` model tiers.
    fn tiers(self) -> [&'static str; 3] {
        match self {
            Agent::Scanner | Agent::ServiceDetector | Agent::CostEstimator => {
                ["sonnet", "haiku", "haiku"]
            }
            Agent::Recommender => ["opus", "sonnet", "haiku"],
            Agent::Architect => ["opus", "opus", "sonnet"],
            Agent::TerraformGen => ["opus", "sonnet", "sonnet"],
            Agent::SecurityAuditor | Agent::CicdGen | Agent::Validator => {
                ["sonnet", "sonnet", "haiku"]
            }
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    Quality,
    #[default]
    Balanced,
    Budget,
}

impl Profile {
    /// Unknown profile names resolve to `Balanced`.
    pub fn parse_lenient(name: &str) -> Profile {
        match name {
            "quality" => Profile::Quality,
            "budget" => Profile::Budget,
            _ => Profile::Balanced,
        }
    }
}

/// Model for `agent` under `profile`. The top tier is reported as `inherit`
/// so the caller keeps whatever model the session already runs.
pub fn resolve(agent: Agent, profile: Profile) -> &'static str {
    let tiers = agent.tiers();
    let model = match profile {
        Profile::Quality => tiers[0],
        Profile::Balanced => tiers[1],
        Profile::Budget => tiers[2],
    };
    if model == "opus" {
        "inherit"
    } else {
        model
    }
}
