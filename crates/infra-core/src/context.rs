//! Aggregated snapshots handed to workflow prompts at startup.
//!
//! Each builder reads config, artifact existence and model assignments in one
//! pass so a workflow needs a single tool call to orient itself.

use crate::config::Config;
use crate::models::{self, Agent, Profile};
use crate::paths::{self, exists};
use crate::state::{self, StateDoc};
use crate::{detect, git, terraform};
use serde::Serialize;
use std::path::Path;

fn model(config: &Config, agent: Agent) -> String {
    let resolved = models::resolve(agent, Profile::parse_lenient(&config.model_profile));
    tracing::debug!("{agent} -> {resolved}");
    resolved.to_string()
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Which pipeline artifacts are present on disk.
#[derive(Debug, Clone, Serialize)]
pub struct Artifacts {
    pub config_exists: bool,
    pub state_exists: bool,
    pub analysis_exists: bool,
    pub services_exists: bool,
    pub recommendations_exists: bool,
    pub decisions_exists: bool,
    pub architecture_exists: bool,
    pub terraform_exists: bool,
}

impl Artifacts {
    pub fn scan(root: &Path, config: &Config) -> Self {
        Self {
            config_exists: exists(root, paths::CONFIG_FILE),
            state_exists: exists(root, paths::STATE_FILE),
            analysis_exists: exists(root, paths::ANALYSIS_FILE),
            services_exists: exists(root, paths::SERVICES_FILE),
            recommendations_exists: exists(root, paths::RECOMMENDATIONS_FILE),
            decisions_exists: exists(root, paths::DECISIONS_FILE),
            architecture_exists: exists(root, paths::ARCHITECTURE_FILE),
            terraform_exists: exists(root, &config.terraform_output_dir),
        }
    }
}

// ---------------------------------------------------------------------------
// state (load)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StateSnapshot {
    pub config: Config,
    pub state_raw: String,
    pub state_exists: bool,
    pub config_exists: bool,
    pub analysis_exists: bool,
    pub services_exists: bool,
    pub recommendations_exists: bool,
    pub decisions_exists: bool,
    pub architecture_exists: bool,
    pub terraform_exists: bool,
}

pub fn state_snapshot(root: &Path) -> StateSnapshot {
    let config = Config::load(root);
    let a = Artifacts::scan(root, &config);
    let state_raw = StateDoc::load(root)
        .map(|d| d.content().to_string())
        .unwrap_or_default();
    StateSnapshot {
        state_exists: !state_raw.is_empty(),
        state_raw,
        config_exists: a.config_exists,
        analysis_exists: a.analysis_exists,
        services_exists: a.services_exists,
        recommendations_exists: a.recommendations_exists,
        decisions_exists: a.decisions_exists,
        architecture_exists: a.architecture_exists,
        terraform_exists: a.terraform_exists,
        config,
    }
}

// ---------------------------------------------------------------------------
// init new-project
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct NewProjectContext {
    pub scanner_model: String,
    pub detector_model: String,
    pub recommender_model: String,
    pub architect_model: String,
    pub terraform_gen_model: String,

    pub aws_region: String,
    pub environment: String,
    pub commit_docs: bool,
    pub terraform_output_dir: String,

    pub auto_approve_recommendations: bool,
    pub run_security_audit: bool,
    pub run_cost_estimate: bool,
    pub generate_cicd: bool,

    pub has_dockerfile: bool,
    pub has_docker_compose: bool,
    pub detected_languages: Vec<&'static str>,

    pub infra_exists: bool,
    #[serde(flatten)]
    pub artifacts: Artifacts,
    pub has_git: bool,

    pub config_path: &'static str,
    pub state_path: &'static str,
    pub analysis_path: &'static str,
    pub services_path: &'static str,
}

pub fn new_project(root: &Path) -> NewProjectContext {
    let config = Config::load(root);
    NewProjectContext {
        scanner_model: model(&config, Agent::Scanner),
        detector_model: model(&config, Agent::ServiceDetector),
        recommender_model: model(&config, Agent::Recommender),
        architect_model: model(&config, Agent::Architect),
        terraform_gen_model: model(&config, Agent::TerraformGen),
        aws_region: config.aws_region.clone(),
        environment: config.environment.clone(),
        commit_docs: config.commit_docs,
        terraform_output_dir: config.terraform_output_dir.clone(),
        auto_approve_recommendations: config.workflow.auto_approve_recommendations,
        run_security_audit: config.workflow.run_security_audit,
        run_cost_estimate: config.workflow.run_cost_estimate,
        generate_cicd: config.workflow.generate_cicd,
        has_dockerfile: detect::has_dockerfile(root),
        has_docker_compose: detect::has_docker_compose(root),
        detected_languages: detect::languages(root),
        infra_exists: exists(root, paths::INFRA_DIR),
        artifacts: Artifacts::scan(root, &config),
        has_git: exists(root, ".git"),
        config_path: paths::CONFIG_FILE,
        state_path: paths::STATE_FILE,
        analysis_path: paths::ANALYSIS_FILE,
        services_path: paths::SERVICES_FILE,
    }
}

// ---------------------------------------------------------------------------
// init analyze
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AnalyzeContext {
    pub scanner_model: String,
    pub detector_model: String,
    pub commit_docs: bool,
    pub analysis_exists: bool,
    pub previous_analysis_date: Option<String>,
    pub has_recent_changes: bool,
    pub services_exists: bool,
    pub analysis_path: &'static str,
    pub services_path: &'static str,
    pub state_path: &'static str,
}

pub fn analyze(root: &Path) -> AnalyzeContext {
    let config = Config::load(root);
    let analysis = crate::io::read_optional(&root.join(paths::ANALYSIS_FILE))
        .ok()
        .flatten();
    let previous_analysis_date = analysis
        .as_deref()
        .and_then(|content| state::extract_field(content, "Date").ok().flatten())
        .filter(|d| !d.is_empty());
    AnalyzeContext {
        scanner_model: model(&config, Agent::Scanner),
        detector_model: model(&config, Agent::ServiceDetector),
        commit_docs: config.commit_docs,
        analysis_exists: analysis.is_some(),
        previous_analysis_date,
        has_recent_changes: git::has_recent_infra_changes(root),
        services_exists: exists(root, paths::SERVICES_FILE),
        analysis_path: paths::ANALYSIS_FILE,
        services_path: paths::SERVICES_FILE,
        state_path: paths::STATE_FILE,
    }
}

// ---------------------------------------------------------------------------
// init generate
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateContext {
    pub architect_model: String,
    pub terraform_gen_model: String,
    pub cicd_gen_model: String,
    pub validator_model: String,
    pub security_auditor_model: String,
    pub cost_estimator_model: String,

    pub aws_region: String,
    pub environment: String,
    pub commit_docs: bool,
    pub terraform_output_dir: String,
    pub run_security_audit: bool,
    pub run_cost_estimate: bool,
    pub generate_cicd: bool,

    pub analysis_exists: bool,
    pub decisions_exists: bool,
    pub architecture_exists: bool,
    pub services_exists: bool,
    pub prerequisites_met: bool,
    pub terraform_exists: bool,

    pub analysis_path: &'static str,
    pub decisions_path: &'static str,
    pub architecture_path: &'static str,
    pub services_path: &'static str,
    pub terraform_dir: String,
    pub state_path: &'static str,
}

pub fn generate(root: &Path) -> GenerateContext {
    let config = Config::load(root);
    let a = Artifacts::scan(root, &config);
    GenerateContext {
        architect_model: model(&config, Agent::Architect),
        terraform_gen_model: model(&config, Agent::TerraformGen),
        cicd_gen_model: model(&config, Agent::CicdGen),
        validator_model: model(&config, Agent::Validator),
        security_auditor_model: model(&config, Agent::SecurityAuditor),
        cost_estimator_model: model(&config, Agent::CostEstimator),
        aws_region: config.aws_region.clone(),
        environment: config.environment.clone(),
        commit_docs: config.commit_docs,
        terraform_output_dir: config.terraform_output_dir.clone(),
        run_security_audit: config.workflow.run_security_audit,
        run_cost_estimate: config.workflow.run_cost_estimate,
        generate_cicd: config.workflow.generate_cicd,
        analysis_exists: a.analysis_exists,
        decisions_exists: a.decisions_exists,
        architecture_exists: a.architecture_exists,
        services_exists: a.services_exists,
        prerequisites_met: a.analysis_exists && a.decisions_exists,
        terraform_exists: a.terraform_exists,
        analysis_path: paths::ANALYSIS_FILE,
        decisions_path: paths::DECISIONS_FILE,
        architecture_path: paths::ARCHITECTURE_FILE,
        services_path: paths::SERVICES_FILE,
        terraform_dir: config.terraform_output_dir,
        state_path: paths::STATE_FILE,
    }
}

// ---------------------------------------------------------------------------
// init progress
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ProgressContext {
    pub current_stage: String,
    pub services_detected: u64,
    pub decisions_locked: bool,
    pub terraform_file_count: u64,

    #[serde(flatten)]
    pub artifacts: Artifacts,
    pub security_audit_exists: bool,
    pub cost_estimate_exists: bool,

    pub aws_region: String,
    pub environment: String,

    pub state_path: &'static str,
}

pub fn progress(root: &Path) -> ProgressContext {
    let config = Config::load(root);
    let doc = StateDoc::load(root).ok();
    let field = |name: &str| {
        doc.as_ref()
            .and_then(|d| d.field(name).ok().flatten())
            .filter(|v| !v.is_empty())
    };

    let current_stage = field(state::CURRENT_STAGE).unwrap_or_else(|| "not_started".to_string());
    let services_detected = field(state::SERVICES_DETECTED)
        .map(|v| state::leading_number(&v))
        .unwrap_or(0);
    let decisions_locked = field(state::DECISIONS_LOCKED).is_some_and(|v| {
        let v = v.to_lowercase();
        v.starts_with("yes") || v.starts_with("true")
    });
    let terraform_file_count = match terraform::count(root, &config.terraform_output_dir) {
        Some(n) => n as u64,
        None => field(state::TERRAFORM_FILES)
            .map(|v| state::leading_number(&v))
            .unwrap_or(0),
    };

    ProgressContext {
        current_stage,
        services_detected,
        decisions_locked,
        terraform_file_count,
        artifacts: Artifacts::scan(root, &config),
        security_audit_exists: exists(root, paths::SECURITY_AUDIT_FILE),
        cost_estimate_exists: exists(root, paths::COST_ESTIMATE_FILE),
        aws_region: config.aws_region,
        environment: config.environment,
        state_path: paths::STATE_FILE,
    }
}

// ---------------------------------------------------------------------------
// init audit
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AuditContext {
    pub security_auditor_model: String,
    pub cost_estimator_model: String,
    pub validator_model: String,

    pub aws_region: String,
    pub environment: String,
    pub commit_docs: bool,
    pub run_security_audit: bool,
    pub run_cost_estimate: bool,

    pub terraform_exists: bool,
    pub terraform_file_count: usize,
    pub architecture_exists: bool,
    pub security_audit_exists: bool,
    pub cost_estimate_exists: bool,
    pub ready: bool,

    pub terraform_dir: String,
    pub architecture_path: &'static str,
    pub security_audit_path: &'static str,
    pub cost_estimate_path: &'static str,
    pub state_path: &'static str,
}

pub fn audit(root: &Path) -> AuditContext {
    let config = Config::load(root);
    let tf_count = terraform::count(root, &config.terraform_output_dir);
    AuditContext {
        security_auditor_model: model(&config, Agent::SecurityAuditor),
        cost_estimator_model: model(&config, Agent::CostEstimator),
        validator_model: model(&config, Agent::Validator),
        aws_region: config.aws_region.clone(),
        environment: config.environment.clone(),
        commit_docs: config.commit_docs,
        run_security_audit: config.workflow.run_security_audit,
        run_cost_estimate: config.workflow.run_cost_estimate,
        terraform_exists: tf_count.is_some(),
        terraform_file_count: tf_count.unwrap_or(0),
        architecture_exists: exists(root, paths::ARCHITECTURE_FILE),
        security_audit_exists: exists(root, paths::SECURITY_AUDIT_FILE),
        cost_estimate_exists: exists(root, paths::COST_ESTIMATE_FILE),
        ready: tf_count.unwrap_or(0) > 0,
        terraform_dir: config.terraform_output_dir,
        architecture_path: paths::ARCHITECTURE_FILE,
        security_audit_path: paths::SECURITY_AUDIT_FILE,
        cost_estimate_path: paths::COST_ESTIMATE_FILE,
        state_path: paths::STATE_FILE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
