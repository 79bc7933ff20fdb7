//! Output formatting for build, detection, and registry reports
//!
//! JSON and YAML render the serialized report; the human format is a short
//! summary meant for terminals.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detection::manifest_matches;
use crate::pipeline::{BuildError, BuildOutcome, BuildRequest, FailurePhase};
use crate::stack::{RuntimeId, Stage, StrategyKind, StrategyRegistry};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// Result of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub service: String,
    pub function: String,
    pub runtime: RuntimeId,
    pub artifact_dir: PathBuf,
    pub outcome: BuildOutcome,
    pub duration_ms: u128,
}

impl BuildReport {
    pub fn new(request: &BuildRequest, outcome: BuildOutcome, duration: Duration) -> Self {
        Self {
            service: request.service_name.clone(),
            function: request.function_name.clone(),
            runtime: request.runtime.clone(),
            artifact_dir: request.artifact_dir.clone(),
            outcome,
            duration_ms: duration.as_millis(),
        }
    }
}

/// A failed build, classified
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub function: String,
    pub runtime: RuntimeId,
    pub phase: FailurePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub error: String,
}

impl FailureReport {
    pub fn new(request: &BuildRequest, error: &BuildError) -> Self {
        Self {
            function: request.function_name.clone(),
            runtime: request.runtime.clone(),
            phase: error.phase(),
            stage: error.stage().cloned(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub pattern: String,
    pub strategy: StrategyKind,
    pub matched: bool,
}

/// Detection result together with how every candidate fared
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub runtime: RuntimeId,
    pub source_dir: PathBuf,
    pub strategy: StrategyKind,
    pub candidates: Vec<CandidateReport>,
}

impl DetectionReport {
    pub fn new(
        registry: &StrategyRegistry,
        runtime: &RuntimeId,
        source_dir: &Path,
        strategy: StrategyKind,
    ) -> Self {
        let candidates = registry
            .lookup(runtime)
            .unwrap_or_default()
            .iter()
            .map(|candidate| CandidateReport {
                pattern: candidate.pattern.to_string(),
                strategy: candidate.kind,
                matched: manifest_matches(source_dir, &candidate.pattern),
            })
            .collect();

        Self {
            runtime: runtime.clone(),
            source_dir: source_dir.to_path_buf(),
            strategy,
            candidates,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeReport {
    pub runtime: RuntimeId,
    pub strategies: Vec<CandidateSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub strategy: StrategyKind,
    pub pattern: String,
}

/// Registered runtimes in registration order
pub fn runtime_reports(registry: &StrategyRegistry) -> Vec<RuntimeReport> {
    registry
        .runtimes()
        .map(|runtime| RuntimeReport {
            runtime: runtime.clone(),
            strategies: registry
                .lookup(runtime)
                .unwrap_or_default()
                .iter()
                .map(|c| CandidateSummary {
                    strategy: c.kind,
                    pattern: c.pattern.to_string(),
                })
                .collect(),
        })
        .collect()
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn format_build(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "build report"),
            OutputFormat::Yaml => to_yaml(report, "build report"),
            OutputFormat::Human => Ok(self.format_build_human(report)),
        }
    }

    pub fn format_failure(&self, report: &FailureReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "failure report"),
            OutputFormat::Yaml => to_yaml(report, "failure report"),
            OutputFormat::Human => Ok(self.format_failure_human(report)),
        }
    }

    pub fn format_detection(&self, report: &DetectionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "detection report"),
            OutputFormat::Yaml => to_yaml(report, "detection report"),
            OutputFormat::Human => Ok(self.format_detection_human(report)),
        }
    }

    pub fn format_runtimes(&self, reports: &[RuntimeReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&reports, "runtime list"),
            OutputFormat::Yaml => to_yaml(&reports, "runtime list"),
            OutputFormat::Human => Ok(self.format_runtimes_human(reports)),
        }
    }

    fn format_build_human(&self, report: &BuildReport) -> String {
        let mut output = String::new();
        output.push_str("\u{2713} Build Succeeded\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!(
            "Function:   {}/{}\n",
            report.service, report.function
        ));
        output.push_str(&format!("Runtime:    {}\n", report.runtime));

        match &report.outcome {
            BuildOutcome::Strategy { strategy, stages } => {
                output.push_str(&format!("Strategy:   {}\n", strategy));
                output.push_str(&format!("Stages:     {}\n", stage_list(stages)));
            }
            BuildOutcome::Command { output: exec } => {
                output.push_str(&format!(
                    "Override:   command (exit {})\n",
                    exit_code(exec.code)
                ));
            }
            BuildOutcome::Script { output: exec } => {
                output.push_str(&format!(
                    "Override:   script (exit {})\n",
                    exit_code(exec.code)
                ));
            }
        }

        output.push_str(&format!("Artifacts:  {}\n", report.artifact_dir.display()));
        output.push_str(&format!("\nCompleted in {}ms\n", report.duration_ms));
        output
    }

    fn format_failure_human(&self, report: &FailureReport) -> String {
        let mut output = String::new();
        output.push_str("\u{2717} Build Failed\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Function:   {}\n", report.function));
        output.push_str(&format!("Runtime:    {}\n", report.runtime));
        let phase = match report.phase {
            FailurePhase::Detection => "detection",
            FailurePhase::Execution => "execution",
        };
        output.push_str(&format!("Phase:      {}\n", phase));
        if let Some(stage) = &report.stage {
            output.push_str(&format!("Stage:      {}\n", stage));
        }
        output.push_str(&format!("Error:      {}\n", report.error));
        output
    }

    fn format_detection_human(&self, report: &DetectionReport) -> String {
        let mut output = String::new();
        output.push_str("Strategy Detection\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Runtime:    {}\n", report.runtime));
        output.push_str(&format!("Source:     {}\n", report.source_dir.display()));
        output.push_str(&format!("Strategy:   {}\n", report.strategy));

        if report.candidates.is_empty() {
            output.push_str("\nNo manifest candidates for this runtime\n");
            return output;
        }

        output.push_str("\nCandidates:\n");
        for (i, candidate) in report.candidates.iter().enumerate() {
            let connector = if i == report.candidates.len() - 1 {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            let mark = if candidate.matched { "\u{2713}" } else { " " };
            output.push_str(&format!(
                "{}\u{2500} {} {:<16} {}\n",
                connector, mark, candidate.pattern, candidate.strategy
            ));
        }
        output
    }

    fn format_runtimes_human(&self, reports: &[RuntimeReport]) -> String {
        let mut output = String::new();
        output.push_str(&format!("Registered Runtimes ({})\n", reports.len()));
        output.push_str(RULE);
        output.push('\n');

        for report in reports {
            let strategies = if report.strategies.is_empty() {
                "(default only)".to_string()
            } else {
                report
                    .strategies
                    .iter()
                    .map(|c| format!("{} [{}]", c.strategy, c.pattern))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            output.push_str(&format!("{:<16} {}\n", report.runtime, strategies));
        }
        output
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn stage_list(stages: &[Stage]) -> String {
    if stages.is_empty() {
        return "(none)".to_string();
    }
    stages.iter().map(Stage::name).collect::<Vec<_>>().join(", ")
}

fn exit_code(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}
