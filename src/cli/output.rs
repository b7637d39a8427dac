//! Output formatting for run reports and target listings
//!
//! Reports go to stdout in one of three formats; logs stay on stderr.

use anyhow::{Context, Result};

use crate::config::EffectiveOptions;
use crate::hooks::HookOutcome;
use crate::pipeline::{RunReport, TargetStatus};
use crate::selection::Target;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of a package, clean, or hook run
    pub fn format_outcome(&self, outcome: &HookOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).context("Failed to serialize outcome to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(outcome).context("Failed to serialize outcome to YAML")
            }
            OutputFormat::Human => Ok(self.format_outcome_human(outcome)),
        }
    }

    /// Formats the selection a package run would process
    pub fn format_targets(&self, options: &EffectiveOptions, targets: &[Target]) -> Result<String> {
        let listing = serde_json::json!({
            "options": {
                "wrap_name": options.wrap_name,
                "lib_sub_dir": options.lib_sub_dir,
                "cleanup": options.cleanup_enabled,
                "dockerized_pip": options.use_container,
                "python_bin": options.python_bin,
            },
            "targets": targets,
        });

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&listing)
                .context("Failed to serialize targets to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&listing).context("Failed to serialize targets to YAML")
            }
            OutputFormat::Human => Ok(self.format_targets_human(options, targets)),
        }
    }

    fn format_outcome_human(&self, outcome: &HookOutcome) -> String {
        match outcome {
            HookOutcome::Skipped { reason } => format!("- Skipped: {}\n", reason),
            HookOutcome::Completed { report } => self.format_report_human(report),
        }
    }

    fn format_report_human(&self, report: &RunReport) -> String {
        let mut output = String::new();

        let header = if report.has_failures() {
            "\u{2717}"
        } else {
            "\u{2713}"
        };
        output.push_str(&format!("{} pyshim {}\n", header, report.action));
        output.push_str(RULE);
        output.push_str("\n\n");

        if report.targets.is_empty() {
            output.push_str("No functions selected\n");
            return output;
        }

        for outcome in &report.targets {
            match &outcome.status {
                TargetStatus::Completed => {
                    output.push_str(&format!("\u{2713} {}\n", outcome.function));
                }
                TargetStatus::Skipped { reason } => {
                    output.push_str(&format!("- {} (skipped)\n", outcome.function));
                    output.push_str(&format!("  Reason: {}\n", reason));
                }
                TargetStatus::Failed { error } => {
                    output.push_str(&format!("\u{2717} {}\n", outcome.function));
                    output.push_str(&format!("  Error: {}\n", error));
                }
            }
            output.push_str(&format!("  Stage: {}\n", outcome.stage));
        }

        output.push_str(&format!(
            "\n{} completed, {} skipped, {} failed\n",
            report.completed(),
            report.skipped(),
            report.failed()
        ));
        output
    }

    fn format_targets_human(&self, options: &EffectiveOptions, targets: &[Target]) -> String {
        let mut output = String::new();

        output.push_str("pyshim targets\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&options.to_string());
        output.push('\n');

        if targets.is_empty() {
            output.push_str("No functions selected\n");
            return output;
        }

        for (i, target) in targets.iter().enumerate() {
            let connector = if i == targets.len() - 1 {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            output.push_str(&format!(
                "{}\u{2500} {}  {} -> {} ({})\n",
                connector,
                target.name,
                target.function.handler,
                target.real_handler,
                target.function.runtime
            ));
        }
        output
    }
}
