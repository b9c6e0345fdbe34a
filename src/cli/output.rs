//! Output formatting for conversion reports, scan results and advice
//!
//! JSON and YAML render the serialized value as-is; the human format is a
//! compact summary meant for a terminal.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::advise::Advice;
use crate::scanner::{Project, ScanResult};
use crate::workflow::{ConversionReport, StepOutcome};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

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

    pub fn format_report(&self, report: &ConversionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "conversion report"),
            OutputFormat::Yaml => to_yaml(report, "conversion report"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_scan(&self, scan: &ScanResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(scan, "scan result"),
            OutputFormat::Yaml => to_yaml(scan, "scan result"),
            OutputFormat::Human => Ok(self.format_scan_human(scan)),
        }
    }

    pub fn format_advice(&self, advice: &Advice) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(advice, "advice"),
            OutputFormat::Yaml => to_yaml(advice, "advice"),
            OutputFormat::Human => Ok(self.format_advice_human(advice)),
        }
    }

    fn format_report_human(&self, report: &ConversionReport) -> String {
        let mut output = String::new();

        let symbol = match report.exit_code() {
            0 => "\u{2713}",
            2 => "\u{26A0}",
            _ => "\u{2717}",
        };
        output.push_str(&format!("{} Conversion {}\n", symbol, report.status));
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Branch:   {}\n", report.branch));
        if report.dry_run {
            output.push_str("Mode:     dry run\n");
        }
        output.push('\n');

        output.push_str("Steps:\n");
        for (i, step) in report.steps.iter().enumerate() {
            let connector = if i + 1 == report.steps.len() {
                "\u{2514}\u{2500}"
            } else {
                "\u{251C}\u{2500}"
            };
            let mark = match step.outcome {
                StepOutcome::Success => "\u{2713}",
                StepOutcome::Skipped => "-",
                StepOutcome::Failed => "\u{2717}",
            };
            output.push_str(&format!("{} {} {:<22}", connector, mark, step.step.to_string()));
            if !step.detail.is_empty() {
                output.push_str(&step.detail);
            }
            output.push('\n');
            for commit in &step.commits {
                output.push_str(&format!("       {}\n", commit));
            }
        }

        if let Some(abort) = &report.abort {
            output.push_str(&format!("\nAborted at {}: {}\n", abort.step, abort.error));
        }

        if !report.mapped_libraries.is_empty() {
            output.push_str("\nMapped libraries:\n");
            for mapping in &report.mapped_libraries {
                output.push_str(&format!("  - {} -> {}\n", mapping.library, mapping.package));
            }
        }

        if !report.relocations.is_empty() {
            output.push_str("\nRelocated libraries:\n");
            for relocation in &report.relocations {
                output.push_str(&format!(
                    "  - {} -> {}\n",
                    relocation.library,
                    relocation.destination.display()
                ));
            }
        }

        if !report.warnings.is_empty() {
            output.push_str("\n\u{26A0} Warnings:\n");
            for warning in &report.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
        }

        output
    }

    fn format_scan_human(&self, scan: &ScanResult) -> String {
        let mut output = String::new();
        output.push_str("Site Scan\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        if scan.is_empty() {
            output.push_str("No projects found.\n");
            return output;
        }

        push_projects(&mut output, "Contrib projects", &scan.contrib);
        push_projects(&mut output, "Custom projects", &scan.custom);
        push_projects(&mut output, "Libraries", &scan.libraries);
        output.push_str(&format!("Core modules: {}\n", scan.core.len()));
        output
    }

    fn format_advice_human(&self, advice: &Advice) -> String {
        let mut output = format!("Site shape: {}\n\n{}\n", advice.shape, advice.advice);
        if !advice.extra_packages.is_empty() {
            output.push_str("\nPackages:\n");
            for package in &advice.extra_packages {
                output.push_str(&format!("  - {}\n", package));
            }
        }
        output
    }
}

fn push_projects(output: &mut String, title: &str, projects: &[Project]) {
    if projects.is_empty() {
        return;
    }
    output.push_str(&format!("{} ({}):\n", title, projects.len()));
    for project in projects {
        let version = project.version().unwrap_or("-");
        output.push_str(&format!(
            "  {:<28} {:<12} {}\n",
            project.name(),
            version,
            project.path().display()
        ));
    }
    output.push('\n');
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}
