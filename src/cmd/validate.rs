//! Validate command - surface data quality issues without writing documents

use crate::cmd::RunArgs;
use crate::core::{Diagnostic, Format, Pipeline, RunReport, StructuralIssue};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    input: RunArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// JSON output for one format
#[derive(Debug, Serialize)]
struct FormatValidation<'a> {
    format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration_error: Option<String>,
    error_count: usize,
    warning_count: usize,
    diagnostics: &'a [Diagnostic],
    issues: &'a [StructuralIssue],
}

fn collect(report: &RunReport) -> Vec<FormatValidation<'_>> {
    report
        .formats
        .iter()
        .map(|(format, result)| match result {
            Ok(r) => FormatValidation {
                format: *format,
                configuration_error: None,
                error_count: r.errors(),
                warning_count: r.warnings(),
                diagnostics: &r.diagnostics,
                issues: &r.issues,
            },
            Err(e) => FormatValidation {
                format: *format,
                configuration_error: Some(e.to_string()),
                error_count: 1,
                warning_count: 0,
                diagnostics: &[],
                issues: &[],
            },
        })
        .collect()
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let inputs = self.input.load()?;
        let report = Pipeline::new(&inputs.config, &inputs.resolver).run(&inputs.rows);
        let formats = collect(&report);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&formats)?);
        } else {
            print_text(&formats, inputs.config.year);
        }

        // Exit with code 1 if any format is blocked
        if !report.is_ready() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn print_text(formats: &[FormatValidation], year: i32) {
    println!();
    println!("VALIDATION RESULTS ({})", year);

    for f in formats {
        println!();
        let heading = format!("F{} {}", f.format, f.format.def().title);
        if let Some(error) = &f.configuration_error {
            println!("{}: \u{2717} {}", heading, error);
            continue;
        }
        if f.error_count == 0 && f.warning_count == 0 && f.issues.is_empty() {
            println!("{}: \u{2713} No issues found.", heading);
            continue;
        }
        println!(
            "{}: {} error(s), {} warning(s), {} skipped row(s)",
            heading,
            f.error_count,
            f.warning_count,
            f.issues.len()
        );
        for d in f.diagnostics {
            let marker = if d.is_error() { "\u{2717}" } else { "\u{26A0}" };
            println!("  {} {} [{}] {}", marker, d.location, d.field, d.message);
        }
        for issue in f.issues {
            println!("  - {}", issue);
        }
    }
}
