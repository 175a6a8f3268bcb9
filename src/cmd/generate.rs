//! Generate command - tabular and XML documents for every requested format

use crate::cmd::RunArgs;
use crate::core::{
    reconcile, render_xml, to_latin1, write_tabular, Envelope, FormatReport, Pipeline,
    Reconciliation, RunConfig,
};
use clap::Args;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct GenerateCommand {
    #[command(flatten)]
    input: RunArgs,

    /// Directory the F<code>.csv and F<code>.xml files are written to
    #[arg(short, long)]
    out: PathBuf,

    /// Also write formats that failed validation (they are not compliant)
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Errors")]
    errors: usize,
    #[tabled(rename = "Warnings")]
    warnings: usize,
    #[tabled(rename = "Issues")]
    issues: usize,
    #[tabled(rename = "Envelope")]
    envelope: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "SHA-256")]
    digest: String,
}

#[derive(Debug, Tabled)]
struct ReconciliationRow {
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Report")]
    report_total: String,
    #[tabled(rename = "Ledger")]
    source: &'static str,
    #[tabled(rename = "Ledger Total")]
    ledger_total: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Reconciliation> for ReconciliationRow {
    fn from(r: &Reconciliation) -> Self {
        ReconciliationRow {
            format: r.format.to_string(),
            item: r.item,
            report_total: format_pesos(r.report_total),
            source: r.source,
            ledger_total: format_pesos(r.ledger_total),
            status: r.status.to_string(),
        }
    }
}

impl GenerateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let inputs = self.input.load()?;
        let report = Pipeline::new(&inputs.config, &inputs.resolver).run(&inputs.rows);
        fs::create_dir_all(&self.out)?;

        let mut envelope = inputs.config.first_envelope;
        let mut summary = Vec::new();
        for (format, result) in &report.formats {
            let format_report = match result {
                Ok(r) => r,
                Err(e) => {
                    summary.push(SummaryRow {
                        format: format.to_string(),
                        records: 0,
                        errors: 0,
                        warnings: 0,
                        issues: 0,
                        envelope: "-".to_string(),
                        status: format!("Misconfigured: {e}"),
                        digest: String::new(),
                    });
                    continue;
                }
            };
            let ready = format_report.is_ready();
            let mut row = SummaryRow {
                format: format.to_string(),
                records: format_report.records.len(),
                errors: format_report.errors(),
                warnings: format_report.warnings(),
                issues: format_report.issues.len(),
                envelope: "-".to_string(),
                status: "Blocked".to_string(),
                digest: String::new(),
            };
            if ready || self.force {
                let xml = self.write_format(format_report, &inputs.config, envelope)?;
                row.envelope = format!("{:05}", envelope);
                row.digest = short_digest(&xml);
                row.status = if ready { "Written" } else { "NON-COMPLIANT" }.to_string();
                if !ready {
                    log::warn!("F{}: written with {} errors", format, format_report.errors());
                }
                envelope += 1;
            }
            summary.push(row);
        }

        print_table(&summary);
        let checks: Vec<ReconciliationRow> = reconcile(&report, &inputs.rows)
            .iter()
            .map(ReconciliationRow::from)
            .collect();
        if !checks.is_empty() {
            println!();
            println!("RECONCILIATION");
            print_table(&checks);
        }

        if !report.is_ready() {
            eprintln!("Some formats have errors; run `validate` for details.");
            std::process::exit(1);
        }
        Ok(())
    }

    /// Write both documents of one format and return the XML bytes.
    fn write_format(
        &self,
        report: &FormatReport,
        config: &RunConfig,
        number: u32,
    ) -> anyhow::Result<Vec<u8>> {
        let def = report.format.def();
        let mut tabular = Vec::new();
        write_tabular(&mut tabular, def, &report.records)?;
        write_file(&self.out.join(format!("F{}.csv", def.code)), &tabular)?;

        let xml = render_xml(
            def,
            &report.records,
            &Envelope {
                year: config.year,
                number,
                submission_date: config.submission_date(),
                filer: &config.filer,
            },
        );
        let bytes = to_latin1(&xml);
        write_file(&self.out.join(format!("F{}.xml", def.code)), &bytes)?;
        Ok(bytes)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(path, bytes).map_err(|e| anyhow::anyhow!("cannot write {}: {}", path.display(), e))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn short_digest(bytes: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    digest[..16].to_string()
}

fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

/// Thousands-separated whole pesos.
pub fn format_pesos(amount: rust_decimal::Decimal) -> String {
    let rounded = amount.round().abs().to_string();
    let mut grouped = String::new();
    for (i, c) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount.is_sign_negative() && !amount.round().is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pesos_are_grouped_by_thousands() {
        assert_eq!(format_pesos(dec!(1234567.4)), "1,234,567");
        assert_eq!(format_pesos(dec!(999)), "999");
        assert_eq!(format_pesos(dec!(-50000)), "-50,000");
        assert_eq!(format_pesos(dec!(0)), "0");
    }
}
