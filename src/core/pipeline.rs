//! One generation run: ledger rows in, per-format record sets out.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::aggregate::{finalize, Accumulator, MinorAmountRule};
use super::classifier::{rule_table, AccountClassifier};
use super::collect::{Collector, Counterparties};
use super::config::{Filer, RunConfig};
use super::entity::EntityResolver;
use super::format::Format;
use super::issues::StructuralIssue;
use super::ledger::LedgerRow;
use super::record::OutputRecord;
use super::rules::{ConfigurationError, RuleTable};
use super::sanitize::RecordSanitizer;
use super::validate::{error_count, validate, Diagnostic};

/// Records of one format after validation and sanitizing.
#[derive(Debug, Clone, Serialize)]
pub struct FormatReport {
    pub format: Format,
    pub records: Vec<OutputRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub issues: Vec<StructuralIssue>,
}

impl FormatReport {
    pub fn errors(&self) -> usize {
        error_count(&self.diagnostics)
    }

    pub fn warnings(&self) -> usize {
        self.diagnostics.len() - self.errors()
    }

    /// A format may be emitted when validation found no errors.
    pub fn is_ready(&self) -> bool {
        self.errors() == 0
    }

    /// Sum of each value column over the records.
    pub fn column_totals(&self) -> Vec<Decimal> {
        let width = self.format.def().values.len();
        let mut totals = vec![Decimal::ZERO; width];
        for record in &self.records {
            for (total, value) in totals.iter_mut().zip(&record.values) {
                *total += Decimal::from_str(value).unwrap_or_default();
            }
        }
        totals
    }

    /// Total of the format's primary columns.
    pub fn primary_total(&self) -> Decimal {
        let totals = self.column_totals();
        self.format
            .def()
            .primary
            .iter()
            .filter_map(|i| totals.get(*i))
            .copied()
            .sum()
    }
}

/// Outcome of every requested format. A misconfigured format does not stop
/// the others.
#[derive(Debug, Default)]
pub struct RunReport {
    pub formats: BTreeMap<Format, Result<FormatReport, ConfigurationError>>,
}

impl RunReport {
    /// True when every format is configured and free of errors.
    pub fn is_ready(&self) -> bool {
        self.formats
            .values()
            .all(|r| r.as_ref().is_ok_and(FormatReport::is_ready))
    }
}

pub struct Pipeline<'a> {
    config: &'a RunConfig,
    resolver: &'a EntityResolver,
    tables: BTreeMap<Format, RuleTable>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig, resolver: &'a EntityResolver) -> Self {
        Pipeline {
            config,
            resolver,
            tables: BTreeMap::new(),
        }
    }

    /// Replace the built-in rule table of a format.
    #[cfg(test)]
    pub fn with_table(mut self, format: Format, table: RuleTable) -> Self {
        self.tables.insert(format, table);
        self
    }

    pub fn run(&self, rows: &[LedgerRow]) -> RunReport {
        let mut counterparties = Counterparties::resolve(rows, self.resolver);
        let mut accumulator = Accumulator::new();
        let mut report = RunReport::default();
        for format in self.config.formats() {
            let result = self.run_format(format, rows, &mut counterparties, &mut accumulator);
            match &result {
                Ok(r) => log::info!(
                    "F{}: {} records, {} errors, {} warnings, {} issues",
                    format,
                    r.records.len(),
                    r.errors(),
                    r.warnings(),
                    r.issues.len()
                ),
                Err(e) => log::error!("F{}: {}", format, e),
            }
            report.formats.insert(format, result);
        }
        report
    }

    fn run_format(
        &self,
        format: Format,
        rows: &[LedgerRow],
        counterparties: &mut Counterparties,
        accumulator: &mut Accumulator,
    ) -> Result<FormatReport, ConfigurationError> {
        let table = self
            .tables
            .get(&format)
            .cloned()
            .unwrap_or_else(|| rule_table(format));
        let classifier = AccountClassifier::with_table(table)?;
        let collection = Collector::new(
            format,
            rows,
            &classifier,
            self.config,
            counterparties,
            accumulator,
        )
        .collect();

        let def = format.def();
        let exempt: Vec<&str> = collection.exempt.iter().map(String::as_str).collect();
        let buckets = finalize(
            collection.buckets,
            &MinorAmountRule {
                threshold: def.threshold(self.config.uvt),
                primary: def.primary,
                withholding: def.withholding,
                exempt: &exempt,
            },
        );
        let records = buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| {
                let entity = counterparties.entity(&bucket.key.entity_id);
                OutputRecord::from_bucket(i + 2, bucket, &entity)
            })
            .collect();
        Ok(prepare(format, records, collection.issues, &self.config.filer))
    }
}

/// Validate records as they are, then sanitize them for emission. Shared by
/// generated records and tabular documents read back for XML.
pub fn prepare(
    format: Format,
    records: Vec<OutputRecord>,
    issues: Vec<StructuralIssue>,
    filer: &Filer,
) -> FormatReport {
    let diagnostics = records.iter().flat_map(|r| validate(r, format)).collect();
    let records = RecordSanitizer::new(filer).sanitize_all(records);
    FormatReport {
        format,
        records,
        diagnostics,
        issues,
    }
}
