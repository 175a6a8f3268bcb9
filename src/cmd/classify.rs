//! Classify command - concept assigned to each ledger row, per format

use crate::cmd::generate::format_pesos;
use crate::cmd::read_ledger_rows;
use crate::core::{AccountClassifier, Format, LedgerRow};
use clap::Args;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// Trial balance by counterparty (CSV, or "-" for stdin)
    #[arg(short, long)]
    ledger: PathBuf,

    /// Formats to classify for; all when omitted
    #[arg(short, long = "format", value_enum)]
    formats: Vec<Format>,

    /// Only show rows that no format classifies
    #[arg(long)]
    unclassified: bool,
}

#[derive(Debug, Tabled)]
struct ClassifiedRow {
    #[tabled(rename = "Line")]
    line: usize,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Concepts")]
    concepts: String,
}

impl ClassifyCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let formats = if self.formats.is_empty() {
            Format::ALL.to_vec()
        } else {
            self.formats.clone()
        };
        let classifiers = formats
            .iter()
            .map(|f| -> anyhow::Result<(Format, AccountClassifier)> {
                Ok((*f, AccountClassifier::for_format(*f)?))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let rows = read_ledger_rows(&self.ledger)?;

        let table_rows: Vec<ClassifiedRow> = rows
            .iter()
            .map(|row| classify_row(row, &classifiers))
            .filter(|r| !self.unclassified || r.concepts.is_empty())
            .collect();

        if table_rows.is_empty() {
            println!("No rows found matching filters");
            return Ok(());
        }
        let table = Table::new(&table_rows).with(Style::rounded()).to_string();
        println!("{}", table);
        Ok(())
    }
}

fn classify_row(row: &LedgerRow, classifiers: &[(Format, AccountClassifier)]) -> ClassifiedRow {
    let concepts: Vec<String> = classifiers
        .iter()
        .filter_map(|(format, classifier)| {
            let c = classifier.classify(&row.account, &row.label)?;
            let marker = if c.deductible { "" } else { " nd" };
            Some(format!("{}:{}{}", format, c.concept, marker))
        })
        .collect();
    ClassifiedRow {
        line: row.line,
        account: row.account.clone(),
        label: row.label.clone(),
        id: row.counterparty_id.clone(),
        balance: format_pesos(row.balance),
        concepts: concepts.join(" "),
    }
}
