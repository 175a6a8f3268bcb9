//! Cross-check of report totals against the ledger accounts they come from.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use super::format::Format;
use super::ledger::LedgerRow;
use super::pipeline::RunReport;

const TOLERANCE: Decimal = dec!(1000);
const REVIEW_PERCENT: Decimal = dec!(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Ok,
    Review,
    Difference,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Review => write!(f, "Review"),
            Status::Difference => write!(f, "Difference"),
        }
    }
}

pub fn status(report_total: Decimal, ledger_total: Decimal) -> Status {
    let difference = (report_total - ledger_total).abs();
    if difference <= TOLERANCE {
        return Status::Ok;
    }
    if ledger_total.is_zero() {
        return Status::Difference;
    }
    let percent = difference / ledger_total.abs() * dec!(100);
    if percent <= REVIEW_PERCENT {
        Status::Review
    } else {
        Status::Difference
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub format: Format,
    pub item: &'static str,
    pub report_total: Decimal,
    pub source: &'static str,
    pub ledger_total: Decimal,
    pub status: Status,
}

/// Value column compared; `None` compares the format's primary columns.
struct Check {
    format: Format,
    column: Option<&'static str>,
    item: &'static str,
    source: &'static str,
    selects: fn(&LedgerRow) -> bool,
}

fn starts_with_any(account: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| account.starts_with(p))
}

static CHECKS: &[Check] = &[
    Check {
        format: Format::F1007,
        column: None,
        item: "Income received",
        source: "class 4",
        selects: |r| r.has_counterparty() && r.class() == "4",
    },
    Check {
        format: Format::F1001,
        column: None,
        item: "Payments",
        source: "51-53, 14",
        selects: |r| r.has_counterparty() && starts_with_any(&r.account, &["51", "52", "53", "14"]),
    },
    Check {
        format: Format::F1001,
        column: Some("retfte_practicada"),
        item: "Income tax withheld",
        source: "236505-236530",
        selects: |r| {
            r.has_counterparty()
                && r.account.get(..6).is_some_and(|p| ("236505"..="236530").contains(&p))
        },
    },
    Check {
        format: Format::F1001,
        column: Some("retiva_practicada"),
        item: "VAT withheld",
        source: "2367",
        selects: |r| r.has_counterparty() && r.account.starts_with("2367"),
    },
    Check {
        format: Format::F1003,
        column: Some("retencion"),
        item: "Withholdings suffered",
        source: "1355",
        selects: |r| {
            r.has_counterparty()
                && r.account.starts_with("1355")
                && !starts_with_any(&r.account, &["135518", "135595", "135599"])
        },
    },
    Check {
        format: Format::F1008,
        column: None,
        item: "Receivables",
        source: "13 (without 1355)",
        selects: |r| r.has_counterparty() && r.account.starts_with("13") && !r.account.starts_with("1355"),
    },
    Check {
        format: Format::F1009,
        column: None,
        item: "Payables",
        source: "class 2",
        selects: |r| r.account == "2",
    },
    Check {
        format: Format::F1012,
        column: Some("saldo_dic31"),
        item: "Cash and investments",
        source: "1105-1120, 12",
        selects: |r| {
            (r.has_counterparty() || (r.account.len() >= 6 && starts_with_any(&r.account, &["1105", "1110"])))
                && starts_with_any(&r.account, &["1105", "1110", "1115", "1120", "12"])
        },
    },
    Check {
        format: Format::F2276,
        column: None,
        item: "Employee income",
        source: "5105",
        selects: |r| r.has_counterparty() && r.account.starts_with("5105"),
    },
];

/// Compare every produced format with its ledger accounts.
pub fn reconcile(report: &RunReport, rows: &[LedgerRow]) -> Vec<Reconciliation> {
    CHECKS
        .iter()
        .filter_map(|check| {
            let format_report = report.formats.get(&check.format)?.as_ref().ok()?;
            let report_total = match check.column {
                None => format_report.primary_total(),
                Some(key) => {
                    let index = check.format.def().column_index(key)?;
                    format_report.column_totals().get(index).copied().unwrap_or_default()
                }
            };
            let ledger_total: Decimal = rows
                .iter()
                .filter(|r| (check.selects)(r))
                .map(|r| r.balance.abs())
                .sum();
            Some(Reconciliation {
                format: check.format,
                item: check.item,
                report_total,
                source: check.source,
                ledger_total,
                status: status(report_total, ledger_total),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RunConfig;
    use crate::core::entity::EntityResolver;
    use crate::core::ledger::tests::row;
    use crate::core::pipeline::Pipeline;

    #[test]
    fn status_bands() {
        assert_eq!(status(dec!(100000), dec!(100900)), Status::Ok);
        assert_eq!(status(dec!(100000), dec!(104000)), Status::Review);
        assert_eq!(status(dec!(100000), dec!(120000)), Status::Difference);
        assert_eq!(status(dec!(5000), dec!(0)), Status::Difference);
        assert_eq!(status(dec!(0), dec!(0)), Status::Ok);
    }

    #[test]
    fn income_matches_class_4() {
        let rows = vec![
            row("413505", "Ventas", "900123456", dec!(-1000000)),
            row("413505", "Ventas", "13551234", dec!(-90000)),
        ];
        let config = RunConfig {
            formats: Some(vec![Format::F1007]),
            ..Default::default()
        };
        let resolver = EntityResolver::default();
        let report = Pipeline::new(&config, &resolver).run(&rows);
        let checks = reconcile(&report, &rows);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].report_total, dec!(1090000));
        assert_eq!(checks[0].ledger_total, dec!(1090000));
        assert_eq!(checks[0].status, Status::Ok);
    }
}
