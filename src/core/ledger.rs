//! Trial balance by counterparty: row type and CSV reader.

use exogena_derive::CsvSchema;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;

use super::columns::{ColumnMap, CsvField, MissingColumns};

/// Columns of a ledger export. Used for header detection and by `schema`.
#[allow(dead_code)]
#[derive(CsvSchema)]
pub struct LedgerColumns {
    /// Account code, hierarchical (e.g. 510506)
    #[csv(aliases("cuenta", "codigo cuenta", "codigo", "cta"))]
    account: String,
    /// Account name, used by keyword classification
    #[csv(aliases("nombre cuenta", "descripcion cuenta", "descripcion", "nombre"))]
    label: Option<String>,
    /// Counterparty id (NIT or cedula), may be empty on summary rows
    #[csv(aliases("nit", "identificacion", "documento", "nit tercero", "id tercero"))]
    counterparty_id: String,
    /// Counterparty name as written in the ledger
    #[csv(aliases("razon social", "nombre tercero", "tercero"))]
    counterparty_name: Option<String>,
    /// Debits of the period
    #[csv(aliases("debito", "debitos", "debe"))]
    debit: String,
    /// Credits of the period
    #[csv(aliases("credito", "creditos", "haber"))]
    credit: String,
    /// Signed closing balance (credit balances negative); debit - credit when absent
    #[csv(aliases("saldo final", "saldo"))]
    balance: Option<String>,
}

/// One immutable ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub account: String,
    pub label: String,
    pub counterparty_id: String,
    pub counterparty_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

impl LedgerRow {
    pub fn has_counterparty(&self) -> bool {
        !self.counterparty_id.is_empty()
    }

    pub fn class(&self) -> &str {
        self.account.get(..1).unwrap_or("")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Columns(#[from] MissingColumns),
    #[error("line {line}: invalid {column} amount '{value}'")]
    InvalidAmount {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("ledger has no rows")]
    Empty,
}

/// Parse an amount as exported by accounting packages: currency signs,
/// spaces and comma thousands separators are ignored, and parentheses mean
/// a negative value. An empty cell is zero.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return Some(Decimal::ZERO);
    }
    let negative = cleaned.starts_with('(') && cleaned.ends_with(')');
    if negative {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -value } else { value })
}

/// Account codes lose dots and spaces ("5105.06" is 510506).
pub fn normalize_account(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '.' | ' ')).collect()
}

/// Counterparty ids lose a spreadsheet float suffix ("900123456.0") and
/// dot thousands separators on all-numeric ids.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_float = match trimmed.split_once('.') {
        Some((int, frac)) if !frac.is_empty() && frac.chars().all(|c| c == '0') && int.chars().all(|c| c.is_ascii_digit()) => int,
        _ => trimmed,
    };
    if without_float.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let id: String = without_float.chars().filter(|c| *c != '.').collect();
        if id.chars().all(|c| c == '0') {
            return String::new();
        }
        return id;
    }
    without_float.to_string()
}

/// Read ledger rows from CSV. Malformed amounts are fatal.
pub fn read_ledger<R: Read>(reader: R) -> Result<Vec<LedgerRow>, LedgerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::detect(LedgerColumns::csv_schema(), headers.iter())?;

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let line = index + 2;
        let account = normalize_account(columns.get(&record, "account"));
        if account.is_empty() {
            log::warn!("line {}: no account code, row skipped", line);
            continue;
        }
        let amount = |column: &'static str| -> Result<Option<Decimal>, LedgerError> {
            let raw = columns.get(&record, column);
            if columns.position(column).is_none() {
                return Ok(None);
            }
            parse_amount(raw)
                .map(Some)
                .ok_or_else(|| LedgerError::InvalidAmount {
                    line,
                    column,
                    value: raw.to_string(),
                })
        };
        let debit = amount("debit")?.unwrap_or_default();
        let credit = amount("credit")?.unwrap_or_default();
        let balance = amount("balance")?.unwrap_or(debit - credit);

        rows.push(LedgerRow {
            line,
            account,
            label: columns.get(&record, "label").to_string(),
            counterparty_id: normalize_id(columns.get(&record, "counterparty_id")),
            counterparty_name: columns.get(&record, "counterparty_name").to_string(),
            debit,
            credit,
            balance,
        });
    }
    if rows.is_empty() {
        return Err(LedgerError::Empty);
    }
    log::info!("read {} ledger rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Ledger row with a signed balance and matching movement.
    pub fn row(account: &str, label: &str, id: &str, balance: Decimal) -> LedgerRow {
        let (debit, credit) = if balance >= Decimal::ZERO {
            (balance, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -balance)
        };
        LedgerRow {
            line: 0,
            account: account.to_string(),
            label: label.to_string(),
            counterparty_id: id.to_string(),
            counterparty_name: String::new(),
            debit,
            credit,
            balance,
        }
    }

    #[test]
    fn parse_amounts() {
        assert_eq!(parse_amount("5,000,000"), Some(dec!(5000000)));
        assert_eq!(parse_amount("$ 1,234.50"), Some(dec!(1234.50)));
        assert_eq!(parse_amount("(350000)"), Some(dec!(-350000)));
        assert_eq!(parse_amount(""), Some(Decimal::ZERO));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn normalize_ids() {
        assert_eq!(normalize_id("900123456.0"), "900123456");
        assert_eq!(normalize_id("900.123.456"), "900123456");
        assert_eq!(normalize_id(" 13551234 "), "13551234");
        assert_eq!(normalize_id("AB-123"), "AB-123");
        assert_eq!(normalize_id("0"), "");
    }

    #[test]
    fn reads_ledger_with_spanish_headers() {
        let data = "\
Cuenta,Nombre Cuenta,NIT,Razon Social,Debito,Credito,Saldo Final
5105.06,Salario basico,13551234,LOPEZ DIAZ MARIA,\"5,000,000\",0,\"5,000,000\"
236505,Retencion salarios,13551234,LOPEZ DIAZ MARIA,0,350000,-350000
,Sin cuenta,1,X,0,0,0
2365,Retencion en la fuente,,,0,350000,-350000
";
        let rows = read_ledger(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].account, "510506");
        assert_eq!(rows[0].label, "Salario basico");
        assert_eq!(rows[0].balance, dec!(5000000));
        assert_eq!(rows[1].credit, dec!(350000));
        assert_eq!(rows[2].line, 5);
        assert!(!rows[2].has_counterparty());
    }

    #[test]
    fn balance_defaults_to_movement() {
        let data = "cuenta,nit,debito,credito\n413505,900123456,0,1000\n";
        let rows = read_ledger(data.as_bytes()).unwrap();
        assert_eq!(rows[0].balance, dec!(-1000));
        assert_eq!(rows[0].class(), "4");
    }

    #[test]
    fn malformed_amount_is_fatal() {
        let data = "cuenta,nit,debito,credito\n413505,900123456,abc,1000\n";
        match read_ledger(data.as_bytes()) {
            Err(LedgerError::InvalidAmount { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "debit");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_columns_reported() {
        let data = "cuenta,debito\n413505,1\n";
        assert!(matches!(
            read_ledger(data.as_bytes()),
            Err(LedgerError::Columns(_))
        ));
    }
}
