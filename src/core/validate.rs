//! Field-level checks on output records. Errors block a format; warnings
//! describe what the sanitizer will fill in or clear.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::entity::{check_digit, is_domestic_country, EntityCategory, IdType};
use super::format::{Format, FormatDef, IdentityField};
use super::record::OutputRecord;
use super::sanitize::record_category;

/// Department codes published by the national statistics office.
pub const VALID_REGIONS: &[&str] = &[
    "05", "08", "11", "13", "15", "17", "18", "19", "20", "23", "25", "27", "41", "44", "47",
    "50", "52", "54", "63", "66", "68", "70", "73", "76", "81", "85", "86", "88", "91", "94",
    "95", "97", "99",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Where a finding was made: the format and the row of its tabular document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
pub struct Location {
    pub format: Format,
    pub row: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{} row {}", self.format, self.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Diagnostic {
    pub location: Location,
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

struct Findings<'a> {
    location: Location,
    record: &'a OutputRecord,
    out: Vec<Diagnostic>,
}

impl Findings<'_> {
    fn push(&mut self, field: &str, severity: Severity, message: String) {
        self.out.push(Diagnostic {
            location: self.location,
            field: field.to_string(),
            severity,
            message: format!("{} (id {})", message, self.record.id),
        });
    }

    fn error(&mut self, field: IdentityField, message: impl Into<String>) {
        self.push(field.name(), Severity::Error, message.into());
    }

    fn warn(&mut self, field: IdentityField, message: impl Into<String>) {
        self.push(field.name(), Severity::Warning, message.into());
    }
}

/// Check one record against the rules of its format.
pub fn validate(record: &OutputRecord, format: Format) -> Vec<Diagnostic> {
    let def = format.def();
    let mut findings = Findings {
        location: Location {
            format,
            row: record.row,
        },
        record,
        out: Vec::new(),
    };
    if record.id.trim().is_empty() {
        findings.error(IdentityField::Id, "missing counterparty id");
        check_values(&mut findings, def);
        return findings.out;
    }

    let id_type = record.id_type.trim();
    if id_type.is_empty() {
        findings.warn(IdentityField::IdType, "missing id type, it will be inferred");
    } else if IdType::from_code(id_type).is_none() {
        findings.warn(
            IdentityField::IdType,
            format!("unrecognised id type '{}', it will be inferred", id_type),
        );
    }

    let category = record_category(record);
    match category {
        EntityCategory::NaturalPerson => check_natural_person(&mut findings, def),
        EntityCategory::LegalEntity => check_legal_entity(&mut findings, def),
        EntityCategory::ForeignEntity => check_foreign_entity(&mut findings, def),
        EntityCategory::GenericMinorAmounts => {}
    }
    if matches!(
        category,
        EntityCategory::NaturalPerson | EntityCategory::LegalEntity
    ) {
        check_domestic_address(&mut findings, def);
    }

    if def.layout.concept {
        let concept = record.concept.trim();
        if concept.is_empty() {
            findings.error(IdentityField::Concept, "missing concept");
        } else if !def.is_known_concept(concept) {
            findings.warn(
                IdentityField::Concept,
                format!("concept '{}' is not in the standard list of F{}", concept, format),
            );
        }
    }

    check_values(&mut findings, def);
    findings.out
}

fn check_natural_person(findings: &mut Findings, def: &FormatDef) {
    let record = findings.record;
    if record.first_surname.is_empty() {
        if record.legal_name.is_empty() {
            findings.error(IdentityField::FirstSurname, "missing first surname and no name to take it from");
        } else {
            findings.warn(IdentityField::FirstSurname, "missing first surname, it will be split from the name");
        }
    }
    if record.first_name.is_empty() && record.legal_name.is_empty() && !record.first_surname.is_empty() {
        findings.warn(IdentityField::FirstName, "missing first name, it will be set to NN");
    }
    if def.layout.legal_name && !record.legal_name.is_empty() && !record.first_surname.is_empty() {
        findings.warn(IdentityField::LegalName, "legal name is not used for natural persons and will be cleared");
    }
}

fn check_legal_entity(findings: &mut Findings, def: &FormatDef) {
    let record = findings.record;
    if def.layout.legal_name && record.legal_name.is_empty() {
        if record.has_name_parts() {
            findings.warn(IdentityField::LegalName, "missing legal name, it will be joined from the name parts");
        } else {
            findings.error(IdentityField::LegalName, "missing legal name and no name parts");
        }
    } else if record.has_name_parts() {
        findings.warn(IdentityField::FirstSurname, "name parts are not used for legal entities and will be cleared");
    }
    if def.has_field(IdentityField::CheckDigit) {
        let supplied = record.check_digit.trim();
        match check_digit(&record.id).map(|d| d.to_string()) {
            Some(expected) if !supplied.is_empty() && supplied != expected => findings.error(
                IdentityField::CheckDigit,
                format!("check digit is '{}', expected '{}'", supplied, expected),
            ),
            Some(_) if supplied.is_empty() => {
                findings.warn(IdentityField::CheckDigit, "missing check digit, it will be computed")
            }
            _ => {}
        }
    }
}

fn check_foreign_entity(findings: &mut Findings, def: &FormatDef) {
    let record = findings.record;
    if def.layout.legal_name && record.legal_name.is_empty() && !record.has_name_parts() {
        findings.error(IdentityField::LegalName, "missing name for foreign counterparty");
    }
    if def.layout.address && !(record.region.is_empty() && record.locality.is_empty()) {
        findings.warn(IdentityField::Region, "national address is not used for foreign counterparties and will be cleared");
    }
    if def.layout.country {
        if record.country.is_empty() {
            findings.warn(IdentityField::Country, "missing country, it will be detected from the name");
        } else if is_domestic_country(&record.country) {
            findings.warn(IdentityField::Country, "domestic country for a foreign counterparty, it will be corrected");
        }
    }
}

fn check_domestic_address(findings: &mut Findings, def: &FormatDef) {
    let record = findings.record;
    if def.layout.address {
        if record.street.is_empty() {
            findings.warn(IdentityField::Street, "missing address, the filer's address will be used");
        }
        if record.region.is_empty() {
            findings.warn(IdentityField::Region, "missing department, the filer's will be used");
        } else if !VALID_REGIONS.contains(&record.region.as_str()) {
            findings.warn(IdentityField::Region, format!("unknown department '{}'", record.region));
        }
        if record.locality.is_empty() {
            findings.warn(IdentityField::Locality, "missing municipality, the filer's will be used");
        }
    }
    if def.layout.country && record.country.is_empty() {
        findings.warn(IdentityField::Country, "missing country, it will be set to Colombia");
    }
}

fn check_values(findings: &mut Findings, def: &FormatDef) {
    for (column, raw) in def.values.iter().zip(&findings.record.values) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | ' ' | '$')).collect();
        match Decimal::from_str(&cleaned) {
            Ok(value) if value < Decimal::ZERO => findings.push(
                column.key,
                Severity::Error,
                format!("negative value {} in {}", raw, column.key),
            ),
            Ok(_) => {}
            Err(_) => findings.push(
                column.key,
                Severity::Error,
                format!("non-numeric value '{}' in {}", raw, column.key),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id_type: &str, id: &str) -> OutputRecord {
        OutputRecord {
            row: 2,
            concept: "5016".into(),
            id_type: id_type.into(),
            id: id.into(),
            street: "CL 10 # 5-20".into(),
            region: "11".into(),
            locality: "001".into(),
            country: "169".into(),
            values: vec!["1000".into(); 8],
            ..Default::default()
        }
    }

    fn fields(diagnostics: &[Diagnostic], severity: Severity) -> Vec<&str> {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.field.as_str())
            .collect()
    }

    #[test]
    fn clean_legal_entity() {
        let mut r = record("31", "900123456");
        r.check_digit = "8".into();
        r.legal_name = "ACME SAS".into();
        assert!(validate(&r, Format::F1001).is_empty());
    }

    #[test]
    fn missing_id_is_an_error() {
        let r = record("31", "");
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Error), vec!["id"]);
    }

    #[test]
    fn wrong_check_digit_is_an_error() {
        let mut r = record("31", "900123456");
        r.check_digit = "3".into();
        r.legal_name = "ACME SAS".into();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Error), vec!["check_digit"]);
        assert!(diagnostics[0].message.contains("expected '8'"));
    }

    #[test]
    fn natural_person_names() {
        let mut r = record("13", "13551234");
        r.legal_name = "PEREZ GOMEZ JUAN".into();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Warning), vec!["first_surname"]);
        assert!(fields(&diagnostics, Severity::Error).is_empty());

        r.legal_name.clear();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Error), vec!["first_surname"]);
    }

    #[test]
    fn legal_entity_without_any_name() {
        let mut r = record("31", "900123456");
        r.check_digit = "8".into();
        assert_eq!(fields(&validate(&r, Format::F1001), Severity::Error), vec!["legal_name"]);
        r.first_surname = "ACME".into();
        let diagnostics = validate(&r, Format::F1001);
        assert!(fields(&diagnostics, Severity::Error).is_empty());
        assert_eq!(fields(&diagnostics, Severity::Warning), vec!["legal_name"]);
    }

    #[test]
    fn unknown_id_type_and_concept_are_warnings() {
        let mut r = record("77", "900123456");
        r.check_digit = "8".into();
        r.legal_name = "ACME SAS".into();
        r.concept = "9999".into();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Warning), vec!["id_type", "concept"]);
        assert_eq!(error_count(&diagnostics), 0);
    }

    #[test]
    fn missing_address_uses_filer() {
        let mut r = record("13", "13551234");
        r.first_surname = "PEREZ".into();
        r.first_name = "JUAN".into();
        r.street.clear();
        r.region = "42".into();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Warning), vec!["street", "region"]);
    }

    #[test]
    fn foreign_entity_domestic_country() {
        let mut r = record("42", "US-998877");
        r.legal_name = "Foo Inc".into();
        r.region.clear();
        r.locality.clear();
        r.street.clear();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(fields(&diagnostics, Severity::Warning), vec!["country"]);
    }

    #[test]
    fn bad_values_are_errors() {
        let mut r = record("31", "900123456");
        r.check_digit = "8".into();
        r.legal_name = "ACME SAS".into();
        r.values[0] = "-500".into();
        r.values[1] = "mil".into();
        r.values[2] = "".into();
        r.values[3] = "1,500.75".into();
        let diagnostics = validate(&r, Format::F1001);
        assert_eq!(
            fields(&diagnostics, Severity::Error),
            vec!["pago_deducible", "pago_no_deducible"]
        );
    }

    #[test]
    fn minor_amounts_need_no_identity() {
        let r = OutputRecord {
            row: 3,
            concept: "5016".into(),
            id_type: "43".into(),
            id: "222222222".into(),
            legal_name: "CUANTIAS MENORES".into(),
            values: vec!["10".into(); 8],
            ..Default::default()
        };
        assert!(validate(&r, Format::F1001).is_empty());
    }
}
