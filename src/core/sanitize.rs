//! Fills and clears record fields by counterparty category so that every
//! emitted record is structurally valid.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::config::Filer;
use super::entity::{
    check_digit, infer_id_type, is_domestic_country, split_name, EntityCategory, IdType,
    DEFAULT_FOREIGN_COUNTRY, DOMESTIC_COUNTRY, MINOR_AMOUNTS_ID, MINOR_AMOUNTS_NAME,
};
use super::institutions::detect_country;
use super::record::OutputRecord;

/// Placeholder given name for people whose ledger name has a single token.
pub const UNKNOWN_GIVEN_NAME: &str = "NN";

/// Category of a record from its id and (possibly unrecognised) id-type code.
pub fn record_category(record: &OutputRecord) -> EntityCategory {
    if record.id.trim() == MINOR_AMOUNTS_ID {
        return EntityCategory::GenericMinorAmounts;
    }
    IdType::from_code(&record.id_type)
        .unwrap_or_else(|| infer_id_type(&record.id))
        .category()
}

/// Truncate a monetary cell to a non-negative integer string; anything
/// unparseable or empty becomes "0".
pub fn coerce_amount(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | ' ' | '$')).collect();
    match Decimal::from_str(&cleaned) {
        Ok(value) if value > Decimal::ZERO => value.trunc().normalize().to_string(),
        _ => "0".to_string(),
    }
}

pub struct RecordSanitizer<'a> {
    filer: &'a Filer,
}

impl<'a> RecordSanitizer<'a> {
    pub fn new(filer: &'a Filer) -> Self {
        RecordSanitizer { filer }
    }

    pub fn sanitize(&self, mut record: OutputRecord) -> OutputRecord {
        trim_all(&mut record);
        if IdType::from_code(&record.id_type).is_none() {
            record.id_type = infer_id_type(&record.id).code().to_string();
        }
        match record_category(&record) {
            EntityCategory::NaturalPerson => self.natural_person(&mut record),
            EntityCategory::LegalEntity => self.legal_entity(&mut record),
            EntityCategory::ForeignEntity => foreign_entity(&mut record),
            EntityCategory::GenericMinorAmounts => minor_amounts(&mut record),
        }
        for value in record.values.iter_mut() {
            *value = coerce_amount(value);
        }
        record
    }

    pub fn sanitize_all(&self, records: Vec<OutputRecord>) -> Vec<OutputRecord> {
        records.into_iter().map(|r| self.sanitize(r)).collect()
    }

    fn natural_person(&self, record: &mut OutputRecord) {
        if record.first_surname.is_empty() {
            if record.legal_name.is_empty() {
                record.first_surname = record.id.clone();
            } else {
                let parts = split_name(&record.legal_name);
                record.first_surname = parts.first_surname;
                record.second_surname = parts.second_surname;
                record.first_name = parts.first_name;
                record.second_name = parts.second_name;
            }
        }
        if record.first_name.is_empty() {
            record.first_name = UNKNOWN_GIVEN_NAME.to_string();
        }
        record.legal_name.clear();
        self.domestic_address(record);
    }

    fn legal_entity(&self, record: &mut OutputRecord) {
        if record.legal_name.is_empty() {
            let joined = record.joined_name_parts();
            record.legal_name = if joined.is_empty() {
                record.id.clone()
            } else {
                joined
            };
        }
        clear_name_parts(record);
        if record.check_digit.is_empty() {
            record.check_digit = check_digit(&record.id)
                .map(|d| d.to_string())
                .unwrap_or_default();
        }
        self.domestic_address(record);
    }

    fn domestic_address(&self, record: &mut OutputRecord) {
        if record.street.is_empty() {
            record.street = self.filer.fallback_street().to_string();
        }
        if record.region.is_empty() {
            record.region = self.filer.fallback_region().to_string();
        }
        if record.locality.is_empty() {
            record.locality = self.filer.fallback_locality().to_string();
        }
        if record.country.is_empty() {
            record.country = DOMESTIC_COUNTRY.to_string();
        }
    }
}

fn foreign_entity(record: &mut OutputRecord) {
    if record.legal_name.is_empty() {
        let joined = record.joined_name_parts();
        record.legal_name = if joined.is_empty() {
            record.id.clone()
        } else {
            joined
        };
    }
    clear_name_parts(record);
    record.check_digit.clear();
    record.street.clear();
    record.region.clear();
    record.locality.clear();
    if record.country.is_empty() || is_domestic_country(&record.country) {
        record.country = detect_country(&record.legal_name)
            .unwrap_or(DEFAULT_FOREIGN_COUNTRY)
            .to_string();
    }
}

fn minor_amounts(record: &mut OutputRecord) {
    record.id = MINOR_AMOUNTS_ID.to_string();
    record.id_type = IdType::NoForeignId.code().to_string();
    record.check_digit.clear();
    clear_name_parts(record);
    record.legal_name = MINOR_AMOUNTS_NAME.to_string();
    record.street.clear();
    record.region.clear();
    record.locality.clear();
    record.country.clear();
}

fn clear_name_parts(record: &mut OutputRecord) {
    record.first_surname.clear();
    record.second_surname.clear();
    record.first_name.clear();
    record.second_name.clear();
}

fn trim_all(record: &mut OutputRecord) {
    for field in [
        &mut record.concept,
        &mut record.id_type,
        &mut record.id,
        &mut record.check_digit,
        &mut record.first_surname,
        &mut record.second_surname,
        &mut record.first_name,
        &mut record.second_name,
        &mut record.legal_name,
        &mut record.street,
        &mut record.region,
        &mut record.locality,
        &mut record.country,
    ] {
        let trimmed = field.trim();
        if trimmed.len() != field.len() {
            *field = trimmed.to_string();
        }
    }
}
