//! Flat output records: the projection of a bucket and its entity onto a
//! format's columns, and the same record read back from a tabular document.

use serde::Serialize;

use super::aggregate::ConceptBucket;
use super::entity::{Entity, EntityName};
use super::format::{FormatDef, IdentityField};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    /// Row in the tabular document (the header is row 1).
    pub row: usize,
    pub concept: String,
    pub id_type: String,
    pub id: String,
    pub check_digit: String,
    pub first_surname: String,
    pub second_surname: String,
    pub first_name: String,
    pub second_name: String,
    pub legal_name: String,
    pub street: String,
    pub region: String,
    pub locality: String,
    pub country: String,
    pub values: Vec<String>,
}

impl OutputRecord {
    pub fn from_bucket(row: usize, bucket: &ConceptBucket, entity: &Entity) -> Self {
        let mut record = OutputRecord {
            row,
            concept: bucket.key.concept.clone(),
            id_type: entity.id_type.code().to_string(),
            id: entity.id.clone(),
            check_digit: entity.check_digit(),
            street: entity.address.street.clone(),
            region: entity.address.region.clone(),
            locality: entity.address.locality.clone(),
            country: entity.address.country.clone(),
            values: bucket.amounts.iter().map(|a| a.normalize().to_string()).collect(),
            ..Default::default()
        };
        match &entity.name {
            EntityName::Person(parts) => {
                record.first_surname = parts.first_surname.clone();
                record.second_surname = parts.second_surname.clone();
                record.first_name = parts.first_name.clone();
                record.second_name = parts.second_name.clone();
            }
            EntityName::Legal(name) => record.legal_name = name.clone(),
        }
        record
    }

    pub fn field(&self, field: IdentityField) -> &str {
        match field {
            IdentityField::Concept => &self.concept,
            IdentityField::IdType => &self.id_type,
            IdentityField::Id => &self.id,
            IdentityField::CheckDigit => &self.check_digit,
            IdentityField::FirstSurname => &self.first_surname,
            IdentityField::SecondSurname => &self.second_surname,
            IdentityField::FirstName => &self.first_name,
            IdentityField::SecondName => &self.second_name,
            IdentityField::LegalName => &self.legal_name,
            IdentityField::Street => &self.street,
            IdentityField::Region => &self.region,
            IdentityField::Locality => &self.locality,
            IdentityField::Country => &self.country,
        }
    }

    pub fn field_mut(&mut self, field: IdentityField) -> &mut String {
        match field {
            IdentityField::Concept => &mut self.concept,
            IdentityField::IdType => &mut self.id_type,
            IdentityField::Id => &mut self.id,
            IdentityField::CheckDigit => &mut self.check_digit,
            IdentityField::FirstSurname => &mut self.first_surname,
            IdentityField::SecondSurname => &mut self.second_surname,
            IdentityField::FirstName => &mut self.first_name,
            IdentityField::SecondName => &mut self.second_name,
            IdentityField::LegalName => &mut self.legal_name,
            IdentityField::Street => &mut self.street,
            IdentityField::Region => &mut self.region,
            IdentityField::Locality => &mut self.locality,
            IdentityField::Country => &mut self.country,
        }
    }

    /// Name parts present on the record, joined with spaces.
    pub fn joined_name_parts(&self) -> String {
        [
            &self.first_surname,
            &self.second_surname,
            &self.first_name,
            &self.second_name,
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn has_name_parts(&self) -> bool {
        !self.joined_name_parts().is_empty()
    }

    /// Cells in the format's column order.
    pub fn to_row(&self, def: &FormatDef) -> Vec<String> {
        let mut cells: Vec<String> = def
            .identity_fields()
            .into_iter()
            .map(|f| self.field(f).to_string())
            .collect();
        cells.extend((0..def.values.len()).map(|i| self.values.get(i).cloned().unwrap_or_default()));
        cells
    }

    /// Inverse of [`OutputRecord::to_row`]; missing trailing cells read as empty.
    pub fn from_row<'a>(def: &FormatDef, row: usize, cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut cells = cells.into_iter().map(|c| c.trim().to_string());
        let mut record = OutputRecord {
            row,
            ..Default::default()
        };
        for field in def.identity_fields() {
            *record.field_mut(field) = cells.next().unwrap_or_default();
        }
        record.values = (0..def.values.len())
            .map(|_| cells.next().unwrap_or_default())
            .collect();
        record
    }
}
