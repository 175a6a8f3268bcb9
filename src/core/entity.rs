//! Counterparty identity: id types, check digits, name splitting and the
//! layered directory merge that produces a resolved [`Entity`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::institutions::{detect_country, known_foreign};

/// Reserved id of the generic counterparty that absorbs minor amounts.
pub const MINOR_AMOUNTS_ID: &str = "222222222";
pub const MINOR_AMOUNTS_NAME: &str = "CUANTIAS MENORES";

pub const DOMESTIC_COUNTRY: &str = "169";
pub const DEFAULT_FOREIGN_COUNTRY: &str = "840";

pub fn is_domestic_country(code: &str) -> bool {
    matches!(code, "169" | "170")
}

const CHECK_DIGIT_WEIGHTS: [u32; 15] = [71, 67, 59, 53, 47, 43, 41, 37, 29, 23, 19, 17, 13, 7, 3];

/// Weighted modulo-11 check digit of a tax id. Dots, dashes and spaces are
/// ignored, so formatted and bare ids give the same digit. Returns `None`
/// for ids that are not numeric, too long, or the minor-amounts id.
pub fn check_digit(id: &str) -> Option<u8> {
    let digits: String = id
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect();
    if digits.is_empty()
        || digits.len() > CHECK_DIGIT_WEIGHTS.len()
        || digits == MINOR_AMOUNTS_ID
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let padded = format!("{:0>15}", digits);
    let sum: u32 = padded
        .chars()
        .zip(CHECK_DIGIT_WEIGHTS)
        .map(|(c, weight)| c.to_digit(10).unwrap_or(0) * weight)
        .sum();
    let remainder = sum % 11;
    let digit = if remainder >= 2 { 11 - remainder } else { remainder };
    Some(digit as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    NaturalPerson,
    LegalEntity,
    ForeignEntity,
    GenericMinorAmounts,
}

/// Identity document types accepted by the tax authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IdType {
    BirthRegistry,
    IdentityCard,
    CitizenId,
    ForeignerCard,
    ForeignerId,
    Nit,
    Passport,
    ForeignId,
    NoForeignId,
    ForeignLegalId,
    Diplomatic,
    SpecialPermit,
    TemporaryPermit,
    ForeignNit,
}

impl IdType {
    pub fn code(&self) -> &'static str {
        match self {
            IdType::BirthRegistry => "11",
            IdType::IdentityCard => "12",
            IdType::CitizenId => "13",
            IdType::ForeignerCard => "21",
            IdType::ForeignerId => "22",
            IdType::Nit => "31",
            IdType::Passport => "41",
            IdType::ForeignId => "42",
            IdType::NoForeignId => "43",
            IdType::ForeignLegalId => "44",
            IdType::Diplomatic => "46",
            IdType::SpecialPermit => "47",
            IdType::TemporaryPermit => "48",
            IdType::ForeignNit => "50",
        }
    }

    pub fn from_code(code: &str) -> Option<IdType> {
        let id_type = match code.trim() {
            "11" => IdType::BirthRegistry,
            "12" => IdType::IdentityCard,
            "13" => IdType::CitizenId,
            "21" => IdType::ForeignerCard,
            "22" => IdType::ForeignerId,
            "31" => IdType::Nit,
            "41" => IdType::Passport,
            "42" => IdType::ForeignId,
            "43" => IdType::NoForeignId,
            "44" => IdType::ForeignLegalId,
            "46" => IdType::Diplomatic,
            "47" => IdType::SpecialPermit,
            "48" => IdType::TemporaryPermit,
            "50" => IdType::ForeignNit,
            _ => return None,
        };
        Some(id_type)
    }

    pub fn category(&self) -> EntityCategory {
        match self {
            IdType::Nit => EntityCategory::LegalEntity,
            IdType::Passport
            | IdType::ForeignId
            | IdType::NoForeignId
            | IdType::ForeignLegalId
            | IdType::ForeignNit => EntityCategory::ForeignEntity,
            IdType::BirthRegistry
            | IdType::IdentityCard
            | IdType::CitizenId
            | IdType::ForeignerCard
            | IdType::ForeignerId
            | IdType::Diplomatic
            | IdType::SpecialPermit
            | IdType::TemporaryPermit => EntityCategory::NaturalPerson,
        }
    }
}

/// Infer the document type from the shape of an id.
pub fn infer_id_type(id: &str) -> IdType {
    let cleaned: String = id
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '-'))
        .collect();
    if cleaned.is_empty() || cleaned == MINOR_AMOUNTS_ID {
        return IdType::NoForeignId;
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        let letters = cleaned.chars().filter(|c| c.is_alphabetic()).count();
        return if letters <= 3 {
            IdType::Passport
        } else {
            IdType::ForeignId
        };
    }
    if cleaned.len() >= 9 && cleaned.starts_with(['8', '9']) {
        IdType::Nit
    } else {
        IdType::CitizenId
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub first_surname: String,
    pub second_surname: String,
    pub first_name: String,
    pub second_name: String,
}

/// Split a free-text person name as "surname surname given given...".
/// Tokens past the fourth are folded into the second given name.
pub fn split_name(name: &str) -> PersonName {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let part = |i: usize| tokens.get(i).map(|s| s.to_string()).unwrap_or_default();
    PersonName {
        first_surname: part(0),
        second_surname: part(1),
        first_name: part(2),
        second_name: tokens.get(3..).map(|rest| rest.join(" ")).unwrap_or_default(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EntityName {
    Person(PersonName),
    Legal(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub region: String,
    pub locality: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: String,
    pub category: EntityCategory,
    pub id_type: IdType,
    /// Check digit supplied by a directory, if any.
    pub supplied_check_digit: Option<String>,
    pub name: EntityName,
    pub address: Address,
}

impl Entity {
    pub fn minor_amounts() -> Self {
        Entity {
            id: MINOR_AMOUNTS_ID.to_string(),
            category: EntityCategory::GenericMinorAmounts,
            id_type: IdType::NoForeignId,
            supplied_check_digit: None,
            name: EntityName::Legal(MINOR_AMOUNTS_NAME.to_string()),
            address: Address::default(),
        }
    }

    pub fn is_natural_person(&self) -> bool {
        self.category == EntityCategory::NaturalPerson
    }

    /// Check digit to report: the supplied one, or the computed one for legal entities.
    pub fn check_digit(&self) -> String {
        if let Some(dv) = &self.supplied_check_digit {
            return dv.clone();
        }
        match self.category {
            EntityCategory::LegalEntity => check_digit(&self.id).map(|d| d.to_string()).unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Identity and address data for one id from a single source.
/// Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: Option<String>,
    pub street: Option<String>,
    pub region: Option<String>,
    pub locality: Option<String>,
    pub country: Option<String>,
    pub id_type: Option<String>,
    pub check_digit: Option<String>,
}

fn overlay(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        if !value.trim().is_empty() {
            *target = Some(value.trim().to_string());
        }
    }
}

impl DirectoryEntry {
    /// Later sources win field by field; an empty field never clears an earlier value.
    pub fn overlay(&mut self, other: &DirectoryEntry) {
        overlay(&mut self.name, &other.name);
        overlay(&mut self.street, &other.street);
        overlay(&mut self.region, &other.region);
        overlay(&mut self.locality, &other.locality);
        overlay(&mut self.country, &other.country);
        overlay(&mut self.id_type, &other.id_type);
        overlay(&mut self.check_digit, &other.check_digit);
    }
}

/// Fold partial entries from lowest to highest precedence.
pub fn merge(id: &str, layers: &[&DirectoryEntry]) -> DirectoryEntry {
    layers.iter().fold(
        DirectoryEntry {
            id: id.to_string(),
            ..Default::default()
        },
        |mut merged, layer| {
            merged.overlay(layer);
            merged
        },
    )
}

/// Zero-pad a numeric code to `width` digits; non-numeric text is kept as is.
pub fn pad_code(code: &str, width: usize) -> String {
    let code = code.trim();
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>width$}", code, width = width)
    } else {
        code.to_string()
    }
}

/// Resolves counterparties against the inferred, registry and client layers.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    registry: BTreeMap<String, DirectoryEntry>,
    client: BTreeMap<String, DirectoryEntry>,
}

impl EntityResolver {
    pub fn new(registry: Vec<DirectoryEntry>, client: Vec<DirectoryEntry>) -> Self {
        let index = |entries: Vec<DirectoryEntry>| {
            entries
                .into_iter()
                .filter(|e| !e.id.is_empty())
                .map(|e| (e.id.clone(), e))
                .collect()
        };
        EntityResolver {
            registry: index(registry),
            client: index(client),
        }
    }

    pub fn resolve(&self, id: &str, raw_name: &str, id_type_hint: Option<IdType>) -> Entity {
        let id = id.trim();
        if id == MINOR_AMOUNTS_ID {
            return Entity::minor_amounts();
        }
        let mut inferred = DirectoryEntry {
            id: id.to_string(),
            name: Some(raw_name.to_string()),
            id_type: Some(id_type_hint.unwrap_or_else(|| infer_id_type(id)).code().to_string()),
            ..Default::default()
        };
        if let Some(known) = known_foreign(id) {
            inferred.name = Some(known.name.to_string());
            inferred.country = Some(known.country.to_string());
            inferred.id_type = Some(IdType::NoForeignId.code().to_string());
        }
        let mut layers = vec![&inferred];
        layers.extend(self.registry.get(id));
        layers.extend(self.client.get(id));
        let merged = merge(id, &layers);
        log::debug!("resolved {} from {} source(s)", id, layers.len());
        finalize(merged)
    }
}

/// Turn a merged entry into an entity that satisfies its category's field rules.
pub fn finalize(entry: DirectoryEntry) -> Entity {
    if entry.id == MINOR_AMOUNTS_ID {
        return Entity::minor_amounts();
    }
    let id_type = entry
        .id_type
        .as_deref()
        .and_then(IdType::from_code)
        .unwrap_or_else(|| infer_id_type(&entry.id));
    let category = id_type.category();
    let name = entry.name.unwrap_or_default();
    let mut address = Address {
        street: entry.street.unwrap_or_default(),
        region: pad_code(&entry.region.unwrap_or_default(), 2),
        locality: pad_code(&entry.locality.unwrap_or_default(), 3),
        country: entry.country.unwrap_or_default(),
    };
    let name = match category {
        EntityCategory::NaturalPerson => EntityName::Person(split_name(&name)),
        EntityCategory::LegalEntity | EntityCategory::GenericMinorAmounts => EntityName::Legal(name),
        EntityCategory::ForeignEntity => {
            address.street.clear();
            address.region.clear();
            address.locality.clear();
            if address.country.is_empty() || is_domestic_country(&address.country) {
                address.country = detect_country(&name)
                    .unwrap_or(DEFAULT_FOREIGN_COUNTRY)
                    .to_string();
            }
            EntityName::Legal(name)
        }
    };
    if address.country.is_empty() && category != EntityCategory::ForeignEntity {
        address.country = DOMESTIC_COUNTRY.to_string();
    }
    Entity {
        id: entry.id,
        category,
        id_type,
        supplied_check_digit: entry.check_digit,
        name,
        address,
    }
}
