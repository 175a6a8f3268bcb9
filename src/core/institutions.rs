//! Fixed counterparties and name-based lookups: the tax authority, domestic
//! banks, well-known foreign service providers and country detection.

use super::text::normalize;

pub const TAX_AUTHORITY_ID: &str = "800197268";
pub const TAX_AUTHORITY_NAME: &str = "DIRECCION DE IMPUESTOS Y ADUANAS NACIONALES - DIAN";
pub const TAX_AUTHORITY_STREET: &str = "CRA 8 # 6C-38";
pub const TAX_AUTHORITY_REGION: &str = "11";
pub const TAX_AUTHORITY_LOCALITY: &str = "001";

/// Government entities that never appear as withholding agents in 1003.
pub const PUBLIC_WITHHOLDING_AGENTS: &[&str] = &[TAX_AUTHORITY_ID, "899999090", "899999063"];

pub struct Bank {
    pub id: &'static str,
    pub name: &'static str,
}

const fn bank(id: &'static str, name: &'static str) -> Bank {
    Bank { id, name }
}

/// Label fragments identifying domestic banks, checked in order.
static BANKS: &[(&str, Bank)] = &[
    ("bancolombia", bank("890903938", "BANCOLOMBIA S.A.")),
    ("nequi", bank("890903938", "BANCOLOMBIA S.A.")),
    ("davivienda", bank("860034313", "BANCO DAVIVIENDA S.A.")),
    ("daviplata", bank("860034313", "BANCO DAVIVIENDA S.A.")),
    ("bogota", bank("860002964", "BANCO DE BOGOTA S.A.")),
    ("occidente", bank("890300279", "BANCO DE OCCIDENTE S.A.")),
    ("popular", bank("860007738", "BANCO POPULAR S.A.")),
    ("bbva", bank("860003020", "BBVA COLOMBIA S.A.")),
    ("scotiabank", bank("890903937", "SCOTIABANK COLPATRIA S.A.")),
    ("colpatria", bank("890903937", "SCOTIABANK COLPATRIA S.A.")),
    ("itau", bank("890903937", "ITAU CORPBANCA COLOMBIA S.A.")),
    ("av villas", bank("860035827", "BANCO AV VILLAS S.A.")),
    ("avvillas", bank("860035827", "BANCO AV VILLAS S.A.")),
    ("caja social", bank("860007335", "BANCO CAJA SOCIAL S.A.")),
    ("agrario", bank("800037800", "BANCO AGRARIO DE COLOMBIA S.A.")),
    ("bancamia", bank("900215071", "BANCAMIA S.A.")),
    ("nu colombia", bank("901654565", "NU COLOMBIA S.A.")),
    ("nubank", bank("901654565", "NU COLOMBIA S.A.")),
    ("gnb", bank("860050750", "GNB SUDAMERIS S.A.")),
    ("helm", bank("860050750", "GNB SUDAMERIS S.A.")),
    ("pichincha", bank("890200756", "BANCO PICHINCHA S.A.")),
    ("falabella", bank("900047981", "BANCO FALABELLA S.A.")),
    ("serfinanza", bank("860043186", "BANCO SERFINANZA S.A.")),
    ("coopcentral", bank("890203088", "BANCO COOPCENTRAL")),
    ("citibank", bank("860051135", "CITIBANK COLOMBIA S.A.")),
    ("lulo", bank("900943055", "LULO BANK S.A.")),
    ("ban100", bank("900943055", "LULO BANK S.A.")),
];

/// Bank named by a cash-account label such as "Bancolombia cta ahorros 123".
pub fn detect_bank(label: &str) -> Option<&'static Bank> {
    let label = normalize(label);
    BANKS
        .iter()
        .find(|(fragment, _)| label.contains(fragment))
        .map(|(_, bank)| bank)
}

pub struct KnownForeign {
    pub name: &'static str,
    pub country: &'static str,
}

static KNOWN_FOREIGN: &[(&str, KnownForeign)] = &[
    ("444444001", KnownForeign { name: "GOOGLE LLC", country: "840" }),
    ("444444002", KnownForeign { name: "GOOGLE IRELAND LIMITED", country: "372" }),
    ("444444004", KnownForeign { name: "META PLATFORMS INC", country: "840" }),
    ("444444005", KnownForeign { name: "META PLATFORMS IRELAND LIMITED", country: "372" }),
    ("444444007", KnownForeign { name: "AMAZON.COM INC", country: "840" }),
    ("444444008", KnownForeign { name: "AMAZON WEB SERVICES INC", country: "840" }),
    ("444444009", KnownForeign { name: "MICROSOFT CORPORATION", country: "840" }),
    ("444444010", KnownForeign { name: "MICROSOFT IRELAND OPERATIONS LTD", country: "372" }),
    ("444444011", KnownForeign { name: "APPLE INC", country: "840" }),
    ("444444012", KnownForeign { name: "NETFLIX INC", country: "840" }),
    ("444444013", KnownForeign { name: "NETFLIX INTERNATIONAL B.V.", country: "528" }),
    ("444444014", KnownForeign { name: "SPOTIFY AB", country: "752" }),
    ("444444016", KnownForeign { name: "ADOBE INC", country: "840" }),
    ("444444018", KnownForeign { name: "UBER TECHNOLOGIES INC", country: "840" }),
    ("444444019", KnownForeign { name: "UBER B.V.", country: "528" }),
];

pub fn known_foreign(id: &str) -> Option<&'static KnownForeign> {
    KNOWN_FOREIGN
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, entity)| entity)
}

static BRANDS: &[(&str, &str)] = &[
    ("google", "840"),
    ("meta platforms", "840"),
    ("facebook", "840"),
    ("amazon", "840"),
    ("microsoft", "840"),
    ("apple", "840"),
    ("netflix", "840"),
    ("spotify", "752"),
    ("adobe", "840"),
    ("uber", "840"),
    ("salesforce", "840"),
    ("oracle", "840"),
    ("dropbox", "840"),
    ("stripe", "840"),
    ("paypal", "840"),
    ("openai", "840"),
    ("airbnb", "840"),
    ("tiktok", "156"),
    ("alibaba", "156"),
    ("aliexpress", "156"),
    ("huawei", "156"),
    ("xiaomi", "156"),
    ("samsung", "410"),
    ("toyota", "392"),
    ("nestle", "756"),
    ("unilever", "528"),
    ("shopify", "124"),
    ("canva", "036"),
    ("maersk", "208"),
    ("lufthansa", "276"),
    ("iberia", "724"),
];

static CORPORATE_SUFFIXES: &[(&str, &str)] = &[
    ("llc", "840"),
    ("inc", "840"),
    ("corp", "840"),
    ("corporation", "840"),
    ("pbc", "840"),
    ("ltd", "826"),
    ("limited", "826"),
    ("plc", "826"),
    ("gmbh", "276"),
    ("ag", "276"),
    ("bv", "528"),
    ("nv", "528"),
    ("ab", "752"),
    ("srl", "380"),
    ("spa", "380"),
];

/// Country code suggested by a company name: brand fragments first, then
/// corporate-suffix tokens ("B.V." is read as the token "bv").
pub fn detect_country(name: &str) -> Option<&'static str> {
    let undotted = name.replace('.', "");
    let normalized = normalize(&undotted);
    if normalized.is_empty() {
        return None;
    }
    if let Some((_, country)) = BRANDS.iter().find(|(brand, _)| normalized.contains(brand)) {
        return Some(*country);
    }
    normalized.split(' ').find_map(|token| {
        CORPORATE_SUFFIXES
            .iter()
            .find(|(suffix, _)| *suffix == token)
            .map(|(_, country)| *country)
    })
}
