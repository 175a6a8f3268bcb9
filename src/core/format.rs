//! Disclosure formats: column layout, XML tags and consolidation rules.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rules::ConfigurationError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
pub enum Format {
    /// Payments and deductions
    #[serde(rename = "1001")]
    #[value(name = "1001")]
    F1001,
    /// Withholdings suffered
    #[serde(rename = "1003")]
    #[value(name = "1003")]
    F1003,
    /// Deductible VAT
    #[serde(rename = "1005")]
    #[value(name = "1005")]
    F1005,
    /// Generated VAT
    #[serde(rename = "1006")]
    #[value(name = "1006")]
    F1006,
    /// Income received
    #[serde(rename = "1007")]
    #[value(name = "1007")]
    F1007,
    /// Accounts receivable
    #[serde(rename = "1008")]
    #[value(name = "1008")]
    F1008,
    /// Accounts payable
    #[serde(rename = "1009")]
    #[value(name = "1009")]
    F1009,
    /// Cash, banks and investments
    #[serde(rename = "1012")]
    #[value(name = "1012")]
    F1012,
    /// Employee income
    #[serde(rename = "2276")]
    #[value(name = "2276")]
    F2276,
}

impl Format {
    pub const ALL: [Format; 9] = [
        Format::F1001,
        Format::F1003,
        Format::F1005,
        Format::F1006,
        Format::F1007,
        Format::F1008,
        Format::F1009,
        Format::F1012,
        Format::F2276,
    ];

    pub fn code(&self) -> &'static str {
        self.def().code
    }

    pub fn def(&self) -> &'static FormatDef {
        match self {
            Format::F1001 => &F1001,
            Format::F1003 => &F1003,
            Format::F1005 => &F1005,
            Format::F1006 => &F1006,
            Format::F1007 => &F1007,
            Format::F1008 => &F1008,
            Format::F1009 => &F1009,
            Format::F1012 => &F1012,
            Format::F2276 => &F2276,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Format {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().trim_start_matches(['F', 'f']);
        Format::ALL
            .into_iter()
            .find(|format| format.code() == code)
            .ok_or_else(|| ConfigurationError::UnknownFormat(s.to_string()))
    }
}

/// Identity and concept columns that precede the value columns of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentityField {
    Concept,
    IdType,
    Id,
    CheckDigit,
    FirstSurname,
    SecondSurname,
    FirstName,
    SecondName,
    LegalName,
    Street,
    Region,
    Locality,
    Country,
}

impl IdentityField {
    pub fn header(&self) -> &'static str {
        match self {
            IdentityField::Concept => "Concepto",
            IdentityField::IdType => "Tipo Doc",
            IdentityField::Id => "No ID",
            IdentityField::CheckDigit => "DV",
            IdentityField::FirstSurname => "Apellido1",
            IdentityField::SecondSurname => "Apellido2",
            IdentityField::FirstName => "Nombre1",
            IdentityField::SecondName => "Nombre2",
            IdentityField::LegalName => "Razon Social",
            IdentityField::Street => "Direccion",
            IdentityField::Region => "Dpto",
            IdentityField::Locality => "Mpio",
            IdentityField::Country => "Pais",
        }
    }

    pub fn xml_tag(&self) -> &'static str {
        match self {
            IdentityField::Concept => "co",
            IdentityField::IdType => "tdoc",
            IdentityField::Id => "nid",
            IdentityField::CheckDigit => "dv",
            IdentityField::FirstSurname => "ape1",
            IdentityField::SecondSurname => "ape2",
            IdentityField::FirstName => "nom1",
            IdentityField::SecondName => "nom2",
            IdentityField::LegalName => "raz",
            IdentityField::Street => "dir",
            IdentityField::Region => "dpto",
            IdentityField::Locality => "mpio",
            IdentityField::Country => "pais",
        }
    }

    /// Field name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            IdentityField::Concept => "concept",
            IdentityField::IdType => "id_type",
            IdentityField::Id => "id",
            IdentityField::CheckDigit => "check_digit",
            IdentityField::FirstSurname => "first_surname",
            IdentityField::SecondSurname => "second_surname",
            IdentityField::FirstName => "first_name",
            IdentityField::SecondName => "second_name",
            IdentityField::LegalName => "legal_name",
            IdentityField::Street => "street",
            IdentityField::Region => "region",
            IdentityField::Locality => "locality",
            IdentityField::Country => "country",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdentityLayout {
    pub concept: bool,
    pub legal_name: bool,
    pub address: bool,
    pub country: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ValueColumn {
    pub key: &'static str,
    pub header: &'static str,
}

const fn col(key: &'static str, header: &'static str) -> ValueColumn {
    ValueColumn { key, header }
}

/// How below-threshold counterparties are consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinorAmounts {
    /// Every counterparty is reported individually.
    Never,
    /// Fold counterparties whose primary amount is below `uvt_multiple` tax
    /// value units and whose withholding columns are all zero.
    Below { uvt_multiple: u32 },
}

#[derive(Debug)]
pub struct FormatDef {
    pub code: &'static str,
    pub version: &'static str,
    pub title: &'static str,
    pub body_tag: &'static str,
    pub row_tag: &'static str,
    pub layout: IdentityLayout,
    pub values: &'static [ValueColumn],
    /// Columns summed to decide whether a bucket carries any amount.
    pub primary: &'static [usize],
    /// Columns that keep a counterparty out of the minor-amounts bucket.
    pub withholding: &'static [usize],
    /// Inclusive numeric ranges of concept codes the authority accepts.
    pub known_concepts: &'static [(u32, u32)],
    pub minor_amounts: MinorAmounts,
}

impl FormatDef {
    pub fn identity_fields(&self) -> Vec<IdentityField> {
        let mut fields = Vec::with_capacity(13);
        if self.layout.concept {
            fields.push(IdentityField::Concept);
        }
        fields.extend([
            IdentityField::IdType,
            IdentityField::Id,
            IdentityField::CheckDigit,
            IdentityField::FirstSurname,
            IdentityField::SecondSurname,
            IdentityField::FirstName,
            IdentityField::SecondName,
        ]);
        if self.layout.legal_name {
            fields.push(IdentityField::LegalName);
        }
        if self.layout.address {
            fields.extend([
                IdentityField::Street,
                IdentityField::Region,
                IdentityField::Locality,
            ]);
        }
        if self.layout.country {
            fields.push(IdentityField::Country);
        }
        fields
    }

    pub fn has_field(&self, field: IdentityField) -> bool {
        self.identity_fields().contains(&field)
    }

    /// Fixed header row of the tabular document.
    pub fn headers(&self) -> Vec<&'static str> {
        self.identity_fields()
            .iter()
            .map(IdentityField::header)
            .chain(self.values.iter().map(|v| v.header))
            .collect()
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.values.iter().position(|v| v.key == key)
    }

    pub fn is_known_concept(&self, concept: &str) -> bool {
        if !self.layout.concept {
            return true;
        }
        match concept.parse::<u32>() {
            Ok(code) => self
                .known_concepts
                .iter()
                .any(|(start, end)| (*start..=*end).contains(&code)),
            Err(_) => false,
        }
    }

    pub fn threshold(&self, uvt: Decimal) -> Option<Decimal> {
        match self.minor_amounts {
            MinorAmounts::Never => None,
            MinorAmounts::Below { uvt_multiple } => Some(uvt * Decimal::from(uvt_multiple)),
        }
    }
}

const FULL: IdentityLayout = IdentityLayout {
    concept: true,
    legal_name: true,
    address: true,
    country: true,
};

const DOMESTIC: IdentityLayout = IdentityLayout {
    concept: true,
    legal_name: true,
    address: true,
    country: false,
};

const NO_CONCEPT: IdentityLayout = IdentityLayout {
    concept: false,
    legal_name: true,
    address: true,
    country: false,
};

pub static F1001: FormatDef = FormatDef {
    code: "1001",
    version: "10",
    title: "Pagos",
    body_tag: "pagos",
    row_tag: "pag",
    layout: FULL,
    values: &[
        col("pago_deducible", "Pago Deducible"),
        col("pago_no_deducible", "Pago No Deducible"),
        col("iva_mayor_valor", "IVA Ded"),
        col("iva_mayor_valor_nd", "IVA No Ded"),
        col("retfte_practicada", "Ret Fte Renta"),
        col("retfte_asumida", "Ret Fte Asumida"),
        col("retiva_practicada", "Ret IVA R.Comun"),
        col("retiva_no_domiciliado", "Ret IVA No Dom"),
    ],
    primary: &[0, 1],
    withholding: &[4, 6],
    known_concepts: &[
        (5001, 5016),
        (5023, 5025),
        (5027, 5030),
        (5055, 5056),
        (5058, 5061),
        (5069, 5079),
        (5101, 5105),
    ],
    minor_amounts: MinorAmounts::Below { uvt_multiple: 3 },
};

pub static F1003: FormatDef = FormatDef {
    code: "1003",
    version: "7",
    title: "Retenciones",
    body_tag: "retenciones",
    row_tag: "ret",
    layout: DOMESTIC,
    values: &[
        col("base_retencion", "Base Retencion"),
        col("retencion", "Retencion Acumulada"),
    ],
    primary: &[1],
    withholding: &[],
    known_concepts: &[(1301, 1311)],
    minor_amounts: MinorAmounts::Never,
};

pub static F1005: FormatDef = FormatDef {
    code: "1005",
    version: "8",
    title: "IVA Descontable",
    body_tag: "ivadescontable",
    row_tag: "ivd",
    layout: NO_CONCEPT,
    values: &[
        col("iva_descontable", "IVA Descontable"),
        col("iva_devol_ventas", "IVA Devol Ventas"),
    ],
    primary: &[0],
    withholding: &[],
    known_concepts: &[],
    minor_amounts: MinorAmounts::Never,
};

pub static F1006: FormatDef = FormatDef {
    code: "1006",
    version: "8",
    title: "IVA Generado",
    body_tag: "ivagenerado",
    row_tag: "ivg",
    layout: NO_CONCEPT,
    values: &[
        col("iva_generado", "IVA Generado"),
        col("iva_devol_compras", "IVA Devol Compras"),
        col("imp_consumo", "Imp Consumo"),
    ],
    primary: &[0],
    withholding: &[],
    known_concepts: &[],
    minor_amounts: MinorAmounts::Never,
};

pub static F1007: FormatDef = FormatDef {
    code: "1007",
    version: "9",
    title: "Ingresos",
    body_tag: "ingresos",
    row_tag: "ing",
    layout: FULL,
    values: &[
        col("ingreso_recibido", "Ingresos Brutos"),
        col("devol_rebaja_desc", "Devoluciones"),
    ],
    primary: &[0],
    withholding: &[],
    known_concepts: &[(4001, 4010), (4015, 4020)],
    minor_amounts: MinorAmounts::Below { uvt_multiple: 3 },
};

pub static F1008: FormatDef = FormatDef {
    code: "1008",
    version: "7",
    title: "Cuentas por Cobrar",
    body_tag: "cxcobrar",
    row_tag: "cxc",
    layout: DOMESTIC,
    values: &[col("saldo_cxc", "Saldo CxC Dic31")],
    primary: &[0],
    withholding: &[],
    known_concepts: &[(1315, 1317), (1325, 1325), (1330, 1330), (1345, 1345)],
    minor_amounts: MinorAmounts::Below { uvt_multiple: 12 },
};

pub static F1009: FormatDef = FormatDef {
    code: "1009",
    version: "7",
    title: "Cuentas por Pagar",
    body_tag: "cxpagar",
    row_tag: "cxp",
    layout: DOMESTIC,
    values: &[col("saldo_cxp", "Saldo CxP Dic31")],
    primary: &[0],
    withholding: &[],
    known_concepts: &[(2201, 2210)],
    minor_amounts: MinorAmounts::Below { uvt_multiple: 12 },
};

pub static F1012: FormatDef = FormatDef {
    code: "1012",
    version: "8",
    title: "Inversiones",
    body_tag: "inversiones",
    row_tag: "inv",
    layout: IdentityLayout {
        concept: true,
        legal_name: true,
        address: false,
        country: false,
    },
    values: &[
        col("saldo_dic31", "Saldo Dic31"),
        col("valor_patrimonial", "Valor Patrimonial"),
    ],
    primary: &[0],
    withholding: &[],
    known_concepts: &[(8301, 8310)],
    minor_amounts: MinorAmounts::Never,
};

pub static F2276: FormatDef = FormatDef {
    code: "2276",
    version: "3",
    title: "Rentas de Trabajo",
    body_tag: "rentas",
    row_tag: "ren",
    layout: IdentityLayout {
        concept: false,
        legal_name: false,
        address: true,
        country: true,
    },
    values: &[
        col("salarios", "Salarios"),
        col("emol_ecles", "Emol Ecles"),
        col("honor_383", "Honor 383"),
        col("serv_383", "Serv 383"),
        col("comis_383", "Comis 383"),
        col("pensiones", "Pensiones"),
        col("vacaciones", "Vacaciones"),
        col("cesantias_int", "Cesantias e Int"),
        col("incapacidades", "Incapacidades"),
        col("otros_pag_lab", "Otros Pag Lab"),
        col("total_bruto", "Total Bruto"),
        col("aporte_salud", "Aporte Salud"),
        col("aporte_pension", "Aporte Pension"),
        col("sol_pensional", "Sol Pensional"),
        col("vol_empleador", "Vol Empleador"),
        col("vol_trabajador", "Vol Trabajador"),
        col("afc", "AFC"),
        col("retfte", "Ret Fte"),
        col("total_pagos", "Total Pagos"),
    ],
    primary: &[10],
    withholding: &[17],
    known_concepts: &[],
    minor_amounts: MinorAmounts::Never,
};
