//! Rule tables per format and the account classifier built on them.

use super::format::Format;
use super::rules::{AccountRange, Classification, KeywordRule, Rule, RuleEntry, RuleTable};
use super::text::PreparedLabel;

/// Payroll concepts of format 1001 that are reported in format 2276 instead.
pub const PAYROLL_CONCEPTS: &[&str] = &["5001", "5023", "5024", "5025", "5027"];

/// Concepts of format 1001 that only a legal entity can receive.
pub const LEGAL_ENTITY_CONCEPTS: &[&str] = &["5011", "5012", "5013", "5023", "5024", "5025", "5027"];

/// Fallback 1001 concept for expenses that match nothing more specific.
pub const OTHER_EXPENSES: &str = "5016";

/// Payroll-contribution target in the 2276 table; such rows are not employee income.
pub const PAYROLL_CONTRIBUTIONS: &str = "parafiscales";

const fn kw(concept: &'static str, phrases: &'static [&'static str]) -> KeywordRule {
    KeywordRule {
        concept,
        deductible: true,
        phrases,
    }
}

const fn range(concept: &'static str, start: &'static str, end: &'static str) -> Rule {
    Rule::Range {
        concept,
        range: AccountRange::new(start, end),
        deductible: true,
    }
}

static KEYWORDS_1001: &[KeywordRule] = &[
    kw(
        "5001",
        &[
            "sueldo",
            "salario",
            "basico",
            "jornal",
            "horas extra",
            "recargo",
            "auxilio transporte",
            "auxilio de transporte",
            "rodamiento",
        ],
    ),
    kw("5002", &["honorario", "honorarios"]),
    kw("5002", &["comision", "comisiones"]),
    kw(
        "5024",
        &[
            "aporte salud",
            "aporte eps",
            "aportes a eps",
            "aporte a eps",
            "aporte a salud",
            "cotizacion salud",
            "aportes eps",
        ],
    ),
    kw(
        "5025",
        &[
            "aporte pension",
            "aporte a pension",
            "aportes a pension",
            "pension obligatoria",
            "cotizacion pension",
            "fondo pension",
            "aportes pension",
        ],
    ),
    kw(
        "5027",
        &[
            "arl",
            "riesgo laboral",
            "riesgos laborales",
            "riesgos profesionales",
            "aporte arl",
            "aporte riesgo",
            "aportes arl",
        ],
    ),
    kw(
        "5023",
        &[
            "parafiscal",
            "parafiscales",
            "icbf",
            "sena",
            "caja de compensacion",
            "compensacion familiar",
            "comfama",
            "compensar",
            "cafam",
            "colsubsidio",
            "comfenalco",
        ],
    ),
    kw("5001", &["vacacion", "vacaciones"]),
    kw(
        "5001",
        &[
            "cesantia",
            "cesantias",
            "interes sobre cesantia",
            "intereses cesantia",
            "intereses sobre cesantias",
        ],
    ),
    kw("5001", &["prima de servicio", "prima servicio", "prima legal"]),
    kw("5001", &["dotacion", "suministro a trabajador"]),
    kw("5001", &["incapacidad", "incapacidades"]),
    kw("5001", &["bonificacion", "bonificaciones"]),
    kw(
        "5011",
        &["seguro", "poliza", "prima de seguro", "todo riesgo", "cumplimiento"],
    ),
    kw(
        "5005",
        &["arriendo", "arrendamiento", "arrendamientos", "canon", "alquiler"],
    ),
    kw(
        "5004",
        &[
            "acueducto",
            "alcantarillado",
            "energia",
            "electrica",
            "telefono",
            "telecomunicacion",
            "internet",
            "gas",
            "servicio publico",
            "servicios publicos",
            "vigilancia",
            "correo",
            "portes",
        ],
    ),
    kw(
        "5004",
        &["transporte", "flete", "acarreo", "taxi", "taxis", "buses", "envio", "mensajeria"],
    ),
    kw(
        "5055",
        &[
            "impuesto",
            "ica",
            "industria y comercio",
            "predial",
            "vehiculo",
            "timbre",
            "estampilla",
            "estampillas",
        ],
    ),
    kw(
        "5006",
        &[
            "interes bancario",
            "intereses bancarios",
            "interes mora",
            "gmf",
            "4x1000",
            "4 x 1000",
            "comision bancaria",
            "comisiones bancarias",
            "gasto financiero",
            "gastos financieros",
            "diferencia en cambio",
            "gravamen",
            "rendimiento financiero",
        ],
    ),
    kw(
        "5010",
        &[
            "gastos de personal",
            "personal admn",
            "bienestar",
            "medicina prepagada",
            "auxilio funerario",
            "auxilio educativo",
            "capacitacion empleado",
        ],
    ),
    kw(
        "5016",
        &["viaje", "viatico", "pasaje", "tiquete", "hospedaje", "hotel"],
    ),
    kw(
        "5016",
        &["mantenimiento", "reparacion", "adecuacion", "instalacion electrica"],
    ),
    kw("5016", &["legal", "notarial", "registro", "licencia"]),
    kw(
        "5016",
        &["depreciacion", "amortizacion", "agotamiento", "provision"],
    ),
    kw(
        "5016",
        &[
            "aseo y cafeteria",
            "cafeteria",
            "papeleria",
            "utiles",
            "fotocopia",
            "parqueadero",
            "casino",
            "restaurante",
            "representacion",
            "suscripcion",
            "afiliacion",
            "publicidad",
            "propaganda",
            "seminario",
            "elemento de aseo",
            "diversos",
        ],
    ),
    kw(
        "5007",
        &[
            "inventario",
            "compra de",
            "mercancia",
            "materia prima",
            "material",
            "insumo",
            "repuesto",
        ],
    ),
];

/// Two digits after 5105 for payroll sub-accounts.
static PAYROLL_SUBACCOUNTS_1001: &[(&str, &str)] = &[
    ("01", "5002"),
    ("02", "5024"),
    ("03", "5002"),
    ("04", "5027"),
    ("05", "5002"),
    ("06", "5001"),
    ("07", "5001"),
    ("08", "5001"),
    ("09", "5001"),
    ("10", "5001"),
    ("15", "5001"),
    ("27", "5001"),
    ("30", "5001"),
    ("33", "5001"),
    ("36", "5001"),
    ("39", "5001"),
    ("42", "5001"),
    ("45", "5001"),
    ("68", "5023"),
    ("72", "5023"),
    ("75", "5023"),
];

static KEYWORDS_1003: &[KeywordRule] = &[
    kw(
        "1301",
        &[
            "retencion honorario",
            "retfte honorario",
            "retefuente honorario",
            "rete fuente honorario",
        ],
    ),
    kw(
        "1302",
        &["retencion comision", "retfte comision", "retefuente comision"],
    ),
    kw(
        "1303",
        &["retencion servicio", "retfte servicio", "retefuente servicio"],
    ),
    kw(
        "1304",
        &[
            "retencion arriendo",
            "retfte arriendo",
            "retefuente arriendo",
            "retencion arrendamiento",
        ],
    ),
    kw(
        "1305",
        &[
            "retencion rendimiento",
            "retfte rendimiento",
            "retefuente rendimiento",
            "retencion financiero",
            "rendimientos financieros",
            "rendimiento financiero",
        ],
    ),
    kw(
        "1306",
        &["retencion compra", "retfte compra", "retefuente compra", "retencion enajenacion"],
    ),
    kw(
        "1307",
        &[
            "retencion ica",
            "rete ica",
            "reteica",
            "industria y comercio retenido",
            "ica retenido",
            "impuesto de industria y comercio",
        ],
    ),
    kw(
        "1308",
        &[
            "otras retencion",
            "otra retencion",
            "retencion otro",
            "retencion otros",
            "retenciones por cobrar",
        ],
    ),
    kw(
        "1311",
        &[
            "autorretencion",
            "auto retencion",
            "autoretefte",
            "autoretfte",
            "anticipo autorretencion",
        ],
    ),
];

static KEYWORDS_1007: &[KeywordRule] = &[
    kw(
        "4001",
        &[
            "ingreso operacional",
            "consultoria",
            "asesoria",
            "soporte tecnico",
            "capacitacion",
            "outsourcing",
            "desarrollo software",
            "servicio",
            "honorario recibido",
            "ingreso actividad",
        ],
    ),
    kw("4001", &["venta", "comercio", "producto", "mercancia"]),
    kw(
        "4002",
        &["ingreso no operacional", "extraordinario", "recuperacion"],
    ),
    kw(
        "4003",
        &["arrendamiento recibido", "arriendo recibido", "canon recibido"],
    ),
];

static PAYROLL_SUBACCOUNTS_2276: &[(&str, &str)] = &[
    ("01", "honor_383"),
    ("02", "aporte_salud"),
    ("03", "salarios"),
    ("04", "aporte_pension"),
    ("05", "honor_383"),
    ("06", "salarios"),
    ("07", "salarios"),
    ("08", "salarios"),
    ("09", "salarios"),
    ("10", "salarios"),
    ("15", "salarios"),
    ("27", "salarios"),
    ("30", "cesantias_int"),
    ("33", "cesantias_int"),
    ("36", "otros_pag_lab"),
    ("39", "vacaciones"),
    ("42", "otros_pag_lab"),
    ("45", "otros_pag_lab"),
    ("68", PAYROLL_CONTRIBUTIONS),
    ("72", PAYROLL_CONTRIBUTIONS),
    ("75", PAYROLL_CONTRIBUTIONS),
];

static KEYWORDS_2276: &[KeywordRule] = &[
    kw(
        "salarios",
        &[
            "salario integral",
            "integral",
            "sueldo",
            "salario",
            "basico",
            "jornal",
            "hora extra",
            "horas extra",
            "recargo",
        ],
    ),
    kw(
        "cesantias_int",
        &["cesantia", "interes sobre cesantia", "intereses cesantia"],
    ),
    kw("vacaciones", &["vacacion", "vacaciones"]),
    kw("otros_pag_lab", &["prima de servicio", "prima servicio"]),
    kw("incapacidades", &["incapacidad", "incapacidades"]),
    kw(
        "aporte_salud",
        &["aporte salud", "aporte eps", "aportes eps", "aporte a salud"],
    ),
    kw(
        "aporte_pension",
        &["aporte pension", "aportes pension", "aporte a pension"],
    ),
    kw("otros_pag_lab", &["dotacion", "bonificacion", "auxilio"]),
    kw("honor_383", &["honorario", "honorarios"]),
    kw(
        PAYROLL_CONTRIBUTIONS,
        &["parafiscal", "parafiscales", "icbf", "sena", "compensar", "comfama", "cafam"],
    ),
];

const PAYROLL: AccountRange = AccountRange::single("5105");
const EXPENSES: AccountRange = AccountRange::new("51", "53");
const INVENTORY: AccountRange = AccountRange::single("14");

fn table_1001() -> RuleTable {
    let ranges = [
        range("5005", "5120", "5120"),
        range("5005", "5220", "5220"),
        range("5011", "5230", "5230"),
        range("5011", "5130", "5130"),
        range("5055", "5115", "5115"),
        range("5004", "5110", "5110"),
        range("5016", "5125", "5125"),
        range("5016", "5135", "5139"),
        range("5016", "5140", "5199"),
        range("5016", "5210", "5219"),
        range("5016", "5235", "5249"),
        range("5016", "5295", "5299"),
        range("5006", "5305", "5305"),
        range("5101", "530515", "530515"),
    ];
    let mut rules = vec![
        RuleEntry::scoped(PAYROLL, Rule::Keywords(KEYWORDS_1001)),
        RuleEntry::scoped(
            PAYROLL,
            Rule::SubAccount {
                prefix: "5105",
                map: PAYROLL_SUBACCOUNTS_1001,
                deductible: true,
            },
        ),
        RuleEntry::scoped(PAYROLL, range("5001", "5105", "5105")),
        RuleEntry::scoped(EXPENSES, Rule::Keywords(KEYWORDS_1001)),
    ];
    rules.extend(ranges.into_iter().map(|r| RuleEntry::scoped(EXPENSES, r)));
    rules.push(RuleEntry::scoped(EXPENSES, range(OTHER_EXPENSES, "51", "53")));
    rules.push(RuleEntry::scoped(INVENTORY, range("5007", "1435", "1499")));
    rules.push(RuleEntry::scoped(INVENTORY, Rule::Keywords(KEYWORDS_1001)));
    RuleTable::new("1001", rules)
}

fn table_1003() -> RuleTable {
    const WITHHOLDING: AccountRange = AccountRange::single("1355");
    let rules = vec![
        RuleEntry::any(Rule::Exclude(AccountRange::single("135518"))),
        RuleEntry::any(Rule::Exclude(AccountRange::single("135595"))),
        RuleEntry::any(Rule::Exclude(AccountRange::single("135599"))),
        RuleEntry::any(range("1301", "13551505", "13551514")),
        RuleEntry::any(range("1302", "13551515", "13551519")),
        RuleEntry::any(range("1303", "13551520", "13551524")),
        RuleEntry::any(range("1305", "13551525", "13551529")),
        RuleEntry::any(range("1304", "13551530", "13551534")),
        RuleEntry::any(range("1306", "13551535", "13551539")),
        RuleEntry::any(range("1308", "13551540", "13551599")),
        RuleEntry::scoped(WITHHOLDING, Rule::Keywords(KEYWORDS_1003)),
        RuleEntry::scoped(WITHHOLDING, range("1308", "1355", "1355")),
    ];
    RuleTable::new("1003", rules)
}

fn table_1007() -> RuleTable {
    let rules = vec![
        RuleEntry::any(range("4003", "4210", "4210")),
        RuleEntry::any(range("4001", "4101", "4199")),
        RuleEntry::any(range("4002", "4201", "4299")),
        RuleEntry::scoped(AccountRange::single("4"), Rule::Keywords(KEYWORDS_1007)),
    ];
    RuleTable::new("1007", rules)
}

fn table_1008() -> RuleTable {
    let rules = vec![
        RuleEntry::any(range("1315", "1305", "1305")),
        RuleEntry::any(range("1316", "1380", "1399")),
        RuleEntry::any(range("1317", "1330", "1340")),
        RuleEntry::any(range("1317", "1365", "1365")),
    ];
    RuleTable::new("1008", rules)
}

/// Tax-authority liability prefixes, reported as one consolidated record in 1009.
pub const TAX_AUTHORITY_PREFIXES: &[&str] = &["2365", "2367", "2368", "2370", "2404", "2408", "2412"];

fn table_1009() -> RuleTable {
    let mut rules: Vec<RuleEntry> = TAX_AUTHORITY_PREFIXES
        .iter()
        .map(|prefix| RuleEntry::any(Rule::Exclude(AccountRange::single(*prefix))))
        .collect();
    rules.extend(
        [
            range("2202", "2105", "2199"),
            range("2201", "2205", "2295"),
            range("2204", "2305", "2334"),
            range("2210", "2335", "2364"),
            range("2206", "2365", "2369"),
            range("2207", "2380", "2399"),
            range("2208", "2404", "2499"),
            range("2209", "2505", "2599"),
            range("2210", "2605", "2699"),
            range("2210", "2705", "2799"),
            range("2210", "2805", "2899"),
            range("2210", "2905", "2999"),
            range("2210", "2", "2"),
        ]
        .into_iter()
        .map(RuleEntry::any),
    );
    RuleTable::new("1009", rules)
}

fn table_1012() -> RuleTable {
    let rules = vec![
        RuleEntry::any(range("8302", "1105", "1105")),
        RuleEntry::any(range("8301", "1110", "1110")),
        RuleEntry::any(range("8305", "1201", "1204")),
        RuleEntry::any(range("8303", "1205", "1205")),
        RuleEntry::any(range("8304", "1210", "1210")),
        RuleEntry::any(range("8306", "1225", "1225")),
        RuleEntry::any(range("8309", "1265", "1265")),
    ];
    RuleTable::new("1012", rules)
}

fn table_2276() -> RuleTable {
    let rules = vec![
        RuleEntry::scoped(
            PAYROLL,
            Rule::SubAccount {
                prefix: "5105",
                map: PAYROLL_SUBACCOUNTS_2276,
                deductible: true,
            },
        ),
        RuleEntry::scoped(PAYROLL, Rule::Keywords(KEYWORDS_2276)),
        RuleEntry::scoped(PAYROLL, range("otros_pag_lab", "5105", "5105")),
    ];
    RuleTable::new("2276", rules)
}

/// Rule table for each format. Formats 1005 and 1006 select rows by tax
/// account and have no concept, so their table is a single range.
pub fn rule_table(format: Format) -> RuleTable {
    match format {
        Format::F1001 => table_1001(),
        Format::F1003 => table_1003(),
        Format::F1005 | Format::F1006 => RuleTable::new(
            format.code(),
            vec![RuleEntry::any(range("", "2408", "2408"))],
        ),
        Format::F1007 => table_1007(),
        Format::F1008 => table_1008(),
        Format::F1009 => table_1009(),
        Format::F1012 => table_1012(),
        Format::F2276 => table_2276(),
    }
}

/// How a 1001 payment splits between the deductible and non-deductible columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deductibility {
    Deductible,
    NonDeductible,
    /// Bank transaction tax: half of it is deductible.
    Split,
}

const NON_DEDUCTIBLE_ACCOUNTS: &[&str] = &["53050504", "53950520", "539520", "539525"];

const NON_DEDUCTIBLE_LABELS: &[&str] = &[
    "interes moratorio",
    "interes de mora",
    "intereses mora",
    "no deducible",
    "no deduci",
    "multa",
    "sancion",
    "litigio",
    "donacion",
];

/// Deductibility of a 1001 payment from its account and label, falling back
/// to the flag of the rule that classified it.
pub fn deductibility(account: &str, label: &str, rule_deductible: bool) -> Deductibility {
    let label = PreparedLabel::new(label);
    if ["gmf", "4x1000", "4 x 1000", "gravamen movimiento"]
        .iter()
        .any(|k| label.contains(k))
    {
        return Deductibility::Split;
    }
    if NON_DEDUCTIBLE_LABELS.iter().any(|k| label.contains(k))
        || NON_DEDUCTIBLE_ACCOUNTS.iter().any(|p| account.starts_with(p))
    {
        return Deductibility::NonDeductible;
    }
    if rule_deductible {
        Deductibility::Deductible
    } else {
        Deductibility::NonDeductible
    }
}

/// Classifies ledger rows for one format with its checked rule table.
#[derive(Debug, Clone)]
pub struct AccountClassifier {
    table: RuleTable,
}

impl AccountClassifier {
    pub fn for_format(format: Format) -> Result<Self, super::rules::ConfigurationError> {
        Self::with_table(rule_table(format))
    }

    pub fn with_table(table: RuleTable) -> Result<Self, super::rules::ConfigurationError> {
        table.check()?;
        Ok(AccountClassifier { table })
    }

    pub fn classify(&self, account: &str, label: &str) -> Option<Classification> {
        self.table.classify(account, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(format: Format, account: &str, label: &str) -> Option<&'static str> {
        AccountClassifier::for_format(format)
            .unwrap()
            .classify(account, label)
            .map(|c| c.concept)
    }

    #[test]
    fn every_builtin_table_is_well_formed() {
        for format in Format::ALL {
            assert!(rule_table(format).check().is_ok(), "table {format}");
        }
    }

    #[test]
    fn payroll_salary_is_concept_5001() {
        assert_eq!(classify(Format::F1001, "510506", "Salario basico"), Some("5001"));
        assert!(PAYROLL_CONCEPTS.contains(&"5001"));
    }

    #[test]
    fn payroll_sub_account_without_label() {
        assert_eq!(classify(Format::F1001, "510502", ""), Some("5024"));
        assert_eq!(classify(Format::F1001, "510505", ""), Some("5002"));
        assert_eq!(classify(Format::F1001, "510599", ""), Some("5001"));
    }

    #[test]
    fn expenses_prefer_labels_over_ranges() {
        // 5120 is rent by range, but the label names insurance
        assert_eq!(classify(Format::F1001, "512010", "Arrendamientos"), Some("5005"));
        assert_eq!(classify(Format::F1001, "512010", "Poliza todo riesgo"), Some("5011"));
        assert_eq!(classify(Format::F1001, "512010", ""), Some("5005"));
        assert_eq!(classify(Format::F1001, "519530", "Papeleria"), Some("5016"));
        assert_eq!(classify(Format::F1001, "523599", "Cosas raras"), Some("5016"));
        assert_eq!(classify(Format::F1001, "530505", "Gastos bancarios"), Some("5006"));
    }

    #[test]
    fn inventory_prefers_ranges_over_labels() {
        assert_eq!(classify(Format::F1001, "143505", "Honorarios"), Some("5007"));
        assert_eq!(classify(Format::F1001, "140505", "Compra de repuestos"), Some("5007"));
        assert_eq!(classify(Format::F1001, "140505", ""), None);
    }

    #[test]
    fn out_of_scope_accounts() {
        assert_eq!(classify(Format::F1001, "110505", "Caja general"), None);
        assert_eq!(classify(Format::F1001, "413505", "Venta de mercancia"), None);
        assert_eq!(classify(Format::F1001, "152405", "Equipo de oficina"), None);
        assert_eq!(classify(Format::F1001, "160505", "Licencias de software"), None);
    }

    #[test]
    fn withholding_receivable_concepts() {
        assert_eq!(classify(Format::F1003, "13551505", ""), Some("1301"));
        assert_eq!(classify(Format::F1003, "13551520", ""), Some("1303"));
        assert_eq!(classify(Format::F1003, "135510", "Retencion arrendamientos"), Some("1304"));
        assert_eq!(classify(Format::F1003, "135510", ""), Some("1308"));
        assert_eq!(classify(Format::F1003, "13551801", "Reteica"), None);
        assert_eq!(classify(Format::F1003, "135599", ""), None);
    }

    #[test]
    fn income_keywords_only_apply_to_class_four() {
        assert_eq!(classify(Format::F1007, "421005", ""), Some("4003"));
        assert_eq!(classify(Format::F1007, "413505", ""), Some("4001"));
        assert_eq!(classify(Format::F1007, "425050", ""), Some("4002"));
        assert_eq!(classify(Format::F1007, "470505", "Venta de activos"), Some("4001"));
        assert_eq!(classify(Format::F1007, "513505", "Servicio de aseo"), None);
    }

    #[test]
    fn payables_exclude_tax_accounts_and_default() {
        assert_eq!(classify(Format::F1009, "220505", ""), Some("2201"));
        assert_eq!(classify(Format::F1009, "236540", ""), None);
        assert_eq!(classify(Format::F1009, "240801", ""), None);
        assert_eq!(classify(Format::F1009, "236905", ""), Some("2206"));
        assert_eq!(classify(Format::F1009, "210505", ""), Some("2202"));
        assert_eq!(classify(Format::F1009, "310505", ""), None);
    }

    #[test]
    fn employee_income_columns() {
        assert_eq!(classify(Format::F2276, "510506", ""), Some("salarios"));
        assert_eq!(classify(Format::F2276, "510530", ""), Some("cesantias_int"));
        assert_eq!(classify(Format::F2276, "510568", ""), Some(PAYROLL_CONTRIBUTIONS));
        assert_eq!(classify(Format::F2276, "510560", "Vacaciones"), Some("vacaciones"));
        assert_eq!(classify(Format::F2276, "510595", "Varios"), Some("otros_pag_lab"));
        assert_eq!(classify(Format::F2276, "513505", "Salario"), None);
    }

    #[test]
    fn deductibility_rules() {
        assert_eq!(deductibility("530505", "GMF 4x1000", true), Deductibility::Split);
        assert_eq!(
            deductibility("530520", "Intereses mora proveedores", true),
            Deductibility::NonDeductible
        );
        assert_eq!(deductibility("539520", "Gastos", true), Deductibility::NonDeductible);
        assert_eq!(deductibility("539505", "Multas y sanciones", true), Deductibility::NonDeductible);
        assert_eq!(deductibility("513505", "Aseo", true), Deductibility::Deductible);
        assert_eq!(deductibility("513505", "Aseo", false), Deductibility::NonDeductible);
    }
}
