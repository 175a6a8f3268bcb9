//! Per-format scans of the ledger into concept buckets.
//!
//! Each format selects its rows, picks the amount it reports and the
//! counterparty it reports it under, then hands the buckets back for
//! minor-amounts consolidation. Withholding is allocated here because its
//! sources differ per format.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use super::aggregate::{Accumulator, BucketKey, ConceptBucket};
use super::classifier::{
    deductibility, AccountClassifier, Deductibility, LEGAL_ENTITY_CONCEPTS, OTHER_EXPENSES,
    PAYROLL_CONCEPTS, PAYROLL_CONTRIBUTIONS,
};
use super::config::RunConfig;
use super::entity::{
    Address, Entity, EntityCategory, EntityName, EntityResolver, IdType, DOMESTIC_COUNTRY,
    MINOR_AMOUNTS_ID,
};
use super::format::{Format, F2276};
use super::institutions::{
    detect_bank, Bank, PUBLIC_WITHHOLDING_AGENTS, TAX_AUTHORITY_ID, TAX_AUTHORITY_LOCALITY,
    TAX_AUTHORITY_NAME, TAX_AUTHORITY_REGION, TAX_AUTHORITY_STREET,
};
use super::issues::StructuralIssue;
use super::ledger::LedgerRow;
use super::rules::in_range;
use super::text::PreparedLabel;
use super::withholding::{allocate, Allocation, WithholdingTotal};

/// Summary accounts (one per account, no counterparty) whose credit balance
/// is owed to the tax authority.
const TAX_AUTHORITY_SUMMARY_ACCOUNTS: &[&str] = &["2365", "2367", "2370", "2404", "2408", "2412"];
/// Tax-authority liability prefixes left out of the per-counterparty payables.
const TAX_AUTHORITY_PAYABLES: &[&str] = &["2365", "2367", "2368", "2370", "2404", "2408", "2412"];
/// Concept under which the consolidated tax-authority payable is reported.
const TAX_AUTHORITY_PAYABLE_CONCEPT: &str = "2206";
/// Shortest account code treated as an auxiliary (counterparty-level) account.
const AUXILIARY_DIGITS: usize = 6;

/// Resolved entities of every counterparty in a ledger, plus the fixed
/// counterparties some formats inject.
#[derive(Debug, Clone, Default)]
pub struct Counterparties {
    entities: BTreeMap<String, Entity>,
}

impl Counterparties {
    /// Resolve each distinct ledger id once, using the first non-empty name
    /// the ledger gives it.
    pub fn resolve(rows: &[LedgerRow], resolver: &EntityResolver) -> Self {
        let mut names: BTreeMap<&str, &str> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.has_counterparty()) {
            let name = names.entry(row.counterparty_id.as_str()).or_default();
            if name.is_empty() {
                *name = row.counterparty_name.trim();
            }
        }
        let entities = names
            .into_iter()
            .map(|(id, name)| (id.to_string(), resolver.resolve(id, name, None)))
            .collect::<BTreeMap<_, _>>();
        log::info!("resolved {} counterparties", entities.len());
        Counterparties { entities }
    }

    /// Entity to report for `id`. Unknown ids resolve from their shape alone.
    pub fn entity(&self, id: &str) -> Entity {
        if id == MINOR_AMOUNTS_ID {
            return Entity::minor_amounts();
        }
        self.entities
            .get(id)
            .cloned()
            .unwrap_or_else(|| EntityResolver::default().resolve(id, "", None))
    }

    /// Add a fixed counterparty unless the ledger or a directory already knows it.
    pub fn insert_fixed(&mut self, entity: Entity) {
        self.entities.entry(entity.id.clone()).or_insert(entity);
    }

    pub fn is_natural_person(&self, id: &str) -> bool {
        self.entities
            .get(id)
            .is_some_and(Entity::is_natural_person)
    }
}

pub fn tax_authority() -> Entity {
    Entity {
        id: TAX_AUTHORITY_ID.to_string(),
        category: EntityCategory::LegalEntity,
        id_type: IdType::Nit,
        supplied_check_digit: None,
        name: EntityName::Legal(TAX_AUTHORITY_NAME.to_string()),
        address: Address {
            street: TAX_AUTHORITY_STREET.to_string(),
            region: TAX_AUTHORITY_REGION.to_string(),
            locality: TAX_AUTHORITY_LOCALITY.to_string(),
            country: DOMESTIC_COUNTRY.to_string(),
        },
    }
}

fn bank_entity(bank: &Bank) -> Entity {
    Entity {
        id: bank.id.to_string(),
        category: EntityCategory::LegalEntity,
        id_type: IdType::Nit,
        supplied_check_digit: None,
        name: EntityName::Legal(bank.name.to_string()),
        address: Address {
            country: DOMESTIC_COUNTRY.to_string(),
            ..Default::default()
        },
    }
}

/// Which side of the balance sheet a tax account sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxSide {
    Asset,
    Liability,
}

/// Amount of tax carried by a row. With closed tax accounts it is the
/// closing balance; otherwise the net movement toward the account's side.
pub fn tax_value(row: &LedgerRow, side: TaxSide, closes_taxes: bool) -> Decimal {
    if closes_taxes {
        return row.balance.abs();
    }
    let movement = match side {
        TaxSide::Asset => row.debit - row.credit,
        TaxSide::Liability => row.credit - row.debit,
    };
    movement.max(Decimal::ZERO)
}

/// Buckets of one format, ready for minor-amounts consolidation.
#[derive(Debug, Default)]
pub struct Collection {
    pub buckets: Vec<ConceptBucket>,
    pub issues: Vec<StructuralIssue>,
    /// Ids that always keep their own record.
    pub exempt: Vec<String>,
}

pub struct Collector<'a> {
    format: Format,
    rows: &'a [LedgerRow],
    classifier: &'a AccountClassifier,
    config: &'a RunConfig,
    counterparties: &'a mut Counterparties,
    accumulator: &'a mut Accumulator,
    issues: Vec<StructuralIssue>,
    exempt: Vec<String>,
}

impl<'a> Collector<'a> {
    pub fn new(
        format: Format,
        rows: &'a [LedgerRow],
        classifier: &'a AccountClassifier,
        config: &'a RunConfig,
        counterparties: &'a mut Counterparties,
        accumulator: &'a mut Accumulator,
    ) -> Self {
        Collector {
            format,
            rows,
            classifier,
            config,
            counterparties,
            accumulator,
            issues: Vec::new(),
            exempt: Vec::new(),
        }
    }

    pub fn collect(mut self) -> Collection {
        let buckets = match self.format {
            Format::F1001 => self.payments(),
            Format::F1003 => self.withholdings_suffered(),
            Format::F1005 => self.vat(TaxSide::Asset),
            Format::F1006 => self.vat(TaxSide::Liability),
            Format::F1007 | Format::F1008 => self.balances(),
            Format::F1009 => self.payables(),
            Format::F1012 => self.investments(),
            Format::F2276 => self.employee_income(),
        };
        log::debug!(
            "F{}: {} buckets, {} issues",
            self.format,
            buckets.len(),
            self.issues.len()
        );
        Collection {
            buckets,
            issues: self.issues,
            exempt: self.exempt,
        }
    }

    fn add(&mut self, concept: &str, id: &str, column: usize, amount: Decimal) {
        self.accumulator
            .accumulate(BucketKey::new(self.format, concept, id), column, amount);
    }

    fn issue(&mut self, issue: StructuralIssue) {
        if !self.issues.contains(&issue) {
            log::warn!("F{}: {}", self.format, issue);
            self.issues.push(issue);
        }
    }

    /// Record a skipped auxiliary row without a counterparty. Summary rows
    /// never carry one and are ignored silently.
    fn missing_counterparty(&mut self, row: &LedgerRow) {
        if row.account.len() >= AUXILIARY_DIGITS {
            self.issue(StructuralIssue::MissingCounterparty {
                line: row.line,
                account: row.account.clone(),
            });
        }
    }

    fn payments(&mut self) -> Vec<ConceptBucket> {
        let closes = self.config.closes_taxes;
        let mut income_tax: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut vat: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| r.has_counterparty()) {
            let target = if in_range(&row.account, "236505", "236530") {
                &mut income_tax
            } else if row.account.starts_with("2367") {
                &mut vat
            } else {
                continue;
            };
            *target.entry(row.counterparty_id.clone()).or_default() +=
                tax_value(row, TaxSide::Liability, closes);
        }

        let mut payroll_ids = BTreeSet::new();
        for row in self.rows {
            let value = row.balance.abs();
            if value.is_zero() {
                continue;
            }
            let Some(class) = self.classifier.classify(&row.account, &row.label) else {
                if row.account.starts_with("14") && row.has_counterparty() {
                    self.issue(StructuralIssue::Unclassified {
                        line: row.line,
                        account: row.account.clone(),
                    });
                }
                continue;
            };
            if !row.has_counterparty() {
                self.missing_counterparty(row);
                continue;
            }
            let id = row.counterparty_id.as_str();
            if PAYROLL_CONCEPTS.contains(&class.concept) {
                log::debug!("line {}: payroll concept {} goes to F2276", row.line, class.concept);
                payroll_ids.insert(id.to_string());
                continue;
            }
            let mut concept = class.concept;
            if LEGAL_ENTITY_CONCEPTS.contains(&concept) && self.counterparties.is_natural_person(id) {
                self.issue(StructuralIssue::ReclassifiedToOther {
                    id: id.to_string(),
                    concept: concept.to_string(),
                });
                concept = OTHER_EXPENSES;
            }
            match deductibility(&row.account, &row.label, class.deductible) {
                Deductibility::Split => {
                    let half = value / Decimal::TWO;
                    self.add(concept, id, 0, half);
                    self.add(concept, id, 1, value - half);
                }
                Deductibility::NonDeductible => self.add(concept, id, 1, value),
                Deductibility::Deductible => self.add(concept, id, 0, value),
            }
        }

        let mut buckets = self.accumulator.take(self.format);
        // Employees' withholding is reported with their payroll income.
        income_tax.retain(|id, _| !payroll_ids.contains(id) || buckets.iter().any(|b| &b.key.entity_id == id));
        self.allocate_withholding(&mut buckets, &[(4, &income_tax), (6, &vat)], &[0, 1], true);
        buckets
    }

    fn withholdings_suffered(&mut self) -> Vec<ConceptBucket> {
        let mut income: BTreeMap<&str, Decimal> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| r.has_counterparty() && r.class() == "4") {
            *income.entry(row.counterparty_id.as_str()).or_default() += row.balance.abs();
        }

        for row in self.rows {
            if !row.account.starts_with("1355") || row.account.len() < AUXILIARY_DIGITS {
                continue;
            }
            let Some(class) = self.classifier.classify(&row.account, &row.label) else {
                continue;
            };
            if !row.has_counterparty() {
                self.missing_counterparty(row);
                continue;
            }
            let id = row.counterparty_id.as_str();
            if PUBLIC_WITHHOLDING_AGENTS.contains(&id) {
                continue;
            }
            let balance = row.balance.abs();
            let value = if balance > Decimal::ZERO {
                balance
            } else if row.debit > Decimal::ZERO {
                row.debit
            } else {
                continue;
            };
            self.add(class.concept, id, 1, value);
        }

        let mut buckets = self.accumulator.take(self.format);
        for bucket in buckets.iter_mut() {
            bucket.amounts[0] = income
                .get(bucket.key.entity_id.as_str())
                .copied()
                .unwrap_or_default();
        }
        buckets
    }

    fn vat(&mut self, side: TaxSide) -> Vec<ConceptBucket> {
        let closes = self.config.closes_taxes;
        for row in self.rows {
            if self.classifier.classify(&row.account, &row.label).is_none() {
                continue;
            }
            let prefix = row.account.get(..6).unwrap_or(&row.account);
            let deductible = PreparedLabel::new(&row.label).contains("descontable") || prefix >= "240810";
            if deductible != (side == TaxSide::Asset) {
                continue;
            }
            let value = tax_value(row, side, closes);
            if value.is_zero() {
                continue;
            }
            if !row.has_counterparty() {
                self.missing_counterparty(row);
                continue;
            }
            self.add("", &row.counterparty_id, 0, value);
        }
        self.accumulator.take(self.format)
    }

    /// Income and receivables: the absolute closing balance per concept.
    fn balances(&mut self) -> Vec<ConceptBucket> {
        for row in self.rows {
            let value = row.balance.abs();
            if value.is_zero() {
                continue;
            }
            let Some(class) = self.classifier.classify(&row.account, &row.label) else {
                continue;
            };
            if !row.has_counterparty() {
                self.missing_counterparty(row);
                continue;
            }
            self.add(class.concept, &row.counterparty_id, 0, value);
        }
        self.accumulator.take(self.format)
    }

    fn payables(&mut self) -> Vec<ConceptBucket> {
        let owed_to_authority: Decimal = self
            .rows
            .iter()
            .filter(|r| {
                !r.has_counterparty()
                    && TAX_AUTHORITY_SUMMARY_ACCOUNTS.contains(&r.account.as_str())
                    && r.balance < Decimal::ZERO
            })
            .map(|r| -r.balance)
            .sum();

        let mut net: BTreeMap<(&'static str, &str), Decimal> = BTreeMap::new();
        for row in self.rows {
            if row.class() != "2" || row.balance.is_zero() {
                continue;
            }
            if TAX_AUTHORITY_PAYABLES.iter().any(|p| row.account.starts_with(p)) {
                continue;
            }
            let Some(class) = self.classifier.classify(&row.account, &row.label) else {
                continue;
            };
            if !row.has_counterparty() {
                self.missing_counterparty(row);
                continue;
            }
            *net.entry((class.concept, row.counterparty_id.as_str())).or_default() += row.balance;
        }
        for ((concept, id), amount) in net {
            if amount < Decimal::ZERO {
                self.add(concept, id, 0, -amount);
            }
        }

        if owed_to_authority > Decimal::ZERO {
            self.counterparties.insert_fixed(tax_authority());
            self.add(TAX_AUTHORITY_PAYABLE_CONCEPT, TAX_AUTHORITY_ID, 0, owed_to_authority);
            self.exempt.push(TAX_AUTHORITY_ID.to_string());
        }
        self.accumulator.take(self.format)
    }

    fn investments(&mut self) -> Vec<ConceptBucket> {
        for row in self.rows {
            let value = row.balance.abs();
            if value.is_zero() {
                continue;
            }
            let Some(class) = self.classifier.classify(&row.account, &row.label) else {
                continue;
            };
            let id = if row.has_counterparty() {
                row.counterparty_id.clone()
            } else if row.account.starts_with("1110") {
                match detect_bank(&row.label) {
                    Some(bank) => {
                        self.counterparties.insert_fixed(bank_entity(bank));
                        bank.id.to_string()
                    }
                    None => MINOR_AMOUNTS_ID.to_string(),
                }
            } else if row.account.starts_with("1105") {
                MINOR_AMOUNTS_ID.to_string()
            } else {
                self.missing_counterparty(row);
                continue;
            };
            self.add(class.concept, &id, 0, value);
            self.add(class.concept, &id, 1, value);
        }
        self.accumulator.take(self.format)
    }

    fn employee_income(&mut self) -> Vec<ConceptBucket> {
        let other = F2276.column_index("otros_pag_lab").unwrap_or(9);
        for row in self.rows {
            let value = row.balance.abs();
            if value.is_zero() {
                continue;
            }
            let Some(class) = self.classifier.classify(&row.account, &row.label) else {
                continue;
            };
            if !row.has_counterparty() {
                self.missing_counterparty(row);
                continue;
            }
            if class.concept == PAYROLL_CONTRIBUTIONS {
                continue;
            }
            let id = row.counterparty_id.as_str();
            let column = match F2276.column_index(class.concept) {
                Some(_) if class.concept == "honor_383" && !self.counterparties.is_natural_person(id) => {
                    log::debug!("{}: fees to a non-natural person reported as other payments", id);
                    other
                }
                Some(column) => column,
                None => {
                    self.issue(StructuralIssue::Unclassified {
                        line: row.line,
                        account: row.account.clone(),
                    });
                    other
                }
            };
            self.add("", id, column, value);
        }

        let gross = F2276.column_index("total_bruto").unwrap_or(10);
        let paid = F2276.column_index("total_pagos").unwrap_or(18);
        let mut buckets = self.accumulator.take(self.format);
        for bucket in buckets.iter_mut() {
            let total: Decimal = bucket.amounts[..gross].iter().copied().sum();
            bucket.amounts[gross] = total;
            bucket.amounts[paid] = total;
        }

        let closes = self.config.closes_taxes;
        let mut withheld: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| r.has_counterparty() && r.account.starts_with("2365")) {
            if buckets.iter().any(|b| b.key.entity_id == row.counterparty_id) {
                *withheld.entry(row.counterparty_id.clone()).or_default() +=
                    tax_value(row, TaxSide::Liability, closes);
            }
        }
        let retfte = F2276.column_index("retfte").unwrap_or(17);
        self.allocate_withholding(&mut buckets, &[(retfte, &withheld)], &[gross], false);
        buckets
    }

    /// Spread per-entity withholding over that entity's buckets. With
    /// `report_orphans`, withholding of an entity without payments is
    /// reported as a structural issue before it is dropped.
    fn allocate_withholding(
        &mut self,
        buckets: &mut [ConceptBucket],
        sources: &[(usize, &BTreeMap<String, Decimal>)],
        payment_columns: &[usize],
        report_orphans: bool,
    ) {
        let ids: BTreeSet<&String> = sources.iter().flat_map(|(_, totals)| totals.keys()).collect();
        for id in ids {
            let totals: Vec<WithholdingTotal> = sources
                .iter()
                .filter_map(|(column, totals)| {
                    totals.get(id).map(|amount| WithholdingTotal {
                        column: *column,
                        amount: *amount,
                    })
                })
                .collect();
            let mut own: Vec<&mut ConceptBucket> = buckets
                .iter_mut()
                .filter(|b| &b.key.entity_id == id)
                .collect();
            if let Allocation::ZeroPayment { dropped } = allocate(&totals, &mut own, payment_columns) {
                if report_orphans {
                    self.issue(StructuralIssue::ZeroPaymentWithholding {
                        id: id.clone(),
                        dropped,
                    });
                } else {
                    log::debug!("{}: withholding {} has no payment in F{}", id, dropped, self.format);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::tests::row;
    use rust_decimal_macros::dec;

    fn collect(format: Format, rows: &[LedgerRow]) -> Collection {
        collect_with(format, rows, &RunConfig::default())
    }

    fn collect_with(format: Format, rows: &[LedgerRow], config: &RunConfig) -> Collection {
        let classifier = AccountClassifier::for_format(format).unwrap();
        let mut counterparties = Counterparties::resolve(rows, &EntityResolver::default());
        let mut accumulator = Accumulator::new();
        let collection = Collector::new(
            format,
            rows,
            &classifier,
            config,
            &mut counterparties,
            &mut accumulator,
        )
        .collect();
        assert!(accumulator.take(format).is_empty());
        collection
    }

    fn amounts<'a>(collection: &'a Collection, concept: &str, id: &str) -> &'a [Decimal] {
        &collection
            .buckets
            .iter()
            .find(|b| b.key.concept == concept && b.key.entity_id == id)
            .unwrap_or_else(|| panic!("no bucket {concept}/{id}"))
            .amounts
    }

    #[test]
    fn payroll_goes_to_employee_income_with_withholding() {
        let rows = vec![
            row("510506", "Salario basico", "13551234", dec!(5000000)),
            row("236505", "Retencion salarios", "13551234", dec!(-350000)),
        ];
        let payments = collect(Format::F1001, &rows);
        assert!(payments.buckets.is_empty());
        assert!(payments.issues.is_empty());

        let income = collect(Format::F2276, &rows);
        let amounts = amounts(&income, "", "13551234");
        assert_eq!(amounts[0], dec!(5000000));
        assert_eq!(amounts[10], dec!(5000000));
        assert_eq!(amounts[17], dec!(350000));
        assert_eq!(amounts[18], dec!(5000000));
    }

    #[test]
    fn payments_with_withholding_and_deductibility() {
        let rows = vec![
            row("511025", "Honorarios", "900123456", dec!(3000000)),
            row("513505", "Servicio de aseo", "900123456", dec!(1000000)),
            row("236515", "Retencion honorarios", "900123456", dec!(-400000)),
            row("530505", "Gravamen movimiento financiero 4x1000", "890903938", dec!(1001)),
        ];
        let collection = collect(Format::F1001, &rows);
        let fees = amounts(&collection, "5002", "900123456");
        assert_eq!(fees[0], dec!(3000000));
        assert_eq!(fees[4], dec!(300000));
        let services = amounts(&collection, "5016", "900123456");
        assert_eq!(services[4], dec!(100000));
        let gmf = amounts(&collection, "5006", "890903938");
        assert_eq!(gmf[0] + gmf[1], dec!(1001));
        assert_eq!(gmf[0], dec!(500.5));
    }

    #[test]
    fn legal_entity_concepts_for_people_become_other_expenses() {
        let rows = vec![row("513005", "Seguros", "13551234", dec!(800000))];
        let collection = collect(Format::F1001, &rows);
        assert!(collection.buckets.iter().all(|b| b.key.concept == OTHER_EXPENSES));
        assert_eq!(
            collection.issues,
            vec![StructuralIssue::ReclassifiedToOther {
                id: "13551234".into(),
                concept: "5011".into()
            }]
        );
    }

    #[test]
    fn orphan_withholding_is_reported() {
        let rows = vec![row("236520", "Retencion servicios", "900123456", dec!(-50000))];
        let collection = collect(Format::F1001, &rows);
        assert!(collection.buckets.is_empty());
        assert_eq!(
            collection.issues,
            vec![StructuralIssue::ZeroPaymentWithholding {
                id: "900123456".into(),
                dropped: dec!(50000)
            }]
        );
    }

    #[test]
    fn auxiliary_rows_without_counterparty() {
        let rows = vec![
            row("5135", "Servicios", "", dec!(1000000)),
            row("513505", "Aseo", "", dec!(1000000)),
        ];
        let collection = collect(Format::F1001, &rows);
        assert!(collection.buckets.is_empty());
        assert_eq!(collection.issues.len(), 1);
    }

    #[test]
    fn withholdings_suffered_take_income_as_base() {
        let mut settled = row("13551540", "Retencion otros", "900555111", dec!(0));
        settled.debit = dec!(12000);
        let rows = vec![
            row("13551530", "Retencion arrendamientos", "900123456", dec!(35000)),
            settled,
            row("135518", "Rete ICA", "900123456", dec!(9000)),
            row("135515", "Retencion", "800197268", dec!(9000)),
            row("413505", "Ventas", "900123456", dec!(-1000000)),
        ];
        let collection = collect(Format::F1003, &rows);
        assert_eq!(collection.buckets.len(), 2);
        assert_eq!(amounts(&collection, "1304", "900123456"), &[dec!(1000000), dec!(35000)]);
        assert_eq!(amounts(&collection, "1308", "900555111"), &[dec!(0), dec!(12000)]);
    }

    #[test]
    fn vat_split_between_deductible_and_generated() {
        let rows = vec![
            row("240805", "IVA generado", "900123456", dec!(-190000)),
            row("240810", "IVA compras", "900555111", dec!(76000)),
            row("240802", "IVA descontable servicios", "900777888", dec!(19000)),
        ];
        let deductible = collect(Format::F1005, &rows);
        let ids: Vec<_> = deductible.buckets.iter().map(|b| b.key.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["900555111", "900777888"]);
        let generated = collect(Format::F1006, &rows);
        assert_eq!(amounts(&generated, "", "900123456")[0], dec!(190000));
    }

    #[test]
    fn open_tax_accounts_use_movement() {
        let mut vat = row("240805", "IVA generado", "900123456", dec!(-50000));
        vat.debit = dec!(140000);
        vat.credit = dec!(190000);
        let config = RunConfig {
            closes_taxes: false,
            ..Default::default()
        };
        let generated = collect_with(Format::F1006, &[vat], &config);
        assert_eq!(amounts(&generated, "", "900123456")[0], dec!(50000));
    }

    #[test]
    fn payables_net_per_counterparty() {
        let rows = vec![
            row("220505", "Proveedores", "900123456", dec!(-3000000)),
            row("220505", "Proveedores", "900123456", dec!(500000)),
            row("233525", "Honorarios por pagar", "900555111", dec!(200000)),
            row("236540", "Retencion compras", "900777888", dec!(-40000)),
            row("2365", "Retencion en la fuente", "", dec!(-700000)),
            row("2408", "IVA por pagar", "", dec!(-300000)),
        ];
        let collection = collect(Format::F1009, &rows);
        assert_eq!(amounts(&collection, "2201", "900123456"), &[dec!(2500000)]);
        assert_eq!(amounts(&collection, "2206", TAX_AUTHORITY_ID), &[dec!(1000000)]);
        assert_eq!(collection.buckets.len(), 2);
        assert_eq!(collection.exempt, vec![TAX_AUTHORITY_ID.to_string()]);
    }

    #[test]
    fn banks_detected_for_investments() {
        let rows = vec![
            row("111005", "Bancolombia cta ahorros", "", dec!(2000000)),
            row("111010", "Cuenta corriente", "", dec!(300000)),
            row("110505", "Caja general", "", dec!(50000)),
            row("120505", "Acciones", "", dec!(10000)),
        ];
        let collection = collect(Format::F1012, &rows);
        assert_eq!(amounts(&collection, "8301", "890903938"), &[dec!(2000000), dec!(2000000)]);
        assert_eq!(amounts(&collection, "8301", MINOR_AMOUNTS_ID)[0], dec!(300000));
        assert_eq!(amounts(&collection, "8302", MINOR_AMOUNTS_ID)[0], dec!(50000));
        assert_eq!(collection.issues.len(), 1);
    }

    #[test]
    fn fees_to_companies_are_other_payroll_payments() {
        let rows = vec![
            row("510505", "Honorarios", "900123456", dec!(700000)),
            row("510505", "Honorarios", "13551234", dec!(400000)),
            row("510572", "Aportes ICBF", "13551234", dec!(90000)),
        ];
        let collection = collect(Format::F2276, &rows);
        assert_eq!(amounts(&collection, "", "900123456")[9], dec!(700000));
        let person = amounts(&collection, "", "13551234");
        assert_eq!(person[2], dec!(400000));
        assert_eq!(person[10], dec!(400000));
    }

    #[test]
    fn tax_value_sides() {
        let mut r = row("236505", "", "1", dec!(-100));
        r.debit = dec!(300);
        r.credit = dec!(400);
        assert_eq!(tax_value(&r, TaxSide::Liability, true), dec!(100));
        assert_eq!(tax_value(&r, TaxSide::Liability, false), dec!(100));
        assert_eq!(tax_value(&r, TaxSide::Asset, false), dec!(0));
    }
}
