//! Proportional distribution of an entity's withholding over its concept buckets.

use rust_decimal::Decimal;

use super::aggregate::ConceptBucket;

/// Total withheld from one entity, for one value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithholdingTotal {
    pub column: usize,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// Withholding was written into the buckets.
    Allocated,
    /// The entity has no withholding to distribute.
    Nothing,
    /// The entity has withholding but no payments to carry it; it is dropped.
    ZeroPayment { dropped: Decimal },
}

/// Distribute each total over `buckets` (all belonging to one entity) in
/// proportion to each bucket's payment, truncating every share to whole
/// currency units. The shares may add up to less than the total, by at most
/// the number of buckets minus one.
pub fn allocate(
    totals: &[WithholdingTotal],
    buckets: &mut [&mut ConceptBucket],
    payment_columns: &[usize],
) -> Allocation {
    let withheld: Decimal = totals.iter().map(|t| t.amount.trunc()).sum();
    if withheld.is_zero() {
        return Allocation::Nothing;
    }
    let total_payment: Decimal = buckets.iter().map(|b| b.sum(payment_columns)).sum();
    if total_payment <= Decimal::ZERO {
        return Allocation::ZeroPayment { dropped: withheld };
    }
    for total in totals {
        let amount = total.amount.trunc();
        if amount.is_zero() {
            continue;
        }
        for bucket in buckets.iter_mut() {
            let payment = bucket.sum(payment_columns);
            let share = (amount * payment / total_payment).trunc();
            if bucket.amounts.len() <= total.column {
                bucket.amounts.resize(total.column + 1, Decimal::ZERO);
            }
            bucket.amounts[total.column] += share;
        }
    }
    Allocation::Allocated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::BucketKey;
    use crate::core::format::Format;
    use rust_decimal_macros::dec;

    fn bucket(concept: &str, payment: Decimal) -> ConceptBucket {
        let mut amounts = vec![Decimal::ZERO; 8];
        amounts[0] = payment;
        ConceptBucket {
            key: BucketKey::new(Format::F1001, concept, "900123456"),
            amounts,
        }
    }

    fn allocated(buckets: &[ConceptBucket], column: usize) -> Decimal {
        buckets.iter().map(|b| b.amounts[column]).sum()
    }

    #[test]
    fn proportional_shares() {
        let mut buckets = vec![bucket("5002", dec!(750000)), bucket("5016", dec!(250000))];
        let totals = [
            WithholdingTotal { column: 4, amount: dec!(100000) },
            WithholdingTotal { column: 6, amount: dec!(20000) },
        ];
        let mut refs: Vec<&mut ConceptBucket> = buckets.iter_mut().collect();
        assert_eq!(allocate(&totals, &mut refs, &[0, 1]), Allocation::Allocated);
        assert_eq!(buckets[0].amounts[4], dec!(75000));
        assert_eq!(buckets[1].amounts[4], dec!(25000));
        assert_eq!(buckets[0].amounts[6], dec!(15000));
        assert_eq!(buckets[1].amounts[6], dec!(5000));
    }

    #[test]
    fn truncation_stays_within_bound() {
        let mut buckets = vec![
            bucket("5002", dec!(1)),
            bucket("5004", dec!(1)),
            bucket("5016", dec!(1)),
        ];
        let totals = [WithholdingTotal { column: 4, amount: dec!(100) }];
        let mut refs: Vec<&mut ConceptBucket> = buckets.iter_mut().collect();
        allocate(&totals, &mut refs, &[0, 1]);
        let sum = allocated(&buckets, 4);
        assert_eq!(sum, dec!(99));
        assert!(sum >= dec!(100) - dec!(2) && sum <= dec!(100));
    }

    #[test]
    fn zero_payment_drops_withholding() {
        let mut buckets = vec![bucket("5016", dec!(0))];
        let totals = [WithholdingTotal { column: 4, amount: dec!(5000) }];
        let mut refs: Vec<&mut ConceptBucket> = buckets.iter_mut().collect();
        assert_eq!(
            allocate(&totals, &mut refs, &[0, 1]),
            Allocation::ZeroPayment { dropped: dec!(5000) }
        );
        assert_eq!(buckets[0].amounts[4], dec!(0));
    }

    #[test]
    fn nothing_to_allocate() {
        let mut buckets = vec![bucket("5016", dec!(10))];
        let mut refs: Vec<&mut ConceptBucket> = buckets.iter_mut().collect();
        assert_eq!(allocate(&[], &mut refs, &[0, 1]), Allocation::Nothing);
    }
}
