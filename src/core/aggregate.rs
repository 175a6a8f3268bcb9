//! Per-run accumulation of classified amounts and minor-amounts consolidation.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::entity::MINOR_AMOUNTS_ID;
use super::format::Format;

/// Ordering of keys (format, concept, id) is the output order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub format: Format,
    pub concept: String,
    pub entity_id: String,
}

impl BucketKey {
    pub fn new(format: Format, concept: impl Into<String>, entity_id: impl Into<String>) -> Self {
        BucketKey {
            format,
            concept: concept.into(),
            entity_id: entity_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptBucket {
    pub key: BucketKey,
    /// One amount per value column of the format.
    pub amounts: Vec<Decimal>,
}

impl ConceptBucket {
    pub fn sum(&self, columns: &[usize]) -> Decimal {
        columns
            .iter()
            .filter_map(|i| self.amounts.get(*i))
            .copied()
            .sum()
    }
}

/// Accumulated amounts of one pipeline run. Owned by that run only.
#[derive(Debug, Default)]
pub struct Accumulator {
    buckets: BTreeMap<BucketKey, Vec<Decimal>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to one column of the bucket, creating it on first use.
    pub fn accumulate(&mut self, key: BucketKey, column: usize, amount: Decimal) {
        let width = key.format.def().values.len().max(column + 1);
        let amounts = self
            .buckets
            .entry(key)
            .or_insert_with(|| vec![Decimal::ZERO; width]);
        if amounts.len() <= column {
            amounts.resize(column + 1, Decimal::ZERO);
        }
        amounts[column] += amount;
    }

    /// Remove and return every bucket of `format`, in key order.
    pub fn take(&mut self, format: Format) -> Vec<ConceptBucket> {
        let keys: Vec<BucketKey> = self
            .buckets
            .keys()
            .filter(|k| k.format == format)
            .cloned()
            .collect();
        keys.into_iter()
            .filter_map(|key| {
                self.buckets
                    .remove(&key)
                    .map(|amounts| ConceptBucket { key, amounts })
            })
            .collect()
    }
}

/// Which buckets fold into the minor-amounts counterparty.
#[derive(Debug, Clone)]
pub struct MinorAmountRule<'a> {
    /// `None` disables folding; zero-amount buckets are still dropped.
    pub threshold: Option<Decimal>,
    pub primary: &'a [usize],
    pub withholding: &'a [usize],
    /// Ids that always keep their own bucket.
    pub exempt: &'a [&'a str],
}

/// Consolidate buckets below the threshold that carry no withholding into the
/// minor-amounts bucket of the same concept, and drop buckets whose primary
/// amount is zero. Output is sorted by key.
pub fn finalize(buckets: Vec<ConceptBucket>, rule: &MinorAmountRule) -> Vec<ConceptBucket> {
    let mut kept: BTreeMap<BucketKey, Vec<Decimal>> = BTreeMap::new();
    let mut minor: BTreeMap<BucketKey, Vec<Decimal>> = BTreeMap::new();

    for bucket in buckets {
        let primary = bucket.sum(rule.primary);
        if primary.is_zero() {
            log::debug!("dropping empty bucket {:?}", bucket.key);
            continue;
        }
        let is_generic = bucket.key.entity_id == MINOR_AMOUNTS_ID;
        let below = rule.threshold.is_some_and(|t| primary < t);
        let has_withholding = !bucket.sum(rule.withholding).is_zero();
        let exempt = rule.exempt.contains(&bucket.key.entity_id.as_str());
        if is_generic || (below && !has_withholding && !exempt) {
            let key = BucketKey {
                entity_id: MINOR_AMOUNTS_ID.to_string(),
                ..bucket.key
            };
            let target = minor
                .entry(key)
                .or_insert_with(|| vec![Decimal::ZERO; bucket.amounts.len()]);
            if target.len() < bucket.amounts.len() {
                target.resize(bucket.amounts.len(), Decimal::ZERO);
            }
            for (total, amount) in target.iter_mut().zip(&bucket.amounts) {
                *total += *amount;
            }
        } else {
            kept.insert(bucket.key, bucket.amounts);
        }
    }

    for (key, amounts) in minor {
        let bucket = ConceptBucket { key, amounts };
        if !bucket.sum(rule.primary).is_zero() {
            kept.insert(bucket.key, bucket.amounts);
        }
    }

    kept.into_iter()
        .map(|(key, amounts)| ConceptBucket { key, amounts })
        .collect()
}
