//! Required-field validation
//!
//! A record is erroring when any required field of its entity is missing.
//! The report is a full re-derivation from the batch, recomputed after every
//! normalization pass and every cell edit.

use crate::config::MissingValuePolicy;
use crate::entity::{
    AccountField, EntityField, EntityType, HostField, HostIocField, MalwareField, NetworkIocField,
    TimelineEventField,
};
use crate::normalize::{ImportBatch, NormalizedRecord};
use crate::sheet::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Erroring-record counts per entity type
///
/// Entity types without errors are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<EntityType, usize>,
}

impl ValidationReport {
    /// Number of erroring records of `entity`
    #[inline]
    #[must_use]
    pub fn errors_for(&self, entity: EntityType) -> usize {
        self.errors.get(&entity).copied().unwrap_or(0)
    }

    /// Erroring records across all entities
    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.errors.values().sum()
    }

    /// Whether no record is missing a required field
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// (entity, count) pairs with non-zero counts
    pub fn iter(&self) -> impl Iterator<Item = (EntityType, usize)> + '_ {
        self.errors.iter().map(|(e, n)| (*e, *n))
    }
}

impl MissingValuePolicy {
    /// Whether `value` counts as missing under this policy
    #[must_use]
    pub fn is_missing(&self, value: Option<&CellValue>) -> bool {
        let Some(value) = value else {
            return true;
        };

        match (self, value) {
            (_, CellValue::Null) => true,
            (MissingValuePolicy::Falsy, CellValue::String(s)) => s.is_empty(),
            (MissingValuePolicy::Falsy, CellValue::Bool(b)) => !b,
            (MissingValuePolicy::Falsy, CellValue::Number(n)) => n.as_f64() == Some(0.0),
            (MissingValuePolicy::Blank, CellValue::String(s)) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Required fields of `record` that hold no value
#[must_use]
pub fn missing_required<F: EntityField>(
    record: &NormalizedRecord<F>,
    policy: MissingValuePolicy,
) -> Vec<F> {
    F::specs()
        .iter()
        .filter(|spec| spec.required && policy.is_missing(record.get(spec.field)))
        .map(|spec| spec.field)
        .collect()
}

/// Count records of entity `F` missing at least one required field
#[must_use]
pub fn count_errors<F: EntityField>(records: &[NormalizedRecord<F>], policy: MissingValuePolicy) -> usize {
    let required = F::required();
    records
        .iter()
        .filter(|record| required.iter().any(|f| policy.is_missing(record.get(*f))))
        .count()
}

/// Validate every bucket of `batch`
#[must_use]
pub fn validate(batch: &ImportBatch, policy: MissingValuePolicy) -> ValidationReport {
    let counts = [
        (EntityType::TimelineEvents, count_errors::<TimelineEventField>(batch.records(), policy)),
        (EntityType::Hosts, count_errors::<HostField>(batch.records(), policy)),
        (EntityType::Accounts, count_errors::<AccountField>(batch.records(), policy)),
        (EntityType::NetworkIocs, count_errors::<NetworkIocField>(batch.records(), policy)),
        (EntityType::HostIocs, count_errors::<HostIocField>(batch.records(), policy)),
        (EntityType::Malware, count_errors::<MalwareField>(batch.records(), policy)),
    ];

    let errors: BTreeMap<_, _> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    if !errors.is_empty() {
        tracing::debug!(?errors, "validation found missing required fields");
    }
    ValidationReport { errors }
}
