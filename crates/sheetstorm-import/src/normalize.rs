//! Row normalization
//!
//! Turns mapped sheet rows into typed records, bucketed by entity type.
//! Only the last confirmed [`ColumnMapping`] is ever applied; the
//! transformation is pure, so re-running it on the same inputs yields the
//! same batch.

use crate::entity::{
    AccountField, EntityField, EntityType, HostField, HostIocField, MalwareField, NetworkIocField,
    TimelineEventField,
};
use crate::mapping::{ColumnMapping, SheetMapping};
use crate::sheet::{CellValue, ParsedSheet, ParsedWorkbook};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One mapped row: field to raw cell value
///
/// Keys are the entity's own field enum, so a record of one entity can
/// never carry another entity's field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "F: EntityField", deserialize = "F: EntityField"))]
pub struct NormalizedRecord<F: EntityField> {
    values: BTreeMap<F, CellValue>,
}

impl<F: EntityField> NormalizedRecord<F> {
    /// Empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, field: F, value: impl Into<CellValue>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Value of `field`
    #[inline]
    #[must_use]
    pub fn get(&self, field: F) -> Option<&CellValue> {
        self.values.get(&field)
    }

    /// Set `field`, returning the previous value
    pub fn set(&mut self, field: F, value: CellValue) -> Option<CellValue> {
        self.values.insert(field, value)
    }

    /// Populated fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (F, &CellValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    /// Number of populated fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field is populated
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<F: EntityField> Default for NormalizedRecord<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized records of every entity type
///
/// Serializes to the submit payload: an object with all six entity keys,
/// each holding an array of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportBatch {
    pub(crate) timeline_events: Vec<NormalizedRecord<TimelineEventField>>,
    pub(crate) hosts: Vec<NormalizedRecord<HostField>>,
    pub(crate) accounts: Vec<NormalizedRecord<AccountField>>,
    pub(crate) network_iocs: Vec<NormalizedRecord<NetworkIocField>>,
    pub(crate) host_iocs: Vec<NormalizedRecord<HostIocField>>,
    pub(crate) malware: Vec<NormalizedRecord<MalwareField>>,
}

impl ImportBatch {
    /// Empty batch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of entity `F`
    #[inline]
    #[must_use]
    pub fn records<F: EntityField>(&self) -> &[NormalizedRecord<F>] {
        F::bucket(self)
    }

    /// Mutable records of entity `F`
    #[inline]
    pub fn records_mut<F: EntityField>(&mut self) -> &mut Vec<NormalizedRecord<F>> {
        F::bucket_mut(self)
    }

    /// Append a record to its entity's bucket
    pub fn push<F: EntityField>(&mut self, record: NormalizedRecord<F>) {
        F::bucket_mut(self).push(record);
    }

    /// Number of records of `entity`
    #[must_use]
    pub fn len(&self, entity: EntityType) -> usize {
        match entity {
            EntityType::TimelineEvents => self.timeline_events.len(),
            EntityType::Hosts => self.hosts.len(),
            EntityType::Accounts => self.accounts.len(),
            EntityType::NetworkIocs => self.network_iocs.len(),
            EntityType::HostIocs => self.host_iocs.len(),
            EntityType::Malware => self.malware.len(),
        }
    }

    /// Records across all buckets
    #[must_use]
    pub fn total_records(&self) -> usize {
        EntityType::ALL.iter().map(|e| self.len(*e)).sum()
    }

    /// Whether every bucket is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }

    /// Entity types with at least one record, in fixed order
    #[must_use]
    pub fn non_empty_entities(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|e| self.len(*e) > 0)
            .collect()
    }
}

/// Normalize every sheet of `workbook` through `mapping`
///
/// For each row, every mapped header whose cell is present and non-null is
/// copied under its field; rows left with no field are dropped. Records
/// land in the sheet's target bucket in (sheet, row) order. When two headers
/// map to the same field, the later column wins.
#[must_use]
pub fn normalize(workbook: &ParsedWorkbook, mapping: &ColumnMapping) -> ImportBatch {
    let mut batch = ImportBatch::new();

    for sheet in &workbook.sheets {
        let Some(sheet_mapping) = mapping.get(&sheet.name) else {
            tracing::warn!(sheet = %sheet.name, "no mapping for sheet, skipping");
            continue;
        };

        for (field, headers) in sheet_mapping.duplicate_targets() {
            tracing::warn!(
                sheet = %sheet.name,
                field = field.as_str(),
                ?headers,
                "several headers map to one field, last column wins"
            );
        }

        let before = batch.len(sheet_mapping.target());
        match sheet_mapping.target() {
            EntityType::TimelineEvents => {
                extend_bucket::<TimelineEventField>(&mut batch, sheet, sheet_mapping);
            }
            EntityType::Hosts => extend_bucket::<HostField>(&mut batch, sheet, sheet_mapping),
            EntityType::Accounts => extend_bucket::<AccountField>(&mut batch, sheet, sheet_mapping),
            EntityType::NetworkIocs => {
                extend_bucket::<NetworkIocField>(&mut batch, sheet, sheet_mapping);
            }
            EntityType::HostIocs => extend_bucket::<HostIocField>(&mut batch, sheet, sheet_mapping),
            EntityType::Malware => extend_bucket::<MalwareField>(&mut batch, sheet, sheet_mapping),
        }

        tracing::debug!(
            sheet = %sheet.name,
            entity = %sheet_mapping.target(),
            rows = sheet.rows.len(),
            records = batch.len(sheet_mapping.target()) - before,
            "normalized sheet"
        );
    }

    tracing::info!(records = batch.total_records(), "normalization complete");
    batch
}

fn extend_bucket<F: EntityField>(batch: &mut ImportBatch, sheet: &ParsedSheet, mapping: &SheetMapping) {
    let records = normalize_sheet::<F>(sheet, mapping);
    F::bucket_mut(batch).extend(records);
}

/// Normalize one sheet into records of entity `F`
///
/// Headers mapped to another entity's fields are skipped.
#[must_use]
pub fn normalize_sheet<F: EntityField>(
    sheet: &ParsedSheet,
    mapping: &SheetMapping,
) -> Vec<NormalizedRecord<F>> {
    let columns: Vec<(&str, F)> = sheet
        .headers
        .iter()
        .filter_map(|header| {
            let field = mapping.get(header).and_then(F::from_key)?;
            Some((header.as_str(), field))
        })
        .collect();

    sheet
        .rows
        .iter()
        .filter_map(|row| {
            let mut record = NormalizedRecord::new();
            for (header, field) in &columns {
                match row.get(*header) {
                    None | Some(CellValue::Null) => {}
                    Some(value) => {
                        record.set(*field, value.clone());
                    }
                }
            }
            (!record.is_empty()).then_some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldKey;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn hosts_sheet() -> ParsedSheet {
        ParsedSheet::new("Hosts", ["Hostname", "IP", "First Seen"])
            .with_row([
                ("Hostname", json!("WIN10-01")),
                ("IP", json!("10.0.0.5")),
                ("First Seen", json!("2024-01-01")),
            ])
            .with_row([("Hostname", json!(null)), ("IP", json!(null))])
            .with_row([("First Seen", json!("2024-02-02"))])
    }

    fn hosts_mapping() -> SheetMapping {
        let mut mapping = SheetMapping::new(EntityType::Hosts);
        mapping
            .assign("Hostname", Some(FieldKey::Host(HostField::Hostname)))
            .unwrap();
        mapping
            .assign("IP", Some(FieldKey::Host(HostField::IpAddress)))
            .unwrap();
        mapping
    }

    #[test]
    fn copies_mapped_non_null_cells_and_drops_empty_rows() {
        let records = normalize_sheet::<HostField>(&hosts_sheet(), &hosts_mapping());

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            NormalizedRecord::new()
                .with(HostField::Hostname, "WIN10-01")
                .with(HostField::IpAddress, "10.0.0.5")
        );
    }

    #[test]
    fn buckets_by_target_and_preserves_sheet_order() {
        let workbook = ParsedWorkbook::new(vec![
            ParsedSheet::new("A", ["Hostname"]).with_row([("Hostname", json!("a1"))]),
            ParsedSheet::new("B", ["Hostname"])
                .with_row([("Hostname", json!("b1"))])
                .with_row([("Hostname", json!("b2"))]),
        ]);
        let mut mapping = ColumnMapping::new();
        for name in ["A", "B"] {
            let mut sheet = SheetMapping::new(EntityType::Hosts);
            sheet
                .assign("Hostname", Some(FieldKey::Host(HostField::Hostname)))
                .unwrap();
            mapping.insert(name, sheet);
        }

        let batch = normalize(&workbook, &mapping);
        let names: Vec<_> = batch
            .records::<HostField>()
            .iter()
            .map(|r| r.get(HostField::Hostname).cloned().unwrap())
            .collect();
        assert_eq!(names, vec![json!("a1"), json!("b1"), json!("b2")]);
        assert_eq!(batch.non_empty_entities(), vec![EntityType::Hosts]);
    }

    #[test]
    fn later_column_wins_on_duplicate_target() {
        let sheet = ParsedSheet::new("Hosts", ["Name", "Host"])
            .with_row([("Name", json!("first")), ("Host", json!("second"))]);
        let mut mapping = SheetMapping::new(EntityType::Hosts);
        mapping
            .assign("Host", Some(FieldKey::Host(HostField::Hostname)))
            .unwrap();
        mapping
            .assign("Name", Some(FieldKey::Host(HostField::Hostname)))
            .unwrap();

        let records = normalize_sheet::<HostField>(&sheet, &mapping);
        assert_eq!(records[0].get(HostField::Hostname), Some(&json!("second")));
    }

    #[test]
    fn numbers_are_kept_raw() {
        let sheet = ParsedSheet::new("Net", ["IP", "Port"])
            .with_row([("IP", json!("8.8.8.8")), ("Port", json!(443))]);
        let mut mapping = SheetMapping::new(EntityType::NetworkIocs);
        mapping
            .assign("IP", Some(FieldKey::NetworkIoc(NetworkIocField::DnsIp)))
            .unwrap();
        mapping
            .assign("Port", Some(FieldKey::NetworkIoc(NetworkIocField::Port)))
            .unwrap();

        let records = normalize_sheet::<NetworkIocField>(&sheet, &mapping);
        assert_eq!(records[0].get(NetworkIocField::Port), Some(&json!(443)));
    }

    #[test]
    fn batch_serializes_all_six_buckets() {
        let mut batch = ImportBatch::new();
        batch.push(NormalizedRecord::new().with(HostField::Hostname, "WIN10-01"));

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            value,
            json!({
                "timeline_events": [],
                "hosts": [{"hostname": "WIN10-01"}],
                "accounts": [],
                "network_iocs": [],
                "host_iocs": [],
                "malware": []
            })
        );

        let back: ImportBatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, batch);
    }
}
