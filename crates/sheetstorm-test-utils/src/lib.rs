//! Testing utilities for SheetStorm workspace
//!
//! Shared fixtures: parsed workbooks, mappings, batches and backend
//! responses.

#![allow(missing_docs)]

use serde_json::json;
use sheetstorm_client::{ImportResults, IncidentId, UploadFile};
use sheetstorm_import::{
    ColumnMapping, EntityType, FieldKey, HostField, ImportBatch, NormalizedRecord, ParsedSheet,
    ParsedWorkbook, SheetMapping, TimelineEventField,
};
use std::collections::BTreeMap;
use uuid::Uuid;

/// `Hosts` sheet with one row: WIN10-01 / 10.0.0.5 / 2024-01-01
pub fn hosts_sheet() -> ParsedSheet {
    ParsedSheet::new("Hosts", ["Hostname", "IP", "First Seen"]).with_row([
        ("Hostname", json!("WIN10-01")),
        ("IP", json!("10.0.0.5")),
        ("First Seen", json!("2024-01-01")),
    ])
}

pub fn hosts_workbook() -> ParsedWorkbook {
    ParsedWorkbook::new(vec![hosts_sheet()])
}

/// Workbook with a timeline sheet, a hosts sheet and a network sheet
pub fn mixed_workbook() -> ParsedWorkbook {
    ParsedWorkbook::new(vec![
        ParsedSheet::new("Timeline", ["Timestamp", "Activity", "Host", "Tactic"])
            .with_row([
                ("Timestamp", json!("2024-01-01 10:00:00")),
                ("Activity", json!("Initial access via phishing")),
                ("Host", json!("WIN10-01")),
                ("Tactic", json!("Initial Access")),
            ])
            .with_row([
                ("Timestamp", json!("2024-01-01 10:05:00")),
                ("Activity", json!(null)),
                ("Host", json!("WIN10-01")),
            ])
            .with_row([("Timestamp", json!(null)), ("Activity", json!(null))]),
        hosts_sheet(),
        ParsedSheet::new("Network", ["DNS IP", "Port", "Protocol"]).with_row([
            ("DNS IP", json!("evil.example")),
            ("Port", json!(443)),
            ("Protocol", json!("HTTPS")),
        ]),
    ])
}

/// Mapping of [`hosts_sheet`]: Hostname (optionally) and IP, First Seen ignored
pub fn hosts_mapping(map_hostname: bool) -> ColumnMapping {
    let mut sheet = SheetMapping::new(EntityType::Hosts);
    if map_hostname {
        sheet
            .assign("Hostname", Some(FieldKey::Host(HostField::Hostname)))
            .expect("host field on hosts sheet");
    }
    sheet
        .assign("IP", Some(FieldKey::Host(HostField::IpAddress)))
        .expect("host field on hosts sheet");

    let mut mapping = ColumnMapping::new();
    mapping.insert("Hosts", sheet);
    mapping
}

/// Batch that passes validation
pub fn clean_batch() -> ImportBatch {
    let mut batch = ImportBatch::new();
    batch.push(
        NormalizedRecord::new()
            .with(HostField::Hostname, "WIN10-01")
            .with(HostField::IpAddress, "10.0.0.5"),
    );
    batch.push(
        NormalizedRecord::new()
            .with(TimelineEventField::Timestamp, "2024-01-01 10:00:00")
            .with(TimelineEventField::Activity, "Initial access"),
    );
    batch
}

/// Batch with one host missing its hostname
pub fn blocked_batch() -> ImportBatch {
    let mut batch = clean_batch();
    batch.push(NormalizedRecord::new().with(HostField::IpAddress, "10.0.0.9"));
    batch
}

pub fn incident_id() -> IncidentId {
    IncidentId::from(Uuid::from_u128(0x5eed_0000_0000_0000_0000_0000_0000_0001))
}

pub fn xlsx_upload() -> UploadFile {
    UploadFile::new("incident.xlsx", b"PK\x03\x04fake-xlsx".to_vec())
}

/// Backend summary for `batch`
pub fn results_for(batch: &ImportBatch) -> ImportResults {
    let results: BTreeMap<String, u64> = EntityType::ALL
        .iter()
        .map(|e| (e.as_str().to_string(), batch.len(*e) as u64))
        .collect();
    ImportResults {
        message: Some("Import completed successfully".to_string()),
        results,
    }
}
