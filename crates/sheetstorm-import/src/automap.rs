//! Header to field auto-mapping
//!
//! Guesses a field for each sheet header by bidirectional substring match
//! between the normalized header and each normalized field key, taking the
//! first hit in the entity's field order.

use crate::entity::{EntityType, FieldKey, FieldSpec};
use crate::mapping::{ColumnMapping, SheetMapping};
use crate::sheet::{ParsedSheet, ParsedWorkbook};

/// Lowercase and drop underscores and spaces
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| *c != '_' && *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// First field of `fields` matching `header`, if any
#[must_use]
pub fn guess_field(header: &str, fields: &[FieldSpec<FieldKey>]) -> Option<FieldKey> {
    let header = normalize_label(header);
    if header.is_empty() {
        return None;
    }

    fields
        .iter()
        .find(|spec| {
            let key = normalize_label(spec.key);
            header.contains(&key) || key.contains(&header)
        })
        .map(|spec| spec.field)
}

/// Auto-map every header of `sheet` against `entity`
#[must_use]
pub fn auto_map(sheet: &ParsedSheet, entity: EntityType) -> SheetMapping {
    let fields = entity.fields();
    let mut mapping = SheetMapping::new(entity);

    for header in &sheet.headers {
        match guess_field(header, &fields) {
            Some(field) => {
                tracing::debug!(sheet = %sheet.name, %header, field = field.as_str(), "auto-mapped header");
                mapping.insert_unchecked(header.clone(), field);
            }
            None => {
                tracing::debug!(sheet = %sheet.name, %header, "header left unmapped");
            }
        }
    }

    mapping
}

/// Initial mapping of a whole workbook, every sheet targeting `default_entity`
#[must_use]
pub fn auto_map_workbook(workbook: &ParsedWorkbook, default_entity: EntityType) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for sheet in &workbook.sheets {
        mapping.insert(sheet.name.clone(), auto_map(sheet, default_entity));
    }
    tracing::info!(
        sheets = workbook.sheets.len(),
        entity = %default_entity,
        "initialized column mapping"
    );
    mapping
}
