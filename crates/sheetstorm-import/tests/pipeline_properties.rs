//! Property tests for the import pipeline.
//!
//! Random workbooks are auto-mapped, normalized and validated; the tests
//! check the guarantees the preview and submit steps rely on.

use proptest::prelude::*;
use serde_json::{json, Value};
use sheetstorm_import::{
    auto_map, auto_map_workbook, normalize, normalize_label, validate, EntityField, EntityType,
    FieldKey, HostField, MissingValuePolicy, ParsedSheet, ParsedWorkbook, TimelineEventField,
};

fn entity_strategy() -> impl Strategy<Value = EntityType> {
    prop::sample::select(EntityType::ALL.to_vec())
}

fn header_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Hostname".to_string()),
        Just("IP".to_string()),
        Just("First Seen".to_string()),
        Just("Activity".to_string()),
        Just("Timestamp".to_string()),
        Just("Account Name".to_string()),
        Just("DNS_IP".to_string()),
        Just("File Name".to_string()),
        Just("Artifact Value".to_string()),
        Just("Notes".to_string()),
        "[A-Za-z _]{0,12}",
    ]
}

fn cell_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        Just(Some(json!(""))),
        Just(Some(json!(0))),
        Just(Some(json!(false))),
        "[a-z0-9.]{1,8}".prop_map(|s| Some(json!(s))),
        (1i64..10_000).prop_map(|n| Some(json!(n))),
    ]
}

fn sheet_strategy(name: &'static str) -> impl Strategy<Value = ParsedSheet> {
    prop::collection::vec(header_strategy(), 1..6).prop_flat_map(move |headers| {
        let width = headers.len();
        prop::collection::vec(prop::collection::vec(cell_strategy(), width), 0..6).prop_map(
            move |rows| {
                let mut sheet = ParsedSheet::new(name, headers.clone());
                for cells in rows {
                    let row = headers
                        .iter()
                        .zip(cells)
                        .filter_map(|(h, cell)| cell.map(|v| (h.clone(), v)));
                    sheet = sheet.with_row(row);
                }
                sheet
            },
        )
    })
}

fn workbook_strategy() -> impl Strategy<Value = ParsedWorkbook> {
    (sheet_strategy("First"), sheet_strategy("Second"))
        .prop_map(|(a, b)| ParsedWorkbook::new(vec![a, b]))
}

proptest! {
    #[test]
    fn auto_map_stays_within_target_schema(
        sheet in sheet_strategy("Sheet"),
        entity in entity_strategy(),
    ) {
        let mapping = auto_map(&sheet, entity);
        let allowed: Vec<FieldKey> = entity.fields().into_iter().map(|s| s.field).collect();
        for (header, field) in mapping.iter() {
            prop_assert!(sheet.has_header(header));
            prop_assert!(allowed.contains(&field), "{field} not in {entity}");
        }
    }

    #[test]
    fn exact_normalized_match_is_assigned(
        entity in entity_strategy(),
        index in any::<prop::sample::Index>(),
        upper in any::<bool>(),
    ) {
        let fields = entity.fields();
        let spec = fields[index.index(fields.len())];
        let header = if upper {
            spec.key.replace('_', " ").to_uppercase()
        } else {
            spec.key.to_string()
        };
        prop_assert_eq!(normalize_label(&header), normalize_label(spec.key));

        let sheet = ParsedSheet::new("Sheet", [header.clone()]);
        prop_assert_eq!(auto_map(&sheet, entity).get(&header), Some(spec.field));
    }

    #[test]
    fn normalization_is_idempotent(workbook in workbook_strategy(), entity in entity_strategy()) {
        let mapping = auto_map_workbook(&workbook, entity);
        let first = normalize(&workbook, &mapping);
        let second = normalize(&workbook, &mapping);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn normalized_records_are_never_empty(workbook in workbook_strategy(), entity in entity_strategy()) {
        let mapping = auto_map_workbook(&workbook, entity);
        let batch = normalize(&workbook, &mapping);
        prop_assert!(batch.records::<HostField>().iter().all(|r| !r.is_empty()));
        prop_assert!(batch.records::<TimelineEventField>().iter().all(|r| !r.is_empty()));
        prop_assert!(batch.total_records() <= workbook.total_rows());
    }

    #[test]
    fn clean_report_means_required_fields_present(workbook in workbook_strategy()) {
        let mapping = auto_map_workbook(&workbook, EntityType::Hosts);
        let batch = normalize(&workbook, &mapping);
        let report = validate(&batch, MissingValuePolicy::Falsy);

        if report.errors_for(EntityType::Hosts) == 0 {
            for record in batch.records::<HostField>() {
                for field in HostField::required() {
                    prop_assert!(!MissingValuePolicy::Falsy.is_missing(record.get(field)));
                }
            }
        }
    }
}
