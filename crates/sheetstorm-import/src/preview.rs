//! Editable preview grid
//!
//! Holds the normalized batch for review. Cell edits write straight into
//! the batch (no re-normalization) and re-run validation; missing required
//! cells are flagged from the same check the validator uses.

use crate::config::MissingValuePolicy;
use crate::entity::{
    AccountField, EntityField, EntityType, FieldKey, FieldSpec, HostField, HostIocField,
    MalwareField, NetworkIocField, TimelineEventField,
};
use crate::error::PreviewError;
use crate::normalize::ImportBatch;
use crate::sheet::CellValue;
use crate::validate::{validate, ValidationReport};

/// One rendered cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewCell {
    /// Column field
    pub field: FieldKey,
    /// Editable text
    pub text: String,
    /// Required but missing
    pub missing_required: bool,
}

/// One entity tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTable {
    /// Entity shown
    pub entity: EntityType,
    /// Columns, in schema order
    pub columns: Vec<FieldSpec<FieldKey>>,
    /// One row of cells per record
    pub rows: Vec<Vec<PreviewCell>>,
    /// Erroring records in this tab
    pub error_count: usize,
}

/// Review surface over a normalized batch
#[derive(Debug, Clone)]
pub struct PreviewGrid {
    batch: ImportBatch,
    report: ValidationReport,
    policy: MissingValuePolicy,
}

impl PreviewGrid {
    /// Wrap `batch` and validate it
    #[must_use]
    pub fn new(batch: ImportBatch, policy: MissingValuePolicy) -> Self {
        let report = validate(&batch, policy);
        Self {
            batch,
            report,
            policy,
        }
    }

    /// Current batch
    #[inline]
    #[must_use]
    pub fn batch(&self) -> &ImportBatch {
        &self.batch
    }

    /// Current validation report
    #[inline]
    #[must_use]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Whether submission may proceed
    #[inline]
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.report.is_clean()
    }

    /// Entities with records, one tab each
    #[must_use]
    pub fn tabs(&self) -> Vec<EntityType> {
        self.batch.non_empty_entities()
    }

    /// Render the tab of `entity`
    #[must_use]
    pub fn table(&self, entity: EntityType) -> PreviewTable {
        let rows = match entity {
            EntityType::TimelineEvents => self.rows::<TimelineEventField>(),
            EntityType::Hosts => self.rows::<HostField>(),
            EntityType::Accounts => self.rows::<AccountField>(),
            EntityType::NetworkIocs => self.rows::<NetworkIocField>(),
            EntityType::HostIocs => self.rows::<HostIocField>(),
            EntityType::Malware => self.rows::<MalwareField>(),
        };

        PreviewTable {
            entity,
            columns: entity.fields(),
            rows,
            error_count: self.report.errors_for(entity),
        }
    }

    fn rows<F: EntityField>(&self) -> Vec<Vec<PreviewCell>> {
        self.batch
            .records::<F>()
            .iter()
            .map(|record| {
                F::specs()
                    .iter()
                    .map(|spec| {
                        let value = record.get(spec.field);
                        PreviewCell {
                            field: spec.field.into_key(),
                            text: value.map(cell_text).unwrap_or_default(),
                            missing_required: spec.required && self.policy.is_missing(value),
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Overwrite one cell and re-validate
    ///
    /// # Errors
    /// [`PreviewError::RowOutOfRange`] if `row` is past the bucket end.
    pub fn edit_cell<F: EntityField>(
        &mut self,
        row: usize,
        field: F,
        value: impl Into<CellValue>,
    ) -> Result<(), PreviewError> {
        let records = self.batch.records_mut::<F>();
        let len = records.len();
        let record = records.get_mut(row).ok_or(PreviewError::RowOutOfRange {
            entity: F::ENTITY,
            row,
            len,
        })?;

        record.set(field, value.into());
        self.report = validate(&self.batch, self.policy);
        tracing::debug!(
            entity = %F::ENTITY,
            row,
            field = field.key(),
            errors = self.report.total_errors(),
            "cell edited"
        );
        Ok(())
    }

    /// Overwrite one cell addressed by wire key
    ///
    /// # Errors
    /// Unknown field key for `entity`, or row out of range.
    pub fn edit_cell_key(
        &mut self,
        entity: EntityType,
        row: usize,
        key: &str,
        value: impl Into<CellValue>,
    ) -> Result<(), PreviewError> {
        let field = FieldKey::parse(entity, key).ok_or_else(|| PreviewError::UnknownField {
            entity,
            key: key.to_string(),
        })?;

        match field {
            FieldKey::TimelineEvent(f) => self.edit_cell(row, f, value),
            FieldKey::Host(f) => self.edit_cell(row, f, value),
            FieldKey::Account(f) => self.edit_cell(row, f, value),
            FieldKey::NetworkIoc(f) => self.edit_cell(row, f, value),
            FieldKey::HostIoc(f) => self.edit_cell(row, f, value),
            FieldKey::Malware(f) => self.edit_cell(row, f, value),
        }
    }

    /// Take the batch out of the grid
    #[must_use]
    pub fn into_batch(self) -> ImportBatch {
        self.batch
    }
}

/// Text shown in an editable cell
#[must_use]
pub fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedRecord;
    use serde_json::json;

    fn grid_with_unnamed_host() -> PreviewGrid {
        let mut batch = ImportBatch::new();
        batch.push(NormalizedRecord::new().with(HostField::IpAddress, "10.0.0.5"));
        batch.push(
            NormalizedRecord::new()
                .with(NetworkIocField::DnsIp, "evil.example")
                .with(NetworkIocField::Port, 443),
        );
        PreviewGrid::new(batch, MissingValuePolicy::Falsy)
    }

    #[test]
    fn tabs_follow_entity_order() {
        let grid = grid_with_unnamed_host();
        assert_eq!(grid.tabs(), vec![EntityType::Hosts, EntityType::NetworkIocs]);
    }

    #[test]
    fn table_flags_missing_required_cells() {
        let grid = grid_with_unnamed_host();
        let table = grid.table(EntityType::Hosts);

        assert_eq!(table.columns.len(), HostField::specs().len());
        assert_eq!(table.error_count, 1);

        let row = &table.rows[0];
        assert_eq!(row[0].field, FieldKey::Host(HostField::Hostname));
        assert!(row[0].missing_required);
        assert_eq!(row[1].text, "10.0.0.5");
        assert!(!row[1].missing_required);

        let net = grid.table(EntityType::NetworkIocs);
        assert_eq!(net.rows[0][3].text, "443");
    }

    #[test]
    fn editing_fixes_validation_and_unblocks_submit() {
        let mut grid = grid_with_unnamed_host();
        assert!(!grid.can_submit());

        grid.edit_cell(0, HostField::Hostname, "WIN10-01").unwrap();
        assert!(grid.can_submit());
        assert_eq!(
            grid.batch().records::<HostField>()[0].get(HostField::Hostname),
            Some(&json!("WIN10-01"))
        );

        grid.edit_cell_key(EntityType::Hosts, 0, "hostname", "").unwrap();
        assert!(!grid.can_submit());
    }

    #[test]
    fn rejects_bad_addresses_without_changes() {
        let mut grid = grid_with_unnamed_host();
        let before = grid.batch().clone();

        let err = grid.edit_cell(5, HostField::Hostname, "x").unwrap_err();
        assert_eq!(
            err,
            PreviewError::RowOutOfRange {
                entity: EntityType::Hosts,
                row: 5,
                len: 1
            }
        );

        let err = grid
            .edit_cell_key(EntityType::Hosts, 0, "file_name", "x")
            .unwrap_err();
        assert!(matches!(err, PreviewError::UnknownField { .. }));
        assert_eq!(grid.batch(), &before);
    }

    #[test]
    fn cell_text_renders_raw_values() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("a")), "a");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&json!(true)), "true");
    }
}
