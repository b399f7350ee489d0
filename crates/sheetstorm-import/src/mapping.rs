//! Column mapping and the mapping editor
//!
//! A [`ColumnMapping`] holds one [`SheetMapping`] per sheet: the sheet's
//! target entity plus a header-to-field assignment. The [`MappingEditor`]
//! owns the workbook together with its mapping and applies user edits:
//!
//! - Changing a sheet's target entity re-runs auto-mapping for that sheet,
//!   discarding its manual assignments
//! - Assigning a header touches only that header
//!
//! Two headers may target the same field. Nothing prevents it; the later
//! column wins during normalization and [`SheetMapping::duplicate_targets`]
//! reports the collision.

use crate::automap::{auto_map, auto_map_workbook};
use crate::entity::{EntityType, FieldKey};
use crate::error::MappingError;
use crate::sheet::{CellValue, ParsedWorkbook};
use indexmap::IndexMap;

/// Wire value of the "ignore this column" option
pub const IGNORE: &str = "ignore";

/// Mapping of a single sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetMapping {
    target: EntityType,
    fields: IndexMap<String, FieldKey>,
}

impl SheetMapping {
    /// Empty mapping targeting `target`
    #[inline]
    #[must_use]
    pub fn new(target: EntityType) -> Self {
        Self {
            target,
            fields: IndexMap::new(),
        }
    }

    /// Target entity
    #[inline]
    #[must_use]
    pub fn target(&self) -> EntityType {
        self.target
    }

    /// Field assigned to `header`, `None` if ignored
    #[inline]
    #[must_use]
    pub fn get(&self, header: &str) -> Option<FieldKey> {
        self.fields.get(header).copied()
    }

    /// Assign `header` to `field`, or ignore it with `None`
    ///
    /// # Errors
    /// [`MappingError::FieldEntityMismatch`] if `field` is not a field of the
    /// target entity.
    pub fn assign(
        &mut self,
        header: impl Into<String>,
        field: Option<FieldKey>,
    ) -> Result<(), MappingError> {
        let header = header.into();
        match field {
            Some(field) if field.entity() != self.target => {
                Err(MappingError::FieldEntityMismatch {
                    field,
                    expected: self.target,
                })
            }
            Some(field) => {
                self.fields.insert(header, field);
                Ok(())
            }
            None => {
                self.fields.shift_remove(&header);
                Ok(())
            }
        }
    }

    pub(crate) fn insert_unchecked(&mut self, header: String, field: FieldKey) {
        debug_assert_eq!(field.entity(), self.target);
        self.fields.insert(header, field);
    }

    /// Mapped (header, field) pairs in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldKey)> {
        self.fields.iter().map(|(h, f)| (h.as_str(), *f))
    }

    /// Number of mapped headers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether every header is ignored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields claimed by more than one header, with the claiming headers
    #[must_use]
    pub fn duplicate_targets(&self) -> Vec<(FieldKey, Vec<String>)> {
        let mut claims: IndexMap<FieldKey, Vec<String>> = IndexMap::new();
        for (header, field) in &self.fields {
            claims.entry(*field).or_default().push(header.clone());
        }
        claims
            .into_iter()
            .filter(|(_, headers)| headers.len() > 1)
            .collect()
    }
}

/// Mapping of every sheet, keyed by sheet name in workbook order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    sheets: IndexMap<String, SheetMapping>,
}

impl ColumnMapping {
    /// Empty mapping
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a sheet's mapping
    pub fn insert(&mut self, sheet: impl Into<String>, mapping: SheetMapping) {
        self.sheets.insert(sheet.into(), mapping);
    }

    /// Mapping of `sheet`
    #[inline]
    #[must_use]
    pub fn get(&self, sheet: &str) -> Option<&SheetMapping> {
        self.sheets.get(sheet)
    }

    /// Mutable mapping of `sheet`
    #[inline]
    pub fn get_mut(&mut self, sheet: &str) -> Option<&mut SheetMapping> {
        self.sheets.get_mut(sheet)
    }

    /// (sheet name, mapping) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SheetMapping)> {
        self.sheets.iter().map(|(name, m)| (name.as_str(), m))
    }

    /// Number of sheets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether no sheet is mapped
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// One choice in a header's field selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOption {
    /// Leave the column out
    Ignore,
    /// Map the column to a field
    Field {
        field: FieldKey,
        label: &'static str,
        required: bool,
    },
}

impl FieldOption {
    /// Value submitted by a selector for this option
    #[must_use]
    pub fn value(&self) -> &'static str {
        match self {
            FieldOption::Ignore => IGNORE,
            FieldOption::Field { field, .. } => field.as_str(),
        }
    }
}

/// Editor row for one header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMappingView {
    /// Column header
    pub header: String,
    /// Current assignment
    pub assigned: Option<FieldKey>,
    /// First-row value as a hint
    pub sample: Option<CellValue>,
    /// Selector options, `Ignore` first
    pub options: Vec<FieldOption>,
}

/// Editor panel for one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetMappingView {
    /// Sheet name
    pub sheet: String,
    /// Selected target entity
    pub target: EntityType,
    /// Entity selector options
    pub entity_options: [EntityType; 6],
    /// One row per header, in column order
    pub headers: Vec<HeaderMappingView>,
}

/// Owns a parsed workbook and the user's mapping of it
#[derive(Debug, Clone)]
pub struct MappingEditor {
    workbook: ParsedWorkbook,
    mapping: ColumnMapping,
}

impl MappingEditor {
    /// Start editing `workbook`, auto-mapping every sheet to `default_entity`
    #[must_use]
    pub fn new(workbook: ParsedWorkbook, default_entity: EntityType) -> Self {
        let mapping = auto_map_workbook(&workbook, default_entity);
        Self { workbook, mapping }
    }

    /// Parsed workbook
    #[inline]
    #[must_use]
    pub fn workbook(&self) -> &ParsedWorkbook {
        &self.workbook
    }

    /// Current mapping
    #[inline]
    #[must_use]
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Change a sheet's target entity, re-guessing all its headers
    ///
    /// # Errors
    /// [`MappingError::UnknownSheet`] if no such sheet exists.
    pub fn set_target_entity(
        &mut self,
        sheet: &str,
        entity: EntityType,
    ) -> Result<(), MappingError> {
        let parsed = self
            .workbook
            .sheet(sheet)
            .ok_or_else(|| MappingError::UnknownSheet(sheet.to_string()))?;

        tracing::info!(%sheet, %entity, "target entity changed, re-mapping sheet");
        self.mapping.insert(sheet, auto_map(parsed, entity));
        Ok(())
    }

    /// Assign one header, leaving every other header untouched
    ///
    /// # Errors
    /// Unknown sheet or header, or a field of another entity.
    pub fn assign(
        &mut self,
        sheet: &str,
        header: &str,
        field: Option<FieldKey>,
    ) -> Result<(), MappingError> {
        let parsed = self
            .workbook
            .sheet(sheet)
            .ok_or_else(|| MappingError::UnknownSheet(sheet.to_string()))?;
        if !parsed.has_header(header) {
            return Err(MappingError::UnknownHeader {
                sheet: sheet.to_string(),
                header: header.to_string(),
            });
        }

        let mapping = self
            .mapping
            .get_mut(sheet)
            .ok_or_else(|| MappingError::UnknownSheet(sheet.to_string()))?;
        mapping.assign(header, field)?;
        tracing::debug!(%sheet, %header, field = field.map(|f| f.as_str()), "header assigned");
        Ok(())
    }

    /// Assign one header from a selector value (`"ignore"` or a field key)
    ///
    /// # Errors
    /// As [`MappingEditor::assign`], plus [`MappingError::UnknownField`].
    pub fn assign_key(&mut self, sheet: &str, header: &str, key: &str) -> Result<(), MappingError> {
        if key == IGNORE {
            return self.assign(sheet, header, None);
        }

        let target = self
            .mapping
            .get(sheet)
            .ok_or_else(|| MappingError::UnknownSheet(sheet.to_string()))?
            .target();
        let field = FieldKey::parse(target, key).ok_or_else(|| MappingError::UnknownField {
            entity: target,
            key: key.to_string(),
        })?;
        self.assign(sheet, header, Some(field))
    }

    /// Editor panel for `sheet`
    ///
    /// # Errors
    /// [`MappingError::UnknownSheet`] if no such sheet exists.
    pub fn sheet_view(&self, sheet: &str) -> Result<SheetMappingView, MappingError> {
        let parsed = self
            .workbook
            .sheet(sheet)
            .ok_or_else(|| MappingError::UnknownSheet(sheet.to_string()))?;
        let mapping = self
            .mapping
            .get(sheet)
            .ok_or_else(|| MappingError::UnknownSheet(sheet.to_string()))?;

        let options: Vec<FieldOption> = std::iter::once(FieldOption::Ignore)
            .chain(mapping.target().fields().into_iter().map(|spec| FieldOption::Field {
                field: spec.field,
                label: spec.label,
                required: spec.required,
            }))
            .collect();

        let headers = parsed
            .headers
            .iter()
            .map(|header| HeaderMappingView {
                header: header.clone(),
                assigned: mapping.get(header),
                sample: parsed.sample_value(header).cloned(),
                options: options.clone(),
            })
            .collect();

        Ok(SheetMappingView {
            sheet: parsed.name.clone(),
            target: mapping.target(),
            entity_options: EntityType::ALL,
            headers,
        })
    }

    /// Split into workbook and mapping
    #[must_use]
    pub fn into_parts(self) -> (ParsedWorkbook, ColumnMapping) {
        (self.workbook, self.mapping)
    }
}
