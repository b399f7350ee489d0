//! Error types for the import pipeline
//!
//! Covers the two places where caller input can be rejected:
//! - Mapping edits naming unknown sheets, headers, or foreign fields
//! - Preview edits addressing rows or fields that do not exist
//!
//! Missing required values are not errors; they are reported by the
//! validator and gate submission.

use crate::entity::{EntityType, FieldKey};

/// Mapping editor errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// No sheet with this name in the workbook
    #[error("unknown sheet: {0}")]
    UnknownSheet(String),

    /// Sheet has no such header
    #[error("sheet '{sheet}' has no header '{header}'")]
    UnknownHeader { sheet: String, header: String },

    /// Field belongs to another entity than the sheet targets
    #[error("field {field} does not belong to {expected}")]
    FieldEntityMismatch { field: FieldKey, expected: EntityType },

    /// Wire key not in the entity's schema
    #[error("unknown field '{key}' for {entity}")]
    UnknownField { entity: EntityType, key: String },
}

/// Preview grid errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// Row index past the end of the bucket
    #[error("{entity} has no row {row} (len {len})")]
    RowOutOfRange {
        entity: EntityType,
        row: usize,
        len: usize,
    },

    /// Wire key not in the entity's schema
    #[error("unknown field '{key}' for {entity}")]
    UnknownField { entity: EntityType, key: String },
}
