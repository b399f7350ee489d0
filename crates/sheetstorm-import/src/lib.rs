//! SheetStorm Import Pipeline
//!
//! Pure transformations from a backend-parsed spreadsheet to validated,
//! typed records ready for ingestion.
//!
//! # Core Concepts
//!
//! - [`ParsedWorkbook`]: Sheets as returned by the backend parser
//! - [`EntityType`] / [`EntityField`]: The six target entities and their typed field tables
//! - [`auto_map`]: Header-to-field guessing by normalized substring match
//! - [`MappingEditor`]: User overrides of target entity and header assignments
//! - [`normalize`]: Mapped rows into an [`ImportBatch`] of typed records
//! - [`validate`]: Required-field error counts per entity
//! - [`PreviewGrid`]: Editable review of the batch, gating submission
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetstorm_import::{normalize, ImportConfig, MappingEditor, PreviewGrid};
//!
//! let config = ImportConfig::new();
//! let mut editor = MappingEditor::new(workbook, config.default_entity);
//! editor.set_target_entity("Hosts", EntityType::Hosts)?;
//!
//! let batch = normalize(editor.workbook(), editor.mapping());
//! let grid = PreviewGrid::new(batch, config.missing_values);
//! assert!(grid.can_submit());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod automap;
pub mod config;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod preview;
pub mod sheet;
pub mod validate;

// Re-exports
pub use automap::{auto_map, auto_map_workbook, guess_field, normalize_label};
pub use config::{ImportConfig, MissingValuePolicy};
pub use entity::{
    AccountField, EntityField, EntityType, FieldKey, FieldSpec, HostField, HostIocField,
    MalwareField, NetworkIocField, TimelineEventField, UnknownEntity,
};
pub use error::{MappingError, PreviewError};
pub use mapping::{
    ColumnMapping, FieldOption, HeaderMappingView, MappingEditor, SheetMapping, SheetMappingView,
    IGNORE,
};
pub use normalize::{normalize, normalize_sheet, ImportBatch, NormalizedRecord};
pub use preview::{cell_text, PreviewCell, PreviewGrid, PreviewTable};
pub use sheet::{CellValue, ParsedSheet, ParsedWorkbook, SheetRow};
pub use validate::{count_errors, missing_required, validate, ValidationReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
