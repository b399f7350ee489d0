//! Import wizard
//!
//! Drives one import through upload, mapping, preview and success. Each
//! step owns the state it needs; leaving a step backwards or closing the
//! wizard drops whatever the later steps built.

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::state::{validate_transition, WizardStep};
use crate::submit::submit_batch;
use sheetstorm_client::{ImportBackend, ImportResults, IncidentId, UploadFile};
use sheetstorm_import::{
    normalize, CellValue, EntityType, ImportConfig, MappingEditor, ParsedWorkbook, PreviewGrid,
};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
enum WizardState {
    #[default]
    Upload,
    Mapping {
        editor: MappingEditor,
    },
    Preview {
        editor: MappingEditor,
        grid: PreviewGrid,
    },
    Success {
        results: ImportResults,
    },
}

impl WizardState {
    fn step(&self) -> WizardStep {
        match self {
            Self::Upload => WizardStep::Upload,
            Self::Mapping { .. } => WizardStep::Mapping,
            Self::Preview { .. } => WizardStep::Preview,
            Self::Success { .. } => WizardStep::Success,
        }
    }
}

/// Spreadsheet import wizard for one incident
///
/// Operations take `&mut self`, so a second upload or submit cannot start
/// while one is awaiting the backend.
#[derive(Debug)]
pub struct ImportWizard<B> {
    backend: B,
    incident: IncidentId,
    import: ImportConfig,
    config: WizardConfig,
    state: WizardState,
}

impl<B: ImportBackend> ImportWizard<B> {
    /// Create a wizard on the upload step
    pub fn new(backend: B, incident: IncidentId) -> Self {
        Self {
            backend,
            incident,
            import: ImportConfig::default(),
            config: WizardConfig::default(),
            state: WizardState::Upload,
        }
    }

    /// With pipeline configuration
    #[must_use]
    pub fn with_import_config(mut self, import: ImportConfig) -> Self {
        self.import = import;
        self
    }

    /// With wizard configuration
    #[must_use]
    pub fn with_wizard_config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    /// Current step
    #[inline]
    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    /// Incident receiving the import
    #[inline]
    pub fn incident(&self) -> &IncidentId {
        &self.incident
    }

    /// Backend in use
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parsed workbook, on the mapping and preview steps
    pub fn workbook(&self) -> Option<&ParsedWorkbook> {
        self.mapping_editor().map(MappingEditor::workbook)
    }

    /// Mapping state, on the mapping and preview steps
    pub fn mapping_editor(&self) -> Option<&MappingEditor> {
        match &self.state {
            WizardState::Mapping { editor } | WizardState::Preview { editor, .. } => Some(editor),
            _ => None,
        }
    }

    /// Preview grid, on the preview step
    pub fn grid(&self) -> Option<&PreviewGrid> {
        match &self.state {
            WizardState::Preview { grid, .. } => Some(grid),
            _ => None,
        }
    }

    /// Backend summary, on the success step
    pub fn results(&self) -> Option<&ImportResults> {
        match &self.state {
            WizardState::Success { results } => Some(results),
            _ => None,
        }
    }

    /// Upload a spreadsheet and move to mapping
    ///
    /// Every sheet starts on the configured default entity with guessed
    /// header assignments.
    ///
    /// # Errors
    /// `InvalidStep` outside the upload step; `Parse` or `EmptyWorkbook` if
    /// the file is rejected, leaving the wizard on upload.
    pub async fn upload(&mut self, file: UploadFile) -> Result<(), WizardError> {
        self.expect_step("upload", WizardStep::Upload)?;
        validate_transition(WizardStep::Upload, WizardStep::Mapping)?;

        debug!(incident = %self.incident, file = %file.file_name, "Uploading spreadsheet");
        let workbook = self
            .backend
            .parse(&self.incident, file)
            .await
            .map_err(|e| {
                warn!(incident = %self.incident, error = %e, "Spreadsheet parse failed");
                WizardError::Parse(e)
            })?;

        if workbook.is_empty() {
            warn!(incident = %self.incident, "Parsed workbook has no sheets");
            return Err(WizardError::EmptyWorkbook);
        }

        let editor = MappingEditor::new(workbook, self.import.default_entity);
        self.enter(WizardState::Mapping { editor });
        Ok(())
    }

    /// Mapping state for edits
    ///
    /// # Errors
    /// `InvalidStep` outside the mapping step.
    pub fn mapping_editor_mut(&mut self) -> Result<&mut MappingEditor, WizardError> {
        match &mut self.state {
            WizardState::Mapping { editor } => Ok(editor),
            other => Err(WizardError::InvalidStep {
                operation: "edit mapping",
                step: other.step(),
            }),
        }
    }

    /// Confirm the mapping, normalize and move to preview
    ///
    /// # Errors
    /// `InvalidStep` outside the mapping step.
    pub fn preview(&mut self) -> Result<(), WizardError> {
        validate_transition(self.step(), WizardStep::Preview).map_err(|_| {
            WizardError::InvalidStep {
                operation: "preview",
                step: self.step(),
            }
        })?;

        let editor = match std::mem::take(&mut self.state) {
            WizardState::Mapping { editor } => editor,
            other => {
                let step = other.step();
                self.state = other;
                return Err(WizardError::InvalidStep {
                    operation: "preview",
                    step,
                });
            }
        };

        let batch = normalize(editor.workbook(), editor.mapping());
        let grid = PreviewGrid::new(batch, self.import.missing_values);
        info!(
            incident = %self.incident,
            records = grid.batch().total_records(),
            errors = grid.report().total_errors(),
            "Preview ready"
        );

        self.enter(WizardState::Preview { editor, grid });
        Ok(())
    }

    /// Edit one preview cell; validation is recomputed
    ///
    /// # Errors
    /// `InvalidStep` outside the preview step; `Preview` for an unknown
    /// field or row.
    pub fn edit_cell_key(
        &mut self,
        entity: EntityType,
        row: usize,
        key: &str,
        value: impl Into<CellValue>,
    ) -> Result<(), WizardError> {
        match &mut self.state {
            WizardState::Preview { grid, .. } => {
                grid.edit_cell_key(entity, row, key, value)?;
                debug!(%entity, row, key, errors = grid.report().total_errors(), "Cell edited");
                Ok(())
            }
            other => Err(WizardError::InvalidStep {
                operation: "edit cell",
                step: other.step(),
            }),
        }
    }

    /// Go back one step
    ///
    /// From preview the mapping is kept and the grid edits are dropped;
    /// from mapping the uploaded workbook is dropped.
    ///
    /// # Errors
    /// `InvalidStep` on the upload and success steps.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let next = match std::mem::take(&mut self.state) {
            WizardState::Preview { editor, .. } => WizardState::Mapping { editor },
            WizardState::Mapping { .. } => WizardState::Upload,
            other => {
                let step = other.step();
                self.state = other;
                return Err(WizardError::InvalidStep {
                    operation: "back",
                    step,
                });
            }
        };
        self.enter(next);
        Ok(self.step())
    }

    /// Submit the previewed batch
    ///
    /// # Errors
    /// `InvalidStep` outside the preview step; `ValidationBlocked` while
    /// required values are missing; `Submit` if the backend fails. On
    /// error the wizard stays on preview with its edits.
    pub async fn submit(&mut self) -> Result<ImportResults, WizardError> {
        let WizardState::Preview { grid, .. } = &self.state else {
            return Err(WizardError::InvalidStep {
                operation: "submit",
                step: self.step(),
            });
        };
        validate_transition(WizardStep::Preview, WizardStep::Success)?;

        let results = submit_batch(&self.backend, &self.incident, grid).await?;

        self.enter(WizardState::Success {
            results: results.clone(),
        });
        Ok(results)
    }

    /// Abandon the import and reset to upload
    pub fn close(&mut self) {
        if self.step() != WizardStep::Upload {
            info!(incident = %self.incident, from = %self.step(), "Import wizard closed");
        }
        self.state = WizardState::Upload;
    }

    /// After a successful submit, wait the configured delay and reset
    ///
    /// # Errors
    /// `InvalidStep` outside the success step.
    pub async fn auto_close(&mut self) -> Result<(), WizardError> {
        self.expect_step("auto close", WizardStep::Success)?;
        tokio::time::sleep(self.config.success_close_delay()).await;
        self.close();
        Ok(())
    }

    fn expect_step(&self, operation: &'static str, expected: WizardStep) -> Result<(), WizardError> {
        let step = self.step();
        if step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidStep { operation, step })
        }
    }

    fn enter(&mut self, next: WizardState) {
        let from = self.step();
        let to = next.step();
        self.state = next;
        info!(incident = %self.incident, %from, %to, "Wizard step changed");
    }
}
