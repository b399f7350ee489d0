//! Wizard step table

use crate::error::StateMachineError;
use serde::{Deserialize, Serialize};

/// Step of the import wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Waiting for a spreadsheet
    Upload,
    /// Editing sheet targets and header assignments
    Mapping,
    /// Reviewing and fixing normalized records
    Preview,
    /// Import accepted; waiting to auto-close
    Success,
}

impl WizardStep {
    /// All steps in wizard order
    pub const ALL: [WizardStep; 4] = [Self::Upload, Self::Mapping, Self::Preview, Self::Success];

    /// Lowercase step name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Mapping => "mapping",
            Self::Preview => "preview",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates a step transition.
///
/// Every step may return to `Upload`: closing the wizard discards all progress.
pub fn validate_transition(from: WizardStep, to: WizardStep) -> Result<(), StateMachineError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: WizardStep) -> Vec<WizardStep> {
    use WizardStep::*;
    match from {
        Upload => vec![Mapping, Upload],
        Mapping => vec![Preview, Upload],
        Preview => vec![Mapping, Success, Upload],
        Success => vec![Upload],
    }
}

fn allowed(from: WizardStep, to: WizardStep) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
