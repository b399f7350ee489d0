//! Wizard error types

use crate::state::WizardStep;
use sheetstorm_client::ClientError;
use sheetstorm_import::{MappingError, PreviewError};

/// Wizard state machine error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// Transition not in the step table
    #[error("illegal step transition: {from} -> {to}")]
    IllegalTransition { from: WizardStep, to: WizardStep },
}

/// Import wizard error
///
/// Parse and submit failures leave the wizard on the step that issued them.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Operation not available on the current step
    #[error("{operation} is not available on the {step} step")]
    InvalidStep {
        operation: &'static str,
        step: WizardStep,
    },

    /// Step table violation
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    /// Upload rejected or file malformed
    #[error("parse failed: {0}")]
    Parse(#[source] ClientError),

    /// Parsed workbook holds no sheets
    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    /// Required fields missing; nothing was sent
    #[error("{errors} required values missing; fix them before submitting")]
    ValidationBlocked { errors: usize },

    /// Backend rejected or failed the submission
    #[error("submit failed: {0}")]
    Submit(#[source] ClientError),

    /// Mapping edit rejected
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Preview edit rejected
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

impl WizardError {
    /// Whether repeating the same action by hand may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Parse(e) | Self::Submit(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = WizardError::InvalidStep {
            operation: "submit",
            step: WizardStep::Mapping,
        };
        assert_eq!(err.to_string(), "submit is not available on the mapping step");

        let err = WizardError::ValidationBlocked { errors: 3 };
        assert_eq!(
            err.to_string(),
            "3 required values missing; fix them before submitting"
        );
    }

    #[test]
    fn retryable_follows_client_error() {
        let err = WizardError::Submit(ClientError::from_status(503, "down"));
        assert!(err.is_retryable());
        let err = WizardError::Parse(ClientError::from_status(400, "bad file"));
        assert!(!err.is_retryable());
        assert!(!WizardError::EmptyWorkbook.is_retryable());
    }
}
