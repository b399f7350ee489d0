//! Submission gate

use crate::error::WizardError;
use sheetstorm_client::{ImportBackend, ImportResults, IncidentId};
use sheetstorm_import::PreviewGrid;
use tracing::{info, warn};

/// Submit the grid's batch if it validates
///
/// With any required value missing nothing is sent and
/// [`WizardError::ValidationBlocked`] is returned.
///
/// # Errors
/// `ValidationBlocked` on a failing grid, `Submit` when the backend fails.
pub async fn submit_batch<B>(
    backend: &B,
    incident: &IncidentId,
    grid: &PreviewGrid,
) -> Result<ImportResults, WizardError>
where
    B: ImportBackend + ?Sized,
{
    if !grid.can_submit() {
        let errors = grid.report().total_errors();
        warn!(%incident, errors, "Submission blocked by validation errors");
        return Err(WizardError::ValidationBlocked { errors });
    }

    let batch = grid.batch();
    info!(%incident, records = batch.total_records(), "Submitting import");

    let results = backend
        .submit(incident, batch)
        .await
        .map_err(WizardError::Submit)?;

    for (entity, created) in &results.results {
        info!(%incident, entity = %entity, created, "Records created");
    }
    Ok(results)
}
