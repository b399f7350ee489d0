//! Import backend abstraction
//!
//! The wizard talks to the backend only through [`ImportBackend`], so the
//! HTTP client can be swapped for an in-process double in tests.

use crate::error::ClientError;
use crate::types::{ImportResults, IncidentId, UploadFile};
use sheetstorm_import::{ImportBatch, ParsedWorkbook};

/// Parse and submit endpoints of the import service
#[async_trait::async_trait]
pub trait ImportBackend: Send + Sync {
    /// Parse an uploaded spreadsheet into sheets, headers and rows
    async fn parse(
        &self,
        incident: &IncidentId,
        file: UploadFile,
    ) -> Result<ParsedWorkbook, ClientError>;

    /// Submit a validated batch for ingestion
    async fn submit(
        &self,
        incident: &IncidentId,
        batch: &ImportBatch,
    ) -> Result<ImportResults, ClientError>;
}

#[async_trait::async_trait]
impl<T: ImportBackend + ?Sized> ImportBackend for std::sync::Arc<T> {
    async fn parse(
        &self,
        incident: &IncidentId,
        file: UploadFile,
    ) -> Result<ParsedWorkbook, ClientError> {
        (**self).parse(incident, file).await
    }

    async fn submit(
        &self,
        incident: &IncidentId,
        batch: &ImportBatch,
    ) -> Result<ImportResults, ClientError> {
        (**self).submit(incident, batch).await
    }
}
