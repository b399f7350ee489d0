//! HTTP implementation of [`ImportBackend`]

use crate::backend::ImportBackend;
use crate::config::ClientConfig;
use crate::error::{error_message, ClientError};
use crate::types::{ImportResults, IncidentId, UploadFile};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use sheetstorm_import::{ImportBatch, ParsedWorkbook};
use tracing::{debug, info, warn};

/// Import backend reached over HTTP
///
/// Requests are sent once; failures are returned to the caller, who may
/// retry by hand.
#[derive(Debug, Clone)]
pub struct HttpImportClient {
    http: Client,
    config: ClientConfig,
}

impl HttpImportClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// [`ClientError::Config`] if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Client configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn import_url(&self, incident: &IncidentId, action: &str) -> String {
        format!(
            "{}/incidents/{incident}/import/{action}",
            self.config.base_url()
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!(status = status.as_u16(), %message, "Import backend returned an error");
        Err(ClientError::from_status(status.as_u16(), message))
    }
}

#[async_trait::async_trait]
impl ImportBackend for HttpImportClient {
    async fn parse(
        &self,
        incident: &IncidentId,
        file: UploadFile,
    ) -> Result<ParsedWorkbook, ClientError> {
        if file.file_name.is_empty() {
            return Err(ClientError::NoFileSelected);
        }

        let url = self.import_url(incident, "parse");
        debug!(%url, file = %file.file_name, size = file.bytes.len(), "Uploading spreadsheet");

        let mime = file.mime_type();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .authorize(self.http.post(&url))
            .multipart(form)
            .send()
            .await?;
        let workbook: ParsedWorkbook = Self::read_json(response).await?;

        info!(
            %incident,
            sheets = workbook.sheets.len(),
            rows = workbook.total_rows(),
            "Spreadsheet parsed"
        );
        Ok(workbook)
    }

    async fn submit(
        &self,
        incident: &IncidentId,
        batch: &ImportBatch,
    ) -> Result<ImportResults, ClientError> {
        let url = self.import_url(incident, "submit");
        debug!(%url, records = batch.total_records(), "Submitting import batch");

        let response = self
            .authorize(self.http.post(&url))
            .json(batch)
            .send()
            .await?;
        let results: ImportResults = Self::read_json(response).await?;

        info!(%incident, created = results.total_created(), "Import submitted");
        Ok(results)
    }
}
