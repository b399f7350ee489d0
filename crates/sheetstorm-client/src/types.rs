//! Request and response types of the import endpoints

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Incident the import belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub Uuid);

impl IncidentId {
    /// Generate a random incident ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IncidentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for IncidentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for IncidentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spreadsheet to upload for parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Upload from memory
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from disk
    ///
    /// # Errors
    /// [`ClientError::Io`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    /// MIME type guessed from the extension
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("xls") => "application/vnd.ms-excel",
            Some("csv") => "text/csv",
            _ => "application/octet-stream",
        }
    }
}

/// Submit endpoint response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResults {
    /// Backend status message
    #[serde(default)]
    pub message: Option<String>,
    /// Records created, keyed by entity wire name
    #[serde(default)]
    pub results: BTreeMap<String, u64>,
}

impl ImportResults {
    /// Records created across all entities
    #[must_use]
    pub fn total_created(&self) -> u64 {
        self.results.values().sum()
    }

    /// Records created for `key`
    #[must_use]
    pub fn created(&self, key: &str) -> u64 {
        self.results.get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_id_parses_uuid() {
        let id: IncidentId = "7d444840-9dc0-11d1-b245-5ffdce74fad2".parse().unwrap();
        assert_eq!(id.to_string(), "7d444840-9dc0-11d1-b245-5ffdce74fad2");
        assert!("not-a-uuid".parse::<IncidentId>().is_err());
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(UploadFile::new("a.XLSX", vec![]).mime_type(), "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet");
        assert_eq!(UploadFile::new("a.xls", vec![]).mime_type(), "application/vnd.ms-excel");
        assert_eq!(UploadFile::new("a", vec![]).mime_type(), "application/octet-stream");
    }

    #[test]
    fn results_deserialize_from_submit_response() {
        let body = r#"{"message": "Import completed successfully",
                       "results": {"hosts": 2, "timeline_events": 5, "malware": 0}}"#;
        let results: ImportResults = serde_json::from_str(body).unwrap();
        assert_eq!(results.total_created(), 7);
        assert_eq!(results.created("hosts"), 2);
        assert_eq!(results.created("accounts"), 0);
    }

    #[tokio::test]
    async fn reads_upload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.xlsx");
        tokio::fs::write(&path, b"xlsx-bytes").await.unwrap();

        let upload = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "case.xlsx");
        assert_eq!(upload.bytes, b"xlsx-bytes");

        let missing = UploadFile::from_path(dir.path().join("nope.xlsx")).await;
        assert!(matches!(missing, Err(ClientError::Io(_))));
    }
}
