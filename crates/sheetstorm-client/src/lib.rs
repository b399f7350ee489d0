//! SheetStorm Import Client
//!
//! Access to the backend's spreadsheet import endpoints.
//!
//! # Core Concepts
//!
//! - [`ImportBackend`]: Parse and submit operations the wizard depends on
//! - [`HttpImportClient`]: `reqwest` implementation against the REST API
//! - [`ClientConfig`]: API root, bearer token and timeout
//! - [`ClientError`]: Failures classified by HTTP status
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetstorm_client::{ClientConfig, HttpImportClient, ImportBackend, UploadFile};
//!
//! let client = HttpImportClient::new(ClientConfig::new().with_token(token))?;
//! let workbook = client.parse(&incident, UploadFile::from_path("case.xlsx").await?).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

// Re-exports
pub use backend::ImportBackend;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{error_message, ClientError};
pub use http::HttpImportClient;
pub use types::{ImportResults, IncidentId, UploadFile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
