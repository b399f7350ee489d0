//! SheetStorm Import Wizard
//!
//! Step-by-step import of an incident spreadsheet: upload to the backend
//! parser, map sheets and headers, preview and fix records, submit.
//!
//! # Core Concepts
//!
//! - [`ImportWizard`]: The upload → mapping → preview → success flow for one incident
//! - [`WizardStep`]: Step table with [`validate_transition`]
//! - [`submit_batch`]: Validation gate in front of the backend submit call
//! - [`Settings`]: TOML and environment configuration for client, pipeline and logging
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetstorm_client::{HttpImportClient, UploadFile};
//! use sheetstorm_wizard::{logging, ImportWizard, Settings};
//!
//! let settings = Settings::load("sheetstorm.toml")?.apply_env()?;
//! logging::init_tracing(&settings.log)?;
//!
//! let client = HttpImportClient::new(settings.client.clone())?;
//! let mut wizard = ImportWizard::new(client, incident)
//!     .with_import_config(settings.import)
//!     .with_wizard_config(settings.wizard);
//!
//! wizard.upload(UploadFile::from_path("case.xlsx").await?).await?;
//! wizard.mapping_editor_mut()?.set_target_entity("Hosts", EntityType::Hosts)?;
//! wizard.preview()?;
//! let results = wizard.submit().await?;
//! wizard.auto_close().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod submit;
pub mod wizard;

// Re-exports
pub use config::{LogConfig, Settings, SettingsError, WizardConfig};
pub use error::{StateMachineError, WizardError};
pub use state::{allowed_transitions, validate_transition, WizardStep};
pub use submit::submit_batch;
pub use wizard::ImportWizard;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
