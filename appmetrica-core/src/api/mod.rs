//! AppMetrica API client
//!
//! Only the logs import endpoint is bound here. The request body is streamed
//! straight out of an [`EventImporter`](crate::importer::EventImporter), so a
//! batch is never rendered to memory as a whole.
//!
//! ## Usage
//!
//! Credentials live in `~/.config/appmetrica/config.toml`:
//!
//! ```toml
//! [api]
//! oauth_token = "AQAAAAxxxxxxxx"
//! post_api_key = "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
//! ```

mod client;
mod wire;

pub use client::{interpret_response, ImportClient, SyncImportClient, IMPORT_EVENTS_PATH};
pub use wire::{ApiErrorDetail, ApiResponse};
