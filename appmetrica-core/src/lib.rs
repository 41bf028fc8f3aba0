//! # appmetrica-core
//!
//! Client library for the AppMetrica logs import API.
//!
//! This library provides:
//! - Event record types using the API's field names
//! - A streaming CSV encoder for the bulk import endpoint
//! - An HTTP client that uploads encoded events
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three steps:
//! - **Records:** [`EventRecord`]s built in code or loaded from JSON Lines
//! - **Encoding:** an [`EventImporter`] renders queued records as CSV on demand
//! - **Upload:** [`ImportClient`] streams the importer's output as a request body
//!
//! ## Example
//!
//! ```rust,no_run
//! use appmetrica_core::{Config, EventImporter, SyncImportClient};
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//! let events = appmetrica_core::ingest::load_events(Path::new("events.jsonl"))
//!     .expect("failed to load events");
//!
//! let mut importer = EventImporter::new(config.import.identifier, &config.import.columns);
//! importer.enqueue_many(events);
//!
//! let client = SyncImportClient::new(config.api.clone()).expect("invalid api config");
//! client
//!     .import_events(importer, config.import.chunk_size)
//!     .expect("import failed");
//! ```

// Re-export commonly used items at the crate root
pub use api::{ImportClient, SyncImportClient};
pub use config::Config;
pub use error::{Error, ImporterError, Result};
pub use importer::{Column, ColumnSet, EventImporter, ImporterState};
pub use types::*;

// Public modules
pub mod api;
pub mod config;
pub mod error;
pub mod importer;
pub mod ingest;
pub mod logging;
pub mod types;
