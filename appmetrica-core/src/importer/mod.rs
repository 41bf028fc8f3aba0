//! CSV event import encoding
//!
//! The logs import endpoint accepts a CSV body whose first line names the
//! columns. [`EventImporter`] renders that body lazily from a queue of
//! [`EventRecord`](crate::types::EventRecord)s so large batches never have to
//! be materialized in memory.
//!
//! ## Wire Format
//!
//! ```text
//! appmetrica_device_id,application_id,event_name,event_timestamp[,optional...]
//! 998,84126,purchase,1700000000[,value...]
//! ```
//!
//! - Lines end with `\n`, fields are separated by `,`
//! - No quoting or escaping is applied
//! - The identifier column is `profile_id` in profile mode
//! - Optional columns come from [`Column::ALL`], in the order configured
//!
//! ## Usage
//!
//! ```rust
//! use appmetrica_core::importer::EventImporter;
//! use appmetrica_core::{EventRecord, IdentifierMode};
//! use std::io::Read;
//!
//! let mut importer = EventImporter::new(IdentifierMode::Device, ["mcc", "mnc"]);
//! importer.enqueue(EventRecord {
//!     application_id: 84126,
//!     device_id: 998,
//!     event_name: "purchase".to_string(),
//!     event_timestamp: 1_700_000_000,
//!     mcc: 250,
//!     mnc: 1,
//!     ..Default::default()
//! });
//!
//! let mut csv = String::new();
//! importer.read_to_string(&mut csv).unwrap();
//! assert_eq!(csv.lines().count(), 2);
//! ```

mod columns;
mod encoder;

pub use columns::{Column, ColumnSet};
pub use encoder::{Chunks, EventImporter, ImporterState};
