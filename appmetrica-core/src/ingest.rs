//! Loading event records from JSON Lines files
//!
//! Each non-blank line holds one [`EventRecord`] object using the API's field
//! names (`appmetrica_device_id`, `ios_ifa`, ...).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::EventRecord;

/// Read all records from a JSON Lines file.
pub fn load_events(path: &Path) -> Result<Vec<EventRecord>> {
    let file = File::open(path)?;
    let events = read_events(BufReader::new(file))?;

    tracing::debug!(
        path = %path.display(),
        count = events.len(),
        "Loaded event records"
    );

    Ok(events)
}

/// Read records from any buffered reader.
///
/// Errors carry the 1-based line number of the offending record.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<EventRecord>> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event = serde_json::from_str(trimmed).map_err(|e| Error::Record {
            line: index + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }

    Ok(events)
}
