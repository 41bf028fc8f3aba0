//! Pull-based CSV encoder for event imports

use std::fmt::Display;
use std::io::{self, Read, Write};

use crate::error::ImporterError;
use crate::types::{EventRecord, IdentifierMode};

use super::columns::{Column, ColumnSet};

/// Required columns that follow the identifier column.
const REQUIRED_COLUMNS: &str = "application_id,event_name,event_timestamp";

/// Initial capacity of the line buffer
const LINE_BUFFER_CAPACITY: usize = 4096;

/// Lifecycle of an [`EventImporter`].
///
/// Transitions only move forward:
/// `Initial -> HeaderPhase -> RowPhase -> Finished`.
/// [`EventImporter::reset`] is the only way back to `Initial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImporterState {
    /// Nothing produced yet, configuration may change
    Initial,
    /// Header line rendered and being drained
    HeaderPhase,
    /// Rows being rendered and drained
    RowPhase,
    /// End of stream was reported
    Finished,
}

/// Streams queued events as CSV for the logs import endpoint.
///
/// Output is pulled with [`produce`](Self::produce) (or through the
/// [`Read`] impl). Each call copies at most the remainder of one buffered line
/// into the destination, so only a single line is ever held in memory.
///
/// Queued events are consumed from the back: the most recently enqueued event
/// is written first.
///
/// Values are written verbatim. Commas or newlines inside string fields break
/// the row layout and must be kept out by the caller.
#[derive(Debug)]
pub struct EventImporter {
    error: Option<ImporterError>,
    state: ImporterState,
    mode: IdentifierMode,
    columns: ColumnSet,
    /// Bytes of `buffer` already handed out
    offset: usize,
    /// Current line (header or row)
    buffer: Vec<u8>,
    events: Vec<EventRecord>,
    rows_written: usize,
}

impl EventImporter {
    /// Create an importer keyed by `mode` with the given optional columns.
    ///
    /// The required columns are added automatically and must not be listed.
    /// Names outside the whitelist are dropped.
    pub fn new<I, S>(mode: IdentifierMode, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            error: None,
            state: ImporterState::Initial,
            mode,
            columns: ColumnSet::from_names(columns),
            offset: 0,
            buffer: Vec::with_capacity(LINE_BUFFER_CAPACITY),
            events: Vec::new(),
            rows_written: 0,
        }
    }

    /// Queue one event.
    pub fn enqueue(&mut self, event: EventRecord) {
        self.enqueue_many(std::iter::once(event));
    }

    /// Queue several events, preserving their order in the queue.
    ///
    /// Once the importer has reported end of stream this does nothing and
    /// records [`ImporterError::EnqueueAfterFinish`].
    pub fn enqueue_many<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = EventRecord>,
    {
        if self.state == ImporterState::Finished {
            self.record_error(ImporterError::EnqueueAfterFinish);
            return;
        }

        self.events.extend(events);
    }

    /// Change the identifier mode. Only allowed before any output.
    pub fn set_identifier_mode(&mut self, mode: IdentifierMode) {
        if self.state != ImporterState::Initial {
            self.record_error(ImporterError::IdentifierModeLocked);
            return;
        }

        self.mode = mode;
    }

    /// Replace the optional columns. Only allowed before any output.
    pub fn set_columns<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.state != ImporterState::Initial {
            self.record_error(ImporterError::ColumnsLocked);
            return;
        }

        self.columns = ColumnSet::from_names(columns);
    }

    /// Drop queued events, pending output and any recorded error.
    ///
    /// Identifier mode and columns are kept so the importer can be reused for
    /// the next batch.
    pub fn reset(&mut self) {
        self.error = None;
        self.state = ImporterState::Initial;
        self.offset = 0;
        self.buffer.clear();
        self.events.clear();
        self.rows_written = 0;
    }

    /// Copy the next piece of output into `dest`.
    ///
    /// Returns the number of bytes written and whether the stream has ended.
    /// The call that drains the last row still reports `false`; the following
    /// call returns `(0, true)`, as does every call after it.
    pub fn produce(&mut self, dest: &mut [u8]) -> (usize, bool) {
        if self.state == ImporterState::Finished {
            return (0, true);
        }

        if self.buffer.is_empty() && self.events.is_empty() {
            self.finish();
            return (0, true);
        }

        match self.state {
            ImporterState::Initial => {
                self.encode_header();
                self.state = ImporterState::HeaderPhase;
                (self.drain_header(dest), false)
            }
            ImporterState::HeaderPhase => (self.drain_header(dest), false),
            ImporterState::RowPhase => (self.drain_row(dest), false),
            ImporterState::Finished => (0, true),
        }
    }

    /// Convert into an iterator of owned chunks of at most `chunk_size` bytes.
    pub fn into_chunks(self, chunk_size: usize) -> Chunks {
        Chunks {
            importer: self,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn state(&self) -> ImporterState {
        self.state
    }

    pub fn identifier_mode(&self) -> IdentifierMode {
        self.mode
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Number of events still waiting to be rendered.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Number of rows rendered since construction or the last reset.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// First misuse recorded since construction or the last reset.
    pub fn error(&self) -> Option<&ImporterError> {
        self.error.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state == ImporterState::Finished
    }

    fn record_error(&mut self, error: ImporterError) {
        tracing::warn!(error = %error, state = ?self.state, "Event importer misuse");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn finish(&mut self) {
        tracing::debug!(rows = self.rows_written, "Event import stream finished");
        self.state = ImporterState::Finished;
    }

    fn encode_header(&mut self) {
        self.buffer.extend_from_slice(self.mode.column_name().as_bytes());
        self.buffer.push(b',');
        self.buffer.extend_from_slice(REQUIRED_COLUMNS.as_bytes());

        for column in self.columns.iter() {
            if !column.is_supported() {
                tracing::warn!(column = %column, "Column is not supported, values will be empty");
            }
            self.buffer.push(b',');
            self.buffer.extend_from_slice(column.name().as_bytes());
        }

        self.buffer.push(b'\n');
    }

    fn encode_event(&mut self, event: &EventRecord) {
        match self.mode {
            IdentifierMode::Device => push_display(&mut self.buffer, event.device_id),
            IdentifierMode::Profile => push_str(&mut self.buffer, event.profile_id.as_deref()),
        }

        self.buffer.push(b',');
        push_display(&mut self.buffer, event.application_id);
        self.buffer.push(b',');
        self.buffer.extend_from_slice(event.event_name.as_bytes());
        self.buffer.push(b',');
        push_display(&mut self.buffer, event.event_timestamp);

        for column in self.columns.iter() {
            self.buffer.push(b',');
            encode_field(&mut self.buffer, column, event);
        }

        self.buffer.push(b'\n');
        self.rows_written += 1;
    }

    fn drain_header(&mut self, dest: &mut [u8]) -> usize {
        let (written, drained) = self.drain(dest);
        if drained {
            self.state = ImporterState::RowPhase;
        }
        written
    }

    fn drain_row(&mut self, dest: &mut [u8]) -> usize {
        if self.buffer.is_empty() {
            if let Some(event) = self.events.pop() {
                self.encode_event(&event);
            }
        }

        self.drain(dest).0
    }

    /// Copy buffered bytes out; clears the buffer once it is fully handed out.
    fn drain(&mut self, dest: &mut [u8]) -> (usize, bool) {
        let rest = &self.buffer[self.offset..];
        let written = rest.len().min(dest.len());
        dest[..written].copy_from_slice(&rest[..written]);
        self.offset += written;

        let drained = self.offset == self.buffer.len();
        if drained {
            self.offset = 0;
            self.buffer.clear();
        }

        (written, drained)
    }
}

impl Read for EventImporter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.produce(buf).0)
    }
}

/// Iterator over owned output chunks, see [`EventImporter::into_chunks`].
#[derive(Debug)]
pub struct Chunks {
    importer: EventImporter,
    chunk_size: usize,
}

impl Iterator for Chunks {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let mut chunk = vec![0; self.chunk_size];
        let mut filled = 0;

        while filled < chunk.len() {
            let (written, done) = self.importer.produce(&mut chunk[filled..]);
            if done {
                break;
            }
            filled += written;
        }

        if filled == 0 {
            return None;
        }

        chunk.truncate(filled);
        Some(chunk)
    }
}

fn encode_field(buffer: &mut Vec<u8>, column: Column, event: &EventRecord) {
    match column {
        Column::AppPackageName => push_str(buffer, event.app_package_name.as_deref()),
        Column::AppVersionName => push_str(buffer, event.app_version_name.as_deref()),
        Column::ConnectionType => push_str(buffer, event.connection_type.as_deref()),
        Column::DeviceIpv6 => push_str(buffer, event.device_ipv6.as_deref()),
        Column::DeviceLocale => push_str(buffer, event.device_locale.as_deref()),
        Column::DeviceManufacturer => push_str(buffer, event.device_manufacturer.as_deref()),
        Column::DeviceModel => push_str(buffer, event.device_model.as_deref()),
        Column::DeviceType => push_str(buffer, event.device_type.as_deref()),
        Column::EventJson => {}
        Column::GoogleAid => push_str(buffer, event.google_aid.as_deref()),
        Column::IosIfa => push_str(buffer, event.ifa.as_deref()),
        Column::IosIfv => push_str(buffer, event.ifv.as_deref()),
        Column::Mcc => push_display(buffer, event.mcc),
        Column::Mnc => push_display(buffer, event.mnc),
        Column::OperatorName => push_str(buffer, event.operator_name.as_deref()),
        Column::OsName => push_str(buffer, event.os_name.as_deref()),
        Column::OsVersion => push_str(buffer, event.os_version.as_deref()),
        Column::SessionType => push_str(buffer, event.session_type.as_deref()),
        Column::WindowsAid => push_str(buffer, event.windows_aid.as_deref()),
    }
}

fn push_str(buffer: &mut Vec<u8>, value: Option<&str>) {
    if let Some(value) = value {
        buffer.extend_from_slice(value.as_bytes());
    }
}

fn push_display(buffer: &mut Vec<u8>, value: impl Display) {
    // Writing into a Vec cannot fail.
    let _ = write!(buffer, "{}", value);
}
