//! Integration tests for the streaming event importer
//!
//! These drive the public pull interface the same way an HTTP transport does:
//! repeated `produce` calls with caller-owned buffers until end of stream.

use appmetrica_core::importer::{EventImporter, ImporterState};
use appmetrica_core::ingest::read_events;
use appmetrica_core::{EventRecord, IdentifierMode, ImporterError};
use std::io::Read;

fn sample_event(device_id: u64, event_name: &str) -> EventRecord {
    EventRecord {
        application_id: 84126,
        device_id,
        event_name: event_name.to_string(),
        event_timestamp: 1_700_000_000,
        mcc: 250,
        mnc: 25000,
        os_name: Some("android".to_string()),
        os_version: Some("14".to_string()),
        device_model: Some("Pixel 8".to_string()),
        ..Default::default()
    }
}

/// Pull everything using a destination buffer of `capacity` bytes.
fn drain(importer: &mut EventImporter, capacity: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut dest = vec![0u8; capacity];
    loop {
        let (written, done) = importer.produce(&mut dest);
        if done {
            assert_eq!(written, 0, "end of stream must not carry bytes");
            return out;
        }
        out.extend_from_slice(&dest[..written]);
    }
}

// ============================================
// Column Filtering
// ============================================

#[test]
fn test_unrecognized_columns_are_dropped_in_order() {
    let importer = EventImporter::new(IdentifierMode::Device, ["mcc", "mnc", "bogus"]);
    assert_eq!(importer.columns().names(), vec!["mcc", "mnc"]);

    let importer = EventImporter::new(
        IdentifierMode::Device,
        ["Device_Model", "os_version", "ios_ifv", "appmetrica_device_id", "google_aid"],
    );
    assert_eq!(
        importer.columns().names(),
        vec!["os_version", "ios_ifv", "google_aid"]
    );
}

// ============================================
// Output Format
// ============================================

#[test]
fn test_single_record_output() {
    let mut importer = EventImporter::new(IdentifierMode::Device, ["mcc", "mnc"]);
    importer.enqueue(sample_event(998, "SSETestEvent"));

    let out = String::from_utf8(drain(&mut importer, 4096)).unwrap();
    let lines: Vec<&str> = out.split('\n').collect();

    assert_eq!(lines.len(), 3, "header, one row, trailing empty: {out:?}");
    assert_eq!(
        lines[0],
        "appmetrica_device_id,application_id,event_name,event_timestamp,mcc,mnc"
    );
    assert_eq!(lines[2], "");

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields, vec!["998", "84126", "SSETestEvent", "1700000000", "250", "25000"]);
    assert_eq!(importer.state(), ImporterState::Finished);
}

#[test]
fn test_profile_mode_output() {
    let mut importer =
        EventImporter::new(IdentifierMode::Profile, ["os_name", "app_version_name", "mnc"]);
    importer.enqueue(sample_event(1, "login").with_profile_id("user-42"));

    let out = String::from_utf8(drain(&mut importer, 4096)).unwrap();

    assert_eq!(
        out,
        "profile_id,application_id,event_name,event_timestamp,os_name,app_version_name,mnc\n\
         user-42,84126,login,1700000000,android,,25000\n"
    );
}

#[test]
fn test_every_row_has_header_width() {
    let columns = [
        "app_package_name",
        "connection_type",
        "device_ipv6",
        "event_json",
        "ios_ifa",
        "mcc",
        "windows_aid",
    ];
    let mut importer = EventImporter::new(IdentifierMode::Device, columns);
    importer.enqueue_many((0..25).map(|i| sample_event(i, "tick")));

    let out = String::from_utf8(drain(&mut importer, 13)).unwrap();
    let widths: Vec<usize> = out.lines().map(|l| l.split(',').count()).collect();

    assert_eq!(widths.len(), 26);
    assert!(widths.iter().all(|w| *w == 4 + columns.len()));
}

// ============================================
// Queue Order
// ============================================

#[test]
fn test_queue_is_consumed_last_in_first_out() {
    let mut importer = EventImporter::new(IdentifierMode::Device, Vec::<&str>::new());
    importer.enqueue(sample_event(1, "A"));
    importer.enqueue(sample_event(2, "B"));
    importer.enqueue_many(vec![sample_event(3, "C"), sample_event(4, "D")]);

    let out = String::from_utf8(drain(&mut importer, 4096)).unwrap();
    let names: Vec<&str> = out
        .lines()
        .skip(1)
        .map(|l| l.split(',').nth(2).unwrap())
        .collect();

    assert_eq!(names, vec!["D", "C", "B", "A"]);
}

#[test]
fn test_enqueue_during_rows_is_emitted_next() {
    let mut importer = EventImporter::new(IdentifierMode::Device, ["mcc"]);
    importer.enqueue_many(vec![
        sample_event(1, "A"),
        sample_event(2, "B"),
        sample_event(3, "C"),
    ]);

    let mut header = [0u8; 4096];
    let (written, done) = importer.produce(&mut header);
    assert!(!done);
    assert_eq!(
        &header[..written],
        b"appmetrica_device_id,application_id,event_name,event_timestamp,mcc\n"
    );

    // Start row C but leave most of it buffered.
    let mut partial = [0u8; 3];
    let (written, done) = importer.produce(&mut partial);
    assert_eq!((written, done), (3, false));
    assert_eq!(importer.state(), ImporterState::RowPhase);

    importer.enqueue(sample_event(4, "late"));
    assert!(importer.error().is_none());

    let mut out = partial.to_vec();
    out.extend(drain(&mut importer, 4096));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "3,84126,C,1700000000,250\n\
         4,84126,late,1700000000,250\n\
         2,84126,B,1700000000,250\n\
         1,84126,A,1700000000,250\n"
    );
}

// ============================================
// Lifecycle
// ============================================

#[test]
fn test_reset_after_finish_allows_reuse() {
    let mut importer = EventImporter::new(IdentifierMode::Profile, ["mcc"]);
    importer.enqueue(sample_event(1, "first").with_profile_id("p1"));
    let first = drain(&mut importer, 4096);
    assert!(importer.is_finished());

    importer.reset();
    assert_eq!(importer.state(), ImporterState::Initial);
    assert_eq!(importer.pending(), 0);
    assert_eq!(importer.identifier_mode(), IdentifierMode::Profile);
    assert_eq!(importer.columns().names(), vec!["mcc"]);

    importer.enqueue(sample_event(1, "second").with_profile_id("p2"));
    let second = String::from_utf8(drain(&mut importer, 4096)).unwrap();

    assert_eq!(
        second,
        "profile_id,application_id,event_name,event_timestamp,mcc\n\
         p2,84126,second,1700000000,250\n"
    );
    assert!(String::from_utf8(first).unwrap().contains("p1,84126,first"));
}

#[test]
fn test_reset_mid_stream_discards_pending_output() {
    let mut importer = EventImporter::new(IdentifierMode::Device, ["mcc"]);
    importer.enqueue_many((0..3).map(|i| sample_event(i, "x")));
    let mut dest = [0u8; 10];
    importer.produce(&mut dest);
    importer.produce(&mut dest);

    importer.reset();

    let mut dest = [0u8; 64];
    assert_eq!(importer.produce(&mut dest), (0, true));
}

#[test]
fn test_end_of_stream_is_idempotent() {
    let mut importer = EventImporter::new(IdentifierMode::Device, ["mnc"]);
    importer.enqueue(sample_event(1, "a"));
    drain(&mut importer, 4096);

    let mut dest = [0u8; 32];
    for _ in 0..5 {
        assert_eq!(importer.produce(&mut dest), (0, true));
    }
    assert!(importer.error().is_none());
}

#[test]
fn test_enqueue_after_finish_records_error() {
    let mut importer = EventImporter::new(IdentifierMode::Device, ["mnc"]);
    importer.enqueue(sample_event(1, "a"));
    drain(&mut importer, 4096);

    importer.enqueue_many(vec![sample_event(2, "late")]);

    assert_eq!(importer.error(), Some(&ImporterError::EnqueueAfterFinish));
    assert_eq!(importer.pending(), 0);
    assert!(drain(&mut importer, 4096).is_empty());
}

// ============================================
// Chunking
// ============================================

#[test]
fn test_one_byte_buffer_matches_unbounded_output() {
    let build = || {
        let mut importer = EventImporter::new(
            IdentifierMode::Device,
            ["os_name", "os_version", "device_model", "mcc", "mnc"],
        );
        importer.enqueue_many((0..7).map(|i| sample_event(i * 1000, "chunked")));
        importer
    };

    let mut tiny = build();
    let mut large = build();

    let a = drain(&mut tiny, 1);
    let b = drain(&mut large, 1 << 20);

    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_read_and_chunks_match_produce() {
    let build = || {
        let mut importer = EventImporter::new(IdentifierMode::Device, ["mcc"]);
        importer.enqueue_many((0..4).map(|i| sample_event(i, "io")));
        importer
    };

    let expected = drain(&mut build(), 4096);

    let mut via_read = Vec::new();
    build().read_to_end(&mut via_read).unwrap();

    let via_chunks: Vec<u8> = build().into_chunks(5).flatten().collect();

    assert_eq!(via_read, expected);
    assert_eq!(via_chunks, expected);
}

// ============================================
// Configuration Locking
// ============================================

#[test]
fn test_configuration_locked_after_rows() {
    appmetrica_core::logging::init_test();

    let mut importer = EventImporter::new(IdentifierMode::Device, ["mcc", "mnc"]);
    importer.enqueue_many((0..2).map(|i| sample_event(i, "x")));

    let mut dest = [0u8; 4096];
    importer.produce(&mut dest); // header
    importer.produce(&mut dest); // first row

    importer.set_identifier_mode(IdentifierMode::Profile);
    assert_eq!(importer.error(), Some(&ImporterError::IdentifierModeLocked));

    importer.set_columns(["os_name"]);

    assert_eq!(importer.identifier_mode(), IdentifierMode::Device);
    assert_eq!(importer.columns().names(), vec!["mcc", "mnc"]);
    assert_eq!(importer.error(), Some(&ImporterError::IdentifierModeLocked));

    let rest = String::from_utf8(drain(&mut importer, 4096)).unwrap();
    assert_eq!(rest.split(',').count(), 6);
}

// ============================================
// Records from JSON Lines
// ============================================

#[test]
fn test_jsonl_records_encode() {
    let input = r#"{"application_id":5,"appmetrica_device_id":11,"event_name":"open","event_timestamp":100,"os_name":"ios"}
{"application_id":5,"appmetrica_device_id":12,"event_name":"close","event_timestamp":200}
"#;
    let events = read_events(input.as_bytes()).unwrap();

    let mut importer = EventImporter::new(IdentifierMode::Device, ["os_name"]);
    importer.enqueue_many(events);

    let out = String::from_utf8(drain(&mut importer, 64)).unwrap();
    assert_eq!(
        out,
        "appmetrica_device_id,application_id,event_name,event_timestamp,os_name\n\
         12,5,close,200,\n\
         11,5,open,100,ios\n"
    );
}
