use crate::view::{Snapshot, View, pulse_scale, record_indicator, resolve_note, short_id};

use std::time::Duration;

use voice_notes_core::{NoteId, NoteRecord, SessionMode, demo_notes};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// WHAT: Pulse rises to 1.2 over one second and falls back over the next
/// WHY: The record button breathes while the microphone is open
#[test]
fn given_elapsed_times_when_computing_pulse_then_triangle_wave() {
    assert!(close(pulse_scale(Duration::ZERO), 1.0));
    assert!(close(pulse_scale(Duration::from_millis(500)), 1.1));
    assert!(close(pulse_scale(Duration::from_millis(1000)), 1.2));
    assert!(close(pulse_scale(Duration::from_millis(1500)), 1.1));
    assert!(close(pulse_scale(Duration::from_millis(2000)), 1.0));
    assert!(close(pulse_scale(Duration::from_millis(3000)), 1.2));
}

/// WHAT: Indicator shows elapsed time only while recording
/// WHY: The record button mirrors the session mode
#[test]
fn given_modes_when_rendering_indicator_then_reflects_recording() {
    let recording = record_indicator(&SessionMode::Recording, Some(Duration::from_secs(65)));
    let idle = record_indicator(&SessionMode::Idle, None);

    assert!(recording.contains("REC 01:05"));
    assert!(!idle.contains("REC"));
}

/// WHAT: Rendered list shows count, filter and playing marker
/// WHY: The list is how the user sees session state
#[test]
fn given_snapshot_when_rendering_then_count_filter_and_marker_shown() {
    // Given: Two visible notes, one playing, with a filter
    let mut visible: Vec<NoteRecord> = demo_notes().into_iter().take(2).collect();
    visible[1].is_playing = true;
    let mut view = View::default();
    view.set_query("notes");
    let snapshot = Snapshot {
        mode: SessionMode::Playing(NoteId::from("2")),
        visible,
        total: 6,
        recording_elapsed: None,
    };

    // When: Rendering
    let out = view.render(&snapshot);

    // Then: Count, trimmed query and marker on the playing row
    assert!(out.contains("6 RECORDINGS"));
    assert!(out.contains("Search: \"notes\""));
    let playing_row = out.lines().find(|l| l.contains("Meeting Notes"));
    assert!(playing_row.is_some_and(|l| l.starts_with('>')));
    let idle_row = out.lines().find(|l| l.contains("Morning Thoughts"));
    assert!(idle_row.is_some_and(|l| l.starts_with(' ')));
}

/// WHAT: Empty filter result renders a placeholder
/// WHY: An empty list should not look like a rendering failure
#[test]
fn given_no_visible_notes_when_rendering_then_placeholder() {
    let snapshot = Snapshot {
        mode: SessionMode::Idle,
        visible: Vec::new(),
        total: 6,
        recording_elapsed: None,
    };

    let out = View::default().render(&snapshot);

    assert!(out.contains("(no recordings)"));
}

/// WHAT: Notes resolve by exact id or unique prefix
/// WHY: Generated ids are long; the list shows only their start
#[test]
fn given_ids_when_resolving_then_exact_or_unique_prefix() {
    // Given: Demo ids plus two generated-looking ids sharing a prefix
    let mut notes = demo_notes();
    notes.push(NoteRecord::placeholder("abc123-x", "X", "00:01", "Today"));
    notes.push(NoteRecord::placeholder("abc999-y", "Y", "00:01", "Today"));

    // When/Then: Exact, unique prefix, ambiguous prefix, unknown, empty
    assert_eq!(resolve_note("3", &notes), Some(NoteId::from("3")));
    assert_eq!(resolve_note("abc9", &notes), Some(NoteId::from("abc999-y")));
    assert_eq!(resolve_note("abc", &notes), None);
    assert_eq!(resolve_note("zzz", &notes), None);
    assert_eq!(resolve_note("", &notes), None);
}

/// WHAT: Long ids are shortened, short ids kept
/// WHY: Keeps list rows aligned
#[test]
fn given_ids_when_shortened_then_cut_to_eight() {
    assert_eq!(
        short_id(&NoteId::from("0f8c2d1e-1234-4abc-9def-000000000000")),
        "0f8c2d1e"
    );
    assert_eq!(short_id(&NoteId::from("1")), "1");
}

/// WHAT: Search text is kept exactly as typed
/// WHY: A leading space narrows the match to word starts, as in the list filter
#[test]
fn given_padded_query_when_set_then_stored_verbatim() {
    // Given: A view
    let mut view = View::default();

    // When: Setting a query with surrounding spaces
    view.set_query(" Notes ");

    // Then: Nothing is trimmed
    assert_eq!(view.query(), " Notes ");

    // When/Then: Clearing empties it
    view.clear_query();
    assert_eq!(view.query(), "");
}
