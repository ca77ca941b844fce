//! End-to-end replay tests: recording file in, page images and gallery out.

use std::path::Path;

use airscribe_cli::{run_replay, CliArgs, Command, ReplayArgs};
use airscribe_core::landmark::{INDEX_MCP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP, MIDDLE_TIP};
use airscribe_core::landmark::{PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP};
use airscribe_core::{FeedAction, FeedEvent, GalleryStore, HandFrame, Landmark};
use clap::Parser;

fn frame(timestamp_ms: u64, tip: (f32, f32), base_y: f32, other_tip_y: f32) -> FeedEvent {
    let mut landmarks = vec![Landmark::new(0.5, 0.7, 0.0); LANDMARK_COUNT];
    for base in [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP] {
        landmarks[base] = Landmark::new(tip.0, base_y, 0.0);
    }
    for other in [MIDDLE_TIP, RING_TIP, PINKY_TIP] {
        landmarks[other] = Landmark::new(tip.0, other_tip_y, 0.0);
    }
    landmarks[INDEX_TIP] = Landmark::new(tip.0, tip.1, 0.0);
    FeedEvent::Frame(HandFrame::new(landmarks, timestamp_ms))
}

fn pointing(timestamp_ms: u64, x: f32) -> FeedEvent {
    frame(timestamp_ms, (x, 0.44), 0.5, 0.58)
}

fn open_hand(timestamp_ms: u64) -> FeedEvent {
    frame(timestamp_ms, (0.5, 0.4), 0.5, 0.4)
}

fn write_recording(path: &Path, events: &[FeedEvent]) {
    let lines: Vec<String> = events
        .iter()
        .map(|e| serde_json::to_string(e).expect("serialize"))
        .collect();
    std::fs::write(path, lines.join("\n")).expect("write recording");
}

fn args(recording: &Path, out: &Path, extra: &[&str]) -> ReplayArgs {
    let mut argv = vec![
        "airscribe".to_string(),
        "replay".to_string(),
        "--recording".to_string(),
        recording.display().to_string(),
        "--out".to_string(),
        out.display().to_string(),
    ];
    argv.extend(extra.iter().map(ToString::to_string));
    match CliArgs::try_parse_from(argv).expect("parse").command {
        Command::Replay(args) => args,
    }
}

/// One stroke on page 1, an `add_page` action, one stroke on page 2.
fn two_page_recording() -> Vec<FeedEvent> {
    let mut events = vec![FeedEvent::NotReady];
    for (i, x) in [0.5, 0.475, 0.45, 0.425].into_iter().enumerate() {
        events.push(pointing(i as u64 * 16, x));
    }
    events.push(FeedEvent::NoHand { timestamp_ms: 56 });
    events.push(open_hand(64));
    events.push(FeedEvent::Action {
        action: FeedAction::AddPage,
    });
    for (i, x) in [0.3, 0.28, 0.26].into_iter().enumerate() {
        events.push(pointing(200 + i as u64 * 16, x));
    }
    events.push(open_hand(248));
    events
}

// ==========================================================================
// Replay
// ==========================================================================

#[tokio::test]
async fn test_replay_writes_pages_and_gallery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recording = dir.path().join("feed.jsonl");
    let out = dir.path().join("out");
    write_recording(&recording, &two_page_recording());

    let summary = run_replay(&args(&recording, &out, &["--name", "Ward round"]))
        .await
        .expect("replay");

    assert_eq!(summary.frames, 9);
    assert_eq!(summary.no_hand, 1);
    assert_eq!(summary.not_ready, 1);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.strokes, 2);
    assert_eq!(summary.gallery_index, 0);
    assert_eq!(
        summary.files,
        vec![out.join("page-1.png"), out.join("page-2.png")]
    );
    for file in &summary.files {
        let bytes = std::fs::read(file).expect("page image");
        assert_eq!(&bytes[0..4], &[137, 80, 78, 71]);
    }

    let gallery = GalleryStore::with_data_dir(&out).expect("gallery");
    assert_eq!(gallery.len(), 1);
    let document = gallery.get(0).expect("document");
    assert_eq!(document.name, "Ward round");
    let pages = document.to_page_store().expect("pages");
    assert_eq!(pages.page_count(), 2);
    assert_eq!(pages.page(1).map(airscribe_core::Page::stroke_count), Some(1));
}

#[tokio::test]
async fn test_second_replay_appends_to_gallery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recording = dir.path().join("feed.jsonl");
    let out = dir.path().join("out");
    write_recording(&recording, &two_page_recording());

    run_replay(&args(&recording, &out, &[])).await.expect("first");
    let summary = run_replay(&args(&recording, &out, &[])).await.expect("second");
    assert_eq!(summary.gallery_index, 1);
}

#[tokio::test]
async fn test_replay_honours_canvas_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recording = dir.path().join("feed.jsonl");
    let out = dir.path().join("out");
    write_recording(&recording, &[pointing(0, 0.5), open_hand(16)]);

    let summary = run_replay(&args(&recording, &out, &["--width", "320", "--height", "240"]))
        .await
        .expect("replay");
    let bytes = std::fs::read(&summary.files[0]).expect("page image");
    let decoded = image::load_from_memory(&bytes).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (320, 240));
}

// ==========================================================================
// Failures
// ==========================================================================

#[tokio::test]
async fn test_missing_recording_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = run_replay(&args(
        &dir.path().join("absent.jsonl"),
        &dir.path().join("out"),
        &[],
    ))
    .await;
    assert!(result.is_err());
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_malformed_recording_reports_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recording = dir.path().join("feed.jsonl");
    std::fs::write(&recording, "{\"type\":\"not_ready\"}\n{broken\n").expect("write");

    let err = run_replay(&args(&recording, &dir.path().join("out"), &[]))
        .await
        .expect_err("malformed");
    assert!(format!("{err:#}").contains("line 2"));
}
