//! Integration tests driving a session onto real pixels.

use airscribe_core::landmark::{INDEX_MCP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP, MIDDLE_TIP};
use airscribe_core::landmark::{PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP};
use airscribe_core::{
    BackgroundRef, ControlId, HandFrame, Landmark, Layout, Mode, PageStore, ScribeConfig, Session,
    TickEffect,
};
use airscribe_renderer::{ExportFormat, RasterSurface, SnapshotExporter};

fn frame(timestamp_ms: u64, tip: (f32, f32), base_y: f32, other_tip_y: f32) -> HandFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.7, 0.0); LANDMARK_COUNT];
    for base in [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP] {
        landmarks[base] = Landmark::new(tip.0, base_y, 0.0);
    }
    for other in [MIDDLE_TIP, RING_TIP, PINKY_TIP] {
        landmarks[other] = Landmark::new(tip.0, other_tip_y, 0.0);
    }
    landmarks[INDEX_TIP] = Landmark::new(tip.0, tip.1, 0.0);
    HandFrame::new(landmarks, timestamp_ms)
}

fn pointing(timestamp_ms: u64, x: f32) -> HandFrame {
    frame(timestamp_ms, (x, 0.44), 0.5, 0.58)
}

fn open_hand(timestamp_ms: u64) -> HandFrame {
    frame(timestamp_ms, (0.5, 0.4), 0.5, 0.4)
}

fn fist(timestamp_ms: u64, x: f32) -> HandFrame {
    frame(timestamp_ms, (x, 0.44), 0.3, 0.4)
}

fn never(_: &ControlId) -> bool {
    false
}

fn session() -> Session<RasterSurface> {
    Session::new(
        ScribeConfig::default(),
        Layout::canvas_only(800.0, 600.0),
        RasterSurface::new(800, 600).expect("surface"),
        PageStore::new("Raster", 0),
    )
}

/// Draw a horizontal stroke from x=400 to x=460 at y=264 and release it.
fn draw_line(session: &mut Session<RasterSurface>) {
    for (i, x) in [0.5, 0.475, 0.45, 0.425].into_iter().enumerate() {
        session.tick(&pointing(i as u64 * 16, x), &mut never);
    }
    let report = session.tick(&open_hand(64), &mut never);
    assert!(matches!(report.effect, TickEffect::Sealed(_)));
}

fn red_at(session: &Session<RasterSurface>, x: u32, y: u32) -> u8 {
    session
        .surface()
        .pixmap()
        .pixel(x, y)
        .map(|p| p.red())
        .expect("pixel in bounds")
}

// ==========================================================================
// Drawing
// ==========================================================================

#[test]
fn test_new_session_paints_background_colour() {
    let session = session();
    assert_eq!(red_at(&session, 0, 0), 255);
    assert_eq!(red_at(&session, 799, 599), 255);
}

#[test]
fn test_sealed_stroke_is_visible() {
    let mut session = session();
    draw_line(&mut session);

    assert_eq!(red_at(&session, 430, 264), 0);
    assert_eq!(red_at(&session, 430, 300), 255);
    assert_eq!(red_at(&session, 300, 264), 255);
}

#[test]
fn test_redraw_is_pixel_identical() {
    let mut session = session();
    draw_line(&mut session);
    let before = session.surface().pixmap().data().to_vec();

    session.redraw();
    assert_eq!(session.surface().pixmap().data(), before.as_slice());
}

#[test]
fn test_erase_clears_pixels() {
    let mut session = session();
    draw_line(&mut session);

    session.tick(&fist(100, 0.45), &mut never);
    let report = session.tick(&fist(170, 0.45), &mut never);
    assert_eq!(report.mode, Mode::Erase);
    assert_eq!(session.pages().current().stroke_count(), 0);
    assert_eq!(red_at(&session, 430, 264), 255);
}

#[test]
fn test_missing_background_still_renders_ink() {
    let mut session = session();
    draw_line(&mut session);
    session.set_background(Some(BackgroundRef::new("/no/such/background.png")));

    assert_eq!(red_at(&session, 430, 264), 0);
    assert_eq!(red_at(&session, 10, 10), 255);
}

// ==========================================================================
// Snapshots
// ==========================================================================

#[test]
fn test_snapshot_decodes_to_canvas_size() {
    let mut session = session();
    draw_line(&mut session);
    let snapshot = session.snapshot_current().expect("snapshot");
    assert_eq!(&snapshot.bytes[0..4], &[137, 80, 78, 71]);

    let decoded = image::load_from_memory(&snapshot.bytes)
        .expect("decode")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (800, 600));
    assert_eq!(decoded.get_pixel(430, 264).0[0], 0);
}

#[test]
fn test_snapshot_is_cached_until_page_changes() {
    let mut session = session();
    draw_line(&mut session);
    let first = session.snapshot_current().expect("snapshot");
    assert_eq!(session.pages().current().snapshot(), Some(&first));

    session.clear_page();
    assert!(session.pages().current().snapshot().is_none());
    let cleared = session.snapshot_current().expect("snapshot");
    assert_ne!(first, cleared);
}

#[test]
fn test_document_has_one_png_per_page() {
    let mut session = session();
    draw_line(&mut session);
    session.add_page();

    let document = session.to_document(5).expect("document");
    assert_eq!(document.pages.len(), 2);
    assert!(document.pages.iter().all(|p| p.raster.mime == "image/png"));
    assert_ne!(document.pages[0].raster, document.pages[1].raster);

    // The live view is back on the current (empty) page
    assert_eq!(red_at(&session, 430, 264), 255);
}

#[test]
fn test_jpeg_export_of_live_surface() {
    let mut session = session();
    draw_line(&mut session);
    let jpeg = SnapshotExporter::with_defaults()
        .export_surface(session.surface(), ExportFormat::Jpeg)
        .expect("jpeg");
    assert_eq!(&jpeg.bytes[0..2], &[0xFF, 0xD8]);
}
