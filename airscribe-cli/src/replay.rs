//! Offline replay of a recorded landmark feed.

use std::path::PathBuf;

use airscribe_core::{
    current_timestamp_ms, BackgroundRef, ControlId, GalleryStore, Layout, PageStore, ReplaySource,
    Session, TickHandle, TickLoop, TickOutcome, TickScheduler,
};
use airscribe_renderer::RasterSurface;
use anyhow::Context;

use crate::ReplayArgs;

/// Nominal tick spacing of a replay, one 60 Hz display frame.
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Scheduler that fires every requested tick immediately.
///
/// Time advances by [`FRAME_INTERVAL_MS`] per scheduled tick. Frame
/// timestamps in the recording drive the debouncer; this clock is only what
/// the source sees when polled.
#[derive(Debug, Clone, Default)]
pub struct ReplayScheduler {
    scheduled: u64,
    cancelled: u64,
}

impl ReplayScheduler {
    /// Create a scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks requested so far.
    #[must_use]
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }

    /// Ticks cancelled by a teardown.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl TickScheduler for ReplayScheduler {
    fn now_ms(&self) -> u64 {
        self.scheduled.saturating_sub(1) * FRAME_INTERVAL_MS
    }

    fn schedule(&mut self) -> TickHandle {
        self.scheduled += 1;
        TickHandle(self.scheduled)
    }

    fn cancel(&mut self, _handle: TickHandle) {
        self.cancelled += 1;
    }
}

/// What a replay produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Hand frames processed.
    pub frames: usize,
    /// Ticks with no hand.
    pub no_hand: usize,
    /// Ticks spent waiting for the source.
    pub not_ready: usize,
    /// Pages in the saved document.
    pub pages: usize,
    /// Committed strokes across all pages.
    pub strokes: usize,
    /// Page images written, in page order.
    pub files: Vec<PathBuf>,
    /// Gallery index of the saved document.
    pub gallery_index: usize,
}

/// Replay `args.recording` and save the result under `args.out`.
///
/// # Errors
///
/// Returns an error if the recording or config cannot be loaded, the canvas
/// cannot be created, or the output cannot be written.
pub async fn run_replay(args: &ReplayArgs) -> anyhow::Result<ReplaySummary> {
    let config = args.resolve_config().await?;

    let recording = tokio::fs::read_to_string(&args.recording)
        .await
        .with_context(|| format!("Failed to read recording {}", args.recording.display()))?;
    let source = ReplaySource::from_jsonl(&recording)?;
    tracing::info!(
        recording = %args.recording.display(),
        events = source.remaining(),
        "Recording loaded"
    );

    let (width, height) = (config.canvas.width, config.canvas.height);
    let surface = RasterSurface::new(width, height)?;
    #[allow(clippy::cast_precision_loss)]
    let layout = Layout::canvas_only(width as f32, height as f32);
    let pages = PageStore::new(args.name.clone(), current_timestamp_ms());
    let mut session = Session::new(config, layout, surface, pages);
    if let Some(uri) = &args.background {
        session.set_background(Some(BackgroundRef::new(uri.clone())));
    }

    let mut summary = ReplaySummary::default();
    let mut activator = |id: &ControlId| {
        tracing::info!(control = %id, "Control activated");
        true
    };
    let mut tick_loop = TickLoop::new(source, ReplayScheduler::new());
    tick_loop.start();
    while tick_loop.is_active() {
        match tick_loop.run_tick(&mut session, &mut activator) {
            TickOutcome::Ticked(_) => summary.frames += 1,
            TickOutcome::NoHand => summary.no_hand += 1,
            TickOutcome::NotReady => summary.not_ready += 1,
            TickOutcome::Inactive | TickOutcome::Exhausted => {}
        }
    }
    tick_loop.teardown();
    tracing::info!(
        frames = summary.frames,
        no_hand = summary.no_hand,
        "Replay finished"
    );

    let document = session.to_document(current_timestamp_ms())?;
    summary.pages = document.pages.len();
    summary.strokes = document
        .pages
        .iter()
        .map(|p| p.strokes.as_ref().map_or(0, Vec::len))
        .sum();

    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    for (index, page) in document.pages.iter().enumerate() {
        let path = args.out.join(format!("page-{}.png", index + 1));
        tokio::fs::write(&path, &page.raster.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        summary.files.push(path);
    }

    let gallery = GalleryStore::with_data_dir(&args.out)?;
    summary.gallery_index = gallery.add(document)?;
    tracing::info!(
        out = %args.out.display(),
        pages = summary.pages,
        strokes = summary.strokes,
        "Document saved"
    );

    Ok(summary)
}
