//! Per-document drawing session and the frame-driven tick loop.
//!
//! [`Session`] owns all temporal state (debouncer, cursor cooldowns, open
//! stroke, pages) and the drawing surface. [`TickLoop`] polls a
//! [`LandmarkSource`] once per scheduled tick, feeds the session, and
//! reschedules itself through a [`TickScheduler`] while active.

use crate::config::ScribeConfig;
use crate::cursor::{ControlActivator, CursorMapper, CursorState, Layout};
use crate::engine::{StrokeEngine, TickEffect};
use crate::feed::{FeedAction, LandmarkSource, SourcePoll};
use crate::gallery::{DocumentRecord, PageRecord};
use crate::gesture::{Gesture, GestureClassifier};
use crate::landmark::HandFrame;
use crate::mode::{Mode, ModeDebouncer};
use crate::page::{BackgroundRef, PageStore};
use crate::record::RecordRequest;
use crate::surface::{InkSurface, RasterImage};
use crate::ScribeResult;

/// What one hand tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Frame timestamp in milliseconds.
    pub timestamp_ms: u64,
    /// Raw classified gesture.
    pub gesture: Gesture,
    /// Debounced mode.
    pub mode: Mode,
    /// Cursor result, including the effective mode.
    pub cursor: CursorState,
    /// Stroke engine effect.
    pub effect: TickEffect,
}

/// One open document plus the state of the drawing pipeline.
#[derive(Debug)]
pub struct Session<S> {
    config: ScribeConfig,
    classifier: GestureClassifier,
    debouncer: ModeDebouncer,
    mapper: CursorMapper,
    engine: StrokeEngine,
    pages: PageStore,
    layout: Layout,
    surface: S,
}

impl<S: InkSurface> Session<S> {
    /// Start a session and paint the current page.
    #[must_use]
    pub fn new(config: ScribeConfig, layout: Layout, surface: S, pages: PageStore) -> Self {
        let mut session = Self {
            config,
            classifier: GestureClassifier::new(config.gesture),
            debouncer: ModeDebouncer::new(config.mode),
            mapper: CursorMapper::new(config.cursor),
            engine: StrokeEngine::new(config.ink),
            pages,
            layout,
            surface,
        };
        session.redraw();
        session
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// Debounced mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.debouncer.mode()
    }

    /// The document.
    #[must_use]
    pub const fn pages(&self) -> &PageStore {
        &self.pages
    }

    /// Stroke engine state.
    #[must_use]
    pub const fn engine(&self) -> &StrokeEngine {
        &self.engine
    }

    /// Screen layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Replace the screen layout, e.g. after a resize.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Drawing surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// End the session, returning the surface and the document.
    pub fn into_parts(mut self) -> (S, PageStore) {
        self.finish_stroke();
        (self.surface, self.pages)
    }

    /// Process one hand frame.
    pub fn tick(&mut self, frame: &HandFrame, activator: &mut dyn ControlActivator) -> TickReport {
        let now = frame.timestamp_ms;
        let gesture = self.classifier.classify(frame);
        let mode = self.debouncer.update(gesture, now);
        let cursor = self.mapper.map(frame, &self.layout, mode, now, activator);
        let effect = self.engine.on_mode_tick(
            cursor.mode,
            cursor.canvas_point,
            self.pages.current_mut(),
            &mut self.surface,
        );
        tracing::trace!(now, ?gesture, ?mode, effective = ?cursor.mode, "Tick");
        TickReport {
            timestamp_ms: now,
            gesture,
            mode,
            cursor,
            effect,
        }
    }

    /// A processed frame had no hand. Drawing state is kept as is.
    pub fn no_hand(&mut self, timestamp_ms: u64) {
        self.mapper.reset_smoothing();
        tracing::trace!(timestamp_ms, "No hand");
    }

    /// Close the open stroke on the current page.
    pub fn finish_stroke(&mut self) -> TickEffect {
        self.engine.finish(self.pages.current_mut(), &mut self.surface)
    }

    /// Repaint the current page.
    pub fn redraw(&mut self) {
        self.engine.redraw(self.pages.current(), &mut self.surface);
    }

    /// Apply a document action.
    ///
    /// # Errors
    ///
    /// Returns the page store error for rejected navigation or deletion;
    /// the document is unchanged in that case.
    pub fn apply(&mut self, action: &FeedAction) -> ScribeResult<()> {
        match action {
            FeedAction::AddPage => {
                self.add_page();
                Ok(())
            }
            FeedAction::NextPage => self.switch_page(self.pages.current_index() + 1),
            FeedAction::PreviousPage => self.change_page(PageStore::previous_page),
            FeedAction::DeletePage => self.delete_page(self.pages.current_index()),
            FeedAction::ClearPage => {
                self.clear_page();
                Ok(())
            }
            FeedAction::SetBackground { uri } => {
                self.set_background(Some(BackgroundRef::new(uri.clone())));
                Ok(())
            }
            FeedAction::RemoveBackground => {
                self.set_background(None);
                Ok(())
            }
        }
    }

    /// Append a page and switch to it. Returns its index.
    pub fn add_page(&mut self) -> usize {
        self.finish_stroke();
        let index = self.pages.add_page();
        self.redraw();
        index
    }

    /// Switch to the page at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScribeError::PageNotFound`] for an invalid index.
    pub fn switch_page(&mut self, index: usize) -> ScribeResult<()> {
        self.change_page(|pages| pages.switch_to(index))
    }

    /// Delete the page at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScribeError::LastPage`] for the only page, or
    /// [`crate::ScribeError::PageNotFound`] for an invalid index.
    pub fn delete_page(&mut self, index: usize) -> ScribeResult<()> {
        self.change_page(|pages| pages.delete_page(index).map(drop))
    }

    /// Remove every stroke from the current page.
    pub fn clear_page(&mut self) {
        self.engine.abandon();
        self.pages.current_mut().clear_strokes();
        tracing::info!(page = self.pages.current_index(), "Page cleared");
        self.redraw();
    }

    /// Set or remove the current page background.
    pub fn set_background(&mut self, background: Option<BackgroundRef>) {
        self.finish_stroke();
        self.pages.current_mut().set_background(background);
        self.redraw();
    }

    /// Raster snapshot of the current page.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot encode its contents.
    pub fn snapshot_current(&mut self) -> ScribeResult<RasterImage> {
        self.finish_stroke();
        self.engine.snapshot(self.pages.current_mut(), &mut self.surface)
    }

    /// Render every page and package the document for the gallery.
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails to encode.
    pub fn to_document(&mut self, timestamp_ms: u64) -> ScribeResult<DocumentRecord> {
        self.finish_stroke();
        let engine = &self.engine;
        let surface = &mut self.surface;
        let pages: ScribeResult<Vec<PageRecord>> = self
            .pages
            .pages_mut()
            .iter_mut()
            .map(|page| {
                let raster = engine.snapshot(page, &mut *surface)?;
                Ok(PageRecord {
                    raster,
                    strokes: Some(page.strokes().to_vec()),
                    background: page.background().cloned(),
                })
            })
            .collect();
        // Rendering other pages replaced the live view
        self.redraw();
        Ok(DocumentRecord {
            name: self.pages.name.clone(),
            timestamp_ms,
            pages: pages?,
        })
    }

    /// Build a record-generation request from every page.
    ///
    /// # Errors
    ///
    /// Returns an error if a page fails to encode or the request is invalid.
    pub fn record_request(
        &mut self,
        instruction: &str,
        reference_text: Option<String>,
    ) -> ScribeResult<RecordRequest> {
        let document = self.to_document(self.pages.created_ms)?;
        let images = document.pages.into_iter().map(|p| p.raster).collect();
        RecordRequest::new(images, reference_text, instruction)
    }

    fn change_page<F>(&mut self, change: F) -> ScribeResult<()>
    where
        F: FnOnce(&mut PageStore) -> ScribeResult<()>,
    {
        self.finish_stroke();
        change(&mut self.pages)?;
        self.redraw();
        Ok(())
    }
}

/// Handle of a scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Host timer driving the tick loop, e.g. a display refresh callback.
pub trait TickScheduler {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Request one more tick.
    fn schedule(&mut self) -> TickHandle;

    /// Cancel a requested tick.
    fn cancel(&mut self, handle: TickHandle);
}

/// Result of one [`TickLoop::run_tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The loop was torn down; nothing ran.
    Inactive,
    /// Source not ready; rescheduled.
    NotReady,
    /// No hand this tick; rescheduled.
    NoHand,
    /// A hand frame was processed.
    Ticked(TickReport),
    /// The source ended; the loop stopped.
    Exhausted,
}

/// Self-rescheduling tick driver.
#[derive(Debug)]
pub struct TickLoop<Src, Sch> {
    source: Src,
    scheduler: Sch,
    active: bool,
    pending: Option<TickHandle>,
}

impl<Src: LandmarkSource, Sch: TickScheduler> TickLoop<Src, Sch> {
    /// Create an inactive loop.
    #[must_use]
    pub const fn new(source: Src, scheduler: Sch) -> Self {
        Self {
            source,
            scheduler,
            active: false,
            pending: None,
        }
    }

    /// Activate and schedule the first tick.
    pub fn start(&mut self) {
        self.active = true;
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule());
        }
        tracing::debug!("Tick loop started");
    }

    /// Whether the loop will keep rescheduling.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The outstanding tick request, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// The landmark source.
    #[must_use]
    pub const fn source(&self) -> &Src {
        &self.source
    }

    /// The scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Sch {
        &self.scheduler
    }

    /// Run the tick that was scheduled.
    pub fn run_tick<S: InkSurface>(
        &mut self,
        session: &mut Session<S>,
        activator: &mut dyn ControlActivator,
    ) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }
        self.pending = None;

        let now = self.scheduler.now_ms();
        let poll = self.source.poll(now);
        for action in self.source.drain_actions() {
            if let Err(e) = session.apply(&action) {
                tracing::warn!(?action, error = %e, "Action ignored");
            }
        }

        let outcome = match poll {
            SourcePoll::NotReady => TickOutcome::NotReady,
            SourcePoll::NoHand { timestamp_ms } => {
                session.no_hand(timestamp_ms);
                TickOutcome::NoHand
            }
            SourcePoll::Hand(frame) => TickOutcome::Ticked(session.tick(&frame, activator)),
            SourcePoll::Exhausted => {
                self.active = false;
                tracing::debug!("Landmark source exhausted");
                TickOutcome::Exhausted
            }
        };

        if self.active {
            self.pending = Some(self.scheduler.schedule());
        }
        outcome
    }

    /// Stop rescheduling and cancel the outstanding tick.
    pub fn teardown(&mut self) {
        self.active = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        tracing::debug!("Tick loop torn down");
    }

    /// Consume the loop, returning the source and scheduler.
    pub fn into_parts(self) -> (Src, Sch) {
        (self.source, self.scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ControlId;
    use crate::feed::ScriptedSource;
    use crate::surface::RecordingSurface;
    use crate::ScribeError;

    #[derive(Debug, Default)]
    struct ManualScheduler {
        now: u64,
        next: u64,
        scheduled: Vec<TickHandle>,
        cancelled: Vec<TickHandle>,
    }

    impl TickScheduler for ManualScheduler {
        fn now_ms(&self) -> u64 {
            self.now
        }

        fn schedule(&mut self) -> TickHandle {
            self.next += 1;
            self.now += 16;
            let handle = TickHandle(self.next);
            self.scheduled.push(handle);
            handle
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.cancelled.push(handle);
        }
    }

    fn session() -> Session<RecordingSurface> {
        Session::new(
            ScribeConfig::default(),
            Layout::canvas_only(800.0, 600.0),
            RecordingSurface::new(800, 600),
            PageStore::default(),
        )
    }

    fn never(_: &ControlId) -> bool {
        false
    }

    #[test]
    fn test_new_session_paints_page() {
        let session = session();
        assert_eq!(session.surface().redraw_count(), 1);
        assert_eq!(session.mode(), Mode::None);
    }

    #[test]
    fn test_loop_reschedules_until_exhausted() {
        let source = ScriptedSource::new([
            SourcePoll::NoHand { timestamp_ms: 0 },
            SourcePoll::NotReady,
        ]);
        let mut tick_loop = TickLoop::new(source, ManualScheduler::default());
        let mut session = session();

        assert_eq!(tick_loop.run_tick(&mut session, &mut never), TickOutcome::Inactive);
        tick_loop.start();
        assert_eq!(tick_loop.pending(), Some(TickHandle(1)));

        assert_eq!(tick_loop.run_tick(&mut session, &mut never), TickOutcome::NoHand);
        assert_eq!(tick_loop.run_tick(&mut session, &mut never), TickOutcome::NotReady);
        assert_eq!(tick_loop.pending(), Some(TickHandle(3)));
        assert_eq!(tick_loop.run_tick(&mut session, &mut never), TickOutcome::Exhausted);
        assert!(!tick_loop.is_active());
        assert!(tick_loop.pending().is_none());
        assert_eq!(tick_loop.scheduler().scheduled.len(), 3);
    }

    #[test]
    fn test_teardown_cancels_pending() {
        let source = ScriptedSource::new([SourcePoll::NotReady, SourcePoll::NotReady]);
        let mut tick_loop = TickLoop::new(source, ManualScheduler::default());
        let mut session = session();
        tick_loop.start();
        tick_loop.run_tick(&mut session, &mut never);
        tick_loop.teardown();

        assert!(!tick_loop.is_active());
        assert_eq!(tick_loop.scheduler().cancelled, vec![TickHandle(2)]);
        assert_eq!(tick_loop.run_tick(&mut session, &mut never), TickOutcome::Inactive);
        assert_eq!(tick_loop.source().remaining(), 1);
    }

    #[test]
    fn test_rejected_delete_leaves_document() {
        let mut session = session();
        let err = session.apply(&FeedAction::DeletePage).expect_err("rejected");
        assert!(matches!(err, ScribeError::LastPage));
        assert_eq!(session.pages().page_count(), 1);
    }

    #[test]
    fn test_page_actions_redraw() {
        let mut session = session();
        session.apply(&FeedAction::AddPage).expect("add");
        assert_eq!(session.pages().current_index(), 1);
        session.apply(&FeedAction::PreviousPage).expect("previous");
        assert_eq!(session.pages().current_index(), 0);
        assert!(session.apply(&FeedAction::PreviousPage).is_err());
        session.apply(&FeedAction::NextPage).expect("next");
        session
            .apply(&FeedAction::SetBackground {
                uri: "bg.png".to_string(),
            })
            .expect("background");
        assert!(session.pages().current().background().is_some());
        session.apply(&FeedAction::DeletePage).expect("delete");
        assert_eq!(session.pages().page_count(), 1);
        // initial paint, add, previous, next, background, delete
        assert_eq!(session.surface().redraw_count(), 6);
    }

    #[test]
    fn test_document_has_one_record_per_page() {
        let mut session = session();
        session.add_page();
        let document = session.to_document(99).expect("document");
        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.timestamp_ms, 99);
        assert_eq!(document.pages[0].strokes.as_deref().map(<[_]>::len), Some(0));
        assert_eq!(document.pages[0].raster.mime, "application/json");
    }
}
