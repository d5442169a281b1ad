//! The book session.
//!
//! [`BookSession`] owns the page states, the cursor, the hover identity and
//! the pending catch-up step. The host drives it from its frame callback:
//!
//! ```ignore
//! let mut session = BookSession::new(book, BookConfig::default())?;
//! session.set_page(5, now_ms);
//! // every frame
//! let hover = session.tick(now_ms, delta, pointer, &picker);
//! for page in session.pages() { /* draw with page.bone_angles(), page.z */ }
//! ```

pub mod cursor;
pub mod ui;

pub use cursor::{BookCursor, PendingStep};
pub use ui::NavigationUi;

use crate::config::BookConfig;
use crate::error::Result;
use crate::geometry::skeleton;
use crate::interaction::{HoverEvent, PagePicker, PointerSource};
use crate::page::{self, PageFrame, PageState};
use crate::types::BookContent;
use glam::{Mat4, Vec2, Vec3};

type NavigationListener = Box<dyn FnMut(&NavigationUi)>;

/// Interactive state of one open book.
pub struct BookSession {
    book: BookContent,
    config: BookConfig,
    pages: Vec<PageState>,
    cursor: BookCursor,
    pending: Option<PendingStep>,
    hovered: Option<usize>,
    listeners: Vec<NavigationListener>,
}

impl std::fmt::Debug for BookSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookSession")
            .field("pages", &self.pages.len())
            .field("cursor", &self.cursor)
            .field("pending", &self.pending)
            .field("hovered", &self.hovered)
            .finish()
    }
}

impl BookSession {
    /// Create a session on the front cover.
    pub fn new(book: BookContent, config: BookConfig) -> Result<Self> {
        book.validate()?;
        config.validate()?;

        let bone_count = config.dimensions.bone_count();
        let pages = (0..book.len()).map(|i| PageState::new(i, bone_count)).collect();
        let cursor = BookCursor::new(book.len());

        Ok(Self {
            book,
            config,
            pages,
            cursor,
            pending: None,
            hovered: None,
            listeners: Vec::new(),
        })
    }

    /// Call `listener` whenever the navigation controls change.
    pub fn subscribe(&mut self, listener: impl FnMut(&NavigationUi) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn book(&self) -> &BookContent {
        &self.book
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageState] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&PageState> {
        self.pages.get(index)
    }

    pub fn cursor(&self) -> &BookCursor {
        &self.cursor
    }

    /// Due time of the outstanding catch-up step, if any.
    pub fn pending_step(&self) -> Option<PendingStep> {
        self.pending
    }

    /// Page currently under the pointer.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Current state of the navigation controls.
    pub fn ui(&self) -> NavigationUi {
        NavigationUi::from_cursor(&self.cursor)
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Navigate to `page`, clamped to the book. Replaces any pending catch-up
    /// step with one scheduled from the delayed page as it stands now.
    pub fn set_page(&mut self, page: i64, now_ms: f64) -> usize {
        let selected = self.cursor.set_current(page);
        log::info!(
            "navigate to page {} (requested {}, delayed at {})",
            selected,
            page,
            self.cursor.delayed()
        );

        self.pending = PendingStep::schedule(&self.cursor, &self.config.catch_up, now_ms);
        self.notify();
        selected
    }

    pub fn next_page(&mut self, now_ms: f64) -> usize {
        self.set_page(self.cursor.current() as i64 + 1, now_ms)
    }

    pub fn previous_page(&mut self, now_ms: f64) -> usize {
        self.set_page(self.cursor.current() as i64 - 1, now_ms)
    }

    /// Fire every catch-up step due by `now_ms`. Returns how many fired.
    ///
    /// Each step is scheduled from the due time of the one before it, so a
    /// late poll replays the steps it missed.
    pub fn advance_timers(&mut self, now_ms: f64) -> usize {
        let mut fired = 0;
        while let Some(step) = self.pending {
            if step.due_ms > now_ms {
                break;
            }
            self.pending = None;
            if let Some(delayed) = self.cursor.step() {
                log::debug!("delayed page -> {} at {:.0}ms", delayed, step.due_ms);
                fired += 1;
                self.notify();
            }
            self.pending = PendingStep::schedule(&self.cursor, &self.config.catch_up, step.due_ms);
        }
        fired
    }

    // ── Frame ───────────────────────────────────────────────────────────────

    /// Run due timers, then update every page for this frame.
    pub fn frame(&mut self, now_ms: f64, delta: f32) {
        self.advance_timers(now_ms);

        let page_count = self.pages.len();
        let delayed = self.cursor.delayed();
        for page in &mut self.pages {
            let frame = PageFrame::for_page(page.index(), page_count, now_ms, delta, delayed);
            page::update(page, &frame, &self.config);
        }
    }

    /// One full frame: kinematics, then picking, then hover notifications.
    pub fn tick(
        &mut self,
        now_ms: f64,
        delta: f32,
        pointer: Option<Vec2>,
        picker: &dyn PagePicker,
    ) -> Vec<HoverEvent> {
        self.frame(now_ms, delta);
        let hit = pointer.and_then(|p| picker.pick(self, p));
        self.pointer_moved(hit)
    }

    /// One frame with hover driven by `source`. Host-picked hover is kept
    /// as reported; only built-in picking runs the picker.
    pub fn frame_with_pointer(
        &mut self,
        now_ms: f64,
        delta: f32,
        source: PointerSource,
        picker: &dyn PagePicker,
    ) -> Vec<HoverEvent> {
        match source {
            PointerSource::BuiltIn(pointer) => self.tick(now_ms, delta, pointer, picker),
            PointerSource::Host => {
                self.frame(now_ms, delta);
                Vec::new()
            }
        }
    }

    // ── Pointer ─────────────────────────────────────────────────────────────

    /// Report the page now under the pointer. Emits a leave for the previous
    /// page and an enter for the new one; nothing if it did not change.
    pub fn pointer_moved(&mut self, hit: Option<usize>) -> Vec<HoverEvent> {
        let hit = hit.filter(|&i| i < self.pages.len());
        if hit == self.hovered {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.hovered.take() {
            page::on_leave(&mut self.pages[previous]);
            events.push(HoverEvent::Leave(previous));
        }
        if let Some(index) = hit {
            page::on_enter(&mut self.pages[index]);
            events.push(HoverEvent::Enter(index));
        }
        self.hovered = hit;
        log::trace!("hover {:?}", events);
        events
    }

    /// Pointer left the viewport.
    pub fn pointer_left(&mut self) -> Vec<HoverEvent> {
        self.pointer_moved(None)
    }

    /// Click at the current pointer position. Returns the selected page, or
    /// `None` when no page is hovered.
    pub fn click(&mut self, now_ms: f64) -> Option<usize> {
        let index = self.hovered?;
        let target = page::on_click(&mut self.pages[index]);
        Some(self.set_page(target as i64, now_ms))
    }

    // ── Pose ────────────────────────────────────────────────────────────────

    /// Placement of a page in book space.
    pub fn page_transform(&self, index: usize) -> Option<Mat4> {
        let page = self.pages.get(index)?;
        Some(Mat4::from_translation(Vec3::new(0.0, 0.0, page.z)))
    }

    /// Book-space world matrices of a page's bones.
    pub fn bone_matrices(&self, index: usize) -> Option<Vec<Mat4>> {
        let page = self.pages.get(index)?;
        let base = self.page_transform(index)?;
        Some(
            skeleton::compose(page.bone_angles(), &self.config.dimensions)
                .into_iter()
                .map(|m| base * m)
                .collect(),
        )
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let ui = self.ui();
        for listener in &mut self.listeners {
            listener(&ui);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageContent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(pages: usize) -> BookSession {
        let book = BookContent::new(vec![PageContent::default(); pages]).unwrap();
        BookSession::new(book, BookConfig::default()).unwrap()
    }

    /// Poll the timer every millisecond and record (time, delayed) per step.
    fn run_timers(session: &mut BookSession, from_ms: f64, until_ms: f64) -> Vec<(f64, usize)> {
        let mut steps = Vec::new();
        let mut now = from_ms;
        while now <= until_ms {
            if session.advance_timers(now) > 0 {
                steps.push((now, session.cursor().delayed()));
            }
            now += 1.0;
        }
        steps
    }

    #[test]
    fn test_initial_state() {
        let s = session(13);
        assert_eq!(s.cursor().current(), 0);
        assert_eq!(s.cursor().delayed(), 0);
        assert!(s.pending_step().is_none());
        assert!(s.hovered().is_none());
        assert_eq!(s.ui().label, "Page 0 of 12");
    }

    #[test]
    fn test_long_jump_steps_fast_then_slow() {
        let mut s = session(13);
        let labels = Rc::new(RefCell::new(Vec::new()));
        let sink = labels.clone();
        s.subscribe(move |ui| sink.borrow_mut().push(ui.label.clone()));

        s.set_page(5, 0.0);
        assert_eq!(s.ui().label, "Page 5 of 12");
        assert_eq!(labels.borrow()[0], "Page 5 of 12");
        assert_eq!(s.cursor().delayed(), 0);

        let steps = run_timers(&mut s, 0.0, 1_000.0);
        assert_eq!(
            steps,
            vec![(50.0, 1), (100.0, 2), (150.0, 3), (300.0, 4), (450.0, 5)]
        );
        assert!(s.pending_step().is_none());
        // One notification for the command plus one per step
        assert_eq!(labels.borrow().len(), 6);
    }

    #[test]
    fn test_set_page_is_idempotent_under_clamping() {
        let mut a = session(8);
        let mut b = session(8);
        a.set_page(-5, 0.0);
        b.set_page(0, 0.0);
        assert_eq!(a.cursor(), b.cursor());
        assert_eq!(a.pending_step(), b.pending_step());

        a.set_page(8 + 5, 10.0);
        b.set_page(7, 10.0);
        assert_eq!(a.cursor(), b.cursor());
        assert_eq!(a.pending_step(), b.pending_step());
        assert_eq!(a.cursor().current(), 7);
    }

    #[test]
    fn test_convergence_is_monotonic_and_complete() {
        for k in 1..12 {
            let mut s = session(13);
            s.set_page(k, 0.0);
            let steps = run_timers(&mut s, 0.0, 5_000.0);
            let visited: Vec<usize> = steps.iter().map(|&(_, d)| d).collect();
            assert_eq!(visited, (1..=k as usize).collect::<Vec<_>>());
            assert_eq!(s.cursor().delayed(), s.cursor().current());
        }

        let mut s = session(13);
        s.set_page(9, 0.0);
        run_timers(&mut s, 0.0, 5_000.0);
        s.set_page(2, 6_000.0);
        let visited: Vec<usize> = run_timers(&mut s, 6_000.0, 9_000.0).iter().map(|&(_, d)| d).collect();
        assert_eq!(visited, vec![8, 7, 6, 5, 4, 3, 2]);
    }

    #[test]
    fn test_new_command_replaces_pending_step() {
        let mut s = session(13);
        s.set_page(6, 0.0);
        run_timers(&mut s, 0.0, 60.0);
        assert_eq!(s.cursor().delayed(), 1);

        // Reverse mid-flight: restarts from delayed = 1
        s.set_page(0, 70.0);
        assert_eq!(s.pending_step(), Some(PendingStep { due_ms: 220.0 }));
        let steps = run_timers(&mut s, 70.0, 1_000.0);
        assert_eq!(steps, vec![(220.0, 0)]);
    }

    #[test]
    fn test_late_poll_replays_missed_steps() {
        let mut s = session(13);
        s.set_page(5, 0.0);
        assert_eq!(s.advance_timers(1_000.0), 5);
        assert_eq!(s.cursor().delayed(), 5);
    }

    #[test]
    fn test_next_and_previous() {
        let mut s = session(3);
        assert_eq!(s.previous_page(0.0), 0);
        assert_eq!(s.next_page(0.0), 1);
        assert_eq!(s.next_page(0.0), 2);
        assert_eq!(s.next_page(0.0), 2);
        assert!(!s.ui().next_enabled);
        assert_eq!(s.previous_page(0.0), 1);
    }

    #[test]
    fn test_hover_then_leave_emits_enter_and_leave() {
        let mut s = session(6);
        let events = s.pointer_moved(Some(3));
        assert_eq!(events, vec![HoverEvent::Enter(3)]);
        assert!(s.page(3).unwrap().highlighted);

        // Same page again: nothing
        assert!(s.pointer_moved(Some(3)).is_empty());

        let events = s.pointer_moved(None);
        assert_eq!(events, vec![HoverEvent::Leave(3)]);
        assert!(!s.page(3).unwrap().highlighted);
        assert!(s.pointer_moved(None).is_empty());
    }

    #[test]
    fn test_hover_switch_leaves_then_enters() {
        let mut s = session(6);
        s.pointer_moved(Some(1));
        let events = s.pointer_moved(Some(2));
        assert_eq!(events, vec![HoverEvent::Leave(1), HoverEvent::Enter(2)]);
        assert!(!s.page(1).unwrap().highlighted);
        assert!(s.page(2).unwrap().highlighted);
        // Out-of-range hits count as no hit
        assert_eq!(s.pointer_moved(Some(99)), vec![HoverEvent::Leave(2)]);
    }

    #[test]
    fn test_click_closed_page_advances() {
        let mut s = session(6);
        s.pointer_moved(Some(2));
        assert!(!s.page(2).unwrap().last_opened);
        assert_eq!(s.click(0.0), Some(3));
        assert_eq!(s.cursor().current(), 3);
        assert!(!s.page(2).unwrap().highlighted);
    }

    #[test]
    fn test_click_open_page_returns_to_it() {
        let mut s = session(6);
        s.set_page(4, 0.0);
        run_timers(&mut s, 0.0, 2_000.0);
        s.frame(2_000.0, 0.016);
        assert!(s.page(2).unwrap().last_opened);

        s.pointer_moved(Some(2));
        assert_eq!(s.click(2_100.0), Some(2));
        assert_eq!(s.cursor().current(), 2);
    }

    #[test]
    fn test_click_without_hover_does_nothing() {
        let mut s = session(6);
        assert_eq!(s.click(0.0), None);
        assert_eq!(s.cursor().current(), 0);
    }

    #[test]
    fn test_click_on_back_cover_clamps() {
        let mut s = session(4);
        s.pointer_moved(Some(3));
        assert_eq!(s.click(0.0), Some(3));
    }

    #[test]
    fn test_frame_updates_every_page() {
        let mut s = session(5);
        s.set_page(2, 0.0);
        s.frame(1_000.0, 0.016);
        assert_eq!(s.cursor().delayed(), 2);
        for page in s.pages() {
            assert_eq!(page.bone_angles().len(), 31);
            assert_eq!(page.last_opened, page.index() < 2);
        }
        let z = s.page(4).unwrap().z;
        assert!((z - (-4.0 + 2.0) * 0.003).abs() < 1e-7);
    }

    #[test]
    fn test_tick_orders_frame_before_picking() {
        let mut s = session(5);
        s.set_page(3, 0.0);
        // Picker reports whichever page the delayed cursor just reached
        let picker = |session: &BookSession, _pointer: Vec2| Some(session.cursor().delayed());
        let events = s.tick(50.0, 0.016, Some(Vec2::new(0.5, 0.5)), &picker);
        assert_eq!(events, vec![HoverEvent::Enter(1)]);

        let events = s.tick(60.0, 0.016, None, &picker);
        assert_eq!(events, vec![HoverEvent::Leave(1)]);
    }

    #[test]
    fn test_unturned_pages_do_not_curl_at_startup() {
        let mut s = session(6);
        s.set_page(3, 0.0);
        s.frame(60.0, 0.016);

        let page = s.page(4).unwrap();
        assert!(!page.last_opened);
        let envelope = crate::page::curve::turning_time(
            60.0 - page.turned_at,
            s.config().tuning.turn_duration_ms,
        );
        assert_eq!(envelope, 0.0);

        // Page 0 did turn at 60ms
        assert_eq!(s.page(0).unwrap().turned_at, 60.0);
    }

    #[test]
    fn test_host_picked_hover_survives_frames() {
        use crate::interaction::NoPicker;

        let mut s = session(6);
        assert_eq!(s.pointer_moved(Some(3)), vec![HoverEvent::Enter(3)]);
        for i in 1..=5 {
            let events = s.frame_with_pointer(i as f64 * 16.0, 0.016, PointerSource::Host, &NoPicker);
            assert!(events.is_empty());
        }
        let page = s.page(3).unwrap();
        assert!(page.highlighted);
        assert!(page.emissive > 0.0);
        assert_eq!(s.hovered(), Some(3));
    }

    #[test]
    fn test_built_in_pointer_outside_viewport_leaves() {
        let mut s = session(6);
        let picker = |_: &BookSession, _: Vec2| Some(2);
        let events = s.frame_with_pointer(0.0, 0.016, PointerSource::BuiltIn(Some(Vec2::ZERO)), &picker);
        assert_eq!(events, vec![HoverEvent::Enter(2)]);
        let events = s.frame_with_pointer(16.0, 0.016, PointerSource::default(), &picker);
        assert_eq!(events, vec![HoverEvent::Leave(2)]);
    }

    #[test]
    fn test_bone_matrices_include_depth() {
        let mut s = session(4);
        s.frame(0.0, 0.0);
        let mats = s.bone_matrices(2).unwrap();
        assert_eq!(mats.len(), 31);
        let origin = mats[0].transform_point3(Vec3::ZERO);
        assert!((origin.z + 2.0 * 0.003).abs() < 1e-7);
        assert!(s.bone_matrices(9).is_none());
    }
}
