//! Per-page state and the per-frame kinematic update.
//!
//! A [`PageState`] is plain data; [`update`], [`on_enter`], [`on_leave`] and
//! [`on_click`] are the operations the session runs on it.

pub mod curve;

use crate::config::BookConfig;
use crate::types::BoneAngle;

/// Mutable state of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    index: usize,
    bone_angles: Vec<BoneAngle>,
    /// Set while the pointer is over this page.
    pub highlighted: bool,
    /// Time of the last open/close transition, in milliseconds.
    /// `NEG_INFINITY` until the page first turns.
    pub turned_at: f64,
    /// Whether the page was flipped past the cursor at the last update.
    pub last_opened: bool,
    /// Depth offset of the page in the stack.
    pub z: f32,
    /// Current glow intensity of both printed faces.
    pub emissive: f32,
}

impl PageState {
    /// Create a closed, unbent page with a chain of `bone_count` bones.
    pub fn new(index: usize, bone_count: usize) -> Self {
        Self {
            index,
            bone_angles: vec![BoneAngle::ZERO; bone_count],
            highlighted: false,
            turned_at: f64::NEG_INFINITY,
            last_opened: false,
            z: 0.0,
            emissive: 0.0,
        }
    }

    /// Position of the page in the book.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Local rotation of every bone, spine first.
    pub fn bone_angles(&self) -> &[BoneAngle] {
        &self.bone_angles
    }

    /// Mutable view of the bone rotations. The chain length cannot change.
    pub fn bone_angles_mut(&mut self) -> &mut [BoneAngle] {
        &mut self.bone_angles
    }

    pub fn bone_count(&self) -> usize {
        self.bone_angles.len()
    }
}

/// Book-wide inputs to one page update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Current time in milliseconds.
    pub now_ms: f64,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Animated cursor position.
    pub delayed_page: usize,
    /// The page has been flipped past the cursor.
    pub opened: bool,
    /// The cursor sits on either cover.
    pub book_closed: bool,
}

impl PageFrame {
    /// Derive the per-page flags from the cursor.
    pub fn for_page(index: usize, page_count: usize, now_ms: f64, delta: f32, delayed_page: usize) -> Self {
        Self {
            now_ms,
            delta,
            delayed_page,
            opened: delayed_page > index,
            book_closed: delayed_page == 0 || delayed_page == page_count,
        }
    }
}

/// Recompute every bone of one page for this frame.
pub fn update(page: &mut PageState, frame: &PageFrame, config: &BookConfig) {
    let tuning = &config.tuning;

    if frame.opened != page.last_opened {
        log::debug!(
            "page {} {} at {:.0}ms",
            page.index,
            if frame.opened { "opened" } else { "closed" },
            frame.now_ms
        );
        page.turned_at = frame.now_ms;
        page.last_opened = frame.opened;
    }

    let turning_time = curve::turning_time(frame.now_ms - page.turned_at, tuning.turn_duration_ms);
    let target_rotation =
        curve::target_rotation(page.index, frame.opened, frame.book_closed, tuning);

    // First-order lag; clamped so a long stall cannot overshoot
    let blend_y = (tuning.easing * frame.delta).clamp(0.0, 1.0);
    let blend_x = (tuning.easing_fold * frame.delta).clamp(0.0, 1.0);

    let bone_count = page.bone_angles.len();
    for (i, angle) in page.bone_angles.iter_mut().enumerate() {
        let target = curve::bone_target(
            i,
            bone_count,
            target_rotation,
            turning_time,
            frame.book_closed,
            tuning,
        );
        angle.y += (target.y - angle.y) * blend_y;
        angle.x += (target.x - angle.x) * blend_x;
    }

    let depth = config.dimensions.depth;
    page.z = -(page.index as f32) * depth + frame.delayed_page as f32 * depth;

    // Per frame, not per second
    let glow_target = if page.highlighted { tuning.highlight_intensity } else { 0.0 };
    page.emissive += (glow_target - page.emissive) * tuning.highlight_blend;
}

/// Pointer entered the page.
pub fn on_enter(page: &mut PageState) {
    page.highlighted = true;
}

/// Pointer left the page.
pub fn on_leave(page: &mut PageState) {
    page.highlighted = false;
}

/// Page clicked. Returns the page the book should navigate to: back onto an
/// open page, or one past a closed one.
pub fn on_click(page: &mut PageState) -> usize {
    page.highlighted = false;
    if page.last_opened {
        page.index
    } else {
        page.index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn config() -> BookConfig {
        BookConfig::default()
    }

    fn run(page: &mut PageState, frames: usize, start_ms: f64, delayed: usize, page_count: usize) -> f64 {
        let config = config();
        let mut now = start_ms;
        for _ in 0..frames {
            now += 16.0;
            let frame = PageFrame::for_page(page.index(), page_count, now, 0.016, delayed);
            update(page, &frame, &config);
        }
        now
    }

    #[test]
    fn test_bone_count_is_constant() {
        let config = config();
        let mut page = PageState::new(2, config.dimensions.bone_count());
        run(&mut page, 200, 0.0, 3, 6);
        run(&mut page, 200, 5_000.0, 0, 6);
        assert_eq!(page.bone_angles().len(), 31);
        assert_eq!(page.bone_count(), config.dimensions.bone_count());
    }

    #[test]
    fn test_frame_flags() {
        let f = PageFrame::for_page(2, 6, 0.0, 0.016, 3);
        assert!(f.opened);
        assert!(!f.book_closed);
        let f = PageFrame::for_page(2, 6, 0.0, 0.016, 2);
        assert!(!f.opened);
        assert!(PageFrame::for_page(2, 6, 0.0, 0.016, 0).book_closed);
        assert!(PageFrame::for_page(2, 6, 0.0, 0.016, 6).book_closed);
    }

    #[test]
    fn test_turned_at_only_changes_on_transition() {
        let mut page = PageState::new(1, 31);
        run(&mut page, 10, 1_000.0, 0, 4);
        assert_eq!(page.turned_at, f64::NEG_INFINITY);
        assert!(!page.last_opened);

        run(&mut page, 10, 2_000.0, 2, 4);
        // First frame of the run is at 2016ms
        assert_eq!(page.turned_at, 2_016.0);
        assert!(page.last_opened);

        run(&mut page, 10, 3_000.0, 2, 4);
        assert_eq!(page.turned_at, 2_016.0);
    }

    #[test]
    fn test_easing_is_first_order_lag() {
        let config = config();
        let mut page = PageState::new(0, 31);
        let frame = PageFrame::for_page(0, 4, 10_000.0, 0.1, 0);
        update(&mut page, &frame, &config);
        // book closed: hinge target is +90°, eased by 0.5 * 0.1
        assert!((page.bone_angles()[0].y - FRAC_PI_2 * 0.05).abs() < 1e-6);
        assert_eq!(page.bone_angles()[1], BoneAngle::ZERO);
    }

    #[test]
    fn test_converges_towards_target() {
        let mut page = PageState::new(0, 31);
        run(&mut page, 2_000, 10_000.0, 0, 4);
        assert!((page.bone_angles()[0].y - FRAC_PI_2).abs() < 1e-3);
        for angle in &page.bone_angles()[1..] {
            assert!(angle.y.abs() < 1e-6);
            assert!(angle.x.abs() < 1e-6);
        }
    }

    #[test]
    fn test_depth_offset() {
        let config = config();
        let mut page = PageState::new(3, 31);
        let frame = PageFrame::for_page(3, 6, 0.0, 0.016, 5);
        update(&mut page, &frame, &config);
        assert!((page.z - 2.0 * config.dimensions.depth).abs() < 1e-7);

        let frame = PageFrame::for_page(3, 6, 16.0, 0.016, 0);
        update(&mut page, &frame, &config);
        assert!((page.z + 3.0 * config.dimensions.depth).abs() < 1e-7);
    }

    #[test]
    fn test_highlight_glow_blends_per_frame() {
        let config = config();
        let mut page = PageState::new(1, 31);
        on_enter(&mut page);
        let frame = PageFrame::for_page(1, 4, 0.0, 0.5, 1);
        update(&mut page, &frame, &config);
        assert!((page.emissive - 0.022).abs() < 1e-6);

        // Same step regardless of delta
        let mut other = PageState::new(1, 31);
        on_enter(&mut other);
        let frame = PageFrame::for_page(1, 4, 0.0, 0.001, 1);
        update(&mut other, &frame, &config);
        assert_eq!(page.emissive, other.emissive);

        on_leave(&mut page);
        assert!(!page.highlighted);
        update(&mut page, &frame, &config);
        assert!((page.emissive - 0.0198).abs() < 1e-6);
    }

    #[test]
    fn test_click_targets() {
        let mut closed = PageState::new(2, 31);
        closed.highlighted = true;
        assert_eq!(on_click(&mut closed), 3);
        assert!(!closed.highlighted);

        let mut open = PageState::new(2, 31);
        open.last_opened = true;
        assert_eq!(on_click(&mut open), 2);
    }
}
