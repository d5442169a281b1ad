//! Book cursor and the catch-up step timer.

use crate::config::CatchUpTiming;

/// Current page plus the animated page trailing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookCursor {
    current: usize,
    delayed: usize,
    page_count: usize,
}

impl BookCursor {
    /// Cursor on the front cover of a book with `page_count` pages.
    pub fn new(page_count: usize) -> Self {
        Self {
            current: 0,
            delayed: 0,
            page_count,
        }
    }

    /// The page navigation commands last asked for.
    pub fn current(&self) -> usize {
        self.current
    }

    /// The page the animation has reached.
    pub fn delayed(&self) -> usize {
        self.delayed
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Highest page navigation can select.
    pub fn last_page(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    /// Clamp a requested page into `[0, N-1]`.
    pub fn clamp(&self, page: i64) -> usize {
        page.clamp(0, self.last_page() as i64) as usize
    }

    /// Set the current page, clamped. Returns the page actually selected.
    pub fn set_current(&mut self, page: i64) -> usize {
        self.current = self.clamp(page);
        self.current
    }

    /// Pages left between the delayed and the current page.
    pub fn distance(&self) -> usize {
        self.current.abs_diff(self.delayed)
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.delayed
    }

    /// Move the delayed page one step towards the current one.
    pub fn step(&mut self) -> Option<usize> {
        if self.delayed < self.current {
            self.delayed += 1;
        } else if self.delayed > self.current {
            self.delayed -= 1;
        } else {
            return None;
        }
        Some(self.delayed)
    }
}

/// The single outstanding catch-up step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingStep {
    /// When the step fires, in milliseconds.
    pub due_ms: f64,
}

impl PendingStep {
    /// Schedule the next step after `from_ms`, or nothing if the cursor has settled.
    pub fn schedule(cursor: &BookCursor, timing: &CatchUpTiming, from_ms: f64) -> Option<Self> {
        if cursor.is_settled() {
            None
        } else {
            Some(Self {
                due_ms: from_ms + timing.step_delay(cursor.distance()),
            })
        }
    }
}
