//! Navigation controls state.

use super::cursor::BookCursor;
use serde::Serialize;

/// What the page counter and the previous/next buttons show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationUi {
    pub label: String,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl NavigationUi {
    pub fn from_cursor(cursor: &BookCursor) -> Self {
        let current = cursor.current();
        let last = cursor.last_page();
        Self {
            label: format!("Page {} of {}", current, last),
            previous_enabled: current > 0,
            next_enabled: current < last,
        }
    }
}
