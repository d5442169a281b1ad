//! Shared types used throughout the library.

mod transform;

pub use transform::BoneAngle;

use crate::error::{BookError, Result};
use serde::{Deserialize, Serialize};

/// Text printed on the two faces of one page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

impl PageContent {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// Get the text of one face.
    pub fn text(&self, side: PageSide) -> &str {
        match side {
            PageSide::Front => &self.front,
            PageSide::Back => &self.back,
        }
    }
}

/// The ordered page list of a book.
///
/// Index 0 is the front cover and the last index is the back cover. A book
/// needs at least those two pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookContent {
    pub pages: Vec<PageContent>,
}

impl BookContent {
    /// Create a book, rejecting page lists shorter than two.
    pub fn new(pages: Vec<PageContent>) -> Result<Self> {
        let book = Self { pages };
        book.validate()?;
        Ok(book)
    }

    /// Parse a book from JSON of the form `{"pages": [{"front": .., "back": ..}]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let book: BookContent = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    /// Check the cover invariant.
    pub fn validate(&self) -> Result<()> {
        if self.pages.len() < 2 {
            return Err(BookError::InvalidBook(format!(
                "a book needs a front and a back cover, got {} page(s)",
                self.pages.len()
            )));
        }
        Ok(())
    }

    /// Number of pages (N).
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Index of the last page (the back cover).
    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    /// Style used when rasterizing one face.
    ///
    /// The outside of the book (front of page 0, back of the last page) is
    /// cover art; everything else is a printed page.
    pub fn face_style(&self, index: usize, side: PageSide) -> FaceStyle {
        match side {
            PageSide::Front if index == 0 => FaceStyle::Cover,
            PageSide::Back if index == self.last_index() => FaceStyle::Cover,
            _ => FaceStyle::Page,
        }
    }
}

/// One of the two printed faces of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSide {
    Front,
    Back,
}

impl PageSide {
    pub fn all() -> [PageSide; 2] {
        [PageSide::Front, PageSide::Back]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSide::Front => "front",
            PageSide::Back => "back",
        }
    }
}

/// Rasterization style of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceStyle {
    Cover,
    Page,
}

impl FaceStyle {
    pub fn is_page(&self) -> bool {
        matches!(self, FaceStyle::Page)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}
