//! Book configuration.
//!
//! Every section has defaults matching the stock book, so a JSON config only
//! needs the fields it overrides.

use crate::error::{BookError, Result};
use serde::{Deserialize, Serialize};

/// Physical size and subdivision of a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDimensions {
    /// Distance from the spine to the outer edge.
    pub width: f32,
    /// Height of the page.
    pub height: f32,
    /// Paper thickness; also the z spacing between stacked pages.
    pub depth: f32,
    /// Number of segments along the width. The bone chain has one more bone.
    pub segments: usize,
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self {
            width: 1.28,
            height: 1.71,
            depth: 0.003,
            segments: 30,
        }
    }
}

impl PageDimensions {
    /// Width covered by one segment (and the offset between two bones).
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    /// Number of bones in a page's chain.
    pub fn bone_count(&self) -> usize {
        self.segments + 1
    }
}

/// Constants of the bending curve and the highlight glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTuning {
    /// Curl near the spine (bones 0..8).
    pub inside_curve_strength: f32,
    /// Counter-curl towards the outer edge (bones 8..).
    pub outside_curve_strength: f32,
    /// Mid-flip curl while the turning envelope is active.
    pub turning_curve_strength: f32,
    /// Per-second blend factor of the Y rotation.
    pub easing: f32,
    /// Per-second blend factor of the X (fold) rotation.
    pub easing_fold: f32,
    /// Length of the turning envelope in milliseconds.
    pub turn_duration_ms: f64,
    /// Extra rotation per page index while the book is open, in degrees.
    pub stagger_degrees: f32,
    /// Fold amplitude in degrees.
    pub fold_degrees: f32,
    /// Glow intensity of a hovered page.
    pub highlight_intensity: f32,
    /// Per-frame blend factor of the glow.
    pub highlight_blend: f32,
}

impl Default for PageTuning {
    fn default() -> Self {
        Self {
            inside_curve_strength: 0.18,
            outside_curve_strength: 0.05,
            turning_curve_strength: 0.09,
            easing: 0.5,
            easing_fold: 0.3,
            turn_duration_ms: 400.0,
            stagger_degrees: 0.8,
            fold_degrees: 2.0,
            highlight_intensity: 0.22,
            highlight_blend: 0.1,
        }
    }
}

/// Delays between catch-up steps of the delayed page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchUpTiming {
    /// Delay used while the cursor is further than `fast_distance` pages behind.
    pub fast_step_ms: f64,
    /// Delay used for the last `fast_distance` pages.
    pub slow_step_ms: f64,
    pub fast_distance: usize,
}

impl Default for CatchUpTiming {
    fn default() -> Self {
        Self {
            fast_step_ms: 50.0,
            slow_step_ms: 150.0,
            fast_distance: 2,
        }
    }
}

impl CatchUpTiming {
    /// Delay before the next step, given the remaining distance.
    pub fn step_delay(&self, distance: usize) -> f64 {
        if distance > self.fast_distance {
            self.fast_step_ms
        } else {
            self.slow_step_ms
        }
    }
}

/// Face texture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 684,
        }
    }
}

/// Complete book configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub dimensions: PageDimensions,
    pub tuning: PageTuning,
    pub catch_up: CatchUpTiming,
    pub texture: TextureConfig,
}

impl BookConfig {
    /// Parse and validate a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BookConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Create config with custom page dimensions.
    pub fn with_dimensions(mut self, dimensions: PageDimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Create config with custom curve tuning.
    pub fn with_tuning(mut self, tuning: PageTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Create config with custom catch-up delays.
    pub fn with_catch_up(mut self, catch_up: CatchUpTiming) -> Self {
        self.catch_up = catch_up;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.dimensions;
        if d.segments == 0 {
            return Err(BookError::InvalidConfig("page needs at least one segment".to_string()));
        }
        if !(d.width > 0.0 && d.height > 0.0 && d.depth > 0.0) {
            return Err(BookError::InvalidConfig(format!(
                "page dimensions must be positive, got {}x{}x{}",
                d.width, d.height, d.depth
            )));
        }
        if self.texture.width == 0 || self.texture.height == 0 {
            return Err(BookError::InvalidConfig("texture size must be non-zero".to_string()));
        }
        if self.tuning.turn_duration_ms <= 0.0 {
            return Err(BookError::InvalidConfig("turn duration must be positive".to_string()));
        }
        Ok(())
    }
}
