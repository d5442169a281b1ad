//! Bending curve of a page.
//!
//! Pure functions of time and bone index. A settled page holds a static curl
//! (spine side bends one way, outer side slightly back); during the first
//! `turn_duration_ms` after a flip an extra sine-shaped curl and fold rise and
//! fall again.

use crate::config::PageTuning;
use crate::types::BoneAngle;
use std::f32::consts::{FRAC_PI_2, PI};

/// Bones below this index take the inside curve, the rest the outside curve.
pub const INSIDE_CURVE_BONES: usize = 8;

/// Envelope of the mid-flip curl: 0 at the flip, 1 halfway, 0 again once the
/// turn duration has elapsed (and forever after).
pub fn turning_time(elapsed_ms: f64, duration_ms: f64) -> f32 {
    let t = elapsed_ms / duration_ms;
    if !(t > 0.0 && t < 1.0) {
        // sin(π) is not exactly zero in floating point
        return 0.0;
    }
    (std::f64::consts::PI * t).sin() as f32
}

/// Y rotation the whole page settles towards.
///
/// Open pages lie to the left (-90°), closed ones to the right (+90°). While
/// the book is open each page gets a small index-based stagger so the stacks
/// fan out instead of overlapping.
pub fn target_rotation(index: usize, opened: bool, book_closed: bool, tuning: &PageTuning) -> f32 {
    let base = if opened { -FRAC_PI_2 } else { FRAC_PI_2 };
    if book_closed {
        base
    } else {
        base + (tuning.stagger_degrees * index as f32).to_radians()
    }
}

/// Target local rotation of bone `i` of a `bone_count` long chain.
pub fn bone_target(
    i: usize,
    bone_count: usize,
    target_rotation: f32,
    turning_time: f32,
    book_closed: bool,
    tuning: &PageTuning,
) -> BoneAngle {
    if book_closed {
        // Flat stack; only the hinge follows the cover
        return if i == 0 {
            BoneAngle::new(target_rotation, 0.0)
        } else {
            BoneAngle::ZERO
        };
    }

    let fi = i as f32;
    let n = bone_count as f32;

    let inside_curve = if i < INSIDE_CURVE_BONES { (fi * 0.2 + 0.25).sin() } else { 0.0 };
    let outside_curve = if i >= INSIDE_CURVE_BONES { (fi * 0.3 + 0.09).cos() } else { 0.0 };
    let turning_curve = (fi * PI / n).sin() * turning_time;

    let y = tuning.inside_curve_strength * inside_curve * target_rotation
        - tuning.outside_curve_strength * outside_curve * target_rotation
        + tuning.turning_curve_strength * turning_curve * target_rotation;

    let fold_base = (target_rotation.sin() * tuning.fold_degrees).to_radians();
    let fold_intensity = if i > INSIDE_CURVE_BONES {
        (fi * PI / n - 0.5).sin() * turning_time
    } else {
        0.0
    };

    BoneAngle::new(y, fold_base * fold_intensity)
}
