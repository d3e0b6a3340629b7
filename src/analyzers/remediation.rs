// SPDX-License-Identifier: PMPL-1.0-or-later
//! Nearest compliant foreground color.
//!
//! Keeps hue and saturation and walks HSL lightness in fixed steps, darker
//! first, then lighter. The first candidate meeting the target ratio wins;
//! when none does, the best-scoring candidate seen is returned.

use crate::color::{contrast_ratio, Color};

/// Lightness change per step
const LIGHTNESS_STEP: f64 = 0.02;

/// Steps tried in each direction
const MAX_STEPS: u32 = 50;

/// Suggest a foreground close to `fg` with at least `target` contrast on `bg`.
///
/// Returns `fg` unchanged when it already passes. The alpha of `fg` is kept
/// on every candidate.
pub fn suggest_foreground(fg: Color, bg: Color, target: f64) -> Color {
    let mut best = fg;
    let mut best_ratio = contrast_ratio(fg, bg);
    if best_ratio >= target {
        return fg;
    }

    let (h, s, l) = fg.to_hsl();

    for direction in [-1.0, 1.0] {
        for step in 0..=MAX_STEPS {
            let lightness = (l + direction * f64::from(step) * LIGHTNESS_STEP).clamp(0.0, 1.0);
            let candidate = quantize(Color::from_hsl(h, s, lightness), fg.a);
            let ratio = contrast_ratio(candidate, bg);

            if ratio >= target {
                return candidate;
            }
            if ratio > best_ratio {
                best = candidate;
                best_ratio = ratio;
            }
        }
    }

    best
}

/// Snap channels to whole values so the suggestion survives hex formatting
fn quantize(color: Color, alpha: f64) -> Color {
    Color::rgba(color.r.round(), color.g.round(), color.b.round(), alpha)
}
