//! Utility functions for visualization: colors, axis bounds, tick formatting.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette, first entries.
/// Order: Blue, Orange, Green, Gray, Gold.
const OFFICE5: [RGBColor; 5] = [
    RGBColor(68, 114, 196), // blue   (#4472C4)
    RGBColor(237, 125, 49), // orange (#ED7D31)
    RGBColor(112, 173, 71), // green  (#70AD47)
    RGBColor(165, 165, 165), // gray  (#A5A5A5)
    RGBColor(255, 192, 0),  // gold   (#FFC000)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE5[idx % OFFICE5.len()].to_rgba()
}

/// X range for a panel: the requested years, widened by one on each side when degenerate.
pub fn year_bounds(start: i32, end: i32) -> (i32, i32) {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    if lo == hi { (lo - 1, hi + 1) } else { (lo, hi) }
}

/// Y range covering all values with 5% headroom; `(0, 1)` when there is nothing to show.
pub fn value_bounds(points: &[(i32, f64)]) -> (f64, f64) {
    let values = points.iter().map(|(_, v)| *v).filter(|v| v.is_finite());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span.abs() < f64::EPSILON {
        let pad = if min.abs() > 0.0 { min.abs() * 0.05 } else { 1.0 };
        return (min - pad, max + pad);
    }
    (min - span * 0.05, max + span * 0.05)
}

/// Limit x labels to avoid overlap.
pub fn x_label_count(min_year: i32, max_year: i32) -> usize {
    ((max_year - min_year + 1).max(1) as usize).min(12)
}

/// Tick label: thousands separators for large magnitudes, a few decimals for small ones.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else {
        let prec = if a >= 100.0 {
            0
        } else if a >= 10.0 {
            1
        } else {
            2
        };
        format!("{:.*}", prec, v)
    }
}
