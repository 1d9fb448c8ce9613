//! Comparison statistics over flattened profiles.
//!
//! All three measures are rounded to 4 decimals. Degenerate inputs return
//! sentinels instead of errors: Pearson is 0 when either side has zero
//! variance, cosine is 0 when either side is the zero vector.
//! `pearson_raw` skips the rounding for pass/fail decisions.

use persona_core::round_to;

const PRECISION: i32 = 4;

/// Sums of squares below this count as zero variance (float noise from
/// averaging constant inputs).
const VARIANCE_FLOOR: f64 = 1e-12;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Pearson correlation coefficient, clamped to [-1, 1].
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    round_to(pearson_raw(xs, ys), PRECISION)
}

/// Unrounded Pearson coefficient, clamped to [-1, 1].
pub fn pearson_raw(xs: &[f64], ys: &[f64]) -> f64 {
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx < VARIANCE_FLOOR || syy < VARIANCE_FLOOR {
        return 0.0;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Cosine similarity, rounded.
pub fn cosine(xs: &[f64], ys: &[f64]) -> f64 {
    round_to(persona_core::cosine_similarity(xs, ys), PRECISION)
}

/// Mean absolute error. Empty input yields 0.
pub fn mean_absolute_error(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let total: f64 = xs.iter().zip(ys.iter()).map(|(x, y)| (x - y).abs()).sum();
    round_to(total / xs.len() as f64, PRECISION)
}
