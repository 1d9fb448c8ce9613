//! Profile vector operations

use crate::{PersonaResult, ProfileVector, VectorError};

/// Flatten two profiles over their shared key set, in lexical key order.
///
/// Fails with `DimensionMismatch` unless both profiles carry exactly the same
/// trait keys.
pub fn aligned_values(a: &ProfileVector, b: &ProfileVector) -> PersonaResult<(Vec<f64>, Vec<f64>)> {
    if !a.traits.keys().eq(b.traits.keys()) {
        return Err(VectorError::DimensionMismatch {
            expected: a.keys(),
            got: b.keys(),
        }
        .into());
    }
    Ok((a.values(), b.values()))
}

/// Keys of `expected` absent from `actual`, and keys of `actual` absent from `expected`.
pub fn key_set_diff(expected: &ProfileVector, actual: &ProfileVector) -> (Vec<String>, Vec<String>) {
    let missing = expected
        .traits
        .keys()
        .filter(|k| !actual.traits.contains_key(*k))
        .cloned()
        .collect();
    let unexpected = actual
        .traits
        .keys()
        .filter(|k| !expected.traits.contains_key(*k))
        .cloned()
        .collect();
    (missing, unexpected)
}

/// Squared Euclidean distance between two equal-length coordinate slices.
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean distance between two profiles over all trait dimensions.
pub fn euclidean_distance(a: &ProfileVector, b: &ProfileVector) -> PersonaResult<f64> {
    let (xs, ys) = aligned_values(a, b)?;
    Ok(squared_distance(&xs, &ys).sqrt())
}

/// Cosine similarity of two coordinate slices. Zero vectors yield 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot_product = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

// =============================================================================
// TESTS
// =============================================================================
