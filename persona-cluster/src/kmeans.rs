//! k-means with k-means++ seeding
//!
//! ```text
//! respondents → key check → k selection ─┬─ n <= min_groups → singletons
//!                                         └─ seed (k-means++) → assign/update loop → clusters
//! ```

use crate::RandomSource;
use persona_core::{
    round2, squared_distance, Cluster, ClusterSettings, PersonaResult, ProfileVector,
    RespondentRecord, VectorError,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of one clustering run, with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringRun {
    /// Non-empty clusters, largest first.
    pub clusters: Vec<Cluster>,
    /// Number of groups requested from the seeding step.
    pub k: usize,
    /// Assign/update iterations executed (0 for the singleton path).
    pub iterations: usize,
    pub converged: bool,
    /// Within-cluster sum of squared distances after each iteration.
    pub inertia_history: Vec<f64>,
}

/// Clusters respondent profiles.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    settings: ClusterSettings,
}

impl ClusterEngine {
    /// Create an engine. Fails with `InvalidValue` for unusable bounds.
    pub fn new(settings: ClusterSettings) -> PersonaResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ClusterSettings {
        &self.settings
    }

    /// `clamp(round(sqrt(n / 2)), min_groups, max_groups)`, never above `n`.
    /// When the bounds cross, `max_groups` wins.
    pub fn choose_k(&self, n: usize) -> usize {
        let raw = ((n as f64) / 2.0).sqrt().round() as usize;
        raw.max(self.settings.floor_groups())
            .min(self.settings.max_groups)
            .min(n)
    }

    /// Partition respondents into groups.
    ///
    /// Every profile must carry the same trait keys, otherwise the run fails
    /// with `DimensionMismatch`. An empty input yields an empty run.
    #[tracing::instrument(skip_all, fields(respondents = respondents.len()))]
    pub fn cluster(
        &self,
        respondents: &[RespondentRecord],
        rng: &mut dyn RandomSource,
    ) -> PersonaResult<ClusteringRun> {
        let Some(first) = respondents.first() else {
            return Ok(ClusteringRun {
                clusters: Vec::new(),
                k: 0,
                iterations: 0,
                converged: true,
                inertia_history: Vec::new(),
            });
        };

        let keys = first.profile.keys();
        for respondent in respondents {
            if !respondent.profile.traits.keys().eq(keys.iter()) {
                return Err(VectorError::DimensionMismatch {
                    expected: keys.clone(),
                    got: respondent.profile.keys(),
                }
                .into());
            }
        }

        let n = respondents.len();
        if n <= self.settings.min_groups {
            tracing::debug!(n, "Population at or below min_groups, emitting singletons");
            return Ok(singletons(respondents, &keys));
        }

        let points: Vec<Vec<f64>> = respondents.iter().map(|r| r.profile.values()).collect();
        let k = self.choose_k(n);
        let mut centroids = seed_centroids(&points, k, rng);

        let mut assignments = vec![0usize; n];
        let mut inertia_history = Vec::with_capacity(self.settings.max_iterations);
        let mut converged = false;
        let mut iterations = 0;

        for iteration in 0..self.settings.max_iterations {
            iterations = iteration + 1;

            assignments = points
                .par_iter()
                .map(|point| nearest_centroid(point, &centroids))
                .collect();

            let updated = recompute_centroids(&points, &assignments, &centroids);
            let max_shift = centroids
                .iter()
                .zip(updated.iter())
                .map(|(old, new)| squared_distance(old, new).sqrt())
                .fold(0.0f64, f64::max);
            centroids = updated;

            let inertia = inertia(&points, &assignments, &centroids);
            inertia_history.push(inertia);
            tracing::debug!(iteration, max_shift, inertia, "k-means iteration");

            if max_shift < self.settings.epsilon {
                converged = true;
                break;
            }
        }

        let mut clusters = Vec::with_capacity(k);
        for (index, centroid) in centroids.iter().enumerate() {
            let member_indices: Vec<usize> = assignments
                .iter()
                .enumerate()
                .filter(|(_, assigned)| **assigned == index)
                .map(|(i, _)| i)
                .collect();
            if member_indices.is_empty() {
                continue;
            }

            // Distances are measured from the centroid as reported.
            let reported: Vec<f64> = centroid.iter().map(|v| round2(*v)).collect();
            let avg_distance = member_indices
                .iter()
                .map(|&i| squared_distance(&points[i], &reported).sqrt())
                .sum::<f64>()
                / member_indices.len() as f64;

            let members: Vec<RespondentRecord> = member_indices
                .iter()
                .map(|&i| respondents[i].clone())
                .collect();

            clusters.push(Cluster {
                centroid: to_profile(&keys, &reported),
                size: members.len(),
                members,
                avg_distance,
            });
        }

        // Stable: equal sizes keep discovery order.
        clusters.sort_by(|a, b| b.size.cmp(&a.size));

        tracing::info!(k, iterations, converged, clusters = clusters.len(), "Clustering finished");
        Ok(ClusteringRun {
            clusters,
            k,
            iterations,
            converged,
            inertia_history,
        })
    }
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self {
            settings: ClusterSettings::default(),
        }
    }
}

/// Cluster plain profiles with the default iteration limits.
///
/// Members are labelled `respondent-<index>` in input order.
pub fn cluster(
    profiles: &[ProfileVector],
    max_groups: usize,
    min_groups: usize,
    rng: &mut dyn RandomSource,
) -> PersonaResult<Vec<Cluster>> {
    let engine = ClusterEngine::new(ClusterSettings::with_bounds(max_groups, min_groups))?;
    let respondents: Vec<RespondentRecord> = profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| RespondentRecord::new(format!("respondent-{}", i), profile.clone()))
        .collect();
    Ok(engine.cluster(&respondents, rng)?.clusters)
}

fn to_profile(keys: &[String], coordinates: &[f64]) -> ProfileVector {
    ProfileVector::from_pairs(
        keys.iter()
            .cloned()
            .zip(coordinates.iter().map(|v| round2(*v))),
    )
}

fn singletons(respondents: &[RespondentRecord], keys: &[String]) -> ClusteringRun {
    let clusters = respondents
        .iter()
        .map(|respondent| Cluster {
            centroid: to_profile(keys, &respondent.profile.values()),
            members: vec![respondent.clone()],
            size: 1,
            avg_distance: 0.0,
        })
        .collect();

    ClusteringRun {
        clusters,
        k: respondents.len(),
        iterations: 0,
        converged: true,
        inertia_history: Vec::new(),
    }
}

/// k-means++: first centroid uniform, each next one drawn from the not yet
/// chosen points with probability proportional to squared distance to the
/// nearest chosen centroid.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut dyn RandomSource) -> Vec<Vec<f64>> {
    let n = points.len();
    let first = rng.next_index(n);
    let mut chosen = vec![first];
    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[first]))
        .collect();

    while chosen.len() < k.min(n) {
        let candidates: Vec<usize> = (0..n).filter(|i| !chosen.contains(i)).collect();
        let total: f64 = candidates.iter().map(|&i| nearest[i]).sum();

        let next = if total > 0.0 {
            let target = rng.next_unit() * total;
            let mut cumulative = 0.0;
            let mut picked = None;
            for &i in &candidates {
                cumulative += nearest[i];
                if target < cumulative {
                    picked = Some(i);
                    break;
                }
            }
            // Rounding can leave target a hair above the final sum.
            picked.unwrap_or_else(|| {
                candidates
                    .iter()
                    .rev()
                    .copied()
                    .find(|&i| nearest[i] > 0.0)
                    .unwrap_or(candidates[candidates.len() - 1])
            })
        } else {
            // Every remaining point coincides with a chosen centroid.
            candidates[rng.next_index(candidates.len())]
        };

        chosen.push(next);
        for (i, point) in points.iter().enumerate() {
            let d = squared_distance(point, &points[next]);
            if d < nearest[i] {
                nearest[i] = d;
            }
        }
    }

    tracing::debug!(?chosen, "Seeded centroids");
    chosen.into_iter().map(|i| points[i].clone()).collect()
}

/// Index of the closest centroid; ties go to the lower index.
fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best_distance {
            best = index;
            best_distance = d;
        }
    }
    best
}

/// Coordinate-wise mean per cluster. An empty cluster keeps its previous centroid.
fn recompute_centroids(points: &[Vec<f64>], assignments: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dims = previous.first().map(|c| c.len()).unwrap_or(0);
    let mut sums = vec![vec![0.0f64; dims]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, &cluster) in points.iter().zip(assignments.iter()) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point.iter()) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous.iter())
        .map(|((sum, count), old)| {
            if count == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

fn inertia(points: &[Vec<f64>], assignments: &[usize], centroids: &[Vec<f64>]) -> f64 {
    points
        .iter()
        .zip(assignments.iter())
        .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
        .sum()
}

// =============================================================================
// TESTS
// =============================================================================
