//! PERSONA Cluster - archetype discovery
//!
//! Groups respondent profiles with k-means (k-means++ seeding) and summarizes
//! each group's demographics. Randomness is injected through [`RandomSource`].

pub mod demographics;
pub mod kmeans;
pub mod random;

pub use demographics::aggregate_demographics;
pub use kmeans::{cluster, ClusterEngine, ClusteringRun};
pub use random::{RandomSource, RngSource, ScriptedSource};
