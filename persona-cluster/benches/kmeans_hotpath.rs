use criterion::{criterion_group, criterion_main, Criterion};
use persona_cluster::{ClusterEngine, RngSource};
use persona_core::{ClusterSettings, ProfileVector, RespondentRecord, TraitDimension};
use std::hint::black_box;

fn population(size: usize) -> Vec<RespondentRecord> {
    // Deterministic spread over all 14 dimensions without pulling in a generator.
    (0..size)
        .map(|i| {
            let profile = ProfileVector::from_pairs(TraitDimension::ALL.iter().enumerate().map(|(d, dim)| {
                let raw = ((i * 31 + d * 17) % 41) as f64 / 20.0 - 1.0;
                (dim.as_str(), raw)
            }));
            RespondentRecord::new(format!("r{}", i), profile)
        })
        .collect()
}

fn bench_kmeans(c: &mut Criterion) {
    let engine = ClusterEngine::new(ClusterSettings::with_bounds(8, 3)).expect("valid settings");
    let small = population(200);
    let large = population(2_000);

    c.bench_function("kmeans/cluster_200", |b| {
        b.iter(|| {
            let run = engine
                .cluster(black_box(&small), &mut RngSource::seeded(7))
                .expect("cluster");
            black_box(run.clusters.len());
        });
    });

    c.bench_function("kmeans/cluster_2000", |b| {
        b.iter(|| {
            let run = engine
                .cluster(black_box(&large), &mut RngSource::seeded(7))
                .expect("cluster");
            black_box(run.iterations);
        });
    });
}

criterion_group!(benches, bench_kmeans);
criterion_main!(benches);
