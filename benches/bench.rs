// Criterion benchmarks for the candidate pipeline.

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uuid::Uuid;

use ember_match::core::candidates::find_candidates;
use ember_match::core::distance::{haversine_km, BoundingBox};
use ember_match::models::{AccountState, Dealbreakers, Gender, GeoPoint, UserProfile};

fn synthetic_profile(index: usize, lat: f64, lon: f64) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        name: format!("User {index}"),
        gender: if index % 2 == 0 {
            Gender::Female
        } else {
            Gender::Male
        },
        interested_in: HashSet::from([Gender::Male, Gender::Female]),
        age: 21 + (index % 20) as u8,
        location: Some(GeoPoint { lat, lon }),
        max_distance_km: 50,
        min_age: 18,
        max_age: 55,
        lifestyle: Default::default(),
        dealbreakers: Dealbreakers::none(),
        state: AccountState::Active,
    }
}

fn seeker() -> UserProfile {
    let mut p = synthetic_profile(1, 40.7128, -74.0060);
    p.interested_in = HashSet::from([Gender::Female]);
    p.age = 30;
    p
}

fn bench_haversine(c: &mut Criterion) {
    let a = GeoPoint {
        lat: 40.7128,
        lon: -74.0060,
    };
    let b = GeoPoint {
        lat: 40.72,
        lon: -74.01,
    };
    c.bench_function("haversine_km", |bencher| {
        bencher.iter(|| haversine_km(black_box(a), black_box(b)));
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    let center = GeoPoint {
        lat: 40.7128,
        lon: -74.0060,
    };
    c.bench_function("bounding_box", |bencher| {
        bencher.iter(|| BoundingBox::around(black_box(center), black_box(50.0)));
    });
}

fn bench_candidate_pipeline(c: &mut Criterion) {
    let seeker = seeker();
    let excluded = HashSet::new();

    let mut group = c.benchmark_group("find_candidates");
    for pool_size in [100usize, 1_000, 10_000] {
        let pool: Vec<UserProfile> = (0..pool_size)
            .map(|i| {
                synthetic_profile(
                    i,
                    40.7128 + (i as f64 * 0.0005) - 0.25,
                    -74.0060 + (i as f64 * 0.0003) - 0.15,
                )
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            &pool,
            |bencher, pool| {
                bencher.iter(|| find_candidates(black_box(&seeker), pool, &excluded));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_haversine,
    bench_bounding_box,
    bench_candidate_pipeline
);
criterion_main!(benches);
