use greenroute::models::{Coordinate, RouteCandidate, TripRequest, VehicleParams};
use greenroute::routing::{AxisOrder, normalize_geometry};
use greenroute::scoring::{evaluate, select_best};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn request() -> TripRequest {
    TripRequest {
        start: Coordinate { lat: 12.9716, lon: 77.5946 },
        end: Coordinate { lat: 13.0827, lon: 80.2707 },
        battery_level_percent: 80.0,
        vehicle: VehicleParams {
            battery_capacity_kwh: 60.0,
            mass_kg: 1800.0,
            drag_coeff: 0.29,
            frontal_area_m2: 2.3,
            rolling_resistance_coeff: 0.01,
        },
    }
}

fn candidate(index: usize, points: usize) -> RouteCandidate {
    let raw: Vec<[f64; 2]> = (0..points)
        .map(|i| {
            let t = i as f64 / points as f64;
            [77.5946 + 2.6761 * t, 12.9716 + 0.1111 * t + index as f64 * 0.001]
        })
        .collect();
    RouteCandidate {
        distance_m: 330_000.0 + index as f64 * 2_500.0,
        duration_s: 19_800.0 + index as f64 * 300.0,
        geometry: normalize_geometry(&raw, AxisOrder::LonLat),
    }
}

fn benchmark_selection(c: &mut Criterion) {
    let req = request();
    let mut group = c.benchmark_group("candidate_selection");

    for count in [1usize, 3, 10, 50] {
        let routes: Vec<RouteCandidate> = (0..count).map(|i| candidate(i, 500)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &routes, |b, routes| {
            b.iter(|| {
                let evaluated = routes
                    .iter()
                    .enumerate()
                    .map(|(i, route)| {
                        evaluate(i, route.clone(), 200.0, 25.0, 40.0 + (i % 7) as f64, &req)
                    })
                    .collect();
                select_best(black_box(evaluated))
            });
        });
    }

    group.finish();
}

fn benchmark_normalization(c: &mut Criterion) {
    let raw: Vec<[f64; 2]> = (0..10_000)
        .map(|i| [77.0 + i as f64 * 1e-4, 12.0 + i as f64 * 1e-4])
        .collect();

    c.bench_function("normalize_geometry_10k", |b| {
        b.iter(|| normalize_geometry(black_box(&raw), AxisOrder::LonLat))
    });
}

criterion_group!(benches, benchmark_selection, benchmark_normalization);
criterion_main!(benches);
