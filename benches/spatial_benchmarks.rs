use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use incidex::{BoundingBox, Config, Incidex, Segment};

/// Deterministic scatter of incidents over a ~10 km square around San Francisco.
fn incident_coords(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let lat = 37.70 + ((i * 7919) % 10_000) as f64 * 0.00001;
            let lon = -122.50 + ((i * 104_729) % 10_000) as f64 * 0.00001;
            (lat, lon)
        })
        .collect()
}

fn populated_db(n: usize, cell_size: f64) -> Incidex {
    let mut db = Incidex::memory_with_config(Config::default().with_cell_size(cell_size)).unwrap();
    db.bulk_insert(incident_coords(n)).unwrap();
    db
}

fn benchmark_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    let mut db = Incidex::memory().unwrap();
    group.bench_function("single_insert", |b| {
        let mut counter = 0usize;
        b.iter(|| {
            let lat = 37.70 + (counter % 10_000) as f64 * 0.00001;
            let lon = -122.50 + (counter / 10_000 % 10_000) as f64 * 0.00001;
            counter += 1;
            db.insert(black_box(lat), black_box(lon)).unwrap()
        })
    });

    group.bench_function("bulk_insert_1000", |b| {
        let coords = incident_coords(1_000);
        b.iter(|| {
            let mut db = Incidex::memory().unwrap();
            db.bulk_insert(black_box(coords.iter().copied())).unwrap()
        })
    });

    group.bench_function("seed_1000_lines", |b| {
        let lines: Vec<String> = incident_coords(1_000)
            .into_iter()
            .map(|(lat, lon)| format!("{} {}", lat, lon))
            .collect();
        b.iter(|| {
            let mut db = Incidex::memory().unwrap();
            db.seed_from_source(black_box(&lines)).unwrap()
        })
    });

    group.finish();
}

fn benchmark_count_near(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_near");

    for &n in &[1_000usize, 10_000, 100_000] {
        let db = populated_db(n, 0.001);
        let leg = Segment::from_coords(37.74, -122.47, 37.76, -122.44);

        group.bench_with_input(BenchmarkId::new("leg_5m", n), &n, |b, _| {
            b.iter(|| db.count_near(black_box(&leg), black_box(5.0)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("leg_100m", n), &n, |b, _| {
            b.iter(|| db.count_near(black_box(&leg), black_box(100.0)).unwrap())
        });
    }

    for &cell_size in &[0.0001, 0.001, 0.01] {
        let db = populated_db(100_000, cell_size);
        let leg = Segment::from_coords(37.74, -122.47, 37.76, -122.44);
        group.bench_with_input(
            BenchmarkId::new("cell_size", cell_size),
            &cell_size,
            |b, _| b.iter(|| db.count_near(black_box(&leg), black_box(5.0)).unwrap()),
        );
    }

    group.finish();
}

fn benchmark_points_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("points_in");

    let db = populated_db(100_000, 0.001);
    let boxes = [
        ("block", BoundingBox::new(37.751, 37.750, -122.449, -122.450)),
        ("neighbourhood", BoundingBox::new(37.76, 37.74, -122.43, -122.45)),
        ("city", BoundingBox::new(37.80, 37.70, -122.40, -122.50)),
    ];

    for (name, bbox) in boxes {
        group.bench_function(name, |b| {
            b.iter(|| db.points_in(black_box(&bbox)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_count_near,
    benchmark_points_in
);
criterion_main!(benches);
