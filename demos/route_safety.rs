//! Route Safety Example
//!
//! Seeds an incident index from `lat lon` lines, scores each leg of a walking
//! route by the incidents near it, and renders the visible map region as a
//! GeoJSON heat layer. Run with `RUST_LOG=info` to see ingestion logs.

use incidex::{BoundingBox, Config, DBBuilder, Segment};
use std::error::Error;
use std::io::Write;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== Route Safety Scoring with incidex ===\n");

    // === 1. Seed incidents from a file ===
    println!("1. Seeding incidents");

    let mut seed = tempfile::NamedTempFile::new()?;
    for i in 0..200 {
        let lat = 37.7740 + (i % 20) as f64 * 0.0001;
        let lon = -122.4200 + (i / 20) as f64 * 0.0002;
        writeln!(seed, "{:.6} {:.6}", lat, lon)?;
    }
    writeln!(seed, "37.7750 -122.4190 extra")?;
    writeln!(seed, "not a coordinate")?;
    seed.flush()?;

    let (db, report) = DBBuilder::new()
        .config(Config::default().with_proximity_distance(5.0))
        .seed_path(seed.path())
        .build_with_report()?;

    if let Some(report) = report {
        println!("   Inserted {} incidents", report.inserted_count);
        for error in &report.errors {
            println!("   Skipped line {}: {}", error.line_number, error.reason);
        }
    }
    println!();

    // === 2. Score a route leg by leg ===
    println!("2. Scoring route legs (threshold {} m)", db.config().proximity_distance);

    let route = [
        (37.7738, -122.4205),
        (37.7750, -122.4195),
        (37.7750, -122.4180),
        (37.7765, -122.4170),
    ];
    let mut total = 0;
    for (i, leg) in route.windows(2).enumerate() {
        let segment = Segment::from_coords(leg[0].0, leg[0].1, leg[1].0, leg[1].1);
        let count = db.count_near_default(&segment)?;
        total += count;
        println!(
            "   Leg {}: ({:.4}, {:.4}) -> ({:.4}, {:.4}): {} incidents",
            i + 1,
            leg[0].0,
            leg[0].1,
            leg[1].0,
            leg[1].1,
            count
        );
    }
    println!("   Route total: {} incidents\n", total);

    // === 3. Heat overlay for the visible region ===
    println!("3. Heat overlay");

    let view = BoundingBox::new(37.7755, 37.7745, -122.4185, -122.4200);
    let points = db.points_in(&view)?;
    println!("   {} incidents inside the view", points.len());

    #[cfg(feature = "geojson")]
    {
        let layer = db.points_in_geojson(&view)?;
        let json = serde_json::to_string(&layer)?;
        println!("   GeoJSON layer: {} bytes", json.len());
    }

    let stats = db.stats();
    println!(
        "\n   Index: {} points in {} cells (largest {}), cell size {} degrees",
        stats.points, stats.occupied_cells, stats.largest_cell, stats.cell_size_degrees
    );

    Ok(())
}
