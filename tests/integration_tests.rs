use incidex::{
    BoundingBox, Config, DistanceUnit, Incidex, IncidexError, LatLon, OnError, Segment,
};

fn degrees_db() -> Incidex {
    Incidex::memory_with_config(Config::default().with_distance_unit(DistanceUnit::Degrees))
        .expect("Failed to create database")
}

/// Test 1: Insert then get returns the stored coordinates
#[test]
fn test_insert_get_roundtrip() {
    let mut db = Incidex::memory().expect("Failed to create database");

    let coords = [
        (0.0, 0.0),
        (90.0, 180.0),
        (-90.0, -180.0),
        (37.774_929_5, -122.419_415_5),
        (-33.868_820_1, 151.209_295_8),
    ];

    for (lat, lon) in coords {
        let id = db.insert(lat, lon).expect("Failed to insert");
        let point = db.get(id).expect("Failed to get");
        assert_eq!(point.lat(), lat);
        assert_eq!(point.lon(), lon);
        assert_eq!(point.id(), id);
    }
    assert_eq!(db.len(), coords.len());
}

/// Test 2: Out-of-range coordinates are rejected without touching the store
#[test]
fn test_invalid_insert_rejected() {
    let mut db = Incidex::memory().expect("Failed to create database");
    db.insert(1.0, 1.0).expect("Failed to insert");

    for (lat, lon) in [
        (90.000_001, 0.0),
        (-91.0, 0.0),
        (0.0, 180.5),
        (0.0, -181.0),
        (f64::NAN, 0.0),
        (0.0, f64::INFINITY),
    ] {
        let err = db.insert(lat, lon).unwrap_err();
        assert!(
            matches!(err, IncidexError::InvalidCoordinate { .. }),
            "({}, {}) gave {:?}",
            lat,
            lon,
            err
        );
        assert_eq!(db.len(), 1);
    }
}

/// Test 3: Unknown ids fail with NotFound
#[test]
fn test_get_unknown_id() {
    let mut db = Incidex::memory().expect("Failed to create database");
    let id = db.insert(1.0, 1.0).expect("Failed to insert");
    assert!(matches!(db.get(id + 1), Err(IncidexError::NotFound(_))));
    assert!(matches!(db.get(0), Err(IncidexError::NotFound(0))));
}

/// Test 4: Region containment returns matches in ascending id order
#[test]
fn test_points_in_region() {
    let mut db = Incidex::memory().expect("Failed to create database");
    db.bulk_insert([(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)])
        .expect("Failed to insert");

    let found = db
        .points_in(&BoundingBox::new(25.0, 5.0, 25.0, 5.0))
        .expect("Query failed");
    assert_eq!(
        found,
        vec![LatLon::new(10.0, 10.0), LatLon::new(20.0, 20.0)]
    );

    let same = db
        .points_in_bounds(25.0, 5.0, 25.0, 5.0)
        .expect("Query failed");
    assert_eq!(found, same);
}

/// Test 5: Repeated region queries with no writes in between are identical
#[test]
fn test_region_reads_are_idempotent() {
    let mut db = Incidex::memory().expect("Failed to create database");
    for i in 0..500 {
        let lat = 40.0 + ((i * 37) % 100) as f64 * 0.001;
        let lon = -74.0 + ((i * 53) % 100) as f64 * 0.001;
        db.insert(lat, lon).expect("Failed to insert");
    }

    let bbox = BoundingBox::new(40.05, 40.01, -73.95, -73.99);
    let first = db.points_in(&bbox).expect("Query failed");
    let second = db.points_in(&bbox).expect("Query failed");
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

/// Test 6: Inverted boxes fail and leave the store untouched
#[test]
fn test_inverted_bounding_box() {
    let mut db = Incidex::memory().expect("Failed to create database");
    db.insert(10.0, 10.0).expect("Failed to insert");

    assert!(matches!(
        db.points_in_bounds(5.0, 25.0, 25.0, 5.0),
        Err(IncidexError::InvalidBoundingBox(_))
    ));
    assert!(matches!(
        db.points_in_bounds(25.0, 5.0, 5.0, 25.0),
        Err(IncidexError::InvalidBoundingBox(_))
    ));
    assert_eq!(db.len(), 1);
    assert_eq!(db.index().len(), 1);
}

/// Test 7: Proximity along a segment in degree space
#[test]
fn test_proximity_in_degrees() {
    let mut db = degrees_db();
    db.insert(0.0, 5.0).expect("Failed to insert");
    let segment = Segment::from_coords(0.0, 0.0, 0.0, 10.0);
    assert_eq!(db.count_near(&segment, 1.0).expect("Query failed"), 1);

    let mut db = degrees_db();
    db.insert(5.0, 5.0).expect("Failed to insert");
    assert_eq!(db.count_near(&segment, 1.0).expect("Query failed"), 0);
}

/// Test 8: A zero-length segment is a point-distance check
#[test]
fn test_degenerate_segment() {
    let mut db = degrees_db();
    db.bulk_insert([(3.0, 4.0), (0.0, 0.0), (6.0, 8.0)])
        .expect("Failed to insert");

    let point = Segment::from_coords(0.0, 0.0, 0.0, 0.0);
    assert!(point.is_degenerate());
    assert_eq!(db.count_near(&point, 0.0).expect("Query failed"), 1);
    assert_eq!(db.count_near(&point, 5.0).expect("Query failed"), 2);
    assert_eq!(db.count_near(&point, 10.0).expect("Query failed"), 3);
}

/// Test 9: Empty store answers 0 and an empty region
#[test]
fn test_empty_store_queries() {
    let db = Incidex::memory().expect("Failed to create database");
    let segment = Segment::from_coords(37.77, -122.42, 37.78, -122.41);
    assert_eq!(db.count_near(&segment, 100.0).expect("Query failed"), 0);
    assert!(
        db.points_in_bounds(90.0, -90.0, 180.0, -180.0)
            .expect("Query failed")
            .is_empty()
    );
}

/// Test 10: One malformed line in a ten-line source is skipped and reported
#[test]
fn test_seed_skip_and_report() {
    let mut db = Incidex::memory().expect("Failed to create database");

    let mut lines: Vec<String> = (0..9)
        .map(|i| format!("{} {}", 37.0 + i as f64 * 0.01, -122.0))
        .collect();
    lines.insert(6, "37.5,-122.0".to_string());

    let report = db.seed_from_source(&lines).expect("Seeding failed");
    assert_eq!(report.inserted_count, 9);
    assert_eq!(db.len(), 9);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line_number, 7);
    assert_eq!(report.errors[0].line, "37.5,-122.0");

    let err = report.errors[0].clone().into_error();
    assert!(matches!(err, IncidexError::Parse { line_number: 7, .. }));
}

/// Test 11: Abort policy rejects the whole source on the first bad line
#[test]
fn test_seed_abort() {
    let mut db = Incidex::memory_with_config(Config::default().with_on_error(OnError::Abort))
        .expect("Failed to create database");

    let err = db
        .seed_from_source(["10 10", "20 20", "95 20", "oops", "30 30"])
        .unwrap_err();
    match err {
        IncidexError::Parse {
            line_number, line, ..
        } => {
            assert_eq!(line_number, 3);
            assert_eq!(line, "95 20");
        }
        other => panic!("expected Parse, got {:?}", other),
    }
    assert!(db.is_empty());

    let report = db
        .seed_from_source(["10 10", "20 20"])
        .expect("Seeding failed");
    assert_eq!(report.inserted_ids, vec![1, 2]);
}

/// Test 12: Bulk insert stops at the first invalid entry
#[test]
fn test_bulk_insert_reports_position() {
    let mut db = Incidex::memory().expect("Failed to create database");

    match db.bulk_insert([(1.0, 1.0), (2.0, 2.0), (3.0, 200.0), (4.0, 4.0)]) {
        Err(IncidexError::BulkInsert {
            inserted,
            position,
            source,
        }) => {
            assert_eq!(inserted, vec![1, 2]);
            assert_eq!(position, 2);
            assert!(matches!(*source, IncidexError::InvalidCoordinate { .. }));
        }
        other => panic!("expected BulkInsert, got {:?}", other),
    }
    assert_eq!(db.len(), 2);
}

/// Test 13: Meter thresholds around a San Francisco route leg
#[test]
fn test_route_leg_scoring_in_meters() {
    let mut db = Incidex::memory().expect("Failed to create database");
    // Roughly 0, 3, 9 and 40 meters north of the leg.
    db.bulk_insert([
        (37.775_000, -122.419_0),
        (37.775_027, -122.418_5),
        (37.775_081, -122.418_0),
        (37.775_360, -122.418_0),
    ])
    .expect("Failed to insert");

    let leg = Segment::from_coords(37.775, -122.420, 37.775, -122.417);
    assert_eq!(db.count_near_default(&leg).expect("Query failed"), 2);
    assert_eq!(db.count_near(&leg, 10.0).expect("Query failed"), 3);
    assert_eq!(db.count_near(&leg, 50.0).expect("Query failed"), 4);
    assert_eq!(
        db.count_near_coords(37.775, -122.420, 37.775, -122.417, 10.0)
            .expect("Query failed"),
        3
    );
}

/// Test 14: Negative thresholds are rejected
#[test]
fn test_invalid_distance() {
    let db = Incidex::memory().expect("Failed to create database");
    let leg = Segment::from_coords(0.0, 0.0, 1.0, 1.0);
    assert!(matches!(
        db.count_near(&leg, -5.0),
        Err(IncidexError::InvalidDistance(_))
    ));
    assert!(matches!(
        db.count_near(&leg, f64::NAN),
        Err(IncidexError::InvalidDistance(_))
    ));
}

/// Test 15: Configuration loaded from JSON drives the database
#[test]
fn test_config_from_json() {
    let config = Config::from_json(
        r#"{
            "cell_size_degrees": 0.5,
            "distance_unit": "degrees",
            "proximity_distance": 1.0,
            "max_region_results": 2,
            "ingest": { "onError": "skipAndReport" }
        }"#,
    )
    .expect("Failed to parse config");

    let mut db = Incidex::memory_with_config(config).expect("Failed to create database");
    db.bulk_insert([(0.0, 5.0), (5.0, 5.0), (0.5, 9.0)])
        .expect("Failed to insert");

    let leg = Segment::from_coords(0.0, 0.0, 0.0, 10.0);
    assert_eq!(db.count_near_default(&leg).expect("Query failed"), 2);
    assert!(matches!(
        db.points_in_bounds(10.0, -10.0, 10.0, -10.0),
        Err(IncidexError::RegionLimitExceeded { limit: 2, matched: 3 })
    ));
}

/// Test 16: Store iteration is restartable and ordered by id
#[test]
fn test_all_is_restartable() {
    let mut db = Incidex::memory().expect("Failed to create database");
    db.bulk_insert([(3.0, 3.0), (1.0, 1.0), (2.0, 2.0)])
        .expect("Failed to insert");

    let first: Vec<_> = db.all().map(|p| p.id()).collect();
    let second: Vec<_> = db.all().map(|p| p.id()).collect();
    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(first, second);
}

/// Test 17: Seeding from a file on disk
#[test]
fn test_seed_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "40.7128 -74.0060").unwrap();
    writeln!(file, "51.5074 -0.1278").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "48.8566 2.3522").unwrap();
    file.flush().unwrap();

    let mut db = Incidex::memory().expect("Failed to create database");
    let report = db.seed_from_file(file.path()).expect("Seeding failed");
    assert_eq!(report.inserted_count, 3);
    assert!(report.is_clean());
}
