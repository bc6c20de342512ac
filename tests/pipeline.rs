//! Full pipeline tests
//!
//! Drives `LapComparison` through the public API with hand-built telemetry
//! tables, covering the reference scenarios and the failure messages users see.

use lapdelta::{
    AnalysisConfig, AnalysisError, Channel, CornerStatus, DetectionStrategy, LapComparison, SpeedUnit,
    TelemetryTable,
};

const DT: f64 = 0.05;

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Table on a 2 m distance grid with the given times and a zero brake trace.
fn gridded_table(times: Vec<f64>) -> TelemetryTable {
    let len = times.len();
    TelemetryTable::from_columns([
        (Channel::Distance, (0..len).map(|i| i as f64 * 2.0).collect()),
        (Channel::Time, times),
        (Channel::Speed, vec![40.0; len]),
        (Channel::Brake, vec![0.0; len]),
    ])
    .unwrap()
    .with_speed_unit(SpeedUnit::MetersPerSecond)
}

/// Table without a distance channel, built from speed and brake traces.
fn speed_table(speeds: Vec<f64>, brake: Vec<f64>) -> TelemetryTable {
    TelemetryTable::from_columns([
        (Channel::Time, (0..speeds.len()).map(|i| i as f64 * DT).collect()),
        (Channel::Speed, speeds),
        (Channel::Brake, brake),
    ])
    .unwrap()
    .with_speed_unit(SpeedUnit::MetersPerSecond)
}

/// Comparison lap whose clock runs 1% slow after sample 500.
fn stretched_laps() -> (TelemetryTable, TelemetryTable) {
    let reference: Vec<f64> = (0..1000).map(|i| i as f64 * DT).collect();
    let split = reference[500];
    let comparison = reference.iter().map(|&t| if t > split { split + (t - split) * 1.01 } else { t }).collect();
    (gridded_table(reference), gridded_table(comparison))
}

#[test]
fn stretched_comparison_lap() {
    init_tracing();
    let (reference, comparison) = stretched_laps();
    let report = LapComparison::new(AnalysisConfig::new(4)).unwrap().run(&reference, &comparison).unwrap();

    let points = report.delta.points();
    assert_eq!(points.len(), 1000);
    for point in &points[..=500] {
        assert_eq!(point.delta_time, 0.0);
    }

    // Reference is ahead, so the delta falls linearly from sample 500 on.
    for (i, point) in points.iter().enumerate().skip(501) {
        let expected = -0.01 * (i - 500) as f64 * DT;
        assert!((point.delta_time - expected).abs() < 1e-9, "sample {i}: {}", point.delta_time);
    }

    let sectors = &report.sectors;
    assert_eq!(sectors.len(), 4);
    assert_eq!(sectors[0].delta, 0.0);
    assert_eq!(sectors[1].delta, 0.0);
    assert!(sectors[2].delta < 0.0);
    assert!(sectors[3].delta < 0.0);

    assert_eq!(report.summary.total_distance, 1998.0);
    assert_eq!(report.summary.max_time_loss, 0.0);
    assert_eq!(report.corner_status, CornerStatus::NoCornersDetected);
}

/// Reference brakes from 50 to 30 m/s and exits at 45; comparison stays flat out.
fn single_braking_event() -> (TelemetryTable, TelemetryTable) {
    let len = 300;
    let speeds = (0..len)
        .map(|i| match i {
            0..120 => 50.0,
            120..130 => 50.0 - 2.0 * (i - 120) as f64,
            130..145 => 30.0 + (i - 130) as f64,
            _ => 45.0,
        })
        .collect();
    let brake = (0..len).map(|i| if (115..131).contains(&i) { 0.3 } else { 0.0 }).collect();

    (speed_table(speeds, brake), speed_table(vec![50.0; len], vec![0.0; len]))
}

#[test]
fn one_sided_corner_gives_empty_pairing() {
    init_tracing();
    let (reference, comparison) = single_braking_event();
    let report = LapComparison::new(AnalysisConfig::new(3)).unwrap().run(&reference, &comparison).unwrap();

    assert_eq!(report.reference_corners.len(), 1);
    assert!(report.comparison_corners.is_empty());
    assert!(report.corner_deltas.is_empty());
    assert_eq!(report.corner_status, CornerStatus::NoCornersDetected);
    assert_eq!(report.summary.corners_detected, 1);
    assert_eq!(report.corner_table.to_string(), "No corners detected");

    let corner = report.reference_corners[0];
    assert_eq!(corner.apex_index, 130);
    assert_eq!(corner.min_speed, 30.0);
    assert!(corner.entry_speed - corner.min_speed >= 8.0);
}

#[test]
fn strategies_are_selectable() {
    let (reference, comparison) = single_braking_event();
    for strategy in [
        DetectionStrategy::default(),
        DetectionStrategy::LocalMinimum,
        DetectionStrategy::Prominence { min_prominence: 1.5, min_separation_s: 0.5 },
    ] {
        let mut config = AnalysisConfig::new(3);
        config.corners.strategy = strategy.clone();
        let report = LapComparison::new(config).unwrap().run(&reference, &comparison).unwrap();
        assert_eq!(report.reference_corners.len(), 1, "{strategy:?}");
    }
}

#[test]
fn pipeline_is_deterministic() {
    let (reference, comparison) = stretched_laps();
    let comparison_pipeline = LapComparison::new(AnalysisConfig::new(5)).unwrap();

    let render = || {
        let report = comparison_pipeline.run(&reference, &comparison).unwrap();
        format!(
            "{}\n{}\n{}\n{:?}",
            report.summary, report.sector_table, report.corner_table, report.delta
        )
    };
    assert_eq!(render(), render());
}

#[test]
fn declared_units_give_identical_laps() {
    let speeds_mps = vec![50.0; 100];
    let brake = vec![0.0; 100];
    let metric = speed_table(speeds_mps.clone(), brake.clone());
    let imperial = speed_table(speeds_mps.iter().map(|v| v * 3.6).collect(), brake)
        .with_speed_unit(SpeedUnit::KilometersPerHour);

    let report = LapComparison::new(AnalysisConfig::new(2)).unwrap().run(&metric, &imperial).unwrap();
    assert!(report.delta.points().iter().all(|p| p.delta_time.abs() < 1e-9));
}

#[test]
fn missing_speed_names_the_channel() {
    let table = TelemetryTable::from_columns([
        (Channel::Distance, vec![0.0, 1.0, 2.0]),
        (Channel::Time, vec![0.0, 0.1, 0.2]),
    ])
    .unwrap();

    let err = LapComparison::new(AnalysisConfig::new(1)).unwrap().run(&table, &table).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingChannel { channel: Channel::Speed, .. }));
    assert!(err.to_string().contains("'speed'"));
    assert!(err.is_fatal());
}

#[test]
fn single_sample_lap_has_no_overlap() {
    let (reference, _) = stretched_laps();
    let single = gridded_table(vec![0.0]);

    let err = LapComparison::new(AnalysisConfig::new(1)).unwrap().run(&reference, &single).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientOverlap { .. }));
    assert!(err.to_string().contains("common distance range"));
}

#[test]
fn config_from_yaml_drives_the_pipeline() {
    let config = AnalysisConfig::from_yaml_str(
        "sectors: 2\ncorners:\n  strategy:\n    kind: local_minimum\nranking: time_delta\n",
    )
    .unwrap();
    let (reference, comparison) = single_braking_event();

    let report = LapComparison::new(config).unwrap().run(&reference, &comparison).unwrap();
    assert_eq!(report.sectors.len(), 2);
    assert_eq!(report.sector_table.rows.len(), 2);
    assert_eq!(report.sector_table.rows[0].sector, "S1");
}
