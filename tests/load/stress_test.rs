//! Stress suite for year-long histories
//!
//! Key performance requirements:
//! - A full year of 15 minute data fits within a few seconds in release builds
//! - Cached queries (diff, event performance) stay cheap after the fit
//! - Fits on shared exclusion sets and tariffs run in parallel without interference

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono_tz::America::Los_Angeles;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use loadshape::domain::parse_local_datetime;
use loadshape::{BaselineConfig, ExclusionSet, Loadshape, Point, Tariff};

const STEP: i64 = 900;
const DAYS: i64 = 365;

fn year_of_load(seed: u64) -> Vec<Point> {
    let start = parse_local_datetime("2013-01-01 00:00:00", Los_Angeles).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    (0..DAYS * 96)
        .map(|i| {
            let hour = (i % 96) as f64 / 4.0;
            let shape = 12.0 + 8.0 * ((hour - 6.0) / 24.0 * std::f64::consts::TAU).sin();
            (start + i * STEP, (shape + noise.sample(&mut rng)).max(0.0))
        })
        .collect()
}

fn yearly_temperatures() -> Vec<Point> {
    let start = parse_local_datetime("2013-01-01 00:00:00", Los_Angeles).unwrap();
    (0..DAYS * 24)
        .map(|h| {
            let day = (h / 24) as f64;
            let seasonal = 15.0 + 10.0 * ((day - 100.0) / 365.0 * std::f64::consts::TAU).sin();
            (start + h * 3600, seasonal)
        })
        .collect()
}

/// Full-year fit, including both DST transitions
#[test]
#[ignore] // Ignore by default as this is a slow test
fn test_year_long_fit_latency() {
    let mut ls = Loadshape::new(year_of_load(11), "America/Los_Angeles").unwrap();
    ls.add_named_exclusion("US_HOLIDAYS").unwrap();

    let start = Instant::now();
    let points = ls.baseline(BaselineConfig::default()).unwrap().len();
    let elapsed = start.elapsed();

    println!("Year-long fit: {points} points in {elapsed:?}");
    assert!(points > (DAYS as usize - 1) * 96);
    assert!(
        elapsed < Duration::from_secs(30),
        "Fit too slow: {elapsed:?}"
    );
}

#[test]
#[ignore] // Ignore by default as this is a slow test
fn test_temperature_adjusted_fit() {
    let config = BaselineConfig::new(20, 900, 900)
        .unwrap()
        .with_temperature_adjustment(true);
    let mut ls = Loadshape::new(year_of_load(12), "America/Los_Angeles")
        .unwrap()
        .with_temperature(yearly_temperatures(), Default::default())
        .unwrap();

    let start = Instant::now();
    ls.baseline(config).unwrap();
    let metrics = ls.baseline_fit_metrics().unwrap();
    println!("Temperature-adjusted fit in {:?}: {metrics}", start.elapsed());
    assert!(metrics.r2 > 0.5, "{metrics}");
}

/// Cached queries after a fit
#[test]
#[ignore] // Ignore by default as this is a slow test
fn test_cached_query_throughput() {
    let mut ls = Loadshape::new(year_of_load(13), "America/Los_Angeles")
        .unwrap()
        .with_tariff(Arc::new(Tariff::flat(0.17, Los_Angeles).unwrap()));
    ls.baseline(BaselineConfig::default()).unwrap();
    let day_start = parse_local_datetime("2013-07-10 13:00:00", Los_Angeles).unwrap();

    let start = Instant::now();
    let mut operation_count = 0;
    while start.elapsed() < Duration::from_secs(2) {
        let offset = (operation_count % 300) as i64 * 86_400;
        ls.event_performance(day_start - offset, day_start - offset + 4 * 3600)
            .unwrap();
        operation_count += 1;
    }
    let ops_per_second = operation_count as f64 / start.elapsed().as_secs_f64();

    println!("Event performance: {ops_per_second:.0} ops/second");
    assert!(
        ops_per_second > 5.0,
        "Throughput too low: {ops_per_second:.0} ops/s"
    );
}

/// Shared read-only exclusions and tariff across independent fits
#[test]
#[ignore] // Ignore by default as this is a slow test
fn test_parallel_fits_share_inputs() {
    let mut exclusions = ExclusionSet::new();
    exclusions.add_named("US_HOLIDAYS").unwrap();
    let exclusions = Arc::new(exclusions);
    let tariff = Arc::new(Tariff::flat(0.2, Los_Angeles).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let exclusions = Arc::clone(&exclusions);
            let tariff = Arc::clone(&tariff);
            thread::spawn(move || {
                let mut ls = Loadshape::new(year_of_load(seed), "America/Los_Angeles")
                    .unwrap()
                    .with_exclusions(exclusions)
                    .with_tariff(tariff);
                ls.baseline(BaselineConfig::default()).unwrap().len()
            })
        })
        .collect();

    let lengths: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(lengths.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(Arc::strong_count(&exclusions), 1);
}
