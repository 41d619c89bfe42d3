//! Per-day load and temperature profiles at modeling-interval granularity.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;

use super::similarity::DayContext;
use crate::domain::{local_instant, Series};

/// Epoch instant of bucket `k`. Buckets falling in a DST gap move forward by an hour.
fn bucket_instant(date: NaiveDate, bucket: usize, interval: i64, tz: Tz) -> Option<i64> {
    let offset = bucket as i64 * interval;
    local_instant(date, offset, tz).or_else(|| local_instant(date, offset + 3600, tz))
}

/// Value of a series for the bucket ending at `instant`.
///
/// Samples inside `(instant - interval, instant]` are averaged; a coarser
/// series is interpolated at `instant`. `None` outside the series domain.
fn bucket_value(series: &Series, instant: i64, interval: i64) -> Option<f64> {
    let (start, end) = (series.start_at()?, series.end_at()?);
    if instant < start || instant > end {
        return None;
    }
    let window = series.slice(instant - interval + 1, instant);
    window.mean_value().or_else(|| series.value_at(instant))
}

/// A qualifying history day
#[derive(Debug, Clone)]
pub(crate) struct DayProfile {
    pub context: DayContext,
    pub load: Vec<f64>,
    pub temperature: Vec<Option<f64>>,
}

/// Temperature per bucket plus the day's similarity context
pub(crate) fn day_context(
    date: NaiveDate,
    temperature: Option<&Series>,
    buckets: usize,
    interval: i64,
    tz: Tz,
) -> (DayContext, Vec<Option<f64>>) {
    let temps: Vec<Option<f64>> = (0..buckets)
        .map(|k| {
            let series = temperature?;
            let instant = bucket_instant(date, k, interval, tz)?;
            bucket_value(series, instant, interval)
        })
        .collect();

    let known: Vec<f64> = temps.iter().flatten().copied().collect();
    let mean_temperature = (!known.is_empty()).then(|| known.iter().sum::<f64>() / known.len() as f64);
    let peak_temperature = known.iter().copied().reduce(f64::max);

    let context = DayContext {
        date,
        weekday: date.weekday(),
        mean_temperature,
        peak_temperature,
    };
    (context, temps)
}

/// Build the profile of `date`, or `None` when any bucket lies outside the load domain.
pub(crate) fn build_day_profile(
    date: NaiveDate,
    load: &Series,
    temperature: Option<&Series>,
    buckets: usize,
    interval: i64,
    tz: Tz,
) -> Option<DayProfile> {
    let values: Option<Vec<f64>> = (0..buckets)
        .map(|k| {
            let instant = bucket_instant(date, k, interval, tz)?;
            bucket_value(load, instant, interval)
        })
        .collect();
    let load = values?;
    let (context, temperature) = day_context(date, temperature, buckets, interval, tz);
    Some(DayProfile {
        context,
        load,
        temperature,
    })
}
