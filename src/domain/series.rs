//! Ordered time-value container.
//!
//! Values are integrated with the interval-ending convention: the value at
//! point `i` is the mean power over `(t[i-1], t[i]]`, so the first point of a
//! series has no interval behind it and contributes no energy.

use chrono_tz::Tz;
use itertools::Itertools;
use serde::ser::{Serialize, Serializer};

use super::units::energy_kwh;
use crate::error::{LoadshapeError, Result};

/// `(epoch seconds, value)`
pub type Point = (i64, f64);

/// Grid spacing for resampling: either seconds per interval or a number of intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Size(i64),
    Count(usize),
}

/// Evenly spaced timestamps covering `[start_at, end_at]`.
///
/// `Step::Count(n)` yields `n + 1` points including both bounds.
/// `Step::Size(s)` yields `floor((end_at - start_at) / s) + 1` points starting at `start_at`.
pub fn output_time_grid(start_at: i64, end_at: i64, step: Step) -> Result<Vec<i64>> {
    if end_at < start_at {
        return Err(LoadshapeError::invalid_window(
            start_at,
            end_at,
            "end precedes start",
        ));
    }
    let span = end_at - start_at;
    match step {
        Step::Size(size) => {
            if size <= 0 {
                return Err(LoadshapeError::invalid_window(
                    start_at,
                    end_at,
                    format!("step size must be positive, got {size}"),
                ));
            }
            let n = span / size;
            Ok((0..=n).map(|i| start_at + i * size).collect())
        }
        Step::Count(count) => {
            if count == 0 {
                return Err(LoadshapeError::invalid_window(
                    start_at,
                    end_at,
                    "step count must be positive",
                ));
            }
            if span < count as i64 {
                return Err(LoadshapeError::invalid_window(
                    start_at,
                    end_at,
                    format!("{count} steps do not fit in {span} seconds"),
                ));
            }
            let span = i128::from(span);
            let count = count as i128;
            Ok((0..=count)
                .map(|i| start_at + (span * i / count) as i64)
                .collect())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<Point>,
    timezone: Tz,
}

impl Series {
    /// Build a series from raw pairs. Input is sorted by timestamp; duplicate
    /// timestamps and non-finite values are rejected.
    pub fn new(points: impl IntoIterator<Item = Point>, timezone: Tz) -> Result<Self> {
        let mut points: Vec<Point> = points.into_iter().collect();
        if let Some((t, v)) = points.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LoadshapeError::InvalidSeries(format!(
                "non-finite value {v} at timestamp {t}"
            )));
        }
        points.sort_by_key(|(t, _)| *t);
        if let Some(((t, _), _)) = points.iter().tuple_windows().find(|(a, b)| a.0 == b.0) {
            return Err(LoadshapeError::InvalidSeries(format!(
                "duplicate timestamp {t}"
            )));
        }
        Ok(Self { points, timezone })
    }

    pub fn empty(timezone: Tz) -> Self {
        Self {
            points: Vec::new(),
            timezone,
        }
    }

    /// Points must already be strictly increasing and finite.
    pub(crate) fn from_sorted(points: Vec<Point>, timezone: Tz) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        Self { points, timezone }
    }

    pub fn data(&self) -> &[Point] {
        &self.points
    }

    pub fn into_data(self) -> Vec<Point> {
        self.points
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn start_at(&self) -> Option<i64> {
        self.points.first().map(|(t, _)| *t)
    }

    pub fn end_at(&self) -> Option<i64> {
        self.points.last().map(|(t, _)| *t)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|(t, _)| *t)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    /// Spacing of an evenly spaced series; `None` for fewer than two points
    /// or irregular spacing.
    pub fn step_size(&self) -> Option<i64> {
        let first = self.points.get(1)?.0 - self.points.first()?.0;
        self.is_evenly_spaced().then_some(first)
    }

    pub fn is_evenly_spaced(&self) -> bool {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| b.0 - a.0)
            .all_equal()
    }

    /// Linearly interpolated value inside the domain, `None` outside it.
    pub fn value_at(&self, timestamp: i64) -> Option<f64> {
        let idx = self.points.partition_point(|(t, _)| *t < timestamp);
        let (t1, v1) = *self.points.get(idx)?;
        if t1 == timestamp {
            return Some(v1);
        }
        if idx == 0 {
            return None;
        }
        let (t0, v0) = self.points[idx - 1];
        let frac = (timestamp - t0) as f64 / (t1 - t0) as f64;
        Some(v0 + (v1 - v0) * frac)
    }

    /// Like [`Series::value_at`], but holds the boundary value outside the domain.
    fn value_at_clamped(&self, timestamp: i64) -> Option<f64> {
        let (first_t, first_v) = *self.points.first()?;
        let (last_t, last_v) = *self.points.last()?;
        if timestamp <= first_t {
            Some(first_v)
        } else if timestamp >= last_t {
            Some(last_v)
        } else {
            self.value_at(timestamp)
        }
    }

    /// Sample onto strictly increasing `timestamps`.
    ///
    /// Inside the domain values are linearly interpolated; outside it the
    /// nearest boundary value is carried.
    pub fn sample_at(&self, timestamps: &[i64]) -> Result<Series> {
        if self.is_empty() {
            return Err(LoadshapeError::alignment(
                "sample",
                "cannot sample an empty series",
            ));
        }
        if !timestamps.windows(2).all(|w| w[0] < w[1]) {
            return Err(LoadshapeError::alignment(
                "sample",
                "target timestamps must be strictly increasing",
            ));
        }
        let points = timestamps
            .iter()
            .filter_map(|&t| self.value_at_clamped(t).map(|v| (t, v)))
            .collect();
        Ok(Series::from_sorted(points, self.timezone))
    }

    /// Resample onto an evenly spaced grid over `[start_at, end_at]`.
    pub fn resample(&self, start_at: i64, end_at: i64, step: Step) -> Result<Series> {
        let grid = output_time_grid(start_at, end_at, step)?;
        self.sample_at(&grid)
    }

    /// Points with `start_at <= t <= end_at`. An empty result is not an error.
    pub fn slice(&self, start_at: i64, end_at: i64) -> Series {
        if start_at > end_at {
            return Series::empty(self.timezone);
        }
        let lo = self.points.partition_point(|(t, _)| *t < start_at);
        let hi = self.points.partition_point(|(t, _)| *t <= end_at);
        Series::from_sorted(self.points[lo..hi].to_vec(), self.timezone)
    }

    /// Elementwise `self - other` over the shared domain, keeping every aligned point.
    pub fn subtract(&self, other: &Series) -> Result<Series> {
        self.combine(other, "subtract", |a, b| a - b)
    }

    /// Elementwise `self - other`, dropping the first aligned point: it
    /// closes no interval and so carries no integrable difference.
    pub fn diff(&self, other: &Series) -> Result<Series> {
        let mut full = self.combine(other, "diff", |a, b| a - b)?;
        if !full.points.is_empty() {
            full.points.remove(0);
        }
        Ok(full)
    }

    pub fn add(&self, other: &Series) -> Result<Series> {
        self.combine(other, "add", |a, b| a + b)
    }

    pub fn scale(&self, factor: f64) -> Series {
        self.map(|v| v * factor)
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Series {
        let points = self.points.iter().map(|&(t, v)| (t, f(v))).collect();
        Series::from_sorted(points, self.timezone)
    }

    /// Round every value to `decimals` places, half away from zero.
    /// Presentation only; no computation in this crate rounds.
    pub fn round(&self, decimals: u32) -> Series {
        let factor = 10f64.powi(decimals as i32);
        self.map(|v| (v * factor).round() / factor)
    }

    /// `(previous timestamp, timestamp, value)` for every point after the first.
    pub fn intervals(&self) -> impl Iterator<Item = (i64, i64, f64)> + '_ {
        self.points
            .iter()
            .tuple_windows()
            .map(|(prev, cur)| (prev.0, cur.0, cur.1))
    }

    /// Running energy integral of a kW series, in kWh. The first point is zero.
    pub fn cumulative(&self) -> Series {
        let Some(&(first_t, _)) = self.points.first() else {
            return Series::empty(self.timezone);
        };
        let mut total = 0.0;
        let points = std::iter::once((first_t, 0.0))
            .chain(self.intervals().map(|(prev, t, v)| {
                total += energy_kwh(v, t - prev);
                (t, total)
            }))
            .collect();
        Series::from_sorted(points, self.timezone)
    }

    /// Total energy in kWh, the last value of [`Series::cumulative`].
    pub fn total_energy(&self) -> f64 {
        self.intervals()
            .map(|(prev, t, v)| energy_kwh(v, t - prev))
            .sum()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    pub fn mean_value(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.len() as f64)
    }

    fn combine(
        &self,
        other: &Series,
        operation: &'static str,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<Series> {
        let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) =
            (self.start_at(), self.end_at(), other.start_at(), other.end_at())
        else {
            return Err(LoadshapeError::alignment(operation, "empty operand"));
        };
        let lo = a_start.max(b_start);
        let hi = a_end.min(b_end);
        if lo > hi {
            return Err(LoadshapeError::alignment(
                operation,
                format!(
                    "domains [{a_start}, {a_end}] and [{b_start}, {b_end}] do not intersect"
                ),
            ));
        }

        let a = self.slice(lo, hi);
        let b = other.slice(lo, hi);
        if a.len() != b.len() || a.timestamps().zip(b.timestamps()).any(|(x, y)| x != y) {
            return Err(LoadshapeError::alignment(
                operation,
                format!("points in [{lo}, {hi}] are not on a common grid; resample both operands first"),
            ));
        }
        if !a.is_evenly_spaced() {
            return Err(LoadshapeError::alignment(
                operation,
                format!("points in [{lo}, {hi}] are not evenly spaced"),
            ));
        }

        let points = a
            .points
            .iter()
            .zip(b.points.iter())
            .map(|(&(t, x), &(_, y))| (t, op(x, y)))
            .collect();
        Ok(Series::from_sorted(points, self.timezone))
    }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.points.iter())
    }
}
