//! Similar-day baseline regression.
//!
//! For every predicted day the model ranks qualifying history days by a
//! [`DaySimilarity`] score, keeps the best `weighting_days`, and aggregates
//! their time-of-day profiles into a predicted profile which is then laid
//! onto the output grid.
//!
//! Candidates come from outside the predicted window. When the window spans
//! the whole load history there is nothing outside it, so each day is
//! predicted from every other day instead.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::{debug, info};

use super::config::BaselineConfig;
use super::profile::{build_day_profile, day_context, DayProfile};
use super::similarity::{DayContext, DaySimilarity, DayTypeSimilarity, TemperatureSimilarity};
use crate::domain::{day_bounds, local_date, output_time_grid, time_of_day_seconds, Series, Step};
use crate::error::{LoadshapeError, Result};

/// Fewest temperature-bearing days needed to fit a bucket regression
const MIN_REGRESSION_DAYS: usize = 3;

/// History days chosen for one predicted day, with their weights
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySelection {
    pub date: NaiveDate,
    pub selected: Vec<(NaiveDate, f64)>,
}

/// Transient result of a fit: the prediction plus what went into it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineFit {
    pub prediction: Series,
    pub qualifying_days: usize,
    pub selections: Vec<DaySelection>,
}

#[derive(Debug)]
pub struct BaselineModel {
    config: BaselineConfig,
    similarity: Option<Arc<dyn DaySimilarity>>,
}

impl BaselineModel {
    pub fn new(config: BaselineConfig) -> Self {
        Self {
            config,
            similarity: None,
        }
    }

    /// Replace the default scorer (temperature-aware when temperatures are supplied).
    pub fn with_similarity(mut self, similarity: Arc<dyn DaySimilarity>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Predict load over `[window_start, window_end]` from the history in `load`.
    pub fn predict(
        &self,
        load: &Series,
        temperature: Option<&Series>,
        excluded: impl Fn(NaiveDate) -> bool,
        window_start: i64,
        window_end: i64,
    ) -> Result<Series> {
        self.fit(load, temperature, excluded, window_start, window_end)
            .map(|fit| fit.prediction)
    }

    pub fn fit(
        &self,
        load: &Series,
        temperature: Option<&Series>,
        excluded: impl Fn(NaiveDate) -> bool,
        window_start: i64,
        window_end: i64,
    ) -> Result<BaselineFit> {
        if window_end < window_start {
            return Err(LoadshapeError::invalid_window(
                window_start,
                window_end,
                "end precedes start",
            ));
        }
        let tz = load.timezone();
        let interval = self.config.modeling_interval();
        let buckets = self.config.buckets_per_day();
        let insufficient = |qualifying: usize, start: i64, end: i64| {
            LoadshapeError::InsufficientData {
                window_start: start,
                window_end: end,
                qualifying,
                required: self.config.min_history_days(),
            }
        };

        let (Some(first), Some(last)) = (load.start_at(), load.end_at()) else {
            return Err(insufficient(0, window_start, window_end));
        };

        let history: Vec<DayProfile> = dates_between(local_date(first, tz)?, local_date(last, tz)?)
            .filter(|date| !excluded(*date))
            .filter_map(|date| build_day_profile(date, load, temperature, buckets, interval, tz))
            .collect();
        debug!(qualifying = history.len(), "history days partitioned");
        if history.len() < self.config.min_history_days() {
            return Err(insufficient(history.len(), window_start, window_end));
        }

        let default_similarity: Box<dyn DaySimilarity> = match temperature {
            Some(_) => Box::new(TemperatureSimilarity::default()),
            None => Box::new(DayTypeSimilarity::default()),
        };
        let similarity = self.similarity.as_deref().unwrap_or(default_similarity.as_ref());

        let first_target = local_date(window_start, tz)?;
        let last_target = local_date(window_end, tz)?;
        let leave_one_out =
            first_target <= local_date(first, tz)? && last_target >= local_date(last, tz)?;
        let held_out = |candidate: NaiveDate, target: NaiveDate| {
            if leave_one_out {
                candidate == target
            } else {
                (first_target..=last_target).contains(&candidate)
            }
        };

        let mut profiles: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        let mut selections = Vec::new();
        for date in dates_between(first_target, last_target) {
            let (target, target_temps) = day_context(date, temperature, buckets, interval, tz);
            let candidates: Vec<&DayProfile> = history
                .iter()
                .filter(|day| !held_out(day.context.date, date))
                .collect();
            let selected =
                select_days(&target, &candidates, similarity, self.config.weighting_days());
            if selected.is_empty() {
                let candidates = candidates.len();
                let (start, end) = day_bounds(date, tz)?;
                return Err(insufficient(candidates, start, end));
            }

            let profile = (0..buckets)
                .map(|b| {
                    let adjusted = if self.config.temperature_adjustment() {
                        target_temps[b].and_then(|t| regress_bucket(&selected, b, t))
                    } else {
                        None
                    };
                    adjusted.unwrap_or_else(|| weighted_mean(&selected, b))
                })
                .collect();
            profiles.insert(date, profile);
            selections.push(DaySelection {
                date,
                selected: selected
                    .iter()
                    .map(|(day, weight)| (day.context.date, *weight))
                    .collect(),
            });
        }

        let grid = output_time_grid(window_start, window_end, Step::Size(self.config.step_size()))?;
        let mut points = Vec::with_capacity(grid.len());
        for t in grid {
            let profile = profiles
                .get(&local_date(t, tz)?)
                .ok_or_else(|| insufficient(history.len(), window_start, window_end))?;
            let position = time_of_day_seconds(t, tz)? as f64 / interval as f64;
            points.push((t, interpolate_profile(profile, position)));
        }

        info!(
            qualifying_days = history.len(),
            predicted_days = profiles.len(),
            weighting_days = self.config.weighting_days(),
            similarity = similarity.name(),
            points = points.len(),
            "baseline fitted"
        );
        Ok(BaselineFit {
            prediction: Series::from_sorted(points, tz),
            qualifying_days: history.len(),
            selections,
        })
    }
}

fn dates_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

/// Rank candidates by score, then by closeness in days, most recent first on exact ties.
fn select_days<'a>(
    target: &DayContext,
    candidates: &[&'a DayProfile],
    similarity: &dyn DaySimilarity,
    weighting_days: usize,
) -> Vec<(&'a DayProfile, f64)> {
    let mut scored: Vec<(&DayProfile, f64)> = candidates
        .iter()
        .map(|day| (*day, similarity.score(target, &day.context)))
        .filter(|(_, score)| *score > 0.0 && score.is_finite())
        .collect();
    scored.sort_by_key(|(day, score)| {
        let distance = (day.context.date - target.date).num_days().abs();
        (Reverse(OrderedFloat(*score)), distance, Reverse(day.context.date))
    });
    scored.truncate(weighting_days);
    scored
}

fn weighted_mean(selected: &[(&DayProfile, f64)], bucket: usize) -> f64 {
    let total: f64 = selected.iter().map(|(_, w)| w).sum();
    selected
        .iter()
        .map(|(day, w)| day.load[bucket] * w)
        .sum::<f64>()
        / total
}

/// Weighted least squares of bucket load on bucket temperature, evaluated at
/// `target_temp`. `None` when the fit is underdetermined.
fn regress_bucket(selected: &[(&DayProfile, f64)], bucket: usize, target_temp: f64) -> Option<f64> {
    let samples: Vec<(f64, f64, f64)> = selected
        .iter()
        .filter_map(|(day, w)| day.temperature[bucket].map(|t| (t, day.load[bucket], *w)))
        .collect();
    if samples.len() < MIN_REGRESSION_DAYS {
        return None;
    }

    let sw: f64 = samples.iter().map(|(_, _, w)| w).sum();
    let mx = samples.iter().map(|(x, _, w)| x * w).sum::<f64>() / sw;
    let my = samples.iter().map(|(_, y, w)| y * w).sum::<f64>() / sw;
    let sxx: f64 = samples.iter().map(|(x, _, w)| w * (x - mx).powi(2)).sum();
    if sxx / sw < 1e-9 {
        return None;
    }
    let sxy: f64 = samples.iter().map(|(x, y, w)| w * (x - mx) * (y - my)).sum();
    let slope = sxy / sxx;
    Some(my + slope * (target_temp - mx))
}

/// Linear interpolation between buckets; past the last bucket the value is held.
fn interpolate_profile(profile: &[f64], position: f64) -> f64 {
    let k = position.floor() as usize;
    let frac = position - k as f64;
    match (profile.get(k), profile.get(k + 1)) {
        (Some(a), Some(b)) => a + (b - a) * frac,
        (Some(a), None) => *a,
        _ => profile.last().copied().unwrap_or(0.0),
    }
}
