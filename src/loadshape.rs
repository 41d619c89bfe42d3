//! Façade tying load, temperature, exclusions and tariff to a cached baseline.
//!
//! Every exclusion or tariff mutation bumps a version counter; a cached
//! baseline is only served while its version matches the current one.

use std::sync::Arc;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::{ExclusionSet, NamedExclusion};
use crate::domain::{
    energy_kwh, parse_local_datetime, parse_timezone, Point, Series, Step, TemperatureUnit,
};
use crate::error::{LoadshapeError, Result};
use crate::forecast::{BaselineConfig, BaselineFit, BaselineModel, DaySimilarity, FitMetrics};
use crate::tariff::{CostResult, Tariff};

/// Output of [`Loadshape::diff`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffResult {
    /// Actual minus baseline, first aligned point dropped
    pub kw_diff: Series,
    /// Baseline over the same points as `kw_diff`
    pub kw_base: Series,
    pub cumulative_kwh_diff: Series,
    pub cumulative_kwh_base: Series,
}

impl DiffResult {
    pub fn into_tuple(self) -> (Series, Series, Series, Series) {
        (
            self.kw_diff,
            self.kw_base,
            self.cumulative_kwh_diff,
            self.cumulative_kwh_base,
        )
    }
}

/// Actual versus baseline over one event window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPerformance {
    pub start_at: i64,
    pub end_at: i64,
    pub total_actual_kwh: f64,
    pub total_baseline_kwh: f64,
    /// Baseline minus actual
    pub kwh_reduction: f64,
    /// `None` when the baseline energy is zero
    pub percent_reduction: Option<f64>,
    pub actual_cost: Option<f64>,
    pub baseline_cost: Option<f64>,
    pub cost_avoided: Option<f64>,
    pub peak_kw_reduction: f64,
    pub average_kw_reduction: f64,
    pub kwh_reduction_per_sq_ft: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    window: (i64, i64),
    /// `None` for a baseline installed with [`Loadshape::set_baseline`]
    config: Option<BaselineConfig>,
    version: u64,
}

#[derive(Debug, Clone)]
struct CachedBaseline {
    key: CacheKey,
    series: Series,
}

#[derive(Debug, Clone)]
pub struct Loadshape {
    load: Series,
    temperature: Option<Series>,
    exclusions: Arc<ExclusionSet>,
    tariff: Option<Arc<Tariff>>,
    similarity: Option<Arc<dyn DaySimilarity>>,
    floor_area: Option<f64>,
    version: u64,
    cache: Option<CachedBaseline>,
}

impl Loadshape {
    /// Build from raw kW points and an IANA timezone name.
    pub fn new(load_points: impl IntoIterator<Item = Point>, timezone: &str) -> Result<Self> {
        let tz = parse_timezone(timezone)?;
        Ok(Self::from_series(Series::new(load_points, tz)?))
    }

    pub fn from_series(load: Series) -> Self {
        Self {
            load,
            temperature: None,
            exclusions: Arc::new(ExclusionSet::new()),
            tariff: None,
            similarity: None,
            floor_area: None,
            version: 0,
            cache: None,
        }
    }

    /// Attach outdoor temperatures, converted to Celsius.
    pub fn with_temperature(
        mut self,
        points: impl IntoIterator<Item = Point>,
        unit: TemperatureUnit,
    ) -> Result<Self> {
        let celsius = points.into_iter().map(|(t, v)| (t, unit.to_celsius(v)));
        self.temperature = Some(Series::new(celsius, self.timezone())?);
        self.touch("temperature attached");
        Ok(self)
    }

    /// Share an exclusion set built elsewhere. Later mutations copy on write.
    pub fn with_exclusions(mut self, exclusions: Arc<ExclusionSet>) -> Self {
        self.exclusions = exclusions;
        self.touch("exclusions replaced");
        self
    }

    pub fn with_tariff(mut self, tariff: Arc<Tariff>) -> Self {
        self.set_tariff(tariff);
        self
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn DaySimilarity>) -> Self {
        self.similarity = Some(similarity);
        self.touch("similarity replaced");
        self
    }

    /// Conditioned floor area in square feet, used for intensity figures
    pub fn with_floor_area(mut self, sq_ft: f64) -> Self {
        self.floor_area = (sq_ft.is_finite() && sq_ft > 0.0).then_some(sq_ft);
        self
    }

    pub fn timezone(&self) -> Tz {
        self.load.timezone()
    }

    pub fn load(&self) -> &Series {
        &self.load
    }

    pub fn temperature(&self) -> Option<&Series> {
        self.temperature.as_ref()
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn tariff(&self) -> Option<&Tariff> {
        self.tariff.as_deref()
    }

    /// Mutation counter; bumped by every change that can alter a baseline
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self, reason: &'static str) {
        self.version += 1;
        if self.cache.take().is_some() {
            debug!(version = self.version, reason, "cached baseline invalidated");
        }
    }

    pub fn add_exclusion(&mut self, start: i64, end: i64) -> Result<()> {
        Arc::make_mut(&mut self.exclusions).add_range(start, end)?;
        self.touch("exclusion added");
        Ok(())
    }

    /// Exclude a window given as local datetimes, e.g. `"2013-09-18 13:00:00"`.
    pub fn add_exclusion_local(&mut self, start: &str, end: &str) -> Result<()> {
        let tz = self.timezone();
        let start = parse_local_datetime(start, tz)?;
        let end = parse_local_datetime(end, tz)?;
        self.add_exclusion(start, end)
    }

    pub fn add_named_exclusion(&mut self, rule_name: &str) -> Result<NamedExclusion> {
        let rule = Arc::make_mut(&mut self.exclusions).add_named(rule_name)?;
        self.touch("named exclusion added");
        Ok(rule)
    }

    pub fn set_tariff(&mut self, tariff: impl Into<Arc<Tariff>>) {
        let tariff = tariff.into();
        info!(tariff = tariff.name(), "tariff attached");
        self.tariff = Some(tariff);
        self.touch("tariff attached");
    }

    /// Install an externally computed baseline at the current version.
    pub fn set_baseline(&mut self, baseline: Series) {
        let window = (
            baseline.start_at().unwrap_or_default(),
            baseline.end_at().unwrap_or_default(),
        );
        self.cache = Some(CachedBaseline {
            key: CacheKey {
                window,
                config: None,
                version: self.version,
            },
            series: baseline,
        });
    }

    fn load_window(&self) -> Result<(i64, i64)> {
        match (self.load.start_at(), self.load.end_at()) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(LoadshapeError::InsufficientData {
                window_start: 0,
                window_end: 0,
                qualifying: 0,
                required: 1,
            }),
        }
    }

    /// Fit a baseline over the full load window without touching the cache.
    pub fn baseline_fit(&self, config: BaselineConfig) -> Result<BaselineFit> {
        let (start, end) = self.load_window()?;
        let mut model = BaselineModel::new(config);
        if let Some(similarity) = &self.similarity {
            model = model.with_similarity(Arc::clone(similarity));
        }
        let tz = self.timezone();
        let exclusions = &self.exclusions;
        model.fit(
            &self.load,
            self.temperature.as_ref(),
            |day| exclusions.excluded(day, tz),
            start,
            end,
        )
    }

    /// Baseline over the full load window, fitted on first use and cached.
    pub fn baseline(&mut self, config: BaselineConfig) -> Result<&Series> {
        let key = CacheKey {
            window: self.load_window()?,
            config: Some(config),
            version: self.version,
        };
        let hit = self.cache.as_ref().is_some_and(|cached| cached.key == key);
        if hit {
            debug!(version = self.version, "baseline cache hit");
        } else {
            info!(
                start = key.window.0,
                end = key.window.1,
                weighting_days = config.weighting_days(),
                modeling_interval = config.modeling_interval(),
                step_size = config.step_size(),
                exclusions = self.exclusions.ranges().len(),
                "fitting baseline"
            );
            let fit = self.baseline_fit(config)?;
            self.cache = Some(CachedBaseline {
                key,
                series: fit.prediction,
            });
        }
        self.current_baseline()
    }

    /// The cached baseline, provided nothing changed since it was built.
    pub fn current_baseline(&self) -> Result<&Series> {
        match &self.cache {
            Some(cached) if cached.key.version == self.version => Ok(&cached.series),
            _ => Err(LoadshapeError::BaselineNotBuilt),
        }
    }

    pub fn baseline_data(&self, start: i64, end: i64, step: Step) -> Result<Series> {
        self.current_baseline()?.resample(start, end, step)
    }

    pub fn actual_data(&self, start: i64, end: i64, step: Step) -> Result<Series> {
        self.load.resample(start, end, step)
    }

    /// Actual load sampled at the baseline timestamps inside the actual domain,
    /// paired with the baseline over those same timestamps.
    fn aligned(&self, operation: &'static str) -> Result<(Series, Series)> {
        let baseline = self.current_baseline()?;
        let (Some(start), Some(end)) = (self.load.start_at(), self.load.end_at()) else {
            return Err(LoadshapeError::alignment(operation, "actual load is empty"));
        };
        let timestamps: Vec<i64> = baseline
            .timestamps()
            .filter(|t| (start..=end).contains(t))
            .collect();
        let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) else {
            return Err(LoadshapeError::alignment(
                operation,
                "baseline and actual load do not overlap",
            ));
        };
        Ok((self.load.sample_at(&timestamps)?, baseline.slice(first, last)))
    }

    /// Difference between actual and baseline load.
    ///
    /// Both kW outputs drop the first aligned point: it closes no interval,
    /// so there is no energy to attribute to it. Cumulative outputs keep it at zero.
    pub fn diff(&self) -> Result<DiffResult> {
        let (actual, baseline) = self.aligned("diff")?;
        let full = actual.subtract(&baseline)?;
        Ok(DiffResult {
            kw_diff: without_first(&full),
            kw_base: without_first(&baseline),
            cumulative_kwh_diff: full.cumulative(),
            cumulative_kwh_base: baseline.cumulative(),
        })
    }

    /// Cost of the actual load under the attached tariff.
    pub fn cost(&self) -> Result<CostResult> {
        self.tariff_for("cost")?.apply(&self.load)
    }

    fn tariff_for(&self, operation: &'static str) -> Result<&Tariff> {
        self.tariff
            .as_deref()
            .ok_or(LoadshapeError::NoTariff { operation })
    }

    /// Summarise `[start, end]`.
    ///
    /// Every aligned interval `(t[i-1], t[i]]` contributes the part of it that
    /// lies inside the window, priced at the rate in force when the interval
    /// opens. Summaries of windows that partition a larger one add up to it.
    pub fn event_performance(&self, start: i64, end: i64) -> Result<EventPerformance> {
        if end < start {
            return Err(LoadshapeError::invalid_window(start, end, "end precedes start"));
        }
        let (actual, baseline) = self.aligned("event_performance")?;
        let tariff = self.tariff.as_deref();

        let mut covered_seconds = 0;
        let mut total_actual_kwh = 0.0;
        let mut total_baseline_kwh = 0.0;
        let mut actual_cost = 0.0;
        let mut baseline_cost = 0.0;
        let mut peak_kw_reduction = f64::NEG_INFINITY;
        let intervals = actual
            .intervals()
            .zip(baseline.intervals())
            .take_while(|((opens, _, _), _)| *opens < end);
        for ((opens, closes, actual_kw), (_, _, baseline_kw)) in intervals {
            let seconds = closes.min(end) - opens.max(start);
            if seconds <= 0 {
                continue;
            }
            covered_seconds += seconds;
            let actual_kwh = energy_kwh(actual_kw, seconds);
            let baseline_kwh = energy_kwh(baseline_kw, seconds);
            total_actual_kwh += actual_kwh;
            total_baseline_kwh += baseline_kwh;
            if let Some(tariff) = tariff {
                let rate = tariff.rate_at(opens)?;
                actual_cost += actual_kwh * rate;
                baseline_cost += baseline_kwh * rate;
            }
            peak_kw_reduction = peak_kw_reduction.max(baseline_kw - actual_kw);
        }
        if covered_seconds == 0 {
            return Err(LoadshapeError::alignment(
                "event_performance",
                format!("no aligned intervals in [{start}, {end}]"),
            ));
        }

        let kwh_reduction = total_baseline_kwh - total_actual_kwh;
        let percent_reduction =
            (total_baseline_kwh != 0.0).then(|| kwh_reduction / total_baseline_kwh * 100.0);
        let (actual_cost, baseline_cost) = match tariff {
            Some(_) => (Some(actual_cost), Some(baseline_cost)),
            None => (None, None),
        };
        let cost_avoided = actual_cost.zip(baseline_cost).map(|(a, b)| b - a);
        let hours = covered_seconds as f64 / 3600.0;

        let performance = EventPerformance {
            start_at: start,
            end_at: end,
            total_actual_kwh,
            total_baseline_kwh,
            kwh_reduction,
            percent_reduction,
            actual_cost,
            baseline_cost,
            cost_avoided,
            peak_kw_reduction,
            average_kw_reduction: kwh_reduction / hours,
            kwh_reduction_per_sq_ft: self.floor_area.map(|area| kwh_reduction / area),
        };
        debug!(start, end, kwh_reduction, "event performance computed");
        Ok(performance)
    }

    /// Goodness of fit of the cached baseline over days not excluded.
    pub fn baseline_fit_metrics(&self) -> Result<FitMetrics> {
        let (actual, baseline) = self.aligned("fit_metrics")?;
        let tz = self.timezone();
        let keep = |t: i64| !self.exclusions.excludes_timestamp(t, tz);
        let (a, p): (Vec<f64>, Vec<f64>) = actual
            .data()
            .iter()
            .zip(baseline.data())
            .filter(|((t, _), _)| keep(*t))
            .map(|((_, a), (_, p))| (*a, *p))
            .unzip();
        FitMetrics::calculate(&a, &p)
            .map_err(|e| LoadshapeError::alignment("fit_metrics", e.to_string()))
    }
}

fn without_first(series: &Series) -> Series {
    match (series.data().get(1), series.end_at()) {
        (Some(&(second, _)), Some(last)) => series.slice(second, last),
        _ => Series::empty(series.timezone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::output_time_grid;
    use chrono_tz::America::Los_Angeles;

    const T0: i64 = 1379487600;

    fn constant(value: f64) -> Vec<Point> {
        (0..5).map(|i| (T0 + i * 900, value)).collect()
    }

    fn assert_points(actual: &Series, expected: &[Point]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for ((t, v), (et, ev)) in actual.data().iter().zip(expected) {
            assert_eq!(t, et);
            assert!((v - ev).abs() < 1e-9, "at {t}: {v} != {ev}");
        }
    }

    #[test]
    fn test_diff() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        let b_data = constant(4.0);
        ls.set_baseline(Series::new(b_data.clone(), Los_Angeles).unwrap());

        let (kw_diff, kw_base, cumulative_kwh_diff, cumulative_kwh_base) =
            ls.diff().unwrap().into_tuple();

        assert_points(
            &kw_diff,
            &[(T0 + 900, 1.0), (T0 + 1800, 1.0), (T0 + 2700, 1.0), (T0 + 3600, 1.0)],
        );
        assert_points(
            &cumulative_kwh_diff,
            &[(T0, 0.0), (T0 + 900, 0.25), (T0 + 1800, 0.5), (T0 + 2700, 0.75), (T0 + 3600, 1.0)],
        );
        assert_eq!(kw_base.data(), &b_data[1..]);
        assert_points(
            &cumulative_kwh_base,
            &[(T0, 0.0), (T0 + 900, 1.0), (T0 + 1800, 2.0), (T0 + 2700, 3.0), (T0 + 3600, 4.0)],
        );
    }

    #[test]
    fn test_cost() {
        let tariff = Tariff::flat(0.17, Los_Angeles).unwrap();
        let ls = Loadshape::new(constant(5.0), "America/Los_Angeles")
            .unwrap()
            .with_tariff(Arc::new(tariff));
        let (cost, cumulative) = ls.cost().unwrap().into_tuple();

        assert_points(
            &cost,
            &[(T0, 0.0), (T0 + 900, 0.2125), (T0 + 1800, 0.2125), (T0 + 2700, 0.2125), (T0 + 3600, 0.2125)],
        );
        assert_points(
            &cumulative,
            &[(T0, 0.0), (T0 + 900, 0.2125), (T0 + 1800, 0.425), (T0 + 2700, 0.6375), (T0 + 3600, 0.85)],
        );
    }

    #[test]
    fn test_cost_without_tariff() {
        let ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        assert_eq!(
            ls.cost().unwrap_err(),
            LoadshapeError::NoTariff { operation: "cost" }
        );
    }

    #[test]
    fn test_one_step_output_time_series_generator() {
        let grid = output_time_grid(T0, T0 + 900, Step::Count(1)).unwrap();
        assert_eq!(grid, vec![T0, T0 + 900]);
    }

    #[test]
    fn test_many_step_output_time_series_generator() {
        let grid = output_time_grid(T0, T0 + 900 * 5, Step::Size(900)).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.first(), Some(&T0));
        assert_eq!(grid.last(), Some(&(T0 + 4500)));
    }

    #[test]
    fn test_empty_loadshape_is_valid_until_fitted() {
        let mut ls = Loadshape::new(Vec::new(), "America/Los_Angeles").unwrap();
        assert!(ls.load().is_empty());
        assert!(matches!(
            ls.baseline(BaselineConfig::default()),
            Err(LoadshapeError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(matches!(
            Loadshape::new(constant(1.0), "Mars/Olympus_Mons"),
            Err(LoadshapeError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn test_mutations_invalidate_installed_baseline() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        ls.set_baseline(Series::new(constant(4.0), Los_Angeles).unwrap());
        assert!(ls.current_baseline().is_ok());
        let before = ls.version();

        ls.add_exclusion(T0, T0 + 900).unwrap();
        assert_eq!(ls.version(), before + 1);
        assert_eq!(
            ls.current_baseline().unwrap_err(),
            LoadshapeError::BaselineNotBuilt
        );
        assert!(matches!(ls.diff(), Err(LoadshapeError::BaselineNotBuilt)));

        ls.set_baseline(Series::new(constant(4.0), Los_Angeles).unwrap());
        ls.set_tariff(Tariff::flat(0.1, Los_Angeles).unwrap());
        assert!(ls.current_baseline().is_err());
    }

    #[test]
    fn test_named_exclusion_errors_do_not_bump_version() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        assert!(matches!(
            ls.add_named_exclusion("FULL_MOON"),
            Err(LoadshapeError::UnknownRule(_))
        ));
        assert_eq!(ls.version(), 0);
        assert_eq!(ls.add_named_exclusion("weekends").unwrap(), NamedExclusion::Weekends);
        assert_eq!(ls.version(), 1);
    }

    #[test]
    fn test_shared_exclusions_copy_on_write() {
        let mut shared = ExclusionSet::new();
        shared.add_named("WEEKENDS").unwrap();
        let shared = Arc::new(shared);

        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles")
            .unwrap()
            .with_exclusions(Arc::clone(&shared));
        ls.add_exclusion_local("2013-09-18 00:00:00", "2013-09-19 00:00:00")
            .unwrap();

        assert!(shared.ranges().is_empty());
        assert_eq!(ls.exclusions().ranges().len(), 1);
        assert_eq!(ls.exclusions().rules().count(), 1);
    }

    #[test]
    fn test_event_performance_summary() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles")
            .unwrap()
            .with_tariff(Arc::new(Tariff::flat(0.2, Los_Angeles).unwrap()))
            .with_floor_area(1000.0);
        ls.set_baseline(Series::new(constant(7.0), Los_Angeles).unwrap());

        let perf = ls.event_performance(T0, T0 + 3600).unwrap();
        assert!((perf.total_actual_kwh - 5.0).abs() < 1e-9);
        assert!((perf.total_baseline_kwh - 7.0).abs() < 1e-9);
        assert!((perf.kwh_reduction - 2.0).abs() < 1e-9);
        assert!((perf.percent_reduction.unwrap() - 200.0 / 7.0).abs() < 1e-9);
        assert!((perf.cost_avoided.unwrap() - 0.4).abs() < 1e-9);
        assert!((perf.peak_kw_reduction - 2.0).abs() < 1e-9);
        assert!((perf.average_kw_reduction - 2.0).abs() < 1e-9);
        assert!((perf.kwh_reduction_per_sq_ft.unwrap() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_event_performance_adds_up_across_any_split() {
        let flat = |kw: f64| (0..9).map(|i| (T0 + i * 900, kw)).collect::<Vec<Point>>();
        let mut ls = Loadshape::new(flat(5.0), "America/Los_Angeles")
            .unwrap()
            .with_tariff(Arc::new(Tariff::flat(0.2, Los_Angeles).unwrap()));
        ls.set_baseline(Series::new(flat(7.0), Los_Angeles).unwrap());
        let (start, end) = (T0, T0 + 8 * 900);
        let whole = ls.event_performance(start, end).unwrap();
        assert!((whole.kwh_reduction - 4.0).abs() < 1e-9);
        assert!((whole.cost_avoided.unwrap() - 0.8).abs() < 1e-9);

        // Split five minutes into an interval
        let mid = T0 + 4 * 900 + 300;
        let first = ls.event_performance(start, mid).unwrap();
        let second = ls.event_performance(mid, end).unwrap();
        assert!((first.kwh_reduction - (2.0 + 2.0 * 300.0 / 3600.0)).abs() < 1e-9);
        assert!((first.kwh_reduction + second.kwh_reduction - whole.kwh_reduction).abs() < 1e-9);
        assert!(
            (first.cost_avoided.unwrap() + second.cost_avoided.unwrap()
                - whole.cost_avoided.unwrap())
            .abs()
                < 1e-9
        );

        // Two grid windows one interval apart, plus the interval between them
        let m = T0 + 4 * 900;
        let parts: f64 = [(start, m), (m, m + 900), (m + 900, end)]
            .iter()
            .map(|(a, b)| ls.event_performance(*a, *b).unwrap().kwh_reduction)
            .sum();
        assert!((parts - whole.kwh_reduction).abs() < 1e-9);
    }

    #[test]
    fn test_event_performance_zero_baseline() {
        let mut ls = Loadshape::new(constant(0.0), "America/Los_Angeles").unwrap();
        ls.set_baseline(Series::new(constant(0.0), Los_Angeles).unwrap());
        let perf = ls.event_performance(T0, T0 + 3600).unwrap();
        assert_eq!(perf.percent_reduction, None);
        assert_eq!(perf.cost_avoided, None);
        assert_eq!(perf.kwh_reduction_per_sq_ft, None);
    }

    #[test]
    fn test_event_performance_outside_data() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        ls.set_baseline(Series::new(constant(4.0), Los_Angeles).unwrap());
        assert!(matches!(
            ls.event_performance(T0 + 10_000, T0 + 20_000),
            Err(LoadshapeError::Alignment { .. })
        ));
        assert!(matches!(
            ls.event_performance(T0 + 900, T0),
            Err(LoadshapeError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_baseline_and_actual_data_resample() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        assert!(ls.baseline_data(T0, T0 + 3600, Step::Size(1800)).is_err());
        ls.set_baseline(Series::new(constant(4.0), Los_Angeles).unwrap());

        let base = ls.baseline_data(T0, T0 + 3600, Step::Count(2)).unwrap();
        assert_points(&base, &[(T0, 4.0), (T0 + 1800, 4.0), (T0 + 3600, 4.0)]);
        let actual = ls.actual_data(T0, T0 + 3600, Step::Size(1800)).unwrap();
        assert_points(&actual, &[(T0, 5.0), (T0 + 1800, 5.0), (T0 + 3600, 5.0)]);
    }

    #[test]
    fn test_fit_metrics_skip_excluded_days() {
        let mut ls = Loadshape::new(constant(5.0), "America/Los_Angeles").unwrap();
        ls.add_exclusion(T0 + 3600, T0 + 7200).unwrap();
        let mut baseline = constant(5.0);
        baseline[4].1 = 100.0; // falls in the excluded range
        ls.set_baseline(Series::new(baseline, Los_Angeles).unwrap());

        let metrics = ls.baseline_fit_metrics().unwrap();
        assert_eq!(metrics.sample_count, 4);
        assert_eq!(metrics.mae, 0.0);
    }
}
