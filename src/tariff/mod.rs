//! Rate schedules and demand-response pricing.
//!
//! Intervals are priced at the instant they open: the interval
//! `(t[i-1], t[i]]` costs `value[i] * (t[i] - t[i-1]) / 3600 * rate_at(t[i-1])`.

pub mod schedule;

pub use schedule::*;

use chrono::{Datelike, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::calendar::TimeRange;
use crate::domain::{energy_kwh, to_local, Series};
use crate::error::{LoadshapeError, Result};

/// Demand-response window with an optional rate override
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrPeriod {
    pub range: TimeRange,
    pub rate: Option<f64>,
}

/// Incremental and running cost series produced by [`Tariff::apply`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    pub incremental: Series,
    pub cumulative: Series,
}

impl CostResult {
    pub fn into_tuple(self) -> (Series, Series) {
        (self.incremental, self.cumulative)
    }

    /// Total cost, the last cumulative value
    pub fn total(&self) -> f64 {
        self.cumulative.data().last().map_or(0.0, |(_, v)| *v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tariff {
    name: String,
    timezone: Tz,
    periods: Vec<RatePeriod>,
    dr_rate: Option<f64>,
    dr_periods: Vec<DrPeriod>,
}

impl Tariff {
    pub fn from_definition(definition: &TariffDefinition, timezone: Tz) -> Result<Self> {
        definition
            .validate()
            .map_err(|e| LoadshapeError::InvalidTariff(e.to_string()))?;
        let non_finite = definition
            .periods
            .iter()
            .map(|p| p.rate)
            .chain(definition.dr_rate)
            .any(|r| !r.is_finite());
        if non_finite {
            return Err(LoadshapeError::InvalidTariff(
                "rates must be finite".to_string(),
            ));
        }

        let periods: Vec<RatePeriod> = definition.periods.iter().map(RatePeriod::from).collect();
        let shadowed = shadowed_periods(&periods);
        if !shadowed.is_empty() {
            warn!(name = %definition.name, ?shadowed, "unreachable rate periods");
            return Err(LoadshapeError::InvalidTariff(format!(
                "rate periods {shadowed:?} are fully covered by earlier periods"
            )));
        }
        info!(
            name = %definition.name,
            periods = periods.len(),
            dr_rate = ?definition.dr_rate,
            "tariff loaded"
        );
        Ok(Self {
            name: definition.name.clone(),
            timezone,
            periods,
            dr_rate: definition.dr_rate,
            dr_periods: Vec::new(),
        })
    }

    /// Parse a JSON rate table already read by the caller
    pub fn from_json(json: &str, timezone: Tz) -> Result<Self> {
        let definition: TariffDefinition = serde_json::from_str(json)
            .map_err(|e| LoadshapeError::InvalidTariff(e.to_string()))?;
        Self::from_definition(&definition, timezone)
    }

    /// A single rate for every hour of the week
    pub fn flat(rate: f64, timezone: Tz) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(LoadshapeError::InvalidTariff(format!(
                "flat rate must be finite and non-negative, got {rate}"
            )));
        }
        Ok(Self {
            name: "flat".to_string(),
            timezone,
            periods: vec![RatePeriod::all_week(rate)],
            dr_rate: None,
            dr_periods: Vec::new(),
        })
    }

    /// Set the tariff-wide DR rate used by windows without a rate of their own.
    pub fn with_dr_rate(mut self, rate: f64) -> Result<Self> {
        check_dr_rate(rate)?;
        self.dr_rate = Some(rate);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn periods(&self) -> &[RatePeriod] {
        &self.periods
    }

    pub fn dr_periods(&self) -> &[DrPeriod] {
        &self.dr_periods
    }

    /// Register a demand-response window priced at the tariff-wide DR rate.
    pub fn add_dr_period(&mut self, start: i64, end: i64) -> Result<()> {
        self.push_dr_period(start, end, None)
    }

    /// Register a demand-response window carrying its own rate.
    pub fn add_dr_period_with_rate(&mut self, start: i64, end: i64, rate: f64) -> Result<()> {
        check_dr_rate(rate)?;
        self.push_dr_period(start, end, Some(rate))
    }

    fn push_dr_period(&mut self, start: i64, end: i64, rate: Option<f64>) -> Result<()> {
        let range = TimeRange::new(start, end)?;
        debug!(start, end, rate = ?rate, "DR period registered");
        self.dr_periods.push(DrPeriod { range, rate });
        Ok(())
    }

    pub fn is_dr_active(&self, timestamp: i64) -> bool {
        self.dr_periods.iter().any(|p| p.range.contains(timestamp))
    }

    /// Rate in effect at `timestamp`.
    ///
    /// A DR window wins over the base schedule when it (or the tariff) defines
    /// a DR rate. Otherwise the first base period matching the local weekday
    /// and time of day applies.
    pub fn rate_at(&self, timestamp: i64) -> Result<f64> {
        let dr_rate = self
            .dr_periods
            .iter()
            .find(|p| p.range.contains(timestamp))
            .and_then(|p| p.rate.or(self.dr_rate));
        if let Some(rate) = dr_rate {
            return Ok(rate);
        }

        let local = to_local(timestamp, self.timezone)?;
        let weekday = local.weekday();
        let seconds = local.num_seconds_from_midnight();
        self.periods
            .iter()
            .find(|p| p.applies(weekday, seconds))
            .map(|p| p.rate)
            .ok_or(LoadshapeError::NoRateDefined { timestamp })
    }

    /// Price a kW series. The first point has no preceding interval and costs zero.
    pub fn apply(&self, series: &Series) -> Result<CostResult> {
        let tz = series.timezone();
        let Some(first) = series.start_at() else {
            return Ok(CostResult {
                incremental: Series::empty(tz),
                cumulative: Series::empty(tz),
            });
        };

        let mut incremental = Vec::with_capacity(series.len());
        let mut cumulative = Vec::with_capacity(series.len());
        incremental.push((first, 0.0));
        cumulative.push((first, 0.0));

        let mut total = 0.0;
        for (prev, t, kw) in series.intervals() {
            let cost = energy_kwh(kw, t - prev) * self.rate_at(prev)?;
            total += cost;
            incremental.push((t, cost));
            cumulative.push((t, total));
        }

        Ok(CostResult {
            incremental: Series::from_sorted(incremental, tz),
            cumulative: Series::from_sorted(cumulative, tz),
        })
    }
}

fn check_dr_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(LoadshapeError::InvalidTariff(format!(
            "DR rate must be finite and non-negative, got {rate}"
        )));
    }
    Ok(())
}
