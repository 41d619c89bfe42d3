//! Calendar exclusions: days removed from baseline history.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use super::holidays::{is_swedish_holiday, is_us_federal_holiday};
use crate::domain::{day_bounds, local_date};
use crate::error::{LoadshapeError, Result};

/// Named calendar rules recognised by [`ExclusionSet::add_named`]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamedExclusion {
    /// Saturdays and Sundays
    Weekends,
    /// US federal holidays, including observed weekdays
    UsHolidays,
    /// Swedish public holidays
    SeHolidays,
}

impl NamedExclusion {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::Weekends => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            Self::UsHolidays => is_us_federal_holiday(date),
            Self::SeHolidays => is_swedish_holiday(date),
        }
    }
}

/// Half-open `[start, end)` window in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if end <= start {
            return Err(LoadshapeError::invalid_window(
                start,
                end,
                "range end must be after its start",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }

    /// Overlap with another half-open span
    pub fn intersects(&self, start: i64, end: i64) -> bool {
        self.start < end && start < self.end
    }
}

/// Explicit ranges plus named rules, consulted as a pure predicate over days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionSet {
    ranges: Vec<TimeRange>,
    rules: BTreeSet<NamedExclusion>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_range(&mut self, start: i64, end: i64) -> Result<()> {
        let range = TimeRange::new(start, end)?;
        debug!(start, end, "exclusion range registered");
        self.ranges.push(range);
        Ok(())
    }

    /// Register a named rule such as `WEEKENDS` or `US_HOLIDAYS`.
    pub fn add_named(&mut self, rule_name: &str) -> Result<NamedExclusion> {
        let rule = NamedExclusion::from_str(rule_name.trim())
            .map_err(|_| LoadshapeError::UnknownRule(rule_name.to_string()))?;
        self.add_rule(rule);
        Ok(rule)
    }

    pub fn add_rule(&mut self, rule: NamedExclusion) {
        if self.rules.insert(rule) {
            debug!(%rule, "named exclusion registered");
        }
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn rules(&self) -> impl Iterator<Item = NamedExclusion> + '_ {
        self.rules.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.rules.is_empty()
    }

    /// True when the local day overlaps any explicit range or matches any rule.
    pub fn excluded(&self, day: NaiveDate, timezone: Tz) -> bool {
        if self.rules.iter().any(|rule| rule.matches(day)) {
            return true;
        }
        day_bounds(day, timezone).is_ok_and(|(start, end)| {
            self.ranges.iter().any(|range| range.intersects(start, end))
        })
    }

    /// True when the instant lies in an explicit range or on a day matched by a rule.
    pub fn excludes_timestamp(&self, timestamp: i64, timezone: Tz) -> bool {
        if self.ranges.iter().any(|range| range.contains(timestamp)) {
            return true;
        }
        local_date(timestamp, timezone)
            .is_ok_and(|day| self.rules.iter().any(|rule| rule.matches(day)))
    }
}
