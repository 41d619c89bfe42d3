//! Base rate schedule: weekday masks and time-of-day windows.

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Set of weekdays a rate period applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    pub const ALL: Self = Self(0b111_1111);
    pub const WEEKDAYS: Self = Self(0b001_1111);
    pub const WEEKENDS: Self = Self(0b110_0000);

    pub fn from_days(days: &[Weekday]) -> Self {
        if days.is_empty() {
            return Self::ALL;
        }
        Self(days.iter().fold(0, |mask, d| mask | Self::bit(*d)))
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }
}

/// One row of the base schedule.
///
/// `start == end` covers the whole day. `end < start` runs past midnight and
/// belongs to the weekday on which it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePeriod {
    pub days: WeekdayMask,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub rate: f64,
}

impl RatePeriod {
    pub fn all_week(rate: f64) -> Self {
        Self {
            days: WeekdayMask::ALL,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
            rate,
        }
    }

    pub fn applies(&self, weekday: Weekday, seconds_of_day: u32) -> bool {
        let start = self.start.num_seconds_from_midnight();
        let end = self.end.num_seconds_from_midnight();
        if start == end {
            self.days.contains(weekday)
        } else if start < end {
            self.days.contains(weekday) && (start..end).contains(&seconds_of_day)
        } else {
            (self.days.contains(weekday) && seconds_of_day >= start)
                || (self.days.contains(weekday.pred()) && seconds_of_day < end)
        }
    }
}

/// Indices of periods that can never resolve because earlier rows cover
/// every instant they apply to.
///
/// Applicability only changes at period boundaries, so probing each weekday
/// at every boundary second finds the first match for every stretch of the week.
pub fn shadowed_periods(periods: &[RatePeriod]) -> Vec<usize> {
    let mut boundaries: Vec<u32> = periods
        .iter()
        .flat_map(|p| [p.start.num_seconds_from_midnight(), p.end.num_seconds_from_midnight()])
        .chain([0])
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut reachable = vec![false; periods.len()];
    for weekday in WEEK {
        for &second in &boundaries {
            if let Some(i) = periods.iter().position(|p| p.applies(weekday, second)) {
                reachable[i] = true;
            }
        }
    }
    reachable
        .iter()
        .enumerate()
        .filter(|(_, r)| !**r)
        .map(|(i, _)| i)
        .collect()
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Serialized rate table, as handed over by whatever parsed the tariff file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TariffDefinition {
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, message = "at least one rate period is required"), nested)]
    pub periods: Vec<PeriodDefinition>,
    /// Rate applied inside demand-response windows that carry no rate of their own
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub dr_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PeriodDefinition {
    /// Empty means every day
    #[serde(default)]
    pub days: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Price per kWh
    #[validate(range(min = 0.0))]
    pub rate: f64,
}

impl From<&PeriodDefinition> for RatePeriod {
    fn from(def: &PeriodDefinition) -> Self {
        Self {
            days: WeekdayMask::from_days(&def.days),
            start: def.start,
            end: def.end,
            rate: def.rate,
        }
    }
}
