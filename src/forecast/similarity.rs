//! Day similarity scoring for history selection.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// What the scorer knows about a calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayContext {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Mean outdoor temperature (Celsius)
    pub mean_temperature: Option<f64>,
    /// Peak outdoor temperature (Celsius)
    pub peak_temperature: Option<f64>,
}

impl DayContext {
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }
}

/// Scores how well a historical day stands in for a target day.
///
/// Scores are weights: candidates scoring zero or less are discarded, the
/// rest are ranked by score and aggregated proportionally to it.
pub trait DaySimilarity: Send + Sync + std::fmt::Debug {
    fn score(&self, target: &DayContext, candidate: &DayContext) -> f64;

    fn name(&self) -> &'static str;
}

/// Day-of-week matching. Recency is left to the selection tie-break.
///
/// Weekdays never stand in for weekend days or the other way round: the
/// default weight for a day of the other class is zero, which discards it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayTypeSimilarity {
    pub same_weekday: f64,
    /// Both weekdays or both weekend days
    pub same_day_class: f64,
    pub other: f64,
}

impl Default for DayTypeSimilarity {
    fn default() -> Self {
        Self {
            same_weekday: 1.0,
            same_day_class: 0.6,
            other: 0.0,
        }
    }
}

impl DaySimilarity for DayTypeSimilarity {
    fn score(&self, target: &DayContext, candidate: &DayContext) -> f64 {
        if target.weekday == candidate.weekday {
            self.same_weekday
        } else if target.is_weekend() == candidate.is_weekend() {
            self.same_day_class
        } else {
            self.other
        }
    }

    fn name(&self) -> &'static str {
        "day_type"
    }
}

/// Day type scaled down by the distance between daily temperature profiles.
///
/// `score = day_type / (1 + distance / temperature_scale)` where distance blends
/// the mean and peak temperature gaps. A missing temperature on either side
/// counts as one `temperature_scale` of distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSimilarity {
    pub day_type: DayTypeSimilarity,
    /// Degrees Celsius of distance that halve the score
    pub temperature_scale: f64,
    /// Share of the distance taken from the peak temperature, in [0, 1]
    pub peak_weight: f64,
}

impl Default for TemperatureSimilarity {
    fn default() -> Self {
        Self {
            day_type: DayTypeSimilarity::default(),
            temperature_scale: 3.0,
            peak_weight: 0.5,
        }
    }
}

impl TemperatureSimilarity {
    fn distance(&self, target: &DayContext, candidate: &DayContext) -> f64 {
        let gap = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some((a - b).abs()),
            _ => None,
        };
        match (
            gap(target.mean_temperature, candidate.mean_temperature),
            gap(target.peak_temperature, candidate.peak_temperature),
        ) {
            (Some(mean), Some(peak)) => (1.0 - self.peak_weight) * mean + self.peak_weight * peak,
            (Some(mean), None) => mean,
            (None, Some(peak)) => peak,
            (None, None) => self.temperature_scale,
        }
    }
}

impl DaySimilarity for TemperatureSimilarity {
    fn score(&self, target: &DayContext, candidate: &DayContext) -> f64 {
        let base = self.day_type.score(target, candidate);
        let scale = self.temperature_scale.max(f64::EPSILON);
        base / (1.0 + self.distance(target, candidate) / scale)
    }

    fn name(&self) -> &'static str {
        "temperature"
    }
}
