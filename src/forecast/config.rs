use serde::Serialize;
use validator::Validate;

use crate::domain::SECONDS_PER_DAY;
use crate::error::{LoadshapeError, Result};

/// Parameters of a single baseline computation. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Validate)]
pub struct BaselineConfig {
    /// Number of most similar historical days aggregated per predicted day
    #[validate(range(min = 1, max = 366))]
    weighting_days: u32,
    /// Seconds per time-of-day bucket of the fitted profile
    #[validate(range(min = 60, max = 86400))]
    modeling_interval: u32,
    /// Seconds between points of the predicted series
    #[validate(range(min = 1))]
    step_size: u32,
    /// Fewest qualifying history days accepted before failing
    #[validate(range(min = 1))]
    min_history_days: u32,
    /// Regress each bucket on temperature instead of taking the weighted mean
    temperature_adjustment: bool,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            weighting_days: 14,
            modeling_interval: 900,
            step_size: 900,
            min_history_days: 1,
            temperature_adjustment: false,
        }
    }
}

impl BaselineConfig {
    pub fn new(weighting_days: u32, modeling_interval: u32, step_size: u32) -> Result<Self> {
        Self {
            weighting_days,
            modeling_interval,
            step_size,
            ..Self::default()
        }
        .checked()
    }

    pub fn with_min_history_days(self, min_history_days: u32) -> Result<Self> {
        Self {
            min_history_days,
            ..self
        }
        .checked()
    }

    pub fn with_temperature_adjustment(self, enabled: bool) -> Self {
        Self {
            temperature_adjustment: enabled,
            ..self
        }
    }

    fn checked(self) -> Result<Self> {
        self.validate()
            .map_err(|e| LoadshapeError::InvalidConfig(e.to_string()))?;
        if SECONDS_PER_DAY % i64::from(self.modeling_interval) != 0 {
            return Err(LoadshapeError::InvalidConfig(format!(
                "modeling_interval {} does not divide a day",
                self.modeling_interval
            )));
        }
        Ok(self)
    }

    pub fn weighting_days(&self) -> usize {
        self.weighting_days as usize
    }

    pub fn modeling_interval(&self) -> i64 {
        i64::from(self.modeling_interval)
    }

    pub fn step_size(&self) -> i64 {
        i64::from(self.step_size)
    }

    pub fn min_history_days(&self) -> usize {
        self.min_history_days as usize
    }

    pub fn temperature_adjustment(&self) -> bool {
        self.temperature_adjustment
    }

    /// Number of modeling buckets in a day
    pub fn buckets_per_day(&self) -> usize {
        (SECONDS_PER_DAY / self.modeling_interval()) as usize
    }
}
