use anyhow::Result;
use chrono_tz::Tz;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::domain::parse_timezone;
use crate::forecast::{BaselineConfig, DaySimilarity, DayTypeSimilarity, TemperatureSimilarity};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub timezone: String,
    pub baseline: BaselineSettings,
    #[serde(default)]
    pub similarity: SimilaritySettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaselineSettings {
    pub weighting_days: u32,
    pub modeling_interval: u32,
    pub step_size: u32,
    #[serde(default = "default_min_history_days")]
    pub min_history_days: u32,
    #[serde(default)]
    pub temperature_adjustment: bool,
}

fn default_min_history_days() -> u32 { 1 }

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    /// Temperature-aware when temperatures are attached, day type otherwise
    #[default]
    Auto,
    DayType,
    Temperature,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilaritySettings {
    #[serde(default)]
    pub kind: SimilarityKind,
    pub temperature_scale: Option<f64>,
    pub peak_weight: Option<f64>,
}

impl SimilaritySettings {
    /// Explicit scorer, or `None` to let the model choose.
    pub fn build(&self) -> Option<Arc<dyn DaySimilarity>> {
        let temperature = || {
            let defaults = TemperatureSimilarity::default();
            TemperatureSimilarity {
                temperature_scale: self.temperature_scale.unwrap_or(defaults.temperature_scale),
                peak_weight: self.peak_weight.unwrap_or(defaults.peak_weight),
                ..defaults
            }
        };
        match self.kind {
            SimilarityKind::Auto => None,
            SimilarityKind::DayType => Some(Arc::new(DayTypeSimilarity::default())),
            SimilarityKind::Temperature => Some(Arc::new(temperature())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig { pub filter: String }
impl Default for LoggingConfig {
    fn default() -> Self { Self { filter: "info".into() } }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_file("config/default.toml")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("LOADSHAPE__").split("__"));
        Ok(figment.extract()?)
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }

    /// Install the global subscriber with `logging.filter` as the fallback filter.
    pub fn init_tracing(&self) -> bool {
        crate::telemetry::init_tracing(&self.logging.filter)
    }

    pub fn baseline_config(&self) -> Result<BaselineConfig> {
        let b = &self.baseline;
        let cfg = BaselineConfig::new(b.weighting_days, b.modeling_interval, b.step_size)?
            .with_min_history_days(b.min_history_days)?
            .with_temperature_adjustment(b.temperature_adjustment);
        Ok(cfg)
    }
}
