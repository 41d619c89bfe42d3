//! Building energy baselines and demand-response performance.
//!
//! Metered kW history (and optionally outdoor temperature) goes in as
//! [`Series`]; a similar-day [`BaselineModel`] predicts what the building
//! would have drawn, and [`Loadshape`] compares that prediction with the
//! actual load in kW, kWh and tariff cost.

pub mod calendar;
pub mod config;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod loadshape;
pub mod tariff;
pub mod telemetry;

pub use calendar::{ExclusionSet, NamedExclusion, TimeRange};
pub use domain::{output_time_grid, Point, Series, Step, TemperatureUnit};
pub use error::{LoadshapeError, Result};
pub use forecast::{
    BaselineConfig, BaselineFit, BaselineModel, DayContext, DaySimilarity, DayTypeSimilarity,
    FitMetrics, FitQuality, TemperatureSimilarity,
};
pub use loadshape::{DiffResult, EventPerformance, Loadshape};
pub use tariff::{CostResult, Tariff, TariffDefinition};
