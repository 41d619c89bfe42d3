use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Energy in kWh delivered by a constant power (kW) over `seconds`
pub fn energy_kwh(power_kw: f64, seconds: i64) -> f64 {
    power_kw * seconds as f64 / SECONDS_PER_HOUR
}

/// Unit of an incoming temperature series. Temperatures are held in Celsius internally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TemperatureUnit {
    #[default]
    #[strum(serialize = "C", serialize = "celsius")]
    #[serde(alias = "C", alias = "celsius")]
    Celsius,
    #[strum(serialize = "F", serialize = "fahrenheit")]
    #[serde(alias = "F", alias = "fahrenheit")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }
}
