use thiserror::Error;

/// Errors raised by the baseline and comparison engine.
///
/// Every variant is raised at the call that detects it. Nothing here is
/// retried and no operation substitutes a fabricated value for missing data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadshapeError {
    /// Two series could not be combined point by point.
    #[error("Alignment error in {operation}: {reason}")]
    Alignment {
        operation: &'static str,
        reason: String,
    },

    /// Not enough qualifying history to fit a baseline.
    #[error(
        "Insufficient data for baseline over [{window_start}, {window_end}]: \
         {qualifying} qualifying day(s), {required} required"
    )]
    InsufficientData {
        window_start: i64,
        window_end: i64,
        qualifying: usize,
        required: usize,
    },

    #[error("Unknown exclusion rule: {0}")]
    UnknownRule(String),

    #[error("No tariff rate defined at timestamp {timestamp}")]
    NoRateDefined { timestamp: i64 },

    #[error("No tariff attached; cannot compute {operation}")]
    NoTariff { operation: &'static str },

    #[error("Baseline has not been built for the current exclusions and tariff")]
    BaselineNotBuilt,

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid window [{start}, {end}]: {reason}")]
    InvalidWindow {
        start: i64,
        end: i64,
        reason: String,
    },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("Invalid tariff: {0}")]
    InvalidTariff(String),
}

impl LoadshapeError {
    pub(crate) fn alignment(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Alignment {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_window(start: i64, end: i64, reason: impl Into<String>) -> Self {
        Self::InvalidWindow {
            start,
            end,
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error family
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Alignment { .. } => "AlignmentError",
            Self::InsufficientData { .. } => "InsufficientDataError",
            Self::UnknownRule(_) => "UnknownRuleError",
            Self::NoRateDefined { .. } => "NoRateDefinedError",
            Self::NoTariff { .. } => "NoTariffError",
            Self::BaselineNotBuilt => "BaselineNotBuiltError",
            Self::InvalidSeries(_) => "InvalidSeriesError",
            Self::InvalidConfig(_) => "InvalidConfigError",
            Self::InvalidWindow { .. } => "InvalidWindowError",
            Self::UnknownTimezone(_) => "UnknownTimezoneError",
            Self::InvalidTimestamp { .. } => "InvalidTimestampError",
            Self::InvalidTariff(_) => "InvalidTariffError",
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadshapeError>;
