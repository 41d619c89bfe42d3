//! Baseline goodness-of-fit metrics
//!
//! Compares a predicted baseline against metered load over the same
//! timestamps: MAE, RMSE, CV(RMSE), NMBE, MAPE and R², with an
//! ASHRAE Guideline 14 style quality classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Series;
use crate::error::{LoadshapeError, Result};

/// Guideline 14 limits for hourly calibration, in percent
const CV_RMSE_LIMIT: f64 = 30.0;
const NMBE_LIMIT: f64 = 10.0;
/// Models within this multiple of the limits are marginal
const MARGINAL_FACTOR: f64 = 1.5;

/// Fit accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// Mean Absolute Error (kW)
    pub mae: f64,
    /// Root Mean Square Error (kW)
    pub rmse: f64,
    /// Coefficient of variation of the RMSE (%), `None` when mean load is zero
    pub cv_rmse: Option<f64>,
    /// Normalized mean bias error (%), positive when the baseline under-predicts
    pub nmbe: Option<f64>,
    /// Mean Absolute Percentage Error (%) over non-zero actuals
    pub mape: f64,
    /// R² (coefficient of determination)
    pub r2: f64,
    pub sample_count: usize,
}

impl FitMetrics {
    /// Calculate metrics from paired actual and predicted values
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> std::result::Result<Self, FitMetricsError> {
        if actual.len() != predicted.len() {
            return Err(FitMetricsError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(FitMetricsError::EmptyData);
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let sse: f64 = errors.iter().map(|e| e * e).sum();
        let rmse = (sse / n).sqrt();

        let mean_actual = actual.iter().sum::<f64>() / n;
        let (cv_rmse, nmbe) = if mean_actual.abs() > 1e-10 {
            (
                Some(rmse / mean_actual * 100.0),
                Some(errors.iter().sum::<f64>() / (n * mean_actual) * 100.0),
            )
        } else {
            (None, None)
        };

        let percentage_errors: Vec<f64> = actual
            .iter()
            .zip(&errors)
            .filter(|(a, _)| a.abs() > 1e-6)
            .map(|(a, e)| e.abs() / a.abs() * 100.0)
            .collect();
        let mape = if percentage_errors.is_empty() {
            0.0
        } else {
            percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64
        };

        let total_variance: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
        let r2 = if total_variance > 1e-10 {
            1.0 - sse / total_variance
        } else {
            0.0
        };

        Ok(Self {
            mae,
            rmse,
            cv_rmse,
            nmbe,
            mape,
            r2,
            sample_count: actual.len(),
        })
    }

    /// Metrics over the timestamps the two series share.
    pub fn from_series(actual: &Series, predicted: &Series) -> Result<Self> {
        let mut a = Vec::new();
        let mut p = Vec::new();
        let mut predicted_points = predicted.data().iter().peekable();
        for &(t, value) in actual.data() {
            while predicted_points.next_if(|(pt, _)| *pt < t).is_some() {}
            if let Some((_, pv)) = predicted_points.next_if(|(pt, _)| *pt == t) {
                a.push(value);
                p.push(*pv);
            }
        }
        Self::calculate(&a, &p).map_err(|e| LoadshapeError::alignment("fit_metrics", e.to_string()))
    }

    pub fn quality(&self) -> FitQuality {
        let (Some(cv), Some(nmbe)) = (self.cv_rmse, self.nmbe) else {
            return FitQuality::Poor;
        };
        let nmbe = nmbe.abs();
        if cv <= CV_RMSE_LIMIT && nmbe <= NMBE_LIMIT {
            FitQuality::Compliant
        } else if cv <= CV_RMSE_LIMIT * MARGINAL_FACTOR && nmbe <= NMBE_LIMIT * MARGINAL_FACTOR {
            FitQuality::Marginal
        } else {
            FitQuality::Poor
        }
    }

    /// Enough samples for a full day of hourly data and a compliant fit
    pub fn is_reliable(&self) -> bool {
        self.quality() == FitQuality::Compliant && self.sample_count >= 24
    }
}

impl fmt::Display for FitMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"));
        write!(
            f,
            "Metrics: MAE={:.3}, RMSE={:.3}, CV(RMSE)={}, NMBE={}, R²={:.3}, Quality={:?}",
            self.mae,
            self.rmse,
            pct(self.cv_rmse),
            pct(self.nmbe),
            self.r2,
            self.quality()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitQuality {
    Compliant,
    Marginal,
    Poor,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FitMetricsError {
    #[error("Dimension mismatch: actual={actual}, predicted={predicted}")]
    DimensionMismatch { actual: usize, predicted: usize },

    #[error("Empty data provided")]
    EmptyData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    #[test]
    fn test_perfect_fit() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let metrics = FitMetrics::calculate(&actual, &actual).unwrap();

        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.cv_rmse, Some(0.0));
        assert_eq!(metrics.nmbe, Some(0.0));
        assert_eq!(metrics.r2, 1.0);
        assert_eq!(metrics.quality(), FitQuality::Compliant);
    }

    #[test]
    fn test_fit_with_errors() {
        let actual = vec![100.0, 200.0, 300.0, 400.0, 500.0];
        let predicted = vec![110.0, 190.0, 310.0, 390.0, 510.0];
        let metrics = FitMetrics::calculate(&actual, &predicted).unwrap();

        assert!((metrics.mae - 10.0).abs() < 1e-12);
        assert!((metrics.rmse - 10.0).abs() < 1e-12);
        assert!((metrics.cv_rmse.unwrap() - 10.0 / 3.0).abs() < 1e-9);
        // Errors sum to -10 over 5 samples with mean 300
        assert!((metrics.nmbe.unwrap() + 10.0 / 15.0).abs() < 1e-9);
        assert!(metrics.r2 > 0.99);
        assert_eq!(metrics.quality(), FitQuality::Compliant);
    }

    #[test]
    fn test_biased_fit_is_marginal_then_poor() {
        let actual = vec![100.0; 4];
        let marginal = FitMetrics::calculate(&actual, &[88.0; 4]).unwrap();
        assert_eq!(marginal.quality(), FitQuality::Marginal);
        let poor = FitMetrics::calculate(&actual, &[50.0; 4]).unwrap();
        assert_eq!(poor.quality(), FitQuality::Poor);
    }

    #[test]
    fn test_zero_mean_has_no_normalized_metrics() {
        let metrics = FitMetrics::calculate(&[0.0, 0.0], &[1.0, -1.0]).unwrap();
        assert_eq!(metrics.cv_rmse, None);
        assert_eq!(metrics.quality(), FitQuality::Poor);
        assert!(metrics.to_string().contains("n/a"));
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            FitMetrics::calculate(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(FitMetricsError::DimensionMismatch { actual: 3, predicted: 2 })
        ));
        assert!(matches!(
            FitMetrics::calculate(&[], &[]),
            Err(FitMetricsError::EmptyData)
        ));
    }

    #[test]
    fn test_from_series_pairs_shared_timestamps() {
        let actual = Series::new(vec![(0, 4.0), (900, 6.0), (1800, 8.0), (2700, 2.0)], UTC).unwrap();
        let predicted = Series::new(vec![(900, 6.0), (1200, 100.0), (1800, 8.0), (3600, 1.0)], UTC).unwrap();
        let metrics = FitMetrics::from_series(&actual, &predicted).unwrap();
        assert_eq!(metrics.sample_count, 2);
        assert_eq!(metrics.mae, 0.0);

        let disjoint = Series::new(vec![(5, 1.0)], UTC).unwrap();
        assert!(matches!(
            FitMetrics::from_series(&actual, &disjoint),
            Err(LoadshapeError::Alignment { .. })
        ));
    }
}
