//! Date-aware fitted model.
//!
//! Binds a fitted [`Sarima`] to the month-start index of the series it was
//! trained on. Immutable after construction; forecasting takes `&self`, so
//! one instance can be shared across threads without locking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::algorithms::sarima::{Sarima, SarimaConfig, SarimaOrder, SarimaParams, SeasonalOrder};
use crate::algorithms::Predictor;
use crate::data::{add_months, MonthlySeries};
use crate::error::{Result, TsError};

/// One predicted month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Month-start date
    pub date: NaiveDate,
    /// Predicted concentration in ppm
    pub value: f64,
}

/// Estimation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub order: SarimaOrder,
    pub seasonal_order: SeasonalOrder,
    pub params: SarimaParams,
    pub log_likelihood: f64,
    pub aic: f64,
    pub converged: bool,
    pub n_obs: usize,
    pub series_start: NaiveDate,
    pub series_end: NaiveDate,
}

/// A seasonal ARIMA model fitted to a monthly series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    model: Sarima,
    series_start: NaiveDate,
    series_end: NaiveDate,
}

impl FittedModel {
    /// Fit `config` to `series`.
    pub fn fit(series: &MonthlySeries, config: SarimaConfig) -> Result<Self> {
        let mut model = Sarima::new(config)?;
        model.fit(series.values())?;

        let fitted = Self {
            model,
            series_start: series.start(),
            series_end: series.end(),
        };
        info!(
            n_obs = series.len(),
            log_likelihood = fitted.model.log_likelihood(),
            aic = fitted.model.aic(),
            "seasonal ARIMA model trained"
        );
        Ok(fitted)
    }

    /// Predict the `steps` months following the training series.
    pub fn forecast(&self, steps: usize) -> Result<Vec<ForecastPoint>> {
        let horizon = u32::try_from(steps)
            .ok()
            .filter(|&h| add_months(self.series_end, h).is_some())
            .ok_or_else(|| TsError::InvalidParameter {
                name: "steps".to_string(),
                reason: format!("forecast horizon {} exceeds the calendar range", steps),
            })?;

        let values = self.model.predict(steps)?;

        (1..=horizon)
            .zip(values)
            .map(|(offset, value)| {
                add_months(self.series_end, offset)
                    .map(|date| ForecastPoint { date, value })
                    .ok_or_else(|| TsError::NumericalError("forecast date overflow".to_string()))
            })
            .collect()
    }

    /// First month of the training series.
    pub fn series_start(&self) -> NaiveDate {
        self.series_start
    }

    /// Last month of the training series.
    pub fn series_end(&self) -> NaiveDate {
        self.series_end
    }

    /// Number of training months.
    pub fn n_obs(&self) -> usize {
        self.model.n_obs()
    }

    /// The underlying model.
    pub fn model(&self) -> &Sarima {
        &self.model
    }

    /// Estimation summary.
    pub fn summary(&self) -> ModelSummary {
        let config = self.model.config();
        ModelSummary {
            order: config.order,
            seasonal_order: config.seasonal_order,
            params: self.model.params().clone(),
            log_likelihood: self.model.log_likelihood(),
            aic: self.model.aic(),
            converged: self.model.converged(),
            n_obs: self.model.n_obs(),
            series_start: self.series_start,
            series_end: self.series_end,
        }
    }

    /// Check internal consistency, e.g. after deserialisation.
    pub fn validate(&self) -> Result<()> {
        self.model.validate_fitted()?;
        let expected_end = u32::try_from(self.model.n_obs().saturating_sub(1))
            .ok()
            .and_then(|offset| add_months(self.series_start, offset));
        if expected_end != Some(self.series_end) {
            return Err(TsError::InvalidData(format!(
                "series index {}..{} does not match {} observations",
                self.series_start,
                self.series_end,
                self.model.n_obs()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> MonthlySeries {
        let values = (0..84)
            .map(|i| {
                let t = i as f64;
                316.0 + 0.1 * t + 2.5 * (t * PI / 6.0).sin() + 0.25 * (t * 1.3).sin()
            })
            .collect();
        MonthlySeries::new(ymd(1960, 3, 1), values).unwrap()
    }

    #[test]
    fn test_forecast_dates_follow_series() {
        let series = series();
        let model = FittedModel::fit(&series, SarimaConfig::co2_default()).unwrap();
        assert_eq!(model.series_end(), ymd(1967, 2, 1));

        let forecast = model.forecast(12).unwrap();
        assert_eq!(forecast.len(), 12);
        assert_eq!(forecast[0].date, ymd(1967, 3, 1));
        assert_eq!(forecast[11].date, ymd(1968, 2, 1));
        for pair in forecast.windows(2) {
            assert_eq!(add_months(pair[0].date, 1), Some(pair[1].date));
        }
    }

    #[test]
    fn test_forecast_rejects_zero_steps() {
        let model = FittedModel::fit(&series(), SarimaConfig::co2_default()).unwrap();
        assert!(model.forecast(0).is_err());
    }

    #[test]
    fn test_summary() {
        let model = FittedModel::fit(&series(), SarimaConfig::co2_default()).unwrap();
        let summary = model.summary();

        assert_eq!(summary.n_obs, 84);
        assert_eq!(summary.order, SarimaOrder::new(0, 1, 1));
        assert_eq!(summary.seasonal_order, SeasonalOrder::new(0, 1, 1, 12));
        assert_eq!(summary.params.ma.len(), 1);
        assert_eq!(summary.params.seasonal_ma.len(), 1);
        assert!(summary.aic.is_finite());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_fit_propagates_model_errors() {
        let short = MonthlySeries::new(ymd(2000, 1, 1), vec![1.0; 10]).unwrap();
        assert!(matches!(
            FittedModel::fit(&short, SarimaConfig::co2_default()),
            Err(TsError::InsufficientData { .. })
        ));
    }
}
