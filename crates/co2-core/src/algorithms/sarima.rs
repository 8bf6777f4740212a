//! Seasonal ARIMA implementation
//!
//! SARIMA(p, d, q)(P, D, Q, s) models a series whose
//! `(1 - B)^d (1 - B^s)^D`-differenced values follow an ARMA process with
//! multiplicative seasonal polynomials:
//!
//! ```text
//! phi(B) Phi(B^s) (1 - B)^d (1 - B^s)^D y[t] = theta(B) Theta(B^s) e[t]
//! ```
//!
//! ## Estimation
//!
//! Parameters are estimated by exact Gaussian maximum likelihood. The
//! differenced series is filtered with a Kalman filter started from an
//! approximate diffuse prior (zero state, large diagonal covariance), the
//! first `state_dim` innovations are treated as burn-in, and the innovation
//! variance is concentrated out. The likelihood is maximised with a
//! Nelder-Mead simplex started at zero, so fitting is deterministic.
//!
//! When `enforce_stationarity` / `enforce_invertibility` are set, each AR / MA
//! block is mapped through the partial-autocorrelation transform so that only
//! stationary / invertible polynomials are visited.
//!
//! ## Example
//!
//! ```rust
//! use co2_core::algorithms::{sarima::{Sarima, SarimaConfig}, Predictor};
//!
//! let data: Vec<f64> = (0..60)
//!     .map(|t| {
//!         let t = t as f64;
//!         100.0 + 0.5 * t + 5.0 * (t * std::f64::consts::PI / 6.0).sin() + (t * 1.1).cos()
//!     })
//!     .collect();
//! let mut model = Sarima::new(SarimaConfig::co2_default()).unwrap();
//! model.fit(&data).unwrap();
//! let forecast = model.predict(6).unwrap();
//! assert_eq!(forecast.len(), 6);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::algorithms::state_space::{ArmaStateSpace, FilterOutput};
use crate::algorithms::Predictor;
use crate::error::{Result, TsError};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Non-seasonal order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl SarimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

/// Seasonal order `(P, D, Q, s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal AR order
    pub p: usize,
    /// Seasonal differencing order
    pub d: usize,
    /// Seasonal MA order
    pub q: usize,
    /// Season length in periods
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// No seasonal component.
    pub fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }

    fn is_active(&self) -> bool {
        self.p + self.d + self.q > 0
    }
}

/// Model specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaConfig {
    /// Non-seasonal order
    pub order: SarimaOrder,
    /// Seasonal order
    pub seasonal_order: SeasonalOrder,
    /// Restrict AR polynomials to the stationary region
    pub enforce_stationarity: bool,
    /// Restrict MA polynomials to the invertible region
    pub enforce_invertibility: bool,
    /// Prior state variance of the approximate diffuse initialisation
    pub diffuse_variance: f64,
}

impl SarimaConfig {
    /// SARIMA(0,1,1)(0,1,1,12) with relaxed constraints and an approximate
    /// diffuse start, the configuration used for the CO2 series.
    pub fn co2_default() -> Self {
        Self {
            order: SarimaOrder::new(0, 1, 1),
            seasonal_order: SeasonalOrder::new(0, 1, 1, 12),
            enforce_stationarity: false,
            enforce_invertibility: false,
            diffuse_variance: 1e6,
        }
    }

    /// Check orders and initialisation settings.
    pub fn validate(&self) -> Result<()> {
        let SarimaOrder { p, d, q } = self.order;
        if p > 10 {
            return Err(invalid("p", "AR order must be <= 10"));
        }
        if d > 2 {
            return Err(invalid("d", "Differencing order must be <= 2"));
        }
        if q > 10 {
            return Err(invalid("q", "MA order must be <= 10"));
        }

        let seasonal = self.seasonal_order;
        if seasonal.p > 4 {
            return Err(invalid("P", "Seasonal AR order must be <= 4"));
        }
        if seasonal.d > 2 {
            return Err(invalid("D", "Seasonal differencing order must be <= 2"));
        }
        if seasonal.q > 4 {
            return Err(invalid("Q", "Seasonal MA order must be <= 4"));
        }
        if seasonal.is_active() && seasonal.period < 2 {
            return Err(invalid("s", "Seasonal period must be >= 2"));
        }

        if !(self.diffuse_variance.is_finite() && self.diffuse_variance > 0.0) {
            return Err(invalid("diffuse_variance", "must be finite and positive"));
        }
        Ok(())
    }

    /// Number of estimated AR and MA coefficients.
    pub fn n_coefficients(&self) -> usize {
        self.order.p + self.order.q + self.seasonal_order.p + self.seasonal_order.q
    }

    /// Season length, zero when there is no seasonal component.
    fn period(&self) -> usize {
        if self.seasonal_order.is_active() {
            self.seasonal_order.period
        } else {
            0
        }
    }

    /// Coefficients of `(1 - B)^d (1 - B^s)^D`, indexed by lag.
    fn differencing_polynomial(&self) -> Vec<f64> {
        let mut poly = vec![1.0];
        for _ in 0..self.order.d {
            poly = poly_mul(&poly, &[1.0, -1.0]);
        }
        let period = self.period();
        for _ in 0..self.seasonal_order.d {
            let mut seasonal = vec![0.0; period + 1];
            seasonal[0] = 1.0;
            seasonal[period] = -1.0;
            poly = poly_mul(&poly, &seasonal);
        }
        poly
    }

    /// Dimension of the reduced ARMA state.
    fn state_dim(&self) -> usize {
        let s = self.period();
        let ar = self.order.p + s * self.seasonal_order.p;
        let ma = self.order.q + s * self.seasonal_order.q;
        ar.max(ma + 1)
    }

    /// Smallest sample that leaves at least one innovation per estimated
    /// parameter after differencing and burn-in.
    pub fn min_observations(&self) -> usize {
        let lost = self.differencing_polynomial().len() - 1;
        lost + self.state_dim() + self.n_coefficients() + 1
    }
}

impl Default for SarimaConfig {
    fn default() -> Self {
        Self::co2_default()
    }
}

/// Estimated coefficients, signed as in
/// `(1 - phi1 B - ...)` and `(1 + theta1 B + ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaParams {
    /// Non-seasonal AR coefficients
    pub ar: Vec<f64>,
    /// Seasonal AR coefficients
    pub seasonal_ar: Vec<f64>,
    /// Non-seasonal MA coefficients
    pub ma: Vec<f64>,
    /// Seasonal MA coefficients
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance
    pub sigma2: f64,
}

impl SarimaParams {
    fn zeros(config: &SarimaConfig) -> Self {
        Self {
            ar: vec![0.0; config.order.p],
            seasonal_ar: vec![0.0; config.seasonal_order.p],
            ma: vec![0.0; config.order.q],
            seasonal_ma: vec![0.0; config.seasonal_order.q],
            sigma2: 0.0,
        }
    }

    fn is_finite(&self) -> bool {
        self.ar
            .iter()
            .chain(&self.seasonal_ar)
            .chain(&self.ma)
            .chain(&self.seasonal_ma)
            .all(|c| c.is_finite())
            && self.sigma2.is_finite()
    }
}

/// Seasonal ARIMA model for time series forecasting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sarima {
    /// Model specification
    config: SarimaConfig,
    /// Estimated coefficients
    params: SarimaParams,
    /// Maximised log-likelihood
    log_likelihood: f64,
    /// Optimiser iterations used
    iterations: usize,
    /// Whether the optimiser met its tolerances
    converged: bool,
    /// Training data (for undifferencing)
    history: Vec<f64>,
    /// Predicted state for the period after the sample
    end_state: Vec<f64>,
    /// Whether the model has been fitted
    fitted: bool,
}

impl Sarima {
    /// Create an unfitted model for `config`.
    pub fn new(config: SarimaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            params: SarimaParams::zeros(&config),
            config,
            log_likelihood: f64::NAN,
            iterations: 0,
            converged: false,
            history: Vec::new(),
            end_state: Vec::new(),
            fitted: false,
        })
    }

    /// Model specification.
    pub fn config(&self) -> &SarimaConfig {
        &self.config
    }

    /// Estimated coefficients.
    pub fn params(&self) -> &SarimaParams {
        &self.params
    }

    /// Maximised log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion; the innovation variance counts as a
    /// parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * (self.config.n_coefficients() + 1) as f64
    }

    /// Number of training observations.
    pub fn n_obs(&self) -> usize {
        self.history.len()
    }

    /// Whether the optimiser met its tolerances.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Optimiser iterations used.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Check that a fitted model is internally consistent, e.g. after it was
    /// deserialised.
    pub fn validate_fitted(&self) -> Result<()> {
        if !self.fitted {
            return Err(TsError::NotFitted);
        }
        self.config.validate()?;

        let expected = SarimaParams::zeros(&self.config);
        let shapes_match = self.params.ar.len() == expected.ar.len()
            && self.params.seasonal_ar.len() == expected.seasonal_ar.len()
            && self.params.ma.len() == expected.ma.len()
            && self.params.seasonal_ma.len() == expected.seasonal_ma.len();
        if !shapes_match || !self.params.is_finite() {
            return Err(TsError::InvalidData(
                "coefficients do not match the model order".to_string(),
            ));
        }
        if self.end_state.len() != self.config.state_dim()
            || self.end_state.iter().any(|s| !s.is_finite())
        {
            return Err(TsError::InvalidData(
                "filter state does not match the model order".to_string(),
            ));
        }

        let required = self.config.min_observations();
        if self.history.len() < required {
            return Err(TsError::InsufficientData {
                required,
                actual: self.history.len(),
            });
        }
        if self.history.iter().any(|x| !x.is_finite()) {
            return Err(TsError::InvalidData(
                "training data contains NaN or infinite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Map an optimiser point to coefficients, applying the configured
    /// constraints.
    fn unpack(&self, x: &[f64]) -> SarimaParams {
        let SarimaOrder { p, q, .. } = self.config.order;
        let seasonal = self.config.seasonal_order;

        let (ar, rest) = x.split_at(p);
        let (seasonal_ar, rest) = rest.split_at(seasonal.p);
        let (ma, seasonal_ma) = rest.split_at(q);

        let stationary = |block: &[f64]| {
            if self.config.enforce_stationarity {
                constrain_stationary(block)
            } else {
                block.to_vec()
            }
        };
        let invertible = |block: &[f64]| {
            if self.config.enforce_invertibility {
                constrain_stationary(block).into_iter().map(|c| -c).collect()
            } else {
                block.to_vec()
            }
        };

        SarimaParams {
            ar: stationary(ar),
            seasonal_ar: stationary(seasonal_ar),
            ma: invertible(ma),
            seasonal_ma: invertible(seasonal_ma),
            sigma2: 0.0,
        }
    }

    /// Reduced ARMA state space for `params`.
    fn state_space(&self, params: &SarimaParams) -> ArmaStateSpace {
        let period = self.config.period();

        let mut ar_poly = vec![1.0];
        ar_poly.extend(params.ar.iter().map(|c| -c));
        let mut seasonal_ar_poly = vec![0.0; period * params.seasonal_ar.len() + 1];
        seasonal_ar_poly[0] = 1.0;
        for (k, c) in params.seasonal_ar.iter().enumerate() {
            seasonal_ar_poly[(k + 1) * period] = -c;
        }
        let reduced_ar: Vec<f64> = poly_mul(&ar_poly, &seasonal_ar_poly)[1..]
            .iter()
            .map(|c| -c)
            .collect();

        let mut ma_poly = vec![1.0];
        ma_poly.extend(params.ma.iter().copied());
        let mut seasonal_ma_poly = vec![0.0; period * params.seasonal_ma.len() + 1];
        seasonal_ma_poly[0] = 1.0;
        for (k, c) in params.seasonal_ma.iter().enumerate() {
            seasonal_ma_poly[(k + 1) * period] = *c;
        }
        let reduced_ma = poly_mul(&ma_poly, &seasonal_ma_poly)[1..].to_vec();

        ArmaStateSpace::new(&reduced_ar, &reduced_ma)
    }

    fn evaluate(&self, differenced: &[f64], params: &SarimaParams) -> Result<FilterOutput> {
        let space = self.state_space(params);
        let burn = space.dim();
        space.filter(differenced, self.config.diffuse_variance, burn)
    }
}

impl Predictor for Sarima {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        let required = self.config.min_observations();
        if data.len() < required {
            return Err(TsError::InsufficientData {
                required,
                actual: data.len(),
            });
        }

        // Check for invalid values
        if data.iter().any(|x| x.is_nan() || x.is_infinite()) {
            return Err(TsError::InvalidData(
                "Data contains NaN or infinite values".to_string(),
            ));
        }

        let differenced = apply_polynomial(data, &self.config.differencing_polynomial());

        let start = vec![0.0; self.config.n_coefficients()];
        let result = nelder_mead(
            |x| match self.evaluate(&differenced, &self.unpack(x)) {
                Ok(output) => -output.log_likelihood(),
                Err(_) => f64::INFINITY,
            },
            &start,
            &NelderMeadConfig::default(),
        );
        if !result.converged {
            warn!(
                iterations = result.iterations,
                "likelihood optimisation stopped before convergence"
            );
        }

        let mut params = self.unpack(&result.point);
        reflect_noninvertible(&mut params.ma);
        reflect_noninvertible(&mut params.seasonal_ma);
        let output = self.evaluate(&differenced, &params)?;
        params.sigma2 = output.sigma2();
        debug!(
            log_likelihood = output.log_likelihood(),
            sigma2 = params.sigma2,
            iterations = result.iterations,
            "fitted seasonal ARIMA"
        );

        self.params = params;
        self.log_likelihood = output.log_likelihood();
        self.iterations = result.iterations;
        self.converged = result.converged;
        self.history = data.to_vec();
        self.end_state = output.state;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TsError::NotFitted);
        }

        if steps == 0 {
            return Err(invalid("steps", "forecast horizon must be at least 1"));
        }

        let differenced_forecast = self
            .state_space(&self.params)
            .project(&self.end_state, steps);

        // Undo differencing: y[t] = w[t] - sum_{k>=1} delta[k] y[t-k]
        let delta = self.config.differencing_polynomial();
        let n = self.history.len();
        let mut extended = self.history.clone();
        extended.reserve(steps);
        for w in differenced_forecast {
            let t = extended.len();
            let carried: f64 = delta
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| c * extended[t - k])
                .sum();
            extended.push(w - carried);
        }

        Ok(extended.split_off(n))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

fn invalid(name: &str, reason: &str) -> TsError {
    TsError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Replace a single MA coefficient outside the unit interval with its
/// reciprocal.
///
/// `1 + c B^k` and `1 + B^k / c` give the same autocorrelations, so the
/// likelihood cannot tell them apart; the invertible root is reported. The
/// innovation variance is re-estimated by the caller.
fn reflect_noninvertible(block: &mut [f64]) {
    if let [c] = block {
        if c.abs() > 1.0 && c.is_finite() {
            debug!(coefficient = *c, "reflecting non-invertible MA root");
            *c = 1.0 / *c;
        }
    }
}

/// Product of two polynomials given as coefficients indexed by power.
fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// `w[t] = sum_k poly[k] y[t-k]` for every `t` with a full window.
fn apply_polynomial(data: &[f64], poly: &[f64]) -> Vec<f64> {
    let lost = poly.len() - 1;
    (lost..data.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * data[t - k]).sum())
        .collect()
}

/// Map unconstrained values to the coefficients of a stationary
/// `1 - c1 B - ... - cn B^n` via partial autocorrelations
/// (Monahan, 1984).
fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let n = unconstrained.len();
    if n == 0 {
        return Vec::new();
    }
    let partial: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();

    let mut y = vec![vec![0.0; n]; n];
    for k in 0..n {
        for i in 0..k {
            y[k][i] = y[k - 1][i] + partial[k] * y[k - 1][k - i - 1];
        }
        y[k][k] = partial[k];
    }
    y[n - 1].iter().map(|c| -c).collect()
}
