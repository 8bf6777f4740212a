//! ARMA processes in state-space form
//!
//! A reduced ARMA(r, s) process
//!
//! ```text
//! x[t] = a1 x[t-1] + ... + ar x[t-r] + e[t] + b1 e[t-1] + ... + bs e[t-s]
//! ```
//!
//! is written in Harvey form with state dimension `m = max(r, s + 1)`:
//! the transition matrix has the AR coefficients in its first column and
//! ones on the superdiagonal, the selection vector is `[1, b1, ..., b(m-1)]`
//! and the observation picks the first state element.
//!
//! The Kalman filter below runs with unit innovation variance so that the
//! variance can be concentrated out of the likelihood.

use crate::error::{Result, TsError};

/// Reduced ARMA process in Harvey state-space form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ArmaStateSpace {
    /// AR coefficients padded to the state dimension
    ar: Vec<f64>,
    /// Selection vector `[1, b1, ..., b(m-1)]`
    selection: Vec<f64>,
}

/// Result of filtering a sample.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterOutput {
    /// Sum of squared standardised innovations `v^2 / F` after burn-in
    pub sum_squares: f64,
    /// Sum of `ln F` after burn-in
    pub sum_log_variance: f64,
    /// Innovations counted in the likelihood
    pub n_used: usize,
    /// Predicted state for the period after the sample
    pub state: Vec<f64>,
}

impl FilterOutput {
    /// Maximum-likelihood innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.sum_squares / self.n_used as f64
    }

    /// Gaussian log-likelihood with the innovation variance concentrated out.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.n_used as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + 1.0 + self.sigma2().ln())
            - 0.5 * self.sum_log_variance
    }
}

impl ArmaStateSpace {
    /// Build the state space for AR coefficients `ar` and MA coefficients `ma`.
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let dim = ar.len().max(ma.len() + 1);

        let mut padded_ar = vec![0.0; dim];
        padded_ar[..ar.len()].copy_from_slice(ar);

        let mut selection = vec![0.0; dim];
        selection[0] = 1.0;
        selection[1..=ma.len()].copy_from_slice(ma);

        Self {
            ar: padded_ar,
            selection,
        }
    }

    /// State dimension.
    pub fn dim(&self) -> usize {
        self.ar.len()
    }

    /// `T a`
    fn transition(&self, state: &[f64]) -> Vec<f64> {
        let m = self.dim();
        (0..m)
            .map(|i| {
                let carried = if i + 1 < m { state[i + 1] } else { 0.0 };
                self.ar[i] * state[0] + carried
            })
            .collect()
    }

    /// `T P T'`
    fn transition_covariance(&self, cov: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let m = self.dim();
        // TP, row by row
        let tp: Vec<Vec<f64>> = (0..m)
            .map(|i| {
                (0..m)
                    .map(|j| {
                        let carried = if i + 1 < m { cov[i + 1][j] } else { 0.0 };
                        self.ar[i] * cov[0][j] + carried
                    })
                    .collect()
            })
            .collect();
        (0..m)
            .map(|i| {
                (0..m)
                    .map(|j| {
                        let carried = if j + 1 < m { tp[i][j + 1] } else { 0.0 };
                        self.ar[j] * tp[i][0] + carried
                    })
                    .collect()
            })
            .collect()
    }

    /// Run the Kalman filter over `observations`.
    ///
    /// The state starts at zero with covariance `diffuse_variance * I`. The
    /// first `burn` innovations are excluded from the likelihood sums.
    pub fn filter(&self, observations: &[f64], diffuse_variance: f64, burn: usize) -> Result<FilterOutput> {
        let m = self.dim();
        let mut state = vec![0.0; m];
        let mut cov: Vec<Vec<f64>> = (0..m)
            .map(|i| {
                let mut row = vec![0.0; m];
                row[i] = diffuse_variance;
                row
            })
            .collect();

        let mut sum_squares = 0.0;
        let mut sum_log_variance = 0.0;
        let mut n_used = 0;

        for (t, &y) in observations.iter().enumerate() {
            let innovation = y - state[0];
            let variance = cov[0][0];
            if !(variance.is_finite() && variance > 0.0) {
                return Err(TsError::NumericalError(format!(
                    "non-positive innovation variance {} at step {}",
                    variance, t
                )));
            }

            if t >= burn {
                sum_squares += innovation * innovation / variance;
                sum_log_variance += variance.ln();
                n_used += 1;
            }

            // K = T P Z' / F, where P Z' is the first column of P
            let first_column: Vec<f64> = cov.iter().map(|row| row[0]).collect();
            let gain: Vec<f64> = self
                .transition(&first_column)
                .into_iter()
                .map(|g| g / variance)
                .collect();

            let mut next_state = self.transition(&state);
            for (s, k) in next_state.iter_mut().zip(&gain) {
                *s += k * innovation;
            }

            let mut next_cov = self.transition_covariance(&cov);
            for i in 0..m {
                for j in 0..m {
                    next_cov[i][j] += self.selection[i] * self.selection[j]
                        - gain[i] * gain[j] * variance;
                }
            }
            for i in 0..m {
                for j in (i + 1)..m {
                    let mean = 0.5 * (next_cov[i][j] + next_cov[j][i]);
                    next_cov[i][j] = mean;
                    next_cov[j][i] = mean;
                }
            }

            state = next_state;
            cov = next_cov;
        }

        if n_used == 0 || !(sum_squares.is_finite() && sum_squares > 0.0) {
            return Err(TsError::NumericalError(
                "likelihood is undefined for this sample".to_string(),
            ));
        }

        Ok(FilterOutput {
            sum_squares,
            sum_log_variance,
            n_used,
            state,
        })
    }

    /// Project `state` forward, returning the observation mean for each of
    /// the next `steps` periods. `state` is the prediction for the first.
    pub fn project(&self, state: &[f64], steps: usize) -> Vec<f64> {
        let mut current = state.to_vec();
        let mut means = Vec::with_capacity(steps);
        for _ in 0..steps {
            means.push(current[0]);
            current = self.transition(&current);
        }
        means
    }
}
