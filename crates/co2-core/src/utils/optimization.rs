//! Derivative-free minimisation
//!
//! Nelder-Mead downhill simplex with the standard reflection, expansion,
//! contraction and shrink coefficients. Fully deterministic: the same
//! objective and starting point always produce the same result.

/// Reflection coefficient
const ALPHA: f64 = 1.0;
/// Expansion coefficient
const GAMMA: f64 = 2.0;
/// Contraction coefficient
const RHO: f64 = 0.5;
/// Shrink coefficient
const SIGMA: f64 = 0.5;

/// Stopping and start-up settings for [`nelder_mead`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Converged once every vertex lies within this distance of the best one
    pub x_tolerance: f64,
    /// ...and every vertex value lies within this distance of the best value
    pub f_tolerance: f64,
    /// Offset added to each coordinate to build the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            x_tolerance: 1e-6,
            f_tolerance: 1e-9,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerances were met before `max_iterations`
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// NaN objective values are treated as `+inf`, so an objective can reject a
/// region simply by returning `f64::INFINITY` or NaN.
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let value = objective(x);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            point: Vec::new(),
            value: eval(initial),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += config.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();

    let mut iterations = 0;
    let mut converged = false;

    loop {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let f_spread = values
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0, f64::max);
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|vertex| vertex.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        if f_spread <= config.f_tolerance && x_spread <= config.x_tolerance {
            converged = true;
            break;
        }
        if iterations >= config.max_iterations {
            break;
        }
        iterations += 1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|vertex| vertex[j]).sum::<f64>() / n as f64)
            .collect();
        let worst = simplex[n].clone();

        let reflected = along(&centroid, &worst, ALPHA);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = along(&centroid, &worst, GAMMA);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < values[n] {
            let point = along(&centroid, &worst, RHO * ALPHA);
            let value = eval(&point);
            (point, value)
        } else {
            let point = along(&centroid, &worst, -RHO);
            let value = eval(&point);
            (point, value)
        };

        if f_contracted < f_reflected.min(values[n]) {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        let best = simplex[0].clone();
        for i in 1..=n {
            for (x, b) in simplex[i].iter_mut().zip(&best) {
                *x = b + SIGMA * (*x - b);
            }
            values[i] = eval(&simplex[i]);
        }
    }

    NelderMeadResult {
        point: simplex.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    }
}

/// Point on the line from `worst` through `centroid`, `coef` centroid-widths
/// past the centroid.
fn along(centroid: &[f64], worst: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(worst)
        .map(|(c, w)| c + coef * (c - w))
        .collect()
}
