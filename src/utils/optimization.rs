//! Derivative-free minimisation used to estimate model parameters.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

// Simplex coefficients: reflection, expansion, contraction, shrinkage.
const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Iteration budget and stopping rule for parameter estimation.
///
/// A fit that uses up `max_iterations` without meeting `tolerance`
/// fails with [`ForecastError::NonConvergence`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Maximum number of simplex iterations.
    pub max_iterations: usize,
    /// Relative spread of objective values across the simplex at which
    /// the search stops.
    pub tolerance: f64,
    /// Initial simplex step size.
    pub initial_step: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

impl OptimizerConfig {
    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance > 0.0) || !(self.initial_step > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "tolerance and initial_step must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Minimum found by [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Location of the minimum.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Iterations used.
    pub iterations: usize,
}

/// Nelder-Mead simplex minimisation within box bounds.
///
/// `method` names the model being estimated and is carried into the
/// [`ForecastError::NonConvergence`] raised when the budget runs out.
/// Non-finite objective values are treated as `+inf`.
///
/// # Example
/// ```
/// use forecast_harness::utils::optimization::{nelder_mead, OptimizerConfig};
///
/// let min = nelder_mead(
///     "quadratic",
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     &[(-10.0, 10.0), (-10.0, 10.0)],
///     &OptimizerConfig::default(),
/// )
/// .unwrap();
///
/// assert!((min.point[0] - 2.0).abs() < 0.01);
/// assert!((min.point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    method: &str,
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &OptimizerConfig,
) -> Result<Minimum>
where
    F: Fn(&[f64]) -> f64,
{
    config.validate()?;
    if bounds.len() != initial.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} bounds for {} parameters",
            bounds.len(),
            initial.len()
        )));
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let n = initial.len();
    if n == 0 {
        return Ok(Minimum {
            point: Vec::new(),
            value: eval(&[]),
            iterations: 0,
        });
    }

    let start = clamp(initial, bounds);
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        let width = bounds[i].1 - bounds[i].0;
        let step = if width.is_finite() {
            config.initial_step * width.min(1.0)
        } else if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        // Step inward when the start sits on the upper bound.
        vertex[i] = if vertex[i] + step > bounds[i].1 {
            vertex[i] - step
        } else {
            vertex[i] + step
        };
        simplex.push(clamp(&vertex, bounds));
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();
    let mut iterations = 0;

    loop {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = values[worst] - values[best];
        if spread <= config.tolerance * (values[best].abs() + config.tolerance) {
            return Ok(Minimum {
                point: simplex[best].clone(),
                value: values[best],
                iterations,
            });
        }

        let centroid = centroid_without(&simplex, worst);
        let collapsed = simplex
            .iter()
            .all(|v| distance(v, &centroid) < config.tolerance);
        if collapsed {
            return Ok(Minimum {
                point: simplex[best].clone(),
                value: values[best],
                iterations,
            });
        }

        if iterations >= config.max_iterations {
            return Err(ForecastError::non_convergence(method, iterations));
        }
        iterations += 1;

        let reflected = clamp(&towards(&centroid, &simplex[worst], -ALPHA), bounds);
        let reflected_value = eval(&reflected);

        if reflected_value < values[best] {
            let expanded = clamp(&towards(&centroid, &reflected, GAMMA), bounds);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let (target, target_value) = if reflected_value < values[worst] {
            (reflected, reflected_value)
        } else {
            (simplex[worst].clone(), values[worst])
        };
        let contracted = clamp(&towards(&centroid, &target, RHO), bounds);
        let contracted_value = eval(&contracted);
        if contracted_value < target_value {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                simplex[i] = clamp(&towards(&anchor, &simplex[i], SIGMA), bounds);
                values[i] = eval(&simplex[i]);
            }
        }
    }
}

/// `from + t * (to - from)`.
fn towards(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter()
        .zip(to.iter())
        .map(|(f, p)| f + t * (p - f))
        .collect()
}

fn centroid_without(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude {
            for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
                *c += v;
            }
        }
    }
    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

fn clamp(point: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    point
        .iter()
        .zip(bounds.iter())
        .map(|(&x, &(lo, hi))| x.clamp(lo, hi))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
