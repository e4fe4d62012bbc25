//! Logistic map time series and its Lyapunov exponent curve.

use super::types::{reserve, LyapunovSample, SeriesPoint};
use crate::params::{count, LogisticParameters, LyapunovParameters};
use crate::traits::Kernel;

/// Distance from 0 or 1 at which the Lyapunov scan re-seeds the orbit.
pub const BOUNDARY_EPSILON: f64 = 1e-10;
const RESEED_VALUE: f64 = 0.5;

#[inline]
pub(crate) fn logistic_step(r: f64, x: f64) -> f64 {
    r * x * (1.0 - x)
}

/// `(n, x_n)` for `n = 0..iterations`, starting with `(0, x0)`.
pub fn calculate_logistic(params: &LogisticParameters) -> Vec<SeriesPoint> {
    let iterations = count(params.iterations);
    let mut x = params.x0;
    let mut series = Vec::with_capacity(reserve(iterations));
    for n in 0..iterations {
        series.push(SeriesPoint {
            x: n as f64,
            value: x,
        });
        x = logistic_step(params.r, x);
    }
    series
}

fn near_boundary(x: f64) -> bool {
    !x.is_finite() || x < BOUNDARY_EPSILON || x > 1.0 - BOUNDARY_EPSILON
}

/// Mean of `ln|r(1 - 2x)|` along the orbit, or `None` if no usable sample.
pub fn lyapunov_exponent(r: f64, transient: usize, iterations: usize) -> Option<f64> {
    let mut x = RESEED_VALUE;
    for _ in 0..transient {
        x = logistic_step(r, x);
        if near_boundary(x) {
            x = RESEED_VALUE;
        }
    }

    let mut sum = 0.0;
    let mut samples = 0usize;
    for _ in 0..iterations {
        x = logistic_step(r, x);
        if near_boundary(x) {
            x = RESEED_VALUE;
            continue;
        }
        let derivative = (r * (1.0 - 2.0 * x)).abs();
        if derivative > 0.0 && derivative.is_finite() {
            sum += derivative.ln();
            samples += 1;
        }
    }

    (samples > 0).then(|| sum / samples as f64)
}

/// Exponent for `samples` evenly spaced `r` values across `[rMin, rMax]`.
pub fn calculate_lyapunov(params: &LyapunovParameters, samples: usize) -> Vec<LyapunovSample> {
    let transient = count(params.transient_iterations);
    let iterations = count(params.iterations);
    (0..samples)
        .map(|i| {
            let r = if samples == 1 {
                params.r_min
            } else {
                params.r_min + (params.r_max - params.r_min) * i as f64 / (samples - 1) as f64
            };
            LyapunovSample {
                r,
                exponent: lyapunov_exponent(r, transient, iterations),
            }
        })
        .collect()
}

impl Kernel for LogisticParameters {
    type Output = Vec<SeriesPoint>;

    fn run(&self) -> Self::Output {
        calculate_logistic(self)
    }
}
