//! Newton fractal for `f(z) = z^3 - 1`.

use super::types::{reserve, NewtonImage};
use crate::params::{count, NewtonParameters};
use num_complex::Complex64;

/// `|f'(z)|` below this aborts the pixel.
pub const DERIVATIVE_EPSILON: f64 = 1e-10;
/// Distance to a root that counts as converged.
pub const ROOT_TOLERANCE: f64 = 1e-3;

const SENTINEL: [u8; 4] = [0, 0, 0, 255];

fn roots() -> [Complex64; 3] {
    let s = 3f64.sqrt() / 2.0;
    [
        Complex64::new(1.0, 0.0),
        Complex64::new(-0.5, s),
        Complex64::new(-0.5, -s),
    ]
}

/// What Newton's method did from one starting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelOutcome {
    Converged { root: usize, iterations: usize },
    DegenerateDerivative,
    Unresolved,
}

pub fn newton_pixel(z0: Complex64, max_iterations: usize) -> PixelOutcome {
    let roots = roots();
    let mut z = z0;
    for iteration in 0..max_iterations {
        let derivative = 3.0 * z * z;
        if derivative.norm() < DERIVATIVE_EPSILON {
            return PixelOutcome::DegenerateDerivative;
        }
        z -= (z * z * z - 1.0) / derivative;
        if let Some(root) = roots.iter().position(|r| (z - r).norm() < ROOT_TOLERANCE) {
            return PixelOutcome::Converged {
                root,
                iterations: iteration,
            };
        }
    }
    PixelOutcome::Unresolved
}

/// Root hue scaled by `1 - iterations / max_iterations`; black otherwise.
pub fn outcome_color(outcome: PixelOutcome, max_iterations: usize) -> [u8; 4] {
    match outcome {
        PixelOutcome::Converged { root, iterations } => {
            let brightness = 1.0 - iterations as f64 / max_iterations.max(1) as f64;
            let level = (255.0 * brightness).round().clamp(0.0, 255.0) as u8;
            let mut rgba = [0, 0, 0, 255];
            rgba[root] = level;
            rgba
        }
        PixelOutcome::DegenerateDerivative | PixelOutcome::Unresolved => SENTINEL,
    }
}

fn axis(min: f64, max: f64, index: usize, len: usize) -> f64 {
    if len <= 1 {
        min
    } else {
        min + (max - min) * index as f64 / (len - 1) as f64
    }
}

/// Renders the basins of attraction; row 0 is `yMax`. Each pixel is written
/// exactly once, in row-major order.
pub fn calculate_newton(params: &NewtonParameters, width: usize, height: usize) -> NewtonImage {
    let max_iterations = count(params.max_iterations);
    let mut pixels = Vec::with_capacity(reserve(
        width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .unwrap_or(usize::MAX),
    ));
    for row in 0..height {
        let im = axis(params.y_max, params.y_min, row, height);
        for col in 0..width {
            let re = axis(params.x_min, params.x_max, col, width);
            let outcome = newton_pixel(Complex64::new(re, im), max_iterations);
            pixels.extend_from_slice(&outcome_color(outcome, max_iterations));
        }
    }
    NewtonImage {
        width,
        height,
        pixels,
    }
}
