//! Bifurcation diagrams for the logistic and Hénon maps.
//!
//! Each pixel column samples one parameter value. After a warm-up that lets
//! the orbit settle, every further iterate is accumulated into the column, so
//! dense rows show where the attractor spends its time.

use super::logistic::logistic_step;
use super::maps::HENON_ESCAPE_RADIUS;
use super::types::DensityGrid;
use crate::params::{count, BifurcationHenonParameters, BifurcationLogisticParameters};

/// Vertical extent of the logistic diagram.
pub const LOGISTIC_VALUE_RANGE: (f64, f64) = (0.0, 1.0);
/// Vertical extent of the Hénon diagram (the `x` coordinate).
pub const HENON_VALUE_RANGE: (f64, f64) = (-1.5, 1.5);

const LOGISTIC_SEED: f64 = 0.5;
const HENON_SEED: [f64; 2] = [0.1, 0.1];

pub fn calculate_bifurcation_logistic(
    params: &BifurcationLogisticParameters,
    width: usize,
    height: usize,
    warmup: usize,
) -> DensityGrid {
    let mut grid = DensityGrid::new(
        width,
        height,
        (params.r_min, params.r_max),
        LOGISTIC_VALUE_RANGE,
    );
    let plotted = count(params.max_iterations);

    for col in 0..width {
        let r = grid.column_parameter(col);
        let mut x = LOGISTIC_SEED;
        for _ in 0..warmup {
            x = logistic_step(r, x);
        }
        for _ in 0..plotted {
            x = logistic_step(r, x);
            if !x.is_finite() {
                break;
            }
            grid.plot(col, x);
        }
    }
    grid
}

pub fn calculate_bifurcation_henon(
    params: &BifurcationHenonParameters,
    width: usize,
    height: usize,
    warmup: usize,
) -> DensityGrid {
    let mut grid = DensityGrid::new(
        width,
        height,
        (params.a_min, params.a_max),
        HENON_VALUE_RANGE,
    );
    let plotted = count(params.max_iterations);
    let escaped = |x: f64| !x.is_finite() || x.abs() > HENON_ESCAPE_RADIUS;

    for col in 0..width {
        let a = grid.column_parameter(col);
        let [mut x, mut y] = HENON_SEED;
        let mut diverged = false;
        for _ in 0..warmup {
            (x, y) = (1.0 - a * x * x + y, params.b * x);
            if escaped(x) {
                diverged = true;
                break;
            }
        }
        if diverged {
            continue;
        }
        for _ in 0..plotted {
            (x, y) = (1.0 - a * x * x + y, params.b * x);
            if escaped(x) {
                break;
            }
            grid.plot(col, x);
        }
    }
    grid
}
