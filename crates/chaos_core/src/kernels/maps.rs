//! Planar discrete maps: Hénon, Lozi and chaos-esthétique.

use super::types::{reserve, Point2, CHAOS_ESTHETIQUE_MAX_POINTS};
use crate::params::{count, ChaosEsthetiqueParameters, HenonParameters, LoziParameters};
use crate::solvers::DiscreteMap;
use crate::traits::{DynamicalSystem, Kernel, Steppable};

/// Hénon orbits are abandoned once a coordinate grows past this.
pub const HENON_ESCAPE_RADIUS: f64 = 1e6;

struct Henon {
    a: f64,
    b: f64,
}

impl DynamicalSystem<f64> for Henon {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, s: &[f64], out: &mut [f64]) {
        out[0] = 1.0 - self.a * s[0] * s[0] + s[1];
        out[1] = self.b * s[0];
    }
}

struct Lozi {
    a: f64,
    b: f64,
}

impl DynamicalSystem<f64> for Lozi {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, s: &[f64], out: &mut [f64]) {
        out[0] = 1.0 + s[1] - self.a * s[0].abs();
        out[1] = self.b * s[0];
    }
}

/// Gumowski–Mira style recurrence behind the chaos-esthétique view.
struct Esthetique {
    a: f64,
    b: f64,
}

impl Esthetique {
    fn shape(x: f64, a: f64) -> f64 {
        a * x + 2.0 * (1.0 - a) * x * x / (1.0 + x * x)
    }
}

impl DynamicalSystem<f64> for Esthetique {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, s: &[f64], out: &mut [f64]) {
        let x_next = s[1] + Self::shape(s[0], self.a);
        out[0] = x_next;
        out[1] = -self.b * s[0] + Self::shape(x_next, self.a);
    }
}

/// Iterates `map` from `start`, recording each new state while `keep` accepts it.
fn orbit(
    map: &impl DynamicalSystem<f64>,
    start: [f64; 2],
    iterations: usize,
    keep: impl Fn(&[f64; 2]) -> bool,
) -> Vec<Point2> {
    let mut stepper = DiscreteMap::new(map.dimension());
    let mut state = start;
    let mut points = Vec::with_capacity(reserve(iterations));
    for _ in 0..iterations {
        stepper.step(map, &mut state, 1.0);
        if !keep(&state) {
            break;
        }
        points.push(Point2::from(state));
    }
    points
}

/// Hénon map from the origin. The orbit is truncated (without the offending
/// point) once it leaves the escape radius or stops being finite.
pub fn calculate_henon(params: &HenonParameters) -> Vec<Point2> {
    let map = Henon {
        a: params.a,
        b: params.b,
    };
    orbit(&map, [0.0, 0.0], count(params.iterations), |s| {
        s.iter()
            .all(|v| v.is_finite() && v.abs() <= HENON_ESCAPE_RADIUS)
    })
}

/// Piecewise-linear Lozi map from `(x0, y0)`; no divergence guard.
pub fn calculate_lozi(params: &LoziParameters) -> Vec<Point2> {
    let map = Lozi {
        a: params.a,
        b: params.b,
    };
    orbit(&map, [params.x0, params.y0], count(params.iterations), |_| true)
}

pub fn calculate_chaos_esthetique(
    params: &ChaosEsthetiqueParameters,
    max_points: usize,
) -> Vec<Point2> {
    let map = Esthetique {
        a: params.a,
        b: params.b,
    };
    let iterations = count(params.iterations).min(max_points);
    orbit(&map, [params.x0, params.y0], iterations, |_| true)
}

impl Kernel for HenonParameters {
    type Output = Vec<Point2>;

    fn run(&self) -> Self::Output {
        calculate_henon(self)
    }
}

impl Kernel for LoziParameters {
    type Output = Vec<Point2>;

    fn run(&self) -> Self::Output {
        calculate_lozi(self)
    }
}

impl Kernel for ChaosEsthetiqueParameters {
    type Output = Vec<Point2>;

    fn run(&self) -> Self::Output {
        calculate_chaos_esthetique(self, CHAOS_ESTHETIQUE_MAX_POINTS)
    }
}
