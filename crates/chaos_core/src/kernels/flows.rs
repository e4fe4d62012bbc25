//! Continuous systems: Lorenz (forward Euler) and Rössler (RK4).
//!
//! Lorenz output must stay bit-compatible with its Euler trajectory. Neither
//! integrator guards against divergence for large `dt`.

use super::types::{reserve, Point3};
use crate::params::{LorenzParameters, RosslerParameters};
use crate::solvers::{Euler, RK4};
use crate::traits::{DynamicalSystem, Steppable};
use serde::{Deserialize, Serialize};

/// Initial state and step schedule for a flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowStart {
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
    pub steps: usize,
    pub dt: f64,
}

impl Default for FlowStart {
    fn default() -> Self {
        Self {
            x0: 1.0,
            y0: 1.0,
            z0: 1.0,
            steps: 10_000,
            dt: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LorenzInput {
    #[serde(flatten)]
    pub params: LorenzParameters,
    #[serde(flatten)]
    pub start: FlowStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RosslerInput {
    #[serde(flatten)]
    pub params: RosslerParameters,
    #[serde(flatten)]
    pub start: FlowStart,
}

struct LorenzField(LorenzParameters);

impl DynamicalSystem<f64> for LorenzField {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, s: &[f64], out: &mut [f64]) {
        let LorenzParameters { sigma, rho, beta } = self.0;
        out[0] = sigma * (s[1] - s[0]);
        out[1] = s[0] * (rho - s[2]) - s[1];
        out[2] = s[0] * s[1] - beta * s[2];
    }
}

struct RosslerField(RosslerParameters);

impl DynamicalSystem<f64> for RosslerField {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, s: &[f64], out: &mut [f64]) {
        let RosslerParameters { a, b, c } = self.0;
        out[0] = -s[1] - s[2];
        out[1] = s[0] + a * s[1];
        out[2] = b + s[2] * (s[0] - c);
    }
}

/// Records the state after each of `start.steps` steps.
fn integrate(
    system: &impl DynamicalSystem<f64>,
    stepper: &mut impl Steppable<f64>,
    start: &FlowStart,
) -> Vec<Point3> {
    let mut state = [start.x0, start.y0, start.z0];
    let mut points = Vec::with_capacity(reserve(start.steps));
    for _ in 0..start.steps {
        stepper.step(system, &mut state, start.dt);
        points.push(Point3::from(state));
    }
    points
}

pub fn calculate_lorenz(input: &LorenzInput) -> Vec<Point3> {
    let field = LorenzField(input.params);
    integrate(&field, &mut Euler::new(field.dimension()), &input.start)
}

pub fn calculate_rossler(input: &RosslerInput) -> Vec<Point3> {
    let field = RosslerField(input.params);
    integrate(&field, &mut RK4::new(field.dimension()), &input.start)
}
