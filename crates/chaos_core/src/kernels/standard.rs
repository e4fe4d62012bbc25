//! Chirikov standard map over a grid of initial conditions.

use super::types::{reserve, Point2, STANDARD_MAP_MAX_POINTS};
use crate::params::{count, StandardMapParameters};
use crate::traits::Kernel;
use std::f64::consts::TAU;

/// Floor-modulo into `[0, 2π)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `2π`, which is
/// folded back to zero.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Emits `(q, p)` for every iterate of every orbit, stopping everything once
/// `max_points` have been produced.
pub fn calculate_standard_map(params: &StandardMapParameters, max_points: usize) -> Vec<Point2> {
    let num_p = count(params.num_p);
    let num_q = count(params.num_q);
    let iterations = count(params.iterations);
    let budget = num_p
        .saturating_mul(num_q)
        .saturating_mul(iterations)
        .min(max_points);
    let mut points = Vec::with_capacity(reserve(budget));

    'grid: for i in 0..num_p {
        for j in 0..num_q {
            let mut p = TAU * i as f64 / num_p as f64;
            let mut q = TAU * j as f64 / num_q as f64;
            for _ in 0..iterations {
                if points.len() >= max_points {
                    break 'grid;
                }
                p = wrap_angle(p + params.k * q.sin());
                q = wrap_angle(q + p);
                points.push(Point2 { x: q, y: p });
            }
        }
    }
    points
}

impl Kernel for StandardMapParameters {
    type Output = Vec<Point2>;

    fn run(&self) -> Self::Output {
        calculate_standard_map(self, STANDARD_MAP_MAX_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(k: f64, grid: f64, iterations: f64) -> StandardMapParameters {
        StandardMapParameters {
            k,
            num_p: grid,
            num_q: grid,
            iterations,
        }
    }

    #[test]
    fn wrap_angle_is_a_floor_modulo() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-12);
        assert_eq!(wrap_angle(-1e-17), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
    }

    #[test]
    fn all_points_lie_in_the_half_open_torus() {
        for k in [0.5, 0.971635, 2.5, 7.0] {
            let points = calculate_standard_map(&params(k, 12.0, 300.0), usize::MAX);
            assert_eq!(points.len(), 12 * 12 * 300);
            assert!(points.iter().all(|pt| {
                (0.0..TAU).contains(&pt.x) && (0.0..TAU).contains(&pt.y)
            }));
        }
    }

    #[test]
    fn negative_kicks_wrap_instead_of_going_negative() {
        // q0 = 4pi/3 has sin(q0) < 0, so the first kick from p = 0 is negative.
        let points = calculate_standard_map(
            &StandardMapParameters {
                k: 1.0,
                num_p: 1.0,
                num_q: 3.0,
                iterations: 1.0,
            },
            usize::MAX,
        );
        assert_eq!(points.len(), 3);
        let kicked = points[2];
        let expected_p = wrap_angle((TAU * 2.0 / 3.0).sin());
        assert!(expected_p > std::f64::consts::PI);
        assert!((kicked.y - expected_p).abs() < 1e-12);
        assert!(kicked.x >= 0.0 && kicked.x < TAU);
    }

    #[test]
    fn point_cap_stops_all_orbits() {
        let points = calculate_standard_map(&params(1.0, 50.0, 10_000.0), 1_234);
        assert_eq!(points.len(), 1_234);
        assert_eq!(params(1.0, 100.0, 100_000.0).run().len(), STANDARD_MAP_MAX_POINTS);
    }

    #[test]
    fn zero_kick_is_a_rigid_rotation() {
        let points = calculate_standard_map(
            &StandardMapParameters {
                k: 0.0,
                num_p: 4.0,
                num_q: 1.0,
                iterations: 3.0,
            },
            usize::MAX,
        );
        // Orbit with p = pi/2: q advances by pi/2 each step.
        let orbit = &points[3..6];
        for (n, pt) in orbit.iter().enumerate() {
            assert!((pt.y - TAU / 4.0).abs() < 1e-12);
            let expected_q = wrap_angle(TAU / 4.0 * (n + 1) as f64);
            assert!((pt.x - expected_q).abs() < 1e-12);
        }
    }
}
