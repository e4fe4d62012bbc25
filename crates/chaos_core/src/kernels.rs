//! Numerical kernels for every map type, plus a single dispatch entry point.
//!
//! Kernels are pure: they read their parameters, allocate a fresh result and
//! return it. Render context that is not part of a parameter set (pixel size,
//! initial state of a flow, point budgets) comes from [`KernelSettings`].

pub mod bifurcation;
pub mod flows;
pub mod logistic;
pub mod maps;
pub mod newton;
pub mod standard;
pub mod types;

pub use bifurcation::{calculate_bifurcation_henon, calculate_bifurcation_logistic};
pub use flows::{calculate_lorenz, calculate_rossler, FlowStart, LorenzInput, RosslerInput};
pub use logistic::{calculate_logistic, calculate_lyapunov, lyapunov_exponent};
pub use maps::{calculate_chaos_esthetique, calculate_henon, calculate_lozi};
pub use newton::calculate_newton;
pub use standard::{calculate_standard_map, wrap_angle};
pub use types::{
    DensityGrid, KernelOutput, LyapunovSample, NewtonImage, Point2, Point3, SeriesPoint,
    BIFURCATION_WARMUP, CHAOS_ESTHETIQUE_MAX_POINTS, STANDARD_MAP_MAX_POINTS,
};

use crate::params::ParameterSet;
use crate::traits::Kernel;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KernelSettings {
    /// Pixel width for image and density kernels.
    pub width: usize,
    pub height: usize,
    /// Number of `r` samples on the Lyapunov curve.
    pub lyapunov_samples: usize,
    pub flow: FlowStart,
    pub standard_map_max_points: usize,
    pub chaos_esthetique_max_points: usize,
    pub bifurcation_warmup: usize,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            lyapunov_samples: 500,
            flow: FlowStart::default(),
            standard_map_max_points: STANDARD_MAP_MAX_POINTS,
            chaos_esthetique_max_points: CHAOS_ESTHETIQUE_MAX_POINTS,
            bifurcation_warmup: BIFURCATION_WARMUP,
        }
    }
}

/// Runs the kernel that belongs to `parameters`.
///
/// Parameters are expected to have passed validation; the only checks here are
/// on the render settings.
pub fn compute(parameters: &ParameterSet, settings: &KernelSettings) -> Result<KernelOutput> {
    let map_type = parameters.map_type();
    if map_type_draws_pixels(parameters) && (settings.width == 0 || settings.height == 0) {
        bail!(
            "{} needs a non-empty canvas, got {}x{}",
            map_type,
            settings.width,
            settings.height
        );
    }
    debug!(map_type = %map_type, width = settings.width, height = settings.height, "dispatching kernel");

    let output = match parameters {
        ParameterSet::Lorenz(params) => KernelOutput::Trajectory3(calculate_lorenz(&LorenzInput {
            params: *params,
            start: settings.flow,
        })),
        ParameterSet::Rossler(params) => {
            KernelOutput::Trajectory3(calculate_rossler(&RosslerInput {
                params: *params,
                start: settings.flow,
            }))
        }
        ParameterSet::Henon(params) => KernelOutput::Trajectory2(params.run()),
        ParameterSet::Lozi(params) => KernelOutput::Trajectory2(params.run()),
        ParameterSet::Logistic(params) => KernelOutput::Series(params.run()),
        ParameterSet::Newton(params) => {
            KernelOutput::Image(calculate_newton(params, settings.width, settings.height))
        }
        ParameterSet::Standard(params) => KernelOutput::Trajectory2(calculate_standard_map(
            params,
            settings.standard_map_max_points,
        )),
        ParameterSet::BifurcationLogistic(params) => {
            KernelOutput::Density(calculate_bifurcation_logistic(
                params,
                settings.width,
                settings.height,
                settings.bifurcation_warmup,
            ))
        }
        ParameterSet::BifurcationHenon(params) => {
            KernelOutput::Density(calculate_bifurcation_henon(
                params,
                settings.width,
                settings.height,
                settings.bifurcation_warmup,
            ))
        }
        ParameterSet::ChaosEsthetique(params) => KernelOutput::Trajectory2(
            calculate_chaos_esthetique(params, settings.chaos_esthetique_max_points),
        ),
        ParameterSet::Lyapunov(params) => {
            KernelOutput::Lyapunov(calculate_lyapunov(params, settings.lyapunov_samples))
        }
    };
    debug!(map_type = %map_type, len = output.len(), "kernel finished");
    Ok(output)
}

fn map_type_draws_pixels(parameters: &ParameterSet) -> bool {
    matches!(
        parameters,
        ParameterSet::Newton(_)
            | ParameterSet::BifurcationLogistic(_)
            | ParameterSet::BifurcationHenon(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::default_parameters;
    use crate::schema::MapType;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        match result {
            Ok(value) => panic!("expected error containing {needle:?}, got {value:?}"),
            Err(err) => assert!(
                err.to_string().contains(needle),
                "error {err:?} does not contain {needle:?}"
            ),
        }
    }

    fn small_settings() -> KernelSettings {
        KernelSettings {
            width: 16,
            height: 12,
            lyapunov_samples: 9,
            flow: FlowStart {
                steps: 50,
                ..FlowStart::default()
            },
            ..KernelSettings::default()
        }
    }

    #[test]
    fn every_default_set_computes() {
        let settings = small_settings();
        for map_type in MapType::ALL {
            let output = compute(&default_parameters(map_type), &settings)
                .unwrap_or_else(|err| panic!("{map_type}: {err}"));
            assert!(!output.is_empty(), "{map_type} produced nothing");
        }
    }

    #[test]
    fn dispatch_picks_the_matching_shape() {
        let settings = small_settings();
        let shape = |map_type| compute(&default_parameters(map_type), &settings).expect("compute");
        assert!(matches!(shape(MapType::Lorenz), KernelOutput::Trajectory3(ref p) if p.len() == 50));
        assert!(matches!(shape(MapType::Logistic), KernelOutput::Series(_)));
        assert!(matches!(shape(MapType::Lyapunov), KernelOutput::Lyapunov(ref s) if s.len() == 9));
        assert!(matches!(shape(MapType::Newton), KernelOutput::Image(ref i) if i.pixels.len() == 16 * 12 * 4));
        assert!(matches!(shape(MapType::BifurcationHenon), KernelOutput::Density(_)));
    }

    #[test]
    fn dispatch_matches_direct_kernel_calls() {
        let settings = KernelSettings::default();
        for map_type in [
            MapType::Henon,
            MapType::Lozi,
            MapType::Standard,
            MapType::ChaosEsthetique,
        ] {
            let set = default_parameters(map_type);
            let direct = match set {
                ParameterSet::Henon(p) => p.run(),
                ParameterSet::Lozi(p) => p.run(),
                ParameterSet::Standard(p) => p.run(),
                ParameterSet::ChaosEsthetique(p) => p.run(),
                _ => unreachable!(),
            };
            assert_eq!(
                compute(&set, &settings).expect("compute"),
                KernelOutput::Trajectory2(direct)
            );
        }
    }

    #[test]
    fn logistic_dispatch_runs_the_series_kernel() {
        let ParameterSet::Logistic(params) = default_parameters(MapType::Logistic) else {
            unreachable!()
        };
        let output = compute(&ParameterSet::Logistic(params), &KernelSettings::default())
            .expect("compute");
        assert_eq!(output, KernelOutput::Series(params.run()));
    }

    #[test]
    fn pixel_kernels_reject_an_empty_canvas() {
        let settings = KernelSettings {
            width: 0,
            ..KernelSettings::default()
        };
        assert_err_contains(
            compute(&default_parameters(MapType::Newton), &settings),
            "non-empty canvas",
        );
        assert!(compute(&default_parameters(MapType::Henon), &settings).is_ok());
    }

    #[test]
    fn settings_fill_missing_fields_from_defaults() {
        let settings: KernelSettings =
            serde_json::from_str(r#"{"width": 320, "flow": {"x0": 0.5, "y0": 0.0, "z0": 0.0, "steps": 10, "dt": 0.005}}"#)
                .expect("deserialize");
        assert_eq!(settings.width, 320);
        assert_eq!(settings.height, 600);
        assert_eq!(settings.flow.steps, 10);
        assert_eq!(settings.standard_map_max_points, STANDARD_MAP_MAX_POINTS);
    }

    #[test]
    fn output_serializes_with_kind_tag() {
        let output = KernelOutput::Trajectory2(vec![Point2 { x: 1.0, y: 2.0 }]);
        let json = serde_json::to_value(&output).expect("serialize");
        assert_eq!(json["kind"], "trajectory2");
        assert_eq!(json["data"][0], serde_json::json!([1.0, 2.0]));
    }
}
