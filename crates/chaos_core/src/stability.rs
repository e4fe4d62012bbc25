//! Advisory range checks. Nothing here blocks a kernel from running; the
//! warnings are shown to the user before a likely divergent render.

use crate::params::ParameterSet;
use crate::validation::{validate_parameter_set, validate_raw, RawCandidate, ValidationResult};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityResult {
    pub is_stable: bool,
    pub warnings: Vec<String>,
}

impl StabilityResult {
    fn from_warnings(warnings: Vec<String>) -> Self {
        Self {
            is_stable: warnings.is_empty(),
            warnings,
        }
    }
}

pub fn check_parameter_stability(map_type: &str, candidate: &Value) -> StabilityResult {
    check_raw_stability(map_type, RawCandidate::from_json(candidate))
}

pub fn check_raw_stability(map_type: &str, candidate: RawCandidate) -> StabilityResult {
    from_validation(validate_raw(map_type, candidate))
}

pub fn check_parameter_set_stability(set: &ParameterSet) -> StabilityResult {
    from_validation(validate_parameter_set(set))
}

fn from_validation(validation: ValidationResult) -> StabilityResult {
    match validation.parameters {
        Some(parameters) if validation.is_valid => {
            StabilityResult::from_warnings(stability_warnings(&parameters))
        }
        _ => StabilityResult {
            is_stable: false,
            warnings: validation.errors,
        },
    }
}

/// Range warnings followed by the coupled-parameter rules.
pub fn stability_warnings(parameters: &ParameterSet) -> Vec<String> {
    let mut warnings = Vec::new();

    for (key, range) in parameters.map_type().stable_ranges() {
        let Some(value) = parameters.get(key) else {
            continue;
        };
        if !range.contains(value) {
            warnings.push(format!(
                "{key} ({value}) is outside stable range [{}, {}]",
                range.min, range.max
            ));
        }
    }

    match parameters {
        ParameterSet::Newton(p) => {
            warnings.extend(ordering_warning("xMin", p.x_min, "xMax", p.x_max));
            warnings.extend(ordering_warning("yMin", p.y_min, "yMax", p.y_max));
        }
        ParameterSet::BifurcationLogistic(p) => {
            warnings.extend(ordering_warning("rMin", p.r_min, "rMax", p.r_max));
        }
        ParameterSet::BifurcationHenon(p) => {
            warnings.extend(ordering_warning("aMin", p.a_min, "aMax", p.a_max));
        }
        ParameterSet::Lyapunov(p) => {
            warnings.extend(ordering_warning("rMin", p.r_min, "rMax", p.r_max));
            if p.transient_iterations > p.iterations {
                warnings.push("transientIterations must be <= iterations".into());
            }
        }
        _ => {}
    }

    warnings
}

fn ordering_warning(lo: &str, lo_value: f64, hi: &str, hi_value: f64) -> Option<String> {
    (lo_value >= hi_value).then(|| format!("{lo} must be less than {hi}"))
}
