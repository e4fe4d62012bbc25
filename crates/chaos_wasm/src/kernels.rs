//! Kernel exports.

use crate::shared::{raw_candidate, to_js};
use chaos_core::kernels::{self, KernelOutput, KernelSettings, LorenzInput, RosslerInput};
use chaos_core::params::NewtonParameters;
use chaos_core::validation::validate_raw;
use js_sys::{Float64Array, Uint8ClampedArray};
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

fn settings_from_js(settings: JsValue) -> Result<KernelSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        Ok(KernelSettings::default())
    } else {
        Ok(from_value(settings)?)
    }
}

fn validated_output(
    map_type: &str,
    parameters: &JsValue,
    settings: JsValue,
) -> Result<KernelOutput, JsValue> {
    console_error_panic_hook::set_once();

    let validation = validate_raw(map_type, raw_candidate(parameters));
    let parameters = match validation.parameters {
        Some(parameters) if validation.is_valid => parameters,
        _ => return Err(JsValue::from_str(&validation.errors.join("; "))),
    };
    let settings = settings_from_js(settings)?;
    kernels::compute(&parameters, &settings).map_err(|e| JsValue::from_str(&format!("{}", e)))
}

/// Validates `parameters` for `map_type` and runs its kernel. The result is
/// `{ kind, data }`.
#[wasm_bindgen]
pub fn compute(map_type: &str, parameters: JsValue, settings: JsValue) -> Result<JsValue, JsValue> {
    to_js(&validated_output(map_type, &parameters, settings)?)
}

/// Flat `{ sigma, rho, beta, x0, y0, z0, steps, dt }` to `[{x, y, z}, ...]`.
#[wasm_bindgen(js_name = calculateLorenz)]
pub fn calculate_lorenz(input: JsValue) -> Result<JsValue, JsValue> {
    let input: LorenzInput = from_value(input)?;
    to_js(&kernels::calculate_lorenz(&input))
}

/// Flat `{ a, b, c, x0, y0, z0, steps, dt }` to `[{x, y, z}, ...]`.
#[wasm_bindgen(js_name = calculateRossler)]
pub fn calculate_rossler(input: JsValue) -> Result<JsValue, JsValue> {
    let input: RosslerInput = from_value(input)?;
    to_js(&kernels::calculate_rossler(&input))
}

/// RGBA pixels ready for `ImageData`.
#[wasm_bindgen(js_name = calculateNewton)]
pub fn calculate_newton(parameters: JsValue, width: u32, height: u32) -> Result<Uint8ClampedArray, JsValue> {
    if width == 0 || height == 0 {
        return Err(JsValue::from_str("Canvas must be at least 1x1."));
    }
    let parameters: NewtonParameters = from_value(parameters)?;
    let image = kernels::calculate_newton(&parameters, width as usize, height as usize);
    Ok(Uint8ClampedArray::from(image.pixels.as_slice()))
}

/// Interleaved `[x0, y0, x1, y1, ...]` for trajectory outputs, for callers
/// that upload straight into a vertex buffer.
#[wasm_bindgen(js_name = computePacked)]
pub fn compute_packed(map_type: &str, parameters: JsValue, settings: JsValue) -> Result<Float64Array, JsValue> {
    let output = validated_output(map_type, &parameters, settings)?;
    packed(&output)
        .map(|values| Float64Array::from(values.as_slice()))
        .ok_or_else(|| JsValue::from_str("Only trajectory outputs can be packed."))
}

fn packed(output: &KernelOutput) -> Option<Vec<f64>> {
    match output {
        KernelOutput::Trajectory2(points) => {
            Some(points.iter().flat_map(|p| [p.x, p.y]).collect())
        }
        KernelOutput::Trajectory3(points) => {
            Some(points.iter().flat_map(|p| [p.x, p.y, p.z]).collect())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_core::kernels::{Point2, Point3, SeriesPoint};

    #[test]
    fn trajectories_pack_interleaved() {
        let flat = packed(&KernelOutput::Trajectory2(vec![
            Point2 { x: 1.0, y: 2.0 },
            Point2 { x: 3.0, y: 4.0 },
        ]));
        assert_eq!(flat, Some(vec![1.0, 2.0, 3.0, 4.0]));

        let flat = packed(&KernelOutput::Trajectory3(vec![Point3 {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        }]));
        assert_eq!(flat, Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn series_do_not_pack() {
        let series = KernelOutput::Series(vec![SeriesPoint { x: 0.0, value: 0.5 }]);
        assert_eq!(packed(&series), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use js_sys::{Object, Reflect};
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn nan_parameters_are_rejected_before_computing() {
        let parameters = Object::new();
        Reflect::set(&parameters, &"a".into(), &JsValue::from_f64(f64::NAN)).unwrap();
        Reflect::set(&parameters, &"b".into(), &0.3.into()).unwrap();
        Reflect::set(&parameters, &"iterations".into(), &100.0.into()).unwrap();
        let err = compute("henon", parameters.into(), JsValue::UNDEFINED).unwrap_err();
        assert!(err.as_string().unwrap().contains("Parameter 'a' must be a valid number"));
    }

    fn henon(iterations: f64) -> JsValue {
        let parameters = Object::new();
        Reflect::set(&parameters, &"a".into(), &1.4.into()).unwrap();
        Reflect::set(&parameters, &"b".into(), &0.3.into()).unwrap();
        Reflect::set(&parameters, &"iterations".into(), &iterations.into()).unwrap();
        parameters.into()
    }

    #[wasm_bindgen_test]
    fn packed_and_structured_outputs_share_validation() {
        let packed = compute_packed("henon", henon(10.0), JsValue::UNDEFINED).unwrap();
        assert_eq!(packed.length(), 20);
        let err = compute_packed("lozi", henon(10.0), JsValue::UNDEFINED).unwrap_err();
        assert!(err.as_string().unwrap().contains("Missing required parameters: x0, y0"));
    }
}
