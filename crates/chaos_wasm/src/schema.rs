//! Schema, validation and stability exports.

use crate::shared::{raw_candidate, to_js};
use chaos_core::params::default_parameters as core_default_parameters;
use chaos_core::schema::{self, MapType};
use chaos_core::stability::check_raw_stability;
use chaos_core::validation::validate_raw;
use wasm_bindgen::prelude::*;

/// `{ isValid, errors, parameters? }` for a JS candidate object.
#[wasm_bindgen(js_name = validateParameters)]
pub fn validate_parameters(map_type: &str, candidate: JsValue) -> Result<JsValue, JsValue> {
    to_js(&validate_raw(map_type, raw_candidate(&candidate)))
}

/// `{ isStable, warnings }` for a JS candidate object.
#[wasm_bindgen(js_name = checkParameterStability)]
pub fn check_parameter_stability(map_type: &str, candidate: JsValue) -> Result<JsValue, JsValue> {
    to_js(&check_raw_stability(map_type, raw_candidate(&candidate)))
}

/// `{ key: {min, max} }`, or `undefined` for an unknown map type.
#[wasm_bindgen(js_name = getStableRanges)]
pub fn get_stable_ranges(map_type: &str) -> Result<JsValue, JsValue> {
    match schema::get_stable_ranges(map_type) {
        Some(ranges) => to_js(&ranges),
        None => Ok(JsValue::UNDEFINED),
    }
}

#[wasm_bindgen(js_name = isValidMapType)]
pub fn is_valid_map_type(candidate: &str) -> bool {
    schema::is_valid_map_type(candidate)
}

/// Built-in parameters, tagged with `type`.
#[wasm_bindgen(js_name = defaultParameters)]
pub fn default_parameters(map_type: &str) -> Result<JsValue, JsValue> {
    let map_type: MapType = map_type
        .parse()
        .map_err(|e: schema::UnknownMapType| JsValue::from_str(&e.to_string()))?;
    to_js(&core_default_parameters(map_type))
}

#[wasm_bindgen(js_name = mapTypes)]
pub fn map_types() -> Vec<String> {
    MapType::ALL.iter().map(|t| t.as_str().to_string()).collect()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use js_sys::Reflect;
    use wasm_bindgen_test::*;

    fn number(object: &JsValue, key: &str) -> f64 {
        Reflect::get(object, &key.into()).unwrap().as_f64().unwrap()
    }

    #[wasm_bindgen_test]
    fn stable_ranges_are_plain_objects() {
        let ranges = get_stable_ranges("lozi").unwrap();
        let a = Reflect::get(&ranges, &"a".into()).unwrap();
        assert_eq!(number(&a, "max"), 2.0);
        assert!(get_stable_ranges("nope").unwrap().is_undefined());
    }

    #[wasm_bindgen_test]
    fn defaults_validate() {
        let defaults = default_parameters("lorenz").unwrap();
        let result = validate_parameters("lorenz", defaults).unwrap();
        assert_eq!(
            Reflect::get(&result, &"isValid".into()).unwrap().as_bool(),
            Some(true)
        );
    }
}
