//! Conversions between JS values and core types.

use chaos_core::validation::{RawCandidate, RawValue};
use js_sys::{Array, Object};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Serializes maps as plain objects so JS callers can index them by key.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Name a JS `typeof` reports, as a static string.
pub(crate) fn type_name(reported: &str) -> &'static str {
    match reported {
        "number" => "number",
        "string" => "string",
        "boolean" => "boolean",
        "undefined" => "undefined",
        "function" => "function",
        "symbol" => "symbol",
        "bigint" => "bigint",
        _ => "object",
    }
}

fn raw_value(value: &JsValue) -> RawValue {
    match value.as_f64() {
        // NaN and ±Infinity stay numbers here; the validator rejects them.
        Some(number) => RawValue::Number(number),
        None => RawValue::Other(type_name(
            &value.js_typeof().as_string().unwrap_or_default(),
        )),
    }
}

/// Reads a JS candidate without going through JSON, so `NaN` survives to the
/// validator.
pub(crate) fn raw_candidate(value: &JsValue) -> RawCandidate {
    if !value.is_object() || Array::is_array(value) {
        return RawCandidate::NotObject;
    }
    let entries = Object::entries(value.unchecked_ref::<Object>());
    RawCandidate::Object(
        entries
            .iter()
            .filter_map(|entry| {
                let pair: Array = entry.unchecked_into();
                let key = pair.get(0).as_string()?;
                Some((key, raw_value(&pair.get(1))))
            })
            .collect(),
    )
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use js_sys::Reflect;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn nan_is_read_as_a_number() {
        let object = Object::new();
        Reflect::set(&object, &"sigma".into(), &JsValue::from_f64(f64::NAN)).unwrap();
        Reflect::set(&object, &"rho".into(), &"28".into()).unwrap();
        match raw_candidate(&object.into()) {
            RawCandidate::Object(entries) => {
                assert!(matches!(entries[0].1, RawValue::Number(n) if n.is_nan()));
                assert_eq!(entries[1].1, RawValue::Other("string"));
            }
            RawCandidate::NotObject => panic!("object expected"),
        }
    }

    #[wasm_bindgen_test]
    fn arrays_and_null_are_not_objects() {
        assert_eq!(raw_candidate(&Array::new().into()), RawCandidate::NotObject);
        assert_eq!(raw_candidate(&JsValue::NULL), RawCandidate::NotObject);
    }
}
