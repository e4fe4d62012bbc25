//! Configuration loading exports.
//!
//! Results cross the boundary as `{ ok: true, ... }` or
//! `{ ok: false, error, code, errors }` and never as exceptions; the one
//! exception is an abort, which is rethrown as an `AbortError` so callers can
//! ignore it the way they ignore an aborted `fetch`.

use crate::shared::to_js;
use chaos_core::config::{
    self as core_config, ConfigError, FetchError, FetchResponse, Fetcher, LoadRequest,
    SessionCache,
};
use chaos_core::params::ParameterSet;
use chaos_core::schema::MapType;
use js_sys::{Function, Reflect};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Payload<T: Serialize> {
    Ok {
        ok: bool,
        #[serde(flatten)]
        value: T,
    },
    Err {
        ok: bool,
        error: String,
        code: &'static str,
        errors: Vec<String>,
    },
}

fn payload<T: Serialize>(result: Result<T, ConfigError>) -> Payload<T> {
    match result {
        Ok(value) => Payload::Ok { ok: true, value },
        Err(err) => Payload::Err {
            ok: false,
            code: err.code(),
            errors: err.errors().to_vec(),
            error: err.to_string(),
        },
    }
}

fn finish<T: Serialize>(result: Result<T, ConfigError>) -> Result<JsValue, JsValue> {
    if matches!(result, Err(ConfigError::Aborted)) {
        debug!("configuration load aborted");
        let abort = js_sys::Error::new("The operation was aborted.");
        abort.set_name("AbortError");
        return Err(abort.into());
    }
    to_js(&payload(result))
}

/// Calls a synchronous JS `fetch(url) -> { status, body }`. A thrown error
/// named `AbortError` is an abort; anything else is a network failure.
struct JsFetcher<'a> {
    fetch: &'a Function,
}

impl Fetcher for JsFetcher<'_> {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .fetch
            .call1(&JsValue::NULL, &JsValue::from_str(url))
            .map_err(|err| {
                let name = Reflect::get(&err, &"name".into())
                    .ok()
                    .and_then(|name| name.as_string());
                if name.as_deref() == Some("AbortError") {
                    FetchError::Aborted
                } else {
                    FetchError::Network(format!("{:?}", err))
                }
            })?;
        let status = Reflect::get(&response, &"status".into())
            .ok()
            .and_then(|status| status.as_f64())
            .ok_or_else(|| FetchError::Network("response has no status".into()))?;
        let body = Reflect::get(&response, &"body".into())
            .ok()
            .and_then(|body| body.as_string())
            .unwrap_or_default();
        Ok(FetchResponse {
            status: status as u16,
            body,
        })
    }
}

/// Adapts any object with `getItem`/`removeItem`, such as `sessionStorage`.
struct JsSessionCache<'a> {
    storage: &'a JsValue,
}

impl JsSessionCache<'_> {
    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(self.storage, &name.into())
            .ok()
            .and_then(|method| method.dyn_into::<Function>().ok())
    }
}

impl SessionCache for JsSessionCache<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.method("getItem")?
            .call1(self.storage, &key.into())
            .ok()?
            .as_string()
    }

    fn remove(&mut self, key: &str) {
        let Some(remove) = self.method("removeItem") else {
            warn!(key, "session storage has no removeItem; cached configuration kept");
            return;
        };
        if let Err(err) = remove.call1(self.storage, &key.into()) {
            warn!(key, error = ?err, "failed to remove cached configuration");
        }
    }
}

#[derive(Serialize)]
struct Parsed {
    parameters: ParameterSet,
    warnings: Vec<String>,
}

#[wasm_bindgen(js_name = parseConfigParam)]
pub fn parse_config_param(map_type: &str, config_param: &str) -> Result<JsValue, JsValue> {
    finish(
        core_config::parse_config_param(map_type, config_param).map(|parsed| Parsed {
            parameters: parsed.parameters,
            warnings: parsed.warnings,
        }),
    )
}

#[wasm_bindgen(js_name = loadSavedConfigParameters)]
pub fn load_saved_config_parameters(
    config_id: &str,
    map_type: &str,
    base: &str,
    fetch: &Function,
    storage: &JsValue,
) -> Result<JsValue, JsValue> {
    let request = LoadRequest {
        key: config_id,
        map_type,
        base,
        cancel: None,
    };
    let mut cache = JsSessionCache { storage };
    finish(core_config::load_saved_config_parameters(
        &request,
        &JsFetcher { fetch },
        &mut cache,
    ))
}

#[wasm_bindgen(js_name = loadSharedConfigParameters)]
pub fn load_shared_config_parameters(
    share_code: &str,
    map_type: &str,
    base: &str,
    fetch: &Function,
) -> Result<JsValue, JsValue> {
    let request = LoadRequest {
        key: share_code,
        map_type,
        base,
        cancel: None,
    };
    finish(core_config::load_shared_config_parameters(
        &request,
        &JsFetcher { fetch },
    ))
}

/// `compare=true&left=..&right=..` for two tagged parameter objects.
#[wasm_bindgen(js_name = encodeComparison)]
pub fn encode_comparison(left: JsValue, right: JsValue) -> Result<String, JsValue> {
    let left: ParameterSet = serde_wasm_bindgen::from_value(left)?;
    let right: ParameterSet = serde_wasm_bindgen::from_value(right)?;
    Ok(core_config::encode_comparison(&left, &right))
}

/// `{ left, right }`, each falling back to the defaults when unusable.
#[wasm_bindgen(js_name = decodeComparison)]
pub fn decode_comparison(
    map_type: &str,
    left: Option<String>,
    right: Option<String>,
) -> Result<JsValue, JsValue> {
    let map_type: MapType = map_type
        .parse()
        .map_err(|e: chaos_core::schema::UnknownMapType| JsValue::from_str(&e.to_string()))?;
    to_js(&core_config::decode_comparison(
        map_type,
        left.as_deref(),
        right.as_deref(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_carry_code_and_validator_errors() {
        let result: Result<Parsed, ConfigError> = Err(ConfigError::InvalidParameters {
            errors: vec!["Missing required parameters: rho, beta".into()],
        });
        let json = serde_json::to_value(payload(result)).expect("serialize");
        assert_eq!(json["ok"], false);
        assert_eq!(json["code"], "invalid_parameters");
        assert_eq!(json["errors"][0], "Missing required parameters: rho, beta");
    }

    #[test]
    fn successes_flatten_the_value() {
        let parsed = Parsed {
            parameters: chaos_core::default_parameters(MapType::Henon),
            warnings: Vec::new(),
        };
        let json = serde_json::to_value(payload(Ok::<_, ConfigError>(parsed))).expect("serialize");
        assert_eq!(json["ok"], true);
        assert_eq!(json["parameters"]["type"], "henon");
        assert!(json["warnings"].as_array().expect("array").is_empty());
    }
}
