//! Structural validation of untrusted parameter input.
//!
//! Input arrives as a loosely typed object (URL payloads, saved records, JS
//! objects through the bridge). It is first flattened into a [`RawCandidate`]
//! so the same checks apply regardless of where it came from.

use crate::params::ParameterSet;
use crate::schema::MapType;
use serde::Serialize;
use serde_json::{Map, Value};

/// Deprecated spelling of the standard map's kick strength.
const LEGACY_STANDARD_KEY: &str = "K";
const TYPE_KEY: &str = "type";

/// A single untyped value, described the way a JavaScript `typeof` would see it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Other(&'static str),
}

impl RawValue {
    fn runtime_type(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::Other(name) => name,
        }
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            // serde_json cannot hold NaN/Infinity; those only reach us through
            // typed sets or the wasm bridge.
            Value::Number(n) => n.as_f64().map_or(RawValue::Other("number"), RawValue::Number),
            Value::String(_) => RawValue::Other("string"),
            Value::Bool(_) => RawValue::Other("boolean"),
            Value::Null | Value::Array(_) | Value::Object(_) => RawValue::Other("object"),
        }
    }
}

/// Candidate parameters before any schema knowledge is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCandidate {
    NotObject,
    Object(Vec<(String, RawValue)>),
}

impl RawCandidate {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => RawCandidate::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), RawValue::from(value)))
                    .collect(),
            ),
            _ => RawCandidate::NotObject,
        }
    }
}

impl From<&ParameterSet> for RawCandidate {
    fn from(set: &ParameterSet) -> Self {
        RawCandidate::Object(
            set.entries()
                .into_iter()
                .map(|(key, value)| (key.to_string(), RawValue::Number(value)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterSet>,
}

impl ValidationResult {
    fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            parameters: None,
        }
    }
}

/// Validates a JSON candidate against the schema of `map_type`.
pub fn validate_parameters(map_type: &str, candidate: &Value) -> ValidationResult {
    validate_raw(map_type, RawCandidate::from_json(candidate))
}

/// Re-validates a typed set; catches NaN/Infinity that typed code can construct.
pub fn validate_parameter_set(set: &ParameterSet) -> ValidationResult {
    validate_raw(set.map_type().as_str(), RawCandidate::from(set))
}

pub fn validate_raw(map_type: &str, candidate: RawCandidate) -> ValidationResult {
    let RawCandidate::Object(entries) = candidate else {
        return ValidationResult::invalid(vec!["Parameters must be an object".into()]);
    };
    let map_type = match map_type.parse::<MapType>() {
        Ok(map_type) => map_type,
        Err(err) => return ValidationResult::invalid(vec![err.to_string()]),
    };

    let (entries, renamed_kick) = if map_type == MapType::Standard {
        normalize_legacy_kick(entries)
    } else {
        (entries, false)
    };

    let schema = map_type.keys();
    let mut errors = Vec::new();

    let missing: Vec<&str> = schema
        .iter()
        .copied()
        .filter(|key| !entries.iter().any(|(name, _)| name == key))
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing required parameters: {}", missing.join(", ")));
    }

    let extra: Vec<&str> = entries
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| *name != TYPE_KEY && !schema.contains(name))
        .collect();
    if !extra.is_empty() {
        errors.push(format!("Unexpected parameters: {}", extra.join(", ")));
    }

    for (key, value) in &entries {
        if key == TYPE_KEY {
            continue;
        }
        let finite = matches!(value, RawValue::Number(n) if n.is_finite());
        if !finite {
            let sent = if renamed_kick && key == "k" {
                LEGACY_STANDARD_KEY
            } else {
                key.as_str()
            };
            errors.push(format!(
                "Parameter '{sent}' must be a valid number, got: {}",
                value.runtime_type()
            ));
        }
    }

    if !errors.is_empty() {
        return ValidationResult::invalid(errors);
    }

    let mut normalized = Map::new();
    for (key, value) in entries {
        if let RawValue::Number(n) = value {
            if key != TYPE_KEY {
                normalized.insert(key, Value::from(n));
            }
        }
    }
    match ParameterSet::from_validated(map_type, &normalized) {
        Ok(parameters) => ValidationResult {
            is_valid: true,
            errors,
            parameters: Some(parameters),
        },
        Err(err) => ValidationResult::invalid(vec![format!("Invalid parameters: {err}")]),
    }
}

/// Rewrites the legacy `K` key to `k`. An explicit `k` always wins and `K` is
/// never carried forward. The flag is set when `k` came from `K`.
fn normalize_legacy_kick(entries: Vec<(String, RawValue)>) -> (Vec<(String, RawValue)>, bool) {
    let has_lower = entries.iter().any(|(name, _)| name == "k");
    let has_legacy = entries.iter().any(|(name, _)| name == LEGACY_STANDARD_KEY);
    let entries = entries
        .into_iter()
        .filter_map(|(name, value)| {
            if name != LEGACY_STANDARD_KEY {
                Some((name, value))
            } else if has_lower {
                None
            } else {
                Some(("k".to_string(), value))
            }
        })
        .collect();
    (entries, has_legacy && !has_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{default_parameters, LorenzParameters};
    use serde_json::json;

    fn errors_mention(result: &ValidationResult, needle: &str) -> bool {
        result.errors.iter().any(|err| err.contains(needle))
    }

    #[test]
    fn accepts_lorenz_with_type_tag() {
        let result = validate_parameters(
            "lorenz",
            &json!({"type": "lorenz", "sigma": 10, "rho": 28, "beta": 2.667}),
        );
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.parameters,
            Some(ParameterSet::Lorenz(LorenzParameters {
                sigma: 10.0,
                rho: 28.0,
                beta: 2.667
            }))
        );
    }

    #[test]
    fn defaults_validate_and_revalidation_is_idempotent() {
        for map_type in MapType::ALL {
            let defaults = default_parameters(map_type);
            let json = serde_json::to_value(defaults).expect("serialize");
            let first = validate_parameters(map_type.as_str(), &json);
            assert!(first.is_valid, "{map_type}: {:?}", first.errors);
            let normalized = first.parameters.expect("parameters on success");
            assert_eq!(normalized, defaults);

            let again = validate_parameters(
                map_type.as_str(),
                &serde_json::to_value(normalized).expect("serialize"),
            );
            assert_eq!(again, first);
            assert_eq!(validate_parameter_set(&normalized), first);
        }
    }

    #[test]
    fn rejects_non_objects() {
        for candidate in [json!(null), json!([1, 2]), json!("lorenz"), json!(4)] {
            let result = validate_parameters("lorenz", &candidate);
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec!["Parameters must be an object"]);
        }
    }

    #[test]
    fn unknown_map_type_short_circuits() {
        let result = validate_parameters("julia", &json!({"c": "x"}));
        assert_eq!(result.errors, vec!["Unknown map type: julia"]);
        assert!(result.parameters.is_none());
    }

    #[test]
    fn legacy_kick_alias_is_normalized() {
        let result = validate_parameters(
            "standard",
            &json!({"K": 1, "numP": 1, "numQ": 1, "iterations": 1}),
        );
        assert!(result.is_valid, "{:?}", result.errors);
        let parameters = result.parameters.expect("parameters");
        assert_eq!(parameters.get("k"), Some(1.0));
        let json = serde_json::to_value(parameters).expect("serialize");
        assert!(json.get("K").is_none());
    }

    #[test]
    fn existing_k_wins_over_legacy_alias() {
        let result = validate_parameters(
            "standard",
            &json!({"K": 5, "k": 2, "numP": 1, "numQ": 1, "iterations": 1}),
        );
        assert!(result.is_valid);
        assert_eq!(result.parameters.and_then(|p| p.get("k")), Some(2.0));
    }

    #[test]
    fn bad_legacy_kick_is_reported_under_its_own_name() {
        let result = validate_parameters(
            "standard",
            &json!({"K": "strong", "numP": 1, "numQ": 1, "iterations": 1}),
        );
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Parameter 'K' must be a valid number, got: string"]
        );
    }

    #[test]
    fn legacy_alias_only_applies_to_standard() {
        let result = validate_parameters(
            "henon",
            &json!({"a": 1.4, "b": 0.3, "iterations": 10, "K": 1}),
        );
        assert!(!result.is_valid);
        assert!(errors_mention(&result, "Unexpected parameters: K"));
    }

    #[test]
    fn removing_any_required_key_is_reported() {
        for map_type in MapType::ALL {
            let full = default_parameters(map_type).to_untagged_json();
            for key in map_type.keys() {
                let mut candidate = full.clone();
                candidate.remove(*key);
                let result = validate_parameters(map_type.as_str(), &Value::Object(candidate));
                assert!(!result.is_valid, "{map_type} without {key}");
                assert!(errors_mention(&result, key), "{map_type}: {:?}", result.errors);
                assert!(errors_mention(&result, "Missing required parameters"));
            }
        }
    }

    #[test]
    fn adding_an_unexpected_key_is_reported() {
        for map_type in MapType::ALL {
            let mut candidate = default_parameters(map_type).to_untagged_json();
            candidate.insert("zoom".into(), json!(2));
            let result = validate_parameters(map_type.as_str(), &Value::Object(candidate));
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec!["Unexpected parameters: zoom"]);
        }
    }

    #[test]
    fn missing_keys_are_listed_in_schema_order() {
        let result = validate_parameters("lorenz", &json!({"type": "lorenz", "sigma": 10}));
        assert_eq!(result.errors, vec!["Missing required parameters: rho, beta"]);
    }

    #[test]
    fn non_numeric_values_name_their_runtime_type() {
        let result = validate_parameters(
            "rossler",
            &json!({"a": "0.2", "b": true, "c": null, "d": [1]}),
        );
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Unexpected parameters: d",
                "Parameter 'a' must be a valid number, got: string",
                "Parameter 'b' must be a valid number, got: boolean",
                "Parameter 'c' must be a valid number, got: object",
                "Parameter 'd' must be a valid number, got: object",
            ]
        );
    }

    #[test]
    fn nan_and_infinity_are_rejected() {
        let nan = ParameterSet::Lorenz(LorenzParameters {
            sigma: f64::NAN,
            rho: 28.0,
            beta: 8.0 / 3.0,
        });
        let result = validate_parameter_set(&nan);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Parameter 'sigma' must be a valid number, got: number"]
        );

        let raw = RawCandidate::Object(vec![
            ("r".into(), RawValue::Number(3.9)),
            ("x0".into(), RawValue::Number(f64::INFINITY)),
            ("iterations".into(), RawValue::Number(10.0)),
        ]);
        let result = validate_raw("logistic", raw);
        assert!(!result.is_valid);
        assert!(errors_mention(&result, "'x0'"));
    }

    #[test]
    fn all_errors_are_accumulated() {
        let result = validate_parameters("henon", &json!({"a": "x", "zoom": 1}));
        assert_eq!(result.errors.len(), 3);
        assert!(errors_mention(&result, "Missing required parameters: b, iterations"));
        assert!(errors_mention(&result, "Unexpected parameters: zoom"));
    }

    #[test]
    fn serializes_with_camel_case_flag() {
        let result = validate_parameters("lorenz", &json!({}));
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["isValid"], false);
        assert!(json.get("parameters").is_none());
    }
}
