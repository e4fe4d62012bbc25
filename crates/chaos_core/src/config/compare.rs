//! Side-by-side comparison links: `compare=true&left=<b64>&right=<b64>`.
//!
//! Each side is the parameter set's JSON without its `type` tag, base64 of
//! the UTF-8 bytes, percent-encoded for the query string. The map type comes
//! from the route, never from the payload.

use super::URI_COMPONENT;
use crate::params::{default_parameters, ParameterSet};
use crate::schema::MapType;
use crate::validation::validate_parameters;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: ParameterSet,
    pub right: ParameterSet,
}

impl Comparison {
    /// Reads a query string (with or without the leading `?`). Returns `None`
    /// unless `compare=true` is present.
    pub fn from_query(map_type: MapType, query: &str) -> Option<Self> {
        let mut compare = false;
        let mut left = None;
        let mut right = None;
        for pair in query.trim_start_matches('?').split('&') {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            match name {
                "compare" => compare = value == "true",
                "left" => left = Some(value),
                "right" => right = Some(value),
                _ => {}
            }
        }
        compare.then(|| decode_comparison(map_type, left, right))
    }
}

pub fn encode_comparison(left: &ParameterSet, right: &ParameterSet) -> String {
    format!(
        "compare=true&left={}&right={}",
        encode_side(left),
        encode_side(right)
    )
}

fn encode_side(parameters: &ParameterSet) -> String {
    let json = Value::Object(parameters.to_untagged_json()).to_string();
    let encoded = STANDARD.encode(json.as_bytes());
    utf8_percent_encode(&encoded, URI_COMPONENT).to_string()
}

/// Decodes both sides, replacing any side that is absent or does not decode
/// to a valid set for `map_type` with the built-in defaults.
pub fn decode_comparison(map_type: MapType, left: Option<&str>, right: Option<&str>) -> Comparison {
    Comparison {
        left: decode_side(map_type, "left", left),
        right: decode_side(map_type, "right", right),
    }
}

fn decode_side(map_type: MapType, side: &str, value: Option<&str>) -> ParameterSet {
    match value.and_then(|value| try_decode_side(map_type, value)) {
        Some(parameters) => parameters,
        None => {
            info!(map_type = %map_type, side, "comparison side unusable, using defaults");
            default_parameters(map_type)
        }
    }
}

fn try_decode_side(map_type: MapType, value: &str) -> Option<ParameterSet> {
    let unescaped = percent_decode_str(value).decode_utf8().ok()?;
    // Form decoding turns `+` into a space.
    let base64_text = unescaped.replace(' ', "+");
    let bytes = STANDARD.decode(base64_text.as_bytes()).ok()?;
    let json = String::from_utf8(bytes).ok()?;
    let candidate: Value = serde_json::from_str(&json).ok()?;
    let result = validate_parameters(map_type.as_str(), &candidate);
    result.parameters.filter(|_| result.is_valid)
}
