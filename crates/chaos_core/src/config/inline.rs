//! The `config` query value: percent-encoded JSON for the route's map type.

use super::error::ConfigError;
use crate::params::ParameterSet;
use crate::stability::stability_warnings;
use crate::validation::validate_parameters;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Longest input echoed back in a decode or parse error.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserLimits {
    /// Upper bound on the decoded length in bytes.
    pub max_bytes: usize,
    /// Upper bound on `{`/`[` nesting outside string literals.
    pub max_depth: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024,
            max_depth: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedConfig {
    pub parameters: ParameterSet,
    /// Stability advice for the accepted parameters; empty when stable.
    pub warnings: Vec<String>,
}

pub fn parse_config_param(map_type: &str, config_param: &str) -> Result<ParsedConfig, ConfigError> {
    parse_config_param_with(map_type, config_param, &ParserLimits::default())
}

pub fn parse_config_param_with(
    map_type: &str,
    config_param: &str,
    limits: &ParserLimits,
) -> Result<ParsedConfig, ConfigError> {
    parse(map_type, config_param, limits).map_err(|err| {
        warn!(
            map_type,
            code = err.code(),
            detail = %err.log_detail(),
            "rejected inline configuration"
        );
        err
    })
}

fn parse(map_type: &str, config_param: &str, limits: &ParserLimits) -> Result<ParsedConfig, ConfigError> {
    let decoded = decode_uri_component(config_param)?;
    if decoded.len() > limits.max_bytes {
        return Err(ConfigError::TooLarge {
            size: decoded.len(),
            limit: limits.max_bytes,
        });
    }
    if let Some(depth) = exceeds_depth(&decoded, limits.max_depth) {
        return Err(ConfigError::TooDeeplyNested {
            depth,
            limit: limits.max_depth,
        });
    }
    let candidate: Value =
        serde_json::from_str(&decoded).map_err(|err| ConfigError::MalformedJson {
            message: err.to_string(),
            snippet: snippet(&decoded),
        })?;

    let result = validate_parameters(map_type, &candidate);
    match result.parameters {
        Some(parameters) if result.is_valid => Ok(ParsedConfig {
            warnings: stability_warnings(&parameters),
            parameters,
        }),
        _ => Err(ConfigError::InvalidParameters {
            errors: result.errors,
        }),
    }
}

/// Percent-decoding that rejects what `decodeURIComponent` rejects: a `%`
/// not followed by two hex digits, or bytes that are not UTF-8.
pub(crate) fn decode_uri_component(input: &str) -> Result<String, ConfigError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(ConfigError::DecodeFailed {
                    snippet: snippet(input),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    percent_decode_str(input)
        .decode_utf8()
        .map(|text| text.into_owned())
        .map_err(|_| ConfigError::DecodeFailed {
            snippet: snippet(input),
        })
}

/// Returns the first depth above `limit`, scanning brackets outside string
/// literals only.
fn exceeds_depth(text: &str, limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Some(depth);
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
