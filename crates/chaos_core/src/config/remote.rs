//! Saved and shared configurations fetched from the application's API.
//!
//! Transport and session storage are collaborators behind [`Fetcher`] and
//! [`SessionCache`]; the browser bridge supplies JS-backed implementations.

use super::error::{ConfigError, FetchError};
use super::URI_COMPONENT;
use crate::delegate::CancellationToken;
use crate::params::ParameterSet;
use crate::stability::stability_warnings;
use crate::validation::validate_parameters;
use percent_encoding::utf8_percent_encode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const SAVED_CONFIG_PATH: &str = "api/saved-config";
const SHARED_CONFIG_PATH: &str = "api/shared";
const SAVED_CONFIG_CACHE_PREFIX: &str = "saved-config:";
const HTTP_GONE: u16 = 410;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking `GET` of a URL.
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Per-tab key/value storage used to hand a configuration to a newly opened
/// page.
pub trait SessionCache {
    fn get(&self, key: &str) -> Option<String>;
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionCache {
    entries: HashMap<String, String>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionCache for MemorySessionCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Persisted payload: `{ "mapType": ..., "parameters": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    #[serde(default)]
    pub map_type: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
}

impl ConfigRecord {
    pub fn new(parameters: &ParameterSet) -> Self {
        Self {
            map_type: Some(parameters.map_type().as_str().to_string()),
            parameters: Some(Value::Object(parameters.to_untagged_json())),
        }
    }

    /// The parameters, if the record belongs to `map_type`.
    fn parameters_for(self, map_type: &str) -> Option<Value> {
        if self.map_type.as_deref() == Some(map_type) {
            self.parameters
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSource {
    Api,
    SessionCache,
    Share,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedConfig {
    pub parameters: ParameterSet,
    pub source: ConfigSource,
    pub warnings: Vec<String>,
}

/// What to load and from where. `key` is the saved-config id or share code.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    pub key: &'a str,
    pub map_type: &'a str,
    pub base: &'a str,
    pub cancel: Option<&'a CancellationToken>,
}

impl LoadRequest<'_> {
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base.trim_end_matches('/'),
            path,
            utf8_percent_encode(self.key, URI_COMPONENT)
        )
    }

    fn check_cancelled(&self) -> Result<(), ConfigError> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(ConfigError::Aborted),
            _ => Ok(()),
        }
    }
}

/// Loads a saved configuration by id, falling back to the session cache entry
/// `saved-config:<id>` when the API cannot provide a matching record. The
/// cache entry is removed once it has been read.
pub fn load_saved_config_parameters(
    request: &LoadRequest<'_>,
    fetcher: &impl Fetcher,
    cache: &mut impl SessionCache,
) -> Result<LoadedConfig, ConfigError> {
    load_saved(request, fetcher, cache).map_err(|err| log_failure(request, "saved", err))
}

fn load_saved(
    request: &LoadRequest<'_>,
    fetcher: &impl Fetcher,
    cache: &mut impl SessionCache,
) -> Result<LoadedConfig, ConfigError> {
    request.check_cancelled()?;
    let url = request.url(SAVED_CONFIG_PATH);
    let from_api = match fetcher.get(&url) {
        Err(FetchError::Aborted) => return Err(ConfigError::Aborted),
        Err(FetchError::Network(message)) => {
            debug!(%url, %message, "saved configuration fetch failed");
            None
        }
        Ok(response) if !response.is_ok() => {
            debug!(%url, status = response.status, "saved configuration fetch returned an error status");
            None
        }
        Ok(response) => serde_json::from_str::<ConfigRecord>(&response.body)
            .ok()
            .and_then(|record| record.parameters_for(request.map_type)),
    };
    request.check_cancelled()?;

    let (candidate, source) = match from_api {
        Some(candidate) => (candidate, ConfigSource::Api),
        None => {
            let cache_key = format!("{SAVED_CONFIG_CACHE_PREFIX}{}", request.key);
            let cached = cache.get(&cache_key).ok_or(ConfigError::LoadFailed)?;
            cache.remove(&cache_key);
            info!(key = %cache_key, "using session cache for saved configuration");
            let candidate = serde_json::from_str::<ConfigRecord>(&cached)
                .ok()
                .and_then(|record| record.parameters_for(request.map_type))
                .ok_or(ConfigError::LoadFailed)?;
            (candidate, ConfigSource::SessionCache)
        }
    };
    accept(request.map_type, &candidate, source)
}

/// Loads a shared configuration by short code. A `410 Gone` means the share
/// has expired.
pub fn load_shared_config_parameters(
    request: &LoadRequest<'_>,
    fetcher: &impl Fetcher,
) -> Result<LoadedConfig, ConfigError> {
    load_shared(request, fetcher).map_err(|err| log_failure(request, "shared", err))
}

fn load_shared(request: &LoadRequest<'_>, fetcher: &impl Fetcher) -> Result<LoadedConfig, ConfigError> {
    request.check_cancelled()?;
    let response = match fetcher.get(&request.url(SHARED_CONFIG_PATH)) {
        Ok(response) => response,
        Err(FetchError::Aborted) => return Err(ConfigError::Aborted),
        Err(FetchError::Network(_)) => return Err(ConfigError::LoadFailed),
    };
    request.check_cancelled()?;

    if response.status == HTTP_GONE {
        return Err(ConfigError::Expired);
    }
    if !response.is_ok() {
        return Err(ConfigError::HttpStatus(response.status));
    }
    let candidate = serde_json::from_str::<ConfigRecord>(&response.body)
        .ok()
        .and_then(|record| record.parameters_for(request.map_type))
        .ok_or(ConfigError::InvalidSharedData)?;
    accept(request.map_type, &candidate, ConfigSource::Share)
}

fn accept(map_type: &str, candidate: &Value, source: ConfigSource) -> Result<LoadedConfig, ConfigError> {
    let result = validate_parameters(map_type, candidate);
    match result.parameters {
        Some(parameters) if result.is_valid => Ok(LoadedConfig {
            warnings: stability_warnings(&parameters),
            parameters,
            source,
        }),
        _ => Err(ConfigError::InvalidParameters {
            errors: result.errors,
        }),
    }
}

fn log_failure(request: &LoadRequest<'_>, kind: &str, err: ConfigError) -> ConfigError {
    if !err.is_abort() {
        warn!(
            kind,
            map_type = request.map_type,
            code = err.code(),
            detail = %err.log_detail(),
            "failed to load configuration"
        );
    }
    err
}
