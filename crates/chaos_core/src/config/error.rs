use serde_json::{json, Value};
use thiserror::Error;

/// Longest string kept in a [`ConfigError::log_detail`] field.
pub const LOG_DETAIL_MAX_CHARS: usize = 2_000;

/// Failure of the HTTP transport behind a [`super::Fetcher`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request aborted")]
    Aborted,
    #[error("network error: {0}")]
    Network(String),
}

/// Every way loading a configuration can fail.
///
/// `Display` is the message shown to the user; [`ConfigError::code`] and
/// [`ConfigError::log_detail`] are for logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Configuration could not be decoded")]
    DecodeFailed { snippet: String },
    #[error("Configuration is too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("Configuration is too deeply nested (limit {limit})")]
    TooDeeplyNested { depth: usize, limit: usize },
    #[error("Configuration is not valid JSON")]
    MalformedJson { message: String, snippet: String },
    #[error("Invalid configuration parameters")]
    InvalidParameters { errors: Vec<String> },
    #[error("Failed to load configuration parameters")]
    LoadFailed,
    #[error("This shared configuration has expired")]
    Expired,
    #[error("Failed to load shared configuration (HTTP {0})")]
    HttpStatus(u16),
    #[error("Invalid shared configuration data")]
    InvalidSharedData,
    #[error("Request was aborted")]
    Aborted,
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::DecodeFailed { .. } => "decode_failed",
            ConfigError::TooLarge { .. } => "too_large",
            ConfigError::TooDeeplyNested { .. } => "too_deeply_nested",
            ConfigError::MalformedJson { .. } => "malformed_json",
            ConfigError::InvalidParameters { .. } => "invalid_parameters",
            ConfigError::LoadFailed => "load_failed",
            ConfigError::Expired => "expired",
            ConfigError::HttpStatus(_) => "http_status",
            ConfigError::InvalidSharedData => "invalid_shared_data",
            ConfigError::Aborted => "aborted",
        }
    }

    /// Validator messages, empty unless parameters failed validation.
    pub fn errors(&self) -> &[String] {
        match self {
            ConfigError::InvalidParameters { errors } => errors,
            _ => &[],
        }
    }

    /// Callers treat an aborted request as a no-op rather than an error.
    pub fn is_abort(&self) -> bool {
        matches!(self, ConfigError::Aborted)
    }

    /// Machine-oriented detail with every unbounded string cut to
    /// [`LOG_DETAIL_MAX_CHARS`].
    pub fn log_detail(&self) -> Value {
        let mut detail = json!({ "code": self.code(), "message": self.to_string() });
        let extra = match self {
            ConfigError::DecodeFailed { snippet } => json!({ "input": truncate(snippet) }),
            ConfigError::TooLarge { size, limit } => json!({ "size": size, "limit": limit }),
            ConfigError::TooDeeplyNested { depth, limit } => {
                json!({ "depth": depth, "limit": limit })
            }
            ConfigError::MalformedJson { message, snippet } => json!({
                "parseError": truncate(message),
                "input": truncate(snippet),
            }),
            ConfigError::InvalidParameters { errors } => json!({
                "errors": truncate(&errors.join("; ")),
            }),
            ConfigError::HttpStatus(status) => json!({ "status": status }),
            ConfigError::LoadFailed
            | ConfigError::Expired
            | ConfigError::InvalidSharedData
            | ConfigError::Aborted => Value::Null,
        };
        if let (Value::Object(fields), Value::Object(extra)) = (&mut detail, extra) {
            fields.extend(extra);
        }
        detail
    }
}

impl FetchError {
    pub fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}

/// Cuts `text` to at most [`LOG_DETAIL_MAX_CHARS`] characters, on a char
/// boundary.
pub(crate) fn truncate(text: &str) -> String {
    match text.char_indices().nth(LOG_DETAIL_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
