//! Loading parameter sets from outside the process: the inline `config`
//! query value, saved and shared records fetched over HTTP, and the
//! two-sided comparison links.
//!
//! Every entry point returns `Result<_, ConfigError>` and logs failures with
//! a bounded detail object.

pub mod compare;
pub mod error;
pub mod inline;
pub mod remote;

pub use compare::{decode_comparison, encode_comparison, Comparison};
pub use error::{ConfigError, FetchError};
pub use inline::{parse_config_param, parse_config_param_with, ParsedConfig, ParserLimits};
pub use remote::{
    load_saved_config_parameters, load_shared_config_parameters,
    ConfigRecord, ConfigSource, FetchResponse, Fetcher, LoadRequest, LoadedConfig,
    MemorySessionCache, SessionCache,
};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// Characters `encodeURIComponent` leaves alone.
pub(crate) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');
