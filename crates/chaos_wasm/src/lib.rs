//! Browser bindings for `chaos_core`.
//!
//! Every export takes plain JS values and returns plain JS values; maps are
//! serialized as objects, not `Map`s.

mod config;
mod kernels;
mod schema;
mod shared;
mod worker;

pub use config::{
    decode_comparison, encode_comparison, load_saved_config_parameters,
    load_shared_config_parameters, parse_config_param,
};
pub use kernels::{calculate_lorenz, calculate_newton, calculate_rossler, compute, compute_packed};
pub use schema::{
    check_parameter_stability, default_parameters, get_stable_ranges, is_valid_map_type,
    map_types, validate_parameters,
};
pub use worker::{handle_compute_request, WasmComputeDelegate};
