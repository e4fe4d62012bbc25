//! The `chaos_core` crate holds everything behind the chaos map views that does
//! not touch the screen: the parameter schema, validation and stability
//! advice, configuration loading, and the numerical kernels.
//!
//! Key components:
//! - **Schema / Params**: `MapType`, stable ranges, and the typed `ParameterSet`.
//! - **Validation / Stability**: structural checks on untrusted input and
//!   advisory range checks on accepted sets.
//! - **Config**: inline `config` values, saved and shared records, comparison links.
//! - **Kernels**: one pure function per map type, built on the `DynamicalSystem`
//!   and `Steppable` traits and the solvers (RK4, Euler, DiscreteMap).
//! - **Delegate**: last-request-wins offloading of the heavy kernels.
pub mod config;
pub mod delegate;
pub mod kernels;
pub mod params;
pub mod schema;
pub mod solvers;
pub mod stability;
pub mod traits;
pub mod validation;

pub use config::ConfigError;
pub use kernels::{compute, KernelOutput, KernelSettings};
pub use params::{default_parameters, ParameterSet};
pub use schema::{get_stable_ranges, is_valid_map_type, MapType, StableRange, StableRanges};
pub use stability::{check_parameter_set_stability, check_parameter_stability, StabilityResult};
pub use validation::{validate_parameter_set, validate_parameters, ValidationResult};
