//! Map types, their required parameter keys, and the advisory stable ranges.
//!
//! This is the leaf of the crate: the validator, the stability checker and the
//! kernels all read their key sets and bounds from here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eleven chaos systems the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapType {
    Lorenz,
    Rossler,
    Henon,
    Lozi,
    Logistic,
    Newton,
    Standard,
    BifurcationLogistic,
    BifurcationHenon,
    ChaosEsthetique,
    Lyapunov,
}

impl MapType {
    pub const ALL: [MapType; 11] = [
        MapType::Lorenz,
        MapType::Rossler,
        MapType::Henon,
        MapType::Lozi,
        MapType::Logistic,
        MapType::Newton,
        MapType::Standard,
        MapType::BifurcationLogistic,
        MapType::BifurcationHenon,
        MapType::ChaosEsthetique,
        MapType::Lyapunov,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MapType::Lorenz => "lorenz",
            MapType::Rossler => "rossler",
            MapType::Henon => "henon",
            MapType::Lozi => "lozi",
            MapType::Logistic => "logistic",
            MapType::Newton => "newton",
            MapType::Standard => "standard",
            MapType::BifurcationLogistic => "bifurcation-logistic",
            MapType::BifurcationHenon => "bifurcation-henon",
            MapType::ChaosEsthetique => "chaos-esthetique",
            MapType::Lyapunov => "lyapunov",
        }
    }

    /// Required parameter keys, in display order.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            MapType::Lorenz => &["sigma", "rho", "beta"],
            MapType::Rossler => &["a", "b", "c"],
            MapType::Henon => &["a", "b", "iterations"],
            MapType::Lozi => &["a", "b", "x0", "y0", "iterations"],
            MapType::Logistic => &["r", "x0", "iterations"],
            MapType::Newton => &["xMin", "xMax", "yMin", "yMax", "maxIterations"],
            MapType::Standard => &["k", "numP", "numQ", "iterations"],
            MapType::BifurcationLogistic => &["rMin", "rMax", "maxIterations"],
            MapType::BifurcationHenon => &["aMin", "aMax", "b", "maxIterations"],
            MapType::ChaosEsthetique => &["a", "b", "x0", "y0", "iterations"],
            MapType::Lyapunov => &["rMin", "rMax", "iterations", "transientIterations"],
        }
    }

    /// Stable interval for every ranged key of this map type.
    pub fn stable_ranges(self) -> &'static [(&'static str, StableRange)] {
        match self {
            MapType::Lorenz => LORENZ_RANGES,
            MapType::Rossler => ROSSLER_RANGES,
            MapType::Henon => HENON_RANGES,
            MapType::Lozi => LOZI_RANGES,
            MapType::Logistic => LOGISTIC_RANGES,
            MapType::Newton => NEWTON_RANGES,
            MapType::Standard => STANDARD_RANGES,
            MapType::BifurcationLogistic => BIFURCATION_LOGISTIC_RANGES,
            MapType::BifurcationHenon => BIFURCATION_HENON_RANGES,
            MapType::ChaosEsthetique => CHAOS_ESTHETIQUE_RANGES,
            MapType::Lyapunov => LYAPUNOV_RANGES,
        }
    }

    /// Map types whose kernels are heavy enough to run off the main thread.
    pub fn prefers_worker(self) -> bool {
        matches!(self, MapType::Standard | MapType::ChaosEsthetique)
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMapType(pub String);

impl fmt::Display for UnknownMapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown map type: {}", self.0)
    }
}

impl std::error::Error for UnknownMapType {}

impl FromStr for MapType {
    type Err = UnknownMapType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapType::ALL
            .iter()
            .copied()
            .find(|map_type| map_type.as_str() == s)
            .ok_or_else(|| UnknownMapType(s.to_string()))
    }
}

/// Closed interval `[min, max]`; both ends count as stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StableRange {
    pub min: f64,
    pub max: f64,
}

impl StableRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

const LORENZ_RANGES: &[(&str, StableRange)] = &[
    ("sigma", StableRange::new(0.0, 50.0)),
    ("rho", StableRange::new(0.0, 100.0)),
    ("beta", StableRange::new(0.0, 10.0)),
];

const ROSSLER_RANGES: &[(&str, StableRange)] = &[
    ("a", StableRange::new(0.126, 0.43295)),
    ("b", StableRange::new(0.01, 2.0)),
    ("c", StableRange::new(1.0, 30.0)),
];

const HENON_RANGES: &[(&str, StableRange)] = &[
    ("a", StableRange::new(0.0, 2.0)),
    ("b", StableRange::new(-1.0, 1.0)),
    ("iterations", StableRange::new(1.0, 50_000.0)),
];

const LOZI_RANGES: &[(&str, StableRange)] = &[
    ("a", StableRange::new(0.0, 2.0)),
    ("b", StableRange::new(0.0, 1.0)),
    ("x0", StableRange::new(-2.0, 2.0)),
    ("y0", StableRange::new(-2.0, 2.0)),
    ("iterations", StableRange::new(1.0, 50_000.0)),
];

const LOGISTIC_RANGES: &[(&str, StableRange)] = &[
    ("r", StableRange::new(0.0, 4.0)),
    ("x0", StableRange::new(0.0, 1.0)),
    ("iterations", StableRange::new(1.0, 1_000.0)),
];

const NEWTON_RANGES: &[(&str, StableRange)] = &[
    ("xMin", StableRange::new(-10.0, 10.0)),
    ("xMax", StableRange::new(-10.0, 10.0)),
    ("yMin", StableRange::new(-10.0, 10.0)),
    ("yMax", StableRange::new(-10.0, 10.0)),
    ("maxIterations", StableRange::new(1.0, 200.0)),
];

const STANDARD_RANGES: &[(&str, StableRange)] = &[
    ("k", StableRange::new(0.0, 10.0)),
    ("numP", StableRange::new(1.0, 100.0)),
    ("numQ", StableRange::new(1.0, 100.0)),
    ("iterations", StableRange::new(1.0, 100_000.0)),
];

const BIFURCATION_LOGISTIC_RANGES: &[(&str, StableRange)] = &[
    ("rMin", StableRange::new(0.0, 4.0)),
    ("rMax", StableRange::new(0.0, 4.0)),
    ("maxIterations", StableRange::new(1.0, 5_000.0)),
];

const BIFURCATION_HENON_RANGES: &[(&str, StableRange)] = &[
    ("aMin", StableRange::new(0.0, 2.0)),
    ("aMax", StableRange::new(0.0, 2.0)),
    ("b", StableRange::new(-1.0, 1.0)),
    ("maxIterations", StableRange::new(1.0, 5_000.0)),
];

const CHAOS_ESTHETIQUE_RANGES: &[(&str, StableRange)] = &[
    ("a", StableRange::new(0.0, 2.0)),
    ("b", StableRange::new(0.0, 2.0)),
    ("x0", StableRange::new(-50.0, 50.0)),
    ("y0", StableRange::new(-50.0, 50.0)),
    ("iterations", StableRange::new(1.0, 100_000.0)),
];

const LYAPUNOV_RANGES: &[(&str, StableRange)] = &[
    ("rMin", StableRange::new(0.0, 4.0)),
    ("rMax", StableRange::new(0.0, 4.0)),
    ("iterations", StableRange::new(100.0, 10_000.0)),
    ("transientIterations", StableRange::new(50.0, 5_000.0)),
];

/// Ordered `key -> range` view handed to callers (and serialized as a JSON object).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StableRanges(pub serde_json::Map<String, serde_json::Value>);

impl StableRanges {
    fn from_table(table: &[(&str, StableRange)]) -> Self {
        let mut map = serde_json::Map::new();
        for (key, range) in table {
            map.insert(
                (*key).to_string(),
                serde_json::json!({ "min": range.min, "max": range.max }),
            );
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<StableRange> {
        let entry = self.0.get(key)?;
        Some(StableRange {
            min: entry.get("min")?.as_f64()?,
            max: entry.get("max")?.as_f64()?,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Stable ranges for a map type tag, or `None` when the tag is not recognised.
pub fn get_stable_ranges(map_type: &str) -> Option<StableRanges> {
    let map_type = map_type.parse::<MapType>().ok()?;
    Some(StableRanges::from_table(map_type.stable_ranges()))
}

pub fn is_valid_map_type(candidate: &str) -> bool {
    candidate.parse::<MapType>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_type_tags_round_trip() {
        for map_type in MapType::ALL {
            assert_eq!(map_type.as_str().parse::<MapType>(), Ok(map_type));
            let json = serde_json::to_value(map_type).expect("serialize");
            assert_eq!(json, serde_json::Value::String(map_type.as_str().into()));
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert!(!is_valid_map_type("mandelbrot"));
        assert!(!is_valid_map_type("Lorenz"));
        assert!(!is_valid_map_type(""));
        assert!(get_stable_ranges("mandelbrot").is_none());
        let err = "nope".parse::<MapType>().expect_err("unknown");
        assert_eq!(err.to_string(), "Unknown map type: nope");
    }

    #[test]
    fn every_range_key_is_a_schema_key() {
        for map_type in MapType::ALL {
            for (key, range) in map_type.stable_ranges() {
                assert!(map_type.keys().contains(key), "{map_type}: {key}");
                assert!(range.min <= range.max);
            }
        }
    }

    #[test]
    fn lozi_ranges_are_listed_in_schema_order() {
        let ranges = get_stable_ranges("lozi").expect("lozi is known");
        let expected = serde_json::json!({
            "a": {"min": 0.0, "max": 2.0},
            "b": {"min": 0.0, "max": 1.0},
            "x0": {"min": -2.0, "max": 2.0},
            "y0": {"min": -2.0, "max": 2.0},
            "iterations": {"min": 1.0, "max": 50000.0},
        });
        assert_eq!(serde_json::to_value(&ranges).expect("serialize"), expected);
        assert_eq!(
            ranges.keys().collect::<Vec<_>>(),
            vec!["a", "b", "x0", "y0", "iterations"]
        );
        assert_eq!(ranges.get("x0"), Some(StableRange { min: -2.0, max: 2.0 }));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = StableRange::new(0.126, 0.43295);
        assert!(range.contains(0.126));
        assert!(range.contains(0.43295));
        assert!(!range.contains(0.125));
        assert!(!range.contains(0.433));
        assert!(!range.contains(f64::NAN));
    }
}
