//! Typed parameter sets, one struct per map type.
//!
//! Values are stored as `f64` because the wire format is a flat mapping of
//! names to real numbers; kernels convert counts with [`count`].

use crate::schema::MapType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LorenzParameters {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RosslerParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HenonParameters {
    pub a: f64,
    pub b: f64,
    pub iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoziParameters {
    pub a: f64,
    pub b: f64,
    pub x0: f64,
    pub y0: f64,
    pub iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParameters {
    pub r: f64,
    pub x0: f64,
    pub iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewtonParameters {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub max_iterations: f64,
}

/// Chirikov standard map. Older saved links spell the kick strength `K`; the
/// validator rewrites that to `k` before this struct is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardMapParameters {
    pub k: f64,
    pub num_p: f64,
    pub num_q: f64,
    pub iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BifurcationLogisticParameters {
    pub r_min: f64,
    pub r_max: f64,
    pub max_iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BifurcationHenonParameters {
    pub a_min: f64,
    pub a_max: f64,
    pub b: f64,
    pub max_iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaosEsthetiqueParameters {
    pub a: f64,
    pub b: f64,
    pub x0: f64,
    pub y0: f64,
    pub iterations: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyapunovParameters {
    pub r_min: f64,
    pub r_max: f64,
    pub iterations: f64,
    pub transient_iterations: f64,
}

/// A validated parameter set, tagged with its map type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ParameterSet {
    Lorenz(LorenzParameters),
    Rossler(RosslerParameters),
    Henon(HenonParameters),
    Lozi(LoziParameters),
    Logistic(LogisticParameters),
    Newton(NewtonParameters),
    Standard(StandardMapParameters),
    BifurcationLogistic(BifurcationLogisticParameters),
    BifurcationHenon(BifurcationHenonParameters),
    ChaosEsthetique(ChaosEsthetiqueParameters),
    Lyapunov(LyapunovParameters),
}

impl ParameterSet {
    pub fn map_type(&self) -> MapType {
        match self {
            ParameterSet::Lorenz(_) => MapType::Lorenz,
            ParameterSet::Rossler(_) => MapType::Rossler,
            ParameterSet::Henon(_) => MapType::Henon,
            ParameterSet::Lozi(_) => MapType::Lozi,
            ParameterSet::Logistic(_) => MapType::Logistic,
            ParameterSet::Newton(_) => MapType::Newton,
            ParameterSet::Standard(_) => MapType::Standard,
            ParameterSet::BifurcationLogistic(_) => MapType::BifurcationLogistic,
            ParameterSet::BifurcationHenon(_) => MapType::BifurcationHenon,
            ParameterSet::ChaosEsthetique(_) => MapType::ChaosEsthetique,
            ParameterSet::Lyapunov(_) => MapType::Lyapunov,
        }
    }

    /// `(key, value)` pairs in the schema's key order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let values: Vec<f64> = match *self {
            ParameterSet::Lorenz(p) => vec![p.sigma, p.rho, p.beta],
            ParameterSet::Rossler(p) => vec![p.a, p.b, p.c],
            ParameterSet::Henon(p) => vec![p.a, p.b, p.iterations],
            ParameterSet::Lozi(p) => vec![p.a, p.b, p.x0, p.y0, p.iterations],
            ParameterSet::Logistic(p) => vec![p.r, p.x0, p.iterations],
            ParameterSet::Newton(p) => vec![p.x_min, p.x_max, p.y_min, p.y_max, p.max_iterations],
            ParameterSet::Standard(p) => vec![p.k, p.num_p, p.num_q, p.iterations],
            ParameterSet::BifurcationLogistic(p) => vec![p.r_min, p.r_max, p.max_iterations],
            ParameterSet::BifurcationHenon(p) => vec![p.a_min, p.a_max, p.b, p.max_iterations],
            ParameterSet::ChaosEsthetique(p) => vec![p.a, p.b, p.x0, p.y0, p.iterations],
            ParameterSet::Lyapunov(p) => {
                vec![p.r_min, p.r_max, p.iterations, p.transient_iterations]
            }
        };
        self.map_type().keys().iter().copied().zip(values).collect()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Builds the typed set from an already validated key/value mapping.
    pub(crate) fn from_validated(
        map_type: MapType,
        values: &Map<String, Value>,
    ) -> serde_json::Result<Self> {
        let mut tagged = Map::with_capacity(values.len() + 1);
        tagged.insert("type".into(), Value::String(map_type.as_str().into()));
        for (key, value) in values {
            tagged.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(tagged))
    }

    /// Flat JSON object without the `type` tag.
    pub fn to_untagged_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in self.entries() {
            map.insert(key.into(), Value::from(value));
        }
        map
    }
}

/// Built-in starting parameters for every map type.
pub fn default_parameters(map_type: MapType) -> ParameterSet {
    match map_type {
        MapType::Lorenz => ParameterSet::Lorenz(LorenzParameters {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }),
        MapType::Rossler => ParameterSet::Rossler(RosslerParameters {
            a: 0.2,
            b: 0.2,
            c: 5.7,
        }),
        MapType::Henon => ParameterSet::Henon(HenonParameters {
            a: 1.4,
            b: 0.3,
            iterations: 10_000.0,
        }),
        MapType::Lozi => ParameterSet::Lozi(LoziParameters {
            a: 1.7,
            b: 0.5,
            x0: 0.0,
            y0: 0.0,
            iterations: 10_000.0,
        }),
        MapType::Logistic => ParameterSet::Logistic(LogisticParameters {
            r: 3.9,
            x0: 0.5,
            iterations: 100.0,
        }),
        MapType::Newton => ParameterSet::Newton(NewtonParameters {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -2.0,
            y_max: 2.0,
            max_iterations: 50.0,
        }),
        MapType::Standard => ParameterSet::Standard(StandardMapParameters {
            k: 0.971635,
            num_p: 10.0,
            num_q: 10.0,
            iterations: 1_000.0,
        }),
        MapType::BifurcationLogistic => {
            ParameterSet::BifurcationLogistic(BifurcationLogisticParameters {
                r_min: 2.8,
                r_max: 4.0,
                max_iterations: 1_000.0,
            })
        }
        MapType::BifurcationHenon => ParameterSet::BifurcationHenon(BifurcationHenonParameters {
            a_min: 1.0,
            a_max: 1.4,
            b: 0.3,
            max_iterations: 1_000.0,
        }),
        MapType::ChaosEsthetique => ParameterSet::ChaosEsthetique(ChaosEsthetiqueParameters {
            a: 0.9,
            b: 0.9999,
            x0: 18.0,
            y0: 0.0,
            iterations: 10_000.0,
        }),
        MapType::Lyapunov => ParameterSet::Lyapunov(LyapunovParameters {
            r_min: 2.5,
            r_max: 4.0,
            iterations: 1_000.0,
            transient_iterations: 200.0,
        }),
    }
}

/// Converts a count-like parameter to a loop bound: truncates, and maps
/// negative or non-finite values to zero.
pub fn count(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value as usize
    } else {
        0
    }
}
