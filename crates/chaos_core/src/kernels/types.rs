//! Output shapes produced by the kernels.
//!
//! Every kernel call allocates its own result; nothing here is cached or
//! shared between calls.

use serde::{Deserialize, Serialize};

/// Point budget for the standard map across all initial conditions.
pub const STANDARD_MAP_MAX_POINTS: usize = 200_000;
/// Point budget for chaos-esthétique regardless of the requested iterations.
pub const CHAOS_ESTHETIQUE_MAX_POINTS: usize = 50_000;
/// Iterations discarded per bifurcation column before plotting.
pub const BIFURCATION_WARMUP: usize = 100;
/// Largest up-front reservation a kernel makes; longer outputs grow on demand.
pub(crate) const RESERVE_LIMIT: usize = 1 << 16;

/// Initial capacity for an output of at most `len` items.
pub(crate) fn reserve(len: usize) -> usize {
    len.min(RESERVE_LIMIT)
}

/// A state of a continuous (3D) system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// A state of a planar map, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2> for [f64; 2] {
    fn from(point: Point2) -> Self {
        [point.x, point.y]
    }
}

/// One sample of a scalar curve, e.g. `(iteration, x_n)` for the logistic map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub value: f64,
}

/// Lyapunov exponent at one `r`. `None` means no usable sample was found and
/// the point should not be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LyapunovSample {
    pub r: f64,
    pub exponent: Option<f64>,
}

/// Row-major RGBA image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl NewtonImage {
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * self.width + x) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        rgba
    }
}

/// Hit counts of a bifurcation diagram. Column `c` samples parameter
/// `param_min + (param_max - param_min) * c / (width - 1)`; row 0 is
/// `value_max`. Overplotted density stands in for the invariant measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityGrid {
    pub width: usize,
    pub height: usize,
    pub param_min: f64,
    pub param_max: f64,
    pub value_min: f64,
    pub value_max: f64,
    pub counts: Vec<u32>,
}

impl DensityGrid {
    pub(crate) fn new(
        width: usize,
        height: usize,
        (param_min, param_max): (f64, f64),
        (value_min, value_max): (f64, f64),
    ) -> Self {
        Self {
            width,
            height,
            param_min,
            param_max,
            value_min,
            value_max,
            counts: vec![0; width * height],
        }
    }

    /// Parameter value sampled by column `col`.
    pub fn column_parameter(&self, col: usize) -> f64 {
        if self.width <= 1 {
            return self.param_min;
        }
        self.param_min + (self.param_max - self.param_min) * col as f64 / (self.width - 1) as f64
    }

    /// Records `value` in column `col`; values outside the grid are ignored.
    pub(crate) fn plot(&mut self, col: usize, value: f64) -> bool {
        if !value.is_finite() || value < self.value_min || value > self.value_max {
            return false;
        }
        let span = self.value_max - self.value_min;
        let row = if span > 0.0 && self.height > 1 {
            (((self.value_max - value) / span) * (self.height - 1) as f64).round() as usize
        } else {
            0
        };
        self.counts[row * self.width + col] = self.counts[row * self.width + col].saturating_add(1);
        true
    }

    pub fn count(&self, col: usize, row: usize) -> u32 {
        self.counts[row * self.width + col]
    }

    pub fn column_hits(&self, col: usize) -> u64 {
        (0..self.height).map(|row| u64::from(self.count(col, row))).sum()
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Result of [`crate::kernels::compute`], tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum KernelOutput {
    Trajectory3(Vec<Point3>),
    Trajectory2(Vec<Point2>),
    Series(Vec<SeriesPoint>),
    Lyapunov(Vec<LyapunovSample>),
    Image(NewtonImage),
    Density(DensityGrid),
}

impl KernelOutput {
    pub fn len(&self) -> usize {
        match self {
            KernelOutput::Trajectory3(points) => points.len(),
            KernelOutput::Trajectory2(points) => points.len(),
            KernelOutput::Series(points) => points.len(),
            KernelOutput::Lyapunov(samples) => samples.len(),
            KernelOutput::Image(image) => image.width * image.height,
            KernelOutput::Density(grid) => grid.width * grid.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
