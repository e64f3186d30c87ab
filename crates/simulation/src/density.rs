//! Derived overlay maps at reduced resolution.
//!
//! Half-resolution maps cover 2x2 world tiles per cell, quarter-resolution maps
//! 4x4. Every map is recomputed or smoothed from the tile grid and never
//! persisted independently.

use serde::{Deserialize, Serialize};

pub const HALF_SCALE: usize = 2;
pub const QUARTER_SCALE: usize = 4;

/// Cell types a [`Map`] can hold. Widening to `i32` lets smoothing and
/// accumulation work the same way for every cell width.
pub trait MapValue: Copy + Default + PartialEq {
    fn widen(self) -> i32;
    /// Saturating conversion back into the cell type.
    fn narrow(value: i32) -> Self;
}

impl MapValue for u8 {
    fn widen(self) -> i32 {
        self as i32
    }
    fn narrow(value: i32) -> Self {
        value.clamp(0, u8::MAX as i32) as u8
    }
}

impl MapValue for u16 {
    fn widen(self) -> i32 {
        self as i32
    }
    fn narrow(value: i32) -> Self {
        value.clamp(0, u16::MAX as i32) as u16
    }
}

impl MapValue for i16 {
    fn widen(self) -> i32 {
        self as i32
    }
    fn narrow(value: i32) -> Self {
        value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// A reduced-resolution overlay. `scale` world tiles per cell edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map<T> {
    pub cells: Vec<T>,
    pub width: usize,
    pub height: usize,
    pub scale: usize,
}

impl<T: MapValue> Map<T> {
    /// Map covering a `world_w` x `world_h` tile grid.
    pub fn covering(world_w: usize, world_h: usize, scale: usize) -> Self {
        let width = world_w.div_ceil(scale);
        let height = world_h.div_ceil(scale);
        Self {
            cells: vec![T::default(); width * height],
            width,
            height,
            scale,
        }
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell value, or the default when out of range.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            T::default()
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = value;
        }
    }

    /// Value of the cell containing world tile `(wx, wy)`.
    #[inline]
    pub fn at_world(&self, wx: usize, wy: usize) -> T {
        self.get(wx / self.scale, wy / self.scale)
    }

    /// Saturating add into the cell containing world tile `(wx, wy)`.
    pub fn add_world(&mut self, wx: usize, wy: usize, amount: i32) {
        let (x, y) = (wx / self.scale, wy / self.scale);
        let current = self.get(x, y).widen();
        self.set(x, y, T::narrow(current.saturating_add(amount)));
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    pub fn is_all(&self, value: T) -> bool {
        self.cells.iter().all(|c| *c == value)
    }

    /// Sum and count of the cells matching `pred`.
    pub fn sum_where(&self, pred: impl Fn(T) -> bool) -> (i64, usize) {
        self.cells
            .iter()
            .filter(|c| pred(**c))
            .fold((0i64, 0usize), |(sum, n), c| (sum + c.widen() as i64, n + 1))
    }

    /// Coordinates of the largest cell (first in row-major order on ties).
    pub fn max_location(&self) -> (usize, usize, T) {
        let mut best = (0, 0, self.get(0, 0));
        for (i, value) in self.cells.iter().enumerate() {
            if value.widen() > best.2.widen() {
                best = (i % self.width, i / self.width, *value);
            }
        }
        best
    }
}

/// Scalar summaries refreshed by the diffusion scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapStats {
    pub pollution_average: u32,
    pub pollution_max_at: (usize, usize),
    pub land_value_average: u32,
    pub crime_average: u32,
    pub crime_max_at: (usize, usize),
    pub traffic_average: u32,
    /// Population-weighted centroid in world tiles.
    pub centroid: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityMaps {
    pub population: Map<u8>,
    pub traffic: Map<u8>,
    pub pollution: Map<u8>,
    pub land_value: Map<u8>,
    pub crime: Map<u8>,

    pub terrain: Map<u8>,
    /// Coverage stamped by fire stations during the current cycle.
    pub fire_raw: Map<u16>,
    pub fire_coverage: Map<u16>,
    /// Coverage stamped by police stations during the current cycle.
    pub police_raw: Map<u16>,
    pub police_coverage: Map<u16>,
    pub commercial_rate: Map<i16>,

    pub stats: MapStats,
}

impl DensityMaps {
    pub fn new(world_w: usize, world_h: usize) -> Self {
        let half = || Map::<u8>::covering(world_w, world_h, HALF_SCALE);
        Self {
            population: half(),
            traffic: half(),
            pollution: half(),
            land_value: half(),
            crime: half(),
            terrain: Map::covering(world_w, world_h, QUARTER_SCALE),
            fire_raw: Map::covering(world_w, world_h, QUARTER_SCALE),
            fire_coverage: Map::covering(world_w, world_h, QUARTER_SCALE),
            police_raw: Map::covering(world_w, world_h, QUARTER_SCALE),
            police_coverage: Map::covering(world_w, world_h, QUARTER_SCALE),
            commercial_rate: Map::covering(world_w, world_h, QUARTER_SCALE),
            stats: MapStats {
                centroid: (world_w / 2, world_h / 2),
                ..MapStats::default()
            },
        }
    }

    /// Clear the per-cycle station stamps.
    pub fn reset_station_maps(&mut self) {
        self.fire_raw.fill(0);
        self.police_raw.fill(0);
    }
}
