pub const WORLD_W: usize = 120;
pub const WORLD_H: usize = 100;

/// Half-resolution maps: one cell covers a 2x2 block of world tiles.
pub const HALF_W: usize = WORLD_W / 2;
pub const HALF_H: usize = WORLD_H / 2;

/// Quarter-resolution maps: one cell covers a 4x4 block of world tiles.
pub const QUARTER_W: usize = WORLD_W / 4;
pub const QUARTER_H: usize = WORLD_H / 4;

pub const PHASE_COUNT: u8 = 16;
pub const STRIP_COUNT: usize = 8;

pub const CYCLES_PER_MONTH: u64 = 4;
pub const MONTHS_PER_YEAR: u64 = 12;
pub const CYCLES_PER_YEAR: u64 = CYCLES_PER_MONTH * MONTHS_PER_YEAR;
pub const START_YEAR: u64 = 1900;

pub const CENSUS_INTERVAL: u64 = 4;
pub const LONG_CENSUS_INTERVAL: u64 = 40;
pub const HISTORY_LENGTH: usize = 120;

pub const POLLUTION_SCAN_INTERVAL: u64 = 16;
pub const CRIME_SCAN_INTERVAL: u64 = 4;
pub const DENSITY_SCAN_INTERVAL: u64 = 16;

/// Work-queue bound for power propagation. Overflow truncates silently.
pub const MAX_POWER_QUEUE: usize = 1000;

/// Step budget for a single traffic trip.
pub const MAX_TRAFFIC_DISTANCE: u32 = 30;

/// Upper bound on fire tiles processed in a single phase-15 pass.
pub const MAX_FIRES_PER_PHASE: usize = 64;

/// Noise frequency for generated terrain.
pub const TERRAIN_FREQUENCY: f32 = 0.03;
/// Normalized elevation below which generated terrain is water.
pub const WATER_THRESHOLD: f32 = 0.35;
/// Normalized elevation above which generated terrain is wooded.
pub const WOODS_THRESHOLD: f32 = 0.68;
