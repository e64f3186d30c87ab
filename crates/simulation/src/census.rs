//! Census: per-cycle tallies, display totals, city class and rolling history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::HISTORY_LENGTH;
use crate::grid::TileGrid;
use crate::tiles::{self, ZoneKind};

/// Counts gathered while the strips are scanned. Reset in phase 1 and copied
/// into [`Census::totals`] in phase 9.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusCounts {
    pub residential_pop: u32,
    pub commercial_pop: u32,
    pub industrial_pop: u32,
    pub hospitals: u32,
    pub churches: u32,
    pub fire_stations: u32,
    pub police_stations: u32,
    pub coal_plants: u32,
    pub nuclear_plants: u32,
    pub stadiums: u32,
    pub seaports: u32,
    pub airports: u32,
    pub road_tiles: u32,
    pub rail_tiles: u32,
    pub power_line_tiles: u32,
    pub powered_zones: u32,
    pub unpowered_zones: u32,
    pub fires: u32,
    pub trips_routed: u32,
    pub trips_failed: u32,
}

impl CensusCounts {
    /// Tally one zone center.
    pub fn count_zone(&mut self, kind: ZoneKind, stage: u8, powered: bool) {
        let pop = tiles::stage_population(stage);
        match kind {
            ZoneKind::Residential => self.residential_pop += pop,
            ZoneKind::Commercial => self.commercial_pop += pop,
            ZoneKind::Industrial => self.industrial_pop += pop,
            ZoneKind::Hospital => self.hospitals += 1,
            ZoneKind::Church => self.churches += 1,
            ZoneKind::Seaport => self.seaports += 1,
            ZoneKind::Airport => self.airports += 1,
            ZoneKind::CoalPlant => self.coal_plants += 1,
            ZoneKind::NuclearPlant => self.nuclear_plants += 1,
            ZoneKind::FireStation => self.fire_stations += 1,
            ZoneKind::PoliceStation => self.police_stations += 1,
            ZoneKind::Stadium => self.stadiums += 1,
        }
        if powered {
            self.powered_zones += 1;
        } else {
            self.unpowered_zones += 1;
        }
    }

    /// Tally one non-zone tile.
    pub fn count_tile(&mut self, id: u16) {
        if tiles::is_road(id) {
            self.road_tiles += 1;
            if tiles::road_shape(id) == tiles::SHAPE_RAIL_CROSSING {
                self.rail_tiles += 1;
            }
        } else if tiles::is_rail(id) {
            self.rail_tiles += 1;
        } else if tiles::is_power_line(id) {
            self.power_line_tiles += 1;
        } else if tiles::is_fire(id) {
            self.fires += 1;
        }
    }

    /// Raw zone population summed over the three growable categories.
    pub fn total_pop(&self) -> u32 {
        self.residential_pop + self.commercial_pop + self.industrial_pop
    }

    /// Headline population: `(res + (com + ind) * 8) * 20`.
    pub fn city_population(&self) -> u64 {
        (self.residential_pop as u64
            + (self.commercial_pop as u64 + self.industrial_pop as u64) * 8)
            * 20
    }
}

/// Count everything without running any zone logic.
pub fn survey(grid: &TileGrid) -> CensusCounts {
    let mut counts = CensusCounts::default();
    for tile in &grid.tiles {
        if tile.is_zone_center() {
            if let Some(kind) = tiles::zone_kind(tile.id) {
                counts.count_zone(kind, tiles::stage_of(tile.id), tile.is_powered());
            }
        } else {
            counts.count_tile(tile.id);
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CityClass {
    #[default]
    Village,
    Town,
    City,
    Capital,
    Metropolis,
    Megalopolis,
}

impl CityClass {
    pub fn from_population(population: u64) -> Self {
        match population {
            0..2_000 => CityClass::Village,
            2_000..10_000 => CityClass::Town,
            10_000..50_000 => CityClass::City,
            50_000..100_000 => CityClass::Capital,
            100_000..500_000 => CityClass::Metropolis,
            _ => CityClass::Megalopolis,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CityClass::Village => "village",
            CityClass::Town => "town",
            CityClass::City => "city",
            CityClass::Capital => "capital",
            CityClass::Metropolis => "metropolis",
            CityClass::Megalopolis => "megalopolis",
        }
    }
}

/// One value per history series, in [`HistorySeries::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CensusSample(pub [i16; 6]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistorySeries {
    Residential,
    Commercial,
    Industrial,
    Crime,
    Pollution,
    Money,
}

impl HistorySeries {
    pub const ALL: [HistorySeries; 6] = [
        HistorySeries::Residential,
        HistorySeries::Commercial,
        HistorySeries::Industrial,
        HistorySeries::Crime,
        HistorySeries::Pollution,
        HistorySeries::Money,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Newest-first rolling buffers, capped at [`HISTORY_LENGTH`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub short: [VecDeque<i16>; 6],
    pub long: [VecDeque<i16>; 6],
}

impl History {
    pub fn record(&mut self, sample: CensusSample, long: bool) {
        push_sample(&mut self.short, sample);
        if long {
            push_sample(&mut self.long, sample);
        }
    }

    pub fn latest(&self, series: HistorySeries) -> i16 {
        self.short[series.index()].front().copied().unwrap_or(0)
    }

    /// Fixed-length view of a buffer, padded with zeros, newest first.
    pub fn padded(buffer: &VecDeque<i16>) -> [i16; HISTORY_LENGTH] {
        let mut out = [0i16; HISTORY_LENGTH];
        for (slot, value) in out.iter_mut().zip(buffer.iter()) {
            *slot = *value;
        }
        out
    }

    pub fn from_padded(values: &[i16]) -> VecDeque<i16> {
        values.iter().take(HISTORY_LENGTH).copied().collect()
    }
}

fn push_sample(buffers: &mut [VecDeque<i16>; 6], sample: CensusSample) {
    for (buffer, value) in buffers.iter_mut().zip(sample.0) {
        buffer.push_front(value);
        buffer.truncate(HISTORY_LENGTH);
    }
}

/// Display totals and derived headline figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Census {
    /// Accumulator for the cycle in progress.
    pub current: CensusCounts,
    /// Last completed cycle.
    pub totals: CensusCounts,
    pub city_population: u64,
    pub city_class: CityClass,
    pub history: History,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::zones::build;

    #[test]
    fn test_city_population_formula() {
        let counts = CensusCounts {
            residential_pop: 40,
            commercial_pop: 8,
            industrial_pop: 16,
            ..CensusCounts::default()
        };
        assert_eq!(counts.city_population(), (40 + 24 * 8) * 20);
        assert_eq!(counts.total_pop(), 64);
    }

    #[test]
    fn test_city_class_thresholds() {
        assert_eq!(CityClass::from_population(0), CityClass::Village);
        assert_eq!(CityClass::from_population(1_999), CityClass::Village);
        assert_eq!(CityClass::from_population(2_000), CityClass::Town);
        assert_eq!(CityClass::from_population(49_999), CityClass::City);
        assert_eq!(CityClass::from_population(50_000), CityClass::Capital);
        assert_eq!(CityClass::from_population(100_000), CityClass::Metropolis);
        assert_eq!(CityClass::from_population(500_000), CityClass::Megalopolis);
        assert!(CityClass::Town > CityClass::Village);
    }

    #[test]
    fn test_survey_counts_infrastructure() {
        let mut grid = TileGrid::new(30, 30);
        build::stamp_zone(&mut grid, ZoneKind::Residential, 5, 5).unwrap();
        build::stamp_zone(&mut grid, ZoneKind::PoliceStation, 10, 5).unwrap();
        for x in 0..10 {
            grid.set(x, 20, Tile::natural(tiles::road_tile(0, tiles::SHAPE_HROAD)));
        }
        grid.set(3, 25, Tile::natural(tiles::RAIL_BASE));
        grid.set(4, 25, Tile::natural(tiles::POWER_BASE));
        grid.set(5, 25, Tile::natural(tiles::FIRE_BASE));
        let counts = survey(&grid);
        assert_eq!(counts.road_tiles, 10);
        assert_eq!(counts.rail_tiles, 1);
        assert_eq!(counts.power_line_tiles, 1);
        assert_eq!(counts.fires, 1);
        assert_eq!(counts.police_stations, 1);
        assert_eq!(counts.unpowered_zones, 2);
        assert_eq!(counts.residential_pop, 0);
    }

    #[test]
    fn test_history_rolls_and_caps() {
        let mut history = History::default();
        for i in 0..(HISTORY_LENGTH as i16 + 10) {
            history.record(CensusSample([i, 0, 0, 0, 0, -i]), i % 10 == 0);
        }
        let res = &history.short[HistorySeries::Residential.index()];
        assert_eq!(res.len(), HISTORY_LENGTH);
        assert_eq!(history.latest(HistorySeries::Residential), HISTORY_LENGTH as i16 + 9);
        assert_eq!(history.latest(HistorySeries::Money), -(HISTORY_LENGTH as i16 + 9));
        assert_eq!(history.long[0].len(), 13);
        let padded = History::padded(&history.long[0]);
        assert_eq!(padded[0], 120);
        assert_eq!(padded[13], 0);
    }
}
