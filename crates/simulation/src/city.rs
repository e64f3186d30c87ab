//! The owned world: tile grid, overlay maps and every scalar the phases update.
//!
//! `City` is the only mutable simulation state. The host calls [`City::tick`]
//! from its own loop (or lets [`crate::SimulationPlugin`] do it from
//! `FixedUpdate`); tools and UIs go through the accessors and the tool API
//! below and never touch the grid while a tick is running.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::budget::{Budget, Effectiveness, Funding};
use crate::census::{self, Census, CityClass};
use crate::clock::{Calendar, SimClock, Speed};
use crate::config::{WORLD_H, WORLD_W};
use crate::density::DensityMaps;
use crate::diffusion;
use crate::disasters::Disasters;
use crate::evaluation::Evaluation;
use crate::grid::{Tile, TileFlags, TileGrid};
use crate::notifications::SimEvent;
use crate::power::{self, PowerStats};
use crate::scheduler;
use crate::sim_params::SimParams;
use crate::sim_rng::{SimRng, DEFAULT_SEED};
use crate::tiles::{self, Category, ZoneKind};
use crate::traffic::TrafficRouter;
use crate::valves::DemandValves;
use crate::zones::build::{self, PlacementError};
use crate::zones::{CivicNeed, ZoneLedger};

/// What an inspection tool shows for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileReport {
    pub id: u16,
    pub category: Option<Category>,
    pub kind: Option<ZoneKind>,
    /// Center of the building the tile belongs to.
    pub center: Option<(usize, usize)>,
    pub stage: u8,
    pub powered: bool,
    pub land_value: u8,
    pub pollution: u8,
    pub crime: u8,
    pub traffic: u8,
    pub population_density: u8,
}

#[derive(Resource)]
pub struct City {
    pub grid: TileGrid,
    pub maps: DensityMaps,
    pub rng: SimRng,
    pub params: SimParams,
    pub calendar: Calendar,
    pub clock: SimClock,
    pub budget: Budget,
    pub valves: DemandValves,
    pub census: Census,
    pub power: PowerStats,
    pub evaluation: Evaluation,
    pub ledger: ZoneLedger,
    pub civic: CivicNeed,
    pub(crate) router: TrafficRouter,
    pub(crate) events: Vec<SimEvent>,
    pub(crate) disasters: Option<Box<dyn Disasters>>,
    /// Brownout state at the last phase-11 check, for edge detection.
    pub(crate) in_brownout: bool,
    /// Headline population at the last phase-11 check.
    pub(crate) last_population: u64,
}

impl Default for City {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl City {
    /// A 120x100 all-dirt world.
    pub fn new(seed: u64) -> Self {
        Self::with_params(WORLD_W, WORLD_H, seed, SimParams::default())
    }

    pub fn with_dimensions(width: usize, height: usize, seed: u64) -> Self {
        Self::with_params(width, height, seed, SimParams::default())
    }

    pub fn with_params(width: usize, height: usize, seed: u64, params: SimParams) -> Self {
        let budget = Budget::new(params.initial_funds());
        let census = Census::default();
        let mut valves = DemandValves::default();
        valves.update(&census.totals, budget.tax_rate, params.difficulty);
        Self {
            grid: TileGrid::new(width, height),
            maps: DensityMaps::new(width, height),
            rng: SimRng::from_seed_u64(seed),
            params,
            calendar: Calendar::default(),
            clock: SimClock::default(),
            budget,
            valves,
            census,
            power: PowerStats::default(),
            evaluation: Evaluation::default(),
            ledger: ZoneLedger::default(),
            civic: CivicNeed::default(),
            router: TrafficRouter::default(),
            events: Vec::new(),
            disasters: None,
            in_brownout: false,
            last_population: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Ticking
    // -------------------------------------------------------------------------

    /// One host call. Runs the next phase when the speed gate accepts the
    /// call and returns whether it did.
    pub fn tick(&mut self) -> bool {
        if !self.clock.accept() {
            return false;
        }
        self.step();
        true
    }

    /// Run the next phase regardless of speed.
    pub fn step(&mut self) {
        scheduler::run_phase(self, self.clock.phase());
        self.clock.finish_phase();
    }

    /// Run phases until the current cycle is complete.
    pub fn run_cycle(&mut self) {
        loop {
            self.step();
            if self.clock.phase() == 0 {
                break;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------------

    pub fn population(&self) -> u64 {
        self.census.city_population
    }

    pub fn city_class(&self) -> CityClass {
        self.census.city_class
    }

    pub fn funds(&self) -> i64 {
        self.budget.treasury
    }

    pub fn valves(&self) -> DemandValves {
        self.valves
    }

    pub fn effectiveness(&self) -> Effectiveness {
        self.budget.effectiveness
    }

    pub fn maps(&self) -> &DensityMaps {
        &self.maps
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Direct grid access for loaders and tools. Call
    /// [`City::refresh_derived`] after bulk edits.
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn inspect(&self, x: usize, y: usize) -> Option<TileReport> {
        let (ix, iy) = grid_coords(x, y)?;
        let tile = self.grid.get(ix, iy)?;
        let kind = tiles::zone_kind(tile.id);
        let center = tiles::center_of(tile.id, ix, iy)
            .filter(|&(cx, cy)| self.grid.get(cx, cy).is_some_and(|c| c.is_zone_center()))
            .map(|(cx, cy)| (cx as usize, cy as usize));
        let center_tile = center.map(|(cx, cy)| self.grid.at(cx, cy)).unwrap_or(tile);
        Some(TileReport {
            id: tile.id,
            category: kind.map(ZoneKind::category),
            kind,
            center,
            stage: tiles::stage_of(center_tile.id),
            powered: center_tile.is_powered() || tile.is_powered(),
            land_value: self.maps.land_value.at_world(x, y),
            pollution: self.maps.pollution.at_world(x, y),
            crime: self.maps.crime.at_world(x, y),
            traffic: self.maps.traffic.at_world(x, y),
            population_density: self.maps.population.at_world(x, y),
        })
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn set_tax_rate(&mut self, rate: u8) {
        self.budget.set_tax_rate(rate);
    }

    pub fn set_funding(&mut self, funding: Funding) {
        self.budget.funding = funding.clamped();
    }

    pub fn set_auto_budget(&mut self, auto: bool) {
        self.budget.auto_budget = auto;
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.clock.speed = speed;
    }

    /// Install or remove the disaster hook run in phase 15.
    pub fn set_disasters(&mut self, disasters: Option<Box<dyn Disasters>>) {
        self.disasters = disasters;
    }

    // -------------------------------------------------------------------------
    // Tool API
    // -------------------------------------------------------------------------

    /// Zone a fresh stage-0 footprint centered on `(x, y)`.
    pub fn place_zone(&mut self, kind: ZoneKind, x: usize, y: usize) -> Result<(), PlacementError> {
        let (ix, iy) = grid_coords(x, y).ok_or_else(|| out_of_range(x, y))?;
        build::stamp_zone(&mut self.grid, kind, ix, iy)?;
        let index = self.grid.index(x, y);
        self.ledger.remove(index);
        Ok(())
    }

    /// Put a single non-building tile (road, rail, wire, terrain) at `(x, y)`.
    pub fn place_tile(&mut self, x: usize, y: usize, id: u16) -> Result<(), PlacementError> {
        let (ix, iy) = grid_coords(x, y).ok_or_else(|| out_of_range(x, y))?;
        if !tiles::is_valid(id) || tiles::zone_kind(id).is_some() {
            return Err(PlacementError::InvalidTile(id));
        }
        let current = self
            .grid
            .get(ix, iy)
            .ok_or(PlacementError::OutOfBounds { x: ix, y: iy })?;
        if tiles::zone_kind(current.id).is_some() {
            return Err(PlacementError::Occupied { x: ix, y: iy });
        }
        self.grid.set(ix, iy, Tile::natural(id));
        Ok(())
    }

    /// Clear a whole building, or a single bulldozable tile, back to dirt.
    /// Returns whether anything changed.
    pub fn bulldoze(&mut self, x: usize, y: usize) -> bool {
        let Some((ix, iy)) = grid_coords(x, y) else {
            return false;
        };
        let Some(tile) = self.grid.get(ix, iy) else {
            return false;
        };
        if let Some((cx, cy)) = tiles::center_of(tile.id, ix, iy) {
            if build::clear_footprint(&mut self.grid, cx, cy) {
                let index = self.grid.index(cx as usize, cy as usize);
                self.ledger.remove(index);
                return true;
            }
        }
        if tile.id == tiles::DIRT || !tile.flags.contains(TileFlags::BULLDOZABLE) {
            return false;
        }
        self.grid.set(ix, iy, Tile::DIRT)
    }

    /// Pay for something out of the treasury. Returns false, with the treasury
    /// emptied and a notification queued, when funds run out.
    pub fn charge(&mut self, cost: i64) -> bool {
        match self.budget.charge(cost) {
            Some(event) => {
                self.events.push(event);
                false
            }
            None => true,
        }
    }

    // -------------------------------------------------------------------------
    // Host plumbing
    // -------------------------------------------------------------------------

    /// Take every event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild everything derived from the grid: census totals, power, every
    /// overlay map. Zone ledgers restart from zero.
    pub fn refresh_derived(&mut self) {
        self.ledger.clear();
        self.power = power::propagate(&mut self.grid, &self.params);
        self.in_brownout = self.power.is_brownout();
        let counts = census::survey(&self.grid);
        self.census.current = counts;
        self.census.totals = counts;
        self.census.city_population = counts.city_population();
        self.census.city_class = CityClass::from_population(self.census.city_population);
        self.last_population = self.census.city_population;
        self.civic = CivicNeed::from_counts(&counts);
        self.maps = DensityMaps::new(self.grid.width, self.grid.height);
        diffusion::refresh_all(&self.grid, &mut self.maps);
    }
}

/// Tool coordinates as signed grid coordinates, or `None` when they cannot name a tile.
fn grid_coords(x: usize, y: usize) -> Option<(i32, i32)> {
    Some((i32::try_from(x).ok()?, i32::try_from(y).ok()?))
}

fn out_of_range(x: usize, y: usize) -> PlacementError {
    PlacementError::OutOfBounds {
        x: i32::try_from(x).unwrap_or(i32::MAX),
        y: i32::try_from(y).unwrap_or(i32::MAX),
    }
}
