//! # TestCity: headless integration test harness
//!
//! Provides a fluent builder that wraps `bevy::app::App` + `SimulationPlugin`
//! for running integration tests without a window or renderer.

use bevy::app::App;
use bevy::prelude::*;

use crate::city::City;
use crate::clock::Speed;
use crate::config::PHASE_COUNT;
use crate::grid::{Tile, TileGrid};
use crate::notifications::{NotificationLog, NotificationPriority, SimEvent};
use crate::sim_params::SimParams;
use crate::state_hash::compute_state_hash;
use crate::tiles::{self, ZoneKind};
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
///
/// Use builder methods to set up city state, then call `tick()` to advance the
/// simulation and assert on the resulting `City`.
pub struct TestCity {
    app: App,
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCity {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// A fresh all-dirt 120x100 city running at fast speed, so every `tick`
    /// runs exactly one phase.
    pub fn new() -> Self {
        Self::with_city(City::default())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_city(City::new(seed))
    }

    pub fn with_params(params: SimParams) -> Self {
        let city = City::with_params(
            crate::config::WORLD_W,
            crate::config::WORLD_H,
            crate::sim_rng::DEFAULT_SEED,
            params,
        );
        Self::with_city(city)
    }

    pub fn with_city(mut city: City) -> Self {
        city.set_speed(Speed::Fast);
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.insert_resource(city);
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn with_zone(mut self, kind: ZoneKind, x: usize, y: usize) -> Self {
        if let Err(e) = self.city_mut().place_zone(kind, x, y) {
            panic!("with_zone({kind:?}, {x}, {y}): {e}");
        }
        self
    }

    /// A straight road from `(x0, y0)` to `(x1, y1)`, horizontal or vertical.
    /// Power lines it crosses become road/power crossings.
    pub fn with_road(self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        self.with_line(x0, y0, x1, y1, |existing, horizontal| {
            if tiles::is_power_line(existing) {
                let shape = if horizontal {
                    tiles::SHAPE_HROAD_POWER
                } else {
                    tiles::SHAPE_VROAD_POWER
                };
                tiles::road_tile(0, shape)
            } else if tiles::is_rail(existing) {
                tiles::road_tile(0, tiles::SHAPE_RAIL_CROSSING)
            } else if horizontal {
                tiles::road_tile(0, tiles::SHAPE_HROAD)
            } else {
                tiles::road_tile(0, tiles::SHAPE_VROAD)
            }
        })
    }

    /// A straight power line. Roads it crosses become road/power crossings.
    pub fn with_power_line(self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        self.with_line(x0, y0, x1, y1, |existing, horizontal| {
            if tiles::is_road(existing) {
                // The road runs across the line.
                let shape = if horizontal {
                    tiles::SHAPE_VROAD_POWER
                } else {
                    tiles::SHAPE_HROAD_POWER
                };
                tiles::road_tile(0, shape)
            } else {
                tiles::POWER_BASE + u16::from(!horizontal)
            }
        })
    }

    pub fn with_rail(self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        self.with_line(x0, y0, x1, y1, |existing, horizontal| {
            if tiles::is_road(existing) {
                tiles::road_tile(0, tiles::SHAPE_RAIL_CROSSING)
            } else {
                tiles::RAIL_BASE + u16::from(!horizontal)
            }
        })
    }

    fn with_line(
        mut self,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
        pick: impl Fn(u16, bool) -> u16,
    ) -> Self {
        assert!(x0 == x1 || y0 == y1, "lines must be straight");
        let horizontal = y0 == y1;
        let mut city = self.city_mut();
        for x in x0.min(x1)..=x0.max(x1) {
            for y in y0.min(y1)..=y0.max(y1) {
                let existing = city.grid().at(x, y).id;
                let id = pick(existing, horizontal);
                city.grid_mut().set(x as i32, y as i32, Tile::natural(id));
            }
        }
        self
    }

    pub fn with_treasury(mut self, treasury: i64) -> Self {
        self.city_mut().budget.treasury = treasury.max(0);
        self
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.city_mut().set_speed(speed);
        self
    }

    pub fn with_tax_rate(mut self, rate: u8) -> Self {
        self.city_mut().set_tax_rate(rate);
        self
    }

    // -----------------------------------------------------------------------
    // Simulation control
    // -----------------------------------------------------------------------

    /// Run the `FixedUpdate` schedule `n` times: `n` host calls into the city.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Run `n` full 16-phase cycles at fast speed.
    pub fn tick_cycles(&mut self, n: u32) {
        self.tick(n * PHASE_COUNT as u32);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn city(&self) -> &City {
        self.app.world().resource::<City>()
    }

    pub fn city_mut(&mut self) -> Mut<'_, City> {
        self.app.world_mut().resource_mut::<City>()
    }

    pub fn grid(&self) -> &TileGrid {
        self.city().grid()
    }

    pub fn population(&self) -> u64 {
        self.city().population()
    }

    pub fn funds(&self) -> i64 {
        self.city().funds()
    }

    pub fn state_hash(&self) -> u64 {
        compute_state_hash(self.city())
    }

    pub fn notifications(&self) -> &NotificationLog {
        self.app.world().resource::<NotificationLog>()
    }

    pub fn notification_count(&self, priority: NotificationPriority) -> usize {
        self.notifications().count(priority)
    }

    /// Queue an engine event as if the simulation had raised it.
    pub fn raise(&mut self, event: SimEvent) {
        self.city_mut().events.push(event);
    }

    pub fn stage_at(&self, x: usize, y: usize) -> u8 {
        tiles::stage_of(self.grid().at(x, y).id)
    }

    pub fn zone_centers(&self, kind: ZoneKind) -> usize {
        self.grid()
            .count_where(|t| t.is_zone_center() && tiles::zone_kind(t.id) == Some(kind))
    }

    pub fn powered_tiles(&self) -> usize {
        self.grid().count_where(|t| t.is_powered())
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_powered(&self, x: usize, y: usize) {
        assert!(
            self.grid().at(x, y).is_powered(),
            "expected tile ({x}, {y}) to be powered"
        );
    }

    pub fn assert_unpowered(&self, x: usize, y: usize) {
        assert!(
            !self.grid().at(x, y).is_powered(),
            "expected tile ({x}, {y}) to be unpowered"
        );
    }

    pub fn assert_funds_between(&self, min: i64, max: i64) {
        let funds = self.funds();
        assert!(
            (min..=max).contains(&funds),
            "treasury {funds} outside {min}..={max}"
        );
    }

    pub fn assert_zone_flags_consistent(&self) {
        let grid = self.grid();
        for y in 0..grid.height {
            for x in 0..grid.width {
                let tile = grid.at(x, y);
                let Some((cx, cy)) = tiles::center_of(tile.id, x as i32, y as i32) else {
                    assert!(!tile.is_zone_center(), "non-zone tile ({x}, {y}) flagged ZONE");
                    continue;
                };
                let is_center = (cx, cy) == (x as i32, y as i32);
                assert_eq!(
                    tile.is_zone_center(),
                    is_center,
                    "ZONE flag at ({x}, {y}) disagrees with its block offset"
                );
            }
        }
    }
}
