use super::*;
use crate::grid::{Tile, TileFlags};

struct Fixture {
    grid: TileGrid,
    maps: DensityMaps,
    rng: SimRng,
    params: SimParams,
    valves: DemandValves,
    effectiveness: Effectiveness,
    counts: CensusCounts,
    ledger: ZoneLedger,
    router: TrafficRouter,
    civic: CivicNeed,
    events: Vec<SimEvent>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            grid: TileGrid::new(40, 40),
            maps: DensityMaps::new(40, 40),
            rng: SimRng::from_seed_u64(11),
            params: SimParams::default(),
            valves: DemandValves::default(),
            effectiveness: Effectiveness::default(),
            counts: CensusCounts::default(),
            ledger: ZoneLedger::default(),
            router: TrafficRouter::default(),
            civic: CivicNeed::default(),
            events: Vec::new(),
        }
    }

    /// A zone at `stage`, optionally powered.
    fn zone(&mut self, kind: ZoneKind, x: i32, y: i32, stage: u8, powered: bool) {
        build::stamp_zone(&mut self.grid, kind, x, y).unwrap();
        build::set_center_stage(&mut self.grid, kind, x, y, stage);
        if powered {
            self.grid.get_mut(x, y).unwrap().flags.insert(TileFlags::POWERED);
        }
    }

    fn visit(&mut self, x: usize, y: usize) {
        let mut ctx = ZoneContext {
            grid: &mut self.grid,
            maps: &mut self.maps,
            rng: &mut self.rng,
            params: &self.params,
            valves: &self.valves,
            effectiveness: self.effectiveness,
            counts: &mut self.counts,
            ledger: &mut self.ledger,
            router: &mut self.router,
            civic: &mut self.civic,
            events: &mut self.events,
        };
        process_zone(&mut ctx, x, y);
    }

    fn stage_at(&self, x: i32, y: i32) -> u8 {
        tiles::stage_of(self.grid.get(x, y).unwrap().id)
    }

    fn kind_at(&self, x: i32, y: i32) -> Option<ZoneKind> {
        tiles::zone_kind(self.grid.get(x, y).unwrap().id)
    }

    /// Pleasant, powered-up conditions for housing.
    fn prime_residential(&mut self) {
        self.maps.land_value.fill(200);
        self.valves.residential = 1000;
    }
}

fn assert_footprint_intact(grid: &TileGrid, kind: ZoneKind, cx: i32, cy: i32) {
    let centers = kind
        .footprint(cx, cy)
        .filter(|(x, y, _)| grid.get(*x, *y).is_some_and(|t| t.is_zone_center()))
        .count();
    assert_eq!(centers, 1, "zone at ({cx}, {cy}) must have one center");
    for (x, y, _) in kind.footprint(cx, cy) {
        let id = grid.get(x, y).expect("footprint inside grid").id;
        assert_eq!(tiles::center_of(id, x, y), Some((cx, cy)));
    }
}

#[test]
fn test_growth_threshold_rises_with_stage() {
    assert_eq!(growth_threshold(0), 8);
    assert_eq!(growth_threshold(1), 32);
    assert_eq!(growth_threshold(2), 72);
}

#[test]
fn test_residential_grows_one_stage_after_eight_visits() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 10, 10, 0, true);
    f.prime_residential();

    for _ in 0..7 {
        f.visit(10, 10);
    }
    assert_eq!(f.stage_at(10, 10), 0);
    assert_eq!(f.ledger.get(f.grid.index(10, 10)).unwrap().growth, 7);

    f.visit(10, 10);
    assert_eq!(f.stage_at(10, 10), 1);
    assert_eq!(f.ledger.get(f.grid.index(10, 10)).unwrap().growth, 0);
    assert!(f.grid.get(10, 10).unwrap().is_powered());
    assert_footprint_intact(&f.grid, ZoneKind::Residential, 10, 10);
}

#[test]
fn test_visit_is_counted_and_trip_attempted() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 5, 10, 2, true);
    f.zone(ZoneKind::Commercial, 10, 10, 0, false);
    for x in 7..=8 {
        f.grid.set(x, 10, Tile::natural(tiles::road_tile(0, tiles::SHAPE_HROAD)));
    }
    f.prime_residential();

    f.visit(5, 10);
    assert_eq!(f.counts.residential_pop, 16);
    assert_eq!(f.counts.powered_zones, 1);
    assert_eq!(f.counts.trips_routed, 1);
    assert_eq!(f.maps.traffic.at_world(7, 10), f.params.traffic_increment);
    assert_eq!(f.maps.traffic.at_world(8, 10), f.params.traffic_increment);

    // Unpowered zones do not trade.
    f.visit(10, 10);
    assert_eq!(f.counts.unpowered_zones, 1);
    assert_eq!(f.counts.trips_routed + f.counts.trips_failed, 1);
}

#[test]
fn test_unpowered_zone_regresses() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 10, 10, 2, false);
    f.prime_residential();
    f.visit(10, 10);
    assert_eq!(f.stage_at(10, 10), 1);
    f.visit(10, 10);
    assert_eq!(f.stage_at(10, 10), 0);
    assert_footprint_intact(&f.grid, ZoneKind::Residential, 10, 10);
}

#[test]
fn test_polluted_or_crime_ridden_zone_declines() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 10, 10, 3, true);
    f.zone(ZoneKind::Residential, 20, 20, 3, true);
    f.prime_residential();
    f.maps.pollution.set(5, 5, 200);
    f.maps.crime.set(10, 10, 220);
    f.visit(10, 10);
    f.visit(20, 20);
    assert_eq!(f.stage_at(10, 10), 2);
    assert_eq!(f.stage_at(20, 20), 2);
}

#[test]
fn test_weak_demand_shrinks_commercial() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Commercial, 10, 10, 1, true);
    f.maps.land_value.fill(200);
    f.valves.commercial = 0;
    // commercial_rate is zero everywhere: 0 * 16 - 2000 < 0.
    f.visit(10, 10);
    assert_eq!(f.stage_at(10, 10), 0);

    f.maps.commercial_rate.fill(200);
    for _ in 0..8 {
        f.visit(10, 10);
    }
    assert_eq!(f.stage_at(10, 10), 1);
}

#[test]
fn test_industry_follows_valve_only() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Industrial, 10, 10, 0, true);
    f.valves.industrial = 500;
    for _ in 0..8 {
        f.visit(10, 10);
    }
    assert_eq!(f.stage_at(10, 10), 1);

    f.valves.industrial = -500;
    f.visit(10, 10);
    assert_eq!(f.stage_at(10, 10), 0);
    // Industrial land has no value floor, so a vacant lot never crumbles.
    for _ in 0..100 {
        f.visit(10, 10);
    }
    assert_eq!(f.kind_at(10, 10), Some(ZoneKind::Industrial));
}

#[test]
fn test_vacant_worthless_zone_crumbles() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 10, 10, 0, false);
    for _ in 0..IDLE_VISITS_BEFORE_DECAY - 1 {
        f.visit(10, 10);
    }
    assert!(f.grid.get(10, 10).unwrap().is_zone_center());

    for _ in 0..200 {
        f.visit(10, 10);
    }
    assert_eq!(f.grid.count_where(|t| t.is_zone_center()), 0);
    assert_eq!(f.grid.count_where(|t| tiles::is_rubble(t.id)), 9);
    assert!(f.ledger.is_empty());
}

#[test]
fn test_vacant_lot_becomes_needed_hospital() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 10, 10, 0, true);
    f.prime_residential();
    f.civic.hospitals = 1;
    for _ in 0..8 {
        f.visit(10, 10);
    }
    assert_eq!(f.kind_at(10, 10), Some(ZoneKind::Hospital));
    assert_eq!(f.civic.hospitals, 0);
    assert!(f.grid.get(10, 10).unwrap().is_powered());
    assert_footprint_intact(&f.grid, ZoneKind::Hospital, 10, 10);
}

#[test]
fn test_surplus_church_reverts_to_housing() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Church, 10, 10, 0, false);
    f.civic.churches = -1;
    f.visit(10, 10);
    assert_eq!(f.counts.churches, 1);
    assert_eq!(f.kind_at(10, 10), Some(ZoneKind::Residential));
    assert_eq!(f.civic.churches, 0);

    f.zone(ZoneKind::Church, 20, 20, 0, false);
    f.visit(20, 20);
    assert_eq!(f.kind_at(20, 20), Some(ZoneKind::Church), "no surplus left");
}

#[test]
fn test_civic_need_from_counts() {
    let counts = CensusCounts {
        residential_pop: 600,
        hospitals: 1,
        churches: 4,
        ..CensusCounts::default()
    };
    let need = CivicNeed::from_counts(&counts);
    assert_eq!(need.hospitals, 1);
    assert_eq!(need.churches, -2);
}

#[test]
fn test_stations_stamp_scaled_coverage() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::FireStation, 10, 10, 0, true);
    f.zone(ZoneKind::PoliceStation, 20, 20, 0, false);
    f.effectiveness.police = 50;
    f.visit(10, 10);
    f.visit(20, 20);
    assert_eq!(f.maps.fire_raw.at_world(10, 10), 1000);
    assert_eq!(f.maps.police_raw.at_world(20, 20), 250);
    assert_eq!(f.counts.fire_stations, 1);
    assert_eq!(f.counts.police_stations, 1);
}

#[test]
fn test_stadium_fills_with_power() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Stadium, 10, 10, 0, true);
    f.visit(10, 10);
    assert!(f.grid.get(10, 10).unwrap().id >= tiles::FULL_STADIUM_BASE);
    assert_footprint_intact(&f.grid, ZoneKind::Stadium, 10, 10);

    f.grid.get_mut(10, 10).unwrap().flags.remove(TileFlags::POWERED);
    f.visit(10, 10);
    assert!(f.grid.get(10, 10).unwrap().id < tiles::FULL_STADIUM_BASE);
}

#[test]
fn test_footprints_survive_long_growth() {
    let mut f = Fixture::new();
    let spots = [(1, 1), (38, 38), (1, 38), (20, 20)];
    for (x, y) in spots {
        f.zone(ZoneKind::Residential, x, y, 0, true);
    }
    f.prime_residential();
    for round in 0..400 {
        // Swing the valve so zones move both ways.
        f.valves.residential = if (round / 50) % 2 == 0 { 1000 } else { -2000 };
        if f.valves.residential < 0 {
            f.maps.land_value.fill(40);
        } else {
            f.maps.land_value.fill(200);
        }
        for (x, y) in spots {
            f.visit(x as usize, y as usize);
        }
    }
    for (x, y) in spots {
        assert_eq!(f.kind_at(x, y), Some(ZoneKind::Residential));
        assert_footprint_intact(&f.grid, ZoneKind::Residential, x, y);
    }
    assert_eq!(f.grid.count_where(|t| t.is_zone_center()), spots.len());
}

#[test]
fn test_non_center_and_out_of_range_are_ignored() {
    let mut f = Fixture::new();
    f.zone(ZoneKind::Residential, 10, 10, 0, true);
    f.visit(9, 9);
    f.visit(400, 400);
    assert_eq!(f.counts, CensusCounts::default());
}
