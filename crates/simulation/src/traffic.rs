//! Trip generation.
//!
//! A zone that wants to trade looks for a road next to its footprint and then
//! drives a bounded random walk along road and rail tiles until it is next to
//! a building of the complementary category. Dead ends back up to the most
//! recent checkpoint instead of restarting. Only successful trips leave a
//! trace on the traffic map.

use serde::{Deserialize, Serialize};

use crate::config::MAX_TRAFFIC_DISTANCE;
use crate::density::Map;
use crate::grid::{Direction, TileGrid};
use crate::sim_params::SimParams;
use crate::sim_rng::SimRng;
use crate::tiles::{self, Category, ZoneKind};

/// Steps skipped when resuming from a checkpoint.
const BACKTRACK_PENALTY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripOutcome {
    Routed,
    /// No road or rail next to the footprint.
    NoRoad,
    /// Ran out of steps or checkpoints.
    Failed,
}

impl TripOutcome {
    pub fn is_success(self) -> bool {
        self == TripOutcome::Routed
    }
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: (i32, i32),
    last: Option<Direction>,
    path_len: usize,
}

/// Reusable walk buffers.
#[derive(Debug, Clone, Default)]
pub struct TrafficRouter {
    path: Vec<(i32, i32)>,
    checkpoints: Vec<Checkpoint>,
    /// Cells that reached the cap during the last successful trip.
    pub peaks: Vec<(usize, usize)>,
}

/// Whether a tile at a trip's end satisfies the origin's category.
pub fn is_destination(origin: Category, id: u16) -> bool {
    match (origin, tiles::category(id)) {
        (Category::Residential, Some(Category::Commercial | Category::Industrial)) => true,
        (Category::Commercial | Category::Industrial, Some(Category::Residential)) => true,
        _ => false,
    }
}

impl TrafficRouter {
    /// Try one trip from the zone centered on `(cx, cy)`.
    #[allow(clippy::too_many_arguments)]
    pub fn route(
        &mut self,
        grid: &TileGrid,
        traffic: &mut Map<u8>,
        rng: &mut SimRng,
        params: &SimParams,
        kind: ZoneKind,
        cx: i32,
        cy: i32,
    ) -> TripOutcome {
        self.path.clear();
        self.checkpoints.clear();
        self.peaks.clear();

        let Some(start) = find_road(grid, kind, cx, cy) else {
            return TripOutcome::NoRoad;
        };
        if !self.walk(grid, rng, kind.category(), start) {
            return TripOutcome::Failed;
        }

        for &(x, y) in &self.path {
            if !grid.get(x, y).is_some_and(|t| tiles::is_road(t.id)) {
                continue;
            }
            let (wx, wy) = (x as usize, y as usize);
            let before = traffic.at_world(wx, wy);
            let level = before as u32 + params.traffic_increment as u32;
            let capped = level.min(params.traffic_cap as u32) as u8;
            traffic.set(wx / traffic.scale, wy / traffic.scale, capped);
            if capped >= params.traffic_cap && before < params.traffic_cap && !self.peaks.contains(&(wx, wy)) {
                self.peaks.push((wx, wy));
            }
        }
        TripOutcome::Routed
    }

    fn walk(&mut self, grid: &TileGrid, rng: &mut SimRng, origin: Category, start: (i32, i32)) -> bool {
        let mut pos = start;
        let mut last: Option<Direction> = None;
        let mut dist = 0u32;
        self.path.push(pos);

        while dist < MAX_TRAFFIC_DISTANCE {
            if destination_adjacent(grid, origin, pos) {
                return true;
            }
            match next_step(grid, rng, pos, last) {
                Some(dir) => {
                    let (dx, dy) = dir.offset();
                    pos = (pos.0 + dx, pos.1 + dy);
                    last = Some(dir);
                    dist += 1;
                    self.path.push(pos);
                    if dist % 2 == 1 {
                        self.checkpoints.push(Checkpoint {
                            pos,
                            last,
                            path_len: self.path.len(),
                        });
                    }
                }
                None => {
                    let Some(checkpoint) = self.checkpoints.pop() else {
                        return false;
                    };
                    pos = checkpoint.pos;
                    last = checkpoint.last;
                    self.path.truncate(checkpoint.path_len);
                    dist += BACKTRACK_PENALTY;
                }
            }
        }
        destination_adjacent(grid, origin, pos)
    }
}

/// First road or rail tile around the footprint: the ring touching it, then the
/// ring one tile further out. Corners are skipped.
pub fn find_road(grid: &TileGrid, kind: ZoneKind, cx: i32, cy: i32) -> Option<(i32, i32)> {
    let size = kind.size() as i32;
    let (ox, oy) = kind.footprint_origin(cx, cy);
    for gap in 1..=2 {
        let lo = -(gap - 1);
        let hi = size + gap - 1;
        let ring = (lo..hi)
            .map(|i| (ox + i, oy - gap))
            .chain((lo..hi).map(|i| (ox + size - 1 + gap, oy + i)))
            .chain((lo..hi).map(|i| (ox + i, oy + size - 1 + gap)))
            .chain((lo..hi).map(|i| (ox - gap, oy + i)));
        for (x, y) in ring {
            if grid.get(x, y).is_some_and(|t| tiles::is_traversable(t.id)) {
                return Some((x, y));
            }
        }
    }
    None
}

fn destination_adjacent(grid: &TileGrid, origin: Category, (x, y): (i32, i32)) -> bool {
    Direction::ALL.iter().any(|dir| {
        let (dx, dy) = dir.offset();
        grid.get(x + dx, y + dy)
            .is_some_and(|t| is_destination(origin, t.id))
    })
}

/// Random rotation of the four directions, never reversing the last move.
fn next_step(
    grid: &TileGrid,
    rng: &mut SimRng,
    (x, y): (i32, i32),
    last: Option<Direction>,
) -> Option<Direction> {
    let start = rng.below(4) as usize;
    (0..4)
        .map(|i| Direction::from_index(start + i))
        .filter(|dir| last.map(Direction::reverse) != Some(*dir))
        .find(|dir| {
            let (dx, dy) = dir.offset();
            grid.get(x + dx, y + dy)
                .is_some_and(|t| tiles::is_traversable(t.id))
        })
}

/// Phase-10 decay of the traffic map. Returns the average over busy cells.
pub fn decay(traffic: &mut Map<u8>) -> u32 {
    let (mut sum, mut count) = (0u32, 0u32);
    for cell in traffic.cells.iter_mut() {
        *cell = match *cell {
            v if v > 200 => v - 34,
            v if v > 24 => v - 24,
            _ => 0,
        };
        if *cell > 0 {
            sum += *cell as u32;
            count += 1;
        }
    }
    if count == 0 {
        0
    } else {
        sum / count
    }
}

/// Road layer that matches the traffic density under it.
pub fn layer_for_density(density: u8) -> u16 {
    match density {
        0..64 => 0,
        64..192 => tiles::LIGHT_TRAFFIC_LAYER,
        _ => tiles::HEAVY_TRAFFIC_LAYER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::HALF_SCALE;
    use crate::grid::Tile;
    use crate::zones::build;

    fn road(grid: &mut TileGrid, x: i32, y: i32) {
        grid.set(x, y, Tile::natural(tiles::road_tile(0, tiles::SHAPE_HROAD)));
    }

    fn setup() -> (TileGrid, Map<u8>, SimRng, SimParams) {
        let grid = TileGrid::new(40, 40);
        let traffic = Map::covering(40, 40, HALF_SCALE);
        (grid, traffic, SimRng::from_seed_u64(3), SimParams::default())
    }

    #[test]
    fn test_no_road_fails_without_trace() {
        let (mut grid, mut traffic, mut rng, params) = setup();
        build::stamp_zone(&mut grid, ZoneKind::Residential, 10, 10).unwrap();
        build::stamp_zone(&mut grid, ZoneKind::Commercial, 14, 10).unwrap();
        let mut router = TrafficRouter::default();
        for _ in 0..20 {
            let outcome = router.route(&grid, &mut traffic, &mut rng, &params, ZoneKind::Residential, 10, 10);
            assert_eq!(outcome, TripOutcome::NoRoad);
        }
        assert!(traffic.is_all(0));
    }

    #[test]
    fn test_straight_road_reaches_commercial() {
        let (mut grid, mut traffic, mut rng, params) = setup();
        build::stamp_zone(&mut grid, ZoneKind::Residential, 5, 10).unwrap();
        build::stamp_zone(&mut grid, ZoneKind::Commercial, 20, 10).unwrap();
        for x in 7..=18 {
            road(&mut grid, x, 10);
        }
        let mut router = TrafficRouter::default();
        let outcome = router.route(&grid, &mut traffic, &mut rng, &params, ZoneKind::Residential, 5, 10);
        assert!(outcome.is_success());
        // Both road tiles under a half cell count.
        assert_eq!(traffic.at_world(7, 10), params.traffic_increment);
        assert_eq!(traffic.at_world(12, 10), params.traffic_increment * 2);
        assert!(traffic.at_world(5, 30) == 0);
    }

    #[test]
    fn test_dead_end_road_fails_and_leaves_map_untouched() {
        let (mut grid, mut traffic, mut rng, params) = setup();
        build::stamp_zone(&mut grid, ZoneKind::Industrial, 5, 10).unwrap();
        for x in 7..=15 {
            road(&mut grid, x, 10);
        }
        let mut router = TrafficRouter::default();
        for _ in 0..10 {
            let outcome = router.route(&grid, &mut traffic, &mut rng, &params, ZoneKind::Industrial, 5, 10);
            assert_eq!(outcome, TripOutcome::Failed);
        }
        assert!(traffic.is_all(0));
    }

    #[test]
    fn test_traffic_caps_and_reports_peak() {
        let (mut grid, mut traffic, mut rng, params) = setup();
        build::stamp_zone(&mut grid, ZoneKind::Commercial, 5, 10).unwrap();
        build::stamp_zone(&mut grid, ZoneKind::Residential, 10, 10).unwrap();
        road(&mut grid, 7, 10);
        road(&mut grid, 8, 10);
        let mut router = TrafficRouter::default();
        let mut peaks = Vec::new();
        for _ in 0..10 {
            router.route(&grid, &mut traffic, &mut rng, &params, ZoneKind::Commercial, 5, 10);
            peaks.extend(router.peaks.iter().copied());
        }
        assert_eq!(traffic.at_world(7, 10), params.traffic_cap);
        assert_eq!(traffic.at_world(8, 10), params.traffic_cap);
        // Each road tile is reported once, on the trip that hit the cap.
        assert_eq!(peaks, vec![(7, 10), (8, 10)]);
    }

    #[test]
    fn test_find_road_second_ring() {
        let (mut grid, ..) = setup();
        build::stamp_zone(&mut grid, ZoneKind::Residential, 10, 10).unwrap();
        road(&mut grid, 13, 12);
        assert_eq!(find_road(&grid, ZoneKind::Residential, 10, 10), Some((13, 12)));
        let mut far = TileGrid::new(40, 40);
        road(&mut far, 13, 10);
        assert_eq!(find_road(&far, ZoneKind::Residential, 10, 10), Some((13, 10)));
        let mut too_far = TileGrid::new(40, 40);
        road(&mut too_far, 14, 10);
        assert_eq!(find_road(&too_far, ZoneKind::Residential, 10, 10), None);
        let mut corner = TileGrid::new(40, 40);
        road(&mut corner, 12, 12);
        road(&mut corner, 14, 14);
        assert_eq!(find_road(&corner, ZoneKind::Residential, 10, 10), None);
    }

    #[test]
    fn test_destination_categories() {
        let res = ZoneKind::Residential.center_tile(0);
        let com = ZoneKind::Commercial.center_tile(0);
        let ind = ZoneKind::Industrial.center_tile(0);
        assert!(is_destination(Category::Residential, com));
        assert!(is_destination(Category::Residential, ind));
        assert!(is_destination(Category::Industrial, res));
        assert!(!is_destination(Category::Commercial, ind));
        assert!(!is_destination(Category::Residential, tiles::HOSPITAL_BASE));
    }

    #[test]
    fn test_decay_steps() {
        let mut traffic = Map::<u8>::covering(8, 8, HALF_SCALE);
        traffic.set(0, 0, 240);
        traffic.set(1, 0, 100);
        traffic.set(2, 0, 20);
        let average = decay(&mut traffic);
        assert_eq!(traffic.get(0, 0), 206);
        assert_eq!(traffic.get(1, 0), 76);
        assert_eq!(traffic.get(2, 0), 0);
        assert_eq!(average, (206 + 76) / 2);
    }

    #[test]
    fn test_layer_for_density() {
        assert_eq!(layer_for_density(10), 0);
        assert_eq!(layer_for_density(100), tiles::LIGHT_TRAFFIC_LAYER);
        assert_eq!(layer_for_density(230), tiles::HEAVY_TRAFFIC_LAYER);
    }
}
