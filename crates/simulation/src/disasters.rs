//! Disaster dispatch.
//!
//! Scripted or random catastrophes are owned by the host. The city calls the
//! installed [`Disasters`] hook once per cycle, in phase 15, after fires have
//! been processed.

use crate::fire::{self, Ignition};
use crate::grid::TileGrid;
use crate::notifications::SimEvent;
use crate::sim_rng::SimRng;

pub trait Disasters: Send + Sync {
    /// Apply whatever this cycle brings. Any randomness must come from `rng`
    /// so seeded runs stay reproducible.
    fn dispatch(&mut self, grid: &mut TileGrid, rng: &mut SimRng, events: &mut Vec<SimEvent>);
}

/// Sets a random tile alight, one cycle in `chance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomFires {
    pub chance: u32,
}

impl Default for RandomFires {
    fn default() -> Self {
        Self { chance: 480 }
    }
}

impl Disasters for RandomFires {
    fn dispatch(&mut self, grid: &mut TileGrid, rng: &mut SimRng, events: &mut Vec<SimEvent>) {
        if !rng.one_in(self.chance) {
            return;
        }
        let x = rng.below(grid.width as u32) as usize;
        let y = rng.below(grid.height as u32) as usize;
        match fire::ignite(grid, rng, x as i32, y as i32) {
            Ignition::Nothing => {}
            Ignition::Burning => events.push(SimEvent::Disaster { x, y }),
            Ignition::Razed { cx, cy } => {
                events.push(SimEvent::Disaster { x, y });
                events.push(SimEvent::ZoneBurned { x: cx, y: cy });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::tiles;

    #[test]
    fn test_certain_fire_on_forest() {
        let mut grid = TileGrid::new(8, 8);
        for tile in grid.tiles.iter_mut() {
            *tile = Tile::natural(tiles::WOODS_LOW);
        }
        let mut rng = SimRng::from_seed_u64(4);
        let mut events = Vec::new();
        let mut hook = RandomFires { chance: 1 };
        hook.dispatch(&mut grid, &mut rng, &mut events);
        assert_eq!(grid.count_where(|t| tiles::is_fire(t.id)), 1);
        assert!(matches!(events.as_slice(), [SimEvent::Disaster { .. }]));
    }

    #[test]
    fn test_bare_dirt_never_burns() {
        let mut grid = TileGrid::new(8, 8);
        let mut rng = SimRng::default();
        let mut events = Vec::new();
        let mut hook = RandomFires { chance: 1 };
        for _ in 0..50 {
            hook.dispatch(&mut grid, &mut rng, &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(grid.count_where(|t| t != Tile::DIRT), 0);
    }

    #[test]
    fn test_hook_is_object_safe() {
        let mut hooks: Vec<Box<dyn Disasters>> = vec![Box::new(RandomFires::default())];
        let mut grid = TileGrid::new(4, 4);
        let mut rng = SimRng::default();
        let mut events = Vec::new();
        for hook in hooks.iter_mut() {
            hook.dispatch(&mut grid, &mut rng, &mut events);
        }
    }
}
