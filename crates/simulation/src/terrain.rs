use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::config::{TERRAIN_FREQUENCY, WATER_THRESHOLD, WOODS_THRESHOLD};
use crate::grid::{Tile, TileGrid};
use crate::tiles;

/// Paint rivers and woods onto the dirt tiles of `grid`. Anything already
/// built is left alone.
pub fn generate_terrain(grid: &mut TileGrid, seed: i32) {
    let mut noise = FastNoiseLite::with_seed(seed);
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(TERRAIN_FREQUENCY));

    for y in 0..grid.height {
        for x in 0..grid.width {
            if grid.at(x, y).id != tiles::DIRT {
                continue;
            }
            let raw = noise.get_noise_2d(x as f32, y as f32);
            let elevation = (raw + 1.0) * 0.5; // normalize to 0..1
            let id = if elevation < WATER_THRESHOLD {
                tiles::RIVER
            } else if elevation > WOODS_THRESHOLD {
                tiles::WOODS_LOW
            } else {
                continue;
            };
            grid.set(x as i32, y as i32, Tile::natural(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WORLD_H, WORLD_W};

    #[test]
    fn test_water_and_woods_generation() {
        let mut grid = TileGrid::new(WORLD_W, WORLD_H);
        generate_terrain(&mut grid, 42);
        let water = grid.count_where(|t| tiles::is_water(t.id));
        let woods = grid.count_where(|t| tiles::is_woods(t.id));
        assert!(water > 0, "should have some water cells");
        assert!(woods > 0, "should have some woods");
        assert!(water + woods < WORLD_W * WORLD_H, "should leave buildable land");
        assert_eq!(grid.count_where(|t| t.is_zone_center()), 0);
    }

    #[test]
    fn test_deterministic() {
        let mut g1 = TileGrid::new(WORLD_W, WORLD_H);
        let mut g2 = TileGrid::new(WORLD_W, WORLD_H);
        generate_terrain(&mut g1, 42);
        generate_terrain(&mut g2, 42);
        assert_eq!(g1.tiles, g2.tiles);

        let mut g3 = TileGrid::new(WORLD_W, WORLD_H);
        generate_terrain(&mut g3, 7);
        assert_ne!(g1.tiles, g3.tiles);
    }

    #[test]
    fn test_existing_tiles_survive() {
        let mut grid = TileGrid::new(WORLD_W, WORLD_H);
        let road = Tile::natural(tiles::road_tile(0, tiles::SHAPE_HROAD));
        for x in 0..WORLD_W {
            grid.set(x as i32, 50, road);
        }
        generate_terrain(&mut grid, 42);
        assert!((0..WORLD_W).all(|x| grid.at(x, 50) == road));
    }
}
