use crate::density::{Map, MapValue};

/// One pass of 5-point averaging: each cell becomes the mean of itself and its
/// in-bounds 4-neighbors. Uniform fields and the all-zero field are fixed points.
pub fn smooth_once<T: MapValue>(map: &Map<T>) -> Map<T> {
    let mut out = map.clone();
    for y in 0..map.height {
        for x in 0..map.width {
            let mut sum = map.get(x, y).widen();
            let mut count = 1;
            for (dx, dy) in [(0i32, -1i32), (1, 0), (0, 1), (-1, 0)] {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if map.in_bounds(nx, ny) {
                    sum += map.get(nx as usize, ny as usize).widen();
                    count += 1;
                }
            }
            out.set(x, y, T::narrow(sum / count));
        }
    }
    out
}

pub fn smooth<T: MapValue>(map: &mut Map<T>, passes: usize) {
    for _ in 0..passes {
        *map = smooth_once(map);
    }
}
