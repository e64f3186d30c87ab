use crate::tiles::{self, ZoneKind};

use super::{build, ZoneContext};

pub(super) fn process(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize) {
    let tile = ctx.grid.at(x, y);
    let powered = tile.is_powered();
    ctx.counts.count_zone(kind, 0, powered);

    match kind {
        ZoneKind::FireStation => {
            let effect = station_effect(ctx, ctx.effectiveness.fire, powered);
            ctx.maps.fire_raw.add_world(x, y, effect);
        }
        ZoneKind::PoliceStation => {
            let effect = station_effect(ctx, ctx.effectiveness.police, powered);
            ctx.maps.police_raw.add_world(x, y, effect);
        }
        ZoneKind::Stadium => {
            let full = tile.id >= tiles::FULL_STADIUM_BASE;
            if full != powered {
                build::set_stadium_full(ctx.grid, x as i32, y as i32, powered);
            }
        }
        _ => {}
    }
}

/// Coverage stamped by a station: scaled by its funding, halved without power.
fn station_effect(ctx: &ZoneContext<'_>, effectiveness: u8, powered: bool) -> i32 {
    let effect = ctx.params.station_effect as i32 * effectiveness as i32 / 100;
    if powered {
        effect
    } else {
        effect / 2
    }
}
