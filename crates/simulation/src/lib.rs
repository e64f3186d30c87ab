use bevy::prelude::*;

pub mod budget;
pub mod census;
pub mod city;
pub mod clock;
pub mod config;
pub mod density;
pub mod diffusion;
pub mod disasters;
pub mod evaluation;
pub mod fire;
pub mod grid;
pub mod notifications;
pub mod observation;
pub mod power;
mod scheduler;
pub mod sim_params;
pub mod sim_rng;
pub mod state_hash;
pub mod terrain;
pub mod tiles;
pub mod traffic;
pub mod valves;
pub mod zones;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use city::City;

use notifications::{publish_notifications, NotificationLog, SimNotification};

// ---------------------------------------------------------------------------
// Saveable trait for the extension map save pattern
// ---------------------------------------------------------------------------

/// State that rides along in a save file's extension map.
///
/// Each implementor provides its own serialization logic, so adding a new
/// extension needs no change to the fixed snapshot layout.
pub trait Saveable: Default + Send + Sync + 'static {
    /// Unique key for this value in the save file's extension map.
    /// Must be stable across versions (used for deserialization lookup).
    const SAVE_KEY: &'static str;

    /// Serialize to bytes.
    /// Return `None` to skip saving (e.g. when the value is at its default state).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Deserialize from bytes, returning the restored value.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode bytes via `bitcode::decode`, logging a warning and returning `Default` on failure.
/// Use this in `Saveable::load_from_bytes` implementations to surface decode errors.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Hosts a [`City`] inside a Bevy `App`: one city step attempt per
/// `FixedUpdate`, then engine events are published.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<City>()
            .init_resource::<NotificationLog>()
            .add_event::<SimNotification>()
            .add_systems(
                FixedUpdate,
                (run_simulation_tick, publish_notifications).chain(),
            );
    }
}

pub fn run_simulation_tick(mut city: ResMut<City>) {
    city.tick();
}
