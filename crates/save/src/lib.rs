//! Persistence boundary for a [`City`]: a fixed-layout, big-endian snapshot
//! wrapped in a checksummed file header.

mod extensions;
pub mod file_header;
pub mod save_error;
pub mod snapshot;

use std::path::Path;

use bevy::log::info;
use serde::{Deserialize, Serialize};

use simulation::clock::Calendar;
use simulation::City;

pub use extensions::ExtensionMap;
pub use file_header::{unwrap_header, wrap_with_header, FileHeader, UnwrapResult};
pub use save_error::SaveError;
use snapshot::{misc, Reader, HISTORY_BYTES};

/// What a load menu shows for a save without decoding the whole world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub year: u64,
    pub month: u64,
    pub treasury: i64,
    pub score: u32,
    pub compressed: bool,
}

/// Encode `city` into a complete save file.
pub fn save_city(city: &City, compress: bool) -> Result<Vec<u8>, SaveError> {
    let snapshot = snapshot::write_snapshot(city)?;
    Ok(wrap_with_header(&snapshot, compress))
}

/// Decode a save file, or a raw headerless snapshot, into a running city.
pub fn load_city(bytes: &[u8]) -> Result<City, SaveError> {
    let snapshot = unwrap_header(bytes)?.into_snapshot()?;
    snapshot::read_snapshot(&snapshot)
}

/// Read only the header and the misc record.
pub fn summarize(bytes: &[u8]) -> Result<SaveSummary, SaveError> {
    let unwrapped = unwrap_header(bytes)?;
    let compressed = matches!(&unwrapped, UnwrapResult::WithHeader { header, .. } if header.is_compressed());
    let snapshot = unwrapped.into_snapshot()?;

    let mut reader = Reader::new(&snapshot);
    reader.take(HISTORY_BYTES)?;
    let m = snapshot::read_misc(&mut reader)?;
    let calendar = Calendar {
        city_time: m[misc::CITY_TIME].max(0) as u64,
    };
    Ok(SaveSummary {
        year: calendar.year(),
        month: calendar.month(),
        treasury: ((m[misc::TREASURY_HI] as i64) << 32) | m[misc::TREASURY_LO] as u32 as i64,
        score: m[misc::CITY_SCORE].max(0) as u32,
        compressed,
    })
}

pub fn save_to_file(path: impl AsRef<Path>, city: &City, compress: bool) -> Result<(), SaveError> {
    let path = path.as_ref();
    let bytes = save_city(city, compress)?;
    std::fs::write(path, &bytes)?;
    info!("Saved city to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<City, SaveError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let city = load_city(&bytes)?;
    info!(
        "Loaded city from {}: year {}, population {}",
        path.display(),
        city.calendar.year(),
        city.population()
    );
    Ok(city)
}
