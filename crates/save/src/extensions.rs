// ---------------------------------------------------------------------------
// Extension map: keyed Saveable blobs after the fixed snapshot layout
// ---------------------------------------------------------------------------
//
// Wire format (big-endian):
//   u32 entry count
//   per entry: u16 key length, key (UTF-8), u32 blob length, blob
//
// Entries are written in key order. Unknown keys are kept on load and ignored.

use std::collections::BTreeMap;

use simulation::Saveable;

use crate::save_error::SaveError;
use crate::snapshot::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionMap {
    pub entries: BTreeMap<String, Vec<u8>>,
}

impl ExtensionMap {
    /// Store `value` under its key, unless it asks to be skipped.
    pub fn insert<T: Saveable>(&mut self, value: &T) {
        if let Some(bytes) = value.save_to_bytes() {
            self.entries.insert(T::SAVE_KEY.to_string(), bytes);
        }
    }

    /// Decode the value stored under `T`'s key, or `None` if absent.
    pub fn restore<T: Saveable>(&self) -> Option<T> {
        self.entries
            .get(T::SAVE_KEY)
            .map(|bytes| T::load_from_bytes(bytes))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for (key, blob) in &self.entries {
            out.extend_from_slice(&(key.len() as u16).to_be_bytes());
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(&(blob.len() as u32).to_be_bytes());
            out.extend_from_slice(blob);
        }
    }

    /// Parse the map from the rest of a snapshot. An empty remainder is an
    /// empty map.
    pub fn read(reader: &mut Reader<'_>) -> Result<Self, SaveError> {
        let mut map = Self::default();
        if reader.is_empty() {
            return Ok(map);
        }
        let count = reader.u32()?;
        for _ in 0..count {
            let key_len = reader.u16()? as usize;
            let key = std::str::from_utf8(reader.take(key_len)?)
                .map_err(|e| SaveError::Decode(format!("extension key: {e}")))?
                .to_string();
            let blob_len = reader.u32()? as usize;
            let blob = reader.take(blob_len)?.to_vec();
            map.entries.insert(key, blob);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::sim_params::{Difficulty, SimParams};
    use simulation::sim_rng::SimRng;

    #[test]
    fn test_default_params_are_skipped() {
        let mut map = ExtensionMap::default();
        map.insert(&SimParams::default());
        assert!(map.entries.is_empty());
        assert!(map.restore::<SimParams>().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let params = SimParams {
            difficulty: Difficulty::Hard,
            ..SimParams::default()
        };
        let mut map = ExtensionMap::default();
        map.insert(&params);
        map.insert(&SimRng::from_seed_u64(5));

        let mut bytes = Vec::new();
        map.write(&mut bytes);
        let parsed = ExtensionMap::read(&mut Reader::new(&bytes)).expect("parse");
        assert_eq!(parsed, map);
        assert_eq!(parsed.restore::<SimParams>(), Some(params));
    }

    #[test]
    fn test_missing_map_reads_as_empty() {
        let parsed = ExtensionMap::read(&mut Reader::new(&[])).expect("parse");
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn test_truncated_blob_is_an_error() {
        let mut map = ExtensionMap::default();
        map.entries.insert("k".into(), vec![1, 2, 3, 4]);
        let mut bytes = Vec::new();
        map.write(&mut bytes);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            ExtensionMap::read(&mut Reader::new(&bytes)),
            Err(SaveError::Truncated { .. })
        ));
    }
}
