// ---------------------------------------------------------------------------
// file_header – Save file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (20 bytes, fixed-size, big-endian like the snapshot itself):
//   [0..4]   Magic bytes: "TCTY"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = payload is lz4-compressed)
//   [12..16] Uncompressed payload size (u32)
//   [16..20] xxHash32 checksum of the payload as stored
//
// On save: encode snapshot -> optionally compress -> prepend header
// On load: check magic -> validate checksum -> strip header -> decompress
// Headerless: if the first 4 bytes are not "TCTY", the whole buffer is a raw
// uncompressed snapshot.

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a tilecity save file.
pub const MAGIC: [u8; 4] = *b"TCTY";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Header layout version. Bumped when the header or snapshot layout changes.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Flag bit: the payload is lz4-compressed with a prepended size.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_be_bytes());
        out.extend_from_slice(&self.checksum.to_be_bytes());
    }
}

/// Wrap an encoded snapshot with a file header, compressing it first when
/// asked.
///
/// Returns bytes: [header (20 bytes)] ++ [payload].
pub fn wrap_with_header(data: &[u8], compress: bool) -> Vec<u8> {
    let compressed;
    let (payload, flags) = if compress {
        compressed = lz4_flex::compress_prepend_size(data);
        (compressed.as_slice(), FLAG_COMPRESSED)
    } else {
        (data, 0)
    };

    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags,
        uncompressed_size: data.len() as u32,
        checksum: xxh32(payload, XXHASH_SEED),
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write(&mut out);
    out.extend_from_slice(payload);
    out
}

/// Result of unwrapping a save file's bytes.
#[derive(Debug)]
pub enum UnwrapResult<'a> {
    /// File has a valid header; the payload bytes follow.
    WithHeader {
        header: FileHeader,
        payload: &'a [u8],
    },
    /// File has no header; the entire buffer is a raw snapshot.
    Headerless(&'a [u8]),
}

impl UnwrapResult<'_> {
    /// The snapshot bytes, decompressed if the header says so.
    pub fn into_snapshot(self) -> Result<Vec<u8>, SaveError> {
        match self {
            UnwrapResult::Headerless(bytes) => Ok(bytes.to_vec()),
            UnwrapResult::WithHeader { header, payload } if header.is_compressed() => {
                let data = lz4_flex::decompress_size_prepended(payload)
                    .map_err(|e| SaveError::Decompress(e.to_string()))?;
                if data.len() != header.uncompressed_size as usize {
                    return Err(SaveError::Decompress(format!(
                        "expected {} bytes after decompression, got {}",
                        header.uncompressed_size,
                        data.len()
                    )));
                }
                Ok(data)
            }
            UnwrapResult::WithHeader { payload, .. } => Ok(payload.to_vec()),
        }
    }
}

fn be_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and validate the file header from raw bytes.
///
/// # Errors
///
/// Returns an error if:
/// - The magic is present but the file is shorter than a header
/// - The header format version is from a newer build
/// - The checksum does not match (data corruption)
pub fn unwrap_header(bytes: &[u8]) -> Result<UnwrapResult<'_>, SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Ok(UnwrapResult::Headerless(bytes));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Truncated {
            needed: HEADER_SIZE,
            found: bytes.len(),
        });
    }

    let header = FileHeader {
        format_version: be_u32(bytes, 4),
        flags: be_u32(bytes, 8),
        uncompressed_size: be_u32(bytes, 12),
        checksum: be_u32(bytes, 16),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            found: computed,
        });
    }

    Ok(UnwrapResult::WithHeader { header, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap_roundtrip() {
        let data = b"hello world save data";
        let wrapped = wrap_with_header(data, false);

        assert_eq!(&wrapped[..4], b"TCTY");
        assert_eq!(wrapped.len(), HEADER_SIZE + data.len());

        match unwrap_header(&wrapped).expect("unwrap should succeed") {
            UnwrapResult::WithHeader { header, payload } => {
                assert_eq!(header.format_version, HEADER_FORMAT_VERSION);
                assert!(!header.is_compressed());
                assert_eq!(header.uncompressed_size, data.len() as u32);
                assert_eq!(payload, data);
            }
            UnwrapResult::Headerless(_) => panic!("expected WithHeader"),
        }
    }

    #[test]
    fn test_header_fields_are_big_endian() {
        let wrapped = wrap_with_header(&[0u8; 258], false);
        assert_eq!(&wrapped[4..8], &[0, 0, 0, 1]);
        assert_eq!(&wrapped[12..16], &[0, 0, 1, 2]);
    }

    #[test]
    fn test_compressed_roundtrip() {
        let data: Vec<u8> = (0..10_000).map(|i| (i / 100) as u8).collect();
        let wrapped = wrap_with_header(&data, true);
        assert!(wrapped.len() < data.len(), "repetitive data should shrink");

        let result = unwrap_header(&wrapped).expect("unwrap should succeed");
        if let UnwrapResult::WithHeader { header, .. } = &result {
            assert!(header.is_compressed());
            assert_eq!(header.uncompressed_size, 10_000);
        } else {
            panic!("expected WithHeader");
        }
        assert_eq!(result.into_snapshot().expect("decompress"), data);
    }

    #[test]
    fn test_headerless_detection() {
        let data = b"\x00\x01\x02\x03raw snapshot";
        match unwrap_header(data).expect("unwrap should succeed") {
            UnwrapResult::Headerless(payload) => assert_eq!(payload, data.as_slice()),
            UnwrapResult::WithHeader { .. } => panic!("expected Headerless"),
        }
        assert!(matches!(
            unwrap_header(b"").expect("empty is headerless"),
            UnwrapResult::Headerless(_)
        ));
    }

    #[test]
    fn test_corrupted_checksum_detected() {
        let mut wrapped = wrap_with_header(b"test payload", false);
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;

        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(matches!(err, SaveError::ChecksumMismatch { .. }), "{err}");
    }

    #[test]
    fn test_future_header_version_rejected() {
        let mut wrapped = wrap_with_header(b"test payload", false);
        wrapped[4..8].copy_from_slice(&999u32.to_be_bytes());

        match unwrap_header(&wrapped).unwrap_err() {
            SaveError::VersionMismatch { found, .. } => assert_eq!(found, 999),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_header_detected() {
        let err = unwrap_header(b"TCTY\x00\x00").unwrap_err();
        assert!(matches!(
            err,
            SaveError::Truncated {
                needed: HEADER_SIZE,
                found: 6
            }
        ));
    }

    #[test]
    fn test_corrupt_compressed_payload_is_an_error() {
        // Valid header and checksum over a payload that is not lz4.
        let mut junk = [0xFFu8; 16];
        junk[..4].copy_from_slice(&16u32.to_le_bytes());
        let header = FileHeader {
            format_version: HEADER_FORMAT_VERSION,
            flags: FLAG_COMPRESSED,
            uncompressed_size: 64,
            checksum: xxh32(&junk, XXHASH_SEED),
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes);
        bytes.extend_from_slice(&junk);

        let result = unwrap_header(&bytes).expect("header is valid");
        assert!(matches!(
            result.into_snapshot(),
            Err(SaveError::Decompress(_))
        ));
    }
}
