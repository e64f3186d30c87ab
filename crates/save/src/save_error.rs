// ---------------------------------------------------------------------------
// SaveError: error types for save/load operations
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while writing or reading a city snapshot.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The buffer ended before a complete field could be read.
    Truncated { needed: usize, found: usize },
    /// Header checksum does not match the payload.
    ChecksumMismatch { expected: u32, found: u32 },
    /// Save file version is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// The lz4 payload could not be decompressed.
    Decompress(String),
    /// The extension map is malformed.
    Decode(String),
    /// Only worlds of the fixed snapshot size can be saved.
    DimensionMismatch { width: usize, height: usize },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Truncated { needed, found } => write!(
                f,
                "Save data is truncated: needed {needed} bytes, found {found}"
            ),
            SaveError::ChecksumMismatch { expected, found } => write!(
                f,
                "Save file is corrupted: checksum mismatch (expected {expected:#010X}, got {found:#010X})"
            ),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::Decompress(msg) => write!(f, "Decompression error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::DimensionMismatch { width, height } => write!(
                f,
                "Cannot save a {width}x{height} world: snapshots are fixed-size"
            ),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_error_display_io() {
        let err = SaveError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_checksum() {
        let err = SaveError::ChecksumMismatch {
            expected: 0xDEAD_BEEF,
            found: 1,
        };
        let msg = format!("{err}");
        assert!(msg.contains("corrupted"), "got: {msg}");
        assert!(msg.contains("0xDEADBEEF"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_version_mismatch() {
        let err = SaveError::VersionMismatch {
            expected_max: 1,
            found: 99,
        };
        let msg = format!("{err}");
        assert!(msg.contains("v99"), "got: {msg}");
        assert!(msg.contains("v1"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_truncated() {
        let msg = format!(
            "{}",
            SaveError::Truncated {
                needed: 20,
                found: 6
            }
        );
        assert!(msg.contains("needed 20"), "got: {msg}");
    }

    #[test]
    fn test_save_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let save_err: SaveError = io_err.into();
        assert!(matches!(save_err, SaveError::Io(_)));
        assert!(std::error::Error::source(&save_err).is_some());
    }

    #[test]
    fn test_non_io_errors_have_no_source() {
        let err = SaveError::DimensionMismatch {
            width: 16,
            height: 16,
        };
        assert!(std::error::Error::source(&err).is_none());
        assert!(format!("{err}").contains("16x16"));
    }
}
