//! Framed binary persistence for datasets, checkpoints and mask stores.
//!
//! Every artifact is written as magic bytes + little-endian format version
//! + length-prefixed bincode payload, so a stale or foreign file fails
//! loudly instead of deserializing into garbage.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{TrainError, TrainResult};

/// Current format version shared by all framed artifacts.
pub const FORMAT_VERSION: u32 = 1;

/// Write a framed bincode artifact.
pub fn save_framed<T: Serialize, P: AsRef<Path>>(
    path: P,
    magic: &[u8; 4],
    value: &T,
) -> TrainResult<()> {
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(magic)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;

    let data =
        bincode::serialize(value).map_err(|e| TrainError::Serialization(e.to_string()))?;
    writer.write_all(&(data.len() as u64).to_le_bytes())?;
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

/// Read a framed bincode artifact, validating magic and version.
pub fn load_framed<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
    magic: &[u8; 4],
) -> TrainResult<T> {
    let display = path.as_ref().display().to_string();
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);

    let mut found_magic = [0u8; 4];
    reader.read_exact(&mut found_magic)?;
    if &found_magic != magic {
        return Err(TrainError::BadFormat {
            path: display,
            detail: "magic bytes do not match".to_string(),
        });
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != FORMAT_VERSION {
        return Err(TrainError::BadFormat {
            path: display,
            detail: format!("version mismatch: expected {FORMAT_VERSION}, got {version}"),
        });
    }

    let mut len_bytes = [0u8; 8];
    reader.read_exact(&mut len_bytes)?;
    let len = u64::from_le_bytes(len_bytes) as usize;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    bincode::deserialize(&data).map_err(|e| TrainError::Serialization(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: &[u8; 4] = b"TSTF";

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        let value = vec![1usize, 2, 3];
        save_framed(&path, MAGIC, &value).unwrap();
        let loaded: Vec<usize> = load_framed(&path, MAGIC).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_wrong_magic_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        save_framed(&path, MAGIC, &42usize).unwrap();
        let err = load_framed::<usize, _>(&path, b"XXXX").unwrap_err();
        assert!(matches!(err, TrainError::BadFormat { .. }));
    }
}
