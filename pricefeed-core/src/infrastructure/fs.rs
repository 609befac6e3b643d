// pricefeed-core/src/infrastructure/fs.rs

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::infrastructure::error::InfrastructureError;

/// Serializes `value` as pretty JSON and publishes it at `path` atomically.
///
/// The bytes go to a temporary file in the target directory (same filesystem, so
/// the rename is atomic) which is synced and then renamed over `path`. Readers see
/// either the previous file or the complete new one, never a prefix.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), InfrastructureError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let temp_file = tempfile::NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}
