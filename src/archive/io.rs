//! Reading and writing archive files.
//!
//! Archives are JSON. Files starting with the gzip magic are decompressed
//! on read; paths ending in `.gz` are compressed on write.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use super::Archive;
use crate::util::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decode archive bytes, plain or gzip-compressed.
pub fn from_slice(bytes: &[u8]) -> Result<Archive> {
    let value: serde_json::Value = if bytes.starts_with(&GZIP_MAGIC) {
        let mut json = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut json)?;
        serde_json::from_slice(&json)?
    } else {
        serde_json::from_slice(bytes)?
    };
    Archive::from_value(value)
}

/// Encode an archive, optionally gzip-compressed.
pub fn to_vec(archive: &Archive, compress: bool) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(&archive.to_value()?)?;
    if !compress {
        return Ok(json);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Read and validate an archive file.
pub fn read_archive(path: impl AsRef<Path>) -> Result<Archive> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    tracing::info!("Loading archive: {}", path.display());
    let archive = from_slice(&fs::read(path)?)?;
    tracing::info!("Archive key {:?}, {} frames", archive.key, archive.record.frame_count());
    Ok(archive)
}

/// Write an archive file, creating parent directories as needed.
pub fn write_archive(path: impl AsRef<Path>, archive: &Archive) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_vec(archive, is_compressed_path(path))?;
    crate::create_parent_dir(path)?;
    tracing::info!("Saving archive {:?} to {}", archive.key, path.display());
    fs::write(path, bytes)?;
    Ok(())
}

/// True for paths that should be written gzip-compressed.
pub fn is_compressed_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// True for file names this crate treats as archives.
pub fn is_archive_path(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".json") || name.ends_with(".json.gz")
}
