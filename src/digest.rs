//! Content digests for module files using BLAKE3

use crate::error::StoreError;
use blake3::Hasher;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Chunk size for streaming file reads.
const READ_CHUNK: usize = 4096;

/// Compute the content digest of a file, read in fixed-size chunks.
///
/// Returns the lowercase hex encoding of the BLAKE3 hash over the full byte
/// stream. Any read failure is surfaced to the caller; a partial digest is
/// never returned.
pub fn digest_file(path: &Path) -> Result<String, StoreError> {
    let mut file = File::open(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Hasher::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = file.read(&mut chunk).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute the digest of an in-memory byte slice.
///
/// Matches `digest_file` for the same bytes.
pub fn digest_bytes(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}
