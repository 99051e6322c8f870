//! SHA-256 verification of downloaded installers.
//!
//! Computed after the transfer finishes, over the temp file, before it is
//! moved into place.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Normalize a user-supplied hex digest: trims whitespace, lowercases, and
/// rejects anything that is not 64 hex digits.
pub fn normalize_sha256(expected: &str) -> Result<String> {
    let hex = expected.trim().to_ascii_lowercase();
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        anyhow::bail!("not a SHA-256 hex digest: {:?}", expected);
    }
    Ok(hex)
}

/// Returns `Ok(None)` when the file matches `expected`, or `Ok(Some(actual))`.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<Option<String>> {
    let expected = normalize_sha256(expected)?;
    let actual = sha256_path(path)?;
    if actual == expected {
        Ok(None)
    } else {
        Ok(Some(actual))
    }
}
