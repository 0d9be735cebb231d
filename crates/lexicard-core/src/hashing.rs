//! Content fingerprints for change detection
//!
//! Digest files are fingerprinted with BLAKE3; the hex digest is what the file
//! ledger stores and compares.

use std::path::Path;

/// BLAKE3 hex digest of `content`
pub fn fingerprint(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}

/// Read a file and return its content together with its fingerprint
pub async fn fingerprint_file(path: &Path) -> std::io::Result<(Vec<u8>, String)> {
    let content = tokio::fs::read(path).await?;
    let hash = fingerprint(&content);
    Ok((content, hash))
}
