//! Artifact checksum calculation.
//!
//! One-file builds produce a single executable; one-dir builds produce a
//! directory tree. Both get a SHA-256 recorded in the build report.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::bail;
use crate::orchestrator::error::{ErrorExt, Result};

/// Calculates the SHA-256 checksum of an artifact.
///
/// Files are hashed directly; directories are hashed by walking all
/// contained files in sorted order, mixing each relative path into the
/// hash so tree layout changes are detected.
pub async fn artifact_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;

    if metadata.is_file() {
        file_sha256(path).await
    } else if metadata.is_dir() {
        directory_sha256(path).await
    } else {
        bail!("artifact is neither file nor directory: {}", path.display())
    }
}

async fn file_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening artifact for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading artifact for hashing", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

async fn directory_sha256(dir: &Path) -> Result<String> {
    let mut entries: Vec<_> = walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    // Sorted for a deterministic digest across runs.
    entries.sort_by_key(|e| e.path().to_path_buf());

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    for entry in entries {
        let rel_path = entry.path().strip_prefix(dir)?;
        hasher.update(rel_path.to_string_lossy().as_bytes());

        let mut file = tokio::fs::File::open(entry.path())
            .await
            .fs_context("opening file for hashing", entry.path())?;
        loop {
            let n = file
                .read(&mut buffer)
                .await
                .fs_context("reading file for hashing", entry.path())?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_and_directory_artifacts_both_hash() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("App");
        tokio::fs::write(&file, b"binary").await.unwrap();
        let file_hash = artifact_sha256(&file).await.unwrap();
        assert_eq!(file_hash.len(), 64);

        let bundle = dir.path().join("App.d");
        tokio::fs::create_dir_all(&bundle).await.unwrap();
        tokio::fs::write(bundle.join("App"), b"binary").await.unwrap();
        let dir_hash = artifact_sha256(&bundle).await.unwrap();
        assert_eq!(dir_hash.len(), 64);
        // Path mixing makes the two digests differ.
        assert_ne!(file_hash, dir_hash);
    }
}
