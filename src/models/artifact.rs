//! Model artifact loading.
//!
//! Every artifact is read whole, fingerprinted with SHA-256, then parsed.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ModelError;

/// Identity of a loaded artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFingerprint {
    pub path: String,
    pub sha256: String,
}

/// Compute the hex SHA-256 of artifact bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Read an artifact file and fingerprint it.
pub fn read_artifact(path: &Path) -> Result<(Vec<u8>, ArtifactFingerprint), ModelError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| ModelError::Io {
        path: display.clone(),
        source,
    })?;
    let fingerprint = ArtifactFingerprint {
        path: display,
        sha256: sha256_hex(&bytes),
    };
    log::debug!(
        "ARTIFACT_READ path={} bytes={} sha256={}",
        fingerprint.path,
        bytes.len(),
        fingerprint.sha256
    );
    Ok((bytes, fingerprint))
}

/// Read and deserialize a JSON artifact.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<(T, ArtifactFingerprint), ModelError> {
    let (bytes, fingerprint) = read_artifact(path)?;
    let parsed = serde_json::from_slice(&bytes).map_err(|source| ModelError::Parse {
        path: fingerprint.path.clone(),
        source,
    })?;
    Ok((parsed, fingerprint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_missing_artifact_is_io_error() {
        let result = read_artifact(Path::new("/nonexistent/phishguard/model.json"));
        assert!(matches!(result, Err(ModelError::Io { .. })));
    }

    #[test]
    fn test_load_json_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{not json").unwrap();
        let result: Result<(serde_json::Value, _), _> = load_json(&path);
        assert!(matches!(result, Err(ModelError::Parse { .. })));
    }
}
