//! Transport encoding for attachment payloads.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Read an attachment from disk. Failures here abort the whole submission,
/// so the message carries the offending path.
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Encode payload bytes for the webhook body.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base64_matches_standard_alphabet() {
        assert_eq!(to_base64(b"hello"), "aGVsbG8=");
        assert_eq!(to_base64(&[0xFF, 0x00, 0x10]), "/wAQ");
        assert_eq!(to_base64(b""), "");
    }

    #[tokio::test]
    async fn test_read_bytes_returns_file_contents() {
        let path = std::env::temp_dir().join(format!("homework-enc-{}.bin", std::process::id()));
        tokio::fs::write(&path, b"payload").await.unwrap();
        let bytes = read_bytes(&path).await.unwrap();
        assert_eq!(bytes, b"payload");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_read_bytes_reports_missing_path() {
        let path = std::env::temp_dir().join("homework-enc-does-not-exist.bin");
        let err = read_bytes(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("homework-enc-does-not-exist.bin"));
    }
}
