//! Keystore file inspection
//!
//! Catches the usual release-signing mistakes before Gradle does: a
//! `storeFile` that points nowhere, an empty file, or something that is not
//! a keystore at all.

use linkis_core::error::{Error, Result, ResultExt};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

const JKS_MAGIC: [u8; 4] = [0xFE, 0xED, 0xFE, 0xED];
const JCEKS_MAGIC: [u8; 4] = [0xCE, 0xCE, 0xCE, 0xCE];
// PKCS#12 is a DER SEQUENCE
const DER_SEQUENCE: u8 = 0x30;

/// Extensions Android tooling accepts for `storeFile`
pub const KEYSTORE_EXTENSIONS: [&str; 4] = ["jks", "keystore", "p12", "pfx"];

/// Keystore container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeystoreFormat {
    Jks,
    Jceks,
    Pkcs12,
    Unknown,
}

impl fmt::Display for KeystoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeystoreFormat::Jks => "JKS",
            KeystoreFormat::Jceks => "JCEKS",
            KeystoreFormat::Pkcs12 => "PKCS12",
            KeystoreFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Detect the keystore format from the first bytes of the file
pub fn detect_format(header: &[u8]) -> KeystoreFormat {
    match header {
        [a, b, c, d, ..] if [*a, *b, *c, *d] == JKS_MAGIC => KeystoreFormat::Jks,
        [a, b, c, d, ..] if [*a, *b, *c, *d] == JCEKS_MAGIC => KeystoreFormat::Jceks,
        [DER_SEQUENCE, ..] => KeystoreFormat::Pkcs12,
        _ => KeystoreFormat::Unknown,
    }
}

/// What we learned about a keystore file
#[derive(Debug, Clone, Serialize)]
pub struct KeystoreInfo {
    pub path: PathBuf,
    pub format: KeystoreFormat,
    pub size_bytes: u64,
    /// SHA-256 of the whole file, lowercase hex
    pub sha256: String,
    pub warnings: Vec<String>,
}

impl KeystoreInfo {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Inspect the keystore at `path`.
///
/// Missing, non-regular and empty files are errors; an unexpected extension
/// or unrecognised format only produces warnings.
pub fn inspect_keystore(path: impl AsRef<Path>) -> Result<KeystoreInfo> {
    let path = path.as_ref();

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::keystore_not_found(path));
        }
        Err(e) => return Err(e).context(format!("Inspecting {}", path.display())),
    };
    if !metadata.is_file() {
        return Err(Error::keystore_invalid(path, "not a regular file"));
    }

    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(Error::keystore_invalid(path, "file is empty"));
    }

    let format = detect_format(&bytes);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let mut warnings = Vec::new();
    match extension.as_deref() {
        Some(ext) if KEYSTORE_EXTENSIONS.contains(&ext) => {
            if matches!(ext, "p12" | "pfx") && format != KeystoreFormat::Pkcs12 {
                warnings.push(format!("extension .{} but contents look like {}", ext, format));
            }
        }
        Some(ext) => warnings.push(format!(
            "unusual extension .{} (expected one of: {})",
            ext,
            KEYSTORE_EXTENSIONS.join(", ")
        )),
        None => warnings.push("keystore has no file extension".to_string()),
    }
    if format == KeystoreFormat::Unknown {
        warnings.push("unrecognized keystore format".to_string());
    }

    for warning in &warnings {
        tracing::warn!(path = %path.display(), %warning, "Keystore check");
    }

    Ok(KeystoreInfo {
        path: path.to_path_buf(),
        format,
        size_bytes: metadata.len(),
        sha256: hex::encode(Sha256::digest(&bytes)),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkis_core::ErrorCode;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&[0xFE, 0xED, 0xFE, 0xED, 0, 0, 0, 2]), KeystoreFormat::Jks);
        assert_eq!(detect_format(&[0xCE, 0xCE, 0xCE, 0xCE, 0]), KeystoreFormat::Jceks);
        assert_eq!(detect_format(&[0x30, 0x82, 0x0A, 0x1F]), KeystoreFormat::Pkcs12);
        assert_eq!(detect_format(b"not a keystore"), KeystoreFormat::Unknown);
        assert_eq!(detect_format(&[0xFE, 0xED]), KeystoreFormat::Unknown);
        assert_eq!(detect_format(&[]), KeystoreFormat::Unknown);
    }

    #[test]
    fn test_inspect_jks() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "upload.jks", &[0xFE, 0xED, 0xFE, 0xED, 0, 0, 0, 2]);

        let info = inspect_keystore(&path).unwrap();
        assert_eq!(info.format, KeystoreFormat::Jks);
        assert_eq!(info.size_bytes, 8);
        assert_eq!(info.sha256.len(), 64);
        assert!(!info.has_warnings());
    }

    #[test]
    fn test_pkcs12_with_jks_extension_is_fine() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "release.jks", &[0x30, 0x82, 0x0A, 0x1F]);
        let info = inspect_keystore(&path).unwrap();
        assert_eq!(info.format, KeystoreFormat::Pkcs12);
        assert!(!info.has_warnings());
    }

    #[test]
    fn test_p12_extension_mismatch_warns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "release.p12", &[0xFE, 0xED, 0xFE, 0xED]);
        let info = inspect_keystore(&path).unwrap();
        assert_eq!(info.warnings.len(), 1);
        assert!(info.warnings[0].contains("JKS"));
    }

    #[test]
    fn test_unknown_format_and_extension_warn() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "release.txt", b"hello");
        let info = inspect_keystore(&path).unwrap();
        assert_eq!(info.format, KeystoreFormat::Unknown);
        assert_eq!(info.warnings.len(), 2);
    }

    #[test]
    fn test_missing_keystore() {
        let dir = TempDir::new().unwrap();
        let err = inspect_keystore(dir.path().join("absent.jks")).unwrap_err();
        assert_eq!(err.code, ErrorCode::KeystoreNotFound);
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_empty_keystore() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.jks", &[]);
        let err = inspect_keystore(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::KeystoreInvalid);
    }

    #[test]
    fn test_directory_is_not_a_keystore() {
        let dir = TempDir::new().unwrap();
        let err = inspect_keystore(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::KeystoreInvalid);
    }
}
