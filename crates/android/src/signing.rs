//! Release signing credentials loaded from `key.properties`
//!
//! The Android build reads `<android-root>/key.properties` and feeds four
//! values into its release signing config. Loading is lenient: a missing file
//! yields empty credentials, and missing keys stay `None`. Callers that need
//! a complete configuration ask for it explicitly with
//! [`SigningCredentials::require_release`].
//!
//! ```rust,no_run
//! use linkis_android::signing::{load_signing_credentials, SigningLayout};
//!
//! let layout = SigningLayout::new("android");
//! let credentials = load_signing_credentials(&layout)?;
//! if let Some(alias) = credentials.key_alias() {
//!     println!("signing with {alias}");
//! }
//! # Ok::<(), linkis_core::Error>(())
//! ```

use encoding_rs::UTF_8;
use java_properties::PropertiesIter;
use linkis_core::config::SigningSection;
use linkis_core::error::{Error, ErrorCode, Result, ResultExt};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Key holding the signing key alias
pub const KEY_ALIAS: &str = "keyAlias";
/// Key holding the signing key password
pub const KEY_PASSWORD: &str = "keyPassword";
/// Key holding the keystore path
pub const STORE_FILE: &str = "storeFile";
/// Key holding the keystore password
pub const STORE_PASSWORD: &str = "storePassword";

/// Keys consumed by the release signing config, in report order
pub const RECOGNIZED_KEYS: [&str; 4] = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];

/// Where `key.properties` lives and what a relative `storeFile` is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningLayout {
    project_root: PathBuf,
    properties_file: PathBuf,
    module_dir: PathBuf,
}

impl Default for SigningLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

impl SigningLayout {
    /// Stock Flutter layout: `key.properties` at the root, `storeFile`
    /// relative to the `app` module.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            properties_file: PathBuf::from("key.properties"),
            module_dir: PathBuf::from("app"),
        }
    }

    /// Build from tool configuration; `project_root` overrides the configured root.
    pub fn from_config(section: &SigningSection, project_root: Option<&Path>) -> Self {
        let root = project_root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| section.expanded_project_root());
        Self::new(root)
            .with_properties_file(&section.properties_file)
            .with_module_dir(&section.module_dir)
    }

    /// Use a different properties file name (relative to the project root)
    #[must_use]
    pub fn with_properties_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.properties_file = file.into();
        self
    }

    /// Use a different module directory (relative to the project root)
    #[must_use]
    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dir = dir.into();
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn properties_path(&self) -> PathBuf {
        self.project_root.join(&self.properties_file)
    }

    pub fn store_base_dir(&self) -> PathBuf {
        self.project_root.join(&self.module_dir)
    }
}

/// Raw `key=value` entries of a properties file.
///
/// Immutable once loaded. `Debug` lists keys only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeystoreProperties {
    source: Option<PathBuf>,
    found: bool,
    entries: HashMap<String, String>,
}

impl fmt::Debug for KeystoreProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("KeystoreProperties")
            .field("source", &self.source)
            .field("found", &self.found)
            .field("keys", &keys)
            .finish()
    }
}

impl KeystoreProperties {
    /// Load a properties file. A file that does not exist yields an empty
    /// mapping; unreadable or malformed files are errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No signing properties file; credentials are empty");
                return Ok(Self {
                    source: Some(path.to_path_buf()),
                    found: false,
                    entries: HashMap::new(),
                });
            }
            Err(e) => {
                return Err(e).context(format!("Opening signing properties {}", path.display()));
            }
        };

        Self::from_reader(BufReader::new(file), Some(path))
    }

    /// Parse properties from any reader. `source` is used for error messages.
    ///
    /// Bytes are ISO-8859-1, one byte per code point, the way
    /// `java.util.Properties.load(InputStream)` reads them.
    pub fn from_reader(mut reader: impl Read, source: Option<&Path>) -> Result<Self> {
        let label = source.unwrap_or_else(|| Path::new("<memory>"));

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .context(format!("Reading signing properties {}", label.display()))?;
        let text = join_surrogate_escapes(&decode_latin1(&bytes));

        let mut entries = HashMap::new();
        PropertiesIter::new_with_encoding(text.as_bytes(), UTF_8)
            .read_into(|key, value| {
                entries.insert(key, value);
            })
            .map_err(|e| {
                let err = Error::config_parse(label, e.to_string())
                    .with_suggestion("key.properties uses Java properties syntax: one key=value per line");
                match e.line_number() {
                    Some(line) => err.with_context(format!("line {}", line)),
                    None => err,
                }
            })?;

        for key in entries.keys().filter(|k| !RECOGNIZED_KEYS.contains(&k.as_str())) {
            tracing::warn!(key = %key, path = %label.display(), "Ignoring unrecognized signing property");
        }
        tracing::debug!(path = %label.display(), entries = entries.len(), "Signing properties loaded");

        Ok(Self {
            source: source.map(Path::to_path_buf),
            found: true,
            entries,
        })
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the backing file existed
    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four values a release signing config needs, each possibly absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningCredentials {
    key_alias: Option<String>,
    key_password: Option<String>,
    store_file: Option<PathBuf>,
    store_password: Option<String>,
    properties_path: Option<PathBuf>,
    properties_found: bool,
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("key_alias", &self.key_alias)
            .field("key_password", &self.key_password.as_ref().map(|_| "<redacted>"))
            .field("store_file", &self.store_file)
            .field("store_password", &self.store_password.as_ref().map(|_| "<redacted>"))
            .field("properties_path", &self.properties_path)
            .finish()
    }
}

impl SigningCredentials {
    /// Pick the recognised keys out of `properties`.
    ///
    /// `storeFile` is joined onto `store_base_dir` only when present, so an
    /// absolute value stays absolute and a missing one stays `None`.
    pub fn from_properties(properties: &KeystoreProperties, store_base_dir: &Path) -> Self {
        let owned = |key: &str| properties.get(key).map(str::to_string);

        Self {
            key_alias: owned(KEY_ALIAS),
            key_password: owned(KEY_PASSWORD),
            store_file: properties.get(STORE_FILE).map(|f| store_base_dir.join(f)),
            store_password: owned(STORE_PASSWORD),
            properties_path: properties.source().map(Path::to_path_buf),
            properties_found: properties.is_found(),
        }
    }

    pub fn key_alias(&self) -> Option<&str> {
        self.key_alias.as_deref()
    }

    pub fn key_password(&self) -> Option<&str> {
        self.key_password.as_deref()
    }

    /// Keystore path, already resolved against the module directory
    pub fn store_file(&self) -> Option<&Path> {
        self.store_file.as_deref()
    }

    pub fn store_password(&self) -> Option<&str> {
        self.store_password.as_deref()
    }

    /// Path of the properties file these credentials came from
    pub fn properties_path(&self) -> Option<&Path> {
        self.properties_path.as_deref()
    }

    /// Whether the properties file existed at load time
    pub fn properties_found(&self) -> bool {
        self.properties_found
    }

    /// Recognised keys with no value, in [`RECOGNIZED_KEYS`] order
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            self.key_alias.is_some(),
            self.key_password.is_some(),
            self.store_file.is_some(),
            self.store_password.is_some(),
        ];
        RECOGNIZED_KEYS
            .iter()
            .zip(present)
            .filter_map(|(key, present)| (!present).then_some(*key))
            .collect()
    }

    /// True when no recognised key is set
    pub fn is_empty(&self) -> bool {
        self.missing_keys().len() == RECOGNIZED_KEYS.len()
    }

    /// True when every recognised key is set
    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Everything needed to sign a release build, or an error naming what is missing.
    pub fn require_release(&self) -> Result<ReleaseSigningConfig> {
        let properties = self
            .properties_path
            .as_deref()
            .map_or_else(|| "key.properties".to_string(), |p| p.display().to_string());

        if let (Some(key_alias), Some(key_password), Some(store_file), Some(store_password)) = (
            &self.key_alias,
            &self.key_password,
            &self.store_file,
            &self.store_password,
        ) {
            return Ok(ReleaseSigningConfig {
                key_alias: key_alias.clone(),
                key_password: key_password.clone(),
                store_file: store_file.clone(),
                store_password: store_password.clone(),
            });
        }

        let err = if self.properties_found {
            Error::new(
                ErrorCode::SigningIncomplete,
                format!(
                    "Release signing is incomplete: missing {}",
                    self.missing_keys().join(", ")
                ),
            )
            .with_suggestion(format!("Add the missing keys to {}", properties))
        } else {
            Error::new(
                ErrorCode::SigningIncomplete,
                format!("Release signing is not configured: {} does not exist", properties),
            )
            .with_suggestion("Create it with `linkis-android signing init`")
        };
        Err(err)
    }

    /// Password-free view for reports
    pub fn summary(&self) -> SigningSummary {
        SigningSummary {
            properties_path: self.properties_path.clone(),
            properties_found: self.properties_found,
            key_alias: self.key_alias.clone(),
            key_password_set: self.key_password.is_some(),
            store_file: self.store_file.clone(),
            store_password_set: self.store_password.is_some(),
            missing_keys: self.missing_keys(),
            complete: self.is_complete(),
        }
    }
}

/// Serializable description of loaded credentials without secrets
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SigningSummary {
    pub properties_path: Option<PathBuf>,
    pub properties_found: bool,
    pub key_alias: Option<String>,
    pub key_password_set: bool,
    pub store_file: Option<PathBuf>,
    pub store_password_set: bool,
    pub missing_keys: Vec<&'static str>,
    pub complete: bool,
}

/// Complete credentials for a signed release build
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseSigningConfig {
    key_alias: String,
    key_password: String,
    store_file: PathBuf,
    store_password: String,
}

impl fmt::Debug for ReleaseSigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseSigningConfig")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"<redacted>")
            .field("store_file", &self.store_file)
            .field("store_password", &"<redacted>")
            .finish()
    }
}

impl ReleaseSigningConfig {
    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    pub fn key_password(&self) -> &str {
        &self.key_password
    }

    pub fn store_file(&self) -> &Path {
        &self.store_file
    }

    pub fn store_password(&self) -> &str {
        &self.store_password
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Replace `\uD83D\uDD11`-style surrogate pair escapes with the character
/// they encode. Lone surrogates are left for the parser to reject.
fn join_surrogate_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(c) = surrogate_pair(tail) {
            out.push(c);
            rest = &tail[12..];
        } else {
            // keep an escape and its escaped character together
            let len = 1 + tail[1..].chars().next().map_or(0, char::len_utf8);
            out.push_str(&tail[..len]);
            rest = &tail[len..];
        }
    }
    out.push_str(rest);
    out
}

fn surrogate_pair(tail: &str) -> Option<char> {
    let unit = |s: &str| -> Option<u32> {
        let hex = s.strip_prefix("\\u")?.get(..4)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()
    };
    let high = unit(tail)?;
    let low = unit(tail.get(6..)?)?;
    if !(0xD800..=0xDBFF).contains(&high) || !(0xDC00..=0xDFFF).contains(&low) {
        return None;
    }
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

/// Load `key.properties` for `layout` and resolve the signing credentials
pub fn load_signing_credentials(layout: &SigningLayout) -> Result<SigningCredentials> {
    let properties = KeystoreProperties::load(layout.properties_path())?;
    Ok(SigningCredentials::from_properties(
        &properties,
        &layout.store_base_dir(),
    ))
}
