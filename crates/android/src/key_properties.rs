//! `key.properties` generation
//!
//! Writes the four signing keys in the order Flutter's deployment guide
//! uses. Output is plain ASCII escaped like `java.util.Properties.store`,
//! so Gradle's ISO-8859-1 reader sees exactly the values that were given.

use crate::signing::{KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD};
use linkis_core::error::{Error, Result};
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// keytool rejects shorter store and key passwords
pub const MIN_PASSWORD_LEN: usize = 6;

const HEADER: &str = "Release signing for the Android app. Keep this file out of version control.";

/// Values to write into a new `key.properties`
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPropertiesTemplate {
    pub key_alias: String,
    pub key_password: String,
    /// Written verbatim; relative paths resolve against the app module
    pub store_file: String,
    pub store_password: String,
}

impl fmt::Debug for KeyPropertiesTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPropertiesTemplate")
            .field("key_alias", &self.key_alias)
            .field("store_file", &self.store_file)
            .finish_non_exhaustive()
    }
}

impl KeyPropertiesTemplate {
    /// Reject values keytool or the Android Gradle Plugin would refuse later
    pub fn validate(&self) -> Result<()> {
        if self.key_alias.trim().is_empty() {
            return Err(Error::validation("keyAlias must not be empty"));
        }
        if self.store_file.trim().is_empty() {
            return Err(Error::validation("storeFile must not be empty"));
        }
        for (key, password) in [
            (KEY_PASSWORD, &self.key_password),
            (STORE_PASSWORD, &self.store_password),
        ] {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(Error::validation(format!(
                    "{} must be at least {} characters",
                    key, MIN_PASSWORD_LEN
                )));
            }
        }
        Ok(())
    }
}

/// Append `text` escaped for a properties file.
///
/// Separators and comment markers get a backslash, a leading space is kept
/// with `\ `, and everything outside printable ASCII becomes `\uXXXX`
/// UTF-16 units (surrogate pairs above U+FFFF).
fn escape_into(out: &mut String, text: &str) {
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if i == 0 => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '\\' | '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
}

/// Render `template` as properties-file bytes (ASCII only)
pub fn render(template: &KeyPropertiesTemplate) -> Result<Vec<u8>> {
    template.validate()?;

    let mut out = format!("# {}\n", HEADER);
    for (key, value) in [
        (STORE_PASSWORD, &template.store_password),
        (KEY_PASSWORD, &template.key_password),
        (KEY_ALIAS, &template.key_alias),
        (STORE_FILE, &template.store_file),
    ] {
        escape_into(&mut out, key);
        out.push('=');
        escape_into(&mut out, value);
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Write `template` to `path`, refusing to replace an existing file unless `overwrite`.
///
/// On Unix the file is left readable by its owner only.
pub fn write_key_properties(
    path: impl AsRef<Path>,
    template: &KeyPropertiesTemplate,
    overwrite: bool,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = render(template)?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::file_exists(path),
        _ => Error::from(e).with_context(format!("Creating {}", path.display())),
    })?;
    file.write_all(&bytes)?;
    file.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(path = %path.display(), key_alias = %template.key_alias, "Wrote signing properties");
    Ok(())
}
