//! Android release-signing tools for Linkis
//!
//! This crate provides:
//! - Loading signing credentials from `key.properties`
//! - Keystore file inspection
//! - `key.properties` generation
//! - Gradle builds that consume the loaded credentials
//! - Signing readiness checks for `doctor`

pub mod doctor;
pub mod gradle;
pub mod key_properties;
pub mod keystore;
pub mod signing;

pub use signing::{
    load_signing_credentials, KeystoreProperties, ReleaseSigningConfig, SigningCredentials,
    SigningLayout,
};
