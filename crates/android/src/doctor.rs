//! Environment and signing readiness checks

use crate::keystore::inspect_keystore;
use crate::signing::{load_signing_credentials, SigningLayout};
use linkis_core::health::{CheckResult, HealthCheck, HealthChecker};

const CHECK_NAME: &str = "release signing";

/// Checks that `key.properties` is complete and its keystore usable.
///
/// A missing properties file is degraded rather than unhealthy: debug
/// builds still work, only release signing is unavailable.
pub struct SigningCheck {
    layout: SigningLayout,
    inspect_keystore: bool,
}

impl SigningCheck {
    pub fn new(layout: SigningLayout, inspect_keystore: bool) -> Self {
        Self {
            layout,
            inspect_keystore,
        }
    }
}

impl HealthCheck for SigningCheck {
    fn check(&self) -> CheckResult {
        let properties_path = self.layout.properties_path();
        let credentials = match load_signing_credentials(&self.layout) {
            Ok(credentials) => credentials,
            Err(e) => return CheckResult::unhealthy(CHECK_NAME, e.message),
        };

        let result = if !credentials.properties_found() {
            CheckResult::degraded(
                CHECK_NAME,
                format!("{} not found; release builds will be unsigned", properties_path.display()),
            )
        } else {
            match credentials.require_release() {
                Err(e) => CheckResult::unhealthy(CHECK_NAME, e.message),
                Ok(release) if self.inspect_keystore => match inspect_keystore(release.store_file()) {
                    Ok(info) if info.has_warnings() => {
                        CheckResult::degraded(CHECK_NAME, info.warnings.join("; "))
                            .with_detail("keystore_format", info.format.to_string())
                    }
                    Ok(info) => CheckResult::healthy(CHECK_NAME)
                        .with_detail("keystore_format", info.format.to_string())
                        .with_detail("keystore_sha256", info.sha256),
                    Err(e) => CheckResult::unhealthy(CHECK_NAME, e.message),
                },
                Ok(_) => CheckResult::healthy(CHECK_NAME),
            }
        };

        let result = result.with_detail("properties", properties_path.display().to_string());
        match credentials.key_alias() {
            Some(alias) => result.with_detail("key_alias", alias),
            None => result,
        }
    }
}

/// Standard Android checks plus signing readiness for `layout`
pub fn android_health_checker(layout: &SigningLayout, inspect_keystore: bool) -> HealthChecker {
    HealthChecker::new()
        .with_android_checks()
        .add_check(SigningCheck::new(layout.clone(), inspect_keystore))
}
