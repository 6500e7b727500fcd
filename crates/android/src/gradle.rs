//! Gradle build system integration
//!
//! Runs the Gradle wrapper and hands release credentials to the Android
//! Gradle Plugin through its injected signing properties, which take
//! precedence over any `signingConfigs` block in the build script.
//!
//! The properties are passed as `-P` arguments, the same way Android Studio
//! does for its "Generate Signed Bundle" flow.

use crate::signing::ReleaseSigningConfig;
use linkis_core::error::{Error, Result};
use linkis_core::process::{run_command_in_dir, CommandResult};
use std::fmt;
use std::path::Path;

const INJECTED_STORE_FILE: &str = "android.injected.signing.store.file";
const INJECTED_STORE_PASSWORD: &str = "android.injected.signing.store.password";
const INJECTED_KEY_ALIAS: &str = "android.injected.signing.key.alias";
const INJECTED_KEY_PASSWORD: &str = "android.injected.signing.key.password";

/// Build type to assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    Debug,
    Release,
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildVariant::Debug => f.write_str("debug"),
            BuildVariant::Release => f.write_str("release"),
        }
    }
}

/// Artifact to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// APK via `assemble*`
    Apk,
    /// Android App Bundle via `bundle*`
    Bundle,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Apk => f.write_str("APK"),
            ArtifactKind::Bundle => f.write_str("bundle"),
        }
    }
}

/// Gradle task producing `kind` for `variant`
pub fn task_name(variant: BuildVariant, kind: ArtifactKind) -> &'static str {
    match (kind, variant) {
        (ArtifactKind::Apk, BuildVariant::Debug) => "assembleDebug",
        (ArtifactKind::Apk, BuildVariant::Release) => "assembleRelease",
        (ArtifactKind::Bundle, BuildVariant::Debug) => "bundleDebug",
        (ArtifactKind::Bundle, BuildVariant::Release) => "bundleRelease",
    }
}

fn wrapper_name() -> &'static str {
    if cfg!(windows) { "gradlew.bat" } else { "gradlew" }
}

fn wrapper_command() -> &'static str {
    if cfg!(windows) { "gradlew.bat" } else { "./gradlew" }
}

/// Fail early when `project_dir` has no Gradle wrapper
pub fn ensure_wrapper(project_dir: &Path) -> Result<()> {
    if project_dir.join(wrapper_name()).is_file() {
        Ok(())
    } else {
        Err(Error::gradle(format!(
            "Gradle wrapper not found in {}",
            project_dir.display()
        ))
        .with_suggestion("Run this from the Android project root or pass --project-root"))
    }
}

/// `-P` arguments carrying release credentials to the Android Gradle Plugin.
///
/// The passwords end up on the Gradle command line and are visible to other
/// local users through the process list while the build runs.
pub fn injected_signing_args(config: &ReleaseSigningConfig) -> Vec<String> {
    vec![
        format!("-P{}={}", INJECTED_STORE_FILE, config.store_file().display()),
        format!("-P{}={}", INJECTED_STORE_PASSWORD, config.store_password()),
        format!("-P{}={}", INJECTED_KEY_ALIAS, config.key_alias()),
        format!("-P{}={}", INJECTED_KEY_PASSWORD, config.key_password()),
    ]
}

/// Run a Gradle task with extra arguments
pub fn run_task(project_dir: &Path, task: &str, extra_args: &[String]) -> Result<CommandResult> {
    ensure_wrapper(project_dir)?;

    let mut args: Vec<&str> = Vec::with_capacity(extra_args.len() + 1);
    args.push(task);
    args.extend(extra_args.iter().map(String::as_str));

    tracing::info!(task, dir = %project_dir.display(), "Running Gradle task");
    run_command_in_dir(wrapper_command(), &args, project_dir)
}

/// Build `kind` for `variant`, signing with `signing` when given.
///
/// Credentials are only injected for release builds; debug builds keep the
/// debug keystore.
pub fn build(
    project_dir: &Path,
    variant: BuildVariant,
    kind: ArtifactKind,
    signing: Option<&ReleaseSigningConfig>,
) -> Result<CommandResult> {
    let extra = match (variant, signing) {
        (BuildVariant::Release, Some(config)) => injected_signing_args(config),
        (BuildVariant::Release, None) => {
            tracing::warn!("Release build without signing credentials; artifact will be unsigned");
            Vec::new()
        }
        (BuildVariant::Debug, _) => Vec::new(),
    };
    run_task(project_dir, task_name(variant, kind), &extra)
}

/// Clean build artifacts
pub fn clean(project_dir: &Path) -> Result<CommandResult> {
    run_task(project_dir, "clean", &[])
}
