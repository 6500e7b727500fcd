//! Linkis Android CLI
//!
//! Release signing setup, checks and signed Gradle builds for the Linkis
//! Android app.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use linkis_android::doctor::android_health_checker;
use linkis_android::gradle::{self, ArtifactKind, BuildVariant};
use linkis_android::key_properties::{write_key_properties, KeyPropertiesTemplate};
use linkis_android::keystore::{inspect_keystore, KeystoreInfo};
use linkis_android::{load_signing_credentials, SigningCredentials, SigningLayout};
use linkis_cli::output::{display_optional, format_duration, format_size, mask_secret, Status};
use linkis_cli::progress;
use linkis_core::config::Config;
use linkis_core::error::exit_codes;
use linkis_core::health::HealthStatus;
use linkis_core::Error;
use linkis_telemetry::{level_for_verbosity, TelemetryConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "linkis-android")]
#[command(about = "Release signing and build tools for Linkis Android")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Android project root (overrides the configured one)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and create release signing credentials
    Signing {
        #[command(subcommand)]
        action: SigningAction,
    },

    /// Inspect keystore files
    Keystore {
        #[command(subcommand)]
        action: KeystoreAction,
    },

    /// Build project
    ///
    /// Release builds pass the signing passwords to Gradle as `-P` arguments,
    /// so they are visible in the process list (`ps`) while Gradle runs.
    Build {
        /// Build configuration
        #[arg(long, value_enum, default_value_t = Configuration::Debug)]
        configuration: Configuration,
        /// Clean before building
        #[arg(long)]
        clean: bool,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
    },

    /// Diagnose environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SigningAction {
    /// Show loaded credentials with passwords masked
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that credentials are usable
    Check {
        /// Require complete release credentials
        #[arg(long)]
        release: bool,
    },
    /// Write a new key.properties
    Init {
        /// Alias of the signing key inside the keystore
        #[arg(long)]
        key_alias: String,
        /// Keystore path, relative to the app module
        #[arg(long)]
        store_file: String,
        /// Key password
        #[arg(long, env = "LINKIS_KEY_PASSWORD", hide_env_values = true)]
        key_password: String,
        /// Keystore password
        #[arg(long, env = "LINKIS_STORE_PASSWORD", hide_env_values = true)]
        store_password: String,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum KeystoreAction {
    /// Show format, size and fingerprint of a keystore
    Inspect {
        /// Keystore path (defaults to storeFile from key.properties)
        path: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Configuration {
    Debug,
    Release,
}

impl From<Configuration> for BuildVariant {
    fn from(configuration: Configuration) -> Self {
        match configuration {
            Configuration::Debug => BuildVariant::Debug,
            Configuration::Release => BuildVariant::Release,
        }
    }
}

/// Settings shared by every subcommand
struct Context {
    layout: SigningLayout,
    require_keystore: bool,
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::report(&e);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let level = level_for_verbosity(cli.verbose, cli.quiet, &config.schema.logging.level);
    linkis_telemetry::init_with_config(TelemetryConfig::default().with_level(level))?;

    let ctx = Context {
        layout: SigningLayout::from_config(&config.schema.signing, cli.project_root.as_deref()),
        require_keystore: config.schema.signing.require_keystore,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Signing { action } => match action {
            SigningAction::Show { json } => run_signing_show(&ctx, json),
            SigningAction::Check { release } => run_signing_check(&ctx, release),
            SigningAction::Init {
                key_alias,
                store_file,
                key_password,
                store_password,
                force,
            } => {
                let template = KeyPropertiesTemplate {
                    key_alias,
                    key_password,
                    store_file,
                    store_password,
                };
                run_signing_init(&ctx, &template, force)
            }
        },
        Commands::Keystore { action } => match action {
            KeystoreAction::Inspect { path, json } => run_keystore_inspect(&ctx, path.as_deref(), json),
        },
        Commands::Build {
            configuration,
            clean,
            bundle,
        } => run_build(&ctx, configuration.into(), clean, bundle),
        Commands::Doctor { json } => run_doctor(&ctx, json),
    };

    std::process::exit(exit_code);
}

/// Report `error` and map it to its exit code
fn fail(error: &Error) -> i32 {
    Status::report(error);
    error.exit_code()
}

fn load_credentials(ctx: &Context) -> std::result::Result<SigningCredentials, i32> {
    load_signing_credentials(&ctx.layout).map_err(|e| fail(&e))
}

fn print_json(value: &impl serde::Serialize) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            exit_codes::SUCCESS
        }
        Err(e) => fail(&Error::from(e)),
    }
}

fn run_signing_show(ctx: &Context, json: bool) -> i32 {
    let credentials = match load_credentials(ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if json {
        return print_json(&credentials.summary());
    }

    let properties_path = ctx.layout.properties_path();
    Status::header("Release signing");
    Status::field("properties", &properties_path.display().to_string());
    if !credentials.properties_found() {
        Status::warning(&format!("{} not found", properties_path.display()));
        return exit_codes::SUCCESS;
    }

    let store_file = credentials.store_file().map(|p| p.display().to_string());
    Status::field("keyAlias", &display_optional(credentials.key_alias()));
    Status::field(
        "keyPassword",
        &credentials.key_password().map(mask_secret).unwrap_or_else(|| display_optional(None)),
    );
    Status::field("storeFile", &display_optional(store_file.as_deref()));
    Status::field(
        "storePassword",
        &credentials.store_password().map(mask_secret).unwrap_or_else(|| display_optional(None)),
    );

    let missing = credentials.missing_keys();
    if !missing.is_empty() {
        Status::warning(&format!("Missing: {}", missing.join(", ")));
    }

    exit_codes::SUCCESS
}

fn run_signing_check(ctx: &Context, release: bool) -> i32 {
    let credentials = match load_credentials(ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if !release {
        if !ctx.quiet {
            if credentials.is_complete() {
                Status::success("Release signing is configured");
            } else if credentials.properties_found() {
                Status::warning(&format!(
                    "Release signing is incomplete (missing: {})",
                    credentials.missing_keys().join(", ")
                ));
            } else {
                Status::info("No key.properties; release builds will be unsigned");
            }
        }
        return exit_codes::SUCCESS;
    }

    let config = match credentials.require_release() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    if ctx.require_keystore {
        match inspect_keystore(config.store_file()) {
            Ok(info) => {
                for warning in &info.warnings {
                    Status::warning(warning);
                }
            }
            Err(e) => return fail(&e),
        }
    }

    if !ctx.quiet {
        Status::success(&format!("Release signing ready (key {})", config.key_alias()));
    }
    exit_codes::SUCCESS
}

fn run_signing_init(ctx: &Context, template: &KeyPropertiesTemplate, force: bool) -> i32 {
    let path = ctx.layout.properties_path();

    if let Err(e) = write_key_properties(&path, template, force) {
        return fail(&e);
    }

    if !ctx.quiet {
        Status::success(&format!("Wrote {}", path.display()));
        Status::info("Keep this file out of version control");
    }
    exit_codes::SUCCESS
}

fn run_keystore_inspect(ctx: &Context, path: Option<&Path>, json: bool) -> i32 {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let credentials = match load_credentials(ctx) {
                Ok(c) => c,
                Err(code) => return code,
            };
            match credentials.store_file() {
                Some(p) => p.to_path_buf(),
                None => {
                    return fail(
                        &Error::validation("No keystore path given and storeFile is not set")
                            .with_suggestion("Pass a path or set storeFile in key.properties"),
                    );
                }
            }
        }
    };

    let info = match inspect_keystore(&path) {
        Ok(info) => info,
        Err(e) => return fail(&e),
    };

    if json {
        return print_json(&info);
    }

    print_keystore(&info);
    exit_codes::SUCCESS
}

fn print_keystore(info: &KeystoreInfo) {
    Status::header("Keystore");
    Status::field("path", &info.path.display().to_string());
    Status::field("format", &info.format.to_string());
    Status::field("size", &format_size(info.size_bytes));
    Status::field("sha256", &info.sha256);
    for warning in &info.warnings {
        Status::warning(warning);
    }
}

fn run_build(ctx: &Context, variant: BuildVariant, clean: bool, bundle: bool) -> i32 {
    let project_dir = ctx.layout.project_root();
    let kind = if bundle { ArtifactKind::Bundle } else { ArtifactKind::Apk };

    let signing = if variant == BuildVariant::Release {
        let credentials = match load_credentials(ctx) {
            Ok(c) => c,
            Err(code) => return code,
        };
        let config = match credentials.require_release() {
            Ok(config) => config,
            Err(e) => return fail(&e),
        };
        if ctx.require_keystore {
            if let Err(e) = inspect_keystore(config.store_file()) {
                return fail(&e);
            }
        }
        Some(config)
    } else {
        None
    };

    if clean {
        let pb = progress::spinner("Cleaning...", !ctx.quiet);
        let result = gradle::clean(project_dir);
        progress::finish(&pb);
        match result {
            Ok(r) if r.success => {}
            Ok(r) => {
                Status::error("Clean failed");
                eprintln!("{}", r.combined_output());
                return exit_codes::FAILURE;
            }
            Err(e) => return fail(&e),
        }
    }

    let start = Instant::now();
    let pb = progress::spinner(&format!("Building {} {}...", variant, kind), !ctx.quiet);
    let result = gradle::build(project_dir, variant, kind, signing.as_ref());
    progress::finish(&pb);

    match result {
        Ok(r) if r.success => {
            if !ctx.quiet {
                Status::success(&format!(
                    "Build succeeded in {}",
                    format_duration(start.elapsed())
                ));
            }
            exit_codes::SUCCESS
        }
        Ok(r) => {
            Status::error("Build failed");
            eprintln!("{}", r.combined_output());
            exit_codes::FAILURE
        }
        Err(e) => fail(&e),
    }
}

fn run_doctor(ctx: &Context, json: bool) -> i32 {
    let report = android_health_checker(&ctx.layout, ctx.require_keystore).run();

    if json {
        let code = print_json(&report);
        if code != exit_codes::SUCCESS {
            return code;
        }
    } else {
        Status::header("Environment Check");
        for check in &report.checks {
            let line = match &check.message {
                Some(message) => format!("{}: {}", check.name, message),
                None => check.name.clone(),
            };
            match check.status {
                HealthStatus::Healthy => Status::success(&line),
                HealthStatus::Degraded => Status::warning(&line),
                HealthStatus::Unhealthy => Status::error(&line),
            }
            for (key, value) in &check.details {
                Status::field(key, value);
            }
        }
    }

    if report.status.is_operational() {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}
