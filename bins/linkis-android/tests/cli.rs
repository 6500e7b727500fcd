use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const JKS_HEADER: [u8; 8] = [0xFE, 0xED, 0xFE, 0xED, 0, 0, 0, 2];

fn linkis(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("linkis-android").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("LINKIS_KEY_PASSWORD")
        .env_remove("LINKIS_STORE_PASSWORD")
        .arg("--no-color");
    cmd
}

fn init(dir: &TempDir) {
    linkis(dir)
        .args(["signing", "init", "--key-alias", "upload", "--store-file", "upload.jks"])
        .env("LINKIS_KEY_PASSWORD", "key-secret-1")
        .env("LINKIS_STORE_PASSWORD", "store-secret-1")
        .assert()
        .success();
}

#[test]
fn show_without_properties_file() {
    let dir = TempDir::new().unwrap();
    linkis(&dir)
        .args(["signing", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"properties_found\": false"))
        .stdout(predicate::str::contains("\"complete\": false"));
}

#[test]
fn release_check_fails_without_credentials() {
    let dir = TempDir::new().unwrap();
    linkis(&dir)
        .args(["signing", "check", "--release"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("signing init"));

    linkis(&dir).args(["signing", "check"]).assert().success();
}

#[test]
fn init_then_release_check() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    // keystore not created yet
    linkis(&dir).args(["signing", "check", "--release"]).assert().code(6);

    std::fs::create_dir_all(dir.path().join("app")).unwrap();
    std::fs::write(dir.path().join("app").join("upload.jks"), JKS_HEADER).unwrap();
    linkis(&dir)
        .args(["signing", "check", "--release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    linkis(&dir)
        .args(["signing", "init", "--key-alias", "other", "--store-file", "other.jks"])
        .args(["--key-password", "key-secret-2", "--store-password", "store-secret-2"])
        .assert()
        .failure();

    let content = std::fs::read_to_string(dir.path().join("key.properties")).unwrap();
    assert!(content.contains("keyAlias=upload"));
}

#[test]
fn show_masks_passwords() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    linkis(&dir)
        .args(["signing", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("key-secret-1").not())
        .stdout(predicate::str::contains("store-secret-1").not());
}

#[test]
fn keystore_inspect_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("release.jks"), JKS_HEADER).unwrap();

    linkis(&dir)
        .args(["keystore", "inspect", "release.jks", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"format\": \"jks\""));
}

#[test]
fn project_root_flag_moves_lookup() {
    let dir = TempDir::new().unwrap();
    let android = dir.path().join("android");
    std::fs::create_dir_all(&android).unwrap();
    std::fs::write(android.join("key.properties"), "keyAlias=nested\n").unwrap();

    linkis(&dir)
        .args(["--project-root", "android", "signing", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nested"));
}

#[test]
fn missing_config_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    linkis(&dir)
        .args(["--config", "absent.toml", "signing", "show"])
        .assert()
        .code(3);
}

#[test]
fn config_file_sets_project_root() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".linkis-android.toml"),
        "[signing]\nproject_root = \"mobile\"\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join("mobile")).unwrap();
    std::fs::write(dir.path().join("mobile").join("key.properties"), "keyAlias=configured\n").unwrap();

    linkis(&dir)
        .args(["signing", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configured"));
}

#[test]
fn malformed_properties_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("key.properties"), "keyAlias=upload\nkeyPassword=\\uZZZZ\n").unwrap();

    linkis(&dir)
        .args(["signing", "show"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn release_build_without_credentials_stops_before_gradle() {
    let dir = TempDir::new().unwrap();
    linkis(&dir)
        .args(["build", "--configuration", "release"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Gradle wrapper").not());
}

#[test]
fn build_help_warns_about_visible_passwords() {
    let dir = TempDir::new().unwrap();
    linkis(&dir)
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("visible"));
}

#[test]
fn doctor_json_reports_signing_check() {
    let dir = TempDir::new().unwrap();
    linkis(&dir)
        .args(["doctor", "--json"])
        .assert()
        .stdout(predicate::str::contains("\"name\": \"release signing\""))
        .stdout(predicate::str::contains("\"status\": \"degraded\""));
}
