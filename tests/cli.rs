use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the user's config and credentials
fn travel_health(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("travel-health").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("GITHUB_TOKEN")
        .env_remove("TRAVEL_HEALTH_BASE_URL")
        .env_remove("TRAVEL_HEALTH_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_credential_is_fatal() {
    let home = TempDir::new().unwrap();
    travel_health(&home)
        .write_stdin("Nigeria, Lagos\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Starting health agent..."))
        .stderr(predicate::str::contains("GITHUB_TOKEN"))
        .stdout(predicate::str::contains("User >").not());
}

#[test]
fn agents_lists_roster_without_credential() {
    let home = TempDir::new().unwrap();
    travel_health(&home)
        .arg("agents")
        .assert()
        .success()
        .stdout(predicate::str::contains("disease_intelligent"))
        .stdout(predicate::str::contains("vaccine_locator"))
        .stdout(predicate::str::contains("vaccine_booker"));
}

#[test]
fn config_file_controls_roster() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.toml");
    std::fs::write(&path, "[chat]\nagents = [\"disease\", \"booker\"]\n").unwrap();

    travel_health(&home)
        .args(["--config", path.to_str().unwrap(), "agents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vaccine_locator").not())
        .stdout(predicate::str::contains("2. vaccine_booker"));
}

#[test]
fn missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    travel_health(&home)
        .args(["--config", "/nonexistent/travel-health.toml", "agents"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn config_init_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");
    let path_arg = path.to_str().unwrap();

    travel_health(&home)
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    travel_health(&home)
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    travel_health(&home)
        .args(["--config", path_arg, "config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn config_show_applies_overrides() {
    let home = TempDir::new().unwrap();
    travel_health(&home)
        .env("TRAVEL_HEALTH_MODEL", "from-env")
        .args(["config", "show", "--base-url", "http://localhost:9999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model = \"from-env\""))
        .stdout(predicate::str::contains("base_url = \"http://localhost:9999\""));
}
