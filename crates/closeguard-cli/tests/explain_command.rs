use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_closeguard_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("closeguard")
}

#[test]
fn test_explain_ok_to_close() {
    let mut cmd = Command::new(get_closeguard_bin());
    cmd.arg("explain").arg("--other-windows").arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Downloads:          ok"))
        .stdout(predicate::str::contains("OK to close"));
}

#[test]
fn test_explain_last_window_downloads() {
    let mut cmd = Command::new(get_closeguard_bin());
    cmd.arg("explain").arg("--downloads").arg("3");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "browser shutdown would cancel 3 download(s)",
        ))
        .stdout(predicate::str::contains("shows the download prompt first"));
}

#[test]
fn test_explain_incognito_json() {
    let mut cmd = Command::new(get_closeguard_bin());
    cmd.arg("explain")
        .arg("--downloads")
        .arg("3")
        .arg("--profile-downloads")
        .arg("1")
        .arg("--other-windows")
        .arg("2")
        .arg("--same-profile-windows")
        .arg("0")
        .arg("--profile-kind")
        .arg("incognito")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["decision"], "do_not_close");
    assert_eq!(json["first_prompt"], "downloads");
    assert_eq!(
        json["downloads"]["close_type"]["last_window_for_off_the_record_profile"],
        "incognito"
    );
    assert_eq!(json["downloads"]["blocking"], 1);
}

#[test]
fn test_explain_close_confirmation_last() {
    let mut cmd = Command::new(get_closeguard_bin());
    cmd.arg("explain")
        .arg("--tabs")
        .arg("4")
        .arg("--close-confirmation")
        .arg("last")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["multi_tab"], "needs_prompt");
    assert_eq!(json["first_prompt"], "multiple_tabs");
    assert_eq!(json["placeholder_tab"], false);
}

#[test]
fn test_explain_no_profile_manager() {
    let mut cmd = Command::new(get_closeguard_bin());
    cmd.arg("explain")
        .arg("--downloads")
        .arg("5")
        .arg("--tabs")
        .arg("4")
        .arg("--close-confirmation")
        .arg("--no-profile-manager");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK to close"));
}

#[test]
fn test_explain_unknown_profile_kind() {
    let mut cmd = Command::new(get_closeguard_bin());
    cmd.arg("explain").arg("--profile-kind").arg("system");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown profile kind 'system'"));
}
