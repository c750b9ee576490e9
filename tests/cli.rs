use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

const MIXED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/nagios/mixed.ndjson");
const PASSING: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/nagios/passing.ndjson");

fn cmd() -> Command {
    Command::cargo_bin("goss-nagios").unwrap()
}

#[test]
fn report_ok_from_file() {
    cmd()
        .args(["report", "--input", PASSING, "--spec-file", "/srv/goss/goss.yaml"])
        .assert()
        .code(0)
        .stdout("GOSS-goss.yaml OK - Count: 3, Failed: 0, Skipped: 1, Duration: 1.500s\n");
}

#[test]
fn report_critical_perf_and_verbose() {
    cmd()
        .args(["report", "-i", MIXED, "-g", "checks/web.yaml", "-o", "perfdata,verbose"])
        .assert()
        .code(2)
        .stdout(
            "GOSS-web.yaml CRITICAL - Count: 5, Failed: 2, Skipped: 1, Duration: 1.550s\
             |total=5 failed=2 skipped=1 duration=1.550s\n\
             Fail 1 - File: /etc/passwd: mode: Expected \"0644\" to equal \"0600\" (expected: \"0600\", actual: \"0644\")\n\
             Fail 2 - Command: uptime: exit-status: Error: command not found\n",
        );
}

#[test]
fn report_exclude_raw() {
    cmd()
        .args(["report", "-i", MIXED, "-o", "verbose,exclude_raw"])
        .assert()
        .code(2)
        .stdout(contains("Fail 1 - File: /etc/passwd: mode: Expected \"0644\" to equal \"0600\"\n"))
        .stdout(contains("actual:").not());
}

#[test]
fn report_from_stdin_uses_default_spec_file() {
    cmd()
        .arg("report")
        .write_stdin(std::fs::read_to_string(MIXED).unwrap())
        .assert()
        .code(2)
        .stdout(contains("GOSS-goss.yaml CRITICAL - Count: 5, Failed: 2, Skipped: 1"))
        .stdout(contains("|total=").not())
        .stdout(contains("Fail ").not());
}

#[test]
fn report_empty_input() {
    cmd()
        .arg("report")
        .write_stdin("")
        .assert()
        .code(0)
        .stdout("GOSS-goss.yaml OK - Count: 0, Failed: 0, Skipped: 0, Duration: 0.000s\n");
}

#[test]
fn report_config_file_layer() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "spec_file = \"/etc/goss/base.yaml\"").unwrap();
    writeln!(config, "format_options = [\"perfdata\"]").unwrap();

    let path = config.path().to_str().unwrap().to_string();

    cmd()
        .args(["report", "-i", PASSING, "-c", path.as_str()])
        .assert()
        .code(0)
        .stdout(contains("GOSS-base.yaml OK"))
        .stdout(contains("|total=3 failed=0 skipped=1 duration=1.500s"));

    cmd()
        .args(["report", "-i", PASSING, "-c", path.as_str(), "-g", "override.yaml", "-o", "verbose"])
        .assert()
        .code(0)
        .stdout(contains("GOSS-override.yaml OK"))
        .stdout(contains("|total=").not());
}

#[test]
fn report_unknown_option_is_operational_error() {
    cmd()
        .args(["report", "-i", PASSING, "-o", "pretty"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("pretty"));
}

#[test]
fn report_malformed_input_is_operational_error() {
    cmd()
        .arg("report")
        .write_stdin("{\"resource_type\": \"File\"}\n")
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("line 1"));
}

#[test]
fn report_missing_input_file() {
    cmd()
        .args(["report", "-i", "/nonexistent/results.ndjson"])
        .assert()
        .code(1)
        .stdout("");
}

#[test]
fn options_lists_names() {
    cmd()
        .arg("options")
        .assert()
        .success()
        .stdout("perfdata\nverbose\nexclude_raw (global)\n");
}

#[test]
fn options_json() {
    let output = cmd().args(["options", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], serde_json::json!(["perfdata", "verbose"]));
    assert_eq!(value["global"], serde_json::json!(["exclude_raw"]));
}

#[test]
fn config_shows_layers_and_file_digest() {
    use sha2::{Digest, Sha256};

    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "spec_file = \"/etc/goss/base.yaml\"").unwrap();
    writeln!(config, "[feed]").unwrap();
    writeln!(config, "channel_capacity = 8").unwrap();
    config.flush().unwrap();

    let path = config.path().to_str().unwrap().to_string();
    let expected_digest = hex::encode(Sha256::digest(std::fs::read(&path).unwrap()));

    let output = cmd()
        .args(["config", "-c", path.as_str(), "-o", "verbose"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["config"]["spec_file"], "/etc/goss/base.yaml");
    assert_eq!(value["config"]["format_options"], serde_json::json!(["verbose"]));
    assert_eq!(value["config"]["feed"]["channel_capacity"], 8);

    let sources = value["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0]["origin"], "builtin");
    assert_eq!(sources[1]["origin"], "file");
    assert_eq!(sources[1]["path"], path.as_str());
    assert_eq!(sources[1]["digest"], expected_digest.as_str());
    assert_eq!(sources[2]["origin"], "cli");
    assert!(sources[2].get("digest").is_none());
}

#[test]
fn config_rejects_unknown_option() {
    cmd()
        .args(["config", "-o", "pretty"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("pretty"));
}

#[cfg(unix)]
#[test]
fn report_sigterm_stops_feed_and_still_reports() {
    use std::process::{Command as StdCommand, Stdio};
    use std::time::Duration;

    let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin("goss-nagios"))
        .arg("report")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // let the handler install while the feed waits on stdin
    std::thread::sleep(Duration::from_millis(500));
    let status = StdCommand::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    {
        let mut stdin = child.stdin.take().unwrap();
        let input = std::fs::read_to_string(PASSING).unwrap();
        let _ = stdin.write_all(input.as_bytes());
    }

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "GOSS-goss.yaml OK - Count: 0, Failed: 0, Skipped: 0, Duration: 0.000s\n"
    );
}
