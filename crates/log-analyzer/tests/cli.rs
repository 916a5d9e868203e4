//! End-to-end runs of the `log-analyzer` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

fn analyzer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_log-analyzer"))
        .args(args)
        .env_remove("LOG_ANALYZER_LOG_LEVEL")
        .output()
        .expect("spawn log-analyzer")
}

const A1: &str = "100 1500 10.0.0.1 200 100 GET http://a/ - DIRECT text/html";
const A2: &str = "100 1500 10.0.0.1 200 250 GET http://a/ - DIRECT text/html";
const A3: &str = "101 1500 10.0.0.1 200 0 GET http://a/ - DIRECT text/html";
const B1: &str = "102 1500 10.0.0.2 404 50 GET http://b/ - DIRECT text/html";

#[test]
fn test_cli_writes_requested_metrics() {
    let tmp = TempDir::new().unwrap();
    let first = write_log(tmp.path(), "a.log", &[A1, A2]);
    let second = write_log(tmp.path(), "b.log", &[A3, B1, "garbage line"]);
    let output = tmp.path().join("out.json");

    let result = analyzer(&[
        "--input",
        first.to_str().unwrap(),
        "--input",
        second.to_str().unwrap(),
        "--mfip",
        "--lfip",
        "--bytes",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{:?}", result);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "most_frequent_ip": "10.0.0.1",
            "least_frequent_ip": "10.0.0.2",
            "total_bytes": 400,
        })
    );
}

#[test]
fn test_cli_no_valid_data_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let input = write_log(tmp.path(), "junk.log", &["one two three", ""]);
    let output = tmp.path().join("out.json");

    let result = analyzer(&[
        "--input",
        input.to_str().unwrap(),
        "--eps",
        output.to_str().unwrap(),
    ]);

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("No valid data"));
    assert!(!output.exists());
}

#[test]
fn test_cli_missing_input_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out.json");

    let result = analyzer(&[
        "--input",
        tmp.path().join("absent.log").to_str().unwrap(),
        output.to_str().unwrap(),
    ]);

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_cli_log_file_receives_output() {
    let tmp = TempDir::new().unwrap();
    let input = write_log(tmp.path(), "a.log", &[A1]);
    let output = tmp.path().join("out.json");
    let log = tmp.path().join("run.log");

    let result = analyzer(&[
        "--input",
        input.to_str().unwrap(),
        "--eps",
        "--log-file",
        log.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{:?}", result);

    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("Log Analyzer"));
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{\n  \"events_per_second\": 1.0\n}\n"
    );
}
