use std::io::Write;
use std::process::Command;

fn write_temp(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

const SCENARIO: &str = r#"{
    "cycles": [
        {
            "now_ms": 1700000000000,
            "emergencies": [
                {"id": 1, "location": [10.0, 5.0], "severity": 2.0, "type": "fire", "timestamp_ms": 1700000000000},
                {"id": 9, "location": [0.0, 0.0], "severity": 9.0, "type": "flood", "timestamp_ms": 1700000000000}
            ],
            "resources": [
                {"id": 100, "location": [0.0, 0.0], "type": "fire_unit"},
                {"id": 101, "location": [5.0, 5.0], "type": "fire_unit"},
                {"id": 102, "location": [5.0, 5.0], "type": "police_unit"}
            ]
        },
        {"now_ms": 1700000060000}
    ]
}"#;

#[test]
fn run_prints_one_json_line_per_cycle() {
    let scenario = write_temp(SCENARIO);
    let output = Command::new(env!("CARGO_BIN_EXE_dispatch"))
        .args(["run", "--strategy", "greedy", "--scenario"])
        .arg(scenario.path())
        .env("RUST_LOG", "warn")
        .output()
        .expect("run dispatch binary");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["strategy"], "greedy");
    assert_eq!(lines[0]["assignments"].as_array().unwrap().len(), 3);
    assert_eq!(lines[0]["dropped"], serde_json::json!([9]));
    assert_eq!(lines[0]["backlog"], serde_json::json!([]));
    assert_eq!(lines[1]["cycle"], 2);
    assert!(lines[1]["assignments"].as_array().unwrap().is_empty());
}

#[test]
fn custom_requirement_table_is_used() {
    let scenario = write_temp(SCENARIO);
    let requirements = write_temp(r#"{"fire": [{"resource_type": "fire_unit", "quantity": 1}]}"#);
    let output = Command::new(env!("CARGO_BIN_EXE_dispatch"))
        .arg("run")
        .arg("--scenario")
        .arg(scenario.path())
        .arg("--requirements")
        .arg(requirements.path())
        .output()
        .expect("run dispatch binary");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    let assignments = first["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["resource_id"], 101);
}

#[test]
fn invalid_scenario_fails_with_context() {
    let scenario = write_temp(r#"{"cycles": [{"now_ms": 0, "emergencies": [
        {"id": 1, "location": [0.0, 0.0], "severity": 1.0, "type": "", "timestamp_ms": 0}
    ]}]}"#);
    let output = Command::new(env!("CARGO_BIN_EXE_dispatch"))
        .arg("run")
        .arg("--scenario")
        .arg(scenario.path())
        .output()
        .expect("run dispatch binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cycle 0: invalid emergencies"), "{stderr}");
}

#[test]
fn compare_prints_both_strategies() {
    let output = Command::new(env!("CARGO_BIN_EXE_dispatch"))
        .args(["compare", "--seed", "3", "--runs", "4", "--emergencies", "5", "--resources", "10"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("run dispatch binary");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().any(|l| l.starts_with("greedy")));
    assert!(stdout.lines().any(|l| l.starts_with("optimal")));
}
