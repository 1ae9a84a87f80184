use std::{env, fs, process::Command};

fn burrow(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_burrow"))
        .args(args)
        .output()
        .expect("failed to launch burrow binary")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn generated_layouts_decode_to_the_same_grid() {
    let plain = burrow(&["generate", "--seed", "3", "--width", "9", "--height", "5"]);
    assert!(plain.status.success());
    let grid = stdout(&plain);
    let rows: Vec<&str> = grid.lines().collect();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.chars().count() == 9));

    let encoded = burrow(&[
        "generate", "--seed", "3", "--width", "9", "--height", "5", "--encode",
    ]);
    assert!(encoded.status.success());
    let transfer = stdout(&encoded);
    assert!(transfer.starts_with("burrow:v1:9x5:"));

    let decoded = burrow(&["decode", transfer.trim()]);
    assert!(decoded.status.success());
    assert_eq!(stdout(&decoded), grid);
}

#[test]
fn run_reports_arrival_as_json() {
    let path = env::temp_dir().join(format!("burrow-corridor-{}.txt", std::process::id()));
    fs::write(&path, "A..T\n").expect("layout file is writable");

    let output = burrow(&["run", path.to_str().expect("utf-8 temp path")]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("report is json");
    assert_eq!(report["all_arrived"], serde_json::Value::Bool(true));
    assert_eq!(report["ticks"], 3);
    assert_eq!(report["agents"][0]["report"]["arrived_after"], 3);
}

#[test]
fn missing_layout_file_fails() {
    let output = burrow(&["run", "no-such-layout.txt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read layout from no-such-layout.txt"));
}
