use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::Value;

fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let output = Command::cargo_bin("refactor")
        .unwrap()
        .env_remove("REFACTOR_QUERY_CMD")
        .current_dir(dir.path())
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_version_json() {
    let temp_dir = TempDir::new().unwrap();
    let json = run_json(&temp_dir, &["version"]);
    assert_eq!(json["name"], "refactor");
    assert_eq!(json["version"], "0.1.0");
}

#[test]
fn test_batch_json_report() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir
        .child("a.rs")
        .write_str("fn a() { b() }\nfn b() {}\n")
        .unwrap();

    let json = run_json(&temp_dir, &["batch", "--map", "a=b", "--map", "b=a", "--dry-run"]);

    assert_eq!(json["operation"], "batch");
    assert_eq!(json["dryRun"], true);
    assert_eq!(json["totalChanges"], 3);
    assert_eq!(json["totalFiles"], 1);
    assert_eq!(json["circularRenames"], 2);
    assert_eq!(json["interrupted"], false);

    let mappings = json["mapping"].as_array().unwrap();
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0]["old"], "a");
    assert_eq!(mappings[0]["new"], "b");
    assert_eq!(mappings[0]["changes"], 1);
    assert_eq!(mappings[1]["changes"], 2);
    assert_eq!(mappings[1]["filesTouched"].as_array().unwrap().len(), 1);
}

#[test]
fn test_find_json() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir
        .child("app.ts")
        .write_str("import { render } from './render';\nexport { render };\n")
        .unwrap();

    let json = run_json(&temp_dir, &["find", "render"]);

    assert_eq!(json["operation"], "find");
    assert_eq!(json["summary"]["occurrences"], 2);
    assert_eq!(json["summary"]["roles"]["imports"], 1);
    assert_eq!(json["summary"]["roles"]["exports"], 1);
    assert_eq!(json["occurrences"][0]["line"], 1);
    assert_eq!(json["occurrences"][0]["column"], 9);
    assert_eq!(json["occurrences"][0]["role"], "import");
}

#[test]
fn test_rename_json_lists_changes() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir.child("a.py").write_str("def area(r):\n    return area(r)\n").unwrap();

    let json = run_json(&temp_dir, &["rename", "area", "size", "--dry-run"]);

    assert_eq!(json["operation"], "rename");
    assert_eq!(json["dryRun"], true);
    assert_eq!(json["changedLocations"], 2);
    assert_eq!(json["changes"][0]["role"], "definition");
    assert_eq!(json["changes"][0]["after"], "def size(r):");
}

#[test]
fn test_plan_json_steps() {
    let temp_dir = TempDir::new().unwrap();
    let json = run_json(&temp_dir, &["plan", "--map", "A=B", "--map", "C=A"]);

    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["old"], "A");
    assert_eq!(steps[1]["old"], "C");
    assert_eq!(json["dependsOn"][1], 0);
    assert_eq!(json["circularRenames"], 0);
}
