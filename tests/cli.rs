use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const EXPECTED_PROMPT: &str = "Garden Location: Area code 94110
Garden Size: 10 ft by 5 ft
Growing Containers: A garden bed
Sun Exposure: Full sun, Partial shade
Time Investment: Medium
Plant Preference: I want plants that can be easily found in most nurseries
Garden Goals: I want to have fresh, delicious herbs for cooking!, I want to create a haven for local pollinators!";

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: garden-quiz <COMMAND>"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("quiz"))
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_start_help() {
    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.arg("start")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: garden-quiz start"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("--templates <TEMPLATES>"));
}

#[test]
fn test_cli_no_command() {
    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: garden-quiz <COMMAND>"));
}

#[test]
fn test_quiz_without_chat_prints_prompt() {
    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.args(["quiz", "--no-chat"])
        .write_stdin("94110\n10\n5\n2\n1,3\n2\n2\n3,4\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Where is your garden located?"))
        .stdout(predicate::str::contains(EXPECTED_PROMPT));
}

#[test]
fn test_prompt_from_answers_file() {
    let temp_dir = TempDir::new().unwrap();
    let answers_path = temp_dir.path().join("answers.json");
    fs::write(
        &answers_path,
        r#"{
            "zipCode": "94110",
            "length": "10",
            "width": "5",
            "growContainers": ["A garden bed"],
            "sunTypes": ["Full sun", "Partial shade"],
            "timeInvestment": "Medium",
            "plantTypePreference": "I want plants that can be easily found in most nurseries",
            "goals": [
                "I want to have fresh, delicious herbs for cooking!",
                "I want to create a haven for local pollinators!"
            ]
        }"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.arg("prompt")
        .arg("--answers")
        .arg(&answers_path)
        .assert()
        .success()
        .stdout(format!("{}\n", EXPECTED_PROMPT));
}

#[test]
fn test_prompt_with_missing_fields_keeps_labels() {
    let temp_dir = TempDir::new().unwrap();
    let answers_path = temp_dir.path().join("answers.json");
    fs::write(&answers_path, r#"{"zipCode": "02139"}"#).unwrap();

    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.arg("prompt")
        .arg("--answers")
        .arg(&answers_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Garden Location: Area code 02139\n"))
        .stdout(predicate::str::contains("Growing Containers: \n"))
        .stdout(predicate::str::contains("Garden Goals:"));
}

#[test]
fn test_prompt_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("garden-quiz").unwrap();
    cmd.arg("prompt")
        .arg("--answers")
        .arg(temp_dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read answers"));
}
