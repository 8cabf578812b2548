use std::path::Path;

use assert_cmd::Command;

fn freebies(db_path: &Path) -> Command {
    let mut command = Command::cargo_bin("freebies").expect("binary not built");
    command.arg("--db").arg(db_path).env_remove("FREEBIES_DB");

    command
}

#[test]
fn test_seed_prints_confirmation() {
    // Arrange
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("freebies.db");

    // Act
    let output = freebies(&db_path)
        .arg("seed")
        .output()
        .expect("failed to run seed");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Database seeded successfully!"
    );
    assert!(db_path.exists());
}

#[test]
fn test_debug_shell_sees_seeded_rows() {
    // Arrange
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("freebies.db");
    freebies(&db_path)
        .arg("seed")
        .assert()
        .success();

    // Act
    let output = freebies(&db_path)
        .arg("debug")
        .write_stdin("freebies\noldest\nquit\n")
        .output()
        .expect("failed to run debug");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alice owns a T-Shirt from TechCorp"), "{stdout}");
    assert!(stdout.contains("Bob owns a Mug from TechCorp"), "{stdout}");
    assert!(stdout.contains("Alice owns a Sticker from Innovate Inc."), "{stdout}");
    assert!(stdout.contains("<Company Innovate Inc.> founded 1995"), "{stdout}");
}

#[test]
fn test_debug_shell_commit_survives_restart() {
    // Arrange
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("freebies.db");
    freebies(&db_path).arg("seed").assert().success();
    freebies(&db_path)
        .arg("debug")
        .write_stdin("give-away 1 2 3\ncommit\n")
        .assert()
        .success();

    // Act
    let output = freebies(&db_path)
        .arg("debug")
        .write_stdin("received 2 Sticker\nreceived 1 Sticker\n")
        .output()
        .expect("failed to run debug");

    // Assert
    let stdout = String::from_utf8_lossy(&output.stdout);
    let answers: Vec<&str> = stdout
        .split("freebies> ")
        .map(str::trim)
        .filter(|answer| *answer == "true" || *answer == "false")
        .collect();
    assert_eq!(answers, vec!["true", "false"]);
}

#[test]
fn test_db_path_from_environment() {
    // Arrange
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("nested").join("env.db");

    // Act
    let output = Command::cargo_bin("freebies")
        .expect("binary not built")
        .env("FREEBIES_DB", &db_path)
        .arg("seed")
        .output()
        .expect("failed to run seed");

    // Assert
    assert!(output.status.success());
    assert!(db_path.exists());
}
