//! Integration tests for the `coach` binary.

use std::{fs, path::Path};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::PredicateBooleanExt;
use tempfile::TempDir;

const CATALOG: &str = r#"{
  "resources": [
    {
      "title": "Trauma-Informed Classrooms",
      "title_es": "Aulas Informadas por el Trauma",
      "description": "Strategies for safe and predictable routines.",
      "category": "Trauma-Informed Education",
      "resourceType": "Guide",
      "gradeLevels": ["K-5", "6-8"],
      "keywords": ["routines", "safety"],
      "url": "https://example.org/classrooms",
      "location": "California"
    },
    {
      "title": "Screening Checklist",
      "description": "A quick checklist for early warning signs.",
      "category": "Practical Tools",
      "resourceType": "Assessment",
      "keywords": ["screening"]
    },
    {
      "title": "State Guidance",
      "description": "Official guidance for schools.",
      "category": "Official Resources",
      "resourceType": "Article",
      "location": "National"
    }
  ]
}"#;

/// A command isolated from the user's config, preferences and environment.
fn coach(dir: &TempDir) -> Command {
    let config = dir.path().join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }
    let mut cmd = cargo_bin_cmd!("coach");
    cmd.current_dir(dir.path())
        .env_remove("COACH_SERVER_URL")
        .env_remove("COACH_LANGUAGE")
        .env_remove("COACH_PROVIDER")
        .env_remove("COACH_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .arg("--preferences")
        .arg(dir.path().join("preferences.json"))
        .timeout(std::time::Duration::from_secs(10));
    cmd
}

fn write_catalog(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("resources.json");
    fs::write(&path, CATALOG).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("chat"))
        .stdout(predicates::str::contains("upload"))
        .stdout(predicates::str::contains("resources"))
        .stdout(predicates::str::contains("--server"));
}

#[test]
fn test_upload_without_file_asks_for_one() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .arg("upload")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Please select a file"));
}

#[test]
fn test_lang_flag_translates_messages() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["--lang", "es", "upload"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Por favor selecciona un archivo"));
}

#[test]
fn test_lang_command_persists_choice() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["lang", "es"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Idioma"));

    let saved = fs::read_to_string(dir.path().join("preferences.json")).unwrap();
    assert!(saved.contains("\"preferredLanguage\""));
    assert!(saved.contains("\"es\""));

    coach(&dir)
        .arg("upload")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Por favor selecciona un archivo"));
}

#[test]
fn test_lang_command_rejects_unknown_code() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["lang", "fr"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("unsupported language"));
}

#[test]
fn test_resources_search_from_file() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path());
    coach(&dir)
        .arg("resources")
        .arg("--file")
        .arg(&catalog)
        .args(["--query", "CHECKLIST"])
        .assert()
        .success()
        .stdout(predicates::str::contains("1 of 3 resources found"))
        .stdout(predicates::str::contains("Screening Checklist"))
        .stdout(predicates::str::contains("Showing 1-1 of 1"))
        .stdout(predicates::str::contains("State Guidance").not());
}

#[test]
fn test_resources_category_and_locale() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path());
    coach(&dir)
        .args(["--lang", "es", "resources", "--category", "trauma", "--file"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicates::str::contains("Aulas Informadas por el Trauma"))
        .stdout(predicates::str::contains("recursos encontrados"));
}

#[test]
fn test_resources_empty_result() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path());
    coach(&dir)
        .arg("resources")
        .arg("--file")
        .arg(&catalog)
        .args(["--query", "zebra"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No resources found"))
        .stdout(predicates::str::contains("Showing").not());
}

#[test]
fn test_resources_unknown_category_fails() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path());
    coach(&dir)
        .arg("resources")
        .arg("--file")
        .arg(&catalog)
        .args(["--category", "gossip"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Unknown category: gossip"));
}

#[test]
fn test_resources_load_failure_message() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["resources", "--file", "missing.json"])
        .assert()
        .failure()
        .stderr(predicates::str::contains(
            "Failed to load resources. Please refresh the page.",
        ));
}

#[test]
fn test_config_command_writes_file() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["config", "--format", "json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("generated successfully"));

    let written = fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(written.contains("\"server_url\""));
    assert!(written.contains("\"sources_limit\": 5"));
}

#[test]
fn test_completion_script() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["completion", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicates::str::contains("coach"));
}

#[test]
fn test_invalid_server_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["--server", "not a url", "status"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid value"));
}

#[test]
fn test_interactive_browser_exits_on_quit_while_stdin_is_open() {
    use std::{
        io::Write,
        process::{Command as StdCommand, Stdio},
        thread,
        time::{Duration, Instant},
    };

    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path());
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    let mut child = StdCommand::new(env!("CARGO_BIN_EXE_coach"))
        .current_dir(dir.path())
        .env_remove("COACH_SERVER_URL")
        .env_remove("COACH_LANGUAGE")
        .env_remove("COACH_PROVIDER")
        .env_remove("COACH_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .arg("--preferences")
        .arg(dir.path().join("preferences.json"))
        .args(["resources", "--interactive", "--file"])
        .arg(&catalog)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b":q\n").unwrap();
    stdin.flush().unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break Some(status);
        }
        if Instant::now() >= deadline {
            child.kill().unwrap();
            break None;
        }
        thread::sleep(Duration::from_millis(20));
    };
    drop(stdin);

    let status = status.expect("browser kept running after :q");
    assert!(status.success());
}
