use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ENV_KEYS: [&str; 14] = [
    "DATA_FOLDER",
    "PERSIST_DIRECTORY",
    "CHUNK_SIZE",
    "CHUNK_OVERLAP",
    "SEARCH_K",
    "EMBEDDING_PROVIDER",
    "EMBEDDING_MODEL",
    "EMBEDDING_DIMENSIONS",
    "EMBEDDING_ENDPOINT",
    "CHAT_MODEL",
    "GOOGLE_API_KEY",
    "REQUEST_TIMEOUT_SECS",
    "MAX_RETRIES",
    "RUST_LOG",
];

/// A `docrag` invocation isolated in `dir` with the offline hashing embedder.
fn docrag(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docrag").unwrap();
    cmd.current_dir(dir);
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("DATA_FOLDER", "data")
        .env("PERSIST_DIRECTORY", "storage")
        .env("EMBEDDING_PROVIDER", "hashing")
        .env("EMBEDDING_DIMENSIONS", "256");
    cmd
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    for (name, content) in files {
        fs::write(data.join(name), content).unwrap();
    }
    dir
}

#[test]
fn test_index_then_search_json() {
    let dir = workspace(&[
        ("rust.txt", "Rust guarantees memory safety without a garbage collector."),
        ("tea.txt", "Green tea is brewed at a lower temperature than black tea."),
    ]);

    docrag(dir.path())
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexing complete!"));
    assert!(dir.path().join("storage/index.json").is_file());

    let output = docrag(dir.path())
        .args(["search", "memory safety garbage collector", "-k", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["source"], "rust.txt");
    assert_eq!(hits[0]["rank"], 1);
}

#[test]
fn test_index_warns_about_unsupported_files() {
    let dir = workspace(&[
        ("notes.txt", "Some notes about the project."),
        ("data.xyz", "not a document"),
    ]);

    docrag(dir.path())
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("data.xyz"))
        .stdout(predicate::str::contains("Files processed: 1"));
}

#[test]
fn test_index_without_documents_fails() {
    let dir = workspace(&[]);

    docrag(dir.path())
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No supported documents"));
}

#[test]
fn test_status_and_clear() {
    let dir = workspace(&[("a.txt", "alpha beta gamma")]);

    docrag(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No index found"));

    docrag(dir.path()).arg("index").assert().success();

    docrag(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total entries:"));

    docrag(dir.path())
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));
    assert!(!dir.path().join("storage/index.json").exists());
}

#[test]
fn test_search_without_index_fails() {
    let dir = workspace(&[("a.txt", "alpha")]);

    docrag(dir.path())
        .args(["search", "alpha"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No index found"));
}

#[test]
fn test_ask_requires_api_key() {
    let dir = workspace(&[("a.txt", "alpha")]);

    docrag(dir.path())
        .args(["ask", "what is alpha?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));
}

#[test]
fn test_invalid_chunking_is_rejected_at_startup() {
    let dir = workspace(&[("a.txt", "alpha")]);

    docrag(dir.path())
        .env("CHUNK_SIZE", "100")
        .env("CHUNK_OVERLAP", "100")
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CHUNK_OVERLAP"));
}

#[test]
fn test_init_creates_directories() {
    let dir = TempDir::new().unwrap();

    docrag(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("docrag index"));
    assert!(dir.path().join("data").is_dir());
    assert!(dir.path().join("storage").is_dir());
}
