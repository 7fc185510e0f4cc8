use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Once;
use tempfile::TempDir;
use tracing::{error, info};

static INIT: Once = Once::new();

/// Initialize logging exactly once for all tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    });
}

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../test-data")
}

fn write_config(dir: &TempDir, data_dir: &Path) -> PathBuf {
    let path = dir.path().join("resource-map.jsonc");
    let config = format!(
        r#"{{
  // test config
  "dataDir": "{}",
  "google": {{ "apiKey": "" }}
}}"#,
        data_dir.display()
    );
    fs::write(&path, config).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_resource-map"))
        .args(args)
        .env_remove("GOOGLE_MAPS_API_KEY")
        .output()
        .unwrap();

    if !output.status.success() {
        error!("Command {:?} failed with status: {}", args, output.status);
        error!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    } else {
        info!("Command {:?} executed successfully", args);
    }
    output
}

fn listed_ids(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|l| l.strip_prefix('['))
        .filter_map(|l| l.split_once(']'))
        .map(|(id, _)| id.to_string())
        .collect()
}

#[test]
fn test_list_filters_fixture_csv() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &fixture_dir());
    let config = config.to_str().unwrap();

    let output = run(&["--config", config, "list"]);
    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["1", "2", "3", "4", "7", "8"]);

    let output = run(&["--config", config, "list", "--category", "church"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[3] 恩典教會"));
    assert!(stdout.contains("    教會 | 桃園市桃園區中正路100號"));
    assert_eq!(listed_ids(&output), vec!["3", "7"]);

    let output = run(&["--config", config, "list", "--search", "台北"]);
    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["1", "2"]);

    let output = run(&[
        "--config", config, "list", "--search", "台北", "--category", "locksmith",
    ]);
    assert!(output.status.success());
    assert!(listed_ids(&output).is_empty());
}

#[test]
fn test_list_search_covers_phone_and_category_label() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &fixture_dir());
    let config = config.to_str().unwrap();

    let output = run(&["--config", config, "list", "--search", "07-288"]);
    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["8"]);

    let output = run(&["--config", config, "list", "--search", "鎖匠"]);
    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["4", "8"]);

    let output = run(&["list", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("name, address, phone or category label"));
}

#[test]
fn test_list_exports_csv() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &fixture_dir());
    let export = dir.path().join("list.csv");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "list",
        "--category",
        "locksmith",
        "--csv",
        export.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let exported = fs::read_to_string(&export).unwrap();
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines[0], "record_id,title,subtitle");
    assert_eq!(lines[1], "4,安心開鎖,鎖匠 | 新北市板橋區文化路一段50號");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_list_falls_back_to_sample_data() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty");
    fs::create_dir(&empty).unwrap();
    let config = write_config(&dir, &empty);

    let output = run(&["--config", config.to_str().unwrap(), "list"]);
    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["1", "2", "3", "4"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("[4] 某鎖匠店"));
}

#[test]
fn test_list_rejects_unknown_category() {
    init_logging();
    let output = run(&["list", "--category", "bakery"]);
    assert!(!output.status.success());
}

#[test]
fn test_generated_configs_validate() {
    init_logging();
    let dir = TempDir::new().unwrap();

    for template in ["basic", "full"] {
        let path = dir.path().join(format!("{}.jsonc", template));
        let path = path.to_str().unwrap();

        let output = run(&["generate-config", "--type", template, "--output", path]);
        assert!(output.status.success());
        assert!(fs::read_to_string(path).unwrap().contains("candidateFiles"));

        let output = run(&["--config", path, "validate-config"]);
        assert!(output.status.success());
    }

    let output = run(&["generate-config", "--type", "fancy", "--output", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_generate_config_into_directory_uses_default_name() {
    init_logging();
    let dir = TempDir::new().unwrap();

    let output = run(&["generate-config", "--output", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(dir.path().join("resource-map.jsonc").exists());
}

#[test]
fn test_validate_config_rejects_bad_values() {
    init_logging();
    let dir = TempDir::new().unwrap();

    let zoom = dir.path().join("zoom.jsonc");
    fs::write(&zoom, r#"{ "initialZoom": 30 }"#).unwrap();
    let output = run(&["--config", zoom.to_str().unwrap(), "validate-config"]);
    assert!(!output.status.success());

    let unknown = dir.path().join("unknown.jsonc");
    fs::write(&unknown, r#"{ "zoomLevel": 3 }"#).unwrap();
    let output = run(&["--config", unknown.to_str().unwrap(), "validate-config"]);
    assert!(!output.status.success());

    let missing = dir.path().join("missing.jsonc");
    let output = run(&["--config", missing.to_str().unwrap(), "validate-config"]);
    assert!(!output.status.success());
}

#[test]
fn test_plot_requires_api_key() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &fixture_dir());
    let geojson = dir.path().join("out.geojson");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "plot",
        "--output",
        geojson.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Google Maps"));
    assert!(!geojson.exists());
}
