//! Config file loading and saving

use std::fs;

use reparser::Config;
use tempfile::TempDir;

#[test]
fn missing_file_loads_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[database]
path = "/srv/forum.sqlite"

[renderer]
command = "node"
args = ["render.js"]
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.database.path, "/srv/forum.sqlite");
    assert_eq!(config.database.table_prefix, "phpbb_");
    assert_eq!(config.reparse.batch_size, 250);
    assert_eq!(config.renderer.command, "node");
    assert_eq!(config.renderer.args, vec!["render.js"]);
    assert_eq!(config.renderer.timeout_secs, 30);
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[reparse]\nbatch_size = 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid config"));
}

#[test]
fn malformed_toml_names_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[reparse\nbatch_size = ").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn save_then_load_preserves_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.database.table_prefix = "forum_".to_string();
    config.reparse.batch_size = 42;
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}
