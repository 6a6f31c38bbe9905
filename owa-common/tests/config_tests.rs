//! Database path resolution and config file loading
//!
//! These tests mutate process environment variables and must run serially.

use owa_common::config::{
    default_database_path, load_toml_config, resolve_database_path, TomlConfig, CONFIG_ENV_VAR,
    DATABASE_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(DATABASE_ENV_VAR, "/from/env.db");
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/from/toml.db")),
        ..TomlConfig::default()
    };

    let path = resolve_database_path(None, &config);
    env::remove_var(DATABASE_ENV_VAR);

    assert_eq!(path, PathBuf::from("/from/env.db"));
}

#[test]
#[serial]
fn test_cli_beats_env_var() {
    env::set_var(DATABASE_ENV_VAR, "/from/env.db");

    let path = resolve_database_path(Some(Path::new("/from/cli.db")), &TomlConfig::default());
    env::remove_var(DATABASE_ENV_VAR);

    assert_eq!(path, PathBuf::from("/from/cli.db"));
}

#[test]
#[serial]
fn test_toml_used_without_env_var() {
    env::remove_var(DATABASE_ENV_VAR);
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/from/toml.db")),
        ..TomlConfig::default()
    };

    assert_eq!(resolve_database_path(None, &config), PathBuf::from("/from/toml.db"));
}

#[test]
#[serial]
fn test_falls_back_to_platform_default() {
    env::remove_var(DATABASE_ENV_VAR);
    let path = resolve_database_path(None, &TomlConfig::default());
    assert_eq!(path, default_database_path());
    assert!(path.ends_with("owa.db"));
}

#[test]
#[serial]
fn test_missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_toml_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_config_env_var_locates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("owa.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "port = 9000\n[logging]\nlevel = \"debug\"").unwrap();

    env::set_var(CONFIG_ENV_VAR, &path);
    let config = load_toml_config(None);
    env::remove_var(CONFIG_ENV_VAR);

    let config = config.unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.logging.level, "debug");
}
