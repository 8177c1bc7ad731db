//! Configuration resolution and graceful degradation
//!
//! Tests that manipulate STUDIO_ROOT_FOLDER / STUDIO_ROOT are marked
//! #[serial] so they never run in parallel.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use studio_common::config::{
    CompiledDefaults, ConfigSource, RootFolderInitializer, RootFolderResolver, TomlConfig, DEFAULT_PORT,
    ROOT_ENV, ROOT_FOLDER_ENV,
};

fn clear_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(ROOT_ENV);
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.port, DEFAULT_PORT);
    assert_eq!(defaults.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_env();

    let root_folder = RootFolderResolver::new("test-module").resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_root_folder() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/studio-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/studio-test-env-folder"));

    clear_env();
}

#[test]
#[serial]
fn test_resolver_root_folder_takes_precedence_over_root() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/studio-priority-1");
    env::set_var(ROOT_ENV, "/tmp/studio-priority-2");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/studio-priority-1"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_arg_beats_environment() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/studio-from-env");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/studio-from-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/studio-from-cli"));

    clear_env();
}

#[test]
#[serial]
fn test_environment_beats_toml() {
    clear_env();
    env::set_var(ROOT_ENV, "/tmp/studio-env-root");

    let toml = TomlConfig::from_toml_str("root_folder = \"/tmp/studio-toml-root\"").unwrap();
    let root_folder = RootFolderResolver::new("test-module").with_toml(&toml).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/studio-env-root"));

    clear_env();
}

#[test]
#[serial]
fn test_toml_used_when_no_cli_or_env() {
    clear_env();

    let toml = TomlConfig::from_toml_str("root_folder = \"/tmp/studio-toml-root\"").unwrap();
    let root_folder = RootFolderResolver::new("test-module").with_toml(&toml).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/studio-toml-root"));
}

#[test]
fn test_missing_toml_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let loaded = TomlConfig::load(Some(&missing)).unwrap();
    assert_eq!(loaded.source, ConfigSource::Missing(missing.clone()));
    let config = loaded.config;
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_toml_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 6000\n[logging]\nlevel = \"warn\"\n").unwrap();

    let loaded = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(loaded.source, ConfigSource::File(path.clone()));
    let config = loaded.config;
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_malformed_toml_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = [not toml").unwrap();

    assert!(TomlConfig::load(Some(&path)).is_err());
}

#[test]
fn test_initializer_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("studio");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("studio.db"));
}
