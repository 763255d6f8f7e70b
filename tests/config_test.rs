//! Integration tests for Settings config loading with layered precedence.
//!
//! Note: These tests skip the global config (`load_from(None, ..)`) and clear
//! the env vars they do not set, so the developer's own settings do not leak in.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;

use nodetree::application::ApplicationResult;
use nodetree::config::{local_config_path, Settings};

static CLEAR_ENV: Once = Once::new();

/// Load with local config only, ignoring any global config file.
fn load_local(dir: &Path) -> ApplicationResult<Settings> {
    CLEAR_ENV.call_once(|| {
        std::env::remove_var("NODETREE_STRUCTURE_FILE");
        std::env::remove_var("NODETREE_COLOR");
    });
    Settings::load_from(None, Some(dir))
}

#[test]
fn given_no_local_config_when_load_then_returns_defaults_for_file() {
    let dir = TempDir::new().unwrap();

    let settings = load_local(dir.path()).expect("load settings");

    assert_eq!(settings.structure_file, None);
}

#[test]
fn given_local_config_when_load_then_resolves_structure_file_against_dir() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "structure_file = \"forest.toml\"\ncolor = false\n",
    )
    .unwrap();

    // Act
    let settings = load_local(dir.path()).expect("load settings");

    // Assert
    assert_eq!(
        settings.structure_file,
        Some(dir.path().join("forest.toml"))
    );
    assert!(!settings.color);
}

#[test]
fn given_absolute_structure_file_when_load_then_keeps_it() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "structure_file = \"/srv/forest.toml\"\n",
    )
    .unwrap();

    let settings = load_local(dir.path()).unwrap();

    assert_eq!(settings.structure_file, Some(PathBuf::from("/srv/forest.toml")));
}

#[test]
fn given_malformed_local_config_when_load_then_returns_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "color = [not toml").unwrap();

    let err = load_local(dir.path()).unwrap_err();

    assert!(err.to_string().starts_with("config error"));
}

/// The only test touching env vars, and the only one asserting tree_title.
#[test]
fn given_env_var_when_load_then_overrides_local_config() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "tree_title = \"local\"\n").unwrap();

    std::env::set_var("NODETREE_TREE_TITLE", "from-env");
    let settings = load_local(dir.path());
    std::env::remove_var("NODETREE_TREE_TITLE");

    assert_eq!(settings.unwrap().tree_title, "from-env");
}

#[test]
fn given_global_and_local_config_when_load_from_then_local_wins() {
    let global_dir = TempDir::new().unwrap();
    let global_path = global_dir.path().join("nodetree.toml");
    fs::write(
        &global_path,
        "structure_file = \"global.toml\"\ncolor = false\n",
    )
    .unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "structure_file = \"local.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load_from(Some(&global_path), Some(dir.path())).unwrap();

    assert_eq!(settings.structure_file, Some(dir.path().join("local.toml")));
    assert!(!settings.color);
}
