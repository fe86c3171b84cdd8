use mesh_cli::MeshConfig;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

/// Helper: write TOML content to a temp file and load it.
fn load_config_from_str(toml_content: &str) -> MeshConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.toml");
    std::fs::write(&path, toml_content).unwrap();
    MeshConfig::load_from(&path)
}

#[test]
fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = MeshConfig::load_from(&dir.path().join("nonexistent.toml"));
    assert_eq!(config, MeshConfig::default());
    assert_eq!(config.storage.path, PathBuf::from("mesh.db"));
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn full_file() {
    let config = load_config_from_str(
        r#"
[storage]
path = "/var/lib/mesh/site.db"

[logging]
filter = "mesh_model=debug,info"
"#,
    );
    assert_eq!(config.storage.path, PathBuf::from("/var/lib/mesh/site.db"));
    assert_eq!(config.logging.filter, "mesh_model=debug,info");
}

#[test]
fn partial_file_keeps_other_defaults() {
    let config = load_config_from_str(
        r#"
[logging]
filter = "warn"
"#,
    );
    assert_eq!(config.storage.path, PathBuf::from("mesh.db"));
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn invalid_toml_falls_back_to_defaults() {
    let config = load_config_from_str("[storage\npath = ");
    assert_eq!(config, MeshConfig::default());
}

#[test]
fn wrong_type_falls_back_to_defaults() {
    let config = load_config_from_str("[storage]\npath = 42\n");
    assert_eq!(config, MeshConfig::default());
}
