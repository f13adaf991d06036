//! Tests for loading, saving and applying configuration files

use face_overlay::config::{Config, FilterSpec, EXAMPLE_CONFIG};
use face_overlay::filters::AnchorKind;
use face_overlay::session::FilterSelection;
use face_overlay::Error;
use std::path::PathBuf;

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.yaml");

    let mut config = Config::default();
    config.default_filter = "mask".to_string();
    config.assets.dir = PathBuf::from("/srv/filters");
    config.filters.insert(
        "crown".to_string(),
        FilterSpec {
            image: PathBuf::from("crown.png"),
            anchor: AnchorKind::Forehead,
            width_factor: 1.6,
            height_factor: 0.7,
        },
    );
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.default_filter, "mask");
    assert_eq!(loaded.assets.dir, PathBuf::from("/srv/filters"));
    assert_eq!(loaded.filters, config.filters);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_example_config_file_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.yaml");
    std::fs::write(&path, EXAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(
        FilterSelection::from_name(&config.default_filter),
        FilterSelection::None
    );
    let registry = config.build_registry();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ears", "glasses", "mask", "whiskers"]);
}

#[test]
fn test_unknown_anchor_is_kept_but_never_drawn() {
    let yaml = r#"
filters:
  beard:
    image: "beard.png"
    anchor: "chin"
    width_factor: 1.0
    height_factor: 1.0
  glasses:
    image: "glasses.png"
    anchor: "eyes"
    width_factor: 2.2
    height_factor: 0.5
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.filters["beard"].anchor, AnchorKind::Unsupported);
    assert_eq!(config.build_registry().len(), 2);
}

#[test]
fn test_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "filters: [not, a, map").unwrap();
    assert!(matches!(Config::from_file(&path), Err(Error::ConfigError(_))));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        Config::from_file("/definitely/not/here.yaml"),
        Err(Error::Io(_))
    ));
}
