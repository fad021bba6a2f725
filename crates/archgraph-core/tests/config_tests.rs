use archgraph_core::config::{
    AnalysisConfig, DEFAULT_ENDPOINT, DEFAULT_GOD_CALLABLES, DEFAULT_MAX_CYCLE_LENGTH,
};
use archgraph_core::{BackendKind, Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.graph.backend, BackendKind::Surreal);
    assert_eq!(config.graph.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(config.indexer.extensions, vec!["json"]);
    assert_eq!(config.analysis.god_callables, DEFAULT_GOD_CALLABLES);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_to_toml() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("[graph]"));
    assert!(toml_str.contains("[indexer]"));
    assert!(toml_str.contains("[analysis]"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[graph]
backend = "memory"
endpoint = "mem://"

[indexer]
extensions = ["json", "bsl"]

[analysis]
god_callables = 80
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.graph.backend, BackendKind::Memory);
    assert_eq!(config.graph.endpoint, "mem://");
    assert_eq!(config.indexer.extensions, vec!["json", "bsl"]);
    assert_eq!(config.analysis.god_callables, 80);
    // Unset keys keep their defaults.
    assert_eq!(config.analysis.max_cycle_length, DEFAULT_MAX_CYCLE_LENGTH);
}

#[test]
fn test_from_file_validates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archgraph.toml");

    std::fs::write(&path, "[analysis]\nmax_cycle_length = 1\n").unwrap();
    assert!(matches!(Config::from_file(&path), Err(ConfigError::Invalid(_))));

    std::fs::write(&path, "[graph\n").unwrap();
    assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError(_))));

    assert!(matches!(
        Config::from_file(dir.path().join("missing.toml")),
        Err(ConfigError::ReadError(_))
    ));
}

#[test]
fn test_password_is_not_written() {
    let mut config = Config::default();
    config.graph.username = Some("root".to_string());
    config.graph.password = Some("secret".to_string());

    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("root"));
    assert!(!toml_str.contains("secret"));
}

#[test]
fn test_env_overrides() {
    std::env::set_var("ARCHGRAPH_NAMESPACE", "override_ns");
    std::env::set_var("ARCHGRAPH_BACKEND", "not-a-backend");

    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(config.graph.namespace, "override_ns");
    // Unparsable values leave the setting alone.
    assert_eq!(config.graph.backend, BackendKind::Surreal);

    std::env::remove_var("ARCHGRAPH_NAMESPACE");
    std::env::remove_var("ARCHGRAPH_BACKEND");
}

#[test]
fn test_analysis_defaults() {
    let analysis = AnalysisConfig::default();
    assert_eq!(analysis.coupling_ceiling, 10.0);
    assert_eq!(analysis.god_outgoing, 15);
    assert_eq!(analysis.god_incoming, 20);
}

#[test]
fn test_validate_rejects_unusable_coupling_ceiling() {
    for ceiling in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut config = Config::default();
        config.analysis.coupling_ceiling = ceiling;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
