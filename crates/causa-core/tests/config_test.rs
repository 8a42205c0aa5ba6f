use causa_core::config::*;
use causa_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = CausaConfig::from_toml("").unwrap();

    // Search defaults
    assert_eq!(config.search.algorithm, "pc-stable");
    assert_eq!(config.search.alpha, 0.05);
    assert_eq!(config.search.depth, -1);
    assert_eq!(config.search.max_path_length, -1);
    assert!(config.search.complete_rule_set);
    assert!(config.search.discriminating_path_rule);
    assert!(config.search.possible_dsep);
    assert!(!config.search.guarantee_pag);
    assert_eq!(config.search.sepset_strategy, SepsetStrategy::Greedy);
    assert_eq!(config.search.num_threads, 1);
    assert_eq!(config.search.penalty_discount, 1.0);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[search]
algorithm = "gfci"
depth = 3
sepset_strategy = "max_p"
num_threads = 4
"#;
    let config = CausaConfig::from_toml(toml).unwrap();
    assert_eq!(config.search.algorithm, "gfci");
    assert_eq!(config.search.depth, 3);
    assert_eq!(config.search.sepset_strategy, SepsetStrategy::MaxP);
    assert_eq!(config.search.num_threads, 4);
    // Non-overridden fields keep defaults
    assert_eq!(config.search.alpha, 0.05);
    assert!(config.search.complete_rule_set);
}

#[test]
fn config_serde_roundtrip() {
    let config = CausaConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = CausaConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.search.algorithm, config.search.algorithm);
    assert_eq!(roundtripped.search.depth, config.search.depth);
}

#[test]
fn negative_depth_other_than_sentinel_is_rejected() {
    let err = CausaConfig::from_toml("[search]\ndepth = -2\n").unwrap_err();
    assert_eq!(err, ConfigError::InvalidDepth { depth: -2 });
}

#[test]
fn alpha_out_of_range_is_rejected() {
    for alpha in [0.0, 1.0, -0.1, 1.5] {
        let mut config = SearchConfig::default();
        config.alpha = alpha;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAlpha { .. })));
    }
}

#[test]
fn zero_threads_is_rejected() {
    let config = SearchConfig {
        num_threads: 0,
        ..SearchConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroThreads));
}

#[test]
fn knobs_validate_independently() {
    // An unbounded depth does not constrain the path length, and vice versa.
    let config = SearchConfig {
        depth: -1,
        max_path_length: 0,
        ..SearchConfig::default()
    };
    assert!(config.validate().is_ok());
    let config = SearchConfig {
        depth: 0,
        max_path_length: -1,
        ..SearchConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn malformed_toml_reports_parse_error() {
    let err = CausaConfig::from_toml("[search\nalpha = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn depth_limit_maps_sentinel_to_none() {
    assert_eq!(depth_limit(-1), None);
    assert_eq!(depth_limit(0), Some(0));
    assert_eq!(depth_limit(3), Some(3));
}

#[test]
fn sepset_strategy_parses_names() {
    assert_eq!(SepsetStrategy::from_str_name("min_p").unwrap(), SepsetStrategy::MinP);
    assert!(SepsetStrategy::from_str_name("median_p").is_err());
    for s in [SepsetStrategy::Greedy, SepsetStrategy::MinP, SepsetStrategy::MaxP] {
        assert_eq!(SepsetStrategy::from_str_name(s.as_str()).unwrap(), s);
    }
}
