use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.max_array_capacity, 1 << 20);
    assert!(!config.log_method_listings);
}

#[test]
fn json_overrides_only_given_keys() {
    let config = EngineConfig::from_json(r#"{"max_array_capacity": 64}"#).unwrap();
    assert_eq!(
        config,
        EngineConfig {
            max_array_capacity: 64,
            ..EngineConfig::default()
        }
    );
}

#[test]
fn json_rejects_unknown_keys() {
    assert!(matches!(
        EngineConfig::from_json(r#"{"max_capacity": 64}"#),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn vars_override_defaults() {
    let config = EngineConfig::from_vars(|var| match var {
        MAX_ARRAY_CAPACITY_VAR => Some(" 128 ".to_owned()),
        LOG_LISTINGS_VAR => Some("true".to_owned()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.max_array_capacity, 128);
    assert!(config.log_method_listings);
}

#[test]
fn unset_vars_keep_defaults() {
    assert_eq!(
        EngineConfig::from_vars(|_| None).unwrap(),
        EngineConfig::default()
    );
}

#[test]
fn invalid_vars_are_reported() {
    let err = EngineConfig::from_vars(|var| {
        (var == MAX_ARRAY_CAPACITY_VAR).then(|| "lots".to_owned())
    })
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "environment variable FLATSTRUCT_MAX_ARRAY_CAPACITY has invalid value `lots`"
    );

    let err = EngineConfig::from_vars(|var| (var == LOG_LISTINGS_VAR).then(|| "maybe".to_owned()))
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidEnv {
            var: LOG_LISTINGS_VAR,
            ..
        }
    ));
}
