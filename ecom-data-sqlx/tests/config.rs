use std::time::Duration;

use ecom_core::config::{validate_section, ConfigError, ConfigValue, EcomConfig};
use ecom_data::DataError;
use ecom_data_sqlx::{DatabaseConfig, SqlxErrorExt};

#[test]
fn test_database_config_defaults() {
    let yaml = r#"
app:
  database:
    url: "sqlite::memory:"
"#;
    let config = EcomConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<DatabaseConfig>()
        .unwrap();

    assert_eq!(config.url, "sqlite::memory:");
    assert_eq!(config.max_connections, 5);
    assert_eq!(config.min_connections, 0);
    assert_eq!(config.acquire_timeout, Duration::from_secs(30));
    assert!(config.run_migrations);
}

#[test]
fn test_database_config_overrides() {
    let yaml = r#"
app:
  database:
    url: "postgres://shop@db/catalog"
    pool:
      max: 20
      min: 2
      timeout: 3
    migrate: false
"#;
    let db = EcomConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<DatabaseConfig>()
        .unwrap();

    assert_eq!(db.max_connections, 20);
    assert_eq!(db.min_connections, 2);
    assert_eq!(db.acquire_timeout, Duration::from_secs(3));
    assert!(!db.run_migrations);
    assert_eq!(db.scheme(), "postgres");
}

#[test]
fn test_database_config_env_style_strings() {
    // values overlaid from env vars arrive as strings
    let mut config = EcomConfig::empty();
    config.set("app.database.url", ConfigValue::String("sqlite::memory:".into()));
    config.set("app.database.pool.max", ConfigValue::String("8".into()));
    config.set("app.database.migrate", ConfigValue::String("false".into()));

    let db = config.with_typed::<DatabaseConfig>().unwrap();
    assert_eq!(db.max_connections, 8);
    assert!(!db.run_migrations);
}

#[test]
fn test_database_config_requires_url() {
    let err = EcomConfig::empty().with_typed::<DatabaseConfig>().unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(key) if key == "app.database.url"));

    let missing = validate_section::<DatabaseConfig>(&EcomConfig::empty());
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].env_hint, "APP_DATABASE_URL");
}

#[test]
fn test_database_config_rejects_inconsistent_pool() {
    let yaml = r#"
app:
  database:
    url: "sqlite::memory:"
    pool:
      max: 2
      min: 4
"#;
    let err = EcomConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<DatabaseConfig>()
        .unwrap_err();
    match err {
        ConfigError::Validation(details) => {
            assert_eq!(details.len(), 1);
            assert_eq!(details[0].key, "app.database.pool.min");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_database_config_debug_hides_credentials() {
    let db = DatabaseConfig::new("postgres://shop:hunter2@db/catalog");
    let debug = format!("{db:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("postgres://***"));
}

#[test]
fn test_sqlx_error_mapping() {
    assert!(sqlx::Error::RowNotFound.into_data_error().is_not_found());

    let err = sqlx::Error::PoolTimedOut.into_data_error();
    assert!(matches!(err, DataError::Database(_)));
    assert!(std::error::Error::source(&err).is_some());
}
