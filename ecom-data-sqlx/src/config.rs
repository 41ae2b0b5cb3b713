use std::time::Duration;

use ecom_core::config::{
    ConfigError, ConfigProperties, ConfigValidationDetail, EcomConfig, PropertyMeta, Section,
};
use ecom_data::DataError;
use sqlx::pool::PoolOptions;
use sqlx::{Database, Pool};

use crate::error::SqlxErrorExt;

/// Connection pool settings, read from the `app.database` section.
///
/// | Key | Env var | Default |
/// |-----|---------|---------|
/// | `url` | `APP_DATABASE_URL` | required |
/// | `pool.max` | `APP_DATABASE_POOL_MAX` | 5 |
/// | `pool.min` | `APP_DATABASE_POOL_MIN` | 0 |
/// | `pool.timeout` | `APP_DATABASE_POOL_TIMEOUT` | 30 (seconds) |
/// | `migrate` | `APP_DATABASE_MIGRATE` | true |
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    /// Whether embedded migrations run when the pool is created.
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// URL scheme only, safe to log.
    pub fn scheme(&self) -> &str {
        self.url.split(':').next().unwrap_or_default()
    }

    pub fn pool_options<DB: Database>(&self) -> PoolOptions<DB> {
        PoolOptions::<DB>::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
    }

    /// Open a pool with these settings.
    pub async fn connect<DB: Database>(&self) -> Result<Pool<DB>, DataError> {
        tracing::info!(
            scheme = self.scheme(),
            max_connections = self.max_connections,
            "opening database pool"
        );
        self.pool_options::<DB>()
            .connect(&self.url)
            .await
            .map_err(SqlxErrorExt::into_data_error)
    }
}

// the url may carry credentials
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &format_args!("{}://***", self.scheme()))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl ConfigProperties for DatabaseConfig {
    fn prefix() -> &'static str {
        "app.database"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![
            PropertyMeta {
                key: "url",
                type_name: "String",
                required: true,
                default_value: None,
                description: Some("database connection URL, e.g. sqlite://catalog.db?mode=rwc"),
            },
            PropertyMeta {
                key: "pool.max",
                type_name: "u32",
                required: false,
                default_value: Some("5"),
                description: Some("maximum pooled connections"),
            },
            PropertyMeta {
                key: "pool.min",
                type_name: "u32",
                required: false,
                default_value: Some("0"),
                description: None,
            },
            PropertyMeta {
                key: "pool.timeout",
                type_name: "Duration",
                required: false,
                default_value: Some("30"),
                description: Some("seconds to wait for a free connection"),
            },
            PropertyMeta {
                key: "migrate",
                type_name: "bool",
                required: false,
                default_value: Some("true"),
                description: None,
            },
        ]
    }

    fn from_config(config: &EcomConfig) -> Result<Self, ConfigError> {
        let section = Section::new(config, Self::prefix());
        let defaults = DatabaseConfig::new(String::new());
        let db = DatabaseConfig {
            url: section.required("url")?,
            max_connections: section.or_default("pool.max", defaults.max_connections)?,
            min_connections: section.or_default("pool.min", defaults.min_connections)?,
            acquire_timeout: section.or_default("pool.timeout", defaults.acquire_timeout)?,
            run_migrations: section.or_default("migrate", defaults.run_migrations)?,
        };

        let mut problems = Vec::new();
        if db.url.trim().is_empty() {
            problems.push(ConfigValidationDetail {
                key: "app.database.url".into(),
                message: "must not be empty".into(),
            });
        }
        if db.max_connections == 0 {
            problems.push(ConfigValidationDetail {
                key: "app.database.pool.max".into(),
                message: "must be at least 1".into(),
            });
        }
        if db.min_connections > db.max_connections {
            problems.push(ConfigValidationDetail {
                key: "app.database.pool.min".into(),
                message: format!("must not exceed pool.max ({})", db.max_connections),
            });
        }
        if problems.is_empty() {
            Ok(db)
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}
