use super::{ConfigError, EcomConfig, FromConfigValue};

/// Metadata about a single configuration property.
#[derive(Debug, Clone)]
pub struct PropertyMeta {
    /// Relative key (e.g., `"pool.max"`).
    pub key: &'static str,
    /// Rust type name (e.g., `"u32"`).
    pub type_name: &'static str,
    /// Whether the property is required (no default and not `Option`).
    pub required: bool,
    /// Default value as a string, if any.
    pub default_value: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl PropertyMeta {
    /// Absolute key under `prefix` (e.g., `"app.database.pool.max"`).
    pub fn full_key(&self, prefix: &str) -> String {
        format!("{prefix}.{}", self.key)
    }

    /// The environment variable that overrides this property.
    pub fn env_var(&self, prefix: &str) -> String {
        self.full_key(prefix).to_uppercase().replace('.', "_")
    }
}

/// Trait for strongly-typed configuration sections.
///
/// Relative keys should avoid `_`: the env overlay maps `APP_DATABASE_URL`
/// to `app.database.url`, so a key like `max_size` could never be
/// overridden from the environment. Nest with dots instead (`pool.max`).
///
/// ```ignore
/// impl ConfigProperties for DatabaseConfig {
///     fn prefix() -> &'static str { "app.database" }
///     fn properties_metadata() -> Vec<PropertyMeta> { ... }
///     fn from_config(config: &EcomConfig) -> Result<Self, ConfigError> {
///         let section = Section::new(config, Self::prefix());
///         Ok(Self { url: section.required("url")?, .. })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"app.database"`).
    fn prefix() -> &'static str;

    /// Metadata about all expected properties.
    fn properties_metadata() -> Vec<PropertyMeta>;

    /// Construct from an `EcomConfig` instance.
    fn from_config(config: &EcomConfig) -> Result<Self, ConfigError>;
}

/// Prefix-scoped view over a raw config, for writing `from_config`.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    config: &'a EcomConfig,
    prefix: &'a str,
}

impl<'a> Section<'a> {
    pub fn new(config: &'a EcomConfig, prefix: &'a str) -> Self {
        Self { config, prefix }
    }

    fn key(&self, key: &str) -> String {
        format!("{}.{key}", self.prefix)
    }

    pub fn required<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        self.config.get(&self.key(key))
    }

    pub fn optional<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        self.config.get_or(&self.key(key), None)
    }

    pub fn or_default<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        self.config.get_or(&self.key(key), default)
    }
}
