//! Layered application configuration.
//!
//! Sources, later ones winning:
//!
//! | Layer | Example |
//! |-------|---------|
//! | base file | `application.yaml` |
//! | profile file | `application-prod.yaml` |
//! | dotenv files | `.env`, then `.env.prod` |
//! | process environment | `APP_DATABASE_URL=...` sets `app.database.url` |
//!
//! Dotenv files only fill variables that are not already set. String values
//! may reference `${VAR}`, `${env:VAR}` or `${file:/path}`; see
//! [`SecretResolver`].

mod error;
mod loader;
pub mod secrets;
pub mod typed;
pub mod validation;
pub mod value;

use std::ops::Deref;
use std::path::Path;

use loader::Values;

pub use error::{ConfigError, ConfigValidationDetail};
pub use secrets::{resolve_placeholders, DefaultSecretResolver, SecretResolver};
pub use typed::{ConfigProperties, PropertyMeta, Section};
pub use validation::{validate_section, MissingKeyError};
pub use value::{ConfigValue, FromConfigValue};

/// Overrides the profile passed to [`EcomConfig::load`].
pub const PROFILE_ENV: &str = "ECOM_PROFILE";

/// Flattened key/value configuration for one profile.
///
/// `EcomConfig` is untyped. [`with_typed`](EcomConfig::with_typed) builds a
/// [`ConfigProperties`] section once and exposes it through `Deref`, while
/// raw lookups keep working.
#[derive(Debug, Clone)]
pub struct EcomConfig<T = ()> {
    values: Values,
    profile: String,
    typed: T,
}

impl EcomConfig {
    /// Load `profile` from the working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_dir(".", profile)
    }

    pub fn load_from_dir(dir: impl AsRef<Path>, profile: &str) -> Result<Self, ConfigError> {
        Self::load_with_resolver(dir, profile, &DefaultSecretResolver)
    }

    /// Load with a custom resolver for `${...}` placeholders.
    pub fn load_with_resolver(
        dir: impl AsRef<Path>,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_owned());

        let mut values = Values::new();
        for file in ["application.yaml".to_owned(), format!("application-{profile}.yaml")] {
            loader::load_yaml_file(&dir.join(file), &mut values)?;
        }
        for file in [".env".to_owned(), format!(".env.{profile}")] {
            load_dotenv(&dir.join(file));
        }

        for value in values.values_mut() {
            if let ConfigValue::String(raw) = value {
                if raw.contains("${") {
                    *raw = resolve_placeholders(raw, resolver)?;
                }
            }
        }
        values.extend(
            std::env::vars().map(|(name, val)| (env_to_key(&name), ConfigValue::String(val))),
        );

        tracing::debug!(%profile, keys = values.len(), "configuration loaded");
        Ok(EcomConfig {
            values,
            profile,
            typed: (),
        })
    }

    /// Parse YAML directly. The environment is not consulted.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = Values::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(EcomConfig {
            values,
            profile: profile.to_owned(),
            typed: (),
        })
    }

    /// No values, profile `test`.
    pub fn empty() -> Self {
        EcomConfig {
            values: Values::new(),
            profile: "test".to_owned(),
            typed: (),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_owned(), value);
    }

    /// Build section `C` and attach it.
    ///
    /// ```ignore
    /// let config = EcomConfig::load("dev")?.with_typed::<DatabaseConfig>()?;
    /// let url = &config.url;
    /// let max: u32 = config.get("app.database.pool.max")?;
    /// ```
    pub fn with_typed<C: ConfigProperties>(self) -> Result<EcomConfig<C>, ConfigError> {
        let typed = C::from_config(&self)?;
        Ok(EcomConfig {
            values: self.values,
            profile: self.profile,
            typed,
        })
    }
}

impl<T> EcomConfig<T> {
    /// Look up `key` (dotted) and convert it.
    ///
    /// Fails with `NotFound` for a missing key and `TypeMismatch` when the
    /// value does not convert to `V`.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key),
            None => Err(ConfigError::NotFound(key.to_owned())),
        }
    }

    /// `default` only when the key is absent; bad values still fail.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        if self.contains_key(key) {
            self.get(key)
        } else {
            Ok(default)
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn typed(&self) -> &T {
        &self.typed
    }

    /// A copy of the values without the typed section.
    pub fn raw(&self) -> EcomConfig {
        EcomConfig {
            values: self.values.clone(),
            profile: self.profile.clone(),
            typed: (),
        }
    }
}

impl<T> Deref for EcomConfig<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.typed
    }
}

/// `APP_DATABASE_POOL_MAX` -> `app.database.pool.max`
fn env_to_key(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', ".")
}

fn load_dotenv(path: &Path) {
    if !path.is_file() {
        return;
    }
    if let Err(err) = dotenvy::from_path(path) {
        tracing::warn!(path = %path.display(), error = %err, "skipping unreadable env file");
    }
}
