use std::time::Duration;

use super::ConfigError;

/// A flattened config entry as read from YAML or the environment.
///
/// Environment variables always arrive as `String`; the accessors below
/// parse them on demand so `APP_DATABASE_POOL_MAX=8` reads the same as
/// `pool: { max: 8 }` in YAML.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            ConfigValue::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(x) => Some(*x),
            ConfigValue::Integer(n) => Some(*n as f64),
            ConfigValue::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0` in string form.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(flag) => Some(*flag),
            ConfigValue::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Scalar rendered as text. `None` for `Null` and lists.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ConfigValue::String(raw) => Some(raw.clone()),
            ConfigValue::Integer(n) => Some(n.to_string()),
            ConfigValue::Float(x) => Some(x.to_string()),
            ConfigValue::Bool(flag) => Some(flag.to_string()),
            ConfigValue::Null | ConfigValue::List(_) => None,
        }
    }
}

impl From<&serde_yaml::Value> for ConfigValue {
    fn from(node: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match node {
            Yaml::Null => ConfigValue::Null,
            Yaml::Bool(flag) => ConfigValue::Bool(*flag),
            Yaml::Number(num) => num
                .as_i64()
                .map(ConfigValue::Integer)
                .or_else(|| num.as_f64().map(ConfigValue::Float))
                .unwrap_or_else(|| ConfigValue::String(num.to_string())),
            Yaml::String(text) => ConfigValue::String(text.clone()),
            Yaml::Sequence(items) => ConfigValue::List(items.iter().map(Self::from).collect()),
            // mappings are flattened before they get here; tags are kept verbatim
            Yaml::Mapping(_) | Yaml::Tagged(_) => ConfigValue::String(format!("{node:?}")),
        }
    }
}

/// Conversion from a [`ConfigValue`] stored under `key`.
///
/// `key` only feeds error messages.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError>;
}

fn expect<V>(found: Option<V>, key: &str, expected: &'static str) -> Result<V, ConfigError> {
    found.ok_or_else(|| ConfigError::TypeMismatch {
        key: key.to_owned(),
        expected,
    })
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        expect(value.as_text(), key, "String")
    }
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        expect(value.as_i64(), key, "i64")
    }
}

impl FromConfigValue for f64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        expect(value.as_f64(), key, "f64")
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        expect(value.as_bool(), key, "bool")
    }
}

/// Whole seconds.
impl FromConfigValue for Duration {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        let secs = value.as_i64().and_then(|n| u64::try_from(n).ok());
        expect(secs, key, "Duration (seconds)").map(Duration::from_secs)
    }
}

impl<V: FromConfigValue> FromConfigValue for Option<V> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        if matches!(value, ConfigValue::Null) {
            return Ok(None);
        }
        V::from_config_value(value, key).map(Some)
    }
}

/// A scalar reads as a one-element list, so a list key can be overridden
/// by a single env var.
impl<V: FromConfigValue> FromConfigValue for Vec<V> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        let ConfigValue::List(items) = value else {
            return V::from_config_value(value, key).map(|one| vec![one]);
        };
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            out.push(V::from_config_value(item, &format!("{key}.{idx}"))?);
        }
        Ok(out)
    }
}

/// Narrow integer types go through `i64` with a range check.
macro_rules! impl_from_config_int {
    ($($int:ty),+ $(,)?) => {
        $(
            impl FromConfigValue for $int {
                fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
                    let wide = value.as_i64().and_then(|n| <$int>::try_from(n).ok());
                    expect(wide, key, stringify!($int))
                }
            }
        )+
    };
}

impl_from_config_int!(u8, u16, u32, u64, i32, usize);
