use std::fmt;

use super::typed::ConfigProperties;
use super::{ConfigError, EcomConfig};

/// A key that kept a section from being built: absent, mistyped or rejected.
#[derive(Debug)]
pub struct MissingKeyError {
    /// Prefix of the section that needs the key.
    pub source: String,
    pub key: String,
    pub expected_type: String,
    /// Environment variable that would supply the key.
    pub env_hint: String,
    pub description: Option<String>,
}

impl MissingKeyError {
    fn new(source: &str, key: String, expected_type: &str, description: Option<String>) -> Self {
        Self {
            source: source.to_owned(),
            env_hint: key.to_ascii_uppercase().replace('.', "_"),
            key,
            expected_type: expected_type.to_owned(),
            description,
        }
    }
}

impl fmt::Display for MissingKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} <{}> (env: {})",
            self.source, self.key, self.expected_type, self.env_hint
        )?;
        match &self.description {
            Some(desc) => write!(f, ": {desc}"),
            None => Ok(()),
        }
    }
}

/// Every problem with section `C` in `config`, for startup diagnostics.
///
/// Absent required keys are listed first. If there are none, the section is
/// built once so conversion and validation failures are reported too.
pub fn validate_section<C: ConfigProperties>(config: &EcomConfig) -> Vec<MissingKeyError> {
    let prefix = C::prefix();

    let missing: Vec<MissingKeyError> = C::properties_metadata()
        .into_iter()
        .filter(|prop| prop.required && !config.contains_key(&prop.full_key(prefix)))
        .map(|prop| {
            MissingKeyError::new(
                prefix,
                prop.full_key(prefix),
                prop.type_name,
                prop.description.map(str::to_owned),
            )
        })
        .collect();
    if !missing.is_empty() {
        return missing;
    }

    match C::from_config(config) {
        Ok(_) => Vec::new(),
        Err(ConfigError::Load(reason)) => vec![MissingKeyError::new(
            prefix,
            prefix.to_owned(),
            "loadable section",
            Some(reason),
        )],
        Err(ConfigError::NotFound(key)) => vec![MissingKeyError::new(prefix, key, "?", None)],
        Err(ConfigError::TypeMismatch { key, expected }) => vec![MissingKeyError::new(
            prefix,
            key,
            expected,
            Some("value does not convert".to_owned()),
        )],
        Err(ConfigError::Validation(details)) => details
            .into_iter()
            .map(|d| MissingKeyError::new(prefix, d.key, "valid value", Some(d.message)))
            .collect(),
    }
}
