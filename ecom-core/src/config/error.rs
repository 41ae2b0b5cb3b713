use std::fmt;

/// One rejected value in a typed section.
#[derive(Debug, Clone)]
pub struct ConfigValidationDetail {
    /// Absolute key, e.g. `app.database.pool.min`.
    pub key: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ConfigError {
    /// No value under this key in any layer.
    NotFound(String),
    TypeMismatch { key: String, expected: &'static str },
    /// A file could not be read or parsed, or a placeholder was malformed.
    Load(String),
    /// Values were present and well-typed but the section rejected them.
    Validation(Vec<ConfigValidationDetail>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "missing config key `{key}`"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "config key `{key}` is not a valid {expected}")
            }
            ConfigError::Load(reason) => write!(f, "failed to load configuration: {reason}"),
            ConfigError::Validation(details) => {
                f.write_str("invalid configuration")?;
                for ConfigValidationDetail { key, message } in details {
                    write!(f, "; `{key}` {message}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
