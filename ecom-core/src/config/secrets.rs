use super::ConfigError;

/// Resolves the reference inside a `${...}` placeholder.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Default resolver: env vars and file references.
///
/// - `${VAR_NAME}`: environment variable
/// - `${env:VAR_NAME}`: environment variable, explicit form
/// - `${file:/path/to/secret}`: file contents, trimmed
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        let reference = reference.trim();
        if let Some(path) = reference.strip_prefix("file:") {
            let path = path.trim();
            match std::fs::read_to_string(path) {
                Ok(contents) => Ok(contents.trim().to_owned()),
                Err(err) => Err(ConfigError::Load(format!("secret file {path}: {err}"))),
            }
        } else {
            let var = reference.strip_prefix("env:").unwrap_or(reference).trim();
            std::env::var(var).map_err(|_| ConfigError::NotFound(format!("env:{var}")))
        }
    }
}

/// Replace each `${...}` in `value` with what `resolver` returns.
///
/// Substituted text is not scanned again.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut resolved = String::with_capacity(value.len());
    let mut tail = value;
    while let Some((literal, after_open)) = tail.split_once("${") {
        let Some((reference, after_close)) = after_open.split_once('}') else {
            return Err(ConfigError::Load(format!("unterminated `${{` in `{value}`")));
        };
        resolved.push_str(literal);
        resolved.push_str(&resolver.resolve(reference)?);
        tail = after_close;
    }
    resolved.push_str(tail);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_resolution() {
        std::env::set_var("TEST_ECOM_DB_URL", "sqlite://catalog.db");
        let result = resolve_placeholders("${TEST_ECOM_DB_URL}", &DefaultSecretResolver).unwrap();
        assert_eq!(result, "sqlite://catalog.db");
        std::env::remove_var("TEST_ECOM_DB_URL");
    }

    #[test]
    fn test_explicit_env_resolution() {
        std::env::set_var("TEST_ECOM_HOST", "db.internal");
        let result =
            resolve_placeholders("postgres://${env:TEST_ECOM_HOST}/shop", &DefaultSecretResolver)
                .unwrap();
        assert_eq!(result, "postgres://db.internal/shop");
        std::env::remove_var("TEST_ECOM_HOST");
    }

    #[test]
    fn test_resolved_value_is_not_rescanned() {
        std::env::set_var("TEST_ECOM_LITERAL", "${NOT_A_PLACEHOLDER}");
        let result = resolve_placeholders("${TEST_ECOM_LITERAL}", &DefaultSecretResolver).unwrap();
        assert_eq!(result, "${NOT_A_PLACEHOLDER}");
        std::env::remove_var("TEST_ECOM_LITERAL");
    }

    #[test]
    fn test_no_placeholder() {
        let result = resolve_placeholders("plain-value", &DefaultSecretResolver).unwrap();
        assert_eq!(result, "plain-value");
    }

    #[test]
    fn test_unclosed_placeholder() {
        assert!(resolve_placeholders("${UNCLOSED", &DefaultSecretResolver).is_err());
    }

    #[test]
    fn test_missing_env_var() {
        let err = resolve_placeholders("${TEST_ECOM_SURELY_UNSET}", &DefaultSecretResolver)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(key) if key == "env:TEST_ECOM_SURELY_UNSET"));
    }

    #[test]
    fn test_file_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let secret_file = dir.path().join("db-password");
        std::fs::write(&secret_file, "hunter2\n").unwrap();

        let reference = format!("${{file:{}}}", secret_file.display());
        let result = resolve_placeholders(&reference, &DefaultSecretResolver).unwrap();
        assert_eq!(result, "hunter2");
    }
}
