//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::DeployerConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file.
///
/// Values are not validated here; callers apply overrides first and then
/// call [`validate_config`](crate::config::validate_config).
pub fn load_config(path: &Path) -> Result<DeployerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Load from `path` when given, otherwise start from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<DeployerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(DeployerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_config;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [keys]
            dir = "/tmp/keys"
            count = 2

            [chain]
            rpc_url = "http://10.0.0.5:8545"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.keys.count, 2);
        assert_eq!(config.chain.rpc_url, "http://10.0.0.5:8545");
    }

    #[test]
    fn test_invalid_file_value_can_be_overridden() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keys]\ncount = 0").unwrap();

        let mut config = load_config(file.path()).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "keys.count");

        config.keys.count = 3;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_display() {
        let mut config = DeployerConfig::default();
        config.keys.count = 0;

        let err = ConfigError::Validation(validate_config(&config).unwrap_err());
        assert!(err.to_string().contains("keys.count"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keys\ncount = ").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.keys.count, 1);
    }
}
