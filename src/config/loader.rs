//! Configuration loading from disk.
//!
//! A file only needs the keys it changes; every section falls back to its
//! defaults. CLI overrides are applied by the caller, which validates again.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`ServiceConfig`].
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The values parsed but do not make sense together.
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "cannot parse {}: {}", path.display(), source)
            }
            ConfigError::Validation(errors) => {
                write!(f, "invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse TOML text into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<ServiceConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Read, parse and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    tracing::debug!(path = %path.display(), "Configuration file loaded");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_file() {
        let file = config_file("[fetch]\ntimeout_secs = 5\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.connect_timeout_secs, 10);
    }

    #[test]
    fn reports_every_invalid_value() {
        let file = config_file("[archive]\npipe_capacity = 0\n[fetch]\ntimeout_secs = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 2));

        let message = err.to_string();
        assert!(message.contains("archive.pipe_capacity"));
        assert!(message.contains("fetch.timeout_secs"));
    }

    #[test]
    fn parse_error_names_the_file() {
        let file = config_file("[archive]\nskip_on_failure = \"sometimes\"\n");
        let err = load_config(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { ref path, .. } if path.ends_with("here.toml")));
    }

    #[test]
    fn parse_config_leaves_validation_to_caller() {
        let config = parse_config("[archive]\npipe_capacity = 0\n").unwrap();
        assert_eq!(config.archive.pipe_capacity, 0);
    }
}
