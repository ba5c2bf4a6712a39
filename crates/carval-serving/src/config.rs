//! Serving configuration.
//!
//! [`ServingConfig`] says where the exported artifacts live and how the encoder
//! should treat unknown categories. It can be built in code, read from a JSON
//! file, or assembled from command-line flags.

use std::path::{Path, PathBuf};

use carval_features::{CategoryPolicy, FeatureSchema};
use serde::{Deserialize, Serialize};

use crate::constants::{DENSE_DIR, DENSE_PARAMS_FILE, MODEL_SPEC_FILE, SCALER_FILE};
use crate::error::ServingError;

/// Configuration for loading and serving a price model.
///
/// # Example
///
/// ```
/// use carval_serving::config::ServingConfig;
/// use carval_features::CategoryPolicy;
///
/// let config = ServingConfig::builder()
///     .model_dir("/models/price")
///     .category_policy(CategoryPolicy::Strict)
///     .build();
///
/// assert!(config.scaler_path().ends_with("scaler.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    /// Exported model directory
    pub model_dir: PathBuf,

    /// Scaler artifact; defaults to `<model_dir>/scaler.json`
    pub scaler_path: Option<PathBuf>,

    /// Handling of selections without an indicator column
    pub category_policy: CategoryPolicy,

    /// Feature columns in training order; defaults to the trained schema
    pub columns: Option<Vec<String>>,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./model"),
            scaler_path: None,
            category_policy: CategoryPolicy::default(),
            columns: None,
        }
    }
}

impl ServingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServingConfigBuilder {
        ServingConfigBuilder::default()
    }

    /// Read a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{}: {}", path.display(), e)))?;
        let config: ServingConfig = serde_json::from_str(&text)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the model spec.
    pub fn model_spec_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_SPEC_FILE)
    }

    /// Path of the dense parameters.
    pub fn dense_params_path(&self) -> PathBuf {
        self.model_dir.join(DENSE_DIR).join(DENSE_PARAMS_FILE)
    }

    /// Path of the scaler artifact.
    pub fn scaler_path(&self) -> PathBuf {
        self.scaler_path
            .clone()
            .unwrap_or_else(|| self.model_dir.join(SCALER_FILE))
    }

    /// Feature schema to encode against.
    pub fn schema(&self) -> Result<FeatureSchema, ConfigError> {
        match &self.columns {
            Some(columns) => FeatureSchema::from_columns(columns.iter().cloned())
                .map_err(|e| ConfigError::InvalidSchema(e.to_string())),
            None => Ok(FeatureSchema::trained()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyModelDir);
        }
        if let Some(path) = &self.scaler_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyScalerPath);
            }
        }
        self.schema()?;
        Ok(())
    }
}

/// Builder for [`ServingConfig`].
#[derive(Debug, Default)]
pub struct ServingConfigBuilder {
    model_dir: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
    category_policy: Option<CategoryPolicy>,
    columns: Option<Vec<String>>,
}

impl ServingConfigBuilder {
    /// Set the model directory.
    pub fn model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(path.into());
        self
    }

    /// Override the scaler path.
    pub fn scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = Some(path.into());
        self
    }

    /// Set the unknown-category policy.
    pub fn category_policy(mut self, policy: CategoryPolicy) -> Self {
        self.category_policy = Some(policy);
        self
    }

    /// Use an explicit column list instead of the trained schema.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServingConfig {
        let default = ServingConfig::default();
        ServingConfig {
            model_dir: self.model_dir.unwrap_or(default.model_dir),
            scaler_path: self.scaler_path.or(default.scaler_path),
            category_policy: self.category_policy.unwrap_or(default.category_policy),
            columns: self.columns.or(default.columns),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Model directory not set
    #[error("Model directory must not be empty")]
    EmptyModelDir,

    /// Scaler path set to an empty string
    #[error("Scaler path must not be empty")]
    EmptyScalerPath,

    /// Column list does not form a valid schema
    #[error("Invalid feature columns: {0}")]
    InvalidSchema(String),

    /// Invalid configuration file
    #[error("Invalid configuration file: {0}")]
    InvalidConfigFile(String),
}

impl From<ConfigError> for ServingError {
    fn from(err: ConfigError) -> Self {
        ServingError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ServingConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("./model"));
        assert_eq!(config.category_policy, CategoryPolicy::Lenient);
        assert!(config.validate().is_ok());
        assert_eq!(config.schema().unwrap().len(), 40);
    }

    #[test]
    fn test_artifact_paths() {
        let config = ServingConfig::builder().model_dir("/m").build();
        assert_eq!(config.model_spec_path(), PathBuf::from("/m/model_spec.json"));
        assert_eq!(config.dense_params_path(), PathBuf::from("/m/dense/params.json"));
        assert_eq!(config.scaler_path(), PathBuf::from("/m/scaler.json"));

        let config = ServingConfig::builder()
            .model_dir("/m")
            .scaler_path("/s/fitted.json")
            .build();
        assert_eq!(config.scaler_path(), PathBuf::from("/s/fitted.json"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServingConfig::default();
        config.model_dir = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyModelDir)));

        let config = ServingConfig::builder().columns(["year", "year"]).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carval.json");
        std::fs::write(
            &path,
            r#"{"model_dir": "/opt/price", "category_policy": "strict"}"#,
        )
        .unwrap();

        let config = ServingConfig::from_file(&path).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/opt/price"));
        assert_eq!(config.category_policy, CategoryPolicy::Strict);
        assert!(config.scaler_path.is_none());
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ServingConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::InvalidConfigFile(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ServingConfig::from_file(&path),
            Err(ConfigError::InvalidConfigFile(_))
        ));
    }
}
