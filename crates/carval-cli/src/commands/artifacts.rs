//! Artifact arguments shared by commands that load a model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use carval_features::CategoryPolicy;
use carval_serving::constants::{MODEL_DIR_ENV, SCALER_PATH_ENV};
use carval_serving::{QuoteService, ServingConfig};
use clap::Args;
use tracing::info;

/// Where to find the exported model and scaler.
#[derive(Args, Debug, Clone, Default)]
pub struct ArtifactArgs {
    /// Directory containing model_spec.json, dense/params.json and scaler.json
    #[arg(long, short = 'd', env = MODEL_DIR_ENV)]
    pub model_dir: Option<PathBuf>,

    /// Scaler artifact (defaults to <model-dir>/scaler.json)
    #[arg(long, env = SCALER_PATH_ENV)]
    pub scaler: Option<PathBuf>,

    /// JSON serving configuration; flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Reject selections that have no indicator column instead of ignoring them
    #[arg(long)]
    pub strict_categories: bool,
}

impl ArtifactArgs {
    /// Merge the config file (if any) with command-line overrides.
    pub fn serving_config(&self) -> Result<ServingConfig> {
        let mut config = match &self.config {
            Some(path) => ServingConfig::from_file(path)
                .with_context(|| format!("Failed to read config {:?}", path))?,
            None => {
                let model_dir = self
                    .model_dir
                    .clone()
                    .context("Either --model-dir or --config is required")?;
                ServingConfig::builder().model_dir(model_dir).build()
            }
        };

        if let Some(dir) = &self.model_dir {
            config.model_dir = dir.clone();
        }
        if let Some(scaler) = &self.scaler {
            config.scaler_path = Some(scaler.clone());
        }
        if self.strict_categories {
            config.category_policy = CategoryPolicy::Strict;
        }

        config.validate().context("Invalid serving configuration")?;
        Ok(config)
    }

    /// Load artifacts. Failure here is fatal for every command.
    pub fn load_service(&self) -> Result<QuoteService> {
        let config = self.serving_config()?;
        info!("Model directory: {:?}", config.model_dir);
        QuoteService::from_config(&config).context("Error loading model or scaler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dir_required_without_config() {
        let args = ArtifactArgs::default();
        assert!(args.serving_config().is_err());
    }

    #[test]
    fn test_flags_build_config() {
        let args = ArtifactArgs {
            model_dir: Some(PathBuf::from("/models/price")),
            scaler: Some(PathBuf::from("/models/scaler.json")),
            config: None,
            strict_categories: true,
        };
        let config = args.serving_config().unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/models/price"));
        assert_eq!(config.scaler_path(), PathBuf::from("/models/scaler.json"));
        assert_eq!(config.category_policy, CategoryPolicy::Strict);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carval.json");
        std::fs::write(&path, r#"{"model_dir": "/from/file"}"#).unwrap();

        let args = ArtifactArgs {
            config: Some(path.clone()),
            ..Default::default()
        };
        assert_eq!(
            args.serving_config().unwrap().model_dir,
            PathBuf::from("/from/file")
        );

        let args = ArtifactArgs {
            model_dir: Some(PathBuf::from("/from/flag")),
            config: Some(path),
            ..Default::default()
        };
        assert_eq!(
            args.serving_config().unwrap().model_dir,
            PathBuf::from("/from/flag")
        );
    }

    #[test]
    fn test_missing_artifacts_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let args = ArtifactArgs {
            model_dir: Some(dir.path().join("absent")),
            ..Default::default()
        };
        let err = args.load_service().unwrap_err();
        assert!(format!("{err:#}").contains("Error loading model or scaler"));
    }
}
