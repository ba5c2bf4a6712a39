//! Startup loading of the scaler and model artifacts.
//!
//! Loading happens once, before any request is accepted. Every failure is an
//! [`ServingError::ArtifactLoadError`]; the host is expected to report it and
//! exit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::Device;
use carval_features::FeatureSchema;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::ServingConfig;
use crate::device::best_device;
use crate::error::{ServingError, ServingResult};
use crate::inference::{build_model, ModelSpec};
use crate::predictor::PricePredictor;
use crate::scaler::{build_scaler, ScalerArtifact};

/// Artifacts loaded from disk, ready for serving.
pub struct LoadedArtifacts {
    /// Directory the model was loaded from
    pub model_dir: PathBuf,

    /// Scaler file that was loaded
    pub scaler_path: PathBuf,

    /// When loading finished
    pub loaded_at: Instant,

    /// Network description
    pub model_spec: ModelSpec,

    /// Column names recorded in the scaler artifact, if any
    pub feature_names: Option<Vec<String>>,

    predictor: PricePredictor,
}

impl LoadedArtifacts {
    /// The scale-then-predict handle.
    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    /// Take the predictor, dropping the load metadata.
    pub fn into_predictor(self) -> PricePredictor {
        self.predictor
    }
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("model_dir", &self.model_dir)
            .field("scaler_path", &self.scaler_path)
            .field("loaded_at", &self.loaded_at)
            .field("model_spec", &self.model_spec)
            .field("has_feature_names", &self.feature_names.is_some())
            .field("predictor", &self.predictor)
            .finish()
    }
}

/// Loads exported artifacts described by a [`ServingConfig`].
///
/// # Example
///
/// ```no_run
/// use carval_features::FeatureSchema;
/// use carval_serving::config::ServingConfig;
/// use carval_serving::model_loader::ArtifactLoader;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServingConfig::builder().model_dir("/models/price").build();
/// let artifacts = ArtifactLoader::new(config).load(&FeatureSchema::trained())?;
/// let price = artifacts.predictor().predict(&[0.0; 40])?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArtifactLoader {
    config: ServingConfig,
    device: Device,
}

impl ArtifactLoader {
    /// Create a loader that places the model on the best available device.
    pub fn new(config: ServingConfig) -> Self {
        Self {
            config,
            device: best_device(),
        }
    }

    /// Place the model on a specific device.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Load and cross-check the model and scaler against a feature schema.
    ///
    /// # Errors
    ///
    /// Returns [`ServingError::ArtifactLoadError`] if a file is missing or
    /// malformed, if either artifact's width differs from the schema, if the
    /// model has more than one output, or if the scaler's recorded feature
    /// names differ from the schema's columns.
    pub fn load(&self, schema: &FeatureSchema) -> ServingResult<LoadedArtifacts> {
        let model_dir = self.config.model_dir.clone();
        info!("Loading model from: {:?}", model_dir);

        if !model_dir.is_dir() {
            return Err(ServingError::artifact_load(format!(
                "Model directory does not exist: {:?}",
                model_dir
            )));
        }

        let model_spec: ModelSpec = read_json(&self.config.model_spec_path(), "model spec")?;
        debug!("Loaded model spec: {:?}", model_spec);
        if model_spec.input_dim() != schema.len() {
            return Err(ServingError::artifact_load(format!(
                "model expects {} features, schema has {}",
                model_spec.input_dim(),
                schema.len()
            )));
        }
        if model_spec.output_dim() != 1 {
            return Err(ServingError::artifact_load(format!(
                "model must have a single output, found {}",
                model_spec.output_dim()
            )));
        }

        let dense_params: HashMap<String, Vec<f32>> =
            read_json(&self.config.dense_params_path(), "dense params")?;
        debug!("Loaded {} dense params", dense_params.len());
        let model = build_model(&model_spec, &dense_params, &self.device)?;

        let scaler_path = self.config.scaler_path();
        info!("Loading scaler from: {:?}", scaler_path);
        let artifact: ScalerArtifact = read_json(&scaler_path, "scaler")?;
        if let Some(names) = &artifact.feature_names {
            schema.check_columns(names).map_err(|e| {
                ServingError::artifact_load(format!(
                    "scaler was fitted on different columns: {e}"
                ))
            })?;
        }
        let scaler = build_scaler(&artifact.params)?;
        if scaler.input_dim() != schema.len() {
            return Err(ServingError::artifact_load(format!(
                "scaler expects {} features, schema has {}",
                scaler.input_dim(),
                schema.len()
            )));
        }

        let predictor = PricePredictor::new(Arc::from(scaler), Arc::from(model), self.device.clone())?;

        info!(
            features = schema.len(),
            "Artifacts loaded successfully from: {:?}", model_dir
        );
        Ok(LoadedArtifacts {
            model_dir,
            scaler_path,
            loaded_at: Instant::now(),
            model_spec,
            feature_names: artifact.feature_names,
            predictor,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> ServingResult<T> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ServingError::artifact_load(format!("Failed to read {what} at {:?}: {e}", path))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ServingError::artifact_load(format!("Failed to parse {what} at {:?}: {e}", path))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_artifacts(dir: &Path, width: usize) {
        std::fs::create_dir_all(dir.join("dense")).unwrap();
        std::fs::write(
            dir.join("model_spec.json"),
            format!(r#"{{"type": "mlp", "input_dim": {width}, "hidden_dims": [], "output_dim": 1}}"#),
        )
        .unwrap();
        let params = serde_json::json!({
            "mlp.layers.0.weight": vec![1.0f32; width],
            "mlp.layers.0.bias": [0.0f32],
        });
        std::fs::write(dir.join("dense/params.json"), params.to_string()).unwrap();
        let scaler = serde_json::json!({
            "kind": "standard",
            "mean": vec![0.0; width],
            "scale": vec![1.0; width],
        });
        std::fs::write(dir.join("scaler.json"), scaler.to_string()).unwrap();
    }

    fn loader(dir: &Path) -> ArtifactLoader {
        let config = ServingConfig::builder().model_dir(dir).build();
        ArtifactLoader::new(config).with_device(Device::Cpu)
    }

    #[test]
    fn test_load_valid_artifacts() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 40);

        let started = Instant::now();
        let artifacts = loader(dir.path()).load(&FeatureSchema::trained()).unwrap();
        assert!(artifacts.loaded_at >= started);
        assert_eq!(artifacts.model_dir, dir.path().to_path_buf());
        assert_eq!(artifacts.model_spec.input_dim(), 40);
        assert_eq!(artifacts.predictor().input_dim(), 40);
        assert!(artifacts.feature_names.is_none());
        assert_eq!(artifacts.scaler_path, dir.path().join("scaler.json"));
    }

    #[test]
    fn test_load_nonexistent_path() {
        let result = loader(Path::new("/nonexistent/path/to/model")).load(&FeatureSchema::trained());
        assert!(matches!(result, Err(ServingError::ArtifactLoadError(_))));
    }

    #[test]
    fn test_missing_scaler() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 40);
        std::fs::remove_file(dir.path().join("scaler.json")).unwrap();

        let err = loader(dir.path()).load(&FeatureSchema::trained()).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("scaler"));
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 39);

        let err = loader(dir.path()).load(&FeatureSchema::trained()).unwrap_err();
        assert!(err.to_string().contains("39"));
    }
}
