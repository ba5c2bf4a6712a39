//! Scale-then-predict adapter over a loaded scaler and model.

use std::fmt;
use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use carval_features::EncodedVector;
use tracing::debug;

use crate::error::{ServingError, ServingResult};
use crate::inference::InferenceModel;
use crate::scaler::FeatureTransform;

/// Applies the fitted scaler and then the regression model to one row.
///
/// The handle is immutable after construction and cheap to clone.
#[derive(Clone)]
pub struct PricePredictor {
    scaler: Arc<dyn FeatureTransform>,
    model: Arc<dyn InferenceModel>,
    device: Device,
}

impl PricePredictor {
    /// Pair a scaler with a model.
    ///
    /// # Errors
    ///
    /// Fails with [`ServingError::ArtifactLoadError`] if the scaler and model
    /// disagree on the number of features.
    pub fn new(
        scaler: Arc<dyn FeatureTransform>,
        model: Arc<dyn InferenceModel>,
        device: Device,
    ) -> ServingResult<Self> {
        if scaler.input_dim() != model.input_dim() {
            return Err(ServingError::artifact_load(format!(
                "scaler expects {} features but model expects {}",
                scaler.input_dim(),
                model.input_dim()
            )));
        }
        Ok(Self {
            scaler,
            model,
            device,
        })
    }

    /// Number of features a request must carry.
    pub fn input_dim(&self) -> usize {
        self.model.input_dim()
    }

    /// Predict a price from a feature row in schema order.
    pub fn predict(&self, features: &[f64]) -> ServingResult<f64> {
        if features.len() != self.input_dim() {
            return Err(ServingError::dimension_mismatch(
                self.input_dim(),
                features.len(),
            ));
        }

        let scaled = self.scaler.transform(features)?;
        if scaled.len() != self.input_dim() {
            return Err(ServingError::dimension_mismatch(
                self.input_dim(),
                scaled.len(),
            ));
        }

        let row: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_slice(&row, (1, row.len()), &self.device)?;
        let output = self.model.predict(&input)?;
        let values = output.flatten_all()?.to_dtype(DType::F32)?.to_vec1::<f32>()?;

        let price = values
            .first()
            .copied()
            .ok_or_else(|| ServingError::inference("model returned an empty output"))?;
        if !price.is_finite() {
            return Err(ServingError::inference(format!(
                "model returned a non-finite price ({price})"
            )));
        }

        debug!(price, "Prediction complete");
        Ok(f64::from(price))
    }

    /// Predict a price from an encoded vector.
    pub fn predict_encoded(&self, features: &EncodedVector) -> ServingResult<f64> {
        self.predict(features.as_slice())
    }
}

impl fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricePredictor")
            .field("input_dim", &self.input_dim())
            .field("device", &self.device)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Activation, MlpModel, MlpSpec};
    use crate::scaler::StandardScaler;
    use std::collections::HashMap;

    fn linear_model(weights: Vec<f32>, bias: f32) -> MlpModel {
        let spec = MlpSpec {
            input_dim: weights.len(),
            hidden_dims: vec![],
            output_dim: 1,
            activation: Activation::None,
        };
        let mut params = HashMap::new();
        params.insert("mlp.layers.0.weight".to_string(), weights);
        params.insert("mlp.layers.0.bias".to_string(), vec![bias]);
        MlpModel::from_params(&spec, &params, &Device::Cpu).unwrap()
    }

    #[test]
    fn test_scale_then_predict() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 1.0]).unwrap();
        let model = linear_model(vec![100.0, 1.0], 5.0);
        let predictor =
            PricePredictor::new(Arc::new(scaler), Arc::new(model), Device::Cpu).unwrap();

        // scaled = [(14 - 10) / 2, 3] = [2, 3]; price = 200 + 3 + 5
        let price = predictor.predict(&[14.0, 3.0]).unwrap();
        assert_eq!(price, 208.0);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let scaler = StandardScaler::new(vec![1.0, 2.0, 3.0], vec![0.5, 0.5, 0.5]).unwrap();
        let model = linear_model(vec![0.1, -0.2, 0.3], 1.5);
        let predictor =
            PricePredictor::new(Arc::new(scaler), Arc::new(model), Device::Cpu).unwrap();

        let first = predictor.predict(&[7.0, 8.0, 9.0]).unwrap();
        for _ in 0..10 {
            assert_eq!(predictor.predict(&[7.0, 8.0, 9.0]).unwrap(), first);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = StandardScaler::new(vec![0.0; 2], vec![1.0; 2]).unwrap();
        let model = linear_model(vec![1.0, 1.0], 0.0);
        let predictor =
            PricePredictor::new(Arc::new(scaler), Arc::new(model), Device::Cpu).unwrap();

        let err = predictor.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ServingError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_scaler_model_width_disagreement() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        let model = linear_model(vec![1.0, 1.0], 0.0);
        let err = PricePredictor::new(Arc::new(scaler), Arc::new(model), Device::Cpu).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_finite_output() {
        let scaler = StandardScaler::new(vec![0.0], vec![1.0]).unwrap();
        let model = linear_model(vec![f32::MAX], 0.0);
        let predictor =
            PricePredictor::new(Arc::new(scaler), Arc::new(model), Device::Cpu).unwrap();

        let err = predictor.predict(&[10.0]).unwrap_err();
        assert!(matches!(err, ServingError::InferenceError(_)));
    }
}
