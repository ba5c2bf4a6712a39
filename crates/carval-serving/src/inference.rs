//! Candle-backed regression models.
//!
//! An exported model directory holds `model_spec.json` describing the network
//! and `dense/params.json` with flat `f32` weights keyed by layer name. Weights
//! are stored row-major as `[out, in]`, biases as `[out]`.
//!
//! Only feed-forward networks are supported. A network with no hidden layers
//! is a plain linear regressor.

use std::collections::HashMap;

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{ServingError, ServingResult};

/// Model specification stored next to an exported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Feed-forward network.
    Mlp(MlpSpec),
}

impl ModelSpec {
    /// Number of input features.
    pub fn input_dim(&self) -> usize {
        match self {
            ModelSpec::Mlp(s) => s.input_dim,
        }
    }

    /// Number of outputs per row.
    pub fn output_dim(&self) -> usize {
        match self {
            ModelSpec::Mlp(s) => s.output_dim,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpSpec {
    pub input_dim: usize,
    #[serde(default)]
    pub hidden_dims: Vec<usize>,
    pub output_dim: usize,
    /// Activation applied after every hidden layer. The output layer is linear.
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
    Sigmoid,
    None,
}

impl Activation {
    fn apply(&self, t: Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Relu => t.relu(),
            Activation::Tanh => t.tanh(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(&t),
            Activation::None => Ok(t),
        }
    }
}

/// A loaded regression model.
pub trait InferenceModel: Send + Sync {
    /// Number of input features.
    fn input_dim(&self) -> usize;

    /// Run a forward pass over a `[batch, input_dim]` tensor.
    fn predict(&self, input: &Tensor) -> ServingResult<Tensor>;
}

/// Build a model from a spec and dense params.
pub fn build_model(
    spec: &ModelSpec,
    params: &HashMap<String, Vec<f32>>,
    device: &Device,
) -> ServingResult<Box<dyn InferenceModel>> {
    match spec {
        ModelSpec::Mlp(s) => Ok(Box::new(MlpModel::from_params(s, params, device)?)),
    }
}

fn tensor_from_vec(
    params: &HashMap<String, Vec<f32>>,
    name: &str,
    shape: &[usize],
    device: &Device,
) -> ServingResult<Tensor> {
    let data = params
        .get(name)
        .ok_or_else(|| ServingError::artifact_load(format!("Missing dense param {:?}", name)))?;
    let numel: usize = shape.iter().product();
    if data.len() != numel {
        return Err(ServingError::artifact_load(format!(
            "Param {:?} has len {}, expected {} for shape {:?}",
            name,
            data.len(),
            numel,
            shape
        )));
    }
    if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
        return Err(ServingError::artifact_load(format!(
            "Param {:?} has non-finite value at index {}",
            name, pos
        )));
    }
    Tensor::from_slice(data, shape, device)
        .map_err(|e| ServingError::artifact_load(format!("Candle tensor init failed: {e}")))
}

fn linear(x: &Tensor, w: &Tensor, b: &Tensor) -> ServingResult<Tensor> {
    // x: [B, in], w: [out, in]
    let wt = w
        .t()
        .map_err(|e| ServingError::inference(format!("transpose failed: {e}")))?;
    let y = x
        .matmul(&wt)
        .map_err(|e| ServingError::inference(format!("matmul failed: {e}")))?;
    y.broadcast_add(b)
        .map_err(|e| ServingError::inference(format!("bias add failed: {e}")))
}

/// Feed-forward regressor.
#[derive(Debug)]
pub struct MlpModel {
    spec: MlpSpec,
    // (w, b) per layer, output layer last
    weights: Vec<(Tensor, Tensor)>,
}

impl MlpModel {
    /// Load weights named `mlp.layers.<i>.weight` / `mlp.layers.<i>.bias`.
    pub fn from_params(
        spec: &MlpSpec,
        params: &HashMap<String, Vec<f32>>,
        device: &Device,
    ) -> ServingResult<Self> {
        if spec.input_dim == 0 || spec.output_dim == 0 {
            return Err(ServingError::artifact_load(
                "MLP input_dim and output_dim must be non-zero",
            ));
        }

        let mut weights = Vec::with_capacity(spec.hidden_dims.len() + 1);
        let mut in_dim = spec.input_dim;

        let mut all_layers = spec.hidden_dims.clone();
        all_layers.push(spec.output_dim);

        for (i, &out_dim) in all_layers.iter().enumerate() {
            let w = tensor_from_vec(params, &format!("mlp.layers.{i}.weight"), &[out_dim, in_dim], device)?;
            let b = tensor_from_vec(params, &format!("mlp.layers.{i}.bias"), &[out_dim], device)?;
            weights.push((w, b));
            in_dim = out_dim;
        }

        Ok(Self {
            spec: spec.clone(),
            weights,
        })
    }

    pub fn spec(&self) -> &MlpSpec {
        &self.spec
    }
}

impl InferenceModel for MlpModel {
    fn input_dim(&self) -> usize {
        self.spec.input_dim
    }

    fn predict(&self, input: &Tensor) -> ServingResult<Tensor> {
        let dims = input.dims();
        if dims.len() != 2 || dims[1] != self.spec.input_dim {
            return Err(ServingError::inference(format!(
                "expected input of shape [batch, {}], got {:?}",
                self.spec.input_dim, dims
            )));
        }

        let mut x = input.clone();
        for (i, (w, b)) in self.weights.iter().enumerate() {
            x = linear(&x, w, b)?;
            let is_last = i + 1 == self.weights.len();
            if !is_last {
                x = self
                    .spec
                    .activation
                    .apply(x)
                    .map_err(|e| ServingError::inference(format!("activation failed: {e}")))?;
            }
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, Vec<f32>)]) -> HashMap<String, Vec<f32>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_model_spec_json() {
        let spec: ModelSpec = serde_json::from_str(
            r#"{"type": "mlp", "input_dim": 40, "hidden_dims": [64, 32], "output_dim": 1}"#,
        )
        .unwrap();
        assert_eq!(spec.input_dim(), 40);
        assert_eq!(spec.output_dim(), 1);
        let ModelSpec::Mlp(mlp) = spec;
        assert_eq!(mlp.activation, Activation::Relu);
    }

    #[test]
    fn test_linear_forward() {
        let spec = MlpSpec {
            input_dim: 3,
            hidden_dims: vec![],
            output_dim: 1,
            activation: Activation::None,
        };
        let p = params(&[
            ("mlp.layers.0.weight", vec![1.0, 2.0, 3.0]),
            ("mlp.layers.0.bias", vec![0.5]),
        ]);
        let model = MlpModel::from_params(&spec, &p, &Device::Cpu).unwrap();

        let x = Tensor::from_slice(&[1.0f32, 1.0, 1.0], (1, 3), &Device::Cpu).unwrap();
        let y = model.predict(&x).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(y, vec![vec![6.5]]);
    }

    #[test]
    fn test_hidden_relu() {
        let spec = MlpSpec {
            input_dim: 2,
            hidden_dims: vec![2],
            output_dim: 1,
            activation: Activation::Relu,
        };
        // hidden = relu([x0 - x1, x1 - x0]); out = h0 + h1 = |x0 - x1|
        let p = params(&[
            ("mlp.layers.0.weight", vec![1.0, -1.0, -1.0, 1.0]),
            ("mlp.layers.0.bias", vec![0.0, 0.0]),
            ("mlp.layers.1.weight", vec![1.0, 1.0]),
            ("mlp.layers.1.bias", vec![0.0]),
        ]);
        let model = MlpModel::from_params(&spec, &p, &Device::Cpu).unwrap();

        let x = Tensor::from_slice(&[2.0f32, 5.0], (1, 2), &Device::Cpu).unwrap();
        let y = model.predict(&x).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(y, vec![vec![3.0]]);
    }

    #[test]
    fn test_missing_param() {
        let spec = MlpSpec {
            input_dim: 2,
            hidden_dims: vec![],
            output_dim: 1,
            activation: Activation::Relu,
        };
        let p = params(&[("mlp.layers.0.weight", vec![1.0, 1.0])]);
        let err = MlpModel::from_params(&spec, &p, &Device::Cpu).unwrap_err();
        assert!(matches!(err, ServingError::ArtifactLoadError(_)));
        assert!(err.to_string().contains("mlp.layers.0.bias"));
    }

    #[test]
    fn test_param_length_mismatch() {
        let spec = MlpSpec {
            input_dim: 3,
            hidden_dims: vec![],
            output_dim: 1,
            activation: Activation::Relu,
        };
        let p = params(&[
            ("mlp.layers.0.weight", vec![1.0, 1.0]),
            ("mlp.layers.0.bias", vec![0.0]),
        ]);
        assert!(MlpModel::from_params(&spec, &p, &Device::Cpu).is_err());
    }

    #[test]
    fn test_wrong_input_width() {
        let spec = MlpSpec {
            input_dim: 2,
            hidden_dims: vec![],
            output_dim: 1,
            activation: Activation::None,
        };
        let p = params(&[
            ("mlp.layers.0.weight", vec![1.0, 1.0]),
            ("mlp.layers.0.bias", vec![0.0]),
        ]);
        let model = MlpModel::from_params(&spec, &p, &Device::Cpu).unwrap();
        let x = Tensor::from_slice(&[1.0f32, 2.0, 3.0], (1, 3), &Device::Cpu).unwrap();
        assert!(matches!(
            model.predict(&x),
            Err(ServingError::InferenceError(_))
        ));
    }
}
