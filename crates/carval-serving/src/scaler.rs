//! Feature scalers fitted at training time.
//!
//! A scaler artifact is a JSON document tagged by `kind`:
//!
//! ```json
//! {"kind": "standard", "mean": [...], "scale": [...], "feature_names": [...]}
//! {"kind": "min_max", "min": [...], "scale": [...]}
//! ```
//!
//! `feature_names` is optional. When present, the loader checks it against the
//! feature schema so a scaler fitted on a different column order is refused.

use serde::{Deserialize, Serialize};

use crate::error::{ServingError, ServingResult};

/// Scaler parameters, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// On-disk scaler artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(flatten)]
    pub params: ScalerParams,

    /// Column names the scaler was fitted on, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

/// A fitted, read-only feature transform.
pub trait FeatureTransform: Send + Sync {
    /// Number of features the transform expects.
    fn input_dim(&self) -> usize;

    /// Transform one row.
    fn transform(&self, input: &[f64]) -> ServingResult<Vec<f64>>;
}

/// Build a transform from scaler parameters.
pub fn build_scaler(params: &ScalerParams) -> ServingResult<Box<dyn FeatureTransform>> {
    match params {
        ScalerParams::Standard { mean, scale } => {
            Ok(Box::new(StandardScaler::new(mean.clone(), scale.clone())?))
        }
        ScalerParams::MinMax { min, scale } => {
            Ok(Box::new(MinMaxScaler::new(min.clone(), scale.clone())?))
        }
    }
}

fn check_params(name: &str, a: &[f64], b: &[f64]) -> ServingResult<()> {
    if a.is_empty() {
        return Err(ServingError::artifact_load(format!(
            "{name} scaler has no parameters"
        )));
    }
    if a.len() != b.len() {
        return Err(ServingError::artifact_load(format!(
            "{name} scaler parameter lengths differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(ServingError::artifact_load(format!(
            "{name} scaler has non-finite parameters"
        )));
    }
    Ok(())
}

fn check_width(expected: usize, input: &[f64]) -> ServingResult<()> {
    if input.len() != expected {
        return Err(ServingError::dimension_mismatch(expected, input.len()));
    }
    Ok(())
}

/// Standardization: subtract the mean, divide by the scale.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Create a standard scaler. Zero scales are treated as one, so constant
    /// training columns pass through centred.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> ServingResult<Self> {
        check_params("standard", &mean, &scale)?;
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }
}

impl FeatureTransform for StandardScaler {
    fn input_dim(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, input: &[f64]) -> ServingResult<Vec<f64>> {
        check_width(self.mean.len(), input)?;
        Ok(input
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}

/// Min-max scaling expressed as `x * scale + min`.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    scale: Vec<f64>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> ServingResult<Self> {
        check_params("min_max", &min, &scale)?;
        Ok(Self { min, scale })
    }
}

impl FeatureTransform for MinMaxScaler {
    fn input_dim(&self) -> usize {
        self.min.len()
    }

    fn transform(&self, input: &[f64]) -> ServingResult<Vec<f64>> {
        check_width(self.min.len(), input)?;
        Ok(input
            .iter()
            .zip(self.scale.iter().zip(&self.min))
            .map(|(x, (s, m))| x * s + m)
            .collect())
    }
}
