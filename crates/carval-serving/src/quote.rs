//! Per-request boundary: encode, then scale and predict.

use std::sync::Arc;
use std::time::Instant;

use carval_features::{EncodedVector, FeatureEncoder, RawInput};
use tracing::{debug, info};

use crate::config::ServingConfig;
use crate::error::{RequestError, ServingError, ServingResult};
use crate::model_loader::ArtifactLoader;
use crate::predictor::PricePredictor;

/// A successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Predicted sale price
    pub price: f64,

    /// The vector the model was fed, before scaling
    pub features: EncodedVector,
}

/// Encoder and predictor paired over the same schema.
#[derive(Debug, Clone)]
pub struct QuoteService {
    encoder: FeatureEncoder,
    predictor: PricePredictor,
}

impl QuoteService {
    /// Pair an encoder with a predictor.
    pub fn new(encoder: FeatureEncoder, predictor: PricePredictor) -> ServingResult<Self> {
        if encoder.schema().len() != predictor.input_dim() {
            return Err(ServingError::artifact_load(format!(
                "encoder produces {} features but predictor expects {}",
                encoder.schema().len(),
                predictor.input_dim()
            )));
        }
        Ok(Self { encoder, predictor })
    }

    /// Validate the configuration and load artifacts.
    ///
    /// This is the startup step. Any error returned here is fatal.
    pub fn from_config(config: &ServingConfig) -> ServingResult<Self> {
        config.validate()?;
        let schema = Arc::new(config.schema()?);
        let started = Instant::now();
        let artifacts = ArtifactLoader::new(config.clone()).load(&schema)?;
        info!(
            model_dir = ?artifacts.model_dir,
            scaler_path = ?artifacts.scaler_path,
            load_ms = artifacts.loaded_at.saturating_duration_since(started).as_millis() as u64,
            "Serving artifacts ready"
        );
        let encoder = FeatureEncoder::new(schema).with_policy(config.category_policy);
        debug!(policy = ?config.category_policy, "Encoder ready");
        Self::new(encoder, artifacts.into_predictor())
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    /// Price one request.
    ///
    /// Encoding failures return before the scaler or model is touched.
    pub fn quote(&self, input: &RawInput) -> Result<Quote, RequestError> {
        let features = self.encoder.encode(input)?;
        let price = self.predictor.predict_encoded(&features)?;
        info!(price, model = %input.model.trim(), "Quote ready");
        Ok(Quote { price, features })
    }
}
