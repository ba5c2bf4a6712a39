//! Inference serving for carval price models.
//!
//! This crate loads an exported scaler and regression model once at startup
//! and answers price requests against them:
//!
//! - **ArtifactLoader**: reads `model_spec.json`, `dense/params.json` and the
//!   scaler artifact, and cross-checks them against the feature schema
//! - **PricePredictor**: applies the scaler, then the Candle model, to one row
//! - **QuoteService**: encodes raw input and prices it, turning every
//!   per-request failure into a [`RequestError`]
//!
//! # Architecture
//!
//! ```text
//!   RawInput ──► FeatureEncoder ──► EncodedVector
//!                                        │
//!                                        ▼
//!                    ┌──────────── PricePredictor ────────────┐
//!                    │  FeatureTransform  ──►  InferenceModel │
//!                    └────────────────────────────────────────┘
//!                                        │
//!                                        ▼
//!                                      price
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use carval_features::RawInput;
//! use carval_serving::{QuoteService, ServingConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServingConfig::builder().model_dir("/models/price").build();
//! let service = QuoteService::from_config(&config)?;
//!
//! let quote = service.quote(&RawInput {
//!     year: "2018".into(),
//!     mileage: "15000".into(),
//!     tax: "150".into(),
//!     mpg: "45.0".into(),
//!     engine_size: "2.0".into(),
//!     model: "C Class".into(),
//!     transmission: "Automatic".into(),
//!     fuel_type: "Diesel".into(),
//! })?;
//! println!("{:.2}", quote.price);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod inference;
pub mod model_loader;
pub mod predictor;
pub mod quote;
pub mod scaler;

pub use config::{ConfigError, ServingConfig, ServingConfigBuilder};
pub use error::{RequestError, ServingError, ServingResult};
pub use inference::{build_model, Activation, InferenceModel, MlpModel, MlpSpec, ModelSpec};
pub use model_loader::{ArtifactLoader, LoadedArtifacts};
pub use predictor::PricePredictor;
pub use quote::{Quote, QuoteService};
pub use scaler::{
    build_scaler, FeatureTransform, MinMaxScaler, ScalerArtifact, ScalerParams, StandardScaler,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
