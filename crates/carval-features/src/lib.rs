//! Feature schema and encoder for carval.
//!
//! The price model consumes a flat vector of continuous fields followed by
//! one-hot indicator groups. This crate owns that layout:
//!
//! - [`FeatureSchema`]: the ordered column list the model was trained on
//! - [`FeatureEncoder`]: turns a [`RawInput`] into an [`EncodedVector`]
//! - [`CategoryPolicy`]: how selections without a matching column are handled
//!
//! # Example
//!
//! ```
//! use carval_features::{CategoricalGroup, CategoryPolicy, FeatureEncoder, RawInput};
//!
//! let encoder = FeatureEncoder::trained().with_policy(CategoryPolicy::Strict);
//! let input = RawInput {
//!     year: "2019".into(),
//!     mileage: "8000".into(),
//!     tax: "145".into(),
//!     mpg: "38.2".into(),
//!     engine_size: "3.0".into(),
//!     model: "E Class".into(),
//!     transmission: "Semi-Auto".into(),
//!     fuel_type: "Petrol".into(),
//! };
//!
//! let vector = encoder.encode(&input).unwrap();
//! assert_eq!(vector.hot_columns(CategoricalGroup::Model), vec!["model_ E Class"]);
//! ```

pub mod encoder;
pub mod error;
pub mod schema;

pub use encoder::{parse_numeric, CategoryPolicy, EncodedVector, FeatureEncoder, RawInput};
pub use error::{EncodingError, EncodingResult};
pub use schema::{
    CategoricalGroup, FeatureSchema, NumericField, FUEL_TYPE_OPTIONS, MODEL_OPTIONS,
    TRAINED_COLUMNS, TRANSMISSION_OPTIONS,
};
