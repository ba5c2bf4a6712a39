//! One-hot feature encoder.
//!
//! [`FeatureEncoder::encode`] turns a [`RawInput`] into an [`EncodedVector`]
//! laid out exactly like its [`FeatureSchema`]:
//!
//! 1. every column starts at `0.0`;
//! 2. the five numeric fields are parsed and written by column name;
//! 3. each categorical selection is turned into `prefix + trimmed text` and the
//!    matching indicator column is set to `1.0`;
//! 4. selections without a matching column are handled per [`CategoryPolicy`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EncodingError, EncodingResult};
use crate::schema::{CategoricalGroup, FeatureSchema, NumericField};

/// Raw user input for a single prediction request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    pub year: String,
    pub mileage: String,
    pub tax: String,
    pub mpg: String,
    pub engine_size: String,
    pub model: String,
    pub transmission: String,
    pub fuel_type: String,
}

impl RawInput {
    /// Text entered for a numeric field.
    pub fn numeric(&self, field: NumericField) -> &str {
        match field {
            NumericField::Year => &self.year,
            NumericField::Mileage => &self.mileage,
            NumericField::Tax => &self.tax,
            NumericField::Mpg => &self.mpg,
            NumericField::EngineSize => &self.engine_size,
        }
    }

    /// Mutable access to a numeric field.
    pub fn numeric_mut(&mut self, field: NumericField) -> &mut String {
        match field {
            NumericField::Year => &mut self.year,
            NumericField::Mileage => &mut self.mileage,
            NumericField::Tax => &mut self.tax,
            NumericField::Mpg => &mut self.mpg,
            NumericField::EngineSize => &mut self.engine_size,
        }
    }

    /// Selection made for a categorical group.
    pub fn selection(&self, group: CategoricalGroup) -> &str {
        match group {
            CategoricalGroup::Model => &self.model,
            CategoricalGroup::Transmission => &self.transmission,
            CategoricalGroup::FuelType => &self.fuel_type,
        }
    }

    /// Mutable access to a categorical selection.
    pub fn selection_mut(&mut self, group: CategoricalGroup) -> &mut String {
        match group {
            CategoricalGroup::Model => &mut self.model,
            CategoricalGroup::Transmission => &mut self.transmission,
            CategoricalGroup::FuelType => &mut self.fuel_type,
        }
    }
}

/// What to do with a selection that has no indicator column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Leave the whole group at zero, as the trained pipeline did.
    #[default]
    Lenient,
    /// Reject the request with [`EncodingError::UnknownCategory`].
    Strict,
}

/// Encoded feature vector, ordered like its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    values: Vec<f64>,
    schema: Arc<FeatureSchema>,
}

impl EncodedVector {
    /// Values in schema order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Schema the vector was encoded against.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Value of a named column.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|pos| self.values[pos])
    }

    /// Names of the indicator columns set to one within a group.
    pub fn hot_columns(&self, group: CategoricalGroup) -> Vec<&str> {
        self.schema
            .group_positions(group)
            .into_iter()
            .filter(|&pos| self.values[pos] == 1.0)
            .map(|pos| self.schema.columns()[pos].as_str())
            .collect()
    }

    /// Iterate over `(column, value)` pairs in schema order.
    pub fn iter_named(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Encodes raw input against a fixed schema.
///
/// # Example
///
/// ```
/// use carval_features::{FeatureEncoder, RawInput};
///
/// let encoder = FeatureEncoder::trained();
/// let input = RawInput {
///     year: "2018".into(),
///     mileage: "15000".into(),
///     tax: "150".into(),
///     mpg: "45.0".into(),
///     engine_size: "2.0".into(),
///     model: "C Class".into(),
///     transmission: "Automatic".into(),
///     fuel_type: "Diesel".into(),
/// };
///
/// let vector = encoder.encode(&input).unwrap();
/// assert_eq!(vector.len(), 40);
/// assert_eq!(vector.value("model_ C Class"), Some(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: Arc<FeatureSchema>,
    policy: CategoryPolicy,
}

impl FeatureEncoder {
    /// Create an encoder for a schema with the default (lenient) policy.
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self {
            schema,
            policy: CategoryPolicy::default(),
        }
    }

    /// Encoder over the trained 40-column schema.
    pub fn trained() -> Self {
        Self::new(Arc::new(FeatureSchema::trained()))
    }

    /// Set the unmatched-category policy.
    pub fn with_policy(mut self, policy: CategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn policy(&self) -> CategoryPolicy {
        self.policy
    }

    /// Encode one request.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::InvalidNumericField`] for the first numeric field
    /// that does not parse to a finite number, and
    /// [`EncodingError::UnknownCategory`] for an unmatched selection under
    /// [`CategoryPolicy::Strict`].
    pub fn encode(&self, input: &RawInput) -> EncodingResult<EncodedVector> {
        let mut values = vec![0.0; self.schema.len()];

        for field in NumericField::ALL {
            let value = parse_numeric(field, input.numeric(field))?;
            let pos = self.schema.position(field.column_name()).ok_or_else(|| {
                EncodingError::schema_mismatch(format!(
                    "missing numeric column {:?}",
                    field.column_name()
                ))
            })?;
            values[pos] = value;
        }

        for group in CategoricalGroup::ALL {
            let selection = input.selection(group).trim();
            let column = group.column_name(selection);
            match self.schema.position(&column) {
                Some(pos) => values[pos] = 1.0,
                None => match self.policy {
                    CategoryPolicy::Lenient => {
                        warn!(
                            group = %group,
                            column = %column,
                            "No indicator column for selection {:?}, leaving group unset",
                            selection
                        );
                    }
                    CategoryPolicy::Strict => {
                        return Err(EncodingError::UnknownCategory {
                            group,
                            value: selection.to_string(),
                            column,
                        });
                    }
                },
            }
        }

        debug!("Encoded {} features", values.len());
        Ok(EncodedVector {
            values,
            schema: Arc::clone(&self.schema),
        })
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::trained()
    }
}

/// Parse a numeric field, rejecting empty, malformed and non-finite input.
pub fn parse_numeric(field: NumericField, text: &str) -> EncodingResult<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EncodingError::InvalidNumericField {
            field,
            input: text.to_string(),
        })
}
