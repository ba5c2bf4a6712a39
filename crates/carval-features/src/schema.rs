//! Feature schema for the trained price model.
//!
//! The schema is the ordered list of column names the scaler and model were
//! fitted on. Column order is part of the model contract: a permutation still
//! produces a vector of the right width, so nothing downstream can detect it.
//! Every encoder writes through [`FeatureSchema::position`] and never through
//! hard-coded offsets.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};

/// Vehicle models offered to the user, in form order.
pub const MODEL_OPTIONS: [&str; 27] = [
    "A Class", "B Class", "C Class", "CL Class", "CLA Class", "CLC Class", "CLK", "CLS Class",
    "E Class", "G Class", "GL Class", "GLA Class", "GLB Class", "GLC Class", "GLE Class",
    "GLS Class", "M Class", "R Class", "S Class", "SL CLASS", "SLK", "V Class", "X-CLASS", "180",
    "200", "220", "230",
];

/// Transmission types offered to the user.
pub const TRANSMISSION_OPTIONS: [&str; 4] = ["Automatic", "Manual", "Other", "Semi-Auto"];

/// Fuel types offered to the user.
pub const FUEL_TYPE_OPTIONS: [&str; 4] = ["Diesel", "Hybrid", "Other", "Petrol"];

/// Column names of the trained model, in training order.
///
/// Note the spelling of the last four model columns: the training data had no
/// leading space on the numeric model names.
pub const TRAINED_COLUMNS: [&str; 40] = [
    "year",
    "mileage",
    "tax",
    "mpg",
    "engineSize",
    "model_ A Class",
    "model_ B Class",
    "model_ C Class",
    "model_ CL Class",
    "model_ CLA Class",
    "model_ CLC Class",
    "model_ CLK",
    "model_ CLS Class",
    "model_ E Class",
    "model_ G Class",
    "model_ GL Class",
    "model_ GLA Class",
    "model_ GLB Class",
    "model_ GLC Class",
    "model_ GLE Class",
    "model_ GLS Class",
    "model_ M Class",
    "model_ R Class",
    "model_ S Class",
    "model_ SL CLASS",
    "model_ SLK",
    "model_ V Class",
    "model_ X-CLASS",
    "model_180",
    "model_200",
    "model_220",
    "model_230",
    "transmission_Automatic",
    "transmission_Manual",
    "transmission_Other",
    "transmission_Semi-Auto",
    "fuelType_Diesel",
    "fuelType_Hybrid",
    "fuelType_Other",
    "fuelType_Petrol",
];

/// Continuous input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    Year,
    Mileage,
    Tax,
    Mpg,
    EngineSize,
}

impl NumericField {
    /// All numeric fields in schema order.
    pub const ALL: [NumericField; 5] = [
        NumericField::Year,
        NumericField::Mileage,
        NumericField::Tax,
        NumericField::Mpg,
        NumericField::EngineSize,
    ];

    /// The schema column this field is written to.
    pub fn column_name(&self) -> &'static str {
        match self {
            NumericField::Year => "year",
            NumericField::Mileage => "mileage",
            NumericField::Tax => "tax",
            NumericField::Mpg => "mpg",
            NumericField::EngineSize => "engineSize",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One-hot encoded input groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalGroup {
    Model,
    Transmission,
    FuelType,
}

impl CategoricalGroup {
    /// All categorical groups in schema order.
    pub const ALL: [CategoricalGroup; 3] = [
        CategoricalGroup::Model,
        CategoricalGroup::Transmission,
        CategoricalGroup::FuelType,
    ];

    /// Prefix prepended to a selection to form its indicator column.
    ///
    /// The model prefix carries a trailing space, the others do not. This is
    /// the literal spelling of the trained column names.
    pub fn prefix(&self) -> &'static str {
        match self {
            CategoricalGroup::Model => "model_ ",
            CategoricalGroup::Transmission => "transmission_",
            CategoricalGroup::FuelType => "fuelType_",
        }
    }

    /// Stem shared by every column of this group, used to find group members.
    pub fn stem(&self) -> &'static str {
        match self {
            CategoricalGroup::Model => "model_",
            CategoricalGroup::Transmission => "transmission_",
            CategoricalGroup::FuelType => "fuelType_",
        }
    }

    /// Options the user can pick from.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            CategoricalGroup::Model => &MODEL_OPTIONS,
            CategoricalGroup::Transmission => &TRANSMISSION_OPTIONS,
            CategoricalGroup::FuelType => &FUEL_TYPE_OPTIONS,
        }
    }

    /// Build the indicator column name for a selection.
    pub fn column_name(&self, selection: &str) -> String {
        format!("{}{}", self.prefix(), selection.trim())
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CategoricalGroup::Model => "model",
            CategoricalGroup::Transmission => "transmission",
            CategoricalGroup::FuelType => "fuel type",
        }
    }
}

impl fmt::Display for CategoricalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered set of feature columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from an explicit column list.
    ///
    /// # Errors
    ///
    /// Fails if a column name repeats or a numeric column is missing.
    pub fn from_columns<I, S>(columns: I) -> EncodingResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (pos, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), pos).is_some() {
                return Err(EncodingError::schema_mismatch(format!(
                    "duplicate column {:?}",
                    name
                )));
            }
        }

        for field in NumericField::ALL {
            if !index.contains_key(field.column_name()) {
                return Err(EncodingError::schema_mismatch(format!(
                    "missing numeric column {:?}",
                    field.column_name()
                )));
            }
        }

        Ok(Self { columns, index })
    }

    /// The 40-column schema the shipped model was trained on.
    pub fn trained() -> Self {
        let columns: Vec<String> = TRAINED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos))
            .collect();
        Self { columns, index }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column, if present.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Whether a column is present.
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Positions of every indicator column belonging to a group.
    pub fn group_positions(&self, group: CategoricalGroup) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.starts_with(group.stem()))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Compare against another column list, reporting the first difference.
    pub fn check_columns(&self, other: &[String]) -> EncodingResult<()> {
        if other.len() != self.columns.len() {
            return Err(EncodingError::schema_mismatch(format!(
                "expected {} columns, got {}",
                self.columns.len(),
                other.len()
            )));
        }
        if let Some((pos, (ours, theirs))) = self
            .columns
            .iter()
            .zip(other)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(EncodingError::schema_mismatch(format!(
                "column {} is {:?}, expected {:?}",
                pos, theirs, ours
            )));
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::trained()
    }
}
