//! File layout of an exported price model directory.

/// Model architecture description, relative to the model directory.
pub const MODEL_SPEC_FILE: &str = "model_spec.json";

/// Directory holding dense layer parameters.
pub const DENSE_DIR: &str = "dense";

/// Dense parameter file inside [`DENSE_DIR`].
pub const DENSE_PARAMS_FILE: &str = "params.json";

/// Default scaler file, relative to the model directory.
pub const SCALER_FILE: &str = "scaler.json";

/// Environment variable naming the model directory.
pub const MODEL_DIR_ENV: &str = "CARVAL_MODEL_DIR";

/// Environment variable overriding the scaler path.
pub const SCALER_PATH_ENV: &str = "CARVAL_SCALER_PATH";
