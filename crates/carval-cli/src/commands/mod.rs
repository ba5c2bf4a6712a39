//! CLI Command Implementations
//!
//! - [`predict`]: one-shot prediction from flags
//! - [`interactive`]: prompt loop standing in for the entry form
//! - [`schema`]: column and option listings

mod artifacts;
mod interactive;
mod predict;
mod schema;

pub use artifacts::ArtifactArgs;
pub use interactive::{InteractiveCommand, Session, SessionSummary};
pub use predict::PredictCommand;
pub use schema::{OptionsCommand, SchemaCommand};
