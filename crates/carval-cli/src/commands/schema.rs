//! Schema and option listings.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use carval_features::{CategoricalGroup, FeatureSchema};
use carval_serving::ServingConfig;
use clap::Args;

/// Print the feature columns in the order they are served
///
/// Without `--config` this is the trained layout.
#[derive(Args, Debug, Clone, Default)]
pub struct SchemaCommand {
    /// JSON serving configuration whose `columns` override the trained layout
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print the column list as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl SchemaCommand {
    /// Execute the schema command
    pub fn run(&self) -> Result<()> {
        let schema = self.schema()?;
        let stdout = io::stdout();
        self.write_to(&schema, &mut stdout.lock())
    }

    /// The schema a service started with the same config would encode against.
    pub fn schema(&self) -> Result<FeatureSchema> {
        match &self.config {
            Some(path) => {
                let config = ServingConfig::from_file(path)
                    .with_context(|| format!("Failed to read config {:?}", path))?;
                Ok(config.schema()?)
            }
            None => Ok(FeatureSchema::trained()),
        }
    }

    pub fn write_to<W: Write>(&self, schema: &FeatureSchema, out: &mut W) -> Result<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(schema.columns())?)?;
            return Ok(());
        }
        for (pos, column) in schema.columns().iter().enumerate() {
            writeln!(out, "{pos:>2}  {column}")?;
        }
        Ok(())
    }
}

/// Print the selectable options for each categorical field
#[derive(Args, Debug, Clone, Default)]
pub struct OptionsCommand {}

impl OptionsCommand {
    /// Execute the options command
    pub fn run(&self) -> Result<()> {
        let stdout = io::stdout();
        self.write_to(&mut stdout.lock())
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for group in CategoricalGroup::ALL {
            writeln!(out, "{}:", group.label())?;
            for option in group.options() {
                writeln!(out, "  {option}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_listing() {
        let mut out = Vec::new();
        SchemaCommand::default()
            .write_to(&FeatureSchema::trained(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 40);
        assert_eq!(lines[0], " 0  year");
        assert_eq!(lines[7], " 7  model_ C Class");
    }

    #[test]
    fn test_schema_json() {
        let mut out = Vec::new();
        SchemaCommand {
            json: true,
            ..Default::default()
        }
        .write_to(&FeatureSchema::trained(), &mut out)
        .unwrap();
        let columns: Vec<String> = serde_json::from_slice(&out).unwrap();
        assert_eq!(columns.len(), 40);
        assert_eq!(columns[39], "fuelType_Petrol");
    }

    #[test]
    fn test_schema_follows_config_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carval.json");
        std::fs::write(
            &path,
            r#"{"model_dir": "/models/price", "columns": ["mileage", "year", "tax", "mpg", "engineSize", "model_ C Class"]}"#,
        )
        .unwrap();

        let cmd = SchemaCommand {
            config: Some(path),
            json: false,
        };
        let schema = cmd.schema().unwrap();
        assert_eq!(schema.len(), 6);

        let mut out = Vec::new();
        cmd.write_to(&schema, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(" 0  mileage\n 1  year\n"));
        assert!(text.ends_with(" 5  model_ C Class\n"));
    }

    #[test]
    fn test_schema_without_config_is_trained() {
        let schema = SchemaCommand::default().schema().unwrap();
        assert_eq!(schema.columns(), FeatureSchema::trained().columns());
    }

    #[test]
    fn test_options_listing() {
        let mut out = Vec::new();
        OptionsCommand {}.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("model:\n  A Class\n"));
        assert!(text.contains("fuel type:\n  Diesel\n"));
    }
}
