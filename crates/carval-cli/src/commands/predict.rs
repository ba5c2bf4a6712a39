//! Predict Command Implementation
//!
//! One-shot price prediction from command-line flags.

use std::io::{self, Write};

use anyhow::{Context, Result};
use carval_features::{RawInput, FUEL_TYPE_OPTIONS, MODEL_OPTIONS, TRANSMISSION_OPTIONS};
use carval_serving::QuoteService;
use clap::builder::PossibleValuesParser;
use clap::Args;
use tracing::info;

use super::artifacts::ArtifactArgs;
use crate::format_price;

/// Predict the price of one vehicle
///
/// Numeric fields are taken as text and validated by the encoder, so a
/// malformed value is reported by field name. Categorical fields only accept
/// the options the model was trained with.
///
/// # Example
///
/// ```bash
/// carval predict --model-dir ./model \
///     --year 2018 --mileage 15000 --tax 150 --mpg 45.0 --engine-size 2.0 \
///     --model "C Class" --transmission Automatic --fuel-type Diesel
/// ```
#[derive(Args, Debug, Clone)]
pub struct PredictCommand {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Registration year
    #[arg(long, allow_hyphen_values = true)]
    pub year: String,

    /// Odometer reading in miles
    #[arg(long, allow_hyphen_values = true)]
    pub mileage: String,

    /// Annual road tax
    #[arg(long, allow_hyphen_values = true)]
    pub tax: String,

    /// Fuel economy in miles per gallon
    #[arg(long, allow_hyphen_values = true)]
    pub mpg: String,

    /// Engine size in litres
    #[arg(long, allow_hyphen_values = true)]
    pub engine_size: String,

    /// Vehicle model
    #[arg(long, value_parser = PossibleValuesParser::new(MODEL_OPTIONS))]
    pub model: String,

    /// Transmission type
    #[arg(long, value_parser = PossibleValuesParser::new(TRANSMISSION_OPTIONS))]
    pub transmission: String,

    /// Fuel type
    #[arg(long, value_parser = PossibleValuesParser::new(FUEL_TYPE_OPTIONS))]
    pub fuel_type: String,

    /// Also print the encoded feature vector
    #[arg(long)]
    pub show_vector: bool,
}

impl PredictCommand {
    /// Execute the predict command
    pub fn run(&self) -> Result<()> {
        let service = self.artifacts.load_service()?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.execute(&service, &mut out)
    }

    /// Price the request against an already loaded service.
    pub fn execute<W: Write>(&self, service: &QuoteService, out: &mut W) -> Result<()> {
        let quote = service
            .quote(&self.raw_input())
            .context("An error occurred")?;
        info!(price = quote.price, "Prediction served");

        writeln!(out, "The predicted price is: {}", format_price(quote.price))?;
        if self.show_vector {
            for (column, value) in quote.features.iter_named() {
                writeln!(out, "  {column:<24} {value}")?;
            }
        }
        Ok(())
    }

    /// The request as the encoder sees it.
    pub fn raw_input(&self) -> RawInput {
        RawInput {
            year: self.year.clone(),
            mileage: self.mileage.clone(),
            tax: self.tax.clone(),
            mpg: self.mpg.clone(),
            engine_size: self.engine_size.clone(),
            model: self.model.clone(),
            transmission: self.transmission.clone(),
            fuel_type: self.fuel_type.clone(),
        }
    }
}
