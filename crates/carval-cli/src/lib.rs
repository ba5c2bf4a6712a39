//! carval CLI Library
//!
//! Command-line host for the carval price model:
//!
//! - **Predict**: price one vehicle from flags
//! - **Interactive**: prompt for vehicles until `quit`
//! - **Schema** / **Options**: show the trained column layout and the
//!   selectable categories
//!
//! # Example
//!
//! ```bash
//! carval predict --model-dir ./model --year 2018 --mileage 15000 --tax 150 \
//!     --mpg 45.0 --engine-size 2.0 --model "C Class" \
//!     --transmission Automatic --fuel-type Diesel
//!
//! carval interactive --model-dir ./model
//! ```

pub mod commands;

use clap::{ArgAction, Parser, Subcommand};

pub use commands::{
    ArtifactArgs, InteractiveCommand, OptionsCommand, PredictCommand, SchemaCommand, Session,
    SessionSummary,
};

/// carval - vehicle price prediction
///
/// Encodes vehicle attributes into the trained feature layout and runs them
/// through an exported scaler and regression model.
#[derive(Parser, Debug)]
#[command(name = "carval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> String {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        format!("warn,carval_cli={level},carval_serving={level},carval_features={level}")
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict the price of one vehicle
    Predict(PredictCommand),

    /// Prompt for vehicles until quit
    Interactive(InteractiveCommand),

    /// Print the feature columns in training order
    Schema(SchemaCommand),

    /// Print the selectable categorical options
    Options(OptionsCommand),
}

/// Format a price as dollars with thousands separators, e.g. `$12,345.67`.
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(999.994), "$999.99");
        assert_eq!(format_price(1000.0), "$1,000.00");
        assert_eq!(format_price(29250.0), "$29,250.00");
        assert_eq!(format_price(1234567.891), "$1,234,567.89");
        assert_eq!(format_price(-4500.5), "-$4,500.50");
        assert_eq!(format_price(-0.001), "$0.00");
    }

    #[test]
    fn test_log_directive() {
        let cli = Cli::parse_from(["carval", "-vv", "schema"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_directive().contains("carval_serving=debug"));

        let cli = Cli::parse_from(["carval", "options"]);
        assert!(cli.log_directive().contains("carval_cli=warn"));
    }
}
