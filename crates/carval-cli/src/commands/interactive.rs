//! Interactive Command Implementation
//!
//! A line-oriented entry form: prompts for every field, prices the vehicle,
//! reports errors, and starts over.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use carval_features::{CategoricalGroup, NumericField, RawInput};
use carval_serving::QuoteService;
use clap::Args;
use tracing::{info, warn};

use super::artifacts::ArtifactArgs;
use crate::format_price;

/// Prompt for vehicles one after another
///
/// Artifacts are loaded before the first prompt; if that fails the command
/// exits without reading any input. Categorical answers must name one of the
/// listed options (case is ignored); anything else is asked again. Errors in
/// a single request are printed and the session continues. End the session with `quit` or end-of-file.
#[derive(Args, Debug, Clone)]
pub struct InteractiveCommand {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

impl InteractiveCommand {
    /// Execute the interactive command
    pub fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())?;
        Ok(())
    }

    /// Load artifacts, then run a session over `input` and `output`.
    ///
    /// Nothing is written to `output` if loading fails.
    pub fn run_with<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<SessionSummary> {
        let service = self.artifacts.load_service()?;
        let summary = Session::new(&service, input, output).run()?;
        info!(
            quotes = summary.quotes,
            errors = summary.errors,
            "Interactive session finished"
        );
        Ok(summary)
    }
}

/// Counts for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub quotes: usize,
    pub errors: usize,
}

/// Prompt loop over arbitrary reader/writer pairs.
pub struct Session<'a, R, W> {
    service: &'a QuoteService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(service: &'a QuoteService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Run until `quit` or end of input.
    pub fn run(mut self) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        writeln!(
            self.output,
            "Enter car details (type 'quit' to exit). Empty selections use the first option."
        )?;

        while let Some(raw) = self.read_request()? {
            match self.service.quote(&raw) {
                Ok(quote) => {
                    summary.quotes += 1;
                    writeln!(
                        self.output,
                        "The predicted price is: {}",
                        format_price(quote.price)
                    )?;
                }
                Err(err) => {
                    summary.errors += 1;
                    warn!("Request failed: {}", err);
                    writeln!(self.output, "An error occurred: {}", err)?;
                }
            }
            writeln!(self.output)?;
        }

        Ok(summary)
    }

    /// Read one full request. `None` means the session is over.
    fn read_request(&mut self) -> Result<Option<RawInput>> {
        let mut raw = RawInput::default();

        for field in NumericField::ALL {
            match self.prompt(field.column_name())? {
                Some(text) => *raw.numeric_mut(field) = text,
                None => return Ok(None),
            }
        }

        for group in CategoricalGroup::ALL {
            match self.prompt_selection(group)? {
                Some(option) => *raw.selection_mut(group) = option.to_string(),
                None => return Ok(None),
            }
        }

        Ok(Some(raw))
    }

    /// Ask until the answer names one of the group's options.
    fn prompt_selection(&mut self, group: CategoricalGroup) -> Result<Option<&'static str>> {
        let options = group.options();
        let label = format!("{} [{}]", group.label(), options.join(", "));
        loop {
            let Some(text) = self.prompt(&label)? else {
                return Ok(None);
            };
            if let Some(option) = match_option(options, &text) {
                return Ok(Some(option));
            }
            writeln!(
                self.output,
                "{:?} is not a known {}, choose one of: {}",
                text.trim(),
                group.label(),
                options.join(", ")
            )?;
        }
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if matches!(line.trim().to_ascii_lowercase().as_str(), "quit" | "exit") {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Resolve an answer to one of `options`, ignoring case. Empty picks the first.
fn match_option(options: &'static [&'static str], answer: &str) -> Option<&'static str> {
    let answer = answer.trim();
    if answer.is_empty() {
        return options.first().copied();
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(answer))
        .copied()
}
