//! List output for countries and states in every `--format`

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::remote::Place;

/// Longest name shown in human-readable tables
const NAME_WIDTH: usize = 40;

/// Write `places` to stdout; `noun` is used in the summary line
pub fn print_places(places: &[Place], format: OutputFormat, noun: &str, quiet: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Auto | OutputFormat::Md => {
            if places.is_empty() {
                if !quiet {
                    writeln!(out, "{}", style(format!("No {} found", noun)).dim()).into_diagnostic()?;
                }
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["CODE", "NAME"]);
            for place in places {
                builder.push_record([place.code.clone(), truncate_str(&place.name, NAME_WIDTH)]);
            }
            let mut table = builder.build();
            if format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::sharp());
            }
            writeln!(out, "{}", table).into_diagnostic()?;

            if format == OutputFormat::Auto && !quiet {
                writeln!(out, "\n{} {} found", style(places.len()).cyan(), noun).into_diagnostic()?;
            }
        }
        OutputFormat::Tsv => {
            for place in places {
                writeln!(out, "{}\t{}", place.code, place.name).into_diagnostic()?;
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(["code", "name"]).into_diagnostic()?;
            for place in places {
                writer
                    .write_record([place.code.as_str(), place.name.as_str()])
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(places).into_diagnostic()?;
            writeln!(out, "{}", json).into_diagnostic()?;
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(places).into_diagnostic()?;
            write!(out, "{}", yaml).into_diagnostic()?;
        }
        OutputFormat::Id => {
            for place in places {
                writeln!(out, "{}", place.code).into_diagnostic()?;
            }
        }
    }

    Ok(())
}
