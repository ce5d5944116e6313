//! Fill-and-submit flow shared by `course new` and `register new`

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::cli::helpers::print_field_errors;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{FormController, Notification, SubmitOutcome, SubmitPipeline, Submitter};
use crate::forms::Form;
use crate::schema::validator::{coerce_scalars, parse_draft};
use crate::schema::{FieldErrors, OptionSource, SchemaWizard};

/// Wizard used to collect values and to fix rejected fields
pub struct Interactive<'a> {
    pub wizard: SchemaWizard<'a>,
    pub options: &'a mut dyn OptionSource,
}

/// Load a YAML draft file into the controller
pub fn load_draft<F: Form>(controller: &mut FormController<F>, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    let filename = path.display().to_string();

    let mut record = parse_draft(&content, &filename)?;
    coerce_scalars(&mut record, &F::defaults());
    let loaded = controller
        .load(&record)
        .map_err(|e| miette::miette!("{}: {}", filename, e))?;

    debug!(file = %filename, fields = loaded, "draft loaded");
    Ok(())
}

/// Apply `--field value` flags; unset flags leave the field alone
pub fn apply_fields<F: Form>(
    controller: &mut FormController<F>,
    fields: &[(&str, Option<&str>)],
) -> Result<()> {
    for (path, value) in fields {
        if let Some(value) = value {
            controller
                .set_str(path, value)
                .map_err(|e| miette::miette!("{}", e))?;
        }
    }
    Ok(())
}

/// Validate without sending (`--dry-run`)
pub fn check_only<F: Form + Sync>(
    pipeline: &SubmitPipeline<F>,
    controller: &mut FormController<F>,
    global: &GlobalOpts,
) -> Result<()> {
    match pipeline.check(controller) {
        Ok(value) => {
            if !emit_value(&value, global)? && !global.quiet {
                println!("{} {} is valid (not submitted)", style("✓").green(), F::TITLE);
            }
            Ok(())
        }
        Err(errors) => reject(&errors),
    }
}

/// Submit the controller's values; with a wizard, offer to fix and retry
pub fn submit<F, S>(
    runtime: &Runtime,
    pipeline: &mut SubmitPipeline<F>,
    controller: &mut FormController<F>,
    submitter: &S,
    global: &GlobalOpts,
    mut interactive: Option<Interactive<'_>>,
) -> Result<()>
where
    F: Form + Sync,
    S: Submitter<F> + ?Sized,
{
    loop {
        match runtime.block_on(pipeline.submit(controller, submitter)) {
            SubmitOutcome::Succeeded {
                value,
                notification,
            } => {
                report_success(&value, &notification, global)?;
                return Ok(());
            }

            SubmitOutcome::Rejected(errors) => {
                let Some(session) = interactive.as_mut() else {
                    return reject(&errors);
                };
                print_field_errors(&errors);
                if !confirm("Fix these fields and resubmit?")? {
                    return Err(miette::miette!("Submission rejected: {}", errors));
                }
                let paths: Vec<String> = controller
                    .field_paths()
                    .into_iter()
                    .filter(|path| errors.contains(path))
                    .collect();
                session.wizard.prompt_fields(controller, &paths, &mut *session.options)?;
            }

            SubmitOutcome::Failed { notification, .. } => {
                if interactive.is_none() {
                    return Err(miette::miette!("{}", notification));
                }
                eprintln!("{} {}", style("✗").red(), notification);
                if !confirm("Try again?")? {
                    return Err(miette::miette!("{}", notification));
                }
            }
        }
    }
}

fn reject(errors: &FieldErrors) -> Result<()> {
    print_field_errors(errors);
    Err(miette::miette!("Submission rejected: {}", errors))
}

fn report_success<F: Serialize>(value: &F, notification: &Notification, global: &GlobalOpts) -> Result<()> {
    if !emit_value(value, global)? && !global.quiet {
        println!("{} {}", style("✓").green(), notification);
    }
    Ok(())
}

/// Print the record for machine-readable formats; false if nothing was printed
fn emit_value<F: Serialize>(value: &F, global: &GlobalOpts) -> Result<bool> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact()
        .into_diagnostic()
}
