//! `academy validate` command - Validate draft files against a form schema

use console::style;
use miette::Result;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::forms::FormKind;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::{DraftError, Validator};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Draft files or directories to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Form the drafts are for
    #[arg(long, value_enum)]
    pub form: FormKind,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let registry = SchemaRegistry::default();
    let validator =
        Validator::new(&registry, args.form.schema_name()).map_err(|e| miette::miette!("{}", e))?;
    let shape = args.form.defaults();

    let mut stats = ValidationStats::default();
    let files = expand_paths(&args.paths);

    println!(
        "{} Validating {} {} draft(s)...\n",
        style("→").blue(),
        files.len(),
        args.form
    );

    for path in &files {
        stats.files_checked += 1;

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if !args.summary {
                    println!("{} {} - {}", style("✗").red(), path.display(), e);
                }
                stats.files_failed += 1;
                stats.total_errors += 1;
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        let filename = path.display().to_string();
        match validator.validate_draft(&content, &filename, &shape) {
            Ok(_) => {
                stats.files_passed += 1;
                if !args.summary {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Err(e) => {
                let count = match &e {
                    DraftError::Syntax(_) => 1,
                    DraftError::Invalid(invalid) => invalid.violation_count(),
                };
                stats.files_failed += 1;
                stats.total_errors += count;

                if !args.summary {
                    println!(
                        "{} {} - {} error(s)",
                        style("✗").red(),
                        path.display(),
                        count
                    );
                    let report = miette::Report::new(e);
                    println!("{:?}", report);
                }

                if !args.keep_going {
                    break;
                }
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    println!();

    match stats.files_failed {
        0 => {
            println!("{} All files passed validation!", style("✓").green().bold());
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

/// Expand directories into the YAML files below them
///
/// Missing paths are kept so they're reported as unreadable.
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.') || e.depth() == 0)
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| matches!(p.extension().and_then(|x| x.to_str()), Some("yaml" | "yml")))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files
}
