//! `academy course` command - Course creation

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::cli::commands::form::{self, Interactive};
use crate::cli::helpers::{http_client, load_config};
use crate::cli::GlobalOpts;
use crate::core::{CourseEndpoint, FormController, SubmitPipeline};
use crate::forms::{Course, Form};
use crate::schema::{NoOptions, SchemaWizard, TemplateGenerator, Validator};

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    /// Create a course and post it to the backend
    New(NewArgs),

    /// Write a YAML draft to fill in and pass to `course new --from`
    Draft(DraftArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Start from a YAML draft file
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Prompt for every field
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Validate only, don't submit
    #[arg(long)]
    pub dry_run: bool,

    /// Backend base URL (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Course name
    #[arg(long)]
    pub name: Option<String>,

    /// First day of the course
    #[arg(long)]
    pub start_date: Option<String>,

    /// Duration, e.g. "2 months"
    #[arg(long)]
    pub duration: Option<String>,

    /// Cohort label, e.g. "December(2024)"
    #[arg(long)]
    pub cohort: Option<String>,

    /// Link to course resources
    #[arg(long)]
    pub resource_link: Option<String>,

    /// Community invite link
    #[arg(long)]
    pub community_link: Option<String>,

    /// Learning platform name
    #[arg(long)]
    pub platform_name: Option<String>,

    /// Learning platform link
    #[arg(long)]
    pub platform_link: Option<String>,

    /// One-off price in USD
    #[arg(long)]
    pub usd: Option<String>,

    /// One-off price in NGN
    #[arg(long)]
    pub ngn: Option<String>,

    /// Installment price in USD
    #[arg(long)]
    pub recurrent_usd: Option<String>,

    /// Installment price in NGN
    #[arg(long)]
    pub recurrent_ngn: Option<String>,

    /// Payments per cycle (1-4)
    #[arg(long)]
    pub frequency: Option<String>,
}

impl NewArgs {
    fn fields(&self) -> [(&'static str, Option<&str>); 13] {
        [
            ("name", self.name.as_deref()),
            ("startDate", self.start_date.as_deref()),
            ("duration", self.duration.as_deref()),
            ("cohort", self.cohort.as_deref()),
            ("links.resourceLink", self.resource_link.as_deref()),
            ("links.communityLink", self.community_link.as_deref()),
            ("links.platformName", self.platform_name.as_deref()),
            ("links.platformLink", self.platform_link.as_deref()),
            ("price.USD", self.usd.as_deref()),
            ("price.NGN", self.ngn.as_deref()),
            ("recurrentPrice.USD", self.recurrent_usd.as_deref()),
            ("recurrentPrice.NGN", self.recurrent_ngn.as_deref()),
            ("recurrentPrice.frequency", self.frequency.as_deref()),
        ]
    }
}

#[derive(clap::Args, Debug)]
pub struct DraftArgs {
    /// Write to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Run a course subcommand
pub fn run(cmd: CourseCommands, global: &GlobalOpts, runtime: &Runtime) -> Result<()> {
    match cmd {
        CourseCommands::New(args) => run_new(args, global, runtime),
        CourseCommands::Draft(args) => run_draft::<Course>(args.output, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts, runtime: &Runtime) -> Result<()> {
    let mut controller = FormController::<Course>::new();
    if let Some(path) = &args.from {
        form::load_draft(&mut controller, path)?;
    }
    form::apply_fields(&mut controller, &args.fields())?;

    let wizard_validator = Validator::for_form::<Course>().map_err(|e| miette::miette!("{}", e))?;
    let mut options = NoOptions;
    if args.interactive {
        SchemaWizard::new(&wizard_validator).run(&mut controller, &mut options)?;
    }

    let mut pipeline = SubmitPipeline::<Course>::new().map_err(|e| miette::miette!("{}", e))?;
    if args.dry_run {
        return form::check_only(&pipeline, &mut controller, global);
    }

    // Base URL is only needed once there is something to send
    let base_url = match args.base_url {
        Some(url) => url,
        None => load_config(global)?
            .base_url()
            .map_err(|e| miette::miette!("{}", e))?
            .to_string(),
    };
    let endpoint =
        CourseEndpoint::new(http_client()?, &base_url).map_err(|e| miette::miette!("{}", e))?;

    let interactive = if args.interactive {
        Some(Interactive {
            wizard: SchemaWizard::new(&wizard_validator),
            options: &mut options,
        })
    } else {
        None
    };
    form::submit(runtime, &mut pipeline, &mut controller, &endpoint, global, interactive)
}

/// Render a draft for `F`, to stdout or a file
pub fn run_draft<F: Form>(output: Option<PathBuf>, global: &GlobalOpts) -> Result<()> {
    let validator = Validator::for_form::<F>().map_err(|e| miette::miette!("{}", e))?;
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let yaml = generator
        .render(&validator, &F::defaults())
        .map_err(|e| miette::miette!("{}", e))?;

    match output {
        Some(path) => {
            fs::write(&path, yaml).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} draft to {}",
                    style("✓").green(),
                    F::SCHEMA,
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", yaml),
    }
    Ok(())
}
