//! `academy register` command - Student registration

use clap::Subcommand;
use miette::Result;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::runtime::Runtime;

use crate::cli::commands::course::{run_draft, DraftArgs};
use crate::cli::commands::form::{self, Interactive};
use crate::cli::helpers::{http_client, load_config};
use crate::cli::GlobalOpts;
use crate::core::{Config, ConfigError, FormController, RegistrationLog, SubmitPipeline};
use crate::forms::registration::{
    AgeRange, CourseChoice, PaymentMethod, PaymentPlan, ReferralSource, RegistrationCohort,
};
use crate::forms::Registration;
use crate::remote::picker::{choose_country, choose_state};
use crate::remote::{
    CountryDirectory, ListState, Place, RemoteError, SelectionError, StateDirectory, StatePicker,
    StateRequest,
};
use crate::schema::{OptionSource, SchemaWizard, Validator};

#[derive(Subcommand, Debug)]
pub enum RegisterCommands {
    /// Register a student
    New(NewArgs),

    /// Write a YAML draft to fill in and pass to `register new --from`
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

    /// Student's full name
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Age range, e.g. "25-34"
    #[arg(long)]
    pub age_range: Option<String>,

    /// Country name or two-letter code
    #[arg(long)]
    pub country: Option<String>,

    /// State name or code (needs --country)
    #[arg(long, requires = "country")]
    pub state: Option<String>,

    /// Course to enrol in
    #[arg(long)]
    pub course: Option<String>,

    /// Cohort, e.g. "January 2025"
    #[arg(long)]
    pub cohort: Option<String>,

    /// How the student heard about the academy
    #[arg(long)]
    pub referral_source: Option<String>,

    /// "Full Payment" or "Installments"
    #[arg(long)]
    pub payment_plan: Option<String>,

    /// "Card", "Bank Transfer" or "USSD"
    #[arg(long)]
    pub payment_method: Option<String>,
}

impl NewArgs {
    fn fields(&self) -> [(&'static str, Option<&str>); 9] {
        [
            ("fullName", self.full_name.as_deref()),
            ("email", self.email.as_deref()),
            ("phone", self.phone.as_deref()),
            ("ageRange", canonical::<AgeRange>(self.age_range.as_deref())),
            ("course", canonical::<CourseChoice>(self.course.as_deref())),
            ("cohort", canonical::<RegistrationCohort>(self.cohort.as_deref())),
            ("referralSource", canonical::<ReferralSource>(self.referral_source.as_deref())),
            ("paymentPlan", canonical::<PaymentPlan>(self.payment_plan.as_deref())),
            ("paymentMethod", canonical::<PaymentMethod>(self.payment_method.as_deref())),
        ]
    }
}

/// Spell a choice the way the form lists it (`ussd` -> `USSD`)
///
/// Text that names no option passes through for the schema to reject.
fn canonical<T>(raw: Option<&str>) -> Option<&str>
where
    T: FromStr + Into<&'static str>,
{
    raw.map(|text| text.parse::<T>().map(Into::into).unwrap_or(text))
}

/// Run a register subcommand
pub fn run(cmd: RegisterCommands, global: &GlobalOpts, runtime: &Runtime) -> Result<()> {
    match cmd {
        RegisterCommands::New(args) => run_new(args, global, runtime),
        RegisterCommands::Draft(args) => run_draft::<Registration>(args.output, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts, runtime: &Runtime) -> Result<()> {
    let config = load_config(global)?;
    let client = http_client()?;
    let countries = CountryDirectory::new(client.clone(), config.country_api_url())
        .map_err(|e| miette::miette!("{}", e))?;
    let states = state_directory(&config, client)?;

    let mut controller = FormController::<Registration>::new();
    if let Some(path) = &args.from {
        form::load_draft(&mut controller, path)?;
    }
    form::apply_fields(&mut controller, &args.fields())?;

    let mut options = LocationOptions {
        runtime,
        countries: &countries,
        states: states.as_ref(),
        picker: StatePicker::new(),
    };
    if let Some(query) = &args.country {
        options.pick_country(&mut controller, query)?;
    }
    if let Some(query) = &args.state {
        choose_state(&mut controller, &options.picker, query).map_err(|e| miette::miette!("{}", e))?;
    }

    let wizard_validator =
        Validator::for_form::<Registration>().map_err(|e| miette::miette!("{}", e))?;
    if args.interactive {
        SchemaWizard::new(&wizard_validator).run(&mut controller, &mut options)?;
    }

    let mut pipeline = SubmitPipeline::<Registration>::new().map_err(|e| miette::miette!("{}", e))?;
    if args.dry_run {
        return form::check_only(&pipeline, &mut controller, global);
    }

    let interactive = if args.interactive {
        Some(Interactive {
            wizard: SchemaWizard::new(&wizard_validator),
            options: &mut options,
        })
    } else {
        None
    };
    form::submit(runtime, &mut pipeline, &mut controller, &RegistrationLog, global, interactive)
}

/// State lookups need an API key; without one the state list reports why
fn state_directory(config: &Config, client: reqwest::Client) -> Result<Option<StateDirectory>> {
    match config.state_api_key() {
        Ok(key) => StateDirectory::new(client, config.state_api_url(), key)
            .map(Some)
            .map_err(|e| miette::miette!("{}", e)),
        Err(_) => Ok(None),
    }
}

/// Country and state choices backed by the remote directories
struct LocationOptions<'a> {
    runtime: &'a Runtime,
    countries: &'a CountryDirectory,
    states: Option<&'a StateDirectory>,
    picker: StatePicker,
}

impl LocationOptions<'_> {
    fn resolve_country(&self, query: &str) -> Result<Place> {
        self.runtime
            .block_on(self.countries.find(query))
            .map_err(|e| miette::miette!("{}", e))?
            .ok_or_else(|| miette::miette!("Unknown country: {}", query))
    }

    /// Select a country and load its states
    fn load_states(&mut self, country: Place) {
        let request = self.picker.select_country(country);
        self.finish(request);
    }

    /// Set the country from a `--country` flag, clearing any state
    fn pick_country(
        &mut self,
        controller: &mut FormController<Registration>,
        query: &str,
    ) -> Result<()> {
        let place = self.resolve_country(query)?;
        let request = choose_country(controller, &mut self.picker, place)
            .map_err(|e| miette::miette!("{}", e))?;
        self.finish(request);
        Ok(())
    }

    fn finish(&mut self, request: StateRequest) {
        let result = match self.states {
            Some(directory) => self.runtime.block_on(directory.states(&request.country.code)),
            None => Err(RemoteError::Config(ConfigError::Missing {
                key: "state_api_key",
                env: "ACADEMY_STATE_API_KEY",
            })),
        };
        self.picker.apply(&request, result);
    }
}

impl OptionSource for LocationOptions<'_> {
    fn choices(&mut self, list: &str) -> Result<Vec<String>> {
        match list {
            "countries" => Ok(self
                .runtime
                .block_on(self.countries.countries())
                .map_err(|e| miette::miette!("{}", e))?
                .iter()
                .map(|place| place.name.clone())
                .collect()),
            "states" => {
                let country = self
                    .picker
                    .country()
                    .map(|place| place.name.clone())
                    .ok_or_else(|| miette::miette!("{}", SelectionError::NoCountry))?;
                match self.picker.states() {
                    ListState::Ready(places) => {
                        Ok(places.iter().map(|place| place.name.clone()).collect())
                    }
                    ListState::Failed(reason) => Err(miette::miette!(
                        "{}",
                        SelectionError::Unavailable {
                            country,
                            reason: reason.clone(),
                        }
                    )),
                    ListState::Loading => {
                        Err(miette::miette!("{}", SelectionError::Loading(country)))
                    }
                    ListState::Disabled => Err(miette::miette!("{}", SelectionError::NoCountry)),
                }
            }
            other => Err(miette::miette!("No option source for '{}'", other)),
        }
    }

    fn chosen(&mut self, list: &str, value: &str) -> Result<()> {
        if list == "countries" {
            let place = self.resolve_country(value)?;
            self.load_states(place);
        }
        Ok(())
    }
}
