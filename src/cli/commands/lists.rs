//! `academy countries` and `academy states` - remote option lists

use miette::Result;
use tokio::runtime::Runtime;

use crate::cli::helpers::{http_client, load_config};
use crate::cli::table::print_places;
use crate::cli::GlobalOpts;
use crate::remote::{CountryDirectory, Place, StateDirectory};

#[derive(clap::Args, Debug)]
pub struct CountriesArgs {
    /// Only show countries whose name or code contains this text
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatesArgs {
    /// Two-letter country code (e.g. NG)
    pub country: String,
}

pub fn run_countries(args: CountriesArgs, global: &GlobalOpts, runtime: &Runtime) -> Result<()> {
    let config = load_config(global)?;
    let directory = CountryDirectory::new(http_client()?, config.country_api_url())
        .map_err(|e| miette::miette!("{}", e))?;

    let countries = runtime
        .block_on(directory.countries())
        .map_err(|e| miette::miette!("{}", e))?;

    let shown: Vec<Place> = match &args.search {
        Some(needle) => {
            let needle = needle.to_lowercase();
            countries
                .iter()
                .filter(|place| {
                    place.name.to_lowercase().contains(&needle)
                        || place.code.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        }
        None => countries.to_vec(),
    };

    print_places(&shown, global.format, "countries", global.quiet)
}

pub fn run_states(args: StatesArgs, global: &GlobalOpts, runtime: &Runtime) -> Result<()> {
    let config = load_config(global)?;
    let api_key = config.state_api_key().map_err(|e| miette::miette!("{}", e))?;
    let directory = StateDirectory::new(http_client()?, config.state_api_url(), api_key)
        .map_err(|e| miette::miette!("{}", e))?;

    let code = args.country.trim().to_uppercase();
    let states = runtime
        .block_on(directory.states(&code))
        .map_err(|e| miette::miette!("{}", e))?;

    print_places(&states, global.format, "states", global.quiet)
}
