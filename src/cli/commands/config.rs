//! `academy config` command - Configuration management
//!
//! `set` and `unset` edit the global file, or the `--config` file if given.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{load_config, mask_secret};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::{is_valid_key, CONFIG_KEYS};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show the path to the configuration file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., base_url)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    if let Some(key) = &args.key {
        match config.get(key).map_err(|e| miette::miette!("{}", e))? {
            Some(value) => println!("{}", value),
            None => return Err(miette::miette!("Key '{}' is not set", key)),
        }
        return Ok(());
    }

    let masked = Config {
        state_api_key: config.state_api_key.as_deref().map(mask_secret),
        ..config.clone()
    };
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&masked).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&masked).into_diagnostic()?);
            return Ok(());
        }
        _ => {}
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    for (key, _, _) in CONFIG_KEYS {
        let value = config.get(key).map_err(|e| miette::miette!("{}", e))?;
        let shown = match (*key, value) {
            ("state_api_key", Some(secret)) => Some(mask_secret(secret)),
            (_, value) => value.map(String::from),
        };
        print_config_value(key, shown.as_deref(), default_for(&config, key));
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command flags (e.g. --base-url)");
    println!("  2. Environment variables (ACADEMY_BASE_URL, ACADEMY_STATE_API_KEY, ...)");
    println!("  3. File given with --config");
    println!("  4. Global config (~/.config/academy/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(global)?;

    let mut config_map = read_mapping(&config_path)?;
    config_map.insert(
        serde_yml::Value::String(args.key.clone()),
        serde_yml::Value::String(args.value.clone()),
    );

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let shown = if args.key == "state_api_key" {
        mask_secret(&args.value)
    } else {
        args.value.clone()
    };
    if !global.quiet {
        println!(
            "{} Set {} {} {}",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(shown).yellow(),
        );
    }

    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(global)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    let removed = config_map.remove(&serde_yml::Value::String(args.key.clone()));
    if removed.is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !global.quiet {
        println!("{} Removed {}", style("✓").green(), style(&args.key).cyan());
    }

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let path = target_path(global)?;
    println!("{}", path.display());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, env, description) in CONFIG_KEYS {
        println!(
            "  {:<18} {:<26} {}",
            style(key).cyan(),
            style(env).dim(),
            description
        );
    }

    println!();
    println!(
        "{}",
        style("Use 'academy config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn check_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(miette::miette!(
            "Unknown configuration key: {} (see `academy config keys`)",
            key
        ))
    }
}

/// The file `set`/`unset` edit: `--config` if given, else the global file
fn target_path(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory")),
    }
}

fn read_mapping(path: &Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }

    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content) {
        Ok(serde_yml::Value::Mapping(map)) => Ok(map),
        Ok(serde_yml::Value::Null) => Ok(serde_yml::Mapping::new()),
        Ok(_) => Err(miette::miette!("{} is not a YAML mapping", path.display())),
        Err(e) => Err(miette::miette!("Failed to parse {}: {}", path.display(), e)),
    }
}

/// Built-in value for keys that have one
fn default_for<'a>(config: &'a Config, key: &str) -> Option<&'a str> {
    match key {
        "country_api_url" => Some(config.country_api_url()),
        "state_api_url" => Some(config.state_api_url()),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>, fallback: Option<&str>) {
    match (value, fallback) {
        (Some(v), _) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        (None, Some(default)) => println!(
            "  {}: {} {}",
            style(key).cyan(),
            default,
            style("(default)").dim()
        ),
        (None, None) => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}
