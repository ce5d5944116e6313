//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    config::ConfigCommands,
    course::CourseCommands,
    lists::{CountriesArgs, StatesArgs},
    register::RegisterCommands,
    schema::SchemaArgs,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "academy")]
#[command(author, version, about = "Academy course and registration forms")]
#[command(long_about = "Create courses and register students from the command line. \
Every record is validated against its schema before anything is sent.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Extra config file, applied over the global one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Course creation
    #[command(subcommand)]
    Course(CourseCommands),

    /// Student registration
    #[command(subcommand)]
    Register(RegisterCommands),

    /// List countries offered by the registration form
    Countries(CountriesArgs),

    /// List the states of a country
    States(StatesArgs),

    /// Validate draft files against a form schema
    Validate(ValidateArgs),

    /// Show a form's schema
    Schema(SchemaArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and messages
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just codes, one per line
    Id,
}
