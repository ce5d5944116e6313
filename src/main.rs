use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use academy::cli::commands::{completions, config, course, lists, register, schema, validate};
use academy::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    match cli.command {
        Commands::Course(cmd) => course::run(cmd, &global, &runtime),
        Commands::Register(cmd) => register::run(cmd, &global, &runtime),
        Commands::Countries(args) => lists::run_countries(args, &global, &runtime),
        Commands::States(args) => lists::run_states(args, &global, &runtime),
        Commands::Validate(args) => validate::run(args),
        Commands::Schema(args) => schema::run(args),
        Commands::Config(cmd) => config::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Log to stderr; `ACADEMY_LOG` wins over `-v`. By default only warnings
/// and received registrations are shown.
fn init_tracing(global: &GlobalOpts) {
    let fallback = if global.verbose {
        "academy=debug"
    } else {
        "warn,academy::registration=info"
    };
    let filter = EnvFilter::try_from_env("ACADEMY_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(global.verbose)
        .try_init();
}
