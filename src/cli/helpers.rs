//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use reqwest::Client;
use std::time::Duration;

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::FieldErrors;

/// Load the layered configuration, honouring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::load(global.config.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// HTTP client shared by one command invocation
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("academy/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .into_diagnostic()
}

/// Print each `path: message` pair to stderr
pub fn print_field_errors(errors: &FieldErrors) {
    for (path, message) in errors.iter() {
        if path.is_empty() {
            eprintln!("  {} {}", style("✗").red(), message);
        } else {
            eprintln!("  {} {}: {}", style("✗").red(), style(path).cyan(), message);
        }
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
