//! Remote option lists - countries and the states of a chosen country

pub mod countries;
pub mod picker;
pub mod states;

pub use countries::CountryDirectory;
pub use picker::{ListState, LocationError, SelectionError, StatePicker, StateRequest};
pub use states::StateDirectory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ConfigError;

/// A selectable place (country or state)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub code: String,
}

impl Place {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Match by code or name, ignoring case
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.code.eq_ignore_ascii_case(query) || self.name.eq_ignore_ascii_case(query)
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{service} responded with status code {status}")]
    Status { service: &'static str, status: u16 },

    #[error("invalid {service} URL '{url}': {reason}")]
    Url {
        service: &'static str,
        url: String,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Check the response status, naming the service on failure
async fn expect_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Status {
            service,
            status: status.as_u16(),
        })
    }
}
