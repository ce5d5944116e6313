//! State directory - states of one country, fetched on demand

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::remote::{expect_success, Place, RemoteError};

const SERVICE: &str = "state service";

/// Header carrying the state service API key
pub const API_KEY_HEADER: &str = "X-CSCAPI-KEY";

#[derive(Debug, Deserialize)]
struct StateRecord {
    name: String,
    iso2: String,
}

/// Client for the state list service
///
/// Each call is a fresh request; caching and staleness are the caller's
/// concern (see [`StatePicker`](crate::remote::StatePicker)).
#[derive(Debug, Clone)]
pub struct StateDirectory {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl StateDirectory {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let parsed = Url::parse(base_url).map_err(|e| RemoteError::Url {
            service: SERVICE,
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(RemoteError::Url {
                service: SERVICE,
                url: base_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        Ok(Self {
            client,
            base_url: parsed,
            api_key: api_key.into(),
        })
    }

    /// URL listing the states of `country_code`
    pub fn states_url(&self, country_code: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["countries", country_code, "states"]);
        }
        url
    }

    /// States of a country, in the order the service returns them
    pub async fn states(&self, country_code: &str) -> Result<Vec<Place>, RemoteError> {
        let url = self.states_url(country_code);
        debug!(%url, country = country_code, "fetching states");

        let result = async {
            let response = self
                .client
                .get(url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;
            let records: Vec<StateRecord> = expect_success(SERVICE, response).await?.json().await?;
            Ok::<_, RemoteError>(records)
        }
        .await;

        let records = result
            .inspect_err(|e| warn!(country = country_code, error = %e, "state list unavailable"))?;

        Ok(records
            .into_iter()
            .map(|record| Place::new(record.name, record.iso2))
            .collect())
    }
}
