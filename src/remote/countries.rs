//! Country directory - fetched once per process and cached

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

use crate::remote::{expect_success, Place, RemoteError};

const SERVICE: &str = "country service";

/// Country as returned by the country data service
#[derive(Debug, Deserialize)]
struct CountryRecord {
    name: CountryName,
    cca2: String,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
}

/// Country list with a session-wide cache
///
/// The first successful fetch is kept for the lifetime of the directory;
/// failures are not cached, so a later call tries again.
#[derive(Debug)]
pub struct CountryDirectory {
    client: Client,
    url: Url,
    cache: OnceCell<Vec<Place>>,
}

impl CountryDirectory {
    pub fn new(client: Client, url: &str) -> Result<Self, RemoteError> {
        let url = Url::parse(url).map_err(|e| RemoteError::Url {
            service: SERVICE,
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            url,
            cache: OnceCell::new(),
        })
    }

    /// All countries, sorted by name
    pub async fn countries(&self) -> Result<&[Place], RemoteError> {
        self.cache
            .get_or_try_init(|| self.fetch())
            .await
            .map(Vec::as_slice)
    }

    /// Find a country by code or name
    pub async fn find(&self, query: &str) -> Result<Option<Place>, RemoteError> {
        Ok(self
            .countries()
            .await?
            .iter()
            .find(|place| place.matches(query))
            .cloned())
    }

    async fn fetch(&self) -> Result<Vec<Place>, RemoteError> {
        debug!(url = %self.url, "fetching countries");

        let result = async {
            let response = self.client.get(self.url.clone()).send().await?;
            let records: Vec<CountryRecord> = expect_success(SERVICE, response).await?.json().await?;
            Ok::<_, RemoteError>(records)
        }
        .await;

        let records = result.inspect_err(|e| warn!(error = %e, "country list unavailable"))?;

        let mut countries: Vec<Place> = records
            .into_iter()
            .map(|record| Place::new(record.name.common, record.cca2))
            .collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(count = countries.len(), "countries loaded");
        Ok(countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body() -> serde_json::Value {
        serde_json::json!([
            { "name": { "common": "Nigeria", "official": "Federal Republic of Nigeria" }, "cca2": "NG" },
            { "name": { "common": "Ghana", "official": "Republic of Ghana" }, "cca2": "GH" },
            { "name": { "common": "Kenya", "official": "Republic of Kenya" }, "cca2": "KE" }
        ])
    }

    #[tokio::test]
    async fn test_countries_sorted_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3.1/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v3.1/all?fields=name,cca2", server.uri());
        let directory = CountryDirectory::new(Client::new(), &url).unwrap();

        let names: Vec<&str> = directory
            .countries()
            .await
            .unwrap()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ghana", "Kenya", "Nigeria"]);

        // Second call is served from the cache (mock expects exactly one hit)
        let found = directory.find("ng").await.unwrap();
        assert_eq!(found, Some(Place::new("Nigeria", "NG")));
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .mount(&server)
            .await;

        let directory = CountryDirectory::new(Client::new(), &server.uri()).unwrap();
        let err = directory.countries().await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 503, .. }));

        assert_eq!(directory.countries().await.unwrap().len(), 3);
    }
}
