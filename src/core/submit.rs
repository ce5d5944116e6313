//! Submission targets for validated form values

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::forms::{Course, Form, Registration};

/// Why a submission did not go through
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status code {status}")]
    Status { status: u16, body: String },

    #[error("invalid endpoint URL '{url}': {reason}")]
    Endpoint { url: String, reason: String },

    #[error("could not encode submission: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a valid form value goes once the pipeline accepts it
#[async_trait]
pub trait Submitter<F: Form + Sync>: Send + Sync {
    async fn submit(&self, value: &F) -> Result<(), SubmitError>;
}

/// Course creation endpoint: `POST {base_url}/course` with a JSON body
#[derive(Debug, Clone)]
pub struct CourseEndpoint {
    client: Client,
    url: Url,
}

impl CourseEndpoint {
    pub fn new(client: Client, base_url: &str) -> Result<Self, SubmitError> {
        let joined = format!("{}/course", base_url.trim_end_matches('/'));
        let url = Url::parse(&joined).map_err(|e| SubmitError::Endpoint {
            url: joined.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Submitter<Course> for CourseEndpoint {
    async fn submit(&self, value: &Course) -> Result<(), SubmitError> {
        debug!(url = %self.url, course = %value.name, "posting course");

        let response = self.client.post(self.url.clone()).json(value).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(url = %self.url, status = status.as_u16(), "course accepted");
        Ok(())
    }
}

/// Registrations have no backend yet; accepted values are logged
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationLog;

#[async_trait]
impl Submitter<Registration> for RegistrationLog {
    async fn submit(&self, value: &Registration) -> Result<(), SubmitError> {
        let body = serde_json::to_string(value)?;
        info!(
            target: "academy::registration",
            email = %value.email,
            course = %value.course,
            registration = %body,
            "registration received"
        );
        Ok(())
    }
}
