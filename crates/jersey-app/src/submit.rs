// Form-collection client: posts a selection as form-encoded fields.
//
// The endpoint is treated as opaque. Any 2xx status is a success, every
// other status, transport error or timeout is a failure. The response body
// is never inspected.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use jersey_core::config::{FieldNames, SubmissionConfig};
use jersey_core::selection::SubmissionPayload;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form endpoint is not configured")]
    NotConfigured,

    #[error("request timed out")]
    Timeout,

    #[error("form endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SubmitError::Timeout
        } else {
            SubmitError::Network(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

/// Something that can deliver a selection payload.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;
}

// ---------------------------------------------------------------------------
// FormClient
// ---------------------------------------------------------------------------

/// HTTP client for one form endpoint.
pub struct FormClient {
    http: reqwest::Client,
    endpoint: String,
    fields: FieldNames,
}

impl FormClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        fields: FieldNames,
        timeout: Duration,
    ) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(FormClient {
            http,
            endpoint: endpoint.into(),
            fields,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Map the payload onto the configured field names, in a fixed order.
    pub fn encode(&self, payload: &SubmissionPayload) -> Vec<(String, String)> {
        vec![
            (self.fields.jersey_name.clone(), payload.jersey_name.clone()),
            (self.fields.player_name.clone(), payload.player_name.clone()),
            (self.fields.opinion.clone(), payload.opinion.clone()),
        ]
    }
}

#[async_trait]
impl Submitter for FormClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        let form = self.encode(payload);
        debug!(endpoint = %self.endpoint, jersey = %payload.jersey_name, "posting selection");

        let response = self.http.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        if status.is_success() {
            info!("Selection for {} recorded ({})", payload.jersey_name, status);
            Ok(())
        } else {
            warn!("Form endpoint rejected selection: {}", status);
            Err(SubmitError::Status(status))
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionClient wrapper
// ---------------------------------------------------------------------------

/// Either a configured form client or disabled (no endpoint configured).
pub enum SubmissionClient {
    Active(FormClient),
    Disabled,
}

impl SubmissionClient {
    /// Returns `Active` when an endpoint is configured, otherwise `Disabled`.
    pub fn from_config(config: &SubmissionConfig) -> Result<Self, SubmitError> {
        match &config.endpoint {
            Some(endpoint) => Ok(SubmissionClient::Active(FormClient::new(
                endpoint.clone(),
                config.fields.clone(),
                config.timeout(),
            )?)),
            None => Ok(SubmissionClient::Disabled),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SubmissionClient::Active(_))
    }
}

#[async_trait]
impl Submitter for SubmissionClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        match self {
            SubmissionClient::Active(client) => client.submit(payload).await,
            SubmissionClient::Disabled => Err(SubmitError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
