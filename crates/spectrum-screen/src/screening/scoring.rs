//! Transport to the remote scoring collaborator.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::screening::intake::SubmissionPayload;
use crate::screening::results::{ContractViolation, ScoringVerdict};

/// Notice shown to the user for every failed exchange, whatever the cause.
pub const SUBMISSION_FAILED_NOTICE: &str = "Failed to get prediction. Please try again.";

/// The request never produced a usable response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("scoring request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("scoring service responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

impl SubmissionError {
    /// Log discriminator separating connectivity problems from collaborator breaches.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Transport(_) => "transport",
            SubmissionError::Contract(_) => "contract_violation",
        }
    }

    pub fn user_notice(&self) -> &'static str {
        SUBMISSION_FAILED_NOTICE
    }
}

/// One request/response exchange with a scoring collaborator.
#[async_trait]
pub trait ScoringClient: Send + Sync {
    async fn score(&self, payload: &SubmissionPayload) -> Result<ScoringVerdict, SubmissionError>;
}

#[derive(Debug, thiserror::Error)]
#[error("failed to build scoring HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

/// `POST {base_url}/predict` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    http: Client,
    predict_url: String,
}

impl HttpScoringClient {
    pub fn new(config: &ScoringConfig) -> Result<Self, ClientBuildError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            predict_url: config.predict_url(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn score(&self, payload: &SubmissionPayload) -> Result<ScoringVerdict, SubmissionError> {
        debug!(url = %self.predict_url, "posting intake payload");
        let response = self
            .http
            .post(&self.predict_url)
            .json(payload)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body }.into());
        }

        let body = response.bytes().await.map_err(TransportError::from)?;
        Ok(ScoringVerdict::from_json(&body)?)
    }
}
