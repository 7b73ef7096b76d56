//! Async HTTP client for the external prediction service.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use sentencing_core::prediction::{Prediction, PredictionRequest, PredictionService};
use thiserror::Error;

/// Failure talking to the prediction service.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("POST {url} failed: {source}")]
  Transport {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("POST {url} → {status}")]
  Status { url: String, status: StatusCode },

  #[error("deserialising prediction: {0}")]
  Decode(#[source] reqwest::Error),
}

/// Calls `POST {base_url}/predict` once per request, with no retries.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPredictor {
  client:   Client,
  base_url: String,
}

impl HttpPredictor {
  pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(ClientError::Build)?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }
}

impl PredictionService for HttpPredictor {
  type Error = ClientError;

  async fn predict<'a>(
    &'a self,
    request: &'a PredictionRequest,
  ) -> Result<Prediction, ClientError> {
    let url = self.url("/predict");
    tracing::info!(%url, crime = request.crime, "requesting prediction");

    let resp = self
      .client
      .post(&url)
      .json(request)
      .send()
      .await
      .map_err(|source| ClientError::Transport {
        url: url.clone(),
        source,
      })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(ClientError::Status { url, status });
    }
    resp.json().await.map_err(ClientError::Decode)
  }
}
