//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sentencing_core::{Error as CoreError, case_id::CaseIdError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not a case identifier: {0}")]
  CaseId(#[from] CaseIdError),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) | ApiError::Core(CoreError::UnknownCrime(_)) => {
        StatusCode::NOT_FOUND
      }
      ApiError::BadRequest(_)
      | ApiError::CaseId(_)
      | ApiError::Core(
        CoreError::CrimeDisabled(_)
        | CoreError::CrimeNotInForce { .. }
        | CoreError::UnknownFactor(_)
        | CoreError::FactorNotInForce { .. },
      ) => StatusCode::BAD_REQUEST,
      ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
