//! Handler for `POST /selection[?as_of=...]`.
//!
//! Normalizes raw form input into the factor map the prediction service
//! expects, applying the catalog's validity, exclusivity and stage rules.
//! Body:
//!
//! ```json
//! { "crime": 2, "factors": { "mit_c18_2": 1, "mit_c62": 0 } }
//! ```

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use sentencing_core::{prediction::PredictionRequest, selection::FactorSelection};
use serde::Deserialize;

use crate::{
  AppState,
  catalog::AsOfParams,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

#[derive(Debug, Deserialize)]
pub struct SelectionBody {
  pub crime:   u32,
  /// Factor name → 0/1, applied in name order.
  #[serde(default)]
  pub factors: BTreeMap<String, u8>,
}

/// `POST /selection`: returns the normalized [`PredictionRequest`].
pub async fn normalize(
  State(state): State<AppState>,
  QueryParams(params): QueryParams<AsOfParams>,
  JsonBody(body): JsonBody<SelectionBody>,
) -> Result<Json<PredictionRequest>, ApiError> {
  let factors = FactorSelection::for_crime(
    &state.catalog,
    body.crime,
    body.factors.iter().map(|(name, v)| (name.as_str(), *v != 0)),
    params.date(&state),
  )?;
  Ok(Json(PredictionRequest {
    crime: body.crime,
    factors,
  }))
}
