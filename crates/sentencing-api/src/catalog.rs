//! Handlers for the catalog views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/crimes` | Valid crimes; optional `?as_of=YYYY-MM-DD` |
//! | `GET`  | `/crimes/categories` | Valid crimes grouped by category and kind |
//! | `GET`  | `/kinds/{kind}` | First valid crime of a kind, with its grouping; 404 if none |
//! | `GET`  | `/factors` | Valid factors |
//! | `GET`  | `/factor-groups` | Factor groups with their valid members |
//! | `GET`  | `/courts` | Court table |

use axum::{
  Json,
  extract::State,
  response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use sentencing_core::{
  catalog::CrimeSpec,
  taxonomy::{Kind, Taxonomy, first_crime_of_kind, group_crimes},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  extract::{PathParams, QueryParams},
};

#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
  /// Evaluate validity windows on this day instead of today.
  pub as_of: Option<NaiveDate>,
}

impl AsOfParams {
  pub(crate) fn date(&self, state: &AppState) -> NaiveDate {
    self.as_of.unwrap_or_else(|| state.today())
  }
}

/// `GET /crimes[?as_of=...]`
pub async fn crimes(
  State(state): State<AppState>,
  QueryParams(params): QueryParams<AsOfParams>,
) -> Response {
  Json(state.catalog.crimes_on(params.date(&state))).into_response()
}

/// `GET /crimes/categories[?as_of=...]`
pub async fn categories(
  State(state): State<AppState>,
  QueryParams(params): QueryParams<AsOfParams>,
) -> Json<Taxonomy> {
  let date = params.date(&state);
  let taxonomy = state.catalog.categories_on(date);
  tracing::debug!(%date, categories = taxonomy.len(), "grouped crimes");
  Json(taxonomy)
}

/// The crime a kind selection resolves to, with the kind's grouping.
#[derive(Debug, Serialize)]
pub struct KindBody<'a> {
  pub category: &'a str,
  pub kind:     &'a Kind,
  pub crime:    &'a CrimeSpec,
}

/// `GET /kinds/{kind}[?as_of=...]`
pub async fn kind(
  State(state): State<AppState>,
  PathParams(kind): PathParams<String>,
  QueryParams(params): QueryParams<AsOfParams>,
) -> Result<Response, ApiError> {
  let date = params.date(&state);
  let crimes = state.catalog.crimes_on(date);
  let not_found = || ApiError::NotFound(format!("no crime of kind {kind:?} on {date}"));

  let crime = first_crime_of_kind(crimes.iter().copied(), &kind).ok_or_else(not_found)?;
  let taxonomy = group_crimes(crimes.iter().copied());
  let (category, kind) = taxonomy.locate(crime).ok_or_else(not_found)?;
  Ok(
    Json(KindBody {
      category: &category.title,
      kind,
      crime,
    })
    .into_response(),
  )
}

/// `GET /factors[?as_of=...]`
pub async fn factors(
  State(state): State<AppState>,
  QueryParams(params): QueryParams<AsOfParams>,
) -> Response {
  Json(state.catalog.factors_on(params.date(&state))).into_response()
}

/// `GET /factor-groups[?as_of=...]`
pub async fn factor_groups(
  State(state): State<AppState>,
  QueryParams(params): QueryParams<AsOfParams>,
) -> Response {
  Json(state.catalog.factor_groups_on(params.date(&state))).into_response()
}

/// `GET /courts`
pub async fn courts(State(state): State<AppState>) -> Response {
  Json(&state.catalog.courts).into_response()
}
