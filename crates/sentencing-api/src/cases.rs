//! Handlers for the per-case display helpers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cases/{id}` | Parsed identifier and judgment link; 400 if malformed |
//! | `GET`  | `/sentences/{months}` | Display text for a month count |

use axum::{Json, extract::State};
use sentencing_core::{
  case_id::CaseId,
  sentence::{Sentence, format_sentence},
};
use serde::Serialize;

use crate::{AppState, error::ApiError, extract::PathParams};

/// A parsed identifier plus its judgment database link.
#[derive(Debug, Serialize)]
pub struct CaseBody {
  #[serde(flatten)]
  pub case_id:       CaseId,
  pub reference_url: String,
}

/// `GET /cases/{id}`
pub async fn get_one(
  State(state): State<AppState>,
  PathParams(id): PathParams<String>,
) -> Result<Json<CaseBody>, ApiError> {
  let case_id = CaseId::parse(&id, &state.catalog.courts)?;
  Ok(Json(CaseBody {
    reference_url: case_id.reference_url(),
    case_id,
  }))
}

#[derive(Debug, Serialize)]
pub struct SentenceBody {
  pub months:   i32,
  pub sentence: Sentence,
  pub text:     String,
}

/// `GET /sentences/{months}`
pub async fn sentence(PathParams(months): PathParams<i32>) -> Json<SentenceBody> {
  Json(SentenceBody {
    months,
    sentence: Sentence::from_months(months),
    text: format_sentence(months),
  })
}
