//! Request and response types for the external prediction service, and the
//! [`PredictionService`] trait the presentation layers implement against it.
//!
//! The service itself is opaque: given a crime id and a factor map it returns
//! an estimated sentence in months, an error margin, an optional plot image
//! and a list of similar prior cases.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  case_id::{CaseId, CaseIdError},
  catalog::Court,
  selection::FactorSelection,
  sentence::{DEATH_PENALTY, LIFE_IMPRISONMENT, format_range},
};

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Body of a prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
  pub crime:   u32,
  pub factors: FactorSelection,
}

/// A prior judgment similar to the queried fact pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedCase {
  /// Judgment identifier, normally `COURT,YEAR,CASETYPE,NUMBER`.
  pub id:        String,
  /// Cosine similarity in `0..=1`.
  pub relevance: f64,
  /// Sentence handed down, in months (with the usual sentinels).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sentence:  Option<i32>,
  /// Any further case fields, passed through untouched.
  #[serde(flatten)]
  pub extra:     serde_json::Map<String, serde_json::Value>,
}

impl RelatedCase {
  /// Parse [`Self::id`]; an error means the case has no displayable
  /// identifier.
  pub fn case_id(&self, courts: &[Court]) -> Result<CaseId, CaseIdError> {
    CaseId::parse(&self.id, courts)
  }

  /// Relevance as a whole percentage, the granularity used for ordering.
  pub fn relevance_percent(&self) -> i64 {
    (self.relevance * 100.0).round() as i64
  }
}

/// The prediction service's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  /// Estimated sentence in months.
  pub estimation:    f64,
  /// Mean absolute error of the model, in months.
  pub error_margin:  f64,
  /// URL of a waterfall plot explaining the estimate.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plot:          Option<String>,
  #[serde(default)]
  pub related_cases: Vec<RelatedCase>,
}

impl Prediction {
  /// Lower and upper bound of the estimated range in whole months.
  ///
  /// An estimation of exactly [`LIFE_IMPRISONMENT`] or [`DEATH_PENALTY`] is
  /// a sentinel and is returned unchanged as both bounds. Any other value is
  /// an ordinary estimate whose bounds are clamped at zero.
  pub fn sentence_range(&self) -> (i32, i32) {
    for sentinel in [LIFE_IMPRISONMENT, DEATH_PENALTY] {
      if self.estimation == f64::from(sentinel) {
        return (sentinel, sentinel);
      }
    }
    let min = (self.estimation - self.error_margin).round().max(0.0) as i32;
    let max = (self.estimation + self.error_margin).round().max(0.0) as i32;
    (min, max)
  }

  /// Display text for [`Self::sentence_range`].
  pub fn formatted_range(&self) -> String {
    let (min, max) = self.sentence_range();
    format_range(min, max)
  }

  /// Order related cases by descending whole-percent relevance. Cases with
  /// the same percentage keep the service's order.
  pub fn sort_related_cases(&mut self) {
    self
      .related_cases
      .sort_by_key(|c| std::cmp::Reverse(c.relevance_percent()));
  }
}

/// Render `value` with exactly `digits` decimal places.
pub fn format_decimal(value: f64, digits: usize) -> String {
  format!("{value:.digits$}")
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The external prediction collaborator.
///
/// Implementations issue one request per call; retries, cancellation and
/// user-facing error reporting are the caller's concern.
pub trait PredictionService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn predict<'a>(
    &'a self,
    request: &'a PredictionRequest,
  ) -> impl Future<Output = Result<Prediction, Self::Error>> + Send + 'a;
}
