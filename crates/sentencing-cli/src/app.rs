//! Subcommand logic, independent of argument parsing and the transport.

use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate, Utc};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use sentencing_core::{
  case_id::CaseId,
  catalog::{Catalog, CrimeSpec},
  prediction::{Prediction, PredictionRequest, PredictionService},
  selection::FactorSelection,
  sentence::{Sentence, format_sentence},
};

use crate::render::{CrimeTree, FactorGroups, PredictionReport};

pub struct App {
  pub catalog:   Catalog,
  pub time_zone: FixedOffset,
}

impl App {
  pub fn new(catalog: Catalog, time_zone: FixedOffset) -> Self {
    Self { catalog, time_zone }
  }

  /// Today's date in the configured time zone.
  pub fn today(&self) -> NaiveDate {
    Utc::now().with_timezone(&self.time_zone).date_naive()
  }

  fn date(&self, as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| self.today())
  }

  // ── Catalog views ───────────────────────────────────────────────────────────

  /// Crimes valid on `as_of` (default today) whose category, kind or variant
  /// fuzzy-match `filter`.
  pub fn visible_crimes(&self, as_of: Option<NaiveDate>, filter: Option<&str>) -> Vec<&CrimeSpec> {
    let crimes = self.catalog.crimes_on(self.date(as_of));
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
      return crimes;
    };

    let matcher = SkimMatcherV2::default();
    crimes
      .into_iter()
      .filter(|c| {
        let haystack = format!(
          "{} {} {}",
          c.category,
          c.kind,
          c.variant.as_deref().unwrap_or_default()
        );
        matcher.fuzzy_match(&haystack, filter).is_some()
      })
      .collect()
  }

  /// `sentencing crimes`
  pub fn crimes(&self, as_of: Option<NaiveDate>, filter: Option<&str>) -> String {
    CrimeTree(&self.visible_crimes(as_of, filter)).to_string()
  }

  /// `sentencing factors`
  pub fn factors(&self, as_of: Option<NaiveDate>) -> String {
    FactorGroups(&self.catalog.factor_groups_on(self.date(as_of))).to_string()
  }

  /// `sentencing case <ID>`
  pub fn case(&self, id: &str) -> Result<String> {
    let case_id = CaseId::parse(id, &self.catalog.courts)
      .with_context(|| format!("{id:?} is not a case identifier"))?;
    Ok(format!("{case_id}\n{}\n", case_id.reference_url()))
  }

  /// `sentencing sentence <MONTHS>`
  pub fn sentence(&self, months: i32) -> String {
    let kind = match Sentence::from_months(months) {
      Sentence::Imprisonment(_) => "imprisonment",
      Sentence::Life => "life",
      Sentence::Death => "death",
      Sentence::Acquittal => "acquittal",
    };
    format!("{} ({kind})\n", format_sentence(months))
  }

  // ── Prediction ──────────────────────────────────────────────────────────────

  /// Build the request for crime `value` with `factors` set, checking both
  /// against the catalog as of today.
  pub fn prediction_request(&self, value: u32, factors: &[String]) -> Result<PredictionRequest> {
    let factors = FactorSelection::for_crime(
      &self.catalog,
      value,
      factors.iter().map(|name| (name.as_str(), true)),
      self.today(),
    )?;
    Ok(PredictionRequest {
      crime: value,
      factors,
    })
  }

  /// `sentencing predict`: one request to `service`, no retries.
  pub async fn predict<P: PredictionService>(
    &self,
    service: &P,
    value: u32,
    factors: &[String],
  ) -> Result<String> {
    let request = self.prediction_request(value, factors)?;
    tracing::debug!(?request, "normalized selection");

    let mut prediction: Prediction = service
      .predict(&request)
      .await
      .context("prediction request failed; check the server or network and retry")?;
    prediction.sort_related_cases();
    tracing::info!(
      estimation = prediction.estimation,
      related = prediction.related_cases.len(),
      "prediction received"
    );

    Ok(
      PredictionReport {
        catalog:    &self.catalog,
        request:    &request,
        prediction: &prediction,
      }
      .to_string(),
    )
  }
}

#[cfg(test)]
mod tests {
  use std::{io, sync::Mutex};

  use sentencing_core::prediction::RelatedCase;

  use super::*;

  fn app() -> App {
    App::new(Catalog::builtin().unwrap(), FixedOffset::east_opt(8 * 3600).unwrap())
  }

  fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> { NaiveDate::from_ymd_opt(y, m, d) }

  fn related(id: &str, relevance: f64, sentence: Option<i32>) -> RelatedCase {
    RelatedCase {
      id: id.to_string(),
      relevance,
      sentence,
      extra: serde_json::Map::new(),
    }
  }

  /// Answers every request with a fixed prediction and records the request.
  struct FixedService {
    answer: Prediction,
    seen:   Mutex<Vec<PredictionRequest>>,
  }

  impl PredictionService for FixedService {
    type Error = io::Error;

    async fn predict<'a>(
      &'a self,
      request: &'a PredictionRequest,
    ) -> Result<Prediction, io::Error> {
      self.seen.lock().unwrap().push(request.clone());
      Ok(self.answer.clone())
    }
  }

  struct DownService;

  impl PredictionService for DownService {
    type Error = io::Error;

    async fn predict<'a>(
      &'a self,
      _request: &'a PredictionRequest,
    ) -> Result<Prediction, io::Error> {
      Err(io::Error::other("connection refused"))
    }
  }

  // ── Catalog views ───────────────────────────────────────────────────────────

  fn values(crimes: &[&CrimeSpec]) -> Vec<u32> { crimes.iter().map(|c| c.value).collect() }

  #[test]
  fn crimes_follow_the_amendment() {
    let app = app();
    let before = values(&app.visible_crimes(date(2019, 5, 30), None));
    assert!(before.contains(&3) && !before.contains(&5));

    let after = values(&app.visible_crimes(date(2019, 5, 31), None));
    assert!(!after.contains(&3) && after.contains(&5));
  }

  #[test]
  fn crimes_fuzzy_filter() {
    let app = app();
    let hits = values(&app.visible_crimes(date(2021, 1, 1), Some("傷害")));
    assert_eq!(hits, vec![20, 21, 22]);

    let hits = values(&app.visible_crimes(date(2021, 1, 1), Some("家庭暴力")));
    assert_eq!(hits, vec![12]);

    let all = app.visible_crimes(date(2021, 1, 1), Some(""));
    assert_eq!(all.len(), app.catalog.crimes_on(date(2021, 1, 1).unwrap()).len());
  }

  #[test]
  fn factors_follow_validity() {
    let app = app();
    assert!(!app.factors(date(2000, 1, 1)).contains("agg_dv"));
    assert!(app.factors(date(2021, 1, 1)).contains("agg_dv"));
  }

  #[test]
  fn case_and_sentence_text() {
    let app = app();
    assert_eq!(
      app.case("TPS,108,台上,1234").unwrap(),
      "108 年度台上字第 1234 號刑事判決\nhttps://law.judicial.gov.tw/FJUD/qryresult.aspx?jud_court=TPS&jud_sys=M&jud_year=108&jud_case=台上&jud_no=1234&judtype=JUDBOOK\n"
    );
    assert!(app.case("TPH,109,上訴").is_err());

    assert_eq!(app.sentence(33), "2 年 9 個月 (imprisonment)\n");
    assert_eq!(app.sentence(-1), "無期徒刑 (life)\n");
    assert_eq!(app.sentence(0), "無罪 (acquittal)\n");
  }

  // ── Prediction ──────────────────────────────────────────────────────────────

  #[test]
  fn request_rejects_bad_input() {
    let app = app();
    let err = app.prediction_request(999, &[]).unwrap_err();
    assert!(err.to_string().contains("unknown crime: 999"));

    let err = app.prediction_request(1, &[]).unwrap_err();
    assert!(err.to_string().contains("not selectable"));

    // Repealed by the 2019 amendment.
    let err = app.prediction_request(3, &[]).unwrap_err();
    assert!(err.to_string().contains("not in force"));

    let err = app.prediction_request(0, &["mit_nope".to_string()]).unwrap_err();
    assert!(err.to_string().contains("unknown factor"));
  }

  #[tokio::test]
  async fn predict_sends_normalized_request_and_sorts_cases() {
    let app = app();
    let service = FixedService {
      answer: Prediction {
        estimation:    120.0,
        error_margin:  18.4,
        plot:          Some("https://example.com/plot.png".to_string()),
        related_cases: vec![
          related("TPH,109,上訴,45", 0.714, Some(150)),
          related("garbled", 0.93, None),
          related("TPS,108,台上,1234", 0.709, Some(-1)),
        ],
      },
      seen:   Mutex::new(Vec::new()),
    };

    let factors = vec!["mit_c18_2".to_string(), "mit_c18_3".to_string()];
    let out = app.predict(&service, 2, &factors).await.unwrap();

    let seen = service.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].crime, 2);
    let active: Vec<_> = seen[0].factors.active().collect();
    assert_eq!(active, vec!["mit_c18_3", "mit_c25_2"]);

    assert!(out.starts_with("罪名: 殺人 › 普通殺人罪 › 未遂 (2)\n"), "{out}");
    assert!(out.contains("量刑估計區間: 8 年 6 個月 ~ 11 年 6 個月\n"), "{out}");
    assert!(out.contains("f(x) = 120.00 ± 18.40 個月"), "{out}");
    assert!(out.contains("plot: https://example.com/plot.png"));

    // 93% first; 71% twice, in service order.
    let garbled = out.find("garbled").unwrap();
    let high = out.find("臺灣高等法院 109 年度上訴字第 45 號刑事判決  12 年 6 個月").unwrap();
    let supreme = out.find("108 年度台上字第 1234 號刑事判決  無期徒刑").unwrap();
    assert!(garbled < high && high < supreme, "{out}");
    assert!(out.contains("   93%  garbled\n"));
  }

  #[tokio::test]
  async fn predict_surfaces_service_errors() {
    let app = app();
    let err = app.predict(&DownService, 0, &[]).await.unwrap_err();
    assert!(format!("{err:#}").contains("connection refused"));
  }
}
