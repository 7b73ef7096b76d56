//! Judgment identifiers of the form `COURT,YEAR,CASETYPE,NUMBER`.
//!
//! Related cases returned by the prediction service carry identifiers such
//! as `TPH,109,上訴,45`. Parsing yields the components, the display text used
//! in the case list and a link into the public judgment database. A string
//! that does not follow the grammar is reported as a [`CaseIdError`]; callers
//! treat that as "no displayable case" rather than a failure.
//!
//! Grammar (exactly four comma-separated fields):
//!
//! ```text
//! court     = 1*( "A".."Z" )
//! year      = 1*DIGIT
//! case-type = 1*( any character except "," )
//! number    = 1*DIGIT
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{Court, court_name};

/// Court code whose name is left out of the display text.
pub const SUPREME_COURT: &str = "TPS";

const JUDGMENT_QUERY_URL: &str = "https://law.judicial.gov.tw/FJUD/qryresult.aspx";

/// Why a string is not a case identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseIdError {
  #[error("expected 4 comma-separated fields, found {0}")]
  FieldCount(usize),

  #[error("court code {0:?} is not a run of uppercase letters")]
  Court(String),

  #[error("year {0:?} is not numeric")]
  Year(String),

  #[error("case type is empty")]
  CaseType,

  #[error("case number {0:?} is not numeric")]
  Number(String),
}

/// A parsed judgment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseId {
  /// The identifier exactly as received.
  pub database_id:    String,
  pub court:          String,
  pub year:           String,
  pub case_type:      String,
  pub number:         String,
  /// e.g. `臺灣高等法院 109 年度上訴字第 45 號刑事判決`.
  pub formatted_text: String,
}

impl CaseId {
  /// Parse `id`, resolving the court name against `courts`. Unknown court
  /// codes are shown verbatim.
  pub fn parse(id: &str, courts: &[Court]) -> Result<Self, CaseIdError> {
    let fields: Vec<&str> = id.split(',').collect();
    let [court, year, case_type, number] = fields[..] else {
      return Err(CaseIdError::FieldCount(fields.len()));
    };

    if court.is_empty() || !court.bytes().all(|b| b.is_ascii_uppercase()) {
      return Err(CaseIdError::Court(court.to_string()));
    }
    if !is_numeric(year) {
      return Err(CaseIdError::Year(year.to_string()));
    }
    if case_type.is_empty() {
      return Err(CaseIdError::CaseType);
    }
    if !is_numeric(number) {
      return Err(CaseIdError::Number(number.to_string()));
    }

    let name = if court == SUPREME_COURT {
      ""
    } else {
      court_name(courts, court).unwrap_or(court)
    };

    let formatted_text =
      format!("{name} {year} 年度{case_type}字第 {number} 號刑事判決")
        .trim_start()
        .to_string();

    Ok(Self {
      database_id: id.to_string(),
      court: court.to_string(),
      year: year.to_string(),
      case_type: case_type.to_string(),
      number: number.to_string(),
      formatted_text,
    })
  }

  /// Query URL for this judgment in the public judgment database. Fields are
  /// substituted verbatim.
  pub fn reference_url(&self) -> String {
    format!(
      "{JUDGMENT_QUERY_URL}?jud_court={}&jud_sys=M&jud_year={}&jud_case={}&jud_no={}&judtype=JUDBOOK",
      self.court, self.year, self.case_type, self.number
    )
  }
}

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.formatted_text)
  }
}

fn is_numeric(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn courts() -> Vec<Court> {
    vec![
      Court {
        code: "TPS".to_string(),
        name: "最高法院".to_string(),
      },
      Court {
        code: "TPH".to_string(),
        name: "臺灣高等法院".to_string(),
      },
    ]
  }

  #[test]
  fn supreme_court_name_is_omitted() {
    let id = CaseId::parse("TPS,109,金上訴,123", &courts()).unwrap();
    assert_eq!(id.court, "TPS");
    assert_eq!(id.case_type, "金上訴");
    assert_eq!(id.formatted_text, "109 年度金上訴字第 123 號刑事判決");
  }

  #[test]
  fn known_court_is_named() {
    let id = CaseId::parse("TPH,109,上訴,45", &courts()).unwrap();
    assert_eq!(id.database_id, "TPH,109,上訴,45");
    assert_eq!(id.year, "109");
    assert_eq!(id.number, "45");
    assert_eq!(id.to_string(), "臺灣高等法院 109 年度上訴字第 45 號刑事判決");
  }

  #[test]
  fn unknown_court_falls_back_to_code() {
    let id = CaseId::parse("KSD,108,訴,7", &courts()).unwrap();
    assert_eq!(id.formatted_text, "KSD 108 年度訴字第 7 號刑事判決");
  }

  #[test]
  fn malformed_ids_are_rejected() {
    let courts = courts();
    assert_eq!(
      CaseId::parse("not-a-valid-id", &courts),
      Err(CaseIdError::FieldCount(1))
    );
    assert_eq!(
      CaseId::parse("TPH,109,上訴,45,1", &courts),
      Err(CaseIdError::FieldCount(5))
    );
    assert_eq!(
      CaseId::parse("tph,109,上訴,45", &courts),
      Err(CaseIdError::Court("tph".to_string()))
    );
    assert_eq!(
      CaseId::parse(",109,上訴,45", &courts),
      Err(CaseIdError::Court(String::new()))
    );
    assert_eq!(
      CaseId::parse("TPH,一零九,上訴,45", &courts),
      Err(CaseIdError::Year("一零九".to_string()))
    );
    assert_eq!(CaseId::parse("TPH,109,,45", &courts), Err(CaseIdError::CaseType));
    assert_eq!(
      CaseId::parse("TPH,109,上訴,", &courts),
      Err(CaseIdError::Number(String::new()))
    );
    assert!(CaseId::parse("", &courts).is_err());
  }

  #[test]
  fn reference_url_substitutes_fields() {
    let id = CaseId::parse("TPH,109,上訴,45", &courts()).unwrap();
    assert_eq!(
      id.reference_url(),
      "https://law.judicial.gov.tw/FJUD/qryresult.aspx?jud_court=TPH&jud_sys=M&jud_year=109&jud_case=上訴&jud_no=45&judtype=JUDBOOK"
    );
  }
}
