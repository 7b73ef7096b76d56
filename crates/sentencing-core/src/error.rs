//! Error types for `sentencing-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("duplicate crime value: {0}")]
  DuplicateCrime(u32),

  #[error("duplicate factor name: {0:?}")]
  DuplicateFactor(String),

  #[error("duplicate court code: {0:?}")]
  DuplicateCourt(String),

  #[error("factor group {group:?} names unknown factor {factor:?}")]
  UnknownGroupMember { group: String, factor: String },

  #[error("factor {factor:?} is declared exclusive with unknown factor {other:?}")]
  UnknownExclusiveFactor { factor: String, other: String },

  #[error("unknown crime: {0}")]
  UnknownCrime(u32),

  #[error("crime {0} is not selectable")]
  CrimeDisabled(u32),

  #[error("crime {value} is not in force on {date}")]
  CrimeNotInForce { value: u32, date: NaiveDate },

  #[error("unknown factor: {0:?}")]
  UnknownFactor(String),

  #[error("factor {name:?} is not in force on {date}")]
  FactorNotInForce { name: String, date: NaiveDate },

  #[error("catalog parse error: {0}")]
  CatalogParse(#[from] toml::de::Error),

  #[error("failed to read catalog {path}: {source}")]
  CatalogRead {
    path:   String,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
