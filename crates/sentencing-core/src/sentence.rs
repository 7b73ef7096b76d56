//! Month counts to display text.
//!
//! The prediction service expresses sentences as a number of months, with
//! two negative sentinels for the sentences that have no duration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Month value standing for life imprisonment.
pub const LIFE_IMPRISONMENT: i32 = -1;
/// Month value standing for the death penalty.
pub const DEATH_PENALTY: i32 = -2;

/// A sentence decoded from its month representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "months", rename_all = "snake_case")]
pub enum Sentence {
  Imprisonment(u32),
  Life,
  Death,
  /// Zero and any unrecognised non-positive value.
  Acquittal,
}

impl Sentence {
  pub fn from_months(months: i32) -> Self {
    match months {
      m if m > 0 => Self::Imprisonment(m.unsigned_abs()),
      LIFE_IMPRISONMENT => Self::Life,
      DEATH_PENALTY => Self::Death,
      _ => Self::Acquittal,
    }
  }
}

impl From<i32> for Sentence {
  fn from(months: i32) -> Self { Self::from_months(months) }
}

impl fmt::Display for Sentence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::Imprisonment(months) => {
        let (years, rem) = (months / 12, months % 12);
        match (years, rem) {
          (0, _) => write!(f, "{months} 個月"),
          (_, 0) => write!(f, "{years} 年"),
          _ => write!(f, "{years} 年 {rem} 個月"),
        }
      }
      Self::Life => f.write_str("無期徒刑"),
      Self::Death => f.write_str("死刑"),
      Self::Acquittal => f.write_str("無罪"),
    }
  }
}

/// Display text for a month count. Total over all integers.
pub fn format_sentence(months: i32) -> String {
  Sentence::from_months(months).to_string()
}

/// Display text for an estimated range: `"{min} ~ {max}"` when the bounds
/// differ, otherwise just `min`.
pub fn format_range(min: i32, max: i32) -> String {
  if min < max {
    format!("{} ~ {}", format_sentence(min), format_sentence(max))
  } else {
    format_sentence(min)
  }
}
