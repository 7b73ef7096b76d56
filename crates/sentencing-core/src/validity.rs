//! Validity windows for catalog entries.
//!
//! Statutory provisions come and go with amendments, so every catalog entry
//! may carry a `valid_after` (inclusive) and a `valid_before` (exclusive)
//! calendar date. Dates are read as midnight in the time zone of the instant
//! they are compared against.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// An optional half-open date range `[valid_after, valid_before)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
  /// First day on which the entry applies.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub valid_after:  Option<NaiveDate>,
  /// First day on which the entry no longer applies.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub valid_before: Option<NaiveDate>,
}

impl Validity {
  /// An unbounded window.
  pub const ALWAYS: Self = Self {
    valid_after:  None,
    valid_before: None,
  };

  /// Whether the window contains calendar day `date`.
  pub fn contains_date(&self, date: NaiveDate) -> bool {
    self.valid_before.is_none_or(|before| date < before)
      && self.valid_after.is_none_or(|after| date >= after)
  }

  /// Whether the window contains `now`, reading the bounds as midnight in
  /// `now`'s time zone.
  pub fn contains<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
    self.contains_date(now.date_naive())
  }
}

/// Anything that carries a [`Validity`] window.
pub trait Validated {
  fn validity(&self) -> &Validity;
}

/// Return the entries of `items` that are valid at `now`, in input order.
pub fn filter_valid<'a, T, Tz>(items: &'a [T], now: &DateTime<Tz>) -> Vec<&'a T>
where
  T: Validated,
  Tz: TimeZone,
{
  filter_valid_on(items, now.date_naive())
}

/// Like [`filter_valid`], for a calendar day.
pub fn filter_valid_on<T: Validated>(items: &[T], date: NaiveDate) -> Vec<&T> {
  items
    .iter()
    .filter(|item| item.validity().contains_date(date))
    .collect()
}
