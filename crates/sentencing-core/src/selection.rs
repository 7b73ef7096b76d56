//! The factor map sent alongside a crime to the prediction service.
//!
//! Two catalog-driven rules keep a selection consistent:
//!
//! - setting a factor clears every factor listed in its `exclusive_with`;
//! - choosing a crime sets each factor whose `implied_by_stage` matches the
//!   crime's stage, and clears it otherwise.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalog::{Catalog, CrimeSpec},
  validity::Validated,
};

/// Factor name → 0/1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorSelection(BTreeMap<String, u8>);

impl FactorSelection {
  pub fn new() -> Self { Self::default() }

  /// Whether `name` is currently set.
  pub fn is_set(&self, name: &str) -> bool {
    self.0.get(name).is_some_and(|v| *v != 0)
  }

  /// Set or clear `name`, applying the catalog's exclusivity rules when
  /// setting. Unknown names are recorded as given; use [`Self::for_crime`]
  /// for unchecked input.
  pub fn set(&mut self, catalog: &Catalog, name: &str, on: bool) {
    self.0.insert(name.to_string(), u8::from(on));
    if !on {
      return;
    }
    if let Some(factor) = catalog.factor(name) {
      for other in &factor.exclusive_with {
        self.0.insert(other.clone(), 0);
      }
    }
  }

  /// Apply the stage coupling for `crime`.
  pub fn apply_crime(&mut self, catalog: &Catalog, crime: &CrimeSpec) {
    for factor in &catalog.factors {
      if let Some(stage) = factor.implied_by_stage {
        self.set(catalog, &factor.name, crime.stage == Some(stage));
      }
    }
  }

  /// Build a normalized selection for crime `value` from raw user input,
  /// checked against the catalog as of `date`.
  ///
  /// The crime must exist, be selectable and be in force on `date`. Every
  /// named factor must exist, and a factor being set must be in force on
  /// `date`. Inputs are applied in order, so a later exclusive factor wins.
  pub fn for_crime<'a, I>(
    catalog: &Catalog,
    value: u32,
    raw: I,
    date: NaiveDate,
  ) -> Result<Self>
  where
    I: IntoIterator<Item = (&'a str, bool)>,
  {
    let crime = catalog.crime(value).ok_or(Error::UnknownCrime(value))?;
    if crime.disabled {
      return Err(Error::CrimeDisabled(value));
    }
    if !crime.validity().contains_date(date) {
      return Err(Error::CrimeNotInForce { value, date });
    }

    let mut selection = Self::new();
    for (name, on) in raw {
      let factor = catalog
        .factor(name)
        .ok_or_else(|| Error::UnknownFactor(name.to_string()))?;
      if on && !factor.validity().contains_date(date) {
        return Err(Error::FactorNotInForce {
          name: name.to_string(),
          date,
        });
      }
      selection.set(catalog, name, on);
    }
    selection.apply_crime(catalog, crime);
    Ok(selection)
  }

  /// Names of the factors currently set, in name order.
  pub fn active(&self) -> impl Iterator<Item = &str> {
    self
      .0
      .iter()
      .filter(|(_, v)| **v != 0)
      .map(|(k, _)| k.as_str())
  }

  pub fn as_map(&self) -> &BTreeMap<String, u8> { &self.0 }
}
