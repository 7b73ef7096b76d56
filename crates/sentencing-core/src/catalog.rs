//! The static crime/factor/court catalog.
//!
//! A catalog is loaded once at start-up from a TOML document and never
//! mutated afterwards. Every view handed to the presentation layer (valid
//! crimes, grouped taxonomy, resolved factor groups) is derived from it on
//! demand for a given date.
//!
//! ```toml
//! [[crimes]]
//! value    = 0
//! category = "殺人"
//! kind     = "普通殺人罪"
//! stage    = "accomplished"
//!
//! [[factors]]
//! name  = "mit_c59"
//! group = "statutory"
//! label = "情堪憫恕"
//! vibe  = "positive"
//! ```

use std::{collections::HashSet, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  taxonomy::{Taxonomy, group_crimes},
  validity::{Validated, Validity, filter_valid_on},
};

/// The catalog compiled into the crate.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

// ─── Crimes ──────────────────────────────────────────────────────────────────

/// Degree of completion of an offense. Declaration order is display order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
  Preparatory,
  Attempted,
  Accomplished,
}

impl Stage {
  /// Localized label shown on stage pickers.
  pub fn label(self) -> &'static str {
    match self {
      Self::Preparatory => "預備",
      Self::Attempted => "未遂",
      Self::Accomplished => "既遂",
    }
  }
}

/// One category/kind/stage/variant combination of an offense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeSpec {
  /// Identifier sent to the prediction service.
  pub value:    u32,
  pub category: String,
  pub kind:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stage:    Option<Stage>,
  /// Statutorily distinct sub-provision, e.g. a special aggravating clause.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant:  Option<String>,
  /// Listed for completeness but not selectable.
  #[serde(default)]
  pub disabled: bool,
  #[serde(flatten)]
  pub validity: Validity,
}

impl Validated for CrimeSpec {
  fn validity(&self) -> &Validity { &self.validity }
}

// ─── Factors ─────────────────────────────────────────────────────────────────

/// Whether checking a factor pushes the sentence down or up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
  /// Mitigating.
  Positive,
  /// Aggravating.
  Negative,
  #[default]
  Neutral,
}

/// A mitigating or aggravating sentencing factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSpec {
  /// Key sent to the prediction service, e.g. `mit_c59`.
  pub name:             String,
  /// Name of the [`FactorGroup`] the factor is listed under.
  pub group:            String,
  pub label:            String,
  #[serde(default)]
  pub vibe:             Vibe,
  /// Factors that are cleared when this one is set.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub exclusive_with:   Vec<String>,
  /// Crime stage that forces this factor on (and its absence, off).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub implied_by_stage: Option<Stage>,
  #[serde(flatten)]
  pub validity:         Validity,
}

impl Validated for FactorSpec {
  fn validity(&self) -> &Validity { &self.validity }
}

/// An ordered, titled list of factor names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorGroup {
  pub name:    String,
  pub title:   String,
  pub factors: Vec<String>,
}

/// A [`FactorGroup`] with its members resolved against the valid factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFactorGroup<'a> {
  pub name:    &'a str,
  pub title:   &'a str,
  /// Members valid on the requested day, in group order. Members outside
  /// their validity window are omitted.
  pub factors: Vec<&'a FactorSpec>,
}

// ─── Courts ──────────────────────────────────────────────────────────────────

/// A court code and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
  pub code: String,
  pub name: String,
}

/// Display name for `code` in `courts`, if the code is known.
pub fn court_name<'a>(courts: &'a [Court], code: &str) -> Option<&'a str> {
  courts
    .iter()
    .find(|c| c.code == code)
    .map(|c| c.name.as_str())
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// The full, immutable catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
  #[serde(default)]
  pub crimes:        Vec<CrimeSpec>,
  #[serde(default)]
  pub factors:       Vec<FactorSpec>,
  #[serde(default)]
  pub factor_groups: Vec<FactorGroup>,
  #[serde(default)]
  pub courts:        Vec<Court>,
}

impl Catalog {
  /// The catalog shipped with the crate.
  pub fn builtin() -> Result<Self> { Self::from_toml_str(BUILTIN_CATALOG) }

  /// Parse and validate a catalog document.
  pub fn from_toml_str(input: &str) -> Result<Self> {
    let catalog: Self = toml::from_str(input)?;
    catalog.validate()?;
    Ok(catalog)
  }

  /// Read, parse and validate a catalog file.
  pub fn load(path: &Path) -> Result<Self> {
    let raw =
      std::fs::read_to_string(path).map_err(|source| Error::CatalogRead {
        path: path.display().to_string(),
        source,
      })?;
    Self::from_toml_str(&raw)
  }

  /// Check identifier uniqueness and cross references.
  pub fn validate(&self) -> Result<()> {
    let mut values = HashSet::new();
    for crime in &self.crimes {
      if !values.insert(crime.value) {
        return Err(Error::DuplicateCrime(crime.value));
      }
    }

    let mut names = HashSet::new();
    for factor in &self.factors {
      if !names.insert(factor.name.as_str()) {
        return Err(Error::DuplicateFactor(factor.name.clone()));
      }
    }
    for factor in &self.factors {
      if let Some(other) =
        factor.exclusive_with.iter().find(|o| !names.contains(o.as_str()))
      {
        return Err(Error::UnknownExclusiveFactor {
          factor: factor.name.clone(),
          other:  other.clone(),
        });
      }
    }
    for group in &self.factor_groups {
      if let Some(missing) =
        group.factors.iter().find(|f| !names.contains(f.as_str()))
      {
        return Err(Error::UnknownGroupMember {
          group:  group.name.clone(),
          factor: missing.clone(),
        });
      }
    }

    let mut codes = HashSet::new();
    for court in &self.courts {
      if !codes.insert(court.code.as_str()) {
        return Err(Error::DuplicateCourt(court.code.clone()));
      }
    }
    Ok(())
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  pub fn crime(&self, value: u32) -> Option<&CrimeSpec> {
    self.crimes.iter().find(|c| c.value == value)
  }

  pub fn factor(&self, name: &str) -> Option<&FactorSpec> {
    self.factors.iter().find(|f| f.name == name)
  }

  // ── Views for a given day ─────────────────────────────────────────────────

  /// Crimes valid on `date`, in catalog order.
  pub fn crimes_on(&self, date: NaiveDate) -> Vec<&CrimeSpec> {
    filter_valid_on(&self.crimes, date)
  }

  /// Factors valid on `date`, in catalog order.
  pub fn factors_on(&self, date: NaiveDate) -> Vec<&FactorSpec> {
    filter_valid_on(&self.factors, date)
  }

  /// Crimes valid on `date`, grouped into categories and kinds.
  pub fn categories_on(&self, date: NaiveDate) -> Taxonomy {
    group_crimes(self.crimes_on(date))
  }

  /// Factor groups with their members resolved against the factors valid on
  /// `date`.
  pub fn factor_groups_on(&self, date: NaiveDate) -> Vec<ResolvedFactorGroup<'_>> {
    let valid = self.factors_on(date);
    self
      .factor_groups
      .iter()
      .map(|group| ResolvedFactorGroup {
        name:    &group.name,
        title:   &group.title,
        factors: group
          .factors
          .iter()
          .filter_map(|name| valid.iter().copied().find(|f| &f.name == name))
          .collect(),
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  const SMALL: &str = r#"
[[crimes]]
value    = 0
category = "殺人"
kind     = "普通殺人罪"
stage    = "accomplished"

[[crimes]]
value        = 1
category     = "殺人"
kind         = "殺直系血親尊親屬罪"
stage        = "accomplished"
valid_before = "2019-05-31"

[[factors]]
name  = "mit_c18_2"
group = "statutory"
label = "未滿十八歲"
vibe  = "positive"
exclusive_with = ["mit_c18_3"]

[[factors]]
name  = "mit_c18_3"
group = "statutory"
label = "滿八十歲"
vibe  = "positive"
exclusive_with = ["mit_c18_2"]

[[factors]]
name        = "mit_future"
group       = "statutory"
label       = "尚未施行"
valid_after = "2030-01-01"

[[factor_groups]]
name    = "statutory"
title   = "法定減輕事由"
factors = ["mit_c18_2", "mit_future", "mit_c18_3"]

[[courts]]
code = "TPH"
name = "臺灣高等法院"
"#;

  #[test]
  fn builtin_catalog_is_valid() {
    let catalog = Catalog::builtin().unwrap();
    assert!(!catalog.crimes.is_empty());
    assert!(!catalog.factors.is_empty());
    assert_eq!(court_name(&catalog.courts, "TPH"), Some("臺灣高等法院"));
    assert_eq!(court_name(&catalog.courts, "XXX"), None);
  }

  #[test]
  fn builtin_categories_follow_the_2019_amendment() {
    let catalog = Catalog::builtin().unwrap();
    let taxonomy = catalog.categories_on(date(2021, 1, 1));
    let titles: Vec<_> = taxonomy.categories().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["殺人", "傷害致死", "其他"]);

    let parricide = catalog.crime(5).unwrap();
    let (_, kind) = taxonomy.locate(parricide).unwrap();
    assert!(!kind.disabled);
    assert_eq!(kind.stages, Some(vec![Stage::Accomplished, Stage::Attempted]));
    assert!(taxonomy.locate(catalog.crime(3).unwrap()).is_some());

    let before = catalog.crimes_on(date(2019, 5, 30));
    assert!(before.iter().any(|c| c.value == 3));
    assert!(!before.iter().any(|c| c.value == 5));

    assert!(taxonomy.get("其他").unwrap().kinds.values().all(|k| k.disabled));
  }

  #[test]
  fn parses_dates_stages_and_defaults() {
    let catalog = Catalog::from_toml_str(SMALL).unwrap();
    let parricide = catalog.crime(1).unwrap();
    assert_eq!(parricide.stage, Some(Stage::Accomplished));
    assert_eq!(parricide.validity.valid_before, Some(date(2019, 5, 31)));
    assert!(!parricide.disabled);
    assert_eq!(catalog.factor("mit_future").unwrap().vibe, Vibe::Neutral);
  }

  #[test]
  fn crimes_on_applies_validity() {
    let catalog = Catalog::from_toml_str(SMALL).unwrap();
    let before: Vec<_> =
      catalog.crimes_on(date(2019, 1, 1)).iter().map(|c| c.value).collect();
    let after: Vec<_> =
      catalog.crimes_on(date(2020, 1, 1)).iter().map(|c| c.value).collect();
    assert_eq!(before, vec![0, 1]);
    assert_eq!(after, vec![0]);
  }

  #[test]
  fn factor_groups_skip_members_outside_their_window() {
    let catalog = Catalog::from_toml_str(SMALL).unwrap();
    let groups = catalog.factor_groups_on(date(2021, 1, 1));
    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0].factors.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["mit_c18_2", "mit_c18_3"]);

    let later = catalog.factor_groups_on(date(2031, 1, 1));
    assert_eq!(later[0].factors.len(), 3);
  }

  #[test]
  fn rejects_duplicate_crime_values() {
    let input = r#"
[[crimes]]
value = 3
category = "a"
kind = "b"

[[crimes]]
value = 3
category = "a"
kind = "c"
"#;
    let err = Catalog::from_toml_str(input).unwrap_err();
    assert!(matches!(err, Error::DuplicateCrime(3)), "{err}");
  }

  #[test]
  fn rejects_group_with_unknown_member() {
    let input = r#"
[[factor_groups]]
name = "g"
title = "G"
factors = ["nope"]
"#;
    let err = Catalog::from_toml_str(input).unwrap_err();
    assert!(matches!(err, Error::UnknownGroupMember { .. }), "{err}");
  }

  #[test]
  fn rejects_exclusivity_with_unknown_factor() {
    let input = r#"
[[factors]]
name = "a"
group = "g"
label = "A"
exclusive_with = ["b"]
"#;
    let err = Catalog::from_toml_str(input).unwrap_err();
    assert!(matches!(err, Error::UnknownExclusiveFactor { .. }), "{err}");
  }

  #[test]
  fn rejects_malformed_toml() {
    assert!(matches!(
      Catalog::from_toml_str("[[crimes]\nvalue = "),
      Err(Error::CatalogParse(_))
    ));
  }

  #[test]
  fn stage_string_forms() {
    assert_eq!(Stage::Attempted.to_string(), "attempted");
    assert_eq!("preparatory".parse::<Stage>().unwrap(), Stage::Preparatory);
    assert_eq!(Stage::Accomplished.label(), "既遂");
  }
}
