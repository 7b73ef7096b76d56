//! Category → kind grouping of the valid crimes.
//!
//! The selection form shows one tab per category, one radio button per kind
//! and, where a kind has alternatives, a stage picker and a list of variants.
//! [`group_crimes`] derives that structure from a filtered list of
//! [`CrimeSpec`]s in a single accumulation pass; the result is a read-only
//! view rebuilt on every query.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::catalog::{CrimeSpec, Stage};

// ─── Derived view ────────────────────────────────────────────────────────────

/// A named offense type with the stages and variants available for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kind {
  pub text:            String,
  /// Distinct stages in first-seen order; `None` unless there are at least
  /// two to choose from.
  pub stages:          Option<Vec<Stage>>,
  /// Distinct variants in first-seen order; `None` if there are none.
  pub variants:        Option<Vec<String>>,
  /// True iff every contributing crime is disabled.
  pub disabled:        bool,
  /// Stages of the contributing crimes that are disabled.
  pub disabled_stages: BTreeSet<Stage>,
}

impl Kind {
  /// The kind's stages in canonical display order (preparatory, attempted,
  /// accomplished). Empty when there is no stage choice to make.
  pub fn stage_choices(&self) -> Vec<Stage> {
    let Some(stages) = &self.stages else {
      return Vec::new();
    };
    Stage::iter().filter(|s| stages.contains(s)).collect()
  }
}

/// A broad group of offenses, e.g. homicide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
  pub title: String,
  /// Kinds in first-seen order.
  pub kinds: IndexMap<String, Kind>,
}

/// Categories keyed by title, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Taxonomy(IndexMap<String, Category>);

impl Taxonomy {
  pub fn get(&self, category: &str) -> Option<&Category> {
    self.0.get(category)
  }

  pub fn categories(&self) -> impl Iterator<Item = &Category> {
    self.0.values()
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The category and kind `crime` was grouped under, if it is part of this
  /// taxonomy.
  pub fn locate(&self, crime: &CrimeSpec) -> Option<(&Category, &Kind)> {
    let category = self.0.get(&crime.category)?;
    let kind = category.kinds.get(&crime.kind)?;
    Some((category, kind))
  }
}

// ─── Accumulation ────────────────────────────────────────────────────────────

struct KindAcc {
  stages:          IndexSet<Stage>,
  variants:        IndexSet<String>,
  disabled:        bool,
  disabled_stages: BTreeSet<Stage>,
}

impl KindAcc {
  fn new() -> Self {
    Self {
      stages:          IndexSet::new(),
      variants:        IndexSet::new(),
      disabled:        true,
      disabled_stages: BTreeSet::new(),
    }
  }

  fn absorb(&mut self, crime: &CrimeSpec) {
    if let Some(stage) = crime.stage {
      self.stages.insert(stage);
    }
    if let Some(variant) = &crime.variant {
      self.variants.insert(variant.clone());
    }
    self.disabled &= crime.disabled;
    if crime.disabled
      && let Some(stage) = crime.stage
    {
      self.disabled_stages.insert(stage);
    }
  }

  fn finish(self, text: String) -> Kind {
    Kind {
      text,
      stages: (self.stages.len() > 1).then(|| self.stages.into_iter().collect()),
      variants: (!self.variants.is_empty())
        .then(|| self.variants.into_iter().collect()),
      disabled: self.disabled,
      disabled_stages: self.disabled_stages,
    }
  }
}

/// Group `crimes` (already filtered for validity) by category and kind.
///
/// Categories and kinds appear in the order they are first seen. Every
/// returned category and kind traces back to at least one input crime.
pub fn group_crimes<'a, I>(crimes: I) -> Taxonomy
where
  I: IntoIterator<Item = &'a CrimeSpec>,
{
  let mut acc: IndexMap<&'a str, IndexMap<&'a str, KindAcc>> = IndexMap::new();

  for crime in crimes {
    acc
      .entry(crime.category.as_str())
      .or_default()
      .entry(crime.kind.as_str())
      .or_insert_with(KindAcc::new)
      .absorb(crime);
  }

  Taxonomy(
    acc
      .into_iter()
      .map(|(title, kinds)| {
        let kinds = kinds
          .into_iter()
          .map(|(text, kind)| (text.to_owned(), kind.finish(text.to_owned())))
          .collect();
        (title.to_owned(), Category {
          title: title.to_owned(),
          kinds,
        })
      })
      .collect(),
  )
}

/// The first crime of kind `kind`, i.e. the one a kind selection maps to.
pub fn first_crime_of_kind<'a, I>(crimes: I, kind: &str) -> Option<&'a CrimeSpec>
where
  I: IntoIterator<Item = &'a CrimeSpec>,
{
  crimes.into_iter().find(|c| c.kind == kind)
}
