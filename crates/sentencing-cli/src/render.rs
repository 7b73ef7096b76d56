//! Plain-text views printed by the subcommands.

use std::fmt;

use sentencing_core::{
  catalog::{Catalog, CrimeSpec, ResolvedFactorGroup, Vibe},
  prediction::{Prediction, PredictionRequest, format_decimal},
  sentence::format_sentence,
  taxonomy::group_crimes,
};

/// `category › kind › stage › variant` for `crime`, skipping absent parts.
pub fn crime_path(crime: &CrimeSpec) -> String {
  let mut parts = vec![crime.category.as_str(), crime.kind.as_str()];
  if let Some(stage) = crime.stage {
    parts.push(stage.label());
  }
  if let Some(variant) = &crime.variant {
    parts.push(variant);
  }
  parts.join(" › ")
}

// ─── Crimes ──────────────────────────────────────────────────────────────────

/// Crimes grouped into categories and kinds, each kind followed by the
/// selectable values that make it up.
pub struct CrimeTree<'a>(pub &'a [&'a CrimeSpec]);

impl fmt::Display for CrimeTree<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let taxonomy = group_crimes(self.0.iter().copied());
    if taxonomy.is_empty() {
      return writeln!(f, "(no matching crimes)");
    }

    for category in taxonomy.categories() {
      writeln!(f, "{}", category.title)?;
      for kind in category.kinds.values() {
        write!(f, "  {}", kind.text)?;

        let stages: Vec<String> = kind
          .stage_choices()
          .into_iter()
          .map(|stage| {
            if kind.disabled_stages.contains(&stage) {
              format!("{}*", stage.label())
            } else {
              stage.label().to_string()
            }
          })
          .collect();
        if !stages.is_empty() {
          write!(f, "  [{}]", stages.join("/"))?;
        }
        if let Some(variants) = &kind.variants {
          write!(f, "  {{{}}}", variants.join(", "))?;
        }
        if kind.disabled {
          write!(f, "  (disabled)")?;
        }
        writeln!(f)?;

        let members = self
          .0
          .iter()
          .filter(|c| c.category == category.title && c.kind == kind.text);
        for crime in members {
          write!(f, "    {:>4}  {}", crime.value, crime.stage.map_or("-", |s| s.label()))?;
          if let Some(variant) = &crime.variant {
            write!(f, "  {variant}")?;
          }
          if crime.disabled {
            write!(f, "  *")?;
          }
          writeln!(f)?;
        }
      }
    }
    Ok(())
  }
}

// ─── Factors ─────────────────────────────────────────────────────────────────

fn vibe_marker(vibe: Vibe) -> char {
  match vibe {
    Vibe::Positive => '-',
    Vibe::Negative => '+',
    Vibe::Neutral => '~',
  }
}

/// Factor groups with their members, one factor per line.
pub struct FactorGroups<'a>(pub &'a [ResolvedFactorGroup<'a>]);

impl fmt::Display for FactorGroups<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for group in self.0 {
      writeln!(f, "{} ({})", group.title, group.name)?;
      for factor in &group.factors {
        write!(
          f,
          "  {} {:<14} {}",
          vibe_marker(factor.vibe),
          factor.name,
          factor.label
        )?;
        if !factor.exclusive_with.is_empty() {
          write!(f, "  [excludes {}]", factor.exclusive_with.join(", "))?;
        }
        if let Some(stage) = factor.implied_by_stage {
          write!(f, "  [set by {}]", stage.label())?;
        }
        writeln!(f)?;
      }
    }
    Ok(())
  }
}

// ─── Prediction ──────────────────────────────────────────────────────────────

/// A prediction with the request it answers. Related cases are printed in
/// the order they are stored.
pub struct PredictionReport<'a> {
  pub catalog:    &'a Catalog,
  pub request:    &'a PredictionRequest,
  pub prediction: &'a Prediction,
}

impl fmt::Display for PredictionReport<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Self {
      catalog,
      request,
      prediction,
    } = self;

    match catalog.crime(request.crime) {
      Some(crime) => writeln!(f, "罪名: {} ({})", crime_path(crime), crime.value)?,
      None => writeln!(f, "罪名: {}", request.crime)?,
    }

    let factors: Vec<&str> = request
      .factors
      .active()
      .map(|name| catalog.factor(name).map_or(name, |spec| spec.label.as_str()))
      .collect();
    if factors.is_empty() {
      writeln!(f, "量刑因子: (none)")?;
    } else {
      writeln!(f, "量刑因子:")?;
      for label in factors {
        writeln!(f, "  {label}")?;
      }
    }

    writeln!(f)?;
    writeln!(f, "量刑估計區間: {}", prediction.formatted_range())?;
    writeln!(
      f,
      "  f(x) = {} ± {} 個月",
      format_decimal(prediction.estimation, 2),
      format_decimal(prediction.error_margin, 2)
    )?;
    if let Some(plot) = &prediction.plot {
      writeln!(f, "  plot: {plot}")?;
    }

    if prediction.related_cases.is_empty() {
      return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "相似判決:")?;
    for case in &prediction.related_cases {
      write!(f, "  {:>3}%  ", case.relevance_percent())?;
      match case.case_id(&catalog.courts) {
        Ok(case_id) => {
          write!(f, "{case_id}")?;
          if let Some(months) = case.sentence {
            write!(f, "  {}", format_sentence(months))?;
          }
          writeln!(f)?;
          writeln!(f, "        {}", case_id.reference_url())?;
        }
        Err(_) => {
          write!(f, "{}", case.id)?;
          if let Some(months) = case.sentence {
            write!(f, "  {}", format_sentence(months))?;
          }
          writeln!(f)?;
        }
      }
    }
    Ok(())
  }
}
