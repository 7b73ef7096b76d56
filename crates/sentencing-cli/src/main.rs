//! `sentencing`: command-line client for the sentencing catalog and the
//! prediction service.
//!
//! # Usage
//!
//! ```
//! sentencing crimes --filter 殺人
//! sentencing factors --as-of 2019-01-01
//! sentencing case 'TPH,109,上訴,45'
//! sentencing predict --crime 2 --factor mit_c62 --url http://localhost:5000
//! sentencing --config ~/.config/sentencing/config.toml predict --crime 0
//! ```

mod app;
mod client;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use app::App;
use chrono::{FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};
use client::HttpPredictor;
use sentencing_core::catalog::Catalog;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sentencing", about = "Sentencing catalog and prediction client")]
struct Args {
  /// Path to a TOML config file (url, catalog, utc_offset_hours).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the prediction service (default: http://localhost:5000).
  #[arg(long, env = "SENTENCING_URL", global = true)]
  url: Option<String>,

  /// Catalog file to use instead of the builtin one.
  #[arg(long, value_name = "FILE", env = "SENTENCING_CATALOG", global = true)]
  catalog: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List selectable crimes grouped by category and kind.
  Crimes {
    /// Evaluate validity on this day (YYYY-MM-DD) instead of today.
    #[arg(long)]
    as_of:  Option<NaiveDate>,
    /// Fuzzy filter on category, kind and variant.
    #[arg(short, long)]
    filter: Option<String>,
  },
  /// List sentencing factors by group.
  Factors {
    /// Evaluate validity on this day (YYYY-MM-DD) instead of today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
  },
  /// Show the display text and judgment link of a case identifier.
  Case {
    /// `COURT,YEAR,CASETYPE,NUMBER`
    id: String,
  },
  /// Show the display text of a sentence in months.
  Sentence {
    #[arg(allow_negative_numbers = true)]
    months: i32,
  },
  /// Ask the prediction service for a sentence estimate.
  Predict {
    /// Crime value, as listed by `sentencing crimes`.
    #[arg(long)]
    crime:   u32,
    /// Factor to set; repeat for several.
    #[arg(long = "factor", value_name = "NAME")]
    factors: Vec<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
struct ConfigFile {
  #[serde(default)]
  url:              String,
  #[serde(default)]
  catalog:          Option<PathBuf>,
  #[serde(default)]
  utc_offset_hours: Option<i32>,
}

impl ConfigFile {
  fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// Effective settings after merging flags, environment and config file.
#[derive(Debug, PartialEq)]
struct Settings {
  url:              String,
  catalog:          Option<PathBuf>,
  utc_offset_hours: i32,
}

impl Settings {
  /// CLI flags override the config file, which overrides defaults.
  fn resolve(args: &Args, file: ConfigFile) -> Self {
    Self {
      url:              args
        .url
        .clone()
        .or_else(|| (!file.url.is_empty()).then_some(file.url))
        .unwrap_or_else(|| DEFAULT_URL.to_string()),
      catalog:          args.catalog.clone().or(file.catalog),
      utc_offset_hours: file.utc_offset_hours.unwrap_or(DEFAULT_UTC_OFFSET_HOURS),
    }
  }

  fn time_zone(&self) -> Result<FixedOffset> {
    self
      .utc_offset_hours
      .checked_mul(3600)
      .and_then(FixedOffset::east_opt)
      .with_context(|| format!("utc_offset_hours out of range: {}", self.utc_offset_hours))
  }

  fn load_catalog(&self) -> Result<Catalog> {
    match &self.catalog {
      Some(path) => Catalog::load(path)
        .with_context(|| format!("loading catalog {}", path.display())),
      None => Catalog::builtin().context("builtin catalog is invalid"),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => ConfigFile::load(path)?,
    None => ConfigFile::default(),
  };
  let settings = Settings::resolve(&args, file_cfg);
  tracing::debug!(?settings, "resolved settings");

  let app = App::new(settings.load_catalog()?, settings.time_zone()?);

  let output = match args.command {
    Command::Crimes { as_of, filter } => app.crimes(as_of, filter.as_deref()),
    Command::Factors { as_of } => app.factors(as_of),
    Command::Case { id } => app.case(&id)?,
    Command::Sentence { months } => app.sentence(months),
    Command::Predict { crime, factors } => {
      let service = HttpPredictor::new(settings.url.clone())?;
      app.predict(&service, crime, &factors).await?
    }
  };
  print!("{output}");

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(argv: &[&str]) -> Args { Args::try_parse_from(argv).unwrap() }

  #[test]
  fn flags_override_config_file() {
    let args = parse(&["sentencing", "--url", "http://flag", "crimes"]);
    let file: ConfigFile = toml::from_str(
      r#"
        url              = "http://file"
        catalog          = "custom.toml"
        utc_offset_hours = 9
      "#,
    )
    .unwrap();

    let settings = Settings::resolve(&args, file);
    assert_eq!(settings, Settings {
      url:              "http://flag".to_string(),
      catalog:          Some(PathBuf::from("custom.toml")),
      utc_offset_hours: 9,
    });
  }

  #[test]
  fn defaults_without_config() {
    let args = parse(&["sentencing", "sentence", "-2"]);
    let settings = Settings::resolve(&args, ConfigFile::default());
    assert_eq!(settings.url, DEFAULT_URL);
    assert_eq!(settings.catalog, None);
    assert_eq!(settings.time_zone().unwrap(), FixedOffset::east_opt(8 * 3600).unwrap());
    assert!(matches!(args.command, Command::Sentence { months: -2 }));
  }

  #[test]
  fn predict_collects_repeated_factors() {
    let args = parse(&[
      "sentencing",
      "predict",
      "--crime",
      "2",
      "--factor",
      "mit_c59",
      "--factor",
      "mit_c62",
    ]);
    match args.command {
      Command::Predict { crime, factors } => {
        assert_eq!(crime, 2);
        assert_eq!(factors, vec!["mit_c59", "mit_c62"]);
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn rejects_out_of_range_offset() {
    for hours in [30, -25, i32::MAX, i32::MIN] {
      let settings = Settings {
        url:              DEFAULT_URL.to_string(),
        catalog:          None,
        utc_offset_hours: hours,
      };
      let err = settings.time_zone().unwrap_err();
      assert!(err.to_string().contains(&hours.to_string()), "{err}");
    }
  }
}
