//! JSON API over the sentencing catalog.
//!
//! Exposes an axum [`Router`] that serves the valid crimes and factors, the
//! grouped crime taxonomy, case-identifier parsing and sentence formatting to
//! a front-end. The prediction service itself is not proxied.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sentencing_api::api_router(state))
//! ```

pub mod cases;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod selection;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use chrono::{FixedOffset, NaiveDate, Utc};
use sentencing_core::catalog::Catalog;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_utc_offset_hours() -> i32 { 8 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `SENTENCING_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// Catalog file to serve; the builtin catalog when unset.
  #[serde(default)]
  pub catalog_path:     Option<PathBuf>,
  /// Offset of the time zone validity dates are read in.
  #[serde(default = "default_utc_offset_hours")]
  pub utc_offset_hours: i32,
}

impl ServerConfig {
  /// The configured offset as a time zone.
  pub fn time_zone(&self) -> Option<FixedOffset> {
    self.utc_offset_hours.checked_mul(3600).and_then(FixedOffset::east_opt)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub catalog:   Arc<Catalog>,
  pub time_zone: FixedOffset,
}

impl AppState {
  /// Today's date in the configured time zone.
  pub fn today(&self) -> NaiveDate {
    Utc::now().with_timezone(&self.time_zone).date_naive()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn api_router(state: AppState) -> Router<()> {
  Router::new()
    // Catalog
    .route("/crimes", get(catalog::crimes))
    .route("/crimes/categories", get(catalog::categories))
    .route("/kinds/{kind}", get(catalog::kind))
    .route("/factors", get(catalog::factors))
    .route("/factor-groups", get(catalog::factor_groups))
    .route("/courts", get(catalog::courts))
    // Per-case helpers
    .route("/cases/{id}", get(cases::get_one))
    .route("/sentences/{months}", get(cases::sentence))
    // Selection
    .route("/selection", post(selection::normalize))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
