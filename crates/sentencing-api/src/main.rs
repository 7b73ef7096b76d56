//! sentencing-api server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `SENTENCING_*` environment variables, loads the catalog and serves the
//! JSON API under `/api`.
//!
//! ```toml
//! host             = "0.0.0.0"
//! port             = 8080
//! catalog_path     = "catalog.toml"
//! utc_offset_hours = 8
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use sentencing_api::{AppState, ServerConfig};
use sentencing_core::catalog::Catalog;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sentencing catalog API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Validate the catalog, print a summary and exit.
  #[arg(long)]
  check_catalog: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SENTENCING"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let catalog = match &server_cfg.catalog_path {
    Some(path) => Catalog::load(path)
      .with_context(|| format!("failed to load catalog {}", path.display()))?,
    None => Catalog::builtin().context("builtin catalog is invalid")?,
  };
  tracing::info!(
    crimes = catalog.crimes.len(),
    factors = catalog.factors.len(),
    courts = catalog.courts.len(),
    "catalog loaded"
  );

  if cli.check_catalog {
    println!(
      "ok: {} crimes, {} factors in {} groups, {} courts",
      catalog.crimes.len(),
      catalog.factors.len(),
      catalog.factor_groups.len(),
      catalog.courts.len()
    );
    return Ok(());
  }

  let time_zone = server_cfg.time_zone().with_context(|| {
    format!("utc_offset_hours out of range: {}", server_cfg.utc_offset_hours)
  })?;

  let state = AppState {
    catalog: Arc::new(catalog),
    time_zone,
  };

  let app = Router::new()
    .nest("/api", sentencing_api::api_router(state))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
