//! hack0-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the directory API over HTTP under
//! `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use hack0_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "hack0 events directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` merged
/// with `HACK0_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  host:    String,
  port:    u16,
  db_path: PathBuf,
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

  // Load configuration. Every key has a default, so the server runs
  // without a config file at all.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")
    .context("default host")?
    .set_default("port", 8080_i64)
    .context("default port")?
    .set_default("db_path", "hack0.db")
    .context("default db_path")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HACK0"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in the database path.
  let db_path = expand_tilde(&server_cfg.db_path);

  // Open SQLite store.
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  let app = axum::Router::new()
    .nest("/api", hack0_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
