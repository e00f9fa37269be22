//! fixit server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `FIXIT_*` environment variables, opens an in-process SQLite store, and
//! serves the JSON API over HTTP.
//!
//! # Mock data
//!
//! To fill a fresh store with reports before serving:
//!
//! ```sh
//! cargo run -p fixit-server --bin server -- --seed 50
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use fixit_core::service::ReportService;
use fixit_server::{ServerConfig, seed};
use fixit_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "fixit report server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Insert this many mock reports before serving.
  #[arg(long, value_name = "COUNT")]
  seed: Option<usize>,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let service = ReportService::new(Arc::new(store), server_cfg.service_config());
  tracing::info!(
    orientation = ?server_cfg.index_orientation,
    policy = ?server_cfg.transition_policy,
    "report service ready"
  );

  if let Some(count) = cli.seed {
    seed::seed(&service, count, &mut rand::thread_rng())
      .await
      .context("failed to seed mock data")?;
  }

  let app = fixit_server::app(service);
  let address = server_cfg.address();

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
