//! mgnrega ingestion binary.
//!
//! Performs exactly one ingestion run and exits. Reads `config.toml` (or the
//! path given with `--config`), then `MGNREGA_*` environment variables, then
//! the command-line flags below. Exits non-zero if the run fails.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use mgnrega_core::store::PerformanceStore as _;
use mgnrega_ingest::{DataGovSource, IngestConfig, IngestOutcome, Pipeline};
use mgnrega_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Refresh the MGNREGA performance table")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Open-data portal API key.
  #[arg(long, env = "DATA_GOV_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Identifier of the MGNREGA dataset resource.
  #[arg(long, env = "RESOURCE_ID")]
  resource_id: Option<String>,

  /// Path to the SQLite database file.
  #[arg(long)]
  store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MGNREGA"))
    .set_override_option("api_key", cli.api_key)?
    .set_override_option("resource_id", cli.resource_id)?
    .set_override_option(
      "store_path",
      cli.store.map(|p| p.to_string_lossy().into_owned()),
    )?
    .build()
    .context("failed to read configuration")?;

  let mut ingest_cfg: IngestConfig = settings
    .try_deserialize()
    .context("failed to deserialise IngestConfig")?;
  ingest_cfg.store_path = expand_tilde(&ingest_cfg.store_path);
  tracing::debug!(config = ?ingest_cfg, "loaded configuration");

  let store = SqliteStore::open(&ingest_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", ingest_cfg.store_path))?;

  match store.last_ingestion().await {
    Ok(Some(previous)) => tracing::info!(
      run_id = %previous.run_id,
      finished_at = %previous.finished_at,
      inserted = previous.inserted,
      "previous ingestion",
    ),
    Ok(None) => tracing::info!("no previous ingestion recorded"),
    Err(e) => tracing::warn!(error = %e, "could not read previous ingestion"),
  }

  let source = DataGovSource::new(&ingest_cfg).context("failed to build HTTP client")?;
  let pipeline = Pipeline::new(source, store.clone());

  let result = pipeline.run().await;
  if let Err(e) = store.close().await {
    tracing::warn!(error = %e, "failed to close store cleanly");
  }

  match result {
    Ok(IngestOutcome::Replaced(run)) => {
      tracing::info!(run_id = %run.run_id, inserted = run.inserted, "ingestion complete");
      Ok(())
    }
    Ok(IngestOutcome::Skipped(reason)) => {
      tracing::info!(?reason, "ingestion finished without changes");
      Ok(())
    }
    Err(e) => {
      tracing::error!(error = %e, "ingestion failed");
      Err(e).context("ingestion run failed")
    }
  }
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
