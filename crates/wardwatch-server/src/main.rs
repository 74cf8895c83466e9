//! wardwatch server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `WARDWATCH_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP until SIGINT or SIGTERM.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```
//! cargo run -p wardwatch-server -- --hash-password
//! ```

use std::{future::Future, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wardwatch_server::{Database, ServerConfig};
use wardwatch_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "wardwatch waste-management API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  if cli.hash_password {
    let password = rpassword_or_stdin()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("WARDWATCH").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig (database_url, auth_username and auth_password_hash are required)")?;

  let database = server_cfg.database()?;
  let store = match &database {
    Database::Memory => SqliteStore::open_in_memory().await,
    Database::File(path) => SqliteStore::open(path).await,
  }
  .with_context(|| format!("failed to open store at {database:?}"))?;
  let store = Arc::new(store);

  let app = wardwatch_server::router(store.clone(), Arc::new(server_cfg.auth()));
  let address = server_cfg.address();

  let shutdown = shutdown_signal()?;
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown)
    .await
    .context("server error")?;

  match Arc::try_unwrap(store) {
    Ok(store) => {
      store.close().await.context("failed to close store")?;
      tracing::info!("store closed");
    }
    Err(_) => tracing::warn!("store still referenced at shutdown; dropping without close"),
  }

  Ok(())
}

/// Resolves on the first SIGINT or SIGTERM.
#[cfg(unix)]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
  use tokio::signal::unix::{SignalKind, signal};
  let mut sigint = signal(SignalKind::interrupt()).context("failed to listen for SIGINT")?;
  let mut sigterm = signal(SignalKind::terminate()).context("failed to listen for SIGTERM")?;
  Ok(async move {
    tokio::select! {
      _ = sigint.recv() => tracing::info!("received SIGINT, draining"),
      _ = sigterm.recv() => tracing::info!("received SIGTERM, draining"),
    }
  })
}

#[cfg(not(unix))]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
  Ok(async {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::info!("received Ctrl-C, draining");
    }
  })
}

/// Prompt for a password and read one line from stdin. The input is echoed.
fn rpassword_or_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
